//! Generative model trait for single-turn grounded answering.

use async_trait::async_trait;

use crate::error::Result;

/// A generative language model invoked as a single-turn call.
///
/// The contract is deliberately narrow: one system-level instruction, one
/// user message, one text response. No conversation state is retained, no
/// streaming, no tool use — grounded question answering needs none of
/// them. Backends wrap concrete APIs behind this seam; tests substitute a
/// scripted [`MockGenerativeModel`](crate::mock::MockGenerativeModel).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a text completion for the given system instruction and
    /// user message.
    ///
    /// # Errors
    ///
    /// Backend failures (network, quota, malformed response) propagate to
    /// the caller; there is no internal retry.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}
