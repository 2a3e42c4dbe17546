//! Grounded answer generation from retrieved chunks.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievedChunk;
use crate::error::Result;
use crate::model::GenerativeModel;

/// Separator between chunk texts inside the grounding prompt.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// System instruction constraining the model to the supplied context.
///
/// The "cite the invoices" clause is advisory to the model; citation is not
/// mechanically enforced on the response.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about truck service invoices.\n\
Answer questions based ONLY on the provided invoice context. If the answer is not in the context,\n\
say \"I cannot find this information in the provided invoices.\" Be specific and cite the invoices when relevant.";

/// An answer together with the invoice ids that grounded it.
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    /// The model's raw text response, with no post-processing.
    pub answer: String,
    /// Distinct invoice ids across the chunks supplied in the prompt.
    pub source_invoice_ids: BTreeSet<String>,
}

/// Composes retrieved chunks into a grounding prompt and invokes the
/// generative model.
///
/// Source attribution is a property of what was *retrieved*, not of what
/// the model claims to have used: `source_invoice_ids` is computed
/// deterministically from the chunks passed into the prompt and is never
/// extracted from the model's text.
pub struct AnswerGenerator {
    model: Arc<dyn GenerativeModel>,
}

impl AnswerGenerator {
    /// Create a generator over the given model.
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Generate an answer for `query` grounded in `retrieved`.
    ///
    /// A grounding refusal ("I cannot find this information…") is a valid,
    /// successful answer — distinct from a pipeline error.
    ///
    /// # Errors
    ///
    /// Model-call failures propagate uncaught; there is no safe local
    /// fallback for "no answer", and retry is the caller's concern.
    pub async fn generate(
        &self,
        query: &str,
        retrieved: &[RetrievedChunk],
    ) -> Result<GeneratedAnswer> {
        let user_prompt = build_user_prompt(query, retrieved);
        debug!(chunk_count = retrieved.len(), prompt_len = user_prompt.len(), "built prompt");

        let answer = self.model.complete(SYSTEM_PROMPT, &user_prompt).await?;

        let source_invoice_ids: BTreeSet<String> =
            retrieved.iter().map(|chunk| chunk.metadata.invoice_id.clone()).collect();

        info!(
            answer_len = answer.len(),
            source_count = source_invoice_ids.len(),
            "generated answer"
        );
        Ok(GeneratedAnswer { answer, source_invoice_ids })
    }
}

/// Embed the retrieved chunk texts and the literal query in the fixed
/// instructional template.
fn build_user_prompt(query: &str, retrieved: &[RetrievedChunk]) -> String {
    let context: Vec<&str> = retrieved.iter().map(|chunk| chunk.text.as_str()).collect();
    let context = context.join(CONTEXT_SEPARATOR);

    format!(
        "Based on the following invoice context, answer this question: {query}\n\
         \n\
         INVOICE CONTEXT:\n\
         {context}\n\
         \n\
         Please provide a clear, concise answer based only on the information above."
    )
}
