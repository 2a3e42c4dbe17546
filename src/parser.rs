//! Invoice text parsing.
//!
//! Converts the raw text of a service invoice into an [`InvoiceRecord`].
//! Header fields are extracted with independent labeled-field patterns;
//! repair narratives are segmented at block boundaries and then scanned
//! with a single label-oriented pass per segment.
//!
//! Every field is best-effort: a field that does not match is left absent,
//! never an error. The one exception is the invoice identifier — a document
//! with no identifiable invoice id yields no record at all, since the id is
//! what downstream indexing attributes answers to.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::{InvoiceRecord, RepairEntry, VehicleInfo};

// Invoice-header patterns. These are case-sensitive: the invoice dialect
// emits header labels with exact casing, and loosening them changes which
// documents parse. Repair-narrative labels below are case-insensitive.
static INVOICE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Invoice[:\s]+([A-Z0-9]+)").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Date[:\s]+(\d{1,2}/\d{1,2}/\d{4})").unwrap());
static CUSTOMER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Customer[:\s]+([^\n]+)").unwrap());
static VEHICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Vehicle[:\s]+(\d{4})\s+(\S+)\s+([^\n]+)").unwrap());
static VIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"VIN[:\s]+([A-Z0-9]+)").unwrap());
static MILEAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mileage[:\s]+([0-9,]+)").unwrap());

// A repair narrative starts either at an explicit block marker or at the
// literal onset of a complaint.
static BLOCK_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Service Block \d+[:\s]*|Complaint:").unwrap());

static LABOR_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*(?:hrs?)?\s*(?:@\s*\$?\s*([0-9]+(?:\.[0-9]+)?))?")
        .unwrap()
});

/// Field labels recognized inside a repair segment, matched
/// case-insensitively at the start of a line.
const SEGMENT_LABELS: [&str; 5] = ["complaint", "cause", "correction", "labor", "parts"];

/// Parse raw invoice text into a structured record.
///
/// Returns `None` when no invoice identifier can be located — the single
/// required field gating downstream indexing. All other fields degrade to
/// absent. Parsing is a pure function of its input: the same text always
/// yields the same record.
pub fn parse_invoice(text: &str, document_name: &str) -> Option<InvoiceRecord> {
    if text.is_empty() {
        return None;
    }
    let text = text.replace("\r\n", "\n");

    let Some(invoice_id) = capture(&INVOICE_ID_RE, &text) else {
        warn!(document = document_name, "no invoice id found, skipping document");
        return None;
    };

    let (customer_name, customer_email) = match capture(&CUSTOMER_RE, &text) {
        Some(line) => split_customer(&line),
        None => (None, None),
    };

    let mut vehicle = VehicleInfo {
        vin: capture(&VIN_RE, &text),
        mileage: capture(&MILEAGE_RE, &text),
        ..VehicleInfo::default()
    };
    if let Some(caps) = VEHICLE_RE.captures(&text) {
        vehicle.year = Some(caps[1].trim().to_string());
        vehicle.make = Some(caps[2].trim().to_string());
        vehicle.model = Some(caps[3].trim().to_string());
    }

    let repair_entries = parse_repair_entries(&text);
    debug!(
        document = document_name,
        invoice_id = %invoice_id,
        repair_entries = repair_entries.len(),
        "parsed invoice"
    );

    Some(InvoiceRecord {
        document_name: document_name.to_string(),
        invoice_id,
        date: capture(&DATE_RE, &text),
        customer_name,
        customer_email,
        vehicle,
        repair_entries,
    })
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

/// Split a customer line into name and email. A line embedding an `@` is
/// treated as `<name> <email>` run together; the name is whatever precedes
/// the `@`, the email is the full line.
fn split_customer(line: &str) -> (Option<String>, Option<String>) {
    match line.find('@') {
        Some(at) => {
            let name = line[..at].trim();
            let name = (!name.is_empty()).then(|| name.to_string());
            (name, Some(line.trim().to_string()))
        }
        None => (Some(line.trim().to_string()), None),
    }
}

/// Partition the text into repair segments and parse each one.
///
/// The span before the first boundary is header/preamble and is discarded.
fn parse_repair_entries(text: &str) -> Vec<RepairEntry> {
    let boundaries: Vec<(usize, usize)> = BLOCK_BOUNDARY_RE
        .find_iter(text)
        .map(|m| {
            // An explicit block marker is consumed; a complaint onset is
            // kept as part of its segment so the label scanner sees it.
            let content_start =
                if m.as_str().starts_with("Service Block") { m.end() } else { m.start() };
            (m.start(), content_start)
        })
        .collect();

    let mut entries = Vec::new();
    for (i, &(_, content_start)) in boundaries.iter().enumerate() {
        let end = boundaries.get(i + 1).map_or(text.len(), |&(start, _)| start);
        if let Some(entry) = parse_repair_segment(&text[content_start..end]) {
            entries.push(entry);
        }
    }
    entries
}

/// Parse one repair segment into an entry.
///
/// Returns `None` when the segment has no narrative field (complaint,
/// cause, or correction) — labor or parts alone do not make an entry.
fn parse_repair_segment(segment: &str) -> Option<RepairEntry> {
    let mut entry = RepairEntry::default();

    for (label, value) in scan_labeled_fields(segment) {
        match label {
            "complaint" if entry.complaint.is_none() => entry.complaint = non_empty(value),
            "cause" if entry.cause.is_none() => entry.cause = non_empty(value),
            "correction" if entry.correction.is_none() => entry.correction = non_empty(value),
            "labor" if entry.labor_hours.is_none() => {
                if let Some((hours, rate)) = parse_labor(&value) {
                    entry.labor_hours = Some(hours);
                    entry.labor_rate = rate;
                }
            }
            "parts" if entry.parts.is_empty() => {
                entry.parts = value
                    .split([',', '\n'])
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }

    entry.has_narrative().then_some(entry)
}

/// Segment text into `(label, value)` pairs in a single line-oriented pass.
///
/// A line whose first word is a recognized label (case-insensitive,
/// followed by `:` or whitespace) starts a new field; every following line
/// up to the next label line is a continuation of that field's value. This
/// one scanner is the only place field boundaries are defined, so the
/// labels can never disagree about where a multi-line value ends.
fn scan_labeled_fields(segment: &str) -> Vec<(&'static str, String)> {
    let mut fields: Vec<(&'static str, String)> = Vec::new();

    for line in segment.lines() {
        match match_label(line) {
            Some((label, rest)) => fields.push((label, rest.to_string())),
            None => {
                if let Some((_, value)) = fields.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
                // Lines before the first label are noise between the block
                // marker and the first field; drop them.
            }
        }
    }

    for (_, value) in &mut fields {
        *value = value.trim().to_string();
    }
    fields
}

/// Match a recognized label at the start of a line, returning the label and
/// the remainder of the line after the separator.
fn match_label(line: &str) -> Option<(&'static str, &str)> {
    let trimmed = line.trim_start();
    for label in SEGMENT_LABELS {
        if trimmed.len() > label.len()
            && trimmed.as_bytes()[..label.len()].eq_ignore_ascii_case(label.as_bytes())
        {
            let sep = trimmed.as_bytes()[label.len()];
            if sep == b':' || sep.is_ascii_whitespace() {
                // `sep` is ASCII, so the slice below lands on a char boundary.
                let rest = trimmed[label.len()..].trim_start_matches([':', ' ', '\t']);
                return Some((label, rest));
            }
        }
    }
    None
}

/// Parse a labor value of the form `<hours> [hrs] [@ $<rate>]`.
///
/// Hours are mandatory; the rate is optional. Anything else yields `None`.
fn parse_labor(value: &str) -> Option<(f64, Option<f64>)> {
    let caps = LABOR_VALUE_RE.captures(value.trim())?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let rate = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some((hours, rate))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
