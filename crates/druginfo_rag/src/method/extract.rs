//! Query parameter extraction for the structured strategy.

/// Pulls the parameters of a structured lookup out of a free-text question.
///
/// A seam for swapping the shipped heuristic for a proper entity recognizer
/// without touching the router.
pub trait QueryParameterExtractor {
    fn drug_name(&self, question: &str) -> String;
}

/// The shipped heuristic: take everything after the last `" of "`, strip a
/// trailing `?`, trim, and capitalize. Intentionally brittle; it handles
/// questions shaped like "what are the side effects of X?".
pub struct OfSplitExtractor;

impl QueryParameterExtractor for OfSplitExtractor {
    fn drug_name(&self, question: &str) -> String {
        let tail = question.rsplit(" of ").next().unwrap_or(question);
        capitalize(tail.trim_end_matches('?').trim())
    }
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
