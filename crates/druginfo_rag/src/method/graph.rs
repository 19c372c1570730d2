//! Structured retrieval over the drug/side-effect graph.

use tracing::info;

use crate::component::LocalComponent;
use crate::error::RagError;

/// Extracts a candidate drug name from the question and returns its side
/// effects as `"<side_effect>: <description>"` strings. An unmatched drug
/// yields no evidence, which the synthesizer turns into the fallback reply.
pub fn retrieve(question: &str, comps: &mut LocalComponent) -> Result<Vec<String>, RagError> {
    let drug_name = comps.extractor.drug_name(question);
    let results = comps.graph.query(&drug_name);
    info!(
        "graph retrieval for {:?} returned {} edges",
        drug_name,
        results.len()
    );
    Ok(results
        .into_iter()
        .map(|(side_effect, description)| format!("{side_effect}: {description}"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::testing::sample_component;

    #[test]
    fn test_retrieve_formats_edges() {
        let mut comps = sample_component("Answer: x");
        let evidence = retrieve("What are the side effects of paracetamol?", &mut comps).unwrap();
        assert_eq!(evidence, vec!["Nausea: Mild stomach upset".to_string()]);
    }

    #[test]
    fn test_unmatched_drug_yields_no_evidence() {
        let mut comps = sample_component("Answer: x");
        let evidence = retrieve("What are the side effects of nonexistentium?", &mut comps).unwrap();
        assert!(evidence.is_empty());
    }
}
