//! Query routing and answer synthesis.
//!
//! `retrieve` picks a retrieval backend from the strategy tag, `synthesize`
//! turns the retrieved evidence into a prompt and extracts the final answer,
//! and `answer` composes the two. Internal backend errors never reach the
//! caller as anything but a [`RagError`] category or a user-facing string.

pub mod extract;
pub mod graph;
pub mod vector;

use tracing::{info, warn};

use crate::component::{llm, LocalComponent};
use crate::error::RagError;

/// The two retrieval strategies a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Vector,
    Graph,
}

impl Strategy {
    /// Parses a request tag. Anything unrecognized is `None`, which the
    /// router treats as "no evidence" rather than an error.
    pub fn from_tag(tag: &str) -> Option<Strategy> {
        match tag {
            "vector" => Some(Strategy::Vector),
            "graph" => Some(Strategy::Graph),
            _ => None,
        }
    }
}

/// Reply used whenever retrieval produced no evidence.
pub const NO_EVIDENCE_REPLY: &str =
    "I couldn't find any information on that drug. Please check the spelling.";

/// Generation length bound for one answer.
const MAX_ANSWER_TOKENS: usize = 150;

/// Routes the question to the strategy named by `tag`. An unrecognized tag
/// yields empty evidence.
pub fn retrieve(
    question: &str,
    tag: &str,
    comps: &mut LocalComponent,
) -> Result<Vec<String>, RagError> {
    match Strategy::from_tag(tag) {
        Some(Strategy::Vector) => vector::retrieve(question, comps),
        Some(Strategy::Graph) => graph::retrieve(question, comps),
        None => {
            warn!("unrecognized retrieval strategy {:?}", tag);
            Ok(vec![])
        }
    }
}

fn build_answer_prompt(question: &str, evidence: &[String]) -> String {
    format!(
        "Based on the following information, answer the user's question.\n\
         \n\
         Information:\n\
         {}\n\
         \n\
         Question: {}\n\
         \n\
         Answer:",
        evidence.join("\n"),
        question
    )
}

/// Produces the final answer text from the question and retrieved evidence.
///
/// Empty evidence short-circuits to [`NO_EVIDENCE_REPLY`] without touching
/// the generation service. A generation that drops the answer marker
/// degrades to the trimmed raw generation instead of failing the request.
pub fn synthesize(
    question: &str,
    evidence: &[String],
    llm: &mut dyn llm::Llm,
) -> Result<String, RagError> {
    if evidence.is_empty() {
        return Ok(NO_EVIDENCE_REPLY.to_string());
    }
    let prompt = build_answer_prompt(question, evidence);
    info!("prompting with {} evidence lines", evidence.len());
    let generated = llm
        .complete(&prompt, MAX_ANSWER_TOKENS)
        .map_err(|e| RagError::Connection(e.to_string()))?;
    match llm::extract_answer(&generated) {
        Ok(answer) => Ok(answer.to_string()),
        Err(err) => {
            warn!("{err}, falling back to the raw generation");
            Ok(generated.trim().to_string())
        }
    }
}

/// End-to-end composition of router and synthesizer.
pub fn answer(question: &str, tag: &str, comps: &mut LocalComponent) -> Result<String, RagError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(RagError::InvalidRequest("no query provided".to_string()));
    }
    let evidence = retrieve(question, tag, comps)?;
    synthesize(question, &evidence, comps.llm.as_mut())
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::component::llm::Llm;
    use crate::component::testing::{sample_component, StubLlm};

    /// Completion service the fallback paths must never reach.
    struct UnreachableLlm;

    impl Llm for UnreachableLlm {
        fn complete(&mut self, _prompt: &str, _max_tokens: usize) -> anyhow::Result<String> {
            bail!("the generation service must not be called")
        }
    }

    #[test]
    fn test_strategy_tags() {
        assert_eq!(Strategy::from_tag("vector"), Some(Strategy::Vector));
        assert_eq!(Strategy::from_tag("graph"), Some(Strategy::Graph));
        assert_eq!(Strategy::from_tag("sparql"), None);
    }

    #[test]
    fn test_empty_question_is_invalid() {
        let mut comps = sample_component("Answer: x");
        let err = answer("   ", "vector", &mut comps).unwrap_err();
        assert!(matches!(err, RagError::InvalidRequest(_)));
    }

    #[test]
    fn test_synthesize_extracts_marked_answer() {
        let mut llm = StubLlm::replying("...context...\nAnswer: Headache and nausea.");
        let evidence = vec!["Paracetamol: Mild stomach upset".to_string()];
        let answer = synthesize("q", &evidence, &mut llm).unwrap();
        assert_eq!(answer, "Headache and nausea.");
        assert_eq!(llm.calls, 1);
    }

    #[test]
    fn test_synthesize_recovers_from_missing_marker() {
        let mut llm = StubLlm::replying("  an off-template ramble  ");
        let evidence = vec!["Paracetamol: Mild stomach upset".to_string()];
        let answer = synthesize("q", &evidence, &mut llm).unwrap();
        assert_eq!(answer, "an off-template ramble");
    }

    #[test]
    fn test_no_evidence_skips_generation() {
        let mut llm = UnreachableLlm;
        let answer = synthesize("q", &[], &mut llm).unwrap();
        assert_eq!(answer, NO_EVIDENCE_REPLY);
    }

    #[test]
    fn test_unknown_drug_end_to_end_falls_back() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut comps = sample_component("Answer: should not matter");
        comps.llm = Box::new(UnreachableLlm);
        let reply = answer(
            "What are the side effects of nonexistentium?",
            "graph",
            &mut comps,
        )
        .unwrap();
        assert_eq!(reply, NO_EVIDENCE_REPLY);
    }

    #[test]
    fn test_unrecognized_strategy_falls_back() {
        let mut comps = sample_component("Answer: should not matter");
        comps.llm = Box::new(UnreachableLlm);
        let reply = answer("What are the side effects of paracetamol?", "sql", &mut comps).unwrap();
        assert_eq!(reply, NO_EVIDENCE_REPLY);
    }

    #[test]
    fn test_vector_end_to_end() {
        let mut comps = sample_component("Information: ...\nAnswer: Nausea is common.");
        let reply = answer("Paracetamol: Mild stomach upset", "vector", &mut comps).unwrap();
        assert_eq!(reply, "Nausea is common.");
    }

    #[test]
    fn test_graph_end_to_end() {
        let mut comps = sample_component("Answer: Mild stomach upset, mostly.");
        let reply = answer(
            "What are the side effects of paracetamol?",
            "graph",
            &mut comps,
        )
        .unwrap();
        assert_eq!(reply, "Mild stomach upset, mostly.");
    }
}
