//! component provides the building blocks of the hybrid retrieval engine.

pub mod bert;
pub mod corpus;
pub mod graph;
pub mod index;
pub mod llm;

use tracing::info;

use crate::error::RagError;
use crate::method::extract::{OfSplitExtractor, QueryParameterExtractor};

/// [`LocalComponent`] is the composition root: every backend the router and
/// synthesizer touch lives here as an explicit, constructed object. There is
/// no ambient global state.
pub struct LocalComponent {
    pub embedder: Box<dyn bert::Embedder + Sync + Send>,
    pub llm: Box<dyn llm::Llm + Sync + Send>,
    pub extractor: Box<dyn QueryParameterExtractor + Sync + Send>,
    pub documents: Vec<corpus::Document>,
    pub index: index::VectorIndex,
    pub graph: graph::GraphStore,
}

impl std::fmt::Debug for LocalComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComponent")
            .field("documents", &self.documents.len())
            .field("drugs", &self.graph.drug_count())
            .finish_non_exhaustive()
    }
}

impl LocalComponent {
    /// Blocking initialization barrier: loads the corpus into documents,
    /// builds the vector index and ingests the graph before any query can
    /// be served. Failures here are fatal.
    pub fn build(
        mut embedder: Box<dyn bert::Embedder + Sync + Send>,
        llm: Box<dyn llm::Llm + Sync + Send>,
        records: Vec<corpus::DrugRecord>,
    ) -> Result<LocalComponent, RagError> {
        let documents = corpus::documents(records);
        let index = index::VectorIndex::build(embedder.as_mut(), &documents)?;
        let mut graph = graph::GraphStore::new();
        graph.ingest(&documents);
        info!(
            "retrieval engine ready: {} documents, {} drugs, {} side effects",
            documents.len(),
            graph.drug_count(),
            graph.side_effect_count()
        );
        Ok(LocalComponent {
            embedder,
            llm,
            extractor: Box::new(OfSplitExtractor),
            documents,
            index,
            graph,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::Result;

    use super::bert::Embedder;
    use super::corpus::{documents, Document, DrugRecord};
    use super::llm::Llm;
    use super::LocalComponent;

    /// Deterministic letter-frequency embedding, L2-normalized like the
    /// real encoder. Identical text embeds to an identical vector.
    pub(crate) struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0f32; 26];
            for c in text.chars().flat_map(|c| c.to_lowercase()) {
                if c.is_ascii_lowercase() {
                    v[(c as u8 - b'a') as usize] += 1.0;
                }
            }
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for x in &mut v {
                    *x /= norm;
                }
            }
            Ok(v)
        }
    }

    /// Canned completion service that counts how often it was invoked.
    pub(crate) struct StubLlm {
        pub reply: String,
        pub calls: usize,
    }

    impl StubLlm {
        pub(crate) fn replying(reply: &str) -> StubLlm {
            StubLlm {
                reply: reply.to_string(),
                calls: 0,
            }
        }
    }

    impl Llm for StubLlm {
        fn complete(&mut self, _prompt: &str, _max_tokens: usize) -> Result<String> {
            self.calls += 1;
            Ok(self.reply.clone())
        }
    }

    pub(crate) fn sample_records() -> Vec<DrugRecord> {
        [
            ("Paracetamol", "Nausea", "Mild stomach upset"),
            ("Ibuprofen", "Dizziness", "Spinning sensation on standing up"),
            ("Aspirin", "Bruising", "Easy bruising of the skin"),
            ("Amoxicillin", "Rash", "Itchy red skin rash"),
        ]
        .into_iter()
        .map(|(drug_name, side_effect, description)| DrugRecord {
            drug_name: drug_name.to_string(),
            side_effect: side_effect.to_string(),
            description: description.to_string(),
        })
        .collect()
    }

    pub(crate) fn sample_documents() -> Vec<Document> {
        documents(sample_records())
    }

    pub(crate) fn sample_component(reply: &str) -> LocalComponent {
        LocalComponent::build(
            Box::new(StubEmbedder),
            Box::new(StubLlm::replying(reply)),
            sample_records(),
        )
        .unwrap()
    }
}
