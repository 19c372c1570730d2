//! Flat vector index with exact squared-L2 search.
//!
//! The corpus is small, so an exhaustive scan is exact, deterministic and
//! trivially testable. Embeddings are stored in corpus order; the position
//! in the index IS the document id.

use tracing::info;

use super::bert::Embedder;
use super::corpus::Document;
use crate::error::RagError;

#[derive(Debug)]
pub struct VectorIndex {
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
}

impl VectorIndex {
    /// Embeds every document and builds the flat index. Fails when the
    /// corpus is empty or the embedder emits inconsistent dimensions.
    pub fn build(
        embedder: &mut dyn Embedder,
        documents: &[Document],
    ) -> Result<VectorIndex, RagError> {
        if documents.is_empty() {
            return Err(RagError::IndexBuild("corpus is empty".to_string()));
        }
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(documents.len());
        let mut dimension = 0;
        for doc in documents {
            let embedding = embedder
                .embed(&doc.text)
                .map_err(|e| RagError::IndexBuild(format!("embedding document {}: {e}", doc.id)))?;
            if embeddings.is_empty() {
                dimension = embedding.len();
            } else if embedding.len() != dimension {
                return Err(RagError::IndexBuild(format!(
                    "document {} embedded to dimension {}, index dimension is {}",
                    doc.id,
                    embedding.len(),
                    dimension
                )));
            }
            embeddings.push(embedding);
        }
        info!(
            "built flat index over {} documents, dimension {}",
            embeddings.len(),
            dimension
        );
        Ok(VectorIndex {
            embeddings,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns up to `k` document ids ascending by squared-L2 distance to
    /// the query embedding, ties broken by ascending id. Read-only.
    pub fn search(
        &self,
        embedder: &mut dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<(usize, f32)>, RagError> {
        if k == 0 {
            return Ok(vec![]);
        }
        let query_embedding = embedder.embed(query)?;
        if query_embedding.len() != self.dimension {
            return Err(RagError::InvalidRequest(format!(
                "query embedded to dimension {}, index dimension is {}",
                query_embedding.len(),
                self.dimension
            )));
        }
        let mut scored = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(id, embedding)| (id, squared_l2(&query_embedding, embedding)))
            .collect::<Vec<(usize, f32)>>();
        // stable sort keeps the id order of equidistant documents
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::super::testing::{sample_documents, StubEmbedder};
    use super::*;

    fn build_index(documents: &[Document]) -> (VectorIndex, StubEmbedder) {
        let mut embedder = StubEmbedder;
        let index = VectorIndex::build(&mut embedder, documents).unwrap();
        (index, embedder)
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let mut embedder = StubEmbedder;
        let err = VectorIndex::build(&mut embedder, &[]).unwrap_err();
        assert!(matches!(err, RagError::IndexBuild(_)));
    }

    #[test]
    fn test_search_is_deterministic() {
        let documents = sample_documents();
        let (index, mut embedder) = build_index(&documents);
        let first = index.search(&mut embedder, "nausea after tablets", 3).unwrap();
        let second = index.search(&mut embedder, "nausea after tablets", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distances_monotonic() {
        let documents = sample_documents();
        let (index, mut embedder) = build_index(&documents);
        let hits = index.search(&mut embedder, "dizziness", documents.len()).unwrap();
        for pair in hits.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let documents = sample_documents();
        let (index, mut embedder) = build_index(&documents);
        assert!(index.search(&mut embedder, "anything", 0).unwrap().is_empty());
    }

    #[test]
    fn test_k_beyond_corpus_returns_all() {
        let documents = sample_documents();
        let (index, mut embedder) = build_index(&documents);
        let hits = index.search(&mut embedder, "anything", documents.len() + 10).unwrap();
        assert_eq!(hits.len(), documents.len());
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let documents = sample_documents();
        let (index, mut embedder) = build_index(&documents);
        let query = documents[2].text.clone();
        let hits = index.search(&mut embedder, &query, 1).unwrap();
        assert_eq!(hits[0].0, 2);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let mut documents = sample_documents();
        // duplicate text embeds identically, so ids decide the order
        let copy = documents[1].text.clone();
        documents[0].text = copy;
        let (index, mut embedder) = build_index(&documents);
        let query = documents[0].text.clone();
        let hits = index.search(&mut embedder, &query, 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
        assert_eq!(hits[0].1, hits[1].1);
    }
}
