//! Dense retrieval over the flat vector index.

use tracing::info;

use crate::component::LocalComponent;
use crate::error::RagError;

/// How many documents the dense strategy hands to the synthesizer.
pub const TOP_K: usize = 3;

/// Embeds the question and returns the `text` of the `TOP_K` closest
/// documents, closest first.
pub fn retrieve(question: &str, comps: &mut LocalComponent) -> Result<Vec<String>, RagError> {
    let hits = comps
        .index
        .search(comps.embedder.as_mut(), question, TOP_K)?;
    info!("dense retrieval returned {} documents", hits.len());
    Ok(hits
        .into_iter()
        .map(|(id, _distance)| comps.documents[id].text.clone())
        .collect())
}
