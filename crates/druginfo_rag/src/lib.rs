//! Hybrid retrieval engine for natural-language questions about drug side
//! effects.
//!
//! Evidence comes from one of two backends: a flat vector index over the
//! document texts ([`component::index`]) or a typed drug→side-effect graph
//! ([`component::graph`]). [`method`] routes a question to one of them and
//! hands the evidence to the generation service for the final answer.

pub mod component;
pub mod error;
pub mod method;

pub use error::RagError;
