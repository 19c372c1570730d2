//! Sentence embedding through a BERT encoder.
//!
//! The index and the query side must share one embedding function, so both
//! go through the [`Embedder`] trait. The production implementation runs
//! `sentence-transformers/all-MiniLM-L6-v2` on CPU via candle.

use anyhow::{Error as E, Result};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, HiddenAct, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;

/// A fixed, deterministic embedding function. Identical input must produce
/// an identical vector, and every vector has the same dimension.
pub trait Embedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;
}

pub struct BertEmbedder {
    tokenizer: Tokenizer,
    model: BertModel,
}

impl BertEmbedder {
    pub fn new(model_id: Option<String>, revision: Option<String>) -> Result<BertEmbedder> {
        let (model, tokenizer) = build_model_and_tokenizer(model_id, revision)?;
        Ok(BertEmbedder { tokenizer, model })
    }
}

impl Embedder for BertEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let embedding = encode_single_sentence(text, &mut self.tokenizer, &self.model)?;
        Ok(embedding.to_vec1::<f32>()?)
    }
}

fn build_model_and_tokenizer(
    model_id: Option<String>,
    revision: Option<String>,
) -> Result<(BertModel, Tokenizer)> {
    let device = Device::Cpu;
    let default_model = "sentence-transformers/all-MiniLM-L6-v2".to_string();
    let default_revision = "refs/pr/21".to_string();
    let (model_id, revision) = match (model_id, revision) {
        (Some(model_id), Some(revision)) => (model_id, revision),
        (Some(model_id), None) => (model_id, "main".to_string()),
        (None, Some(revision)) => (default_model, revision),
        (None, None) => (default_model, default_revision),
    };

    let repo = Repo::with_revision(model_id, RepoType::Model, revision);
    let (config_filename, tokenizer_filename, weights_filename) = {
        let api = Api::new()?;
        let api = api.repo(repo);
        let config = api.get("config.json")?;
        let tokenizer = api.get("tokenizer.json")?;
        let weights = api.get("model.safetensors")?;
        (config, tokenizer, weights)
    };
    let config = std::fs::read_to_string(config_filename)?;
    let mut config: Config = serde_json::from_str(&config)?;
    config.hidden_act = HiddenAct::GeluApproximate;

    let tokenizer = Tokenizer::from_file(tokenizer_filename).map_err(E::msg)?;

    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_filename], DTYPE, &device)? };
    let model = BertModel::load(vb, &config)?;
    Ok((model, tokenizer))
}

fn normalize_l2(v: &Tensor) -> Result<Tensor> {
    Ok(v.broadcast_div(&v.sqr()?.sum_all()?.sqrt()?)?)
}

fn encode_single_sentence(s: &str, tokenizer: &mut Tokenizer, model: &BertModel) -> Result<Tensor> {
    let device = &model.device;
    let tokenizer = tokenizer
        .with_padding(None)
        .with_truncation(None)
        .map_err(E::msg)?;
    let tokens = tokenizer
        .encode(s, true)
        .map_err(E::msg)?
        .get_ids()
        .to_vec();
    let token_ids = Tensor::new(&tokens[..], device)?.unsqueeze(0)?;
    let token_type_ids = token_ids.zeros_like()?;
    let embedding = model
        .forward(&token_ids, &token_type_ids, None)
        .map_err(E::msg)?;
    let pooled_embedding = embedding.sum((0, 1))? / (tokens.len() as f64);
    let normalized_embedding = normalize_l2(&pooled_embedding?);
    normalized_embedding.map_err(E::msg)
}
