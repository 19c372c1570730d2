//! The text generation service consumed by the answer synthesizer.
//!
//! Generation is opaque to the engine: a prompt goes in, bounded text comes
//! out. The service is not trusted to follow the prompt template, which is
//! why [`extract_answer`] exists as a separate, testable step.

use anyhow::{anyhow, Result};
use openai_api_rust::{
    chat::{ChatApi, ChatBody},
    Auth, Message, OpenAI, Role,
};

use crate::error::RagError;

/// An opaque, potentially slow, synchronous completion service.
pub trait Llm {
    fn complete(&mut self, prompt: &str, max_tokens: usize) -> Result<String>;
}

const API_ENDPOINT: &str = "https://api.deepseek.com/v1/";

const MODEL_NAME: &str = "deepseek-chat";

/// OpenAI-compatible chat completion client.
pub struct CloudLlm {
    openai: OpenAI,
    model: String,
}

impl CloudLlm {
    pub fn new(api_key: &str) -> CloudLlm {
        CloudLlm::with_endpoint(api_key, API_ENDPOINT, MODEL_NAME)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str, model: &str) -> CloudLlm {
        let auth = Auth::new(api_key);
        let openai = OpenAI::new(auth, endpoint);
        CloudLlm {
            openai,
            model: model.to_string(),
        }
    }
}

impl Llm for CloudLlm {
    fn complete(&mut self, prompt: &str, max_tokens: usize) -> Result<String> {
        let body = ChatBody {
            model: self.model.clone(),
            messages: vec![Message {
                role: Role::User,
                content: prompt.to_string(),
            }],
            temperature: None,
            top_p: None,
            n: None,
            stream: None,
            stop: None,
            max_tokens: Some(max_tokens as i32),
            presence_penalty: None,
            frequency_penalty: None,
            logit_bias: None,
            user: None,
        };

        let resp = self
            .openai
            .chat_completion_create(&body)
            .map_err(|e| anyhow!("chat completion failed: {e:?}"))?;
        let message = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;
        Ok(message.content)
    }
}

const ANSWER_MARKER: &str = "Answer:";

/// Takes the substring after the last `Answer:` marker, trimmed.
///
/// The prompt template ends with the marker, so a service that follows it
/// emits the answer right after its copy of the context. A missing marker
/// means the service ignored the template; callers recover locally instead
/// of propagating this.
pub fn extract_answer(generated: &str) -> Result<&str, RagError> {
    match generated.rfind(ANSWER_MARKER) {
        Some(pos) => Ok(generated[pos + ANSWER_MARKER.len()..].trim()),
        None => Err(RagError::Synthesis(format!(
            "no {ANSWER_MARKER:?} marker in {} generated characters",
            generated.len()
        ))),
    }
}

#[test]
fn test_extract_answer() {
    let generated = "Information:\nParacetamol: Mild stomach upset\n\nAnswer: Headache and nausea.";
    assert_eq!(extract_answer(generated).unwrap(), "Headache and nausea.");
}

#[test]
fn test_extract_answer_takes_last_marker() {
    let generated = "Answer: not this one\nAnswer:   the real one  ";
    assert_eq!(extract_answer(generated).unwrap(), "the real one");
}

#[test]
fn test_extract_answer_missing_marker() {
    let err = extract_answer("the model rambled off-template").unwrap_err();
    assert!(matches!(err, RagError::Synthesis(_)));
}
