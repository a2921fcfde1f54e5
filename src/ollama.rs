//! Language model access.
//!
//! [`LanguageModel`] is what the QA engine needs: text generation and
//! embeddings. [`OllamaClient`] implements it against a local Ollama server.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use url::Url;

pub const DEFAULT_LLM_MODEL: &str = "llama3.1";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid model URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("model returned {got} embeddings for {expected} inputs")]
    EmbeddingCount { expected: usize, got: usize },
    #[error("model error: {0}")]
    Api(String),
}

pub trait LanguageModel: Send + Sync {
    /// Name of the embedding model, used to key cached vectors.
    fn embedding_model(&self) -> &str;

    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, ModelError>> + Send;

    /// One vector per input, in input order.
    fn embed(
        &self,
        inputs: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, ModelError>> + Send;
}

// ============================================================================
// Ollama
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    error: Option<String>,
}

pub struct OllamaClient {
    client: reqwest::Client,
    base: Url,
    llm_model: String,
    embed_model: String,
}

impl OllamaClient {
    pub fn new(base: Url, llm_model: &str, embed_model: &str) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            base,
            llm_model: llm_model.to_string(),
            embed_model: embed_model.to_string(),
        })
    }
}

impl LanguageModel for OllamaClient {
    fn embedding_model(&self) -> &str {
        &self.embed_model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = self.base.join("api/generate")?;
        let body = GenerateRequest {
            model: &self.llm_model,
            prompt,
            stream: false,
        };
        let reply: GenerateResponse = self.client.post(url).json(&body).send().await?.json().await?;
        match reply.error {
            Some(e) => Err(ModelError::Api(e)),
            None => Ok(reply.response),
        }
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.base.join("api/embed")?;
        let body = EmbedRequest {
            model: &self.embed_model,
            input: inputs,
        };
        let reply: EmbedResponse = self.client.post(url).json(&body).send().await?.json().await?;
        if let Some(e) = reply.error {
            return Err(ModelError::Api(e));
        }
        if reply.embeddings.len() != inputs.len() {
            return Err(ModelError::EmbeddingCount {
                expected: inputs.len(),
                got: reply.embeddings.len(),
            });
        }
        Ok(reply.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_disables_streaming() {
        let body = GenerateRequest {
            model: DEFAULT_LLM_MODEL,
            prompt: "hi",
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"model": "llama3.1", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn test_embed_response_parses() {
        let reply: EmbedResponse =
            serde_json::from_str(r#"{"model":"nomic-embed-text","embeddings":[[0.1,0.2]]}"#)
                .unwrap();
        assert_eq!(reply.embeddings, vec![vec![0.1f32, 0.2]]);
        assert!(reply.error.is_none());
    }

    #[tokio::test]
    async fn test_embed_of_nothing_skips_request() {
        // Port 9 (discard) is never contacted because the input is empty
        let client = OllamaClient::new(
            Url::parse("http://127.0.0.1:9/").unwrap(),
            DEFAULT_LLM_MODEL,
            DEFAULT_EMBED_MODEL,
        )
        .unwrap();
        assert!(client.embed(&[]).await.unwrap().is_empty());
    }
}
