//! Local inference backend (Ollama-style `/api/embeddings` service).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bookdb_core::error::{Error, Result};

use crate::EmbeddingClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
    #[serde(default)]
    error: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest { model: &self.model, prompt: text };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::Transport(format!("embedding service unreachable at {}", self.endpoint))
                } else {
                    Error::Transport(e.to_string())
                }
            })?;
        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("malformed embeddings response: {e}")))?;
        if !body.error.is_empty() {
            return Err(Error::Provider(body.error));
        }
        Ok(body.embedding)
    }

    /// No native batch call exists; this degrades to sequential single
    /// requests and fails fast on the first error, so items after the
    /// failing index are never sent.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            match self.embed(text).await {
                Ok(vector) => vectors.push(vector),
                Err(err) => {
                    return Err(Error::BatchItem { index, source: Box::new(err) });
                }
            }
        }
        Ok(vectors)
    }
}
