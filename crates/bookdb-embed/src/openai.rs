//! Hosted embeddings backend (OpenAI-style `/v1/embeddings` API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use bookdb_core::error::{Error, Result};

use crate::EmbeddingClient;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::NotAvailable("api key contains invalid characters".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.embed_batch(&input).await?;
        if vectors.is_empty() {
            return Err(Error::Provider("no embeddings returned".into()));
        }
        Ok(vectors.remove(0))
    }

    /// One POST for the whole batch; the service may answer out of
    /// order, so vectors are re-slotted by the returned index.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = EmbeddingRequest { input: texts, model: &self.model };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("malformed embeddings response: {e}")))?;
        collect_vectors(body, texts.len())
    }
}

fn collect_vectors(body: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    if let Some(err) = body.error {
        return Err(Error::Provider(err.message));
    }
    let mut vectors = vec![Vec::new(); expected];
    for entry in body.data {
        if entry.index >= expected {
            return Err(Error::Provider(format!(
                "embedding index {} out of range for {} inputs",
                entry.index, expected
            )));
        }
        vectors[entry.index] = entry.embedding;
    }
    if vectors.iter().any(Vec::is_empty) {
        return Err(Error::Provider(format!(
            "provider returned fewer than {expected} embeddings"
        )));
    }
    Ok(vectors)
}
