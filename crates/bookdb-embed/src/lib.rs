#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Embedding-provider capability: turn text into a fixed-length vector.
//!
//! Two backends implement it: an OpenAI-style hosted API (`openai`) and
//! an Ollama-style local inference service (`ollama`). Which one a
//! process uses is a configuration decision made once at construction,
//! not something call sites sniff from the environment.

pub mod ollama;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use bookdb_core::config::EmbeddingSettings;
use bookdb_core::error::{Error, Result};

/// How long the availability probe waits before declaring the backend
/// unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Short provider label for status reporting (`"openai"`, `"ollama"`).
    fn name(&self) -> &'static str;

    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch, order-preserving: `out[i]` belongs to `texts[i]`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Probe the backend by embedding a trivial fixed string under a short
/// timeout. Success means the provider is reachable and answering.
pub async fn probe(client: &dyn EmbeddingClient) -> bool {
    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, client.embed("test")).await,
        Ok(Ok(_))
    )
}

/// Construct the configured backend.
///
/// `provider = "openai"` without an API key is a configuration error,
/// reported as `NotAvailable` here rather than on the first request.
pub fn client_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn EmbeddingClient>> {
    match settings.provider.as_str() {
        "openai" => {
            let api_key = settings
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| Error::NotAvailable("openai provider needs an api key".into()))?;
            Ok(Box::new(openai::OpenAiClient::new(api_key)?))
        }
        "ollama" => Ok(Box::new(ollama::OllamaClient::new(
            &settings.base_url,
            &settings.model,
        )?)),
        other => Err(Error::NotAvailable(format!("unknown embedding provider: {other}"))),
    }
}
