//! Semantic engine: one embedding client plus one vector store.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use bookdb_core::error::{Error, Result};
use bookdb_core::types::{Chunk, SemanticHit};
use bookdb_embed::{probe, EmbeddingClient};

use crate::store::VectorStore;

/// Provider calls per indexing batch unless configured otherwise.
const DEFAULT_EMBED_BATCH_SIZE: usize = 100;

pub struct SemanticEngine {
    client: Box<dyn EmbeddingClient>,
    store: VectorStore,
    batch_size: usize,
    indexed: AtomicBool,
    /// Serializes whole indexing runs; two rebuilds must never
    /// interleave their batch sequences.
    index_lock: Mutex<()>,
}

impl SemanticEngine {
    pub fn new(client: Box<dyn EmbeddingClient>) -> Self {
        Self::with_batch_size(client, DEFAULT_EMBED_BATCH_SIZE)
    }

    pub fn with_batch_size(client: Box<dyn EmbeddingClient>, batch_size: usize) -> Self {
        Self {
            client,
            store: VectorStore::new(),
            batch_size: batch_size.max(1),
            indexed: AtomicBool::new(false),
            index_lock: Mutex::new(()),
        }
    }

    /// Embed and store chunks, in fixed-size sequential batches.
    ///
    /// Each batch is embedded, written back into its chunks, and
    /// appended to the store before the next batch starts. A failure
    /// aborts the call: batches already appended stay visible, but the
    /// indexed flag only flips after every batch succeeded. No retry
    /// happens here; the caller decides what a failed rebuild means.
    pub async fn index_chunks(&self, mut chunks: Vec<Chunk>) -> Result<usize> {
        let _guard = self.index_lock.lock().await;
        let total = chunks.len();
        for batch in chunks.chunks_mut(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.client.embed_batch(&texts).await?;
            for (chunk, vector) in batch.iter_mut().zip(vectors) {
                chunk.embedding = Some(vector);
            }
            self.store.append_batch(batch.to_vec()).await;
            tracing::debug!(appended = batch.len(), "indexed embedding batch");
        }
        self.indexed.store(true, Ordering::SeqCst);
        tracing::info!(chunks = total, provider = self.client.name(), "semantic index built");
        Ok(total)
    }

    /// Embed the query and rank stored chunks.
    ///
    /// Fails with `NotIndexed` until some `index_chunks` call has fully
    /// succeeded; an empty store is never silently reported as "no
    /// results".
    pub async fn search(&self, query: &str, locale: &str, k: usize) -> Result<Vec<SemanticHit>> {
        if !self.indexed.load(Ordering::SeqCst) {
            return Err(Error::NotIndexed);
        }
        let query_vec = self.client.embed(query).await?;
        Ok(self.store.search(&query_vec, locale, k).await)
    }

    /// Probe the backend with a trivial embedding under a short timeout.
    pub async fn is_available(&self) -> bool {
        probe(self.client.as_ref()).await
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed.load(Ordering::SeqCst)
    }

    pub async fn chunk_count(&self) -> usize {
        self.store.count().await
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.name()
    }
}
