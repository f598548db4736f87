//! In-memory, exhaustive-scan vector store.
//!
//! Linear scan over every stored chunk is deliberate: the corpus is a
//! few thousand fragments at most and an ANN structure would buy
//! nothing at that scale.

use tokio::sync::RwLock;

use bookdb_core::types::{Chunk, SemanticHit};

/// Insertion-ordered chunk collection behind a reader/writer lock.
///
/// Any number of searches proceed concurrently; an append takes the
/// write lock, so readers observe either none or all of a batch, never
/// part of one. Duplicate contents are allowed; nothing dedups.
#[derive(Default)]
pub struct VectorStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch as one atomic visibility step.
    pub async fn append_batch(&self, batch: Vec<Chunk>) {
        let mut chunks = self.chunks.write().await;
        chunks.extend(batch);
    }

    /// Rank stored chunks by cosine similarity against `query`.
    ///
    /// An empty `locale` matches every locale. Chunks without an
    /// embedding (or with a mismatched dimensionality) score 0 rather
    /// than being an error. `k == 0` returns nothing; `k >= count`
    /// returns everything.
    pub async fn search(&self, query: &[f32], locale: &str, k: usize) -> Vec<SemanticHit> {
        let chunks = self.chunks.read().await;
        let mut hits: Vec<SemanticHit> = chunks
            .iter()
            .filter(|c| locale.is_empty() || c.locale == locale)
            .map(|c| {
                let score = match &c.embedding {
                    Some(v) => cosine_similarity(query, v),
                    None => 0.0,
                };
                SemanticHit {
                    chapter_id: c.chapter_id.clone(),
                    chapter_name: c.chapter_name.clone(),
                    section: c.section.clone(),
                    content: c.content.clone(),
                    score,
                    locale: c.locale.clone(),
                }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }

    pub async fn count(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Drop everything. Not used by the normal indexing flow.
    pub async fn clear(&self) {
        self.chunks.write().await.clear();
    }
}

/// dot(a,b) / (‖a‖·‖b‖); 0 when lengths differ or either magnitude is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
