//! Domain types shared by the parser, chunker and search engines.

use serde::{Deserialize, Serialize};

/// A book chapter parsed from one raw `.mdx` file.
///
/// - `id`: chapter identifier, unique within a locale
/// - `order`: integer ordering key driving display order
/// - `sections`: outline extracted from the front matter
/// - `content`: full body text, markup and headings retained
///
/// Chapters are immutable once parsed and re-derived on every listing;
/// nothing is cached between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub order: i64,
    pub name: String,
    pub locale: String,
    pub sections: Vec<Section>,
    pub content: String,
    pub path: String,
}

/// A section heading: display name plus its derived slug.
///
/// Slugs are not guaranteed unique within a chapter; lookups take the
/// first heading whose slug matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub slug: String,
}

/// One lexical keyword match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chapter_id: String,
    pub chapter_name: String,
    /// Heading in effect at the matched line, empty before the first one.
    pub section: String,
    pub snippet: String,
    /// 1-based line number within the chapter body.
    pub line: usize,
    /// Fraction of query terms found on the line, in (0, 1].
    pub relevance: f64,
    pub locale: String,
}

/// A bounded fragment of a chapter body prepared for embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Monotonic, process-lifetime-unique counter value.
    pub id: u64,
    pub chapter_id: String,
    pub chapter_name: String,
    /// Section name, `"Introduction"` for pre-heading text, with a
    /// `" (part N)"` suffix when the section itself was split.
    pub section: String,
    pub content: String,
    /// Absent until the chunk has been through an embedding provider.
    pub embedding: Option<Vec<f32>>,
    pub locale: String,
}

/// One semantic match, scored by cosine similarity in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticHit {
    pub chapter_id: String,
    pub chapter_name: String,
    pub section: String,
    pub content: String,
    pub score: f32,
    pub locale: String,
}

/// Metadata-only table of contents for one locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookIndex {
    pub locale: String,
    pub total_chapters: usize,
    pub chapters: Vec<Chapter>,
}
