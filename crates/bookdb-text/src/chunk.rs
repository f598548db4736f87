//! Section-aligned chunking of chapter bodies for embedding.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use regex::Regex;

use bookdb_core::types::{Chapter, Chunk};

pub const DEFAULT_MAX_CHARS: usize = 1000;

/// Level-2 headings only; `###` and deeper stay inside their section.
#[allow(clippy::unwrap_used)]
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+)$").unwrap());

/// Splits chapter bodies into bounded fragments.
///
/// One chunker instance serves every document of an indexing run; its
/// counter hands out strictly increasing ids across all of them.
pub struct Chunker {
    max_chars: usize,
    counter: AtomicU64,
}

impl Chunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars, counter: AtomicU64::new(0) }
    }

    /// Chunk one chapter body.
    ///
    /// Text before the first `##` heading becomes a single
    /// `"Introduction"` chunk, hard-truncated with an ellipsis if it
    /// exceeds the budget — the only chunk handled that way. Each
    /// section's text is split by accumulating whole paragraphs; when a
    /// section yields more than one fragment, labels get a 1-based
    /// `" (part N)"` suffix.
    pub fn split_chapter(&self, chapter: &Chapter) -> Vec<Chunk> {
        let (intro, sections) = split_on_headings(&chapter.content);
        let mut chunks = Vec::new();

        let intro = intro.trim();
        if !intro.is_empty() {
            chunks.push(self.make_chunk(
                chapter,
                "Introduction".to_string(),
                truncate_chars(intro, self.max_chars),
            ));
        }

        for (section_name, text) in sections {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let fragments = split_long(text, self.max_chars);
            let multi = fragments.len() > 1;
            for (part, fragment) in fragments.into_iter().enumerate() {
                let label = if multi {
                    format!("{} (part {})", section_name, part + 1)
                } else {
                    section_name.clone()
                };
                chunks.push(self.make_chunk(chapter, label, fragment));
            }
        }
        chunks
    }

    fn make_chunk(&self, chapter: &Chapter, section: String, content: String) -> Chunk {
        Chunk {
            id: self.counter.fetch_add(1, Ordering::Relaxed) + 1,
            chapter_id: chapter.id.clone(),
            chapter_name: chapter.name.clone(),
            section,
            content,
            embedding: None,
            locale: chapter.locale.clone(),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

fn split_on_headings(body: &str) -> (String, Vec<(String, String)>) {
    let mut intro = String::new();
    let mut sections: Vec<(String, String)> = Vec::new();
    for line in body.lines() {
        if let Some(caps) = SECTION_RE.captures(line) {
            sections.push((caps[1].trim().to_string(), String::new()));
        } else if let Some((_, text)) = sections.last_mut() {
            text.push_str(line);
            text.push('\n');
        } else {
            intro.push_str(line);
            intro.push('\n');
        }
    }
    (intro, sections)
}

/// Accumulate whole paragraphs (blank-line separated) into fragments of
/// at most `max` characters. A single paragraph longer than `max` is
/// emitted as its own oversized fragment rather than split mid-sentence.
fn split_long(content: &str, max: usize) -> Vec<String> {
    if content.chars().count() <= max {
        return vec![content.to_string()];
    }
    let mut fragments = Vec::new();
    let mut current = String::new();
    for paragraph in content.split("\n\n") {
        let sep = if current.is_empty() { 0 } else { 2 };
        if !current.is_empty()
            && current.chars().count() + sep + paragraph.chars().count() > max
        {
            fragments.push(current.trim().to_string());
            current = paragraph.to_string();
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
        }
    }
    if !current.is_empty() {
        fragments.push(current.trim().to_string());
    }
    fragments
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max).collect();
    s.push_str("...");
    s
}
