//! Chapter parsing for the raw `.mdx` corpus.
//!
//! Front matter sits between a `---` line at the very start and the next
//! `---` occurrence. The block is not valid YAML or JSON as written: it
//! mixes quoted scalars with an array-of-objects literal using bare keys
//! and single quotes. Parsing is therefore two-phase: a tolerant
//! delimiter/pattern scan first, then a strict `serde_json` decode of a
//! normalized copy of the section-list literal.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use walkdir::WalkDir;

use bookdb_core::error::{Error, ParseReason, Result};
use bookdb_core::slug::slugify;
use bookdb_core::types::{BookIndex, Chapter, Section};

#[allow(clippy::unwrap_used)]
pub(crate) static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").unwrap());

#[allow(clippy::unwrap_used)]
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^id:\s*['"]([^'"]+)['"]"#).unwrap());

#[allow(clippy::unwrap_used)]
static ORDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^order:\s*(\d+)").unwrap());

#[allow(clippy::unwrap_used)]
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^name:\s*['"]([^'"]+)['"]"#).unwrap());

/// Reads and parses chapters from `<book_dir>/<locale>/<chapter>.mdx`.
///
/// Stateless apart from the corpus root: every listing re-reads and
/// re-parses the files, so edits on disk are picked up immediately.
pub struct BookParser {
    book_dir: PathBuf,
}

#[derive(Debug)]
struct FrontMatter {
    id: String,
    order: i64,
    name: String,
    sections: Vec<Section>,
}

impl BookParser {
    pub fn new(book_dir: impl Into<PathBuf>) -> Self {
        Self { book_dir: book_dir.into() }
    }

    /// Parse one raw chapter file into a [`Chapter`].
    pub fn parse_chapter(&self, path: &Path, locale: &str) -> Result<Chapter> {
        let raw = std::fs::read_to_string(path)?;
        let shown = path.display().to_string();
        let (fm, body) = parse_front_matter(&raw, &shown)?;
        Ok(Chapter {
            id: fm.id,
            order: fm.order,
            name: fm.name,
            locale: locale.to_string(),
            sections: fm.sections,
            content: body.to_string(),
            path: shown,
        })
    }

    /// All chapters for a locale, sorted ascending by their ordering key.
    ///
    /// A file that fails to parse is skipped with a warning; one bad
    /// chapter never blocks the rest of the listing.
    pub fn list_chapters(&self, locale: &str) -> Result<Vec<Chapter>> {
        let locale_dir = self.book_dir.join(locale);
        if !locale_dir.is_dir() {
            return Err(Error::NotFound(format!("locale directory {}", locale_dir.display())));
        }
        let mut chapters = Vec::new();
        for entry in WalkDir::new(&locale_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("mdx") {
                continue;
            }
            match self.parse_chapter(path, locale) {
                Ok(chapter) => chapters.push(chapter),
                Err(err) => {
                    tracing::warn!(file = %path.display(), %err, "skipping unparseable chapter");
                }
            }
        }
        chapters.sort_by_key(|c| c.order);
        Ok(chapters)
    }

    /// Fetch one chapter by identifier. Re-lists and linear-searches;
    /// the corpus is small enough that this stays cheap.
    pub fn get_chapter(&self, chapter_id: &str, locale: &str) -> Result<Chapter> {
        let chapters = self.list_chapters(locale)?;
        chapters
            .into_iter()
            .find(|c| c.id == chapter_id)
            .ok_or_else(|| Error::NotFound(format!("chapter {chapter_id}")))
    }

    /// Extract one section of a chapter by heading slug.
    ///
    /// Scans the body line by line, slugifying every heading (any level,
    /// 1-6 marks) with the same rule used for the outline; returns the
    /// run of lines from the first matching heading up to, exclusive,
    /// the next heading at any level. First match wins when two headings
    /// normalize to the same slug.
    pub fn get_section(&self, chapter_id: &str, section_slug: &str, locale: &str) -> Result<String> {
        let chapter = self.get_chapter(chapter_id, locale)?;
        let mut in_section = false;
        let mut collected = String::new();
        for line in chapter.content.lines() {
            if let Some(caps) = HEADING_RE.captures(line) {
                if !in_section && slugify(&caps[1]) == section_slug {
                    in_section = true;
                    collected.push_str(line);
                    collected.push('\n');
                    continue;
                }
                if in_section {
                    break;
                }
                continue;
            }
            if in_section {
                collected.push_str(line);
                collected.push('\n');
            }
        }
        if collected.is_empty() {
            return Err(Error::NotFound(format!("section {section_slug}")));
        }
        Ok(collected.trim().to_string())
    }

    /// Locales available under the corpus root (one subdirectory each).
    pub fn available_locales(&self) -> Result<Vec<String>> {
        let mut locales = Vec::new();
        for entry in std::fs::read_dir(&self.book_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Ok(name) = entry.file_name().into_string() {
                    locales.push(name);
                }
            }
        }
        locales.sort();
        Ok(locales)
    }

    /// Metadata-only table of contents: full chapter list with the body
    /// text cleared.
    pub fn book_index(&self, locale: &str) -> Result<BookIndex> {
        let mut chapters = self.list_chapters(locale)?;
        for chapter in &mut chapters {
            chapter.content.clear();
        }
        Ok(BookIndex { locale: locale.to_string(), total_chapters: chapters.len(), chapters })
    }
}

fn parse_front_matter<'a>(raw: &'a str, path: &str) -> Result<(FrontMatter, &'a str)> {
    let rest = raw
        .strip_prefix("---")
        .ok_or_else(|| Error::parse(path, ParseReason::MissingDelimiter))?;
    // First occurrence wins; a marker inside a quoted value is not
    // supported (documented limitation).
    let end = rest
        .find("---")
        .ok_or_else(|| Error::parse(path, ParseReason::UnterminatedFrontMatter))?;
    let block = &rest[..end];
    let body = rest[end + 3..].trim_start();

    let id = ID_RE.captures(block).map(|c| c[1].to_string()).unwrap_or_default();
    let order = ORDER_RE
        .captures(block)
        .and_then(|c| c[1].parse::<i64>().ok())
        .unwrap_or_default();
    let name = NAME_RE.captures(block).map(|c| c[1].to_string()).unwrap_or_default();
    let sections = extract_section_list(block, path);

    Ok((FrontMatter { id, order, name, sections }, body))
}

/// Locate the `titleList:` array literal by bracket-depth walking and
/// decode it. Nesting is handled; brackets inside quoted string values
/// are not (documented limitation). Any failure here degrades to an
/// empty outline with a diagnostic instead of failing the whole parse.
fn extract_section_list(block: &str, path: &str) -> Vec<Section> {
    let Some(key_pos) = block.find("titleList:") else {
        return Vec::new();
    };
    let after_key = &block[key_pos..];
    let Some(open_rel) = after_key.find('[') else {
        return Vec::new();
    };
    let literal = &after_key[open_rel..];
    let mut depth = 0usize;
    let mut close = None;
    for (i, b) in literal.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(i + 1);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        tracing::warn!(file = path, "unclosed section list literal, using empty outline");
        return Vec::new();
    };
    let normalized = normalize_section_literal(&literal[..close]);
    decode_section_list(&normalized).unwrap_or_else(|err| {
        tracing::warn!(file = path, %err, "undecodable section list, using empty outline");
        Vec::new()
    })
}

/// Rewrite the tolerated literal into strict JSON: double quotes, quoted
/// keys, whitespace collapsed.
fn normalize_section_literal(literal: &str) -> String {
    #[allow(clippy::unwrap_used)]
    static BARE_NAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([\s{])name:").unwrap());
    #[allow(clippy::unwrap_used)]
    static BARE_TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([\s{])tagId:").unwrap());
    #[allow(clippy::unwrap_used)]
    static WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

    let mut out = literal.replace('\'', "\"");
    out = BARE_NAME.replace_all(&out, "$1\"name\":").into_owned();
    out = BARE_TAG.replace_all(&out, "$1\"tagId\":").into_owned();
    WS.replace_all(&out, " ").into_owned()
}

fn decode_section_list(json: &str) -> std::result::Result<Vec<Section>, serde_json::Error> {
    #[derive(Deserialize)]
    struct RawSection {
        #[serde(default)]
        name: String,
        #[serde(default, rename = "tagId")]
        tag_id: String,
    }
    let raw: Vec<RawSection> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|s| Section { name: s.name, slug: s.tag_id })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_quotes_and_bare_keys() {
        let literal = "[\n  { name: 'Intro', tagId: 'intro' },\n  {name: 'Close', tagId: 'close'}\n]";
        let normalized = normalize_section_literal(literal);
        let sections = decode_section_list(&normalized).expect("strict decode");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], Section { name: "Intro".into(), slug: "intro".into() });
        assert_eq!(sections[1].slug, "close");
    }

    #[test]
    fn front_matter_requires_leading_delimiter() {
        let err = parse_front_matter("id: 'x'\n---\nbody", "f.mdx").unwrap_err();
        assert!(matches!(err, Error::Parse { reason: ParseReason::MissingDelimiter, .. }));
    }

    #[test]
    fn front_matter_requires_closing_delimiter() {
        let err = parse_front_matter("---\nid: 'x'\nbody", "f.mdx").unwrap_err();
        assert!(matches!(err, Error::Parse { reason: ParseReason::UnterminatedFrontMatter, .. }));
    }

    #[test]
    fn undecodable_section_list_degrades_to_empty() {
        let raw = "---\nid: 'ch'\norder: 1\nname: 'Chapter'\ntitleList:\n  [ { name: 'A', tagId: } ]\n---\nBody text.";
        let (fm, body) = parse_front_matter(raw, "f.mdx").expect("parse still succeeds");
        assert_eq!(fm.id, "ch");
        assert!(fm.sections.is_empty());
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn balanced_nested_brackets_survive_the_depth_walk() {
        let raw = "---\nid: 'ch'\norder: 2\nname: 'N'\ntitleList:\n  [ { name: 'Arrays [deep]', tagId: 'arrays-deep' } ]\n---\nBody.";
        let (fm, _) = parse_front_matter(raw, "f.mdx").expect("parse");
        assert_eq!(fm.sections.len(), 1);
        assert_eq!(fm.sections[0].slug, "arrays-deep");
    }

    #[test]
    fn unbalanced_bracket_inside_quotes_truncates_the_literal() {
        // Documented limitation: a stray `]` inside a quoted value closes
        // the depth walk early. The parse still succeeds; the outline is
        // dropped because the truncated literal is not valid JSON.
        let raw = "---\nid: 'ch'\norder: 3\nname: 'N'\ntitleList:\n  [ { name: 'bad ] here', tagId: 'bad' } ]\n---\nBody.";
        let (fm, _) = parse_front_matter(raw, "f.mdx").expect("parse");
        assert!(fm.sections.is_empty());
    }
}
