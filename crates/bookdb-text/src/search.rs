//! Lexical keyword search over chapter bodies.

use bookdb_core::error::Result;
use bookdb_core::types::SearchHit;

use crate::parser::{BookParser, HEADING_RE};

/// Hits returned per query, after ranking.
const MAX_RESULTS: usize = 20;
/// Snippet budget in characters; longer lines get an ellipsis.
const SNIPPET_MAX_CHARS: usize = 200;

/// Scan every chapter body in `locale` for the query terms.
///
/// The query is split into lowercase whitespace-separated terms
/// (duplicates removed). Each body line scores the fraction of terms it
/// contains as substrings; the heading most recently seen above the line
/// is reported as its section. Hits come back sorted by relevance
/// descending (stable, so encounter order breaks ties) and capped at 20.
/// No match is an empty vec, never an error.
pub fn keyword_search(parser: &BookParser, query: &str, locale: &str) -> Result<Vec<SearchHit>> {
    let mut terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let mut seen = std::collections::HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let chapters = parser.list_chapters(locale)?;
    let mut hits = Vec::new();
    for chapter in &chapters {
        let mut current_section = String::new();
        for (idx, line) in chapter.content.lines().enumerate() {
            if let Some(caps) = HEADING_RE.captures(line) {
                current_section = caps[1].to_string();
            }
            let line_lower = line.to_lowercase();
            let matched = terms.iter().filter(|t| line_lower.contains(t.as_str())).count();
            if matched == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let relevance = matched as f64 / terms.len() as f64;
            hits.push(SearchHit {
                chapter_id: chapter.id.clone(),
                chapter_name: chapter.name.clone(),
                section: current_section.clone(),
                snippet: snippet_of(line),
                line: idx + 1,
                relevance,
                locale: locale.to_string(),
            });
        }
    }

    hits.sort_by(|a, b| {
        b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(MAX_RESULTS);
    Ok(hits)
}

fn snippet_of(line: &str) -> String {
    if line.chars().count() <= SNIPPET_MAX_CHARS {
        return line.to_string();
    }
    let mut s: String = line.chars().take(SNIPPET_MAX_CHARS).collect();
    s.push_str("...");
    s
}
