use std::fs;
use std::path::Path;

use tempfile::TempDir;

use bookdb_core::slug::slugify;
use bookdb_text::{keyword_search, BookParser, Chunker};

fn write_chapter(dir: &Path, file: &str, id: &str, order: i64, name: &str, body: &str) {
    let front = format!(
        "---\nid: '{id}'\norder: {order}\nname: '{name}'\ntitleList:\n  [\n    {{ name: 'First Steps', tagId: 'first-steps' }},\n    {{ name: 'Going Deeper', tagId: 'going-deeper' }}\n  ]\n---\n{body}"
    );
    fs::write(dir.join(file), front).expect("write fixture");
}

fn seed_locale(root: &Path, locale: &str) {
    let dir = root.join(locale);
    fs::create_dir_all(&dir).expect("mkdir");
    write_chapter(
        &dir,
        "architecture.mdx",
        "hexagonal-architecture",
        2,
        "Hexagonal Architecture",
        "Intro paragraph about ports and adapters.\n\n## First Steps\n\nPorts isolate the domain.\nAdapters plug infrastructure into ports.\n\n## Going Deeper\n\nDomain logic stays pure.\n",
    );
    write_chapter(
        &dir,
        "agile.mdx",
        "clean-agile",
        1,
        "Clean Agile",
        "Agile is about feedback.\n\n## First Steps\n\nShort iterations beat long plans.\n",
    );
}

#[test]
fn listing_sorts_by_order_and_skips_broken_files() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    // no closing delimiter: must be skipped, not abort the listing
    fs::write(tmp.path().join("en/broken.mdx"), "---\nid: 'broken'\nno closing").expect("write");
    fs::write(tmp.path().join("en/notes.txt"), "not a chapter").expect("write");

    let parser = BookParser::new(tmp.path());
    let chapters = parser.list_chapters("en").expect("list");
    let ids: Vec<&str> = chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["clean-agile", "hexagonal-architecture"]);
}

#[test]
fn unknown_locale_is_an_error_not_an_empty_listing() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());
    assert!(parser.list_chapters("fr").is_err());
}

#[test]
fn every_outlined_section_is_fetchable_and_starts_with_its_heading() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());

    let chapter = parser.get_chapter("hexagonal-architecture", "en").expect("chapter");
    assert_eq!(chapter.sections.len(), 2);
    for section in &chapter.sections {
        let text = parser
            .get_section(&chapter.id, &section.slug, "en")
            .expect("section fetch");
        assert!(!text.is_empty());
        assert!(text.starts_with("## "), "section starts with its heading line: {text}");
        assert_eq!(slugify(text.lines().next().expect("line").trim_start_matches('#').trim()), section.slug);
    }
}

#[test]
fn section_run_stops_at_the_next_heading() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());
    let text = parser
        .get_section("hexagonal-architecture", "first-steps", "en")
        .expect("section");
    assert!(text.contains("Ports isolate"));
    assert!(!text.contains("Going Deeper"));
}

#[test]
fn unknown_section_and_chapter_are_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());
    assert!(parser.get_chapter("missing", "en").is_err());
    assert!(parser.get_section("clean-agile", "no-such-slug", "en").is_err());
}

#[test]
fn relevance_is_monotonic_in_term_overlap() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());

    let hits = keyword_search(&parser, "ports adapters", "en").expect("search");
    assert!(!hits.is_empty());
    // the line matching both terms must outrank single-term lines
    assert!(hits[0].snippet.to_lowercase().contains("adapters"));
    assert!(hits[0].snippet.to_lowercase().contains("ports"));
    assert!((hits[0].relevance - 1.0).abs() < f64::EPSILON);
    for pair in hits.windows(2) {
        assert!(pair[0].relevance >= pair[1].relevance);
    }
}

#[test]
fn hits_carry_the_enclosing_section_and_line_number() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());

    let hits = keyword_search(&parser, "pure", "en").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].section, "Going Deeper");
    assert_eq!(hits[0].chapter_id, "hexagonal-architecture");
    assert!(hits[0].line >= 1);
}

#[test]
fn search_caps_at_twenty_and_empty_is_ok() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("en");
    fs::create_dir_all(&dir).expect("mkdir");
    let body: String =
        std::iter::repeat("needle on this line.\n").take(50).collect::<String>();
    write_chapter(&dir, "big.mdx", "big", 1, "Big", &body);

    let parser = BookParser::new(tmp.path());
    let hits = keyword_search(&parser, "needle", "en").expect("search");
    assert_eq!(hits.len(), 20);

    let none = keyword_search(&parser, "zzz-absent-term", "en").expect("search");
    assert!(none.is_empty());
}

#[test]
fn chunking_covers_every_paragraph_exactly_once() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    let parser = BookParser::new(tmp.path());
    let chapter = parser.get_chapter("hexagonal-architecture", "en").expect("chapter");

    let chunker = Chunker::default();
    let chunks = chunker.split_chapter(&chapter);
    assert!(chunks.iter().any(|c| c.section == "Introduction"));

    let all: String = chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>().join("\n\n");
    for paragraph in chapter.content.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if paragraph.starts_with("## ") {
            continue; // heading lines become labels, not content
        }
        assert!(
            all.contains(paragraph),
            "paragraph missing from chunks: {paragraph}"
        );
        assert_eq!(all.matches(paragraph).count(), 1);
    }
    for c in &chunks {
        assert!(c.embedding.is_none());
        assert_eq!(c.locale, "en");
    }
}

#[test]
fn long_sections_get_part_labels_and_stay_bounded() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("en");
    fs::create_dir_all(&dir).expect("mkdir");
    let para = "lorem ipsum ".repeat(40); // ~480 chars
    let body = format!("## Long Section\n\n{para}\n\n{para}\n\n{para}\n");
    write_chapter(&dir, "long.mdx", "long", 1, "Long", &body);

    let parser = BookParser::new(tmp.path());
    let chapter = parser.get_chapter("long", "en").expect("chapter");
    let chunker = Chunker::new(1000);
    let chunks = chunker.split_chapter(&chapter);

    assert!(chunks.len() > 1);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.section, format!("Long Section (part {})", i + 1));
        assert!(c.content.chars().count() <= 1000);
    }
}

#[test]
fn oversized_preamble_is_hard_truncated_with_ellipsis() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("en");
    fs::create_dir_all(&dir).expect("mkdir");
    let preamble = "p".repeat(1500);
    write_chapter(&dir, "pre.mdx", "pre", 1, "Pre", &format!("{preamble}\n\n## S\n\nbody\n"));

    let parser = BookParser::new(tmp.path());
    let chapter = parser.get_chapter("pre", "en").expect("chapter");
    let chunks = Chunker::new(1000).split_chapter(&chapter);

    let intro = chunks.iter().find(|c| c.section == "Introduction").expect("intro chunk");
    assert!(intro.content.ends_with("..."));
    assert_eq!(intro.content.chars().count(), 1003);
}

#[test]
fn chunk_ids_increase_across_documents() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "es");
    let parser = BookParser::new(tmp.path());
    let chunker = Chunker::default();

    let mut last = 0u64;
    for chapter in parser.list_chapters("es").expect("list") {
        for chunk in chunker.split_chapter(&chapter) {
            assert!(chunk.id > last, "ids must be strictly increasing");
            last = chunk.id;
        }
    }
    assert!(last > 0);
}

#[test]
fn book_index_strips_content_and_locales_are_discovered() {
    let tmp = TempDir::new().expect("tempdir");
    seed_locale(tmp.path(), "en");
    seed_locale(tmp.path(), "es");
    let parser = BookParser::new(tmp.path());

    let index = parser.book_index("en").expect("index");
    assert_eq!(index.total_chapters, 2);
    assert!(index.chapters.iter().all(|c| c.content.is_empty()));

    assert_eq!(parser.available_locales().expect("locales"), ["en", "es"]);
}
