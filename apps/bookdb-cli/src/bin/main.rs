//! bookdb command line: the boundary in front of the search subsystem.
//!
//! Parser, chunker and semantic engine are constructed once here after
//! config validation and passed into every operation; nothing lives in
//! globals.

use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bookdb_core::config::{expand_path, Settings};
use bookdb_text::{keyword_search, BookParser, Chunker};
use bookdb_vector::SemanticEngine;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <chapters|toc|read|search|index|ask|status> [args...]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load()?;
    let book_dir = expand_path(&settings.book.dir);
    anyhow::ensure!(book_dir.is_dir(), "book directory does not exist: {}", book_dir.display());
    let parser = BookParser::new(book_dir);

    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "chapters" => {
            let locale = locale_arg(&args, 0, &settings);
            let chapters = parser.list_chapters(&locale)?;
            for ch in &chapters {
                println!("{:>3}  {:<32} {} section(s)", ch.order, ch.id, ch.sections.len());
            }
        }
        "toc" => {
            let locale = locale_arg(&args, 0, &settings);
            let index = parser.book_index(&locale)?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
        "read" => {
            let chapter_id = args.first().context("Usage: bookdb read <chapter_id> [section_slug]")?;
            let locale = settings.book.default_locale.clone();
            match args.get(1) {
                Some(slug) => println!("{}", parser.get_section(chapter_id, slug, &locale)?),
                None => {
                    let chapter = parser.get_chapter(chapter_id, &locale)?;
                    println!("# {}\n\n{}", chapter.name, chapter.content);
                }
            }
        }
        "search" => {
            let query = args.first().context("Usage: bookdb search \"<query>\" [locale]")?;
            let locale = locale_arg(&args, 1, &settings);
            let hits = keyword_search(&parser, query, &locale)?;
            if hits.is_empty() {
                println!("No results for: {query}");
            } else {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            }
        }
        "index" => {
            let scope = args.first().map(String::as_str).unwrap_or("all");
            let engine = make_engine(&settings)?;
            let count = build_index(&parser, &engine, &settings, scope).await?;
            println!("Indexed {count} chunks");
        }
        "ask" => {
            let query = args.first().context("Usage: bookdb ask \"<query>\" [locale] [k]")?;
            let locale = locale_arg(&args, 1, &settings);
            let k = args.get(2).and_then(|s| s.parse::<usize>().ok()).unwrap_or(5);
            let engine = make_engine(&settings)?;
            anyhow::ensure!(
                engine.is_available().await,
                "embedding provider '{}' is not reachable",
                engine.provider_name()
            );
            build_index(&parser, &engine, &settings, &locale).await?;
            let hits = engine.search(query, &locale, k).await?;
            if hits.is_empty() {
                println!("No semantic matches for: {query}");
            } else {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            }
        }
        "status" => {
            let status = match make_engine(&settings) {
                Ok(engine) => serde_json::json!({
                    "available": engine.is_available().await,
                    "indexed": engine.is_indexed(),
                    "chunk_count": engine.chunk_count().await,
                    "provider": engine.provider_name(),
                }),
                Err(err) => serde_json::json!({
                    "available": false,
                    "indexed": false,
                    "chunk_count": 0,
                    "provider": "none",
                    "reason": err.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        _ => {
            eprintln!("Unknown command: {cmd}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn locale_arg(args: &[String], pos: usize, settings: &Settings) -> String {
    args.get(pos).cloned().unwrap_or_else(|| settings.book.default_locale.clone())
}

fn make_engine(settings: &Settings) -> anyhow::Result<SemanticEngine> {
    let client = bookdb_embed::client_from_settings(&settings.embeddings)?;
    Ok(SemanticEngine::with_batch_size(client, settings.embeddings.batch_size))
}

/// Chunk every chapter of the requested locale(s) and feed the engine.
async fn build_index(
    parser: &BookParser,
    engine: &SemanticEngine,
    settings: &Settings,
    scope: &str,
) -> anyhow::Result<usize> {
    let locales = if scope == "all" {
        parser.available_locales()?
    } else {
        vec![scope.to_string()]
    };
    let chunker = Chunker::new(settings.embeddings.chunk_max_chars);
    let mut chunks = Vec::new();
    for locale in &locales {
        for chapter in parser.list_chapters(locale)? {
            chunks.extend(chunker.split_chapter(&chapter));
        }
    }
    tracing::info!(chunks = chunks.len(), locales = locales.len(), "building semantic index");
    let count = engine.index_chunks(chunks).await?;
    Ok(count)
}
