//! Configuration loading and path helpers.
//!
//! Uses Figment to merge built-in defaults + `bookdb.toml` + `APP_*`
//! environment variables (double underscore separates nesting, e.g.
//! `APP_EMBEDDINGS__PROVIDER=openai`). Provides helpers to expand `~`
//! and `${VAR}` and to resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub book: BookSettings,
    pub embeddings: EmbeddingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookSettings {
    /// Root of the raw corpus: one subdirectory per locale, one `.mdx`
    /// file per chapter.
    pub dir: String,
    pub default_locale: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingSettings {
    /// `"openai"` or `"ollama"`. Chosen here once, at construction time,
    /// never sniffed from the environment at call sites.
    pub provider: String,
    /// Required for the hosted provider, unused by the local one.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// How many chunk texts go into one provider call during indexing.
    pub batch_size: usize,
    /// Upper bound on chunk content length, in characters.
    pub chunk_max_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            book: BookSettings { dir: "./book".to_string(), default_locale: "es".to_string() },
            embeddings: EmbeddingSettings {
                provider: "ollama".to_string(),
                api_key: None,
                base_url: "http://localhost:11434".to_string(),
                model: "nomic-embed-text".to_string(),
                batch_size: 100,
                chunk_max_chars: 1000,
            },
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("bookdb.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.embeddings.provider, "ollama");
        assert_eq!(s.embeddings.base_url, "http://localhost:11434");
        assert_eq!(s.embeddings.model, "nomic-embed-text");
        assert_eq!(s.embeddings.batch_size, 100);
        assert_eq!(s.embeddings.chunk_max_chars, 1000);
        assert_eq!(s.book.default_locale, "es");
    }

    #[test]
    fn resolve_with_base_keeps_absolute_paths() {
        let base = Path::new("/srv/bookdb");
        assert_eq!(resolve_with_base(base, "/data/book"), PathBuf::from("/data/book"));
        assert_eq!(resolve_with_base(base, "book"), PathBuf::from("/srv/bookdb/book"));
    }
}
