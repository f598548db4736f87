use thiserror::Error;

/// Why a chapter file failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseReason {
    #[error("no front matter delimiter at start of file")]
    MissingDelimiter,
    #[error("front matter block not closed")]
    UnterminatedFrontMatter,
    #[error("malformed section list literal")]
    MalformedSectionList,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed front matter. Recoverable per document: listing logs
    /// and skips the file instead of aborting.
    #[error("parse error in {path}: {reason}")]
    Parse { path: String, reason: ParseReason },

    #[error("not found: {0}")]
    NotFound(String),

    /// The embedding backend reported an error of its own.
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// The embedding backend could not be reached or answered garbage.
    #[error("embedding transport error: {0}")]
    Transport(String),

    /// A sequential batch failed at item `index`; no vectors were
    /// produced for that item or any later one.
    #[error("embedding batch item {index} failed: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("semantic search not available: {0}")]
    NotAvailable(String),

    #[error("semantic index not built")]
    NotIndexed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(path: impl Into<String>, reason: ParseReason) -> Self {
        Error::Parse { path: path.into(), reason }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
