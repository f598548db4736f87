#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunk;
pub mod parser;
pub mod search;

pub use chunk::{Chunker, DEFAULT_MAX_CHARS};
pub use parser::BookParser;
pub use search::keyword_search;
