#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod engine;
pub mod store;

pub use engine::SemanticEngine;
pub use store::VectorStore;
