//! Error types for the retrieval core.

mod cache;
mod embedding;
mod retriever;
mod search;

pub use cache::*;
pub use embedding::*;
pub use retriever::*;
pub use search::*;
