//! Core data models for papers and search operations.

mod paper;
mod search;

pub use paper::{Paper, PaperBuilder, SourceType};
pub use search::{SearchQuery, SearchResponse};

/// Identifier of a search result, unique within one search session
pub type ResultId = i64;
