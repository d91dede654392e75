//! Search and reference providers.
//!
//! A search session talks to two external collaborators through the traits
//! defined here:
//!
//! - [`Source`] produces pages of candidate papers for a query. The session
//!   walks those pages through a [`ResultPages`] cursor, which also hands out
//!   the [`ResultId`](crate::models::ResultId)s the user types at the prompt.
//! - [`ReferenceSource`] lists the bibliographic references of a paper and is
//!   used by the storage gateway when a selection is committed.
//!
//! [`ArxivSource`] and [`SemanticScholarSource`] are the production
//! implementations; [`MockSource`] serves canned pages and references in tests.

mod arxiv;
mod pages;
mod semantic;

pub mod mock;

pub use arxiv::{ArxivSource, ARXIV_API_URL};
pub use mock::MockSource;
pub use pages::ResultPages;
pub use semantic::{SemanticScholarSource, SEMANTIC_API_BASE};

use crate::models::{Paper, SearchQuery, SearchResponse};
use async_trait::async_trait;

/// A paginated search backend.
///
/// Implementations must be forward-only friendly: asking for `start = n`
/// returns the results following the first `n`, and an empty page means the
/// result list is exhausted.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv")
    fn id(&self) -> &str;

    /// Fetch one page of at most `query.page_size` results starting at `start`
    async fn search_page(
        &self,
        query: &SearchQuery,
        start: usize,
    ) -> Result<SearchResponse, SourceError>;
}

/// A backend able to list the works a paper cites.
#[async_trait]
pub trait ReferenceSource: Send + Sync + std::fmt::Debug {
    /// Get the papers referenced by `paper`
    async fn get_references(&self, paper: &Paper) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON, ...)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
