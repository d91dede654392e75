//! Persistence of committed selections.
//!
//! The shell only knows the two traits defined here:
//!
//! - [`Gateway`] commits the selection of a finished search session. A commit
//!   is all-or-nothing: either every selected paper is stored together with
//!   its PDF and references, or nothing is.
//! - [`Catalog`] reads the library back for the `saved` and `suggest` modes.
//!
//! [`SqliteGateway`] implements both on top of a SQLite file and a PDF
//! directory.

mod sqlite;

pub mod mock;

pub use sqlite::{init_db, open_database, SqliteGateway, SCHEMA};

use async_trait::async_trait;
use std::path::PathBuf;

use crate::shell::ResultRegistry;
use crate::sources::SourceError;

/// Commits the selection of a search session.
#[async_trait]
pub trait Gateway: Send + Sync + std::fmt::Debug {
    /// Persist every selected result of `registry`.
    ///
    /// Must leave no durable record behind when it fails.
    async fn submit(&self, registry: &ResultRegistry) -> Result<SubmitReport, GatewayError>;
}

/// Read access to the saved library.
pub trait Catalog: Send + Sync + std::fmt::Debug {
    /// Saved papers, most recently saved first
    fn saved_papers(&self) -> Result<Vec<SavedPaper>, GatewayError>;

    /// Works cited most often by saved papers that are not saved themselves
    fn suggestions(&self, limit: usize) -> Result<Vec<Suggestion>, GatewayError>;
}

/// One paper written by a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecord {
    pub paper_id: String,
    pub title: String,
    pub pdf_path: PathBuf,
    pub references: usize,
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub saved: Vec<SavedRecord>,
}

impl SubmitReport {
    /// Whether the commit stored nothing
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

/// A paper stored in the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaper {
    pub paper_id: String,
    pub title: String,
    pub authors: String,
    pub published_date: Option<String>,
    pub pdf_path: PathBuf,
    pub saved_at: String,
    pub references: usize,
}

/// A referenced work suggested for reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub authors: String,
    pub arxiv_id: Option<String>,
    pub doi: Option<String>,
    /// Number of saved papers citing this work
    pub cited_by: usize,
}

/// Errors raised while committing or reading the library
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The selected result has no PDF link
    #[error("paper {0} has no PDF link")]
    MissingPdf(String),

    /// Downloading the PDF failed
    #[error("failed to download PDF for {paper_id}: {source}")]
    Download {
        paper_id: String,
        source: SourceError,
    },

    /// Looking up the references failed
    #[error("failed to fetch references for {paper_id}: {source}")]
    References {
        paper_id: String,
        source: SourceError,
    },

    /// Database error
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure (used by test doubles)
    #[error("{0}")]
    Other(String),
}
