//! # arxivist
//!
//! An interactive shell for searching arXiv, picking papers from paged
//! results and saving them, together with their PDFs and references, to a
//! local SQLite library.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, SearchQuery, etc.)
//! - [`sources`]: Search and reference providers behind async traits
//! - [`shell`]: Parsers, result registry, search session and mode dispatcher
//! - [`storage`]: Persistence gateway and catalog over SQLite
//! - [`ui`]: Terminal rendering
//! - [`utils`]: HTTP client
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod shell;
pub mod sources;
pub mod storage;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Paper, ResultId};
pub use shell::{RunMode, Shell, ShellError};
pub use sources::{ReferenceSource, Source};
pub use storage::{Catalog, Gateway};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
