//! Utility modules supporting the shell.
//!
//! - [`HttpClient`]: shared HTTP client used by the providers and for PDF downloads

mod http;

pub use http::HttpClient;
