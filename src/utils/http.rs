//! HTTP client utilities.

use reqwest::{Client, RequestBuilder};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
    }

    /// Create a new HTTP client with a custom user agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Download `url` into the file at `path`, returning the number of bytes written.
    ///
    /// The file is only created once the full body has been received.
    pub async fn download_to(&self, url: &str, path: &Path) -> Result<u64, SourceError> {
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Download of {} returned status: {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        tokio::fs::write(path, &bytes).await?;
        tracing::debug!(url, path = %path.display(), bytes = bytes.len(), "Downloaded file");
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_writes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/paper.pdf")
            .with_status(200)
            .with_body("%PDF-1.4 body")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        let client = HttpClient::new().unwrap();
        let written = client
            .download_to(&format!("{}/paper.pdf", server.url()), &path)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "%PDF-1.4 body");
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");
        let client = HttpClient::new().unwrap();
        let err = client
            .download_to(&format!("{}/missing.pdf", server.url()), &path)
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Api(_)));
        assert!(!path.exists());
    }
}
