//! Semantic Scholar reference provider.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{ReferenceSource, SourceError};
use crate::utils::HttpClient;

/// Base URL for the Semantic Scholar graph API
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

const REFERENCE_FIELDS: &str = "title,authors,externalIds,url";

/// Semantic Scholar reference lookup
///
/// Uses the `/paper/{id}/references` endpoint of the graph API.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    api_base: String,
    api_key: Option<String>,
    max_results: usize,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source
    pub fn new(client: HttpClient, api_base: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: None,
            max_results,
        }
    }

    /// Set an API key (optional, for higher rate limits)
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Semantic Scholar identifier for a paper: arXiv ID, then DOI, then the raw ID
    fn lookup_id(paper: &Paper) -> String {
        if let Some(arxiv) = paper.arxiv_id.as_deref().filter(|s| !s.is_empty()) {
            format!("arXiv:{}", arxiv)
        } else if let Some(doi) = paper.doi.as_deref().filter(|s| !s.is_empty()) {
            format!("DOI:{}", doi)
        } else {
            paper.paper_id.clone()
        }
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    /// Parse one cited paper; entries Semantic Scholar could not resolve have no title
    fn parse_reference(data: S2Paper) -> Option<Paper> {
        let title = data.title.filter(|t| !t.trim().is_empty())?;

        let authors = data
            .authors
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect::<Vec<_>>()
            .join("; ");

        let paper_id = data.paper_id.unwrap_or_default();
        let mut builder = PaperBuilder::new(
            paper_id,
            title,
            data.url.unwrap_or_default(),
            SourceType::SemanticScholar,
        )
        .authors(authors);

        if let Some(ids) = data.external_ids {
            if let Some(arxiv) = ids.arxiv {
                builder = builder.arxiv_id(arxiv);
            }
            if let Some(doi) = ids.doi {
                builder = builder.doi(doi);
            }
        }

        Some(builder.build())
    }
}

#[async_trait]
impl ReferenceSource for SemanticScholarSource {
    async fn get_references(&self, paper: &Paper) -> Result<Vec<Paper>, SourceError> {
        let lookup_id = Self::lookup_id(paper);
        let url = format!(
            "{}/paper/{}/references?fields={}&limit={}",
            self.api_base,
            urlencoding::encode(&lookup_id),
            REFERENCE_FIELDS,
            self.max_results
        );

        let response = self
            .add_api_key_if_present(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch references: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(paper = %lookup_id, "Paper not indexed by Semantic Scholar");
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar returned status: {}",
                response.status()
            )));
        }

        let data: ReferencesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data
            .data
            .into_iter()
            .filter_map(|item| item.cited_paper)
            .filter_map(Self::parse_reference)
            .collect())
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    #[serde(rename = "externalIds")]
    external_ids: Option<S2ExternalIds>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Reference {
    #[serde(rename = "citedPaper")]
    cited_paper: Option<S2Paper>,
}

#[derive(Debug, Deserialize)]
struct ReferencesResponse {
    #[serde(default)]
    data: Vec<S2Reference>,
}
