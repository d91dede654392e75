//! arXiv search provider.

use async_trait::async_trait;
use feed_rs::parser;

use crate::models::{Paper, PaperBuilder, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";
/// Base URL for arXiv PDFs
const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";
/// Largest page the export API serves in one request
const ARXIV_MAX_PAGE: usize = 200;

/// arXiv research source
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    api_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source against the public export API
    pub fn new(client: HttpClient) -> Self {
        Self::with_api_url(client, ARXIV_API_URL)
    }

    /// Create a source against a custom endpoint (mirrors, tests)
    pub fn with_api_url(client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Parse an arXiv ID from various formats
    ///
    /// Handles formats like:
    /// - "2301.12345"
    /// - "2301.12345v1" (version is stripped)
    /// - "arxiv:2301.12345"
    /// - "http://arxiv.org/abs/2301.12345v1"
    pub fn parse_id(id: &str) -> Result<String, SourceError> {
        let id = id.trim().to_lowercase();

        let id = match id.find("/abs/") {
            Some(abs_pos) => &id[abs_pos + 5..],
            None => id.strip_prefix("arxiv:").unwrap_or(&id),
        };

        let id = strip_version(id.trim_end_matches('/'));
        if id.is_empty() {
            return Err(SourceError::InvalidRequest("Empty arXiv ID".to_string()));
        }

        Ok(id.to_string())
    }

    /// Build search query for arXiv API
    fn build_search_query(query: &SearchQuery) -> String {
        if query.terms.is_empty() {
            return "all:*".to_string();
        }
        query
            .terms
            .iter()
            .map(|term| format!("all:{}", term))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Parse arXiv Atom feed entry into Paper
    fn parse_entry(entry: &feed_rs::model::Entry) -> Result<Paper, SourceError> {
        let paper_id = Self::parse_id(&entry.id)
            .map_err(|_| SourceError::Parse("Missing paper ID".to_string()))?;

        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();

        let authors = entry
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| collapse_whitespace(&s.content))
            .unwrap_or_default();

        let categories = entry
            .categories
            .iter()
            .map(|c| c.term.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let pdf_url = entry
            .links
            .iter()
            .find(|l| l.media_type.as_deref() == Some("application/pdf"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| format!("{}/{}.pdf", ARXIV_PDF_URL, paper_id));

        let mut paper =
            PaperBuilder::new(paper_id.clone(), title, entry.id.clone(), SourceType::Arxiv)
                .arxiv_id(paper_id)
                .authors(authors)
                .abstract_text(abstract_text)
                .pdf_url(pdf_url)
                .build();

        // Optional in the feed; absent fields stay unset
        paper.published_date = entry.published.map(|d| d.to_rfc3339());
        paper.updated_date = entry.updated.map(|d| d.to_rfc3339());
        paper.categories = Some(categories).filter(|c| !c.is_empty());

        Ok(paper)
    }
}

fn strip_version(id: &str) -> &str {
    match id.rfind('v') {
        Some(pos)
            if pos > 0
                && pos + 1 < id.len()
                && id[pos + 1..].chars().all(|c| c.is_ascii_digit())
                && id[..pos].ends_with(|c: char| c.is_ascii_digit()) =>
        {
            &id[..pos]
        }
        _ => id,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        start: usize,
    ) -> Result<SearchResponse, SourceError> {
        let search_query = Self::build_search_query(query);
        let max_results = query.page_size.min(ARXIV_MAX_PAGE);

        let url = format!(
            "{}?search_query={}&start={}&max_results={}&sortBy=relevance&sortOrder=descending",
            self.api_url,
            urlencoding::encode(&search_query),
            start,
            max_results,
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let feed = parser::parse(bytes.as_ref())
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        let papers = feed
            .entries
            .iter()
            .map(Self::parse_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResponse::new(papers).start(start))
    }
}
