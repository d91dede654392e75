//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Paper, PaperBuilder, SearchQuery, SearchResponse, SourceType};
use crate::sources::{ReferenceSource, Source, SourceError};

/// A mock source that serves a fixed result list and canned references.
#[derive(Debug, Default)]
pub struct MockSource {
    papers: Mutex<Vec<Paper>>,
    references: Mutex<HashMap<String, Vec<Paper>>>,
    failing_references: Mutex<Option<String>>,
    search_calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source with no results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source that pages through `papers`.
    pub fn with_papers(papers: impl IntoIterator<Item = Paper>) -> Self {
        let source = Self::new();
        source.set_papers(papers);
        source
    }

    /// Replace the full result list.
    pub fn set_papers(&self, papers: impl IntoIterator<Item = Paper>) {
        let mut guard = self.papers.lock().unwrap();
        *guard = papers.into_iter().collect();
    }

    /// Set the references returned for `paper_id`.
    pub fn set_references(&self, paper_id: &str, references: Vec<Paper>) {
        let mut guard = self.references.lock().unwrap();
        guard.insert(paper_id.to_string(), references);
    }

    /// Make reference lookups for `paper_id` fail.
    pub fn fail_references_for(&self, paper_id: &str) {
        let mut guard = self.failing_references.lock().unwrap();
        *guard = Some(paper_id.to_string());
    }

    /// Number of `search_page` calls served so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        start: usize,
    ) -> Result<SearchResponse, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let guard = self.papers.lock().unwrap();
        let page = guard
            .iter()
            .skip(start)
            .take(query.page_size)
            .cloned()
            .collect();
        Ok(SearchResponse::new(page).start(start))
    }
}

#[async_trait]
impl ReferenceSource for MockSource {
    async fn get_references(&self, paper: &Paper) -> Result<Vec<Paper>, SourceError> {
        if self.failing_references.lock().unwrap().as_deref() == Some(paper.paper_id.as_str()) {
            return Err(SourceError::Api(format!(
                "reference lookup failed for {}",
                paper.paper_id
            )));
        }
        let guard = self.references.lock().unwrap();
        Ok(guard.get(&paper.paper_id).cloned().unwrap_or_default())
    }
}

/// Helper function to create a mock arXiv paper for testing.
pub fn make_paper(paper_id: &str, title: &str) -> Paper {
    PaperBuilder::new(
        paper_id,
        title,
        format!("http://arxiv.org/abs/{}", paper_id),
        SourceType::Arxiv,
    )
    .arxiv_id(paper_id)
    .authors("Test Author")
    .abstract_text(format!("Abstract of {}", title))
    .pdf_url(format!("http://arxiv.org/pdf/{}.pdf", paper_id))
    .build()
}

/// Helper function to create a mock reference entry for testing.
pub fn make_reference(title: &str, arxiv_id: Option<&str>) -> Paper {
    let builder = PaperBuilder::new(
        format!("s2-{}", title.to_lowercase().replace(' ', "-")),
        title,
        "",
        SourceType::SemanticScholar,
    );
    match arxiv_id {
        Some(id) => builder.arxiv_id(id).build(),
        None => builder.build(),
    }
}
