//! Search request and response models.

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A normalized search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Normalized query terms (never empty strings)
    pub terms: Vec<String>,

    /// Number of results requested per page
    pub page_size: usize,
}

impl SearchQuery {
    /// Create a new search query from already-normalized terms
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// The terms joined back into display text
    pub fn text(&self) -> String {
        self.terms.join(" ")
    }
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Papers found on this page
    pub papers: Vec<crate::models::Paper>,

    /// Offset of the first paper of this page
    pub start: usize,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(papers: Vec<crate::models::Paper>) -> Self {
        Self { papers, start: 0 }
    }

    /// Set the offset of this page
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Whether this page is empty
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_and_page_size() {
        let query = SearchQuery::new(["deep", "learning"]).page_size(0);
        assert_eq!(query.text(), "deep learning");
        assert_eq!(query.page_size, 1);
    }

    #[test]
    fn test_response_offset() {
        let response = SearchResponse::new(Vec::new()).start(20);
        assert_eq!(response.start, 20);
        assert!(response.is_empty());
    }
}
