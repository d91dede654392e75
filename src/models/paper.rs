//! Paper model representing a search result or a referenced work.

/// The service a paper record was obtained from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    Arxiv,
    SemanticScholar,
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::SemanticScholar => "Semantic Scholar",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A research paper as returned by a search or reference lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    /// Source-specific identifier (arXiv ID, Semantic Scholar paper ID, ...)
    pub paper_id: String,

    /// Paper title
    pub title: String,

    /// Authors (semicolon-separated)
    pub authors: String,

    /// Abstract text
    pub r#abstract: String,

    /// Digital Object Identifier
    pub doi: Option<String>,

    /// arXiv identifier, when known (set for references that live on arXiv)
    pub arxiv_id: Option<String>,

    /// Publication date (ISO format)
    pub published_date: Option<String>,

    /// Last updated date (ISO format)
    pub updated_date: Option<String>,

    /// Direct PDF URL
    pub pdf_url: Option<String>,

    /// Paper page URL
    pub url: String,

    /// Source where the paper was found
    pub source: SourceType,

    /// Categories/tags (semicolon-separated)
    pub categories: Option<String>,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(paper_id: String, title: String, url: String, source: SourceType) -> Self {
        Self {
            paper_id,
            title,
            authors: String::new(),
            r#abstract: String::new(),
            doi: None,
            arxiv_id: None,
            published_date: None,
            updated_date: None,
            pdf_url: None,
            url,
            source,
            categories: None,
        }
    }

    /// Key used to recognise the same work across reference lists.
    ///
    /// Prefers the arXiv ID, then the DOI, then the lowercased title.
    pub fn reference_key(&self) -> String {
        if let Some(arxiv) = self.arxiv_id.as_deref().filter(|s| !s.is_empty()) {
            return format!("arxiv:{}", arxiv.to_lowercase());
        }
        if let Some(doi) = self.doi.as_deref().filter(|s| !s.is_empty()) {
            return format!("doi:{}", doi.to_lowercase());
        }
        format!("title:{}", self.title.trim().to_lowercase())
    }

    /// Returns the author names as a vector
    pub fn author_list(&self) -> Vec<&str> {
        self.authors
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the categories as a vector
    pub fn category_list(&self) -> Vec<&str> {
        self.categories
            .as_ref()
            .map(|c| c.split(';').map(|s| s.trim()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Check if paper has a downloadable PDF
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(
        paper_id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        source: SourceType,
    ) -> Self {
        Self {
            paper: Paper::new(paper_id.into(), title.into(), url.into(), source),
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: impl Into<String>) -> Self {
        self.paper.authors = authors.into();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = abstract_text.into();
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Set arXiv ID
    pub fn arxiv_id(mut self, arxiv_id: impl Into<String>) -> Self {
        self.paper.arxiv_id = Some(arxiv_id.into());
        self
    }



    /// Set PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.paper.pdf_url = Some(url.into());
        self
    }


    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
