//! Forward-only page cursor over a [`Source`].

use crate::models::{Paper, ResultId, SearchQuery};
use crate::sources::{Source, SourceError};

/// Cursor that walks the result pages of one query.
///
/// Nothing is fetched until [`ResultPages::next_page`] is called, and each
/// call fetches exactly one page. Result ids are handed out sequentially from
/// 1, so they stay unique for the lifetime of the cursor.
#[derive(Debug)]
pub struct ResultPages<'a> {
    source: &'a dyn Source,
    query: SearchQuery,
    offset: usize,
    next_id: ResultId,
    exhausted: bool,
}

impl<'a> ResultPages<'a> {
    /// Create a cursor positioned before the first page
    pub fn new(source: &'a dyn Source, query: SearchQuery) -> Self {
        Self {
            source,
            query,
            offset: 0,
            next_id: 1,
            exhausted: false,
        }
    }

    /// The query this cursor pages through
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Whether the source has reported the end of the result list
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the source yields an empty page; every later
    /// call returns `Ok(None)` without contacting the source again.
    pub async fn next_page(&mut self) -> Result<Option<Vec<(ResultId, Paper)>>, SourceError> {
        if self.exhausted {
            return Ok(None);
        }

        tracing::debug!(
            source = self.source.id(),
            query = %self.query.text(),
            start = self.offset,
            "Fetching result page"
        );
        let response = self.source.search_page(&self.query, self.offset).await?;

        if response.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.offset += response.papers.len();
        let page = response
            .papers
            .into_iter()
            .map(|paper| {
                let id = self.next_id;
                self.next_id += 1;
                (id, paper)
            })
            .collect();

        Ok(Some(page))
    }
}
