//! In-memory gateway for testing purposes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::ResultId;
use crate::shell::ResultRegistry;
use crate::storage::{
    Catalog, Gateway, GatewayError, SavedPaper, SavedRecord, SubmitReport, Suggestion,
};

/// A gateway that records the ids it is asked to commit.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    submissions: Mutex<Vec<Vec<ResultId>>>,
    saved: Mutex<Vec<SavedPaper>>,
    suggestions: Mutex<Vec<Suggestion>>,
    failing: bool,
}

impl RecordingGateway {
    /// Create a gateway that accepts every commit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway whose commits always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Selected ids of every successful commit, in order.
    pub fn submissions(&self) -> Vec<Vec<ResultId>> {
        self.submissions.lock().unwrap().clone()
    }

    /// Set the papers reported by [`Catalog::saved_papers`].
    pub fn set_saved(&self, saved: Vec<SavedPaper>) {
        *self.saved.lock().unwrap() = saved;
    }

    /// Set the suggestions reported by [`Catalog::suggestions`].
    pub fn set_suggestions(&self, suggestions: Vec<Suggestion>) {
        *self.suggestions.lock().unwrap() = suggestions;
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn submit(&self, registry: &ResultRegistry) -> Result<SubmitReport, GatewayError> {
        if self.failing {
            return Err(GatewayError::Other("storage unavailable".to_string()));
        }

        self.submissions
            .lock()
            .unwrap()
            .push(registry.selected_ids().collect());

        let saved = registry
            .selected()
            .map(|(_, paper)| SavedRecord {
                paper_id: paper.paper_id.clone(),
                title: paper.title.clone(),
                pdf_path: PathBuf::from(format!("{}.pdf", paper.paper_id)),
                references: 0,
            })
            .collect();
        Ok(SubmitReport { saved })
    }
}

impl Catalog for RecordingGateway {
    fn saved_papers(&self) -> Result<Vec<SavedPaper>, GatewayError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn suggestions(&self, limit: usize) -> Result<Vec<Suggestion>, GatewayError> {
        Ok(self
            .suggestions
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }
}
