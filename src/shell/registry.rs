//! Result registry ("save query") of one search session.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Paper, ResultId};
use crate::shell::error::{ShellError, ShellResult};

/// Tracks every result shown during a session and the ids the user kept.
///
/// Ids are append-only: once registered an id is never removed or
/// reassigned, and the selection is always a subset of the registered ids.
#[derive(Debug, Default, Clone)]
pub struct ResultRegistry {
    valid: HashMap<ResultId, Paper>,
    selected: BTreeSet<ResultId>,
}

impl ResultRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a result shown to the user
    pub fn add_valid(&mut self, id: ResultId, paper: Paper) -> ShellResult<()> {
        if self.valid.contains_key(&id) {
            return Err(ShellError::DuplicateId(id));
        }
        self.valid.insert(id, paper);
        Ok(())
    }

    /// Whether `id` has been registered
    pub fn is_valid(&self, id: ResultId) -> bool {
        self.valid.contains_key(&id)
    }

    /// Mark a registered id as selected; selecting twice is a no-op
    pub fn select(&mut self, id: ResultId) -> ShellResult<()> {
        if !self.is_valid(id) {
            return Err(ShellError::UnknownId(id));
        }
        self.selected.insert(id);
        Ok(())
    }

    /// Select every id in `ids`, or none of them if any id is unknown
    pub fn select_all(&mut self, ids: &[ResultId]) -> ShellResult<()> {
        if let Some(&unknown) = ids.iter().find(|&&id| !self.is_valid(id)) {
            return Err(ShellError::UnknownId(unknown));
        }
        self.selected.extend(ids.iter().copied());
        Ok(())
    }

    /// Look up a registered result
    pub fn get(&self, id: ResultId) -> ShellResult<&Paper> {
        self.valid.get(&id).ok_or(ShellError::UnknownId(id))
    }

    /// Selected ids in ascending order
    pub fn selected_ids(&self) -> impl Iterator<Item = ResultId> + '_ {
        self.selected.iter().copied()
    }

    /// Selected results in ascending id order
    pub fn selected(&self) -> impl Iterator<Item = (ResultId, &Paper)> + '_ {
        self.selected
            .iter()
            .filter_map(|id| self.valid.get(id).map(|paper| (*id, paper)))
    }

    /// Number of selected results
    pub fn selected_len(&self) -> usize {
        self.selected.len()
    }

    /// Number of registered results
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// Whether nothing has been registered yet
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Render the current selection
    pub fn describe(&self) -> String {
        if self.selected.is_empty() {
            return "nothing selected".to_string();
        }
        let lines = self
            .selected()
            .map(|(id, paper)| format!("  [{}] {}", id, paper.title))
            .collect::<Vec<_>>();
        format!("selected {} paper(s):\n{}", lines.len(), lines.join("\n"))
    }
}
