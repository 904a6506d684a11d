//! Row selection by stable row id.

use std::collections::HashSet;

/// Selection mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection allowed.
    None,
    /// Single row (radio-button style).
    Single,
    /// Multiple rows (checkbox style).
    #[default]
    Multi,
}

/// What happens to selected ids when the visible rows change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Keep ids across filter, sort and page changes for as long as the row
    /// is still in the data set. Ids of removed rows are dropped.
    #[default]
    PersistById,
    /// Keep only ids of rows on the current page; everything else is dropped
    /// after any filter, sort, page or page-size change.
    VisibleOnly,
}

/// Header checkbox state for the rows currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    /// Some but not all visible rows are selected.
    Indeterminate,
    Checked,
}

/// Tracks selected rows by their ids.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    policy: SelectionPolicy,
    selected: HashSet<String>,
}

impl Selection {
    /// Create selection with no selection allowed.
    pub fn none() -> Self {
        Self::with_mode(SelectionMode::None)
    }

    /// Create single-selection mode.
    pub fn single() -> Self {
        Self::with_mode(SelectionMode::Single)
    }

    /// Create multi-selection mode.
    pub fn multi() -> Self {
        Self::with_mode(SelectionMode::Multi)
    }

    fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the policy for rows that leave the view.
    pub fn policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Toggle selection for an id. Returns true if selection changed.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                let was_selected = self.selected.contains(id);
                self.selected.clear();
                if !was_selected {
                    self.selected.insert(id.to_string());
                }
                true
            }
            SelectionMode::Multi => {
                if !self.selected.remove(id) {
                    self.selected.insert(id.to_string());
                }
                true
            }
        }
    }

    /// Header checkbox action for the rows on the page.
    ///
    /// Selects every id in `page_ids` unless all of them are already
    /// selected, in which case it deselects them. Ids off the page are left
    /// alone. Only available in multi mode.
    pub fn toggle_all(&mut self, page_ids: &[String]) -> bool {
        if self.mode != SelectionMode::Multi || page_ids.is_empty() {
            return false;
        }
        if self.check_state(page_ids) == CheckState::Checked {
            for id in page_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids.iter().cloned());
        }
        true
    }

    /// Header checkbox state against the visible ids only.
    pub fn check_state(&self, visible_ids: &[String]) -> CheckState {
        let selected = visible_ids
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        match selected {
            0 => CheckState::Unchecked,
            n if n == visible_ids.len() => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }

    /// Check if an id is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Clear all selections. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Get the single selected id (for Single mode).
    pub fn get_single(&self) -> Option<&str> {
        self.selected.iter().next().map(String::as_str)
    }

    /// Selected ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drops ids for which `keep` is false. Returns true if any was dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| keep(id));
        self.selected.len() != before
    }
}
