use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::inline::InlineDecisionMap;

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintsState {
    Shown,
    Hidden,
}

/// Annotation state of one file. `Pending` holds the slot while a toggle computes.
#[derive(Debug, Clone)]
enum FileHints {
    Pending,
    Shown(InlineDecisionMap),
}

/// Which files currently display inlining annotations, and with what decisions.
///
/// Owned by the host and handed to renderers by reference.
#[derive(Debug, Default)]
pub struct InlineHints {
    files: DashMap<String, FileHints>,
}

impl InlineHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while annotations are on, including while their decisions are still being computed.
    pub fn is_shown(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }

    /// Flip annotations for `file_name`. Turning them on calls `compute` for fresh
    /// decisions; turning them off drops everything held for the file.
    ///
    /// The on/off decision is made under the map entry, so overlapping toggles of the
    /// same file alternate. `compute` runs without the entry held; if the file is
    /// hidden again meanwhile, its result is discarded.
    pub fn toggle<F>(&self, file_name: &str, compute: F) -> HintsState
    where
        F: FnOnce() -> InlineDecisionMap,
    {
        match self.files.entry(file_name.to_string()) {
            Entry::Occupied(entry) => {
                entry.remove();
                tracing::debug!("inlining annotations hidden for {}", file_name);
                return HintsState::Hidden;
            }
            Entry::Vacant(entry) => {
                entry.insert(FileHints::Pending);
            }
        }

        let decisions = compute();
        match self.files.get_mut(file_name) {
            Some(mut entry) if matches!(*entry, FileHints::Pending) => {
                tracing::debug!("inlining annotations shown for {} ({} decisions)", file_name, decisions.len());
                *entry = FileHints::Shown(decisions);
            }
            Some(_) => {}
            None => tracing::debug!("{} was hidden while its decisions were computed", file_name),
        }
        HintsState::Shown
    }

    /// Replace the decisions of a file that is currently shown. Hidden files stay hidden.
    pub fn refresh(&self, file_name: &str, decisions: InlineDecisionMap) -> bool {
        match self.files.get_mut(file_name) {
            Some(mut entry) => {
                *entry = FileHints::Shown(decisions);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the decisions shown for `file_name`; `None` while hidden or still computing.
    pub fn decisions(&self, file_name: &str) -> Option<InlineDecisionMap> {
        self.files.get(file_name).and_then(|entry| match &*entry {
            FileHints::Shown(decisions) => Some(decisions.clone()),
            FileHints::Pending => None,
        })
    }

    pub fn shown_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        files.sort();
        files
    }
}
