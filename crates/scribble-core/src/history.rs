//! Linear undo/redo history of element-list snapshots.

use crate::elements::Element;

/// A snapshot of the element list at a commit point.
pub type Snapshot = Vec<Element>;

/// Linear history: committed snapshots plus a cursor.
///
/// The cursor names the snapshot matching the live list; `None` means the live
/// list is the baseline (the state before the first commit). Entries after the
/// cursor are redoable. A commit truncates them.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    baseline: Snapshot,
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a history whose undo floor is `baseline` (e.g. a restored canvas).
    pub fn with_baseline(baseline: Snapshot) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    /// Push a deep copy of `elements`, discarding anything redoable.
    pub fn commit(&mut self, elements: &[Element]) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(elements.to_vec());
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back. Returns the snapshot to install, or `None` at the floor.
    pub fn undo(&mut self) -> Option<&[Element]> {
        match self.cursor? {
            0 => {
                self.cursor = None;
                Some(&self.baseline)
            }
            c => {
                self.cursor = Some(c - 1);
                Some(&self.entries[c - 1])
            }
        }
    }

    /// Step forward. Returns the snapshot to install, or `None` at the tip.
    pub fn redo(&mut self) -> Option<&[Element]> {
        let next = self.cursor.map_or(0, |c| c + 1);
        let entry = self.entries.get(next)?;
        self.cursor = Some(next);
        Some(entry)
    }

    /// Drop every snapshot and the baseline.
    pub fn clear(&mut self) {
        self.baseline.clear();
        self.entries.clear();
        self.cursor = None;
    }

    /// Number of committed snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the snapshot matching the live list, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }

    /// Committed snapshots, oldest first.
    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }
}
