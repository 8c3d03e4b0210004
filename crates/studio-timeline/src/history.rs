//! Snapshot-based undo/redo history.
//!
//! Each entry stores the state before and after one operation. Snapshots are
//! cheap: a cloned [`Timeline`] shares every track the operation did not
//! touch.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::edit::OperationKind;
use crate::selection::Selection;
use crate::timeline::Timeline;

/// Engine state captured for restoration.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timeline: Timeline,
    pub selection: Selection,
}

/// One recorded operation.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub kind: OperationKind,
    pub description: String,
    /// Unix time in milliseconds.
    pub timestamp_ms: u64,
    pub before: Snapshot,
    pub after: Snapshot,
}

impl HistoryEntry {
    pub fn new(
        kind: OperationKind,
        description: impl Into<String>,
        before: Snapshot,
        after: Snapshot,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            timestamp_ms: now_ms(),
            before,
            after,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Read-only view of the history for UI gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    /// Index of the most recently applied entry, `None` at the start of the log.
    pub current_index: Option<usize>,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
    pub len: usize,
    pub limit: usize,
}

/// Bounded undo/redo log.
///
/// Entries `[0, cursor)` are applied; entries from `cursor` on can be redone.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record an applied operation. Discards anything ahead of the cursor
    /// and evicts the oldest entry once over the limit.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push_back(entry);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len();
    }

    /// Step back; returns the entry whose `before` snapshot should be restored.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the entry whose `after` snapshot should be restored.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.entries.get(self.cursor)?;
        self.cursor += 1;
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_index: self.cursor.checked_sub(1),
            undo_description: self
                .cursor
                .checked_sub(1)
                .and_then(|i| self.entries.get(i))
                .map(|e| e.description.clone()),
            redo_description: self.entries.get(self.cursor).map(|e| e.description.clone()),
            len: self.entries.len(),
            limit: self.limit,
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
