//! Bounded linear undo/redo over snapshots of the object collection.
//!
//! Every mutation pushes the collection as it was *before* the mutation. The
//! cursor points at the most recent snapshot. Undo requires `index > 0`, so
//! after a single push there is nothing to step back to; restoring the very
//! first snapshot is only reachable once a second one exists.

use chrono::{DateTime, Utc};
use maskkit_core::constants::HISTORY_CAPACITY;
use maskkit_core::AnnotationObject;
use std::collections::VecDeque;

/// Deep snapshot of the object collection.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub objects: Vec<AnnotationObject>,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot history with FIFO eviction.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    capacity: usize,
}

impl HistoryManager {
    /// Creates an empty history holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Records a snapshot, dropping any redo tail and the oldest overflow.
    pub fn push(&mut self, objects: &[AnnotationObject]) {
        let keep = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push_back(HistoryEntry {
            objects: objects.to_vec(),
            timestamp: Utc::now(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Steps back one snapshot and returns a copy of it.
    pub fn undo(&mut self) -> Option<Vec<AnnotationObject>> {
        let index = self.cursor.filter(|&i| i > 0)?;
        let objects = self.entries.get(index - 1)?.objects.clone();
        self.cursor = Some(index - 1);
        Some(objects)
    }

    /// Steps forward one snapshot and returns a copy of it.
    pub fn redo(&mut self) -> Option<Vec<AnnotationObject>> {
        let index = self.cursor?;
        let objects = self.entries.get(index + 1)?.objects.clone();
        self.cursor = Some(index + 1);
        Some(objects)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|i| i + 1 < self.entries.len())
    }

    /// Cursor position, `None` while empty.
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Drops every snapshot and resets the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
