//! Bounded undo/redo over whole-tree snapshots.
//!
//! Snapshots are [`ElementTree`] values. A tree is never modified after it is built, so keeping
//! one is as good as a deep copy while sharing every subtree the edits did not touch.

use std::collections::VecDeque;

use crate::tree::ElementTree;

/// Snapshots kept by default, the current one included.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub enum HistoryAction {
    /// Record `tree` as the new current state, discarding anything that could be redone.
    SaveState(ElementTree),
    Undo,
    Redo,
}

/// A cursor over at most `capacity` snapshots.
///
/// There is always at least one snapshot: the state the history was created with. Once the
/// capacity is reached, every save silently drops the oldest snapshot.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<ElementTree>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(ElementTree::new())
    }
}

impl History {
    pub fn new(initial: ElementTree) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    /// `capacity` is raised to 1 if zero.
    pub fn with_capacity(initial: ElementTree, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut snapshots = VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity,
        }
    }

    /// Apply `action` and return the snapshot under the cursor afterwards.
    ///
    /// An `Undo` or `Redo` with nothing to move to leaves the cursor where it is.
    pub fn reduce(&mut self, action: HistoryAction) -> &ElementTree {
        match action {
            HistoryAction::SaveState(tree) => self.save_state(tree),
            HistoryAction::Undo => {
                self.undo();
            }
            HistoryAction::Redo => {
                self.redo();
            }
        }
        self.current()
    }

    pub fn save_state(&mut self, tree: ElementTree) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(tree);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` if already at the oldest.
    pub fn undo(&mut self) -> Option<&ElementTree> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one snapshot. `None` if already at the newest.
    pub fn redo(&mut self) -> Option<&ElementTree> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &ElementTree {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of retained snapshots, never more than [`Self::capacity`] and never zero.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &ElementTree> {
        self.snapshots.iter()
    }

    /// Forget everything and start over from `initial`.
    pub fn reset(&mut self, initial: ElementTree) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.cursor = 0;
    }
}
