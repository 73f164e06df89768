//! Change events and listener dispatch.
//!
//! Every committed edit is delivered to registered listeners as a synchronous
//! before/after pair. Listeners fire in ascending priority order, insertion
//! order within a priority: folding-like dependents see the change first,
//! then highlighting, then position trackers, then generic observers.
//! Listeners must not mutate the document; doing so fails with
//! [`DocumentError::NestedMutation`](crate::DocumentError::NestedMutation).

/// One atomic text change: `old_fragment` at `offset` was replaced by
/// `new_fragment`.
///
/// The same value is delivered before and after the change is applied, so
/// dependents can compute deltas against the old state in `before_change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Character offset of the change.
    pub offset: usize,
    /// Exact replaced text (may be empty for a pure insertion).
    pub old_fragment: String,
    /// Exact inserted text (may be empty for a pure removal).
    pub new_fragment: String,
    /// Modification stamp before the change.
    pub old_stamp: u64,
    /// Modification stamp after the change.
    pub new_stamp: u64,
}

impl TextChange {
    /// Length of the replaced text in characters.
    pub fn old_len(&self) -> usize {
        self.old_fragment.chars().count()
    }

    /// Length of the inserted text in characters.
    pub fn new_len(&self) -> usize {
        self.new_fragment.chars().count()
    }

    /// Exclusive end of the replaced range, in pre-change offsets.
    pub fn old_end(&self) -> usize {
        self.offset + self.old_len()
    }

    /// Exclusive end of the inserted range, in post-change offsets.
    pub fn new_end(&self) -> usize {
        self.offset + self.new_len()
    }

    /// Net length change, `new_len - old_len`.
    pub fn delta(&self) -> isize {
        self.new_len() as isize - self.old_len() as isize
    }
}

/// A synchronous observer of document changes.
///
/// Both hooks default to no-ops so implementors can override just one side.
pub trait DocumentListener {
    /// Called before the change is applied; derived state still reflects the
    /// old text.
    fn before_change(&mut self, _change: &TextChange) {}

    /// Called after the change is applied and all internal indexes are
    /// consistent again.
    fn after_change(&mut self, _change: &TextChange) {}
}

/// Dispatch order for document listeners, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    /// Fold-topology dependents; notified first.
    Folding,
    /// Highlighting dependents.
    Highlighting,
    /// Position trackers (carets, bookmarks, navigation history).
    PositionTracking,
    /// Generic observers; notified last.
    Observer,
}

struct Entry {
    priority: ListenerPriority,
    seq: usize,
    listener: Box<dyn DocumentListener>,
}

/// Priority-ordered listener registry.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<Entry>,
    next_seq: usize,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, priority: ListenerPriority, listener: Box<dyn DocumentListener>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self
            .entries
            .partition_point(|e| (e.priority, e.seq) <= (priority, seq));
        self.entries.insert(at, Entry {
            priority,
            seq,
            listener,
        });
    }

    pub(crate) fn fire_before(&mut self, change: &TextChange) {
        for entry in &mut self.entries {
            entry.listener.before_change(change);
        }
    }

    pub(crate) fn fire_after(&mut self, change: &TextChange) {
        for entry in &mut self.entries {
            entry.listener.after_change(change);
        }
    }
}
