//! Self-adjusting range markers.
//!
//! A [`RangeMarker`] is a live interval over the document that shifts with
//! every edit, or invalidates when an edit destroys it. Markers are cheap
//! cloneable handles; the registry tracks them weakly, so dropping the last
//! handle retires the marker without explicit unregistration.
//!
//! The update case analysis (edit after / before / inside / prefix / suffix /
//! destroying) runs in exactly that order; greedy boundary flags decide
//! whether an insertion exactly at an endpoint is absorbed. A marker whose
//! recomputed range violates `start <= end <= length` is force-invalidated
//! and the anomaly reported, never silently clamped.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::{Rc, Weak};

use log::warn;

use crate::event::TextChange;

#[derive(Debug)]
pub(crate) struct MarkerState {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) greedy_left: bool,
    pub(crate) greedy_right: bool,
    pub(crate) valid: bool,
    pub(crate) survive_reload: bool,
}

/// A cloneable handle to a live, self-adjusting document interval.
///
/// Every API reading the range must check [`is_valid`](Self::is_valid) first;
/// an invalid marker keeps its last offsets but they are meaningless.
#[derive(Debug, Clone)]
pub struct RangeMarker {
    inner: Rc<RefCell<MarkerState>>,
}

impl RangeMarker {
    /// Current start offset. Meaningful only while the marker is valid.
    pub fn start(&self) -> usize {
        self.inner.borrow().start
    }

    /// Current exclusive end offset. Meaningful only while the marker is valid.
    pub fn end(&self) -> usize {
        self.inner.borrow().end
    }

    /// Whether the marker still tracks a live range.
    pub fn is_valid(&self) -> bool {
        self.inner.borrow().valid
    }

    /// The current range, or `None` once invalidated.
    pub fn range(&self) -> Option<Range<usize>> {
        let state = self.inner.borrow();
        state.valid.then(|| state.start..state.end)
    }

    /// Whether insertions exactly at the start are absorbed into the marker.
    pub fn is_greedy_to_left(&self) -> bool {
        self.inner.borrow().greedy_left
    }

    /// Whether insertions exactly at the end are absorbed into the marker.
    pub fn is_greedy_to_right(&self) -> bool {
        self.inner.borrow().greedy_right
    }

    /// Set start-boundary greediness.
    pub fn set_greedy_to_left(&self, greedy: bool) {
        self.inner.borrow_mut().greedy_left = greedy;
    }

    /// Set end-boundary greediness.
    pub fn set_greedy_to_right(&self, greedy: bool) {
        self.inner.borrow_mut().greedy_right = greedy;
    }

    /// Explicitly invalidate the marker; it stays inert from here on.
    pub fn dispose(&self) {
        self.inner.borrow_mut().valid = false;
    }

    /// Whether two handles refer to the same marker.
    pub fn same_marker(&self, other: &RangeMarker) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn downgrade(&self) -> Weak<RefCell<MarkerState>> {
        Rc::downgrade(&self.inner)
    }
}

/// Weak registry of all live markers of one document.
#[derive(Default)]
pub(crate) struct MarkerRegistry {
    markers: Vec<Weak<RefCell<MarkerState>>>,
}

impl MarkerRegistry {
    pub(crate) fn create(
        &mut self,
        start: usize,
        end: usize,
        survive_reload: bool,
    ) -> RangeMarker {
        let marker = RangeMarker {
            inner: Rc::new(RefCell::new(MarkerState {
                start,
                end,
                greedy_left: false,
                greedy_right: false,
                valid: true,
                survive_reload,
            })),
        };
        self.markers.push(marker.downgrade());
        marker
    }

    /// Number of tracked markers still reachable through at least one handle.
    pub(crate) fn live_count(&self) -> usize {
        self.markers.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Update every live marker for a committed change, compacting dropped
    /// and invalidated entries along the way. `new_length` is the document
    /// length after the change.
    pub(crate) fn apply_change(&mut self, change: &TextChange, new_length: usize) {
        let offset = change.offset;
        let old_len = change.old_len();
        let new_len = change.new_len();
        let old_length = (new_length as isize - change.delta()) as usize;
        let full_replacement = offset == 0 && old_len == old_length;

        self.markers.retain(|weak| {
            let Some(cell) = weak.upgrade() else {
                return false;
            };
            let mut state = cell.borrow_mut();
            if !state.valid {
                // Invalidation is permanent; stop tracking the marker even
                // while handles to it are still held.
                return false;
            }

            if full_replacement && state.survive_reload {
                // Persistent markers survive an external reload; clamp into
                // the new content instead of invalidating.
                state.start = state.start.min(new_length);
                state.end = state.end.clamp(state.start, new_length);
                return true;
            }

            apply_to_marker(&mut state, offset, old_len, new_len);

            if state.valid && state.end > new_length {
                warn!(
                    "range marker {}..{} escaped document bounds (length {}) after edit at {} ({} -> {} chars); invalidating",
                    state.start, state.end, new_length, offset, old_len, new_len
                );
                state.valid = false;
            }
            state.valid
        });
    }
}

/// The six-case update. Cases are checked in order; the first match wins.
fn apply_to_marker(state: &mut MarkerState, offset: usize, old_len: usize, new_len: usize) {
    let start = state.start;
    let end = state.end;
    let edit_end = offset + old_len;
    let delta = new_len as isize - old_len as isize;

    // 1. Edit fully after the end (or exactly at a non-greedy end).
    if end < offset || (end == offset && !state.greedy_right) {
        return;
    }
    // 2. Edit fully before the start (or ending exactly at a non-greedy
    //    start): shift both endpoints.
    if start > edit_end || (start == edit_end && !state.greedy_left) {
        state.start = shift(start, delta);
        state.end = shift(end, delta);
        return;
    }
    // 3. Edit fully inside: only the end moves.
    if start <= offset && end >= edit_end {
        state.end = shift(end, delta);
        return;
    }
    // 4. Edit replaces a prefix of the marker.
    if start >= offset && start <= edit_end && end > edit_end {
        state.start = offset + new_len;
        state.end = shift(end, delta);
        return;
    }
    // 5. Edit replaces a suffix of the marker.
    if end >= offset && end <= edit_end && start < offset {
        state.end = offset;
        return;
    }
    // 6. Anything else destroyed the marker.
    state.valid = false;
}

fn shift(value: usize, delta: isize) -> usize {
    (value as isize + delta) as usize
}
