//! The document facade.
//!
//! [`Document`] owns the character buffer and every derived index, and is the
//! single entry point for mutation. An edit flows one way: validation →
//! before notification → buffer commit → line index update → marker update →
//! after notification. Derived structures are therefore always consistent by
//! the time the after notification fires, and queries issued between the two
//! notifications of one edit are a usage error.
//!
//! Single-threaded, synchronous ownership model: one logical owner mutates
//! the document; no internal locking exists.

use crate::error::DocumentError;
use crate::event::{DocumentListener, ListenerPriority, ListenerRegistry, TextChange};
use crate::line_index::{LineEntry, LineIndex};
use crate::markers::{MarkerRegistry, RangeMarker};
use crate::text_buffer::TextBuffer;

/// A mutable text document with live line indexing, self-adjusting markers
/// and guarded blocks.
pub struct Document {
    buffer: TextBuffer,
    line_index: LineIndex,
    markers: MarkerRegistry,
    guarded_blocks: Vec<RangeMarker>,
    guard_check_depth: u32,
    guard_suppress_depth: u32,
    listeners: ListenerRegistry,
    read_only: bool,
    in_event: bool,
}

impl Document {
    /// Create a document over the given text. `'\r'` must already be
    /// normalized away by the caller.
    pub fn new(text: &str) -> Result<Self, DocumentError> {
        if text.contains('\r') {
            return Err(DocumentError::CarriageReturn);
        }
        Ok(Self {
            buffer: TextBuffer::new(text),
            line_index: LineIndex::new(text),
            markers: MarkerRegistry::default(),
            guarded_blocks: Vec::new(),
            guard_check_depth: 0,
            guard_suppress_depth: 0,
            listeners: ListenerRegistry::default(),
            read_only: false,
            in_event: false,
        })
    }

    // ---- queries ----------------------------------------------------------

    /// Document length in characters.
    pub fn length(&self) -> usize {
        self.buffer.len()
    }

    /// Current modification stamp; changes with every committed edit.
    pub fn modification_stamp(&self) -> u64 {
        self.buffer.stamp()
    }

    /// The full text.
    pub fn text(&self) -> String {
        debug_assert!(!self.in_event, "query during change dispatch");
        self.buffer.text()
    }

    /// The text in `[start, end)`.
    pub fn text_range(&self, start: usize, end: usize) -> Result<String, DocumentError> {
        debug_assert!(!self.in_event, "query during change dispatch");
        self.check_range(start, end)?;
        Ok(self.buffer.fragment(start, end))
    }

    /// The character at `offset`, if in bounds.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    /// Number of lines; an empty document has one empty line.
    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// The line entry at `line`, if it exists.
    pub fn line_entry(&self, line: usize) -> Option<&LineEntry> {
        debug_assert!(!self.in_event, "query during change dispatch");
        self.line_index.entry(line)
    }

    /// Index of the line containing `offset`; `offset == length` belongs to
    /// the last line.
    pub fn line_number_at(&self, offset: usize) -> Result<usize, DocumentError> {
        debug_assert!(!self.in_event, "query during change dispatch");
        if offset > self.length() {
            return Err(DocumentError::OffsetOutOfBounds {
                offset,
                length: self.length(),
            });
        }
        Ok(self.line_index.line_index_for_offset(offset))
    }

    /// Text of line `line`, separator excluded.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let entry = self.line_index.entry(line)?;
        Some(self.buffer.fragment(entry.start, entry.end - entry.separator_len))
    }

    pub(crate) fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    // ---- read-only flag ---------------------------------------------------

    /// Whether mutation is currently permitted.
    pub fn is_writable(&self) -> bool {
        !self.read_only
    }

    /// Toggle the read-only flag; writes against a read-only document fail
    /// with [`DocumentError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    // ---- mutation ---------------------------------------------------------

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), DocumentError> {
        if offset > self.length() {
            return Err(DocumentError::OffsetOutOfBounds {
                offset,
                length: self.length(),
            });
        }
        self.apply_change(offset, 0, text)
    }

    /// Remove the text in `[start, end)`.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<(), DocumentError> {
        self.check_range(start, end)?;
        self.apply_change(start, end - start, "")
    }

    /// Replace the text in `[start, end)` with `text`.
    ///
    /// Any common prefix and suffix of the old and new text is trimmed before
    /// the edit is recorded, so markers and listeners observe the smallest
    /// affected region; a replacement that changes nothing commits nothing.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<(), DocumentError> {
        self.check_range(start, end)?;
        self.apply_change(start, end - start, text)
    }

    fn apply_change(
        &mut self,
        offset: usize,
        old_len: usize,
        new_text: &str,
    ) -> Result<(), DocumentError> {
        if self.in_event {
            return Err(DocumentError::NestedMutation);
        }
        if self.read_only {
            return Err(DocumentError::ReadOnly);
        }
        if new_text.contains('\r') {
            return Err(DocumentError::CarriageReturn);
        }

        let old_fragment = self.buffer.fragment(offset, offset + old_len);
        let (offset, old_fragment, new_fragment) =
            trim_common_affixes(offset, old_fragment, new_text);
        if old_fragment.is_empty() && new_fragment.is_empty() {
            return Ok(());
        }

        let trimmed_old_len = old_fragment.chars().count();
        self.check_guarded(offset, trimmed_old_len)?;

        let old_stamp = self.buffer.stamp();
        let change = TextChange {
            offset,
            old_fragment,
            new_fragment,
            old_stamp,
            new_stamp: old_stamp + 1,
        };

        self.in_event = true;
        self.listeners.fire_before(&change);
        self.buffer.splice(offset, trimmed_old_len, &change.new_fragment);
        self.line_index.update(&change, &self.buffer);
        self.markers.apply_change(&change, self.buffer.len());
        self.listeners.fire_after(&change);
        self.in_event = false;
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), DocumentError> {
        if start > end || end > self.length() {
            return Err(DocumentError::InvalidRange {
                start,
                end,
                length: self.length(),
            });
        }
        Ok(())
    }

    // ---- listeners --------------------------------------------------------

    /// Register a change listener at the given priority. Listeners at the
    /// same priority fire in registration order.
    pub fn add_listener(&mut self, priority: ListenerPriority, listener: Box<dyn DocumentListener>) {
        self.listeners.add(priority, listener);
    }

    // ---- markers ----------------------------------------------------------

    /// Create a range marker over `[start, end)`. Boundary greediness can be
    /// adjusted on the returned handle.
    pub fn create_range_marker(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<RangeMarker, DocumentError> {
        self.check_range(start, end)?;
        Ok(self.markers.create(start, end, false))
    }

    /// Create a range marker that survives a whole-document replacement
    /// (external reload) by clamping instead of invalidating.
    pub fn create_range_marker_surviving_reload(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<RangeMarker, DocumentError> {
        self.check_range(start, end)?;
        Ok(self.markers.create(start, end, true))
    }

    /// Number of markers still referenced by at least one handle.
    pub fn live_marker_count(&self) -> usize {
        self.markers.live_count()
    }

    // ---- guarded blocks ---------------------------------------------------

    /// Mark `[start, end)` as read-only while guard checking is active.
    ///
    /// The returned marker tracks the protected span across edits elsewhere
    /// in the document; disposing it lifts the protection.
    pub fn create_guarded_block(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<RangeMarker, DocumentError> {
        self.check_range(start, end)?;
        let marker = self.markers.create(start, end, false);
        self.guarded_blocks.push(marker.clone());
        Ok(marker)
    }

    /// Remove a guarded block created by
    /// [`create_guarded_block`](Self::create_guarded_block).
    pub fn remove_guarded_block(&mut self, block: &RangeMarker) {
        self.guarded_blocks.retain(|b| !b.same_marker(block));
        block.dispose();
    }

    /// All currently valid guarded blocks.
    pub fn guarded_blocks(&self) -> Vec<RangeMarker> {
        self.guarded_blocks
            .iter()
            .filter(|b| b.is_valid())
            .cloned()
            .collect()
    }

    /// The guarded block containing `offset`, if any.
    pub fn get_guarded_block(&self, offset: usize) -> Option<RangeMarker> {
        self.guarded_blocks
            .iter()
            .find(|b| b.range().is_some_and(|r| r.contains(&offset)))
            .cloned()
    }

    /// Enable guarded-block checking; nestable, balanced by
    /// [`stop_guarded_block_checking`](Self::stop_guarded_block_checking).
    pub fn start_guarded_block_checking(&mut self) {
        self.guard_check_depth += 1;
    }

    /// Disable one level of guarded-block checking.
    pub fn stop_guarded_block_checking(&mut self) {
        debug_assert!(self.guard_check_depth > 0, "unbalanced guard checking");
        self.guard_check_depth = self.guard_check_depth.saturating_sub(1);
    }

    /// Run `op` with guarded-fragment errors suppressed, for trusted
    /// programmatic edits.
    pub fn suppress_guarded_exceptions<R>(
        &mut self,
        op: impl FnOnce(&mut Document) -> R,
    ) -> R {
        self.guard_suppress_depth += 1;
        let result = op(self);
        self.guard_suppress_depth -= 1;
        result
    }

    /// Reject edits that touch a guarded block while checking is active.
    ///
    /// A pure insertion is rejected only strictly inside a block; boundary
    /// insertions do not alter protected text. Removals and replacements are
    /// rejected on any overlap.
    fn check_guarded(&self, offset: usize, old_len: usize) -> Result<(), DocumentError> {
        if self.guard_check_depth == 0 || self.guard_suppress_depth > 0 {
            return Ok(());
        }
        let edit_end = offset + old_len;
        for block in &self.guarded_blocks {
            let Some(range) = block.range() else { continue };
            let hit = if old_len == 0 {
                range.start < offset && offset < range.end
            } else {
                range.start < edit_end && offset < range.end
            };
            if hit {
                return Err(DocumentError::GuardedFragment {
                    edit_start: offset,
                    edit_end,
                    block_start: range.start,
                    block_end: range.end,
                });
            }
        }
        Ok(())
    }
}

/// Trim the common prefix and suffix of the old and new fragments, shifting
/// the offset past the trimmed prefix.
fn trim_common_affixes(offset: usize, old: String, new: &str) -> (usize, String, String) {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let max_prefix = old_chars.len().min(new_chars.len());
    let mut prefix = 0;
    while prefix < max_prefix && old_chars[prefix] == new_chars[prefix] {
        prefix += 1;
    }

    let max_suffix = max_prefix - prefix;
    let mut suffix = 0;
    while suffix < max_suffix
        && old_chars[old_chars.len() - 1 - suffix] == new_chars[new_chars.len() - 1 - suffix]
    {
        suffix += 1;
    }

    if prefix == 0 && suffix == 0 {
        return (offset, old, new.to_string());
    }
    let trimmed_old: String = old_chars[prefix..old_chars.len() - suffix].iter().collect();
    let trimmed_new: String = new_chars[prefix..new_chars.len() - suffix].iter().collect();
    (offset + prefix, trimmed_old, trimmed_new)
}
