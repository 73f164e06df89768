//! Incremental line-boundary index.
//!
//! Maintains an ordered table of line segments covering `[0, length]` with no
//! gaps. Each entry's `end` includes the line separator, except possibly the
//! final line; a trailing zero-length entry exists iff the text ends with a
//! separator, so N separators always yield N + 1 lines.
//!
//! Updates take one of two paths, selected by the edit's line-feed delta: a
//! constant-time single-line adjustment when no separator is added or
//! removed, or a retokenize-and-splice of the affected span otherwise.

use crate::event::TextChange;
use crate::text_buffer::TextBuffer;

/// One line segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    /// Start character offset of the line.
    pub start: usize,
    /// Exclusive end offset, including the separator if present.
    pub end: usize,
    /// Separator length: 1 for `'\n'`, 0 for the final line.
    pub separator_len: usize,
    /// Whether this line has been touched since the index was built.
    pub modified: bool,
}

impl LineEntry {
    /// Length of the line content, separator excluded.
    pub fn content_len(&self) -> usize {
        self.end - self.start - self.separator_len
    }
}

/// Ordered line-segment table, incrementally updated from buffer edits.
pub struct LineIndex {
    entries: Vec<LineEntry>,
}

impl LineIndex {
    /// Build the index for the given text.
    pub fn new(text: &str) -> Self {
        let mut entries = tokenize(0, text);
        for entry in &mut entries {
            entry.modified = false;
        }
        let mut index = Self { entries };
        index.fix_trailing(text.chars().count(), text.ends_with('\n'), false);
        index
    }

    /// Number of lines. An empty document has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.entries.len()
    }

    /// The entry for line `index`, if it exists.
    pub fn entry(&self, index: usize) -> Option<&LineEntry> {
        self.entries.get(index)
    }

    /// All entries, in order.
    pub fn entries(&self) -> &[LineEntry] {
        &self.entries
    }

    /// Index of the line containing `offset`.
    ///
    /// `offset` must satisfy `offset <= length`; an offset equal to a line
    /// boundary belongs to the following line, and `offset == length` to the
    /// last line.
    pub fn line_index_for_offset(&self, offset: usize) -> usize {
        debug_assert!(!self.entries.is_empty());
        let after = self.entries.partition_point(|e| e.start <= offset);
        after.saturating_sub(1)
    }

    /// Total covered length; equals the buffer length at all times.
    pub fn text_length(&self) -> usize {
        self.entries.last().map_or(0, |e| e.end)
    }

    /// Apply a committed buffer change. `buffer` already holds the new text.
    pub(crate) fn update(&mut self, change: &TextChange, buffer: &TextBuffer) {
        let old_feeds = change.old_fragment.matches('\n').count();
        let new_feeds = change.new_fragment.matches('\n').count();

        if old_feeds == 0 && new_feeds == 0 {
            self.update_single_line(change);
        } else {
            self.update_multi_line(change, buffer);
        }

        debug_assert_eq!(self.text_length(), buffer.len());
    }

    /// Fast path: the edit stays within one line, only its length changes.
    fn update_single_line(&mut self, change: &TextChange) {
        let delta = change.delta();
        let index = self.line_index_for_offset(change.offset);
        let entry = &mut self.entries[index];
        entry.end = shift(entry.end, delta);
        entry.modified = true;
        for entry in &mut self.entries[index + 1..] {
            entry.start = shift(entry.start, delta);
            entry.end = shift(entry.end, delta);
        }
    }

    /// Slow path: retokenize the merged span (prefix of the first affected
    /// line + new fragment + suffix of the last affected line) and splice it
    /// over the affected entries, shifting everything after by the delta.
    fn update_multi_line(&mut self, change: &TextChange, buffer: &TextBuffer) {
        let delta = change.delta();
        let first = self.line_index_for_offset(change.offset);
        let last = self.line_index_for_offset(change.old_end());

        let region_start = self.entries[first].start;
        let new_region_end = shift(self.entries[last].end, delta);
        let fragment = buffer.fragment(region_start, new_region_end);
        let replacement = tokenize(region_start, &fragment);
        let replacement_len = replacement.len();

        self.entries.splice(first..=last, replacement);
        let shifted_from = first + replacement_len;
        for entry in &mut self.entries[shifted_from..] {
            entry.start = shift(entry.start, delta);
            entry.end = shift(entry.end, delta);
        }

        let len = buffer.len();
        let ends_with_separator = len > 0 && buffer.char_at(len - 1) == Some('\n');
        self.fix_trailing(len, ends_with_separator, true);
    }

    /// Re-append the trailing empty line if the text ends with a separator;
    /// guarantee a single empty entry for an empty document.
    fn fix_trailing(&mut self, length: usize, ends_with_separator: bool, modified: bool) {
        if self.entries.is_empty() {
            self.entries.push(LineEntry {
                start: 0,
                end: 0,
                separator_len: 0,
                modified,
            });
            return;
        }
        if ends_with_separator {
            let last = self.entries.last().copied();
            let needs_trailing = last.is_some_and(|e| e.end == length && e.separator_len > 0);
            if needs_trailing {
                self.entries.push(LineEntry {
                    start: length,
                    end: length,
                    separator_len: 0,
                    modified,
                });
            }
        }
    }
}

fn shift(value: usize, delta: isize) -> usize {
    (value as isize + delta) as usize
}

/// Split `fragment` (starting at absolute offset `base`) into line entries.
/// Produces no entry for an empty fragment and no trailing empty entry; the
/// caller maintains that invariant separately.
fn tokenize(base: usize, fragment: &str) -> Vec<LineEntry> {
    let mut entries = Vec::new();
    let mut line_start = base;
    let mut offset = base;
    for ch in fragment.chars() {
        offset += 1;
        if ch == '\n' {
            entries.push(LineEntry {
                start: line_start,
                end: offset,
                separator_len: 1,
                modified: true,
            });
            line_start = offset;
        }
    }
    if line_start < offset {
        entries.push(LineEntry {
            start: line_start,
            end: offset,
            separator_len: 0,
            modified: true,
        });
    }
    entries
}
