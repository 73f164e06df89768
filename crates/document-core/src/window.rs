//! A writable sub-range view over a host document.
//!
//! `DocumentWindow` exposes a fragment of a document under window-relative
//! offsets, translating every call to host coordinates and delegating to the
//! host. It is backed by a marker greedy on both sides, so edits at the
//! window's boundaries grow the window and edits elsewhere in the host shift
//! it. If a host edit swallows the window, the view goes invalid and every
//! operation on it fails.

use std::ops::Range;

use crate::document::Document;
use crate::error::DocumentError;
use crate::markers::RangeMarker;

/// A sub-range view over a [`Document`], addressed by window-relative offsets.
pub struct DocumentWindow {
    marker: RangeMarker,
}

impl DocumentWindow {
    /// Create a window over `[start, end)` of `doc`.
    pub fn new(doc: &mut Document, start: usize, end: usize) -> Result<Self, DocumentError> {
        let marker = doc.create_range_marker(start, end)?;
        marker.set_greedy_to_left(true);
        marker.set_greedy_to_right(true);
        Ok(Self { marker })
    }

    /// Whether the window still tracks a live host range.
    pub fn is_valid(&self) -> bool {
        self.marker.is_valid()
    }

    /// The window's current range in host coordinates, if still valid.
    pub fn host_range(&self) -> Option<Range<usize>> {
        self.marker.range()
    }

    /// Current window length in characters.
    pub fn length(&self) -> usize {
        self.host_range().map_or(0, |r| r.end - r.start)
    }

    /// The window's text.
    pub fn text(&self, doc: &Document) -> Option<String> {
        let range = self.host_range()?;
        doc.text_range(range.start, range.end).ok()
    }

    /// Translate a window-relative offset to a host offset.
    pub fn to_host_offset(&self, offset: usize) -> Option<usize> {
        let range = self.host_range()?;
        (offset <= range.end - range.start).then(|| range.start + offset)
    }

    /// Translate a host offset into the window, if it falls inside it.
    pub fn from_host_offset(&self, host_offset: usize) -> Option<usize> {
        let range = self.host_range()?;
        range.contains(&host_offset).then(|| host_offset - range.start)
    }

    /// Insert `text` at a window-relative offset.
    pub fn insert(&self, doc: &mut Document, offset: usize, text: &str) -> Result<(), DocumentError> {
        let host = self.checked_host(offset)?;
        doc.insert(host, text)
    }

    /// Remove the window-relative range `[start, end)`.
    pub fn remove(&self, doc: &mut Document, start: usize, end: usize) -> Result<(), DocumentError> {
        let (host_start, host_end) = self.checked_host_range(start, end)?;
        doc.remove(host_start, host_end)
    }

    /// Replace the window-relative range `[start, end)` with `text`.
    pub fn replace(
        &self,
        doc: &mut Document,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<(), DocumentError> {
        let (host_start, host_end) = self.checked_host_range(start, end)?;
        doc.replace(host_start, host_end, text)
    }

    /// Detach the window from the host, releasing its marker.
    pub fn dispose(&self) {
        self.marker.dispose();
    }

    fn checked_host(&self, offset: usize) -> Result<usize, DocumentError> {
        self.to_host_offset(offset).ok_or(DocumentError::OffsetOutOfBounds {
            offset,
            length: self.length(),
        })
    }

    fn checked_host_range(&self, start: usize, end: usize) -> Result<(usize, usize), DocumentError> {
        let length = self.length();
        if start > end || end > length || !self.is_valid() {
            return Err(DocumentError::InvalidRange { start, end, length });
        }
        let range = self.host_range().ok_or(DocumentError::InvalidRange { start, end, length })?;
        Ok((range.start + start, range.start + end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_text_and_translation() {
        let mut doc = Document::new("head [body] tail").unwrap();
        let window = DocumentWindow::new(&mut doc, 6, 10).unwrap();
        assert_eq!(window.text(&doc).as_deref(), Some("body"));
        assert_eq!(window.to_host_offset(0), Some(6));
        assert_eq!(window.to_host_offset(4), Some(10));
        assert_eq!(window.to_host_offset(5), None);
        assert_eq!(window.from_host_offset(8), Some(2));
        assert_eq!(window.from_host_offset(12), None);
    }

    #[test]
    fn test_window_edit_delegates_to_host() {
        let mut doc = Document::new("head [body] tail").unwrap();
        let window = DocumentWindow::new(&mut doc, 6, 10).unwrap();
        window.replace(&mut doc, 0, 4, "BODY").unwrap();
        assert_eq!(doc.text(), "head [BODY] tail");
        window.insert(&mut doc, 4, "!").unwrap();
        assert_eq!(doc.text(), "head [BODY!] tail");
        assert_eq!(window.text(&doc).as_deref(), Some("BODY!"));
    }

    #[test]
    fn test_boundary_insert_grows_window() {
        let mut doc = Document::new("abcdef").unwrap();
        let window = DocumentWindow::new(&mut doc, 2, 4).unwrap();
        window.insert(&mut doc, 0, "X").unwrap();
        assert_eq!(window.text(&doc).as_deref(), Some("Xcd"));
        window.insert(&mut doc, 3, "Y").unwrap();
        assert_eq!(window.text(&doc).as_deref(), Some("XcdY"));
    }

    #[test]
    fn test_host_edit_shifts_window() {
        let mut doc = Document::new("abcdef").unwrap();
        let window = DocumentWindow::new(&mut doc, 2, 4).unwrap();
        doc.insert(0, "__").unwrap();
        assert_eq!(window.host_range(), Some(4..6));
        assert_eq!(window.text(&doc).as_deref(), Some("cd"));
    }

    #[test]
    fn test_swallowed_window_goes_invalid() {
        let mut doc = Document::new("abcdef").unwrap();
        let window = DocumentWindow::new(&mut doc, 2, 4).unwrap();
        doc.remove(1, 5).unwrap();
        assert!(!window.is_valid());
        assert_eq!(window.text(&doc), None);
        assert!(matches!(
            window.insert(&mut doc, 0, "x"),
            Err(DocumentError::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_window_range() {
        let mut doc = Document::new("abcdef").unwrap();
        let window = DocumentWindow::new(&mut doc, 2, 4).unwrap();
        assert!(matches!(
            window.remove(&mut doc, 1, 5),
            Err(DocumentError::InvalidRange { length: 2, .. })
        ));
    }
}
