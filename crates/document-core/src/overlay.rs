//! Overlay resolution: merging layered highlight sources into segments.
//!
//! The painter does not understand tokens, selections or folds. It understands
//! a flat run of maximal segments, each with one fully merged attribute set.
//! [`OverlayIterator`] produces that run: a lazy, forward-only sweep that at
//! every step finds the next breakpoint among all source boundaries and merges
//! the sources active over the gap.
//!
//! Sources and their fixed layers (see [`layer`](crate::attributes::layer)):
//! lexer tokens, range highlighters, the selection, the caret row, guarded
//! blocks and collapsed fold placeholders. Higher layer wins per attribute
//! field; within one layer the narrower range wins, then registration order.
//!
//! The iterator snapshots every source when it begins. Segments are immutable
//! values; mutating the document or fold model mid-iteration does not affect
//! segments already computed, but a fresh iteration must be started to observe
//! the change.

use std::ops::Range;

use crate::attributes::{TextAttributes, layer};
use crate::document::Document;
use crate::folding::FoldModel;

/// One lexer token with its syntax attributes, supplied by an external lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Syntax attributes for the token.
    pub attributes: TextAttributes,
}

/// How a highlighter's affected range relates to its exact range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetArea {
    /// The highlighter affects exactly its own range.
    #[default]
    Exact,
    /// The affected range is widened to whole line boundaries.
    WholeLines,
}

/// A range highlighter supplied by a collaborator (inspections, search
/// results, the debugger and so on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Merge layer, higher wins. See [`layer`].
    pub layer: i32,
    /// Attributes contributed by this highlighter.
    pub attributes: TextAttributes,
    /// Whether the affected range is widened to whole lines.
    pub target_area: TargetArea,
    /// Whether the highlight extends past the end of the line when painted.
    pub after_end_of_line: bool,
}

/// Scheme attributes for the implicit sources and the fallback defaults.
#[derive(Debug, Clone, Default)]
pub struct OverlayPalette {
    /// Defaults every unset attribute field falls back to.
    pub default: TextAttributes,
    /// Attributes of the selection range.
    pub selection: TextAttributes,
    /// Attributes of the caret row.
    pub caret_row: TextAttributes,
    /// Attributes overlaid on guarded blocks.
    pub guarded_block: TextAttributes,
    /// Attributes of collapsed fold placeholders.
    pub fold_placeholder: TextAttributes,
}

/// Per-view inputs to a sweep, passed by value.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The selected range, if any.
    pub selection: Option<Range<usize>>,
    /// The caret offset; highlights its row.
    pub caret: Option<usize>,
}

/// One maximal run of text with a constant merged attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// The fully merged attributes for the run.
    pub attributes: TextAttributes,
    /// Placeholder text when the run is a collapsed fold region.
    pub placeholder: Option<String>,
    /// Whether some contributing highlighter paints past the end of line.
    pub after_end_of_line: bool,
}

/// A snapshotted contributor with its resolved affected range.
#[derive(Debug, Clone)]
struct SourceSpan {
    start: usize,
    end: usize,
    layer: i32,
    /// Width of the affected range, narrower wins within a layer.
    width: usize,
    /// Registration sequence, earlier wins the final tie.
    seq: usize,
    attributes: TextAttributes,
    after_end_of_line: bool,
}

/// Snapshot of one collapsed top-level fold region.
#[derive(Debug, Clone)]
struct FoldSpan {
    start: usize,
    end: usize,
    placeholder: String,
}

/// Forward-only segment sweep. Created by [`OverlayIterator::begin`] and
/// consumed as a plain [`Iterator`]; not restartable.
pub struct OverlayIterator {
    spans: Vec<SourceSpan>,
    folds: Vec<FoldSpan>,
    default_attributes: TextAttributes,
    fold_attributes: TextAttributes,
    length: usize,
    offset: usize,
    /// Index of the first span not yet activated; `spans` is sorted by start.
    next_span: usize,
    /// Index of the first fold not yet passed; `folds` is sorted by start.
    next_fold: usize,
    /// Indices into `spans` whose range covers the current offset.
    active: Vec<usize>,
}

impl OverlayIterator {
    /// Snapshot all sources and begin a sweep at `start_offset`.
    ///
    /// Token and highlighter ranges are clamped to the document; empty ones
    /// are dropped. `WholeLines` highlighters have their affected range
    /// widened to line boundaries here, once.
    pub fn begin(
        doc: &Document,
        folds: &FoldModel,
        palette: &OverlayPalette,
        view: &ViewState,
        tokens: &[TokenSpan],
        highlighters: &[Highlighter],
        start_offset: usize,
    ) -> Self {
        let length = doc.length();
        let mut spans = Vec::with_capacity(tokens.len() + highlighters.len() + 3);

        for token in tokens {
            push_span(
                &mut spans,
                token.start,
                token.end,
                length,
                layer::SYNTAX,
                usize::MAX,
                token.attributes,
                false,
            );
        }

        for (seq, hl) in highlighters.iter().enumerate() {
            let (start, end) = match hl.target_area {
                TargetArea::Exact => (hl.start, hl.end),
                TargetArea::WholeLines => widen_to_lines(doc, hl.start, hl.end),
            };
            push_span(
                &mut spans,
                start,
                end,
                length,
                hl.layer,
                seq,
                hl.attributes,
                hl.after_end_of_line,
            );
        }

        if let Some(selection) = &view.selection {
            push_span(
                &mut spans,
                selection.start,
                selection.end,
                length,
                layer::SELECTION,
                usize::MAX,
                palette.selection,
                false,
            );
        }

        if let Some(caret) = view.caret
            && caret <= length
        {
            let index = doc.line_index().line_index_for_offset(caret);
            if let Some(entry) = doc.line_entry(index) {
                push_span(
                    &mut spans,
                    entry.start,
                    entry.end,
                    length,
                    layer::CARET_ROW,
                    usize::MAX,
                    palette.caret_row,
                    false,
                );
            }
        }

        for block in doc.guarded_blocks() {
            push_span(
                &mut spans,
                block.start(),
                block.end(),
                length,
                layer::GUARDED_BLOCKS,
                usize::MAX,
                palette.guarded_block,
                false,
            );
        }

        spans.sort_by_key(|span| span.start);

        let folds = folds
            .fetch_top_level(doc)
            .iter()
            .filter(|region| !region.is_expanded())
            .map(|region| FoldSpan {
                start: region.start(),
                end: region.end(),
                placeholder: region.placeholder(),
            })
            .collect();

        let mut fold_attributes = palette.fold_placeholder;
        fold_attributes.fill_missing_from(&palette.default);

        Self {
            spans,
            folds,
            default_attributes: palette.default,
            fold_attributes,
            length,
            offset: start_offset.min(length),
            next_span: 0,
            next_fold: 0,
            active: Vec::new(),
        }
    }

    /// Add spans entered at the current offset, drop spans already passed.
    fn refresh_active(&mut self) {
        while self.next_span < self.spans.len() && self.spans[self.next_span].start <= self.offset {
            if self.spans[self.next_span].end > self.offset {
                self.active.push(self.next_span);
            }
            self.next_span += 1;
        }
        let spans = &self.spans;
        let offset = self.offset;
        self.active.retain(|&index| spans[index].end > offset);
    }

    /// The nearest source boundary strictly past the current offset.
    fn breakpoint(&self) -> usize {
        let mut next = self.length;
        for &index in &self.active {
            next = next.min(self.spans[index].end);
        }
        if self.next_span < self.spans.len() {
            next = next.min(self.spans[self.next_span].start);
        }
        if self.next_fold < self.folds.len() {
            next = next.min(self.folds[self.next_fold].start);
        }
        next
    }

    /// Merge the active set: layer descending, then narrower range, then
    /// registration order; first contributor of each field wins.
    fn merge_active(&self) -> (TextAttributes, bool) {
        let mut order: Vec<usize> = self.active.clone();
        order.sort_by_key(|&index| {
            let span = &self.spans[index];
            (std::cmp::Reverse(span.layer), span.width, span.seq)
        });

        let mut merged = TextAttributes::EMPTY;
        let mut after_end_of_line = false;
        for index in order {
            let span = &self.spans[index];
            merged.fill_missing_from(&span.attributes);
            after_end_of_line |= span.after_end_of_line;
        }
        merged.fill_missing_from(&self.default_attributes);
        (merged, after_end_of_line)
    }
}

impl Iterator for OverlayIterator {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.offset >= self.length {
            return None;
        }

        while self.next_fold < self.folds.len() && self.folds[self.next_fold].end <= self.offset {
            self.next_fold += 1;
        }

        // A collapsed fold swallows everything under it into one placeholder
        // segment.
        if self.next_fold < self.folds.len() {
            let fold = &self.folds[self.next_fold];
            if fold.start <= self.offset {
                let segment = Segment {
                    start: self.offset,
                    end: fold.end,
                    attributes: self.fold_attributes,
                    placeholder: Some(fold.placeholder.clone()),
                    after_end_of_line: false,
                };
                self.offset = fold.end;
                self.next_fold += 1;
                return Some(segment);
            }
        }

        self.refresh_active();
        let end = self.breakpoint();
        let (attributes, after_end_of_line) = self.merge_active();
        let segment = Segment {
            start: self.offset,
            end,
            attributes,
            placeholder: None,
            after_end_of_line,
        };
        self.offset = end;
        Some(segment)
    }
}

#[allow(clippy::too_many_arguments)]
fn push_span(
    spans: &mut Vec<SourceSpan>,
    start: usize,
    end: usize,
    length: usize,
    layer: i32,
    seq: usize,
    attributes: TextAttributes,
    after_end_of_line: bool,
) {
    let start = start.min(length);
    let end = end.min(length);
    if end <= start {
        return;
    }
    spans.push(SourceSpan {
        start,
        end,
        layer,
        width: end - start,
        seq,
        attributes,
        after_end_of_line,
    });
}

/// Widen `[start, end)` to the line boundaries bracketing it, separator
/// included. A zero-width range widens to the whole line it sits on.
fn widen_to_lines(doc: &Document, start: usize, end: usize) -> (usize, usize) {
    let length = doc.length();
    let start = start.min(length);
    let end = end.min(length).max(start);

    let index = doc.line_index();
    let first = index.line_index_for_offset(start);
    let last = index.line_index_for_offset(if end > start { end - 1 } else { end });

    let wide_start = doc.line_entry(first).map_or(start, |e| e.start);
    let wide_end = doc.line_entry(last).map_or(end, |e| e.end);
    (wide_start, wide_end.max(end))
}
