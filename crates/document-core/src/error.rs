//! Error types for document mutation and fold topology operations.
//!
//! Bounds and read-only violations are programming errors and fail fast at the
//! call site. Guarded-fragment violations carry the attempted edit and the
//! offending block so the caller can present a warning and abort. Fold
//! topology violations refuse the operation without touching existing state.

use thiserror::Error;

/// Errors raised by [`Document`](crate::Document) mutation and query APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// An offset lies beyond the current document length.
    #[error("offset {offset} is out of bounds (document length {length})")]
    OffsetOutOfBounds {
        /// The offending character offset.
        offset: usize,
        /// Document length at the time of the call.
        length: usize,
    },

    /// A range has `end < start` or extends beyond the document length.
    #[error("invalid range {start}..{end} (document length {length})")]
    InvalidRange {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
        /// Document length at the time of the call.
        length: usize,
    },

    /// A write was attempted against a read-only document.
    #[error("document is read-only")]
    ReadOnly,

    /// Inserted text contained a `'\r'`; callers must normalize line
    /// separators to `'\n'` before text reaches the document.
    #[error("inserted text contains '\\r'; line separators must be normalized to '\\n'")]
    CarriageReturn,

    /// The edit intersects a guarded block while guard checking is active.
    #[error(
        "edit {edit_start}..{edit_end} intersects guarded block {block_start}..{block_end}"
    )]
    GuardedFragment {
        /// Start offset of the attempted edit.
        edit_start: usize,
        /// Exclusive end offset of the attempted edit (equal to start for a
        /// pure insertion).
        edit_end: usize,
        /// Start offset of the offending guarded block.
        block_start: usize,
        /// Exclusive end offset of the offending guarded block.
        block_end: usize,
    },

    /// The document was mutated from inside a change listener, between the
    /// before and after notifications of another edit.
    #[error("document mutated from inside a change listener")]
    NestedMutation,
}

/// Errors raised by fold region mutation.
///
/// Fold state is advisory to rendering, so these refuse the operation and
/// leave the topology untouched instead of crashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    /// A fold mutation was attempted outside a batch folding operation.
    #[error("fold regions may only be mutated inside a batch folding operation")]
    OutsideBatch,

    /// The new region partially crosses an existing valid region (neither
    /// nested nor disjoint).
    #[error("fold region {start}..{end} partially overlaps an existing region")]
    PartialOverlap {
        /// Start offset of the rejected region.
        start: usize,
        /// Exclusive end offset of the rejected region.
        end: usize,
    },

    /// The span is too short to fold (a region must cover at least one real
    /// character beyond its placeholder boundary) or lies out of bounds.
    #[error("invalid fold span {start}..{end}")]
    InvalidSpan {
        /// Start offset of the rejected span.
        start: usize,
        /// Exclusive end offset of the rejected span.
        end: usize,
    },
}
