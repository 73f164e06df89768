#![warn(missing_docs)]
//! Document Core - Headless Text-Editing Kernel
//!
//! # Overview
//!
//! `document-core` is the text-editing core underlying an interactive code
//! editor: a mutable character buffer with live line indexing, self-adjusting
//! range markers, nested fold regions, and an overlay-resolution sweep that
//! merges layered highlight sources into flat attribute segments for an
//! external painter. It is headless: no rendering, no I/O, no threads.
//!
//! # Core Features
//!
//! - **Copy-on-Write Text Buffer**: shared until the first edit, then a plain
//!   character vector with geometric growth
//! - **Incremental Line Index**: contiguous line-segment table, single-line
//!   fast path and multi-line splice path
//! - **Range Markers**: weakly registered, self-adjusting across edits, with
//!   greedy boundary control
//! - **Fold Regions**: nested collapsible spans with cached topology and
//!   batch operations
//! - **Overlay Resolver**: lazy forward-only sweep merging tokens,
//!   highlighters, selection, caret row, guarded blocks and fold placeholders
//! - **Guarded Blocks**: read-only fragments enforced during edits
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Overlay Resolver (segment sweep)           │  ← Painter Input
//! ├─────────────────────────────────────────────┤
//! │  Fold Model (per-view topology)             │  ← Visibility
//! ├─────────────────────────────────────────────┤
//! │  Document (events, guards, windows)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Line Index + Marker Registry               │  ← Derived Indexes
//! ├─────────────────────────────────────────────┤
//! │  Text Buffer (CoW character storage)        │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Data flows one way on mutation: an edit lands on the buffer, the line
//! index and marker registry react to the change event, fold models
//! revalidate their cached topology lazily, and the overlay resolver is
//! re-queried by the painter against the now-consistent structures.
//!
//! # Quick Start
//!
//! ```rust
//! use document_core::{Document, FoldModel};
//!
//! let mut doc = Document::new("fn main() {\n    body();\n}\n").unwrap();
//! let marker = doc.create_range_marker(12, 23).unwrap();
//!
//! doc.insert(0, "// demo\n").unwrap();
//! assert_eq!(marker.range(), Some(20..31));
//!
//! let mut folds = FoldModel::new();
//! folds.run_batch_folding_operation(&mut doc, |folds, doc| {
//!     let region = folds.add_fold_region(doc, 18, 33, "{...}").unwrap();
//!     region.set_expanded(false).unwrap();
//! });
//! assert!(folds.is_offset_collapsed(&doc, 25));
//! ```
//!
//! # Module Description
//!
//! - [`text_buffer`] - copy-on-write character storage
//! - [`line_index`] - incremental line-segment table
//! - [`event`] - change events and prioritized listeners
//! - [`markers`] - self-adjusting range markers
//! - [`document`] - the mutation pipeline tying the above together
//! - [`folding`] - fold regions, batch operations, cached topology
//! - [`overlay`] - the segment sweep consumed by the painter
//! - [`window`] - sub-range views delegating to a host document
//! - [`attributes`] - rendering attributes and layer precedence
//!
//! # Threading Model
//!
//! Single-threaded, synchronous mutation: one logical owner thread drives all
//! writes, nothing blocks or suspends, and a reentrancy guard rejects
//! mutation from inside change listeners. Multiple views may share one
//! document, each with its own [`FoldModel`] and overlay inputs.

pub mod attributes;
pub mod document;
pub mod error;
pub mod event;
pub mod folding;
pub mod line_index;
pub mod markers;
pub mod overlay;
pub mod text_buffer;
pub mod window;

pub use attributes::{Color, Effect, EffectType, FontStyle, TextAttributes, layer};
pub use document::Document;
pub use error::{DocumentError, FoldError};
pub use event::{DocumentListener, ListenerPriority, TextChange};
pub use folding::{FoldModel, FoldRegion};
pub use line_index::{LineEntry, LineIndex};
pub use markers::RangeMarker;
pub use overlay::{
    Highlighter, OverlayIterator, OverlayPalette, Segment, TargetArea, TokenSpan, ViewState,
};
pub use text_buffer::TextBuffer;
pub use window::DocumentWindow;
