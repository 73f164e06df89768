//! Collapsible fold regions over range markers.
//!
//! A [`FoldRegion`] is a range marker plus an expanded flag and placeholder
//! text. Regions may nest fully but never partially cross. All mutation is
//! confined to a batch folding operation; the outermost batch scope rebuilds
//! the cached topology once and notifies fold listeners.
//!
//! Queries are valid at any time: the topology cache is keyed on the document
//! modification stamp plus a local generation counter, and is rebuilt at most
//! once per query burst when found stale.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use log::debug;

use crate::document::Document;
use crate::error::FoldError;
use crate::markers::RangeMarker;

struct FoldShared {
    batch_depth: Cell<usize>,
    generation: Cell<u64>,
}

/// Which view position a zero-width snapshot marker stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavedPosition {
    Caret,
    SelectionStart,
    SelectionEnd,
}

struct FoldRegionState {
    marker: RangeMarker,
    expanded: bool,
    placeholder: String,
    /// Positions snapshotted out of this region while it is collapsed.
    saved_positions: Vec<(SavedPosition, RangeMarker)>,
}

/// A collapsible region with placeholder text, backed by a range marker.
#[derive(Clone)]
pub struct FoldRegion {
    state: Rc<RefCell<FoldRegionState>>,
    shared: Rc<FoldShared>,
}

impl FoldRegion {
    /// Current start offset.
    pub fn start(&self) -> usize {
        self.state.borrow().marker.start()
    }

    /// Current exclusive end offset.
    pub fn end(&self) -> usize {
        self.state.borrow().marker.end()
    }

    /// Whether the underlying marker still tracks a live span wide enough to
    /// fold.
    pub fn is_valid(&self) -> bool {
        let state = self.state.borrow();
        state.marker.is_valid() && state.marker.end() > state.marker.start() + 1
    }

    /// Whether the region is currently expanded (not hiding its text).
    pub fn is_expanded(&self) -> bool {
        self.state.borrow().expanded
    }

    /// The placeholder text shown while collapsed.
    pub fn placeholder(&self) -> String {
        self.state.borrow().placeholder.clone()
    }

    /// Expand or collapse the region. Legal only inside a batch folding
    /// operation.
    pub fn set_expanded(&self, expanded: bool) -> Result<(), FoldError> {
        if self.shared.batch_depth.get() == 0 {
            debug!("set_expanded refused outside a batch folding operation");
            return Err(FoldError::OutsideBatch);
        }
        self.state.borrow_mut().expanded = expanded;
        self.shared.generation.set(self.shared.generation.get() + 1);
        Ok(())
    }

    fn same_region(&self, other: &FoldRegion) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl std::fmt::Debug for FoldRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FoldRegion")
            .field("start", &state.marker.start())
            .field("end", &state.marker.end())
            .field("valid", &state.marker.is_valid())
            .field("expanded", &state.expanded)
            .field("placeholder", &state.placeholder)
            .finish()
    }
}

/// Cached fold topology, rebuilt when stale.
struct Topology {
    /// Parallel sorted arrays over top-level collapsed regions.
    top_starts: Vec<usize>,
    top_ends: Vec<usize>,
    top_regions: Vec<FoldRegion>,
    /// Cumulative folded line counts: `folded_lines_prefix[i]` is the number
    /// of hidden lines in `top_regions[..=i]`.
    folded_lines_prefix: Vec<usize>,
    /// Valid regions not hidden inside a collapsed top-level region.
    visible: Vec<FoldRegion>,
    stamp: u64,
    generation: u64,
}

/// Per-view fold region tree.
///
/// Multiple views over one document each hold their own `FoldModel`.
pub struct FoldModel {
    regions: Vec<FoldRegion>,
    shared: Rc<FoldShared>,
    cache: RefCell<Option<Topology>>,
    listeners: Vec<Box<dyn FnMut()>>,
}

impl Default for FoldModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FoldModel {
    /// Create an empty fold model.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            shared: Rc::new(FoldShared {
                batch_depth: Cell::new(0),
                generation: Cell::new(0),
            }),
            cache: RefCell::new(None),
            listeners: Vec::new(),
        }
    }

    /// Register a callback fired after each outermost batch rebuild.
    pub fn add_listener(&mut self, listener: Box<dyn FnMut()>) {
        self.listeners.push(listener);
    }

    /// All regions currently held by the model, valid or not.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    // ---- batch operations -------------------------------------------------

    /// Run a batch folding operation. Scopes may nest; only the outermost
    /// triggers the topology rebuild and listener notification.
    pub fn run_batch_folding_operation(
        &mut self,
        doc: &mut Document,
        op: impl FnOnce(&mut FoldModel, &mut Document),
    ) {
        self.shared.batch_depth.set(self.shared.batch_depth.get() + 1);
        op(self, doc);
        self.finish_batch(doc, &mut []);
    }

    /// Batch variant that keeps the caret out of newly hidden text.
    ///
    /// If the caret ends up strictly inside a collapsed region, its logical
    /// position is snapshotted (as a zero-width marker, so later edits keep
    /// it current) and the caret moves to the region start; expanding the
    /// region in a later batch restores it.
    pub fn run_batch_folding_operation_with_caret(
        &mut self,
        doc: &mut Document,
        caret: &mut usize,
        op: impl FnOnce(&mut FoldModel, &mut Document),
    ) {
        self.shared.batch_depth.set(self.shared.batch_depth.get() + 1);
        op(self, doc);
        self.finish_batch(doc, &mut [(SavedPosition::Caret, caret)]);
    }

    /// Batch variant that keeps the caret and both selection endpoints out of
    /// newly hidden text, each tracked and restored independently.
    pub fn run_batch_folding_operation_with_selection(
        &mut self,
        doc: &mut Document,
        caret: &mut usize,
        selection: &mut Range<usize>,
        op: impl FnOnce(&mut FoldModel, &mut Document),
    ) {
        self.shared.batch_depth.set(self.shared.batch_depth.get() + 1);
        op(self, doc);
        self.finish_batch(
            doc,
            &mut [
                (SavedPosition::Caret, caret),
                (SavedPosition::SelectionStart, &mut selection.start),
                (SavedPosition::SelectionEnd, &mut selection.end),
            ],
        );
    }

    fn finish_batch(&mut self, doc: &mut Document, slots: &mut [(SavedPosition, &mut usize)]) {
        let depth = self.shared.batch_depth.get() - 1;
        self.shared.batch_depth.set(depth);
        if depth > 0 {
            return;
        }

        self.shared.generation.set(self.shared.generation.get() + 1);
        self.refresh_cache(doc);
        self.adjust_positions(doc, slots);

        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener();
        }
        self.listeners = listeners;
    }

    /// Move tracked view positions out of newly hidden text, and restore the
    /// ones whose region has been expanded (or died) since they were saved.
    fn adjust_positions(&mut self, doc: &mut Document, slots: &mut [(SavedPosition, &mut usize)]) {
        for region in &self.regions {
            let mut state = region.state.borrow_mut();
            let restorable = state.expanded || !state.marker.is_valid();
            if !restorable {
                continue;
            }
            for (kind, saved) in state.saved_positions.drain(..) {
                if saved.is_valid()
                    && let Some((_, position)) = slots.iter_mut().find(|(k, _)| *k == kind)
                {
                    **position = saved.start();
                }
                saved.dispose();
            }
        }

        for (kind, position) in slots.iter_mut() {
            let inside = self
                .collapsed_region_at(doc, **position)
                .filter(|r| r.start() < **position && **position < r.end());
            if let Some(region) = inside
                && let Ok(snapshot) = doc.create_range_marker(**position, **position)
            {
                region.state.borrow_mut().saved_positions.push((*kind, snapshot));
                **position = region.start();
            }
        }
    }

    /// Add a fold region over `[start, end)` with the given placeholder.
    ///
    /// Fails outside a batch, for spans that cannot hold a fold
    /// (`end <= start + 1` or out of bounds), and for spans that partially
    /// cross an existing valid region. Nesting is accepted.
    pub fn add_fold_region(
        &mut self,
        doc: &mut Document,
        start: usize,
        end: usize,
        placeholder: &str,
    ) -> Result<FoldRegion, FoldError> {
        if self.shared.batch_depth.get() == 0 {
            debug!("add_fold_region({start}..{end}) refused outside a batch");
            return Err(FoldError::OutsideBatch);
        }
        if end <= start + 1 || end > doc.length() {
            debug!("add_fold_region({start}..{end}) refused: invalid span");
            return Err(FoldError::InvalidSpan { start, end });
        }
        for existing in &self.regions {
            if !existing.is_valid() {
                continue;
            }
            let (s, e) = (existing.start(), existing.end());
            let crosses = (start < s && s < end && end < e) || (s < start && start < e && e < end);
            if crosses {
                debug!(
                    "add_fold_region({start}..{end}) refused: partially overlaps {s}..{e}"
                );
                return Err(FoldError::PartialOverlap { start, end });
            }
        }

        let marker = doc
            .create_range_marker(start, end)
            .map_err(|_| FoldError::InvalidSpan { start, end })?;
        let region = FoldRegion {
            state: Rc::new(RefCell::new(FoldRegionState {
                marker,
                expanded: true,
                placeholder: placeholder.to_string(),
                saved_positions: Vec::new(),
            })),
            shared: Rc::clone(&self.shared),
        };
        self.regions.push(region.clone());
        self.shared.generation.set(self.shared.generation.get() + 1);
        Ok(region)
    }

    /// Remove a region from the model, disposing its marker.
    pub fn remove_fold_region(&mut self, region: &FoldRegion) -> Result<(), FoldError> {
        if self.shared.batch_depth.get() == 0 {
            debug!("remove_fold_region refused outside a batch");
            return Err(FoldError::OutsideBatch);
        }
        self.regions.retain(|r| !r.same_region(region));
        region.state.borrow().marker.dispose();
        self.shared.generation.set(self.shared.generation.get() + 1);
        Ok(())
    }

    // ---- queries ----------------------------------------------------------

    /// Whether `offset` is hidden inside a collapsed region.
    pub fn is_offset_collapsed(&self, doc: &Document, offset: usize) -> bool {
        self.collapsed_region_at(doc, offset).is_some()
    }

    /// The outermost collapsed region containing `offset`, via binary search
    /// over the cached parallel arrays.
    pub fn collapsed_region_at(&self, doc: &Document, offset: usize) -> Option<FoldRegion> {
        self.refresh_cache(doc);
        let cache = self.cache.borrow();
        let topology = cache.as_ref()?;
        let candidate = topology.top_starts.partition_point(|&s| s <= offset);
        if candidate == 0 {
            return None;
        }
        let index = candidate - 1;
        (topology.top_ends[index] > offset).then(|| topology.top_regions[index].clone())
    }

    /// Top-level collapsed regions, outermost only, sorted by start.
    pub fn fetch_top_level(&self, doc: &Document) -> Vec<FoldRegion> {
        self.refresh_cache(doc);
        let cache = self.cache.borrow();
        cache.as_ref().map_or_else(Vec::new, |t| t.top_regions.clone())
    }

    /// Valid regions not hidden inside a collapsed top-level region.
    pub fn visible_regions(&self, doc: &Document) -> Vec<FoldRegion> {
        self.refresh_cache(doc);
        let cache = self.cache.borrow();
        cache.as_ref().map_or_else(Vec::new, |t| t.visible.clone())
    }

    /// Number of document lines hidden by collapsed regions that end at or
    /// before `offset`, for logical-to-visual line translation.
    pub fn folded_lines_before(&self, doc: &Document, offset: usize) -> usize {
        self.refresh_cache(doc);
        let cache = self.cache.borrow();
        let Some(topology) = cache.as_ref() else {
            return 0;
        };
        let count = topology.top_ends.partition_point(|&e| e <= offset);
        if count == 0 {
            0
        } else {
            topology.folded_lines_prefix[count - 1]
        }
    }

    // ---- topology rebuild -------------------------------------------------

    fn refresh_cache(&self, doc: &Document) {
        let stamp = doc.modification_stamp();
        let generation = self.shared.generation.get();
        {
            let cache = self.cache.borrow();
            if let Some(topology) = cache.as_ref()
                && topology.stamp == stamp
                && topology.generation == generation
            {
                return;
            }
        }
        let topology = self.build_topology(doc, stamp, generation);
        *self.cache.borrow_mut() = Some(topology);
    }

    fn build_topology(&self, doc: &Document, stamp: u64, generation: u64) -> Topology {
        let mut valid: Vec<FoldRegion> = self.regions.iter().filter(|r| r.is_valid()).cloned().collect();
        // Sort by start; wider first on ties so the outermost wins the sweep.
        valid.sort_by_key(|r| (r.start(), std::cmp::Reverse(r.end())));

        // End-offset sweep: a collapsed region is top-level unless a
        // previously chosen region's end reaches past its start.
        let mut top_regions = Vec::new();
        let mut top_starts = Vec::new();
        let mut top_ends = Vec::new();
        let mut last_end = 0usize;
        for region in valid.iter().filter(|r| !r.is_expanded()) {
            let (start, end) = (region.start(), region.end());
            if !top_ends.is_empty() && start < last_end {
                continue;
            }
            top_starts.push(start);
            top_ends.push(end);
            top_regions.push(region.clone());
            last_end = end;
        }

        let mut folded_lines_prefix = Vec::with_capacity(top_regions.len());
        let mut total = 0usize;
        for (&start, &end) in top_starts.iter().zip(&top_ends) {
            let line_index = doc.line_index();
            let hidden =
                line_index.line_index_for_offset(end) - line_index.line_index_for_offset(start);
            total += hidden;
            folded_lines_prefix.push(total);
        }

        let visible = valid
            .iter()
            .filter(|region| {
                let (start, end) = (region.start(), region.end());
                let candidate = top_starts.partition_point(|&s| s <= start);
                if candidate == 0 {
                    return true;
                }
                let index = candidate - 1;
                let enclosing = top_starts[index] <= start && end <= top_ends[index];
                let is_that_top = top_regions[index].same_region(region);
                !enclosing || is_that_top
            })
            .cloned()
            .collect();

        Topology {
            top_starts,
            top_ends,
            top_regions,
            folded_lines_prefix,
            visible,
            stamp,
            generation,
        }
    }
}
