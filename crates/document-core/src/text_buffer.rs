//! Character storage layer.
//!
//! [`TextBuffer`] holds the document text as a growable sequence of `char`s
//! addressed by character offsets, plus a modification stamp bumped on every
//! committed edit. The buffer starts as a view over a shared immutable source
//! and materializes into an owned array lazily, on the first mutation
//! (copy-on-write), so opening a document never copies its text.

use std::sync::Arc;

/// Growth factor numerator/denominator for amortized geometric resizing.
///
/// ≈1.2× keeps copy cost bounded without over-allocating on large documents.
const GROWTH_NUM: usize = 6;
const GROWTH_DEN: usize = 5;

enum Store {
    /// Shared immutable source, untouched until the first mutation.
    Shared(Arc<[char]>),
    /// Owned growable array, after copy-on-write materialization.
    Owned(Vec<char>),
}

/// Mutable character storage with a modification stamp.
pub struct TextBuffer {
    store: Store,
    stamp: u64,
}

impl TextBuffer {
    /// Create a buffer over the given source text.
    pub fn new(text: &str) -> Self {
        Self::from_shared(text.chars().collect::<Vec<_>>().into())
    }

    /// Create a buffer over an already-shared character sequence.
    pub fn from_shared(source: Arc<[char]>) -> Self {
        Self {
            store: Store::Shared(source),
            stamp: 0,
        }
    }

    /// Character count of the buffer.
    pub fn len(&self) -> usize {
        self.chars().len()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current modification stamp; changes with every committed edit.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// The character at `offset`, if in bounds.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars().get(offset).copied()
    }

    /// The full text as a `String`.
    pub fn text(&self) -> String {
        self.chars().iter().collect()
    }

    /// The text in `[start, end)` as a `String`. Offsets must be in bounds.
    pub fn fragment(&self, start: usize, end: usize) -> String {
        self.chars()[start..end].iter().collect()
    }

    /// Whether the buffer has been materialized into an owned array.
    pub fn is_materialized(&self) -> bool {
        matches!(self.store, Store::Owned(_))
    }

    /// Replace `old_len` characters at `offset` with `new_text`, bumping the
    /// modification stamp.
    ///
    /// Offsets must be validated by the caller; this is the raw commit
    /// primitive underneath [`Document`](crate::Document) mutation.
    pub(crate) fn splice(&mut self, offset: usize, old_len: usize, new_text: &str) {
        let new_chars: Vec<char> = new_text.chars().collect();
        let grow = new_chars.len().saturating_sub(old_len);
        let chars = self.materialize();
        if grow > 0 {
            reserve_geometric(chars, grow);
        }
        chars.splice(offset..offset + old_len, new_chars);
        self.stamp += 1;
    }

    fn chars(&self) -> &[char] {
        match &self.store {
            Store::Shared(source) => source,
            Store::Owned(chars) => chars,
        }
    }

    fn materialize(&mut self) -> &mut Vec<char> {
        if let Store::Shared(source) = &self.store {
            self.store = Store::Owned(source.to_vec());
        }
        match &mut self.store {
            Store::Owned(chars) => chars,
            Store::Shared(_) => unreachable!("materialize leaves an owned store"),
        }
    }
}

/// Geometric reserve: grow to max(needed, len * 6/5) in one step.
fn reserve_geometric(chars: &mut Vec<char>, additional: usize) {
    let needed = chars.len() + additional;
    if needed <= chars.capacity() {
        return;
    }
    let geometric = chars.len() * GROWTH_NUM / GROWTH_DEN + 1;
    let target = needed.max(geometric);
    chars.reserve_exact(target - chars.len());
}
