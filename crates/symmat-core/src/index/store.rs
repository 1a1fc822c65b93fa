//! # Index Stores
//!
//! Pluggable maps from index to [`Offset`], chosen per cache family at
//! system-assembly time:
//!
//! - [`DenseIndexStore`]: O(1) array over a small dense integer key,
//!   back-filling skipped slots with the absent sentinel;
//! - [`OrderedIndexStore`]: `BTreeMap` over any totally ordered key;
//! - [`PolyIndexStore`]: sorted vector with an injected total order over
//!   polynomials, because polynomial keys must compare by canonical content
//!   and a runtime comparator cannot live inside a `BTreeMap` key.
//!
//! `insert` never overwrites: it returns the offset now mapped plus whether
//! the insertion took place, so a caller can distinguish first insertion
//! from an existing binding.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{MomentIndex, Offset, PolyIndex};
use crate::poly::Polynomial;

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Map from index to offset.
///
/// Exactly one offset per index: a second `insert` for the same index keeps
/// the first binding and reports `false`.
pub trait IndexStore<I> {
    /// Look up the offset for an index.
    fn find(&self, index: &I) -> Option<Offset>;

    /// Whether the index is mapped.
    fn contains(&self, index: &I) -> bool {
        self.find(index).is_some()
    }

    /// Bind an index to an offset.
    ///
    /// Returns `(offset now mapped, whether this call inserted it)`.
    fn insert(&mut self, index: I, offset: Offset) -> (Offset, bool);

    /// Number of mapped indexes.
    fn len(&self) -> usize;

    /// Whether no index is mapped.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// DENSE ARRAY STORE
// =============================================================================

/// Conversion of an index to a small dense array slot.
pub trait DenseIndex {
    /// The array slot for this index.
    fn slot(&self) -> usize;
}

impl DenseIndex for MomentIndex {
    fn slot(&self) -> usize {
        self.level
    }
}

/// Array-backed store for small dense integer keys.
///
/// Inserting at a slot beyond the current length back-fills the intermediate
/// slots with [`Offset::ABSENT`].
#[derive(Debug, Clone, Default)]
pub struct DenseIndexStore {
    slots: Vec<Offset>,
}

impl DenseIndexStore {
    /// Create an empty dense store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: DenseIndex> IndexStore<I> for DenseIndexStore {
    fn find(&self, index: &I) -> Option<Offset> {
        self.slots
            .get(index.slot())
            .copied()
            .filter(|offset| !offset.is_absent())
    }

    fn insert(&mut self, index: I, offset: Offset) -> (Offset, bool) {
        let slot = index.slot();
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, Offset::ABSENT);
        }
        let existing = self.slots[slot];
        if existing.is_absent() {
            self.slots[slot] = offset;
            (offset, true)
        } else {
            (existing, false)
        }
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|o| !o.is_absent()).count()
    }
}

// =============================================================================
// ORDERED MAP STORE
// =============================================================================

/// `BTreeMap`-backed store for totally ordered compound keys.
#[derive(Debug, Clone, Default)]
pub struct OrderedIndexStore<I: Ord> {
    map: BTreeMap<I, Offset>,
}

impl<I: Ord> OrderedIndexStore<I> {
    /// Create an empty ordered store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<I: Ord> IndexStore<I> for OrderedIndexStore<I> {
    fn find(&self, index: &I) -> Option<Offset> {
        self.map.get(index).copied()
    }

    fn insert(&mut self, index: I, offset: Offset) -> (Offset, bool) {
        match self.map.entry(index) {
            std::collections::btree_map::Entry::Occupied(entry) => (*entry.get(), false),
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(offset);
                (offset, true)
            }
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

// =============================================================================
// POLYNOMIAL-ORDERED STORE
// =============================================================================

/// Injected total order over polynomials.
pub type PolyOrdering = fn(&Polynomial, &Polynomial) -> Ordering;

/// Sorted-vector store keyed by (level, polynomial) under an injected
/// polynomial order.
///
/// Keys compare by level first, then by the injected order, so two keys
/// whose polynomials are term-order permutations of the same canonical
/// polynomial (after reduction) are one key.
#[derive(Debug, Clone)]
pub struct PolyIndexStore {
    entries: Vec<(PolyIndex, Offset)>,
    order: PolyOrdering,
}

impl Default for PolyIndexStore {
    fn default() -> Self {
        Self::new(Polynomial::canonical_cmp)
    }
}

impl PolyIndexStore {
    /// Create a store with the given polynomial order.
    #[must_use]
    pub fn new(order: PolyOrdering) -> Self {
        Self {
            entries: Vec::new(),
            order,
        }
    }

    fn compare(&self, a: &PolyIndex, b: &PolyIndex) -> Ordering {
        a.level
            .cmp(&b.level)
            .then_with(|| (self.order)(&a.poly, &b.poly))
    }

    fn locate(&self, index: &PolyIndex) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(key, _)| self.compare(key, index))
    }
}

impl IndexStore<PolyIndex> for PolyIndexStore {
    fn find(&self, index: &PolyIndex) -> Option<Offset> {
        self.locate(index).ok().map(|pos| self.entries[pos].1)
    }

    fn insert(&mut self, index: PolyIndex, offset: Offset) -> (Offset, bool) {
        match self.locate(&index) {
            Ok(pos) => (self.entries[pos].1, false),
            Err(pos) => {
                self.entries.insert(pos, (index, offset));
                (offset, true)
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
