//! # Matrix Indexes
//!
//! The structural keys identifying requested matrices, and the [`Offset`]
//! handle addressing stored ones.
//!
//! Each cache family has its own index type:
//! - [`MomentIndex`]: a hierarchy level (small dense integer);
//! - [`WordIndex`]: level plus operator word (localizing matrices);
//! - [`PolyIndex`]: level plus polynomial (composite matrices);
//! - [`SubstitutedIndex`]: source offset plus transform id (derived).
//!
//! Indexes are immutable value types. Those used with map-backed stores are
//! totally ordered; [`MomentIndex`] additionally converts to a dense slot
//! for the array-backed store. [`PolyIndex`] deliberately carries no derived
//! `Ord`: polynomial keys compare by canonical content through an injected
//! order, not by incidental term order.

pub mod store;

pub use store::{DenseIndexStore, IndexStore, OrderedIndexStore, PolyIndexStore};

use serde::{Deserialize, Serialize};

use crate::poly::Polynomial;
use crate::symbols::OperatorSequence;

// =============================================================================
// OFFSET
// =============================================================================

/// Stable integer handle into the matrix store.
///
/// Offsets are issued in append order and never reused. [`Offset::ABSENT`]
/// is the sentinel for "not yet built": the dense store back-fills with it,
/// and non-throwing index lookups return it on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Offset(usize);

impl Offset {
    /// Sentinel for "not yet built".
    pub const ABSENT: Offset = Offset(usize::MAX);

    /// Create an offset for a store position.
    #[must_use]
    pub const fn new(position: usize) -> Self {
        Self(position)
    }

    /// The raw store position.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }

    /// Whether this is the absent sentinel.
    #[must_use]
    pub const fn is_absent(self) -> bool {
        self.0 == usize::MAX
    }
}

/// Handle for a registered transform object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransformId(pub usize);

impl TransformId {
    /// The raw id value.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

// =============================================================================
// INDEX TYPES
// =============================================================================

/// Index of a moment matrix: the hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MomentIndex {
    /// Hierarchy level.
    pub level: usize,
}

impl From<usize> for MomentIndex {
    fn from(level: usize) -> Self {
        Self { level }
    }
}

impl std::fmt::Display for MomentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}", self.level)
    }
}

/// Index of a localizing matrix: level plus localizing word.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordIndex {
    /// Hierarchy level.
    pub level: usize,
    /// The localizing operator word.
    pub word: OperatorSequence,
}

impl std::fmt::Display for WordIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}, word {}", self.level, self.word)
    }
}

/// Index of a composite matrix: level plus canonical polynomial.
///
/// The polynomial must already be in normal form when the index is created;
/// the system's public surface canonicalizes before keying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyIndex {
    /// Hierarchy level.
    pub level: usize,
    /// Canonical polynomial.
    pub poly: Polynomial,
}

impl std::fmt::Display for PolyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}, polynomial {}", self.level, self.poly)
    }
}

/// Index of a derived matrix: source offset plus transform id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubstitutedIndex {
    /// Offset of the source matrix.
    pub source: Offset,
    /// Registered transform to apply.
    pub transform: TransformId,
}

impl std::fmt::Display for SubstitutedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "source offset {}, transform {}",
            self.source.value(),
            self.transform.value()
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_sentinel_is_recognized() {
        assert!(Offset::ABSENT.is_absent());
        assert!(!Offset::new(0).is_absent());
    }

    #[test]
    fn offsets_order_by_position() {
        assert!(Offset::new(1) < Offset::new(2));
        assert!(Offset::new(2) < Offset::ABSENT);
    }

    #[test]
    fn word_index_orders_by_level_then_word() {
        let early = WordIndex {
            level: 1,
            word: OperatorSequence::new(vec![9]),
        };
        let late = WordIndex {
            level: 2,
            word: OperatorSequence::new(vec![0]),
        };
        assert!(early < late);
    }
}
