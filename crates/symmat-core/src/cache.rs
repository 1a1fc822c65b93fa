//! # Matrix Cache
//!
//! The generic at-most-once-per-key construction cache. One cache exists per
//! matrix kind inside a [`SystemCore`]; each composes an index store with a
//! [`MatrixBuilder`] strategy.
//!
//! ## Exclusive-access capability
//!
//! `create` takes `&mut SystemCore`: the exclusive borrow of the system
//! state *is* the writer capability. A composite builder recurses into a
//! constituent cache's `create` by passing the same borrow down the call
//! chain, so re-entrancy needs no lock re-acquisition and cannot deadlock;
//! the guarantee is type-level, not a runtime property of the lock.
//!
//! ## Ordering on a miss
//!
//! Build, then append (durable), then index, then notify. The builder runs
//! before any mutation, so a failed build leaves observable state unchanged;
//! notify hooks run with the new matrix already durably stored. A duplicate
//! index insert is unreachable while the capability is held exclusively and
//! is only asserted.

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::errors::SymmatError;
use crate::index::{IndexStore, Offset};
use crate::matrix::{MatrixKind, SymbolicMatrix};
use crate::system::{BuildEvent, SystemCore};

// =============================================================================
// CONCURRENCY HINT
// =============================================================================

/// Dimension at or above which `Optional` fan-out turns parallel.
pub const PARALLEL_DIMENSION_THRESHOLD: usize = 32;

/// Caller hint for a builder's *internal* fan-out (filling a large matrix's
/// cells once its shape is fixed). Never governs cross-matrix concurrency:
/// builds are serialized by the system's writer lock regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// Always fan out.
    Always,
    /// Fan out when the matrix is large enough to pay for it.
    #[default]
    Optional,
    /// Stay serial.
    Never,
}

impl Concurrency {
    /// Whether a builder should fill cells in parallel for this dimension.
    #[must_use]
    pub fn should_parallelize(self, dimension: usize) -> bool {
        match self {
            Concurrency::Always => true,
            Concurrency::Optional => dimension >= PARALLEL_DIMENSION_THRESHOLD,
            Concurrency::Never => false,
        }
    }
}

// =============================================================================
// BUILDER TRAIT
// =============================================================================

/// Per-kind construction strategy invoked on cache miss.
///
/// `build` must not mutate the matrix store itself; the cache appends the
/// result so that durability always precedes indexing and notification.
pub trait MatrixBuilder: Sized + Send + Sync {
    /// The index type keying this builder's cache.
    type Index: Clone + std::fmt::Display;

    /// Kind tag stamped on every matrix this builder produces.
    const KIND: MatrixKind;

    /// This builder's cache within the system state.
    fn cache(core: &mut SystemCore) -> &mut MatrixCache<Self>;

    /// Shared view of this builder's cache.
    fn cache_ref(core: &SystemCore) -> &MatrixCache<Self>;

    /// Construct the matrix for an index, possibly recursing into other
    /// caches through the same exclusive capability.
    fn build(
        core: &mut SystemCore,
        index: &Self::Index,
        hint: Concurrency,
    ) -> Result<SymbolicMatrix, SymmatError>;

    /// Post-build hook, invoked with the matrix already durably stored.
    /// Default: no-op.
    fn notify(
        _core: &mut SystemCore,
        _index: &Self::Index,
        _offset: Offset,
        _matrix: &Arc<SymbolicMatrix>,
    ) -> Result<(), SymmatError> {
        Ok(())
    }

    /// Descriptive message for a lookup-without-construction miss.
    fn missing(index: &Self::Index) -> String;
}

// =============================================================================
// MATRIX CACHE
// =============================================================================

/// One kind's index store plus its builder strategy.
pub struct MatrixCache<B: MatrixBuilder> {
    store: Box<dyn IndexStore<B::Index> + Send + Sync>,
    _builder: PhantomData<B>,
}

impl<B: MatrixBuilder> std::fmt::Debug for MatrixCache<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixCache")
            .field("kind", &B::KIND)
            .field("len", &self.store.len())
            .finish()
    }
}

impl<B: MatrixBuilder> MatrixCache<B> {
    /// Compose a cache from the index store chosen for this kind.
    #[must_use]
    pub fn new(store: Box<dyn IndexStore<B::Index> + Send + Sync>) -> Self {
        Self {
            store,
            _builder: PhantomData,
        }
    }

    /// Number of indexed matrices of this kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no matrix of this kind has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get or build the matrix for an index.
    ///
    /// Hits return the existing offset and matrix, kind-checked against
    /// `B::KIND`. Misses build, append, index and notify in that order.
    pub fn create(
        core: &mut SystemCore,
        index: B::Index,
        hint: Concurrency,
    ) -> Result<(Offset, Arc<SymbolicMatrix>), SymmatError> {
        if let Some(offset) = B::cache_ref(core).store.find(&index) {
            trace!(kind = %B::KIND, %index, offset = offset.value(), "cache hit");
            let matrix = core.store().typed(offset, B::KIND)?;
            return Ok((offset, matrix));
        }

        debug!(kind = %B::KIND, %index, "cache miss, building");
        let built = B::build(core, &index, hint)?;
        let (offset, matrix) = core.store_mut().push(B::KIND, built);

        let (existing, inserted) = B::cache(core).store.insert(index.clone(), offset);
        debug_assert!(
            inserted && existing == offset,
            "duplicate index insert under exclusive capability"
        );

        B::notify(core, &index, offset, &matrix)?;
        core.notify_observers(&BuildEvent {
            kind: B::KIND,
            offset,
            matrix: Arc::clone(&matrix),
        })?;

        debug!(kind = %B::KIND, %index, offset = offset.value(), "built");
        Ok((offset, matrix))
    }

    /// Look up without construction.
    ///
    /// Read-only: callable under a shared borrow of the system state. A miss
    /// is [`SymmatError::NotFound`] with the builder's message.
    pub fn find(
        core: &SystemCore,
        index: &B::Index,
    ) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        match B::cache_ref(core).store.find(index) {
            Some(offset) => core.store().typed(offset, B::KIND),
            None => Err(SymmatError::NotFound(B::missing(index))),
        }
    }

    /// Non-throwing offset lookup; [`Offset::ABSENT`] on a miss.
    #[must_use]
    pub fn find_index(core: &SystemCore, index: &B::Index) -> Offset {
        B::cache_ref(core)
            .store
            .find(index)
            .unwrap_or(Offset::ABSENT)
    }

    /// Whether the index has been built.
    #[must_use]
    pub fn contains(core: &SystemCore, index: &B::Index) -> bool {
        B::cache_ref(core).store.contains(index)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_hint_parallelizes_only_large_matrices() {
        assert!(!Concurrency::Optional.should_parallelize(2));
        assert!(Concurrency::Optional.should_parallelize(PARALLEL_DIMENSION_THRESHOLD));
    }

    #[test]
    fn always_and_never_ignore_dimension() {
        assert!(Concurrency::Always.should_parallelize(1));
        assert!(!Concurrency::Never.should_parallelize(1_000));
    }
}
