//! # Matrix System
//!
//! The owner of all shared state: the append-only matrix store, the symbol
//! registry, the canonicalization factory, the algebraic context, the
//! registered transforms, one cache per matrix kind, and the ordered list of
//! post-build observers.
//!
//! ## Locking discipline
//!
//! [`MatrixSystem`] wraps a [`SystemCore`] in one reader-writer lock, the
//! only lock in the subsystem. All mutation (cache-miss builds, appends,
//! in-place re-canonicalization) happens under the writer lock; pure lookups
//! and read-only algebra take the reader lock and proceed concurrently.
//! There is no cross-matrix build parallelism: racing builds are serialized
//! by the writer lock, which is what guarantees at-most-one-build-per-key.
//!
//! Recursive builds never re-acquire the lock: the `&mut SystemCore`
//! capability is threaded down the call chain (see [`crate::cache`]).

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use tracing::debug;

use crate::builders::{LocalizingBuilder, MomentBuilder, PolynomialBuilder, SubstitutedBuilder};
use crate::cache::{Concurrency, MatrixCache};
use crate::context::Context;
use crate::errors::SymmatError;
use crate::index::{
    DenseIndexStore, MomentIndex, Offset, OrderedIndexStore, PolyIndex, PolyIndexStore,
    SubstitutedIndex, TransformId, WordIndex,
};
use crate::matrix::{MatrixKind, SymbolicMatrix};
use crate::poly::{Polynomial, PolynomialFactory};
use crate::symbols::SymbolRegistry;
use crate::transforms::MatrixTransform;

// =============================================================================
// MATRIX STORE
// =============================================================================

/// One stored matrix with its kind tag.
#[derive(Debug, Clone)]
pub struct MatrixEntry {
    kind: MatrixKind,
    matrix: Arc<SymbolicMatrix>,
}

impl MatrixEntry {
    /// Which cache family produced this entry.
    #[must_use]
    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// The stored matrix.
    #[must_use]
    pub fn matrix(&self) -> &Arc<SymbolicMatrix> {
        &self.matrix
    }
}

/// Append-only list of constructed matrices.
///
/// Entries are never removed or reordered; offsets are issued in append
/// order and stay valid forever. The only in-place change is
/// re-canonicalization, which swaps a matrix without moving it.
#[derive(Debug, Clone, Default)]
pub struct MatrixStore {
    entries: Vec<MatrixEntry>,
}

impl MatrixStore {
    /// Append a matrix, issuing its offset.
    pub(crate) fn push(
        &mut self,
        kind: MatrixKind,
        matrix: SymbolicMatrix,
    ) -> (Offset, Arc<SymbolicMatrix>) {
        let offset = Offset::new(self.entries.len());
        let matrix = Arc::new(matrix);
        self.entries.push(MatrixEntry {
            kind,
            matrix: Arc::clone(&matrix),
        });
        (offset, matrix)
    }

    /// Entry at an offset.
    #[must_use]
    pub fn get(&self, offset: Offset) -> Option<&MatrixEntry> {
        if offset.is_absent() {
            return None;
        }
        self.entries.get(offset.value())
    }

    /// Kind-checked fetch.
    ///
    /// A wrong kind signals a cross-kind index collision and is always an
    /// error, in every build profile.
    pub fn typed(
        &self,
        offset: Offset,
        expected: MatrixKind,
    ) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        let entry = self
            .get(offset)
            .ok_or(SymmatError::UnknownOffset(offset))?;
        if entry.kind != expected {
            return Err(SymmatError::KindMismatch {
                offset,
                expected,
                found: entry.kind,
            });
        }
        Ok(Arc::clone(&entry.matrix))
    }

    /// Replace a stored matrix in place, keeping its kind and offset.
    ///
    /// Only re-canonicalization goes through here; dimension changes are
    /// rejected so readers can rely on a stable shape per offset.
    pub(crate) fn update(
        &mut self,
        offset: Offset,
        matrix: SymbolicMatrix,
    ) -> Result<(), SymmatError> {
        let entry = self
            .entries
            .get_mut(offset.value())
            .ok_or(SymmatError::UnknownOffset(offset))?;
        if matrix.dimension() != entry.matrix.dimension() {
            return Err(SymmatError::MalformedMatrix {
                dimension: entry.matrix.dimension(),
                cells: matrix.cells().len(),
            });
        }
        entry.matrix = Arc::new(matrix);
        Ok(())
    }

    /// Number of stored matrices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in offset order.
    pub fn entries(&self) -> impl Iterator<Item = &MatrixEntry> {
        self.entries.iter()
    }
}

// =============================================================================
// BUILD OBSERVERS
// =============================================================================

/// What a post-build observer sees: the new matrix, already durably stored.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    /// Kind of the matrix that was built.
    pub kind: MatrixKind,
    /// Its offset in the matrix store.
    pub offset: Offset,
    /// The matrix itself.
    pub matrix: Arc<SymbolicMatrix>,
}

/// System-level post-build hook.
///
/// Observers are held in an ordered list and invoked in sequence after every
/// successful build, with the exclusive capability available for
/// bookkeeping: expanding rule sets, registering newly implied symbols,
/// re-canonicalizing earlier matrices.
pub trait BuildObserver: Send + Sync {
    /// React to a newly stored matrix.
    fn on_matrix_built(
        &mut self,
        core: &mut SystemCore,
        event: &BuildEvent,
    ) -> Result<(), SymmatError>;
}

// =============================================================================
// SYSTEM CORE
// =============================================================================

/// All state guarded by the system's lock.
///
/// Holding `&mut SystemCore` *is* the writer capability; holding
/// `&SystemCore` is the reader capability. Builders and observers receive
/// these borrows instead of lock guards, which is what makes recursion into
/// other caches safe by construction.
pub struct SystemCore {
    store: MatrixStore,
    symbols: SymbolRegistry,
    factory: PolynomialFactory,
    context: Arc<dyn Context>,
    transforms: Vec<Arc<dyn MatrixTransform>>,
    observers: Vec<Box<dyn BuildObserver>>,
    pub(crate) moment_cache: MatrixCache<MomentBuilder>,
    pub(crate) localizing_cache: MatrixCache<LocalizingBuilder>,
    pub(crate) polynomial_cache: MatrixCache<PolynomialBuilder>,
    pub(crate) substituted_cache: MatrixCache<SubstitutedBuilder>,
}

impl std::fmt::Debug for SystemCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemCore")
            .field("matrices", &self.store.len())
            .field("symbols", &self.symbols.len())
            .field("transforms", &self.transforms.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SystemCore {
    /// Assemble a core: empty store, seeded registry, one cache per kind
    /// with its index-store strategy.
    #[must_use]
    pub fn new(context: Arc<dyn Context>, factory: PolynomialFactory) -> Self {
        Self {
            store: MatrixStore::default(),
            symbols: SymbolRegistry::new(),
            factory,
            context,
            transforms: Vec::new(),
            observers: Vec::new(),
            moment_cache: MatrixCache::new(Box::new(DenseIndexStore::new())),
            localizing_cache: MatrixCache::new(Box::new(OrderedIndexStore::<WordIndex>::new())),
            polynomial_cache: MatrixCache::new(Box::new(PolyIndexStore::default())),
            substituted_cache: MatrixCache::new(Box::new(
                OrderedIndexStore::<SubstitutedIndex>::new(),
            )),
        }
    }

    /// The matrix store.
    #[must_use]
    pub fn store(&self) -> &MatrixStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut MatrixStore {
        &mut self.store
    }

    /// The symbol registry.
    #[must_use]
    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    /// Mutable symbol registry (writer capability required by the borrow).
    pub fn symbols_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.symbols
    }

    /// The canonicalization factory.
    #[must_use]
    pub fn factory(&self) -> &PolynomialFactory {
        &self.factory
    }

    /// The algebraic context.
    #[must_use]
    pub fn context(&self) -> &Arc<dyn Context> {
        &self.context
    }

    /// A registered transform.
    #[must_use]
    pub fn transform(&self, id: TransformId) -> Option<&Arc<dyn MatrixTransform>> {
        self.transforms.get(id.value())
    }

    /// Register a transform, issuing its id.
    pub fn register_transform(&mut self, transform: Arc<dyn MatrixTransform>) -> TransformId {
        let id = TransformId(self.transforms.len());
        self.transforms.push(transform);
        id
    }

    /// Append an observer to the dispatch order.
    pub fn add_observer(&mut self, observer: Box<dyn BuildObserver>) {
        self.observers.push(observer);
    }

    /// Append a matrix built wholly outside any builder.
    ///
    /// The entry is tagged [`MatrixKind::Value`] and receives a fresh
    /// offset; no index store references it.
    pub fn push_value_matrix(
        &mut self,
        matrix: SymbolicMatrix,
    ) -> (Offset, Arc<SymbolicMatrix>) {
        let (offset, matrix) = self.store.push(MatrixKind::Value, matrix);
        debug!(offset = offset.value(), "appended value matrix");
        (offset, matrix)
    }

    /// Re-canonicalize a stored matrix in place.
    ///
    /// Applied after the registry learns new Hermiticity facts about a
    /// symbol, so earlier matrices fold their conjugate flags accordingly.
    /// The offset, kind and dimension are unchanged.
    pub fn recanonicalize(&mut self, offset: Offset) -> Result<(), SymmatError> {
        let entry = self
            .store
            .get(offset)
            .ok_or(SymmatError::UnknownOffset(offset))?;
        let dimension = entry.matrix.dimension();
        let cells: Vec<Polynomial> = entry
            .matrix
            .cells()
            .iter()
            .map(|cell| self.factory.canonicalize(&self.symbols, cell.terms().to_vec()))
            .collect();
        let rebuilt = SymbolicMatrix::from_cells(dimension, cells, &self.symbols)?;
        self.store.update(offset, rebuilt)
    }

    /// Run the observer list in order.
    ///
    /// The list is detached during dispatch so observers can themselves hold
    /// the capability; observers registered mid-dispatch join the end of the
    /// order and see subsequent builds.
    pub(crate) fn notify_observers(&mut self, event: &BuildEvent) -> Result<(), SymmatError> {
        if self.observers.is_empty() {
            return Ok(());
        }
        let mut observers = std::mem::take(&mut self.observers);
        let mut outcome = Ok(());
        for observer in &mut observers {
            if let Err(err) = observer.on_matrix_built(self, event) {
                outcome = Err(err);
                break;
            }
        }
        observers.append(&mut self.observers);
        self.observers = observers;
        outcome
    }
}

// =============================================================================
// MATRIX SYSTEM
// =============================================================================

/// Thread-safe facade over a [`SystemCore`].
///
/// Every method takes the appropriate side of the reader-writer lock and
/// delegates to the per-kind caches. Callers composing several operations
/// atomically use [`MatrixSystem::read`] / [`MatrixSystem::write`] with the
/// cache and core APIs directly.
#[derive(Debug)]
pub struct MatrixSystem {
    core: RwLock<SystemCore>,
}

impl MatrixSystem {
    /// Create a system over a context with the default factory.
    #[must_use]
    pub fn new(context: Arc<dyn Context>) -> Self {
        Self::with_factory(context, PolynomialFactory::default())
    }

    /// Create a system over a context with an explicit factory.
    #[must_use]
    pub fn with_factory(context: Arc<dyn Context>, factory: PolynomialFactory) -> Self {
        Self {
            core: RwLock::new(SystemCore::new(context, factory)),
        }
    }

    /// Take the reader capability.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, SystemCore> {
        self.core.read()
    }

    /// Take the writer capability.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, SystemCore> {
        self.core.write()
    }

    // =========================================================================
    // MOMENT MATRICES
    // =========================================================================

    /// Get or build the moment matrix for a level.
    pub fn create_moment(
        &self,
        level: usize,
        hint: Concurrency,
    ) -> Result<(Offset, Arc<SymbolicMatrix>), SymmatError> {
        let mut core = self.core.write();
        MatrixCache::<MomentBuilder>::create(&mut core, MomentIndex { level }, hint)
    }

    /// Look up the moment matrix for a level without building it.
    pub fn find_moment(&self, level: usize) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        MatrixCache::<MomentBuilder>::find(&self.core.read(), &MomentIndex { level })
    }

    /// Offset of a level's moment matrix; [`Offset::ABSENT`] if unbuilt.
    #[must_use]
    pub fn find_moment_index(&self, level: usize) -> Offset {
        MatrixCache::<MomentBuilder>::find_index(&self.core.read(), &MomentIndex { level })
    }

    /// Whether a level's moment matrix has been built.
    #[must_use]
    pub fn contains_moment(&self, level: usize) -> bool {
        MatrixCache::<MomentBuilder>::contains(&self.core.read(), &MomentIndex { level })
    }

    // =========================================================================
    // LOCALIZING MATRICES
    // =========================================================================

    /// Get or build a localizing matrix.
    pub fn create_localizing(
        &self,
        index: WordIndex,
        hint: Concurrency,
    ) -> Result<(Offset, Arc<SymbolicMatrix>), SymmatError> {
        let mut core = self.core.write();
        MatrixCache::<LocalizingBuilder>::create(&mut core, index, hint)
    }

    /// Look up a localizing matrix without building it.
    pub fn find_localizing(&self, index: &WordIndex) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        MatrixCache::<LocalizingBuilder>::find(&self.core.read(), index)
    }

    /// Offset of a localizing matrix; [`Offset::ABSENT`] if unbuilt.
    #[must_use]
    pub fn find_localizing_index(&self, index: &WordIndex) -> Offset {
        MatrixCache::<LocalizingBuilder>::find_index(&self.core.read(), index)
    }

    /// Whether a localizing matrix has been built.
    #[must_use]
    pub fn contains_localizing(&self, index: &WordIndex) -> bool {
        MatrixCache::<LocalizingBuilder>::contains(&self.core.read(), index)
    }

    // =========================================================================
    // POLYNOMIAL MATRICES
    // =========================================================================

    /// Get or build the composite matrix for a level and polynomial.
    ///
    /// The polynomial is canonicalized before keying, so term-order
    /// permutations of one canonical polynomial share a single entry.
    pub fn create_polynomial(
        &self,
        level: usize,
        poly: Polynomial,
        hint: Concurrency,
    ) -> Result<(Offset, Arc<SymbolicMatrix>), SymmatError> {
        let mut core = self.core.write();
        let poly = core.factory().canonicalize(core.symbols(), poly.terms().to_vec());
        MatrixCache::<PolynomialBuilder>::create(&mut core, PolyIndex { level, poly }, hint)
    }

    /// Look up a composite matrix without building it.
    pub fn find_polynomial(
        &self,
        level: usize,
        poly: &Polynomial,
    ) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        let core = self.core.read();
        let poly = core.factory().canonicalize(core.symbols(), poly.terms().to_vec());
        MatrixCache::<PolynomialBuilder>::find(&core, &PolyIndex { level, poly })
    }

    /// Offset of a composite matrix; [`Offset::ABSENT`] if unbuilt.
    #[must_use]
    pub fn find_polynomial_index(&self, level: usize, poly: &Polynomial) -> Offset {
        let core = self.core.read();
        let poly = core.factory().canonicalize(core.symbols(), poly.terms().to_vec());
        MatrixCache::<PolynomialBuilder>::find_index(&core, &PolyIndex { level, poly })
    }

    /// Whether a composite matrix has been built.
    #[must_use]
    pub fn contains_polynomial(&self, level: usize, poly: &Polynomial) -> bool {
        let core = self.core.read();
        let poly = core.factory().canonicalize(core.symbols(), poly.terms().to_vec());
        MatrixCache::<PolynomialBuilder>::contains(&core, &PolyIndex { level, poly })
    }

    // =========================================================================
    // SUBSTITUTED MATRICES
    // =========================================================================

    /// Get or build a derived matrix.
    pub fn create_substituted(
        &self,
        index: SubstitutedIndex,
        hint: Concurrency,
    ) -> Result<(Offset, Arc<SymbolicMatrix>), SymmatError> {
        let mut core = self.core.write();
        MatrixCache::<SubstitutedBuilder>::create(&mut core, index, hint)
    }

    /// Look up a derived matrix without building it.
    pub fn find_substituted(
        &self,
        index: &SubstitutedIndex,
    ) -> Result<Arc<SymbolicMatrix>, SymmatError> {
        MatrixCache::<SubstitutedBuilder>::find(&self.core.read(), index)
    }

    /// Offset of a derived matrix; [`Offset::ABSENT`] if unbuilt.
    #[must_use]
    pub fn find_substituted_index(&self, index: &SubstitutedIndex) -> Offset {
        MatrixCache::<SubstitutedBuilder>::find_index(&self.core.read(), index)
    }

    /// Whether a derived matrix has been built.
    #[must_use]
    pub fn contains_substituted(&self, index: &SubstitutedIndex) -> bool {
        MatrixCache::<SubstitutedBuilder>::contains(&self.core.read(), index)
    }

    // =========================================================================
    // STORE-LEVEL OPERATIONS
    // =========================================================================

    /// Append a caller-built matrix, returning its fresh offset.
    pub fn push_value_matrix(
        &self,
        matrix: SymbolicMatrix,
    ) -> (Offset, Arc<SymbolicMatrix>) {
        self.core.write().push_value_matrix(matrix)
    }

    /// Register a transform for the substituted builder.
    pub fn register_transform(&self, transform: Arc<dyn MatrixTransform>) -> TransformId {
        self.core.write().register_transform(transform)
    }

    /// Append a post-build observer.
    pub fn add_observer(&self, observer: Box<dyn BuildObserver>) {
        self.core.write().add_observer(observer);
    }

    /// Number of stored matrices of all kinds.
    #[must_use]
    pub fn matrix_count(&self) -> usize {
        self.core.read().store().len()
    }

    /// Number of interned symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.core.read().symbols().len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FreeContext;

    fn system() -> MatrixSystem {
        MatrixSystem::new(Arc::new(FreeContext::new(2)))
    }

    #[test]
    fn create_is_idempotent() {
        let system = system();
        let (first_offset, first) = system
            .create_moment(1, Concurrency::Never)
            .expect("create");
        let (second_offset, second) = system
            .create_moment(1, Concurrency::Never)
            .expect("create");
        assert_eq!(first_offset, second_offset);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(system.matrix_count(), 1);
    }

    #[test]
    fn find_before_create_is_not_found() {
        let system = system();
        let err = system.find_moment(2).expect_err("should miss");
        assert!(matches!(err, SymmatError::NotFound(_)));
        assert!(err.to_string().contains("level 2"));
        assert!(system.find_moment_index(2).is_absent());
        assert!(!system.contains_moment(2));
    }

    #[test]
    fn find_after_create_succeeds() {
        let system = system();
        let (offset, created) = system
            .create_moment(1, Concurrency::Never)
            .expect("create");
        let found = system.find_moment(1).expect("find");
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(system.find_moment_index(1), offset);
        assert!(system.contains_moment(1));
    }

    #[test]
    fn value_matrix_gets_fresh_offset_and_kind() {
        let system = system();
        let (offset, _) = system.push_value_matrix(SymbolicMatrix::zero(2));
        let core = system.read();
        let entry = core.store().get(offset).expect("entry");
        assert_eq!(entry.kind(), MatrixKind::Value);
        // The value entry is invisible to typed moment fetches.
        assert!(matches!(
            core.store().typed(offset, MatrixKind::Moment),
            Err(SymmatError::KindMismatch { .. })
        ));
    }

    #[test]
    fn typed_fetch_rejects_unknown_offset() {
        let system = system();
        let core = system.read();
        assert!(matches!(
            core.store().typed(Offset::new(9), MatrixKind::Moment),
            Err(SymmatError::UnknownOffset(_))
        ));
        assert!(matches!(
            core.store().typed(Offset::ABSENT, MatrixKind::Moment),
            Err(SymmatError::UnknownOffset(_))
        ));
    }

    #[test]
    fn recanonicalize_folds_new_hermiticity_knowledge() {
        use crate::poly::Monomial;
        use crate::symbols::OperatorSequence;
        use num_complex::Complex64;

        let system = system();
        let mut core = system.write();

        // A non-Hermitian symbol used in conjugated form.
        let expr = core.symbols_mut().intern(
            OperatorSequence::new(vec![0, 1]),
            OperatorSequence::new(vec![1, 0]),
        );
        let cell = Polynomial::from_monomial(Monomial::new(
            expr.id,
            Complex64::new(1.0, 0.0),
            true,
        ));
        let matrix =
            SymbolicMatrix::from_cells(1, vec![cell], core.symbols()).expect("matrix");
        let (offset, _) = core.push_value_matrix(matrix);

        // Later knowledge: the symbol is Hermitian after all.
        core.symbols_mut().mark_hermitian(expr.id).expect("mark");
        core.recanonicalize(offset).expect("recanonicalize");

        let entry = core.store().get(offset).expect("entry");
        let term = entry.matrix().get(0, 0).expect("cell").terms()[0];
        assert!(!term.conjugated);
        // Offset and store length unchanged: in-place only.
        assert_eq!(core.store().len(), 1);
    }

    #[test]
    fn observer_runs_after_durable_store() {
        struct LengthWatcher {
            seen: Arc<std::sync::atomic::AtomicUsize>,
        }
        impl BuildObserver for LengthWatcher {
            fn on_matrix_built(
                &mut self,
                core: &mut SystemCore,
                event: &BuildEvent,
            ) -> Result<(), SymmatError> {
                // The event's matrix must already be fetchable.
                core.store().typed(event.offset, event.kind)?;
                self.seen
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }
        }

        let system = system();
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        system.add_observer(Box::new(LengthWatcher {
            seen: Arc::clone(&seen),
        }));

        system.create_moment(1, Concurrency::Never).expect("create");
        // Hit: no rebuild, no second notification.
        system.create_moment(1, Concurrency::Never).expect("create");
        assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn polynomial_create_unifies_permuted_keys() {
        use crate::poly::Monomial;
        use crate::symbols::OperatorSequence;
        use num_complex::Complex64;

        let system = system();
        let (x0, x1) = {
            let mut core = system.write();
            let x0 = core
                .symbols_mut()
                .intern(
                    OperatorSequence::new(vec![0]),
                    OperatorSequence::new(vec![0]),
                )
                .id;
            let x1 = core
                .symbols_mut()
                .intern(
                    OperatorSequence::new(vec![1]),
                    OperatorSequence::new(vec![1]),
                )
                .id;
            (x0, x1)
        };

        let one = Complex64::new(1.0, 0.0);
        let forward = Polynomial::from_canonical_terms(vec![
            Monomial::new(x0, one, false),
            Monomial::new(x1, one, false),
        ]);
        // Same multiset of terms, split and summed differently.
        let halves = {
            let core = system.read();
            let factory = core.factory();
            factory.sum(
                core.symbols(),
                [
                    &Polynomial::from_monomial(Monomial::new(x1, one, false)),
                    &Polynomial::from_monomial(Monomial::new(x0, one, false)),
                ],
            )
        };

        let (first, _) = system
            .create_polynomial(1, forward, Concurrency::Never)
            .expect("create");
        let (second, _) = system
            .create_polynomial(1, halves, Concurrency::Never)
            .expect("create");
        assert_eq!(first, second);
    }
}
