//! # symmat-core
//!
//! Symbolic moment-matrix construction with at-most-once caching.
//!
//! This crate builds and caches the symbolic matrices of an operator moment
//! hierarchy: moment matrices per level, localizing matrices per (level,
//! word), composite matrices per (level, polynomial) assembled from cached
//! constituents, and derived matrices obtained by applying registered
//! transforms to stored sources.
//!
//! ## Architectural Constraints
//!
//! - The matrix store is append-only: offsets are issued once and never
//!   invalidated; the only in-place change is re-canonicalization.
//! - Each structural index builds its matrix at most once, guarded by one
//!   reader-writer lock around the whole system state.
//! - Recursive builds (composite into localizing) pass the exclusive borrow
//!   down the call chain instead of re-locking.
//! - Pure symbolic construction: no async, no I/O, no numeric solving.

// =============================================================================
// MODULES
// =============================================================================

pub mod builders;
pub mod cache;
pub mod composite;
pub mod context;
pub mod errors;
pub mod index;
pub mod matrix;
pub mod poly;
pub mod symbols;
pub mod system;
pub mod transforms;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use errors::SymmatError;
pub use index::{
    MomentIndex, Offset, PolyIndex, SubstitutedIndex, TransformId, WordIndex,
};
pub use matrix::{MatrixKind, MatrixProperties, SymbolicMatrix};
pub use poly::{DEFAULT_ZERO_TOLERANCE, Monomial, Polynomial, PolynomialFactory};
pub use symbols::{OperatorSequence, SymbolExpr, SymbolId, SymbolInfo, SymbolRegistry};

// =============================================================================
// RE-EXPORTS: Construction Engine
// =============================================================================

pub use cache::{Concurrency, MatrixBuilder, MatrixCache, PARALLEL_DIMENSION_THRESHOLD};
pub use composite::{Constituent, ConstituentInfo, assemble};
pub use context::{Context, FreeContext};
pub use system::{
    BuildEvent, BuildObserver, MatrixEntry, MatrixStore, MatrixSystem, SystemCore,
};
pub use transforms::{MatrixTransform, SubstitutionRules};
