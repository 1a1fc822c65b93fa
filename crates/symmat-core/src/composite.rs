//! # Composite Assembly
//!
//! Combines N weighted constituent matrices into one new matrix of a fixed
//! dimension. This is the algebra behind the polynomial (composite) builder:
//! each monomial term of a requested polynomial contributes one previously
//! cached constituent, and the weighted sum becomes the new artifact.
//!
//! [`ConstituentInfo`] is ephemeral: built for a single [`assemble`] call
//! and never retained.

use num_complex::Complex64;
use std::sync::Arc;

use crate::errors::SymmatError;
use crate::matrix::SymbolicMatrix;
use crate::poly::{Monomial, PolynomialFactory};
use crate::symbols::SymbolRegistry;

// =============================================================================
// CONSTITUENTS
// =============================================================================

/// One (matrix, weight) pair consumed by assembly.
#[derive(Debug, Clone)]
pub struct Constituent {
    /// Previously cached constituent matrix.
    pub matrix: Arc<SymbolicMatrix>,
    /// Complex scalar weight.
    pub weight: Complex64,
}

/// Build-time-only assembly input: target dimension plus ordered weighted
/// constituents.
#[derive(Debug, Clone)]
pub struct ConstituentInfo {
    /// Dimension the assembled matrix must have.
    pub dimension: usize,
    /// Ordered constituent list.
    pub elements: Vec<Constituent>,
}

impl ConstituentInfo {
    /// Create an empty constituent list for the target dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            elements: Vec::new(),
        }
    }

    /// Append a weighted constituent.
    pub fn push(&mut self, matrix: Arc<SymbolicMatrix>, weight: Complex64) {
        self.elements.push(Constituent { matrix, weight });
    }
}

// =============================================================================
// ASSEMBLY
// =============================================================================

/// Assemble one matrix from weighted constituents.
///
/// - Empty list: the all-zero matrix of the target dimension.
/// - Single constituent: its cells scaled by the weight and
///   re-canonicalized; a monomial constituent stays monomial.
/// - N >= 2: per cell, the scaled terms of every constituent are
///   concatenated and folded through the factory into normal form.
///
/// Every constituent must report the target dimension; a mismatch raises
/// [`SymmatError::DimensionMismatch`] before any output is produced.
pub fn assemble(
    info: &ConstituentInfo,
    registry: &SymbolRegistry,
    factory: &PolynomialFactory,
) -> Result<SymbolicMatrix, SymmatError> {
    for constituent in &info.elements {
        let found = constituent.matrix.dimension();
        if found != info.dimension {
            return Err(SymmatError::DimensionMismatch {
                expected: info.dimension,
                found,
            });
        }
    }

    match info.elements.as_slice() {
        [] => Ok(SymbolicMatrix::zero(info.dimension)),
        [single] => {
            let cells = single
                .matrix
                .cells()
                .iter()
                .map(|cell| factory.scale(registry, cell, single.weight))
                .collect();
            SymbolicMatrix::from_cells(info.dimension, cells, registry)
        }
        many => {
            let cell_count = info.dimension * info.dimension;
            let mut cells = Vec::with_capacity(cell_count);
            for position in 0..cell_count {
                let mut terms: Vec<Monomial> = Vec::new();
                for constituent in many {
                    terms.extend(constituent.matrix.cells()[position].terms().iter().map(
                        |t| Monomial::new(t.symbol, t.factor * constituent.weight, t.conjugated),
                    ));
                }
                cells.push(factory.canonicalize(registry, terms));
            }
            SymbolicMatrix::from_cells(info.dimension, cells, registry)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
