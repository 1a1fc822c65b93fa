//! # Symbolic Matrix
//!
//! The artifact cached by this subsystem: a square table of canonical
//! polynomial entries, tagged with properties derived at construction time
//! (dimension, monomial-vs-polynomial kind, Hermiticity, referenced symbols).
//!
//! Matrices are immutable once stored; the only permitted in-place change is
//! re-canonicalization through the owning system, which replaces the whole
//! table without moving its offset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::SymmatError;
use crate::poly::Polynomial;
use crate::symbols::{SymbolId, SymbolRegistry};

// =============================================================================
// MATRIX KIND
// =============================================================================

/// Which cache family produced a stored matrix.
///
/// Every matrix store entry carries its kind; typed fetches check it so a
/// cross-kind offset collision surfaces as an error instead of silently
/// returning the wrong family's matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatrixKind {
    /// Top-level moment matrix for a hierarchy level.
    Moment,
    /// Localizing matrix for a level and operator word.
    Localizing,
    /// Composite matrix assembled from weighted constituents.
    Polynomial,
    /// Derived matrix produced by applying a transform to a source.
    Substituted,
    /// Caller-supplied matrix appended outside any builder.
    Value,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatrixKind::Moment => "moment",
            MatrixKind::Localizing => "localizing",
            MatrixKind::Polynomial => "polynomial",
            MatrixKind::Substituted => "substituted",
            MatrixKind::Value => "value",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// Properties derived from a matrix's cells at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixProperties {
    /// Every cell holds at most one term.
    pub monomial: bool,
    /// The matrix equals its own conjugate transpose.
    pub hermitian: bool,
    /// Symbols referenced anywhere in the table.
    pub included_symbols: BTreeSet<SymbolId>,
}

// =============================================================================
// SYMBOLIC MATRIX
// =============================================================================

/// A square table of canonical polynomials with derived properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolicMatrix {
    dimension: usize,
    /// Row-major cells, `dimension * dimension` entries.
    cells: Vec<Polynomial>,
    properties: MatrixProperties,
}

impl SymbolicMatrix {
    /// Build a matrix from row-major cells, deriving its properties.
    ///
    /// The registry supplies the Hermiticity knowledge used for the
    /// conjugate-transpose test.
    pub fn from_cells(
        dimension: usize,
        cells: Vec<Polynomial>,
        registry: &SymbolRegistry,
    ) -> Result<Self, SymmatError> {
        if cells.len() != dimension * dimension {
            return Err(SymmatError::MalformedMatrix {
                dimension,
                cells: cells.len(),
            });
        }

        let monomial = cells.iter().all(Polynomial::is_monomial);
        let included_symbols: BTreeSet<SymbolId> =
            cells.iter().flat_map(Polynomial::symbols).collect();
        let hermitian = (0..dimension).all(|row| {
            (row..dimension).all(|col| {
                cells[row * dimension + col]
                    == cells[col * dimension + row].conjugate(registry)
            })
        });

        Ok(Self {
            dimension,
            cells,
            properties: MatrixProperties {
                monomial,
                hermitian,
                included_symbols,
            },
        })
    }

    /// The all-zero matrix of the given dimension.
    #[must_use]
    pub fn zero(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![Polynomial::zero(); dimension * dimension],
            properties: MatrixProperties {
                monomial: true,
                hermitian: true,
                included_symbols: BTreeSet::new(),
            },
        }
    }

    /// Square dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Cell at (row, col). `None` when out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Polynomial> {
        if row >= self.dimension || col >= self.dimension {
            return None;
        }
        self.cells.get(row * self.dimension + col)
    }

    /// Row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[Polynomial] {
        &self.cells
    }

    /// Derived properties.
    #[must_use]
    pub fn properties(&self) -> &MatrixProperties {
        &self.properties
    }

    /// Whether every cell is a monomial.
    #[must_use]
    pub fn is_monomial(&self) -> bool {
        self.properties.monomial
    }

    /// Whether the matrix equals its conjugate transpose.
    ///
    /// Read-only algebra: safe under a shared lock.
    #[must_use]
    pub fn is_hermitian(&self) -> bool {
        self.properties.hermitian
    }
}

// =============================================================================
// TESTS
// =============================================================================
