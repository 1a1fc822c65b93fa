//! # Error Types
//!
//! All fallible operations in symmat-core return `Result<T, SymmatError>`.
//!
//! Three families of failure exist:
//! - `NotFound`: a lookup-without-construction missed. Recoverable; the
//!   message is supplied by the builder for the requested matrix kind.
//! - `KindMismatch`: a resolved offset holds a matrix of the wrong kind.
//!   This signals a cross-kind index collision and is always fatal to the
//!   operation; under the one-offset-per-index invariant it never occurs.
//! - Construction errors (`DimensionMismatch`, `UnknownSource`,
//!   `UnknownTransform`, `UnsupportedSource`, `MalformedMatrix`): raised by a
//!   builder before any mutation, leaving observable state unchanged.
//!
//! No retries occur anywhere in this core; every failure propagates
//! synchronously to the caller.

use crate::index::{Offset, TransformId};
use crate::matrix::MatrixKind;
use thiserror::Error;

/// Errors that can occur in the symmat matrix-cache core.
#[derive(Debug, Error)]
pub enum SymmatError {
    /// A lookup-without-construction found no matrix for the index.
    /// The message describes the missing matrix in builder-specific terms.
    #[error("matrix not found: {0}")]
    NotFound(String),

    /// A resolved offset holds a matrix of the wrong kind.
    /// Cross-kind index collision; fatal, never expected under correct use.
    #[error("offset {} holds a {found} matrix where a {expected} matrix was expected", offset.value())]
    KindMismatch {
        /// The colliding offset.
        offset: Offset,
        /// The kind the cache expected.
        expected: MatrixKind,
        /// The kind actually stored.
        found: MatrixKind,
    },

    /// An offset does not address any entry in the matrix store.
    #[error("offset {} is outside the matrix store", .0.value())]
    UnknownOffset(Offset),

    /// A composite constituent does not match the target dimension.
    #[error("constituent dimension {found} does not match target dimension {expected}")]
    DimensionMismatch {
        /// Dimension the assembly was asked to produce.
        expected: usize,
        /// Dimension the offending constituent reported.
        found: usize,
    },

    /// The substituted builder's source offset addresses no matrix.
    #[error("source matrix at offset {} does not exist", .0.value())]
    UnknownSource(Offset),

    /// The substituted builder's transform id is not registered.
    #[error("transform {} is not registered", .0.value())]
    UnknownTransform(TransformId),

    /// A transform refused the source matrix (wrong subtype for the rule).
    #[error("transform '{transform}' does not accept the matrix at offset {}", offset.value())]
    UnsupportedSource {
        /// Offset of the rejected source matrix.
        offset: Offset,
        /// Name of the refusing transform.
        transform: String,
    },

    /// A cell table cannot fill a square matrix of the stated dimension.
    #[error("{cells} cells cannot fill a {dimension}x{dimension} matrix")]
    MalformedMatrix {
        /// Requested square dimension.
        dimension: usize,
        /// Number of cells actually supplied.
        cells: usize,
    },

    /// A polynomial term references a symbol the registry has never issued.
    #[error("symbol {} is not registered", .0.value())]
    UnknownSymbol(crate::symbols::SymbolId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_message_names_both_kinds() {
        let err = SymmatError::KindMismatch {
            offset: Offset::new(3),
            expected: MatrixKind::Moment,
            found: MatrixKind::Localizing,
        };
        let msg = err.to_string();
        assert!(msg.contains("moment"));
        assert!(msg.contains("localizing"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn not_found_carries_builder_message() {
        let err = SymmatError::NotFound("moment matrix for level 2".to_string());
        assert!(err.to_string().contains("level 2"));
    }
}
