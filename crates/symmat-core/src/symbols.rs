//! # Symbol Registry
//!
//! Canonical operator-sequence-to-symbol mapping for the symmat core.
//!
//! Every distinct operator word that appears in a matrix cell is interned
//! exactly once and addressed by a [`SymbolId`]. A word and its conjugate
//! share one symbol: the lexicographically smaller form is canonical, and
//! the larger form resolves to the same id with the `conjugated` flag set.
//!
//! ## Reserved symbols
//!
//! - `SymbolId(0)` is the zero symbol (no operator sequence).
//! - `SymbolId(1)` is the identity (the empty word), always Hermitian.
//!
//! ## Determinism Guarantees
//!
//! Interning is insert-once: re-registering a known word (or its conjugate)
//! returns the id originally issued. The sequence index is a `BTreeMap`, so
//! iteration order is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::SymmatError;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for an interned symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u64);

impl SymbolId {
    /// The zero symbol.
    pub const ZERO: SymbolId = SymbolId(0);

    /// The identity symbol (empty operator word).
    pub const IDENTITY: SymbolId = SymbolId(1);

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// OPERATOR SEQUENCES
// =============================================================================

/// A word over the context's operators.
///
/// The empty word is the algebra's identity. Sequences carry no algebraic
/// meaning on their own; multiplication, conjugation and simplification are
/// supplied by the [`Context`](crate::context::Context).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct OperatorSequence(pub Vec<u64>);

impl OperatorSequence {
    /// The empty word (identity).
    #[must_use]
    pub fn identity() -> Self {
        Self(Vec::new())
    }

    /// Create a sequence from raw operator ids.
    #[must_use]
    pub fn new(ops: Vec<u64>) -> Self {
        Self(ops)
    }

    /// Word length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the identity word.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The operators of the word.
    #[must_use]
    pub fn ops(&self) -> &[u64] {
        &self.0
    }
}

impl std::fmt::Display for OperatorSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "e");
        }
        let mut first = true;
        for op in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "X{op}")?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// SYMBOL METADATA
// =============================================================================

/// Metadata recorded for one interned symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// The symbol's id.
    pub id: SymbolId,
    /// Canonical operator word. `None` only for the zero symbol.
    pub sequence: Option<OperatorSequence>,
    /// Whether the symbol equals its own conjugate.
    pub hermitian: bool,
    /// Whether the symbol equals the negation of its conjugate.
    pub antihermitian: bool,
    /// Position of the symbol's real part in the real basis, if any.
    pub basis_re: Option<usize>,
    /// Position of the symbol's imaginary part in the imaginary basis, if any.
    pub basis_im: Option<usize>,
}

/// Resolution of a word against the registry: the canonical symbol plus
/// whether the word is the conjugated form of that symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolExpr {
    /// Canonical symbol id.
    pub id: SymbolId,
    /// True when the queried word was the non-canonical (conjugate) form.
    pub conjugated: bool,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Insert-once mapping from canonical operator words to symbols.
///
/// Interning a word that is already known (directly or as the conjugate of a
/// known word) returns the previously issued id. New symbols receive basis
/// positions: a real-basis slot unless anti-Hermitian, an imaginary-basis
/// slot unless Hermitian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRegistry {
    /// Symbol table, indexed by `SymbolId`.
    symbols: Vec<SymbolInfo>,
    /// Canonical-word index. Both forms of a non-Hermitian word map here.
    by_sequence: BTreeMap<OperatorSequence, SymbolExpr>,
    /// Next free real-basis position.
    next_real: usize,
    /// Next free imaginary-basis position.
    next_imaginary: usize,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    /// Create a registry seeded with the zero and identity symbols.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            symbols: Vec::new(),
            by_sequence: BTreeMap::new(),
            next_real: 0,
            next_imaginary: 0,
        };

        // Symbol 0: zero. No word, no basis presence.
        registry.symbols.push(SymbolInfo {
            id: SymbolId::ZERO,
            sequence: None,
            hermitian: true,
            antihermitian: true,
            basis_re: None,
            basis_im: None,
        });

        // Symbol 1: identity (the empty word). Hermitian.
        let identity = OperatorSequence::identity();
        registry.symbols.push(SymbolInfo {
            id: SymbolId::IDENTITY,
            sequence: Some(identity.clone()),
            hermitian: true,
            antihermitian: false,
            basis_re: Some(registry.next_real),
            basis_im: None,
        });
        registry.next_real += 1;
        registry.by_sequence.insert(
            identity,
            SymbolExpr {
                id: SymbolId::IDENTITY,
                conjugated: false,
            },
        );

        registry
    }

    /// Intern a word given both the word and its conjugate.
    ///
    /// The lexicographically smaller of the two forms is canonical. Returns
    /// the symbol id plus whether `sequence` itself was the conjugated form.
    /// Re-interning a known word returns the original id.
    pub fn intern(
        &mut self,
        sequence: OperatorSequence,
        conjugate: OperatorSequence,
    ) -> SymbolExpr {
        if let Some(&expr) = self.by_sequence.get(&sequence) {
            return expr;
        }

        let hermitian = sequence == conjugate;
        let (canonical, other, queried_was_conjugate) = if conjugate < sequence {
            (conjugate, Some(sequence), true)
        } else if hermitian {
            (sequence, None, false)
        } else {
            (sequence, Some(conjugate), false)
        };

        let id = SymbolId(self.symbols.len() as u64);
        let basis_re = Some(self.next_real);
        self.next_real += 1;
        let basis_im = if hermitian {
            None
        } else {
            let slot = self.next_imaginary;
            self.next_imaginary += 1;
            Some(slot)
        };

        self.symbols.push(SymbolInfo {
            id,
            sequence: Some(canonical.clone()),
            hermitian,
            antihermitian: false,
            basis_re,
            basis_im,
        });

        self.by_sequence.insert(
            canonical,
            SymbolExpr {
                id,
                conjugated: false,
            },
        );
        if let Some(conjugate_form) = other {
            self.by_sequence.insert(
                conjugate_form,
                SymbolExpr {
                    id,
                    conjugated: true,
                },
            );
        }

        SymbolExpr {
            id,
            conjugated: queried_was_conjugate,
        }
    }

    /// Resolve a word without interning.
    #[must_use]
    pub fn resolve(&self, sequence: &OperatorSequence) -> Option<SymbolExpr> {
        self.by_sequence.get(sequence).copied()
    }

    /// Get a symbol's metadata.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&SymbolInfo> {
        self.symbols.get(id.0 as usize)
    }

    /// Canonical word of a symbol. Errors for unknown ids and for the zero
    /// symbol, which has no word.
    pub fn sequence(&self, id: SymbolId) -> Result<&OperatorSequence, SymmatError> {
        self.get(id)
            .and_then(|info| info.sequence.as_ref())
            .ok_or(SymmatError::UnknownSymbol(id))
    }

    /// Whether the symbol is known Hermitian.
    #[must_use]
    pub fn is_hermitian(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(|info| info.hermitian)
    }

    /// Whether the symbol is known anti-Hermitian.
    #[must_use]
    pub fn is_antihermitian(&self, id: SymbolId) -> bool {
        self.get(id).is_some_and(|info| info.antihermitian)
    }

    /// Record that a symbol is Hermitian.
    ///
    /// Used by post-build observers when algebraic completion implies the
    /// property after the symbol was first interned. Frees the symbol's
    /// imaginary-basis slot claim for future reporting; already-issued
    /// positions are never reassigned.
    pub fn mark_hermitian(&mut self, id: SymbolId) -> Result<(), SymmatError> {
        let info = self
            .symbols
            .get_mut(id.0 as usize)
            .ok_or(SymmatError::UnknownSymbol(id))?;
        info.hermitian = true;
        info.antihermitian = false;
        Ok(())
    }

    /// Record that a symbol is anti-Hermitian.
    pub fn mark_antihermitian(&mut self, id: SymbolId) -> Result<(), SymmatError> {
        let info = self
            .symbols
            .get_mut(id.0 as usize)
            .ok_or(SymmatError::UnknownSymbol(id))?;
        info.antihermitian = true;
        info.hermitian = false;
        Ok(())
    }

    /// Number of interned symbols, including the two reserved ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether only the reserved symbols exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.len() <= 2
    }

    /// Size of the real basis issued so far.
    #[must_use]
    pub fn real_basis_size(&self) -> usize {
        self.next_real
    }

    /// Size of the imaginary basis issued so far.
    #[must_use]
    pub fn imaginary_basis_size(&self) -> usize {
        self.next_imaginary
    }

    /// All symbols in id order.
    pub fn symbols(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.symbols.iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================
