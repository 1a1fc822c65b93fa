//! # Matrix Transforms
//!
//! Opaque transform objects consumed by the substituted (derived) builder:
//! a transform takes a stored source matrix and produces a new matrix of the
//! same dimension.
//!
//! # Extension Point
//!
//! Scenario-specific completion rules implement [`MatrixTransform`] outside
//! this crate. The shipped [`SubstitutionRules`] rewrites symbols to
//! polynomials, which is the common case for algebraic completion.

use std::collections::BTreeMap;

use crate::errors::SymmatError;
use crate::matrix::SymbolicMatrix;
use crate::poly::{Monomial, Polynomial, PolynomialFactory};
use crate::symbols::{SymbolId, SymbolRegistry};

// =============================================================================
// TRANSFORM TRAIT
// =============================================================================

/// A derivation applied to one stored matrix.
pub trait MatrixTransform: Send + Sync + std::fmt::Debug {
    /// Human-readable transform name, used in error messages.
    fn name(&self) -> &str;

    /// Whether the transform can consume this source matrix.
    ///
    /// Returning `false` makes the substituted builder fail with
    /// [`SymmatError::UnsupportedSource`] before any mutation.
    fn accepts(&self, _source: &SymbolicMatrix) -> bool {
        true
    }

    /// Apply the transform, producing the derived matrix.
    fn apply(
        &self,
        source: &SymbolicMatrix,
        registry: &SymbolRegistry,
        factory: &PolynomialFactory,
    ) -> Result<SymbolicMatrix, SymmatError>;
}

// =============================================================================
// SUBSTITUTION RULES
// =============================================================================

/// Symbol-to-polynomial rewrite map.
///
/// Every cell term whose symbol has a rule is replaced by the rule's
/// polynomial scaled by the term's factor; conjugated occurrences use the
/// conjugated rule. Terms without a rule pass through unchanged. The result
/// of each cell is re-canonicalized.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionRules {
    rules: BTreeMap<SymbolId, Polynomial>,
}

impl SubstitutionRules {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rewrite for a symbol.
    pub fn add_rule(&mut self, symbol: SymbolId, replacement: Polynomial) {
        self.rules.insert(symbol, replacement);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite one polynomial through the rule set.
    #[must_use]
    pub fn reduce(
        &self,
        registry: &SymbolRegistry,
        factory: &PolynomialFactory,
        poly: &Polynomial,
    ) -> Polynomial {
        let mut terms: Vec<Monomial> = Vec::with_capacity(poly.len());
        for term in poly.terms() {
            match self.rules.get(&term.symbol) {
                Some(replacement) => {
                    let oriented = if term.conjugated {
                        replacement.conjugate(registry)
                    } else {
                        replacement.clone()
                    };
                    terms.extend(
                        oriented
                            .terms()
                            .iter()
                            .map(|r| Monomial::new(r.symbol, r.factor * term.factor, r.conjugated)),
                    );
                }
                None => terms.push(*term),
            }
        }
        factory.canonicalize(registry, terms)
    }
}

impl MatrixTransform for SubstitutionRules {
    fn name(&self) -> &str {
        "substitution rules"
    }

    fn apply(
        &self,
        source: &SymbolicMatrix,
        registry: &SymbolRegistry,
        factory: &PolynomialFactory,
    ) -> Result<SymbolicMatrix, SymmatError> {
        let cells = source
            .cells()
            .iter()
            .map(|cell| self.reduce(registry, factory, cell))
            .collect();
        SymbolicMatrix::from_cells(source.dimension(), cells, registry)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::OperatorSequence;
    use num_complex::Complex64;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn hermitian_symbol(registry: &mut SymbolRegistry, op: u64) -> SymbolId {
        registry
            .intern(
                OperatorSequence::new(vec![op]),
                OperatorSequence::new(vec![op]),
            )
            .id
    }

    #[test]
    fn reduce_substitutes_and_merges() {
        let mut registry = SymbolRegistry::new();
        let a = hermitian_symbol(&mut registry, 1);
        let b = hermitian_symbol(&mut registry, 2);
        let factory = PolynomialFactory::default();

        // a -> 2*b
        let mut rules = SubstitutionRules::new();
        rules.add_rule(
            a,
            Polynomial::from_monomial(Monomial::new(b, c(2.0), false)),
        );

        // 3*a + b -> 6*b + b = 7*b
        let poly = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(a, c(3.0), false),
                Monomial::new(b, c(1.0), false),
            ],
        );
        let reduced = rules.reduce(&registry, &factory, &poly);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced.terms()[0].symbol, b);
        assert_eq!(reduced.terms()[0].factor, c(7.0));
    }

    #[test]
    fn reduce_to_zero_prunes_cell() {
        let mut registry = SymbolRegistry::new();
        let a = hermitian_symbol(&mut registry, 1);
        let factory = PolynomialFactory::default();

        let mut rules = SubstitutionRules::new();
        rules.add_rule(a, Polynomial::zero());

        let poly = Polynomial::from_monomial(Monomial::new(a, c(4.0), false));
        let reduced = rules.reduce(&registry, &factory, &poly);
        assert!(reduced.is_empty());
    }

    #[test]
    fn apply_rewrites_every_cell() {
        let mut registry = SymbolRegistry::new();
        let a = hermitian_symbol(&mut registry, 1);
        let b = hermitian_symbol(&mut registry, 2);
        let factory = PolynomialFactory::default();

        let cell = Polynomial::from_monomial(Monomial::new(a, c(1.0), false));
        let source =
            SymbolicMatrix::from_cells(1, vec![cell], &registry).expect("matrix");

        let mut rules = SubstitutionRules::new();
        rules.add_rule(
            a,
            Polynomial::from_monomial(Monomial::new(b, c(5.0), false)),
        );

        let derived = rules.apply(&source, &registry, &factory).expect("apply");
        let cell = derived.get(0, 0).expect("cell");
        assert_eq!(cell.terms()[0].symbol, b);
        assert_eq!(cell.terms()[0].factor, c(5.0));
    }
}
