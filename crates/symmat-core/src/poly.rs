//! # Polynomial Algebra
//!
//! Symbolic monomials and polynomials over registry symbols, plus the
//! canonicalization factory that folds raw weighted-term lists into the
//! system's normal form.
//!
//! ## Normal form
//!
//! A canonical polynomial:
//! - contains no zero-symbol terms,
//! - never conjugates a Hermitian symbol (the flag is cleared),
//! - never conjugates an anti-Hermitian symbol (the flag is cleared and the
//!   factor sign-flipped),
//! - holds at most one term per (symbol, conjugated) key, factors summed,
//! - drops terms whose factor magnitude is at or below the zero tolerance,
//! - orders terms by (symbol, conjugated).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::symbols::{SymbolId, SymbolRegistry};

// =============================================================================
// MONOMIAL
// =============================================================================

/// One weighted, possibly conjugated symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monomial {
    /// The referenced symbol.
    pub symbol: SymbolId,
    /// Complex scalar factor.
    pub factor: Complex64,
    /// Whether the conjugate of the symbol is meant.
    pub conjugated: bool,
}

impl Monomial {
    /// Create a new monomial.
    #[must_use]
    pub const fn new(symbol: SymbolId, factor: Complex64, conjugated: bool) -> Self {
        Self {
            symbol,
            factor,
            conjugated,
        }
    }

    /// The term's canonical sort key.
    #[must_use]
    pub const fn key(&self) -> (SymbolId, bool) {
        (self.symbol, self.conjugated)
    }
}

impl std::fmt::Display for Monomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.factor, self.symbol.value())?;
        if self.conjugated {
            write!(f, "*")?;
        }
        Ok(())
    }
}

// =============================================================================
// POLYNOMIAL
// =============================================================================

/// A canonically ordered list of monomial terms.
///
/// The zero polynomial has no terms. Construction goes through
/// [`PolynomialFactory`]; the raw constructors here assume (and in debug
/// builds assert) canonical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Polynomial {
    terms: Vec<Monomial>,
}

impl Polynomial {
    /// The zero polynomial.
    #[must_use]
    pub const fn zero() -> Self {
        Self { terms: Vec::new() }
    }

    /// A single-term polynomial.
    #[must_use]
    pub fn from_monomial(term: Monomial) -> Self {
        Self { terms: vec![term] }
    }

    /// Construct from terms already in normal form.
    #[must_use]
    pub fn from_canonical_terms(terms: Vec<Monomial>) -> Self {
        debug_assert!(
            terms.windows(2).all(|pair| pair[0].key() < pair[1].key()),
            "terms must be strictly ordered by (symbol, conjugated)"
        );
        Self { terms }
    }

    /// The terms in canonical order.
    #[must_use]
    pub fn terms(&self) -> &[Monomial] {
        &self.terms
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether this is the zero polynomial.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether the polynomial is a monomial (at most one term).
    #[must_use]
    pub fn is_monomial(&self) -> bool {
        self.terms.len() <= 1
    }

    /// Symbols referenced by the polynomial, in order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.terms.iter().map(|t| t.symbol)
    }

    /// Total order by canonical content.
    ///
    /// Compares term keys lexicographically, then factors via `total_cmp`.
    /// This is the injected polynomial order used by the polynomial-keyed
    /// index store: two term-order permutations of the same canonical
    /// polynomial compare equal after canonicalization.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let keys = self
            .terms
            .iter()
            .map(Monomial::key)
            .cmp(other.terms.iter().map(Monomial::key));
        if keys != Ordering::Equal {
            return keys;
        }
        for (a, b) in self.terms.iter().zip(&other.terms) {
            let re = a.factor.re.total_cmp(&b.factor.re);
            if re != Ordering::Equal {
                return re;
            }
            let im = a.factor.im.total_cmp(&b.factor.im);
            if im != Ordering::Equal {
                return im;
            }
        }
        Ordering::Equal
    }

    /// Conjugate of a canonical polynomial.
    ///
    /// Hermitian symbols keep a cleared flag; anti-Hermitian symbols keep a
    /// cleared flag with the factor negated; all factors are conjugated.
    /// Canonical input yields canonical output, so no merging is needed.
    #[must_use]
    pub fn conjugate(&self, registry: &SymbolRegistry) -> Self {
        let mut terms: Vec<Monomial> = self
            .terms
            .iter()
            .map(|t| {
                let factor = t.factor.conj();
                if registry.is_hermitian(t.symbol) {
                    Monomial::new(t.symbol, factor, false)
                } else if registry.is_antihermitian(t.symbol) {
                    Monomial::new(t.symbol, -factor, false)
                } else {
                    Monomial::new(t.symbol, factor, !t.conjugated)
                }
            })
            .collect();
        terms.sort_by_key(Monomial::key);
        Self { terms }
    }
}

impl std::fmt::Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for term in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{term}")?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Default magnitude below which a term counts as zero.
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-12;

/// Canonicalization factory: zero tolerance plus the term-merge, sum and
/// scale operations of the system's normal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialFactory {
    zero_tolerance: f64,
}

impl Default for PolynomialFactory {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_TOLERANCE)
    }
}

impl PolynomialFactory {
    /// Create a factory with the given zero tolerance.
    #[must_use]
    pub const fn new(zero_tolerance: f64) -> Self {
        Self { zero_tolerance }
    }

    /// The factory's zero tolerance.
    #[must_use]
    pub const fn zero_tolerance(&self) -> f64 {
        self.zero_tolerance
    }

    /// Fold a raw weighted-term list into normal form.
    ///
    /// Conjugate flags are fixed against the registry's Hermiticity
    /// knowledge, duplicate keys merged by summing factors, and terms at or
    /// below the zero tolerance dropped.
    #[must_use]
    pub fn canonicalize(&self, registry: &SymbolRegistry, raw: Vec<Monomial>) -> Polynomial {
        let mut fixed: Vec<Monomial> = raw
            .into_iter()
            .filter(|t| t.symbol != SymbolId::ZERO)
            .map(|t| {
                if t.conjugated && registry.is_hermitian(t.symbol) {
                    Monomial::new(t.symbol, t.factor, false)
                } else if t.conjugated && registry.is_antihermitian(t.symbol) {
                    Monomial::new(t.symbol, -t.factor, false)
                } else {
                    t
                }
            })
            .collect();
        fixed.sort_by_key(Monomial::key);

        let mut merged: Vec<Monomial> = Vec::with_capacity(fixed.len());
        for term in fixed {
            match merged.last_mut() {
                Some(last) if last.key() == term.key() => last.factor += term.factor,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| t.factor.norm() > self.zero_tolerance);

        Polynomial { terms: merged }
    }

    /// Scale a polynomial elementwise by a complex weight.
    #[must_use]
    pub fn scale(
        &self,
        registry: &SymbolRegistry,
        poly: &Polynomial,
        weight: Complex64,
    ) -> Polynomial {
        let scaled = poly
            .terms
            .iter()
            .map(|t| Monomial::new(t.symbol, t.factor * weight, t.conjugated))
            .collect();
        self.canonicalize(registry, scaled)
    }

    /// Sum polynomials into one canonical polynomial.
    #[must_use]
    pub fn sum<'a, I>(&self, registry: &SymbolRegistry, polys: I) -> Polynomial
    where
        I: IntoIterator<Item = &'a Polynomial>,
    {
        let terms = polys
            .into_iter()
            .flat_map(|p| p.terms.iter().copied())
            .collect();
        self.canonicalize(registry, terms)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::OperatorSequence;

    fn registry_with_symbols() -> (SymbolRegistry, SymbolId, SymbolId) {
        let mut registry = SymbolRegistry::new();
        // Hermitian word X3 and non-Hermitian word X1.X2.
        let herm = registry
            .intern(
                OperatorSequence::new(vec![3]),
                OperatorSequence::new(vec![3]),
            )
            .id;
        let general = registry
            .intern(
                OperatorSequence::new(vec![1, 2]),
                OperatorSequence::new(vec![2, 1]),
            )
            .id;
        (registry, herm, general)
    }

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn canonicalize_merges_duplicate_keys() {
        let (registry, _, general) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let poly = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(general, c(1.0), false),
                Monomial::new(general, c(2.0), false),
            ],
        );
        assert_eq!(poly.len(), 1);
        assert_eq!(poly.terms()[0].factor, c(3.0));
    }

    #[test]
    fn canonicalize_drops_zero_symbol_and_tiny_terms() {
        let (registry, herm, general) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let poly = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(SymbolId::ZERO, c(5.0), false),
                Monomial::new(herm, c(1e-15), false),
                Monomial::new(general, c(1.0), false),
            ],
        );
        assert_eq!(poly.len(), 1);
        assert_eq!(poly.terms()[0].symbol, general);
    }

    #[test]
    fn canonicalize_clears_conjugate_flag_on_hermitian_symbol() {
        let (registry, herm, _) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let poly = factory.canonicalize(&registry, vec![Monomial::new(herm, c(2.0), true)]);
        assert_eq!(poly.len(), 1);
        assert!(!poly.terms()[0].conjugated);
        assert_eq!(poly.terms()[0].factor, c(2.0));
    }

    #[test]
    fn canonicalize_sign_flips_antihermitian_conjugate() {
        let (mut registry, _, general) = registry_with_symbols();
        registry.mark_antihermitian(general).expect("mark");
        let factory = PolynomialFactory::default();
        let poly = factory.canonicalize(&registry, vec![Monomial::new(general, c(2.0), true)]);
        assert_eq!(poly.len(), 1);
        assert!(!poly.terms()[0].conjugated);
        assert_eq!(poly.terms()[0].factor, c(-2.0));
    }

    #[test]
    fn canonicalize_cancellation_yields_zero_polynomial() {
        let (registry, _, general) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let poly = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(general, c(1.0), false),
                Monomial::new(general, c(-1.0), false),
            ],
        );
        assert!(poly.is_empty());
        assert!(poly.is_monomial());
    }

    #[test]
    fn scale_preserves_monomial_shape() {
        let (registry, herm, _) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let poly = Polynomial::from_monomial(Monomial::new(herm, c(1.0), false));
        let scaled = factory.scale(&registry, &poly, c(2.0));
        assert!(scaled.is_monomial());
        assert_eq!(scaled.terms()[0].factor, c(2.0));
    }

    #[test]
    fn canonical_cmp_ignores_input_term_order() {
        let (registry, herm, general) = registry_with_symbols();
        let factory = PolynomialFactory::default();
        let forward = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(herm, c(1.0), false),
                Monomial::new(general, c(2.0), false),
            ],
        );
        let backward = factory.canonicalize(
            &registry,
            vec![
                Monomial::new(general, c(2.0), false),
                Monomial::new(herm, c(1.0), false),
            ],
        );
        assert_eq!(forward.canonical_cmp(&backward), Ordering::Equal);
    }

    #[test]
    fn conjugate_toggles_flag_on_general_symbol() {
        let (registry, _, general) = registry_with_symbols();
        let poly = Polynomial::from_monomial(Monomial::new(general, Complex64::new(1.0, 2.0), false));
        let conj = poly.conjugate(&registry);
        assert!(conj.terms()[0].conjugated);
        assert_eq!(conj.terms()[0].factor, Complex64::new(1.0, -2.0));
    }
}
