//! # Matrix Builders
//!
//! The four construction strategies behind the per-kind caches:
//!
//! - [`MomentBuilder`]: top-level: a fresh matrix straight from the
//!   algebraic context, no cache dependencies;
//! - [`LocalizingBuilder`]: parameterized: same shape, with the localizing
//!   word carried by the index;
//! - [`PolynomialBuilder`]: composite: decomposes the index's polynomial
//!   into weighted monomial terms, recursively creates each term's
//!   localizing constituent through the same exclusive capability, then
//!   assembles the weighted sum;
//! - [`SubstitutedBuilder`]: derived: applies a registered transform to a
//!   stored source matrix.
//!
//! The moment and localizing builders share one product-table fill, whose
//! fan-out is governed by the caller's [`Concurrency`] hint: word products
//! are computed in parallel once the shape is fixed, while symbol interning
//! stays serial (it mutates the registry).

use num_complex::Complex64;
use rayon::prelude::*;
use std::sync::Arc;

use crate::cache::{Concurrency, MatrixBuilder, MatrixCache};
use crate::composite::{self, ConstituentInfo};
use crate::errors::SymmatError;
use crate::index::{MomentIndex, PolyIndex, SubstitutedIndex, WordIndex};
use crate::matrix::{MatrixKind, SymbolicMatrix};
use crate::poly::{Monomial, Polynomial};
use crate::symbols::OperatorSequence;
use crate::system::SystemCore;

// =============================================================================
// SHARED PRODUCT-TABLE FILL
// =============================================================================

/// Build the matrix of interned products `conj(w_i) * middle * w_j` over the
/// level's operator-sequence generating set.
fn fill_product_matrix(
    core: &mut SystemCore,
    level: usize,
    middle: Option<&OperatorSequence>,
    hint: Concurrency,
) -> Result<SymbolicMatrix, SymmatError> {
    let context = Arc::clone(core.context());
    let osg = context.generate_osg(level);
    let dimension = osg.len();
    let conjugates: Vec<OperatorSequence> =
        osg.iter().map(|word| context.conjugate(word)).collect();

    let product = |row: usize, col: usize| -> (OperatorSequence, OperatorSequence) {
        let left = match middle {
            Some(word) => context.multiply(&conjugates[row], word),
            None => conjugates[row].clone(),
        };
        let sequence = context.simplify(context.multiply(&left, &osg[col]));
        let conjugate = context.simplify(context.conjugate(&sequence));
        (sequence, conjugate)
    };

    // Word products have no shared state; interning below mutates the
    // registry and stays serial.
    let cell_count = dimension * dimension;
    let products: Vec<(OperatorSequence, OperatorSequence)> =
        if hint.should_parallelize(dimension) {
            (0..cell_count)
                .into_par_iter()
                .map(|pos| product(pos / dimension, pos % dimension))
                .collect()
        } else {
            (0..cell_count)
                .map(|pos| product(pos / dimension, pos % dimension))
                .collect()
        };

    let one = Complex64::new(1.0, 0.0);
    let registry = core.symbols_mut();
    let cells: Vec<Polynomial> = products
        .into_iter()
        .map(|(sequence, conjugate)| {
            let expr = registry.intern(sequence, conjugate);
            Polynomial::from_monomial(Monomial::new(expr.id, one, expr.conjugated))
        })
        .collect();

    SymbolicMatrix::from_cells(dimension, cells, core.symbols())
}

// =============================================================================
// MOMENT BUILDER (top-level)
// =============================================================================

/// Builds the moment matrix of a hierarchy level.
#[derive(Debug)]
pub struct MomentBuilder;

impl MatrixBuilder for MomentBuilder {
    type Index = MomentIndex;
    const KIND: MatrixKind = MatrixKind::Moment;

    fn cache(core: &mut SystemCore) -> &mut MatrixCache<Self> {
        &mut core.moment_cache
    }

    fn cache_ref(core: &SystemCore) -> &MatrixCache<Self> {
        &core.moment_cache
    }

    fn build(
        core: &mut SystemCore,
        index: &MomentIndex,
        hint: Concurrency,
    ) -> Result<SymbolicMatrix, SymmatError> {
        fill_product_matrix(core, index.level, None, hint)
    }

    fn missing(index: &MomentIndex) -> String {
        format!("moment matrix for {index} has not been generated")
    }
}

// =============================================================================
// LOCALIZING BUILDER (parameterized)
// =============================================================================

/// Builds the localizing matrix of a level and operator word.
#[derive(Debug)]
pub struct LocalizingBuilder;

impl MatrixBuilder for LocalizingBuilder {
    type Index = WordIndex;
    const KIND: MatrixKind = MatrixKind::Localizing;

    fn cache(core: &mut SystemCore) -> &mut MatrixCache<Self> {
        &mut core.localizing_cache
    }

    fn cache_ref(core: &SystemCore) -> &MatrixCache<Self> {
        &core.localizing_cache
    }

    fn build(
        core: &mut SystemCore,
        index: &WordIndex,
        hint: Concurrency,
    ) -> Result<SymbolicMatrix, SymmatError> {
        fill_product_matrix(core, index.level, Some(&index.word), hint)
    }

    fn missing(index: &WordIndex) -> String {
        format!("localizing matrix for {index} has not been generated")
    }
}

// =============================================================================
// POLYNOMIAL BUILDER (composite)
// =============================================================================

/// Builds a composite matrix as the weighted sum of the localizing matrices
/// of the index polynomial's monomial terms.
#[derive(Debug)]
pub struct PolynomialBuilder;

impl MatrixBuilder for PolynomialBuilder {
    type Index = PolyIndex;
    const KIND: MatrixKind = MatrixKind::Polynomial;

    fn cache(core: &mut SystemCore) -> &mut MatrixCache<Self> {
        &mut core.polynomial_cache
    }

    fn cache_ref(core: &SystemCore) -> &MatrixCache<Self> {
        &core.polynomial_cache
    }

    fn build(
        core: &mut SystemCore,
        index: &PolyIndex,
        hint: Concurrency,
    ) -> Result<SymbolicMatrix, SymmatError> {
        let context = Arc::clone(core.context());
        let dimension = context.osg_size(index.level);
        let mut info = ConstituentInfo::new(dimension);

        // Each recursive create is independently durable: a failure here
        // leaves already-built constituents correctly cached.
        for term in index.poly.terms().to_vec() {
            let sequence = core.symbols().sequence(term.symbol)?.clone();
            let word = if term.conjugated {
                context.conjugate(&sequence)
            } else {
                sequence
            };
            let (_, matrix) = MatrixCache::<LocalizingBuilder>::create(
                core,
                WordIndex {
                    level: index.level,
                    word,
                },
                hint,
            )?;
            info.push(matrix, term.factor);
        }

        composite::assemble(&info, core.symbols(), core.factory())
    }

    fn missing(index: &PolyIndex) -> String {
        format!("polynomial matrix for {index} has not been generated")
    }
}

// =============================================================================
// SUBSTITUTED BUILDER (derived)
// =============================================================================

/// Builds a derived matrix by applying a registered transform to a stored
/// source matrix.
#[derive(Debug)]
pub struct SubstitutedBuilder;

impl MatrixBuilder for SubstitutedBuilder {
    type Index = SubstitutedIndex;
    const KIND: MatrixKind = MatrixKind::Substituted;

    fn cache(core: &mut SystemCore) -> &mut MatrixCache<Self> {
        &mut core.substituted_cache
    }

    fn cache_ref(core: &SystemCore) -> &MatrixCache<Self> {
        &core.substituted_cache
    }

    fn build(
        core: &mut SystemCore,
        index: &SubstitutedIndex,
        _hint: Concurrency,
    ) -> Result<SymbolicMatrix, SymmatError> {
        let source = core
            .store()
            .get(index.source)
            .map(|entry| Arc::clone(entry.matrix()))
            .ok_or(SymmatError::UnknownSource(index.source))?;
        let transform = core
            .transform(index.transform)
            .cloned()
            .ok_or(SymmatError::UnknownTransform(index.transform))?;

        if !transform.accepts(&source) {
            return Err(SymmatError::UnsupportedSource {
                offset: index.source,
                transform: transform.name().to_string(),
            });
        }

        transform.apply(&source, core.symbols(), core.factory())
    }

    fn missing(index: &SubstitutedIndex) -> String {
        format!("substituted matrix for {index} has not been generated")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FreeContext;
    use crate::index::Offset;
    use crate::poly::PolynomialFactory;
    use crate::symbols::SymbolId;
    use crate::transforms::SubstitutionRules;

    fn core_with_operators(operators: usize) -> SystemCore {
        SystemCore::new(
            Arc::new(FreeContext::new(operators)),
            PolynomialFactory::default(),
        )
    }

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn moment_matrix_level_one_has_osg_dimension() {
        let mut core = core_with_operators(2);
        let (offset, matrix) = MatrixCache::<MomentBuilder>::create(
            &mut core,
            MomentIndex { level: 1 },
            Concurrency::Never,
        )
        .expect("create");

        assert_eq!(offset, Offset::new(0));
        // OSG at level 1 over two generators: e, X0, X1.
        assert_eq!(matrix.dimension(), 3);
        assert!(matrix.is_monomial());
        // Cell (0,0) is conj(e)*e = identity.
        let cell = matrix.get(0, 0).expect("cell");
        assert_eq!(cell.terms()[0].symbol, SymbolId::IDENTITY);
    }

    #[test]
    fn moment_matrix_is_hermitian() {
        let mut core = core_with_operators(2);
        let (_, matrix) = MatrixCache::<MomentBuilder>::create(
            &mut core,
            MomentIndex { level: 1 },
            Concurrency::Never,
        )
        .expect("create");
        assert!(matrix.is_hermitian());
    }

    #[test]
    fn parallel_and_serial_fill_agree() {
        let mut serial_core = core_with_operators(2);
        let mut parallel_core = core_with_operators(2);
        let (_, serial) = MatrixCache::<MomentBuilder>::create(
            &mut serial_core,
            MomentIndex { level: 2 },
            Concurrency::Never,
        )
        .expect("create");
        let (_, parallel) = MatrixCache::<MomentBuilder>::create(
            &mut parallel_core,
            MomentIndex { level: 2 },
            Concurrency::Always,
        )
        .expect("create");
        assert_eq!(serial.as_ref(), parallel.as_ref());
    }

    #[test]
    fn localizing_matrix_shifts_products_by_word() {
        let mut core = core_with_operators(2);
        let (_, matrix) = MatrixCache::<LocalizingBuilder>::create(
            &mut core,
            WordIndex {
                level: 1,
                word: OperatorSequence::new(vec![0]),
            },
            Concurrency::Never,
        )
        .expect("create");

        assert_eq!(matrix.dimension(), 3);
        // Cell (0,0) is conj(e)*X0*e = X0, not the identity.
        let cell = matrix.get(0, 0).expect("cell");
        assert_ne!(cell.terms()[0].symbol, SymbolId::IDENTITY);
    }

    #[test]
    fn polynomial_builder_recurses_into_localizing_cache() {
        let mut core = core_with_operators(2);

        // Intern X0 and X1 so the polynomial can reference them.
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

        let poly = core.factory().canonicalize(
            core.symbols(),
            vec![
                Monomial::new(x0, c(1.0), false),
                Monomial::new(x1, c(-1.0), false),
            ],
        );
        let (_, matrix) = MatrixCache::<PolynomialBuilder>::create(
            &mut core,
            PolyIndex { level: 1, poly },
            Concurrency::Never,
        )
        .expect("create");

        assert_eq!(matrix.dimension(), 3);
        // Both localizing constituents are now cached.
        assert_eq!(core.localizing_cache.len(), 2);
        // Cell (0,0) = x0 - x1.
        let cell = matrix.get(0, 0).expect("cell");
        assert_eq!(cell.terms().len(), 2);
    }

    #[test]
    fn substituted_builder_requires_known_source_and_transform() {
        let mut core = core_with_operators(1);
        let missing_source = MatrixCache::<SubstitutedBuilder>::create(
            &mut core,
            SubstitutedIndex {
                source: Offset::new(7),
                transform: crate::index::TransformId(0),
            },
            Concurrency::Never,
        );
        assert!(matches!(
            missing_source,
            Err(SymmatError::UnknownSource(_))
        ));

        let (offset, _) = MatrixCache::<MomentBuilder>::create(
            &mut core,
            MomentIndex { level: 1 },
            Concurrency::Never,
        )
        .expect("create");
        let missing_transform = MatrixCache::<SubstitutedBuilder>::create(
            &mut core,
            SubstitutedIndex {
                source: offset,
                transform: crate::index::TransformId(3),
            },
            Concurrency::Never,
        );
        assert!(matches!(
            missing_transform,
            Err(SymmatError::UnknownTransform(_))
        ));
        // Failed builds never append.
        assert_eq!(core.store().len(), 1);
    }

    #[test]
    fn substituted_builder_applies_transform() {
        let mut core = core_with_operators(1);
        let (source, matrix) = MatrixCache::<MomentBuilder>::create(
            &mut core,
            MomentIndex { level: 1 },
            Concurrency::Never,
        )
        .expect("create");

        // Rewrite the (0,1) cell's symbol to zero everywhere it occurs.
        let doomed = matrix.get(0, 1).expect("cell").terms()[0].symbol;
        let mut rules = SubstitutionRules::new();
        rules.add_rule(doomed, Polynomial::zero());
        let transform = core.register_transform(Arc::new(rules));

        let (_, derived) = MatrixCache::<SubstitutedBuilder>::create(
            &mut core,
            SubstitutedIndex { source, transform },
            Concurrency::Never,
        )
        .expect("create");
        assert!(derived.get(0, 1).expect("cell").is_empty());
    }
}
