//! # Algebraic Context
//!
//! The collaborator that supplies operator-sequence algebra to the builders:
//! the operator-sequence generating set (OSG) per hierarchy level, word
//! multiplication, conjugation and simplification.
//!
//! # Extension Point
//!
//! Scenario-specific algebras (commuting variables, involutive rules,
//! symmetry quotients) implement [`Context`] outside this crate. The shipped
//! [`FreeContext`] is the free algebra over Hermitian generators, sufficient
//! for the builders and the test suite.

use crate::symbols::OperatorSequence;

// =============================================================================
// CONTEXT TRAIT
// =============================================================================

/// Operator-sequence algebra consumed by the matrix builders.
///
/// Implementations must be pure: the same inputs always produce the same
/// words, so that matrix construction stays deterministic.
pub trait Context: Send + Sync + std::fmt::Debug {
    /// Number of generating operators.
    fn operator_count(&self) -> usize;

    /// Size of the operator-sequence generating set for a level.
    ///
    /// Must equal `generate_osg(level).len()`.
    fn osg_size(&self, level: usize) -> usize;

    /// All words of length at most `level`, in graded lexicographic order,
    /// starting with the identity word.
    fn generate_osg(&self, level: usize) -> Vec<OperatorSequence>;

    /// Concatenating product of two words, simplified.
    fn multiply(&self, lhs: &OperatorSequence, rhs: &OperatorSequence) -> OperatorSequence;

    /// Conjugate (adjoint) of a word.
    fn conjugate(&self, word: &OperatorSequence) -> OperatorSequence;

    /// Rewrite a word into its simplest equivalent form.
    ///
    /// The free algebra has nothing to rewrite; contexts with relations
    /// override this.
    fn simplify(&self, word: OperatorSequence) -> OperatorSequence {
        word
    }
}

// =============================================================================
// FREE CONTEXT
// =============================================================================

/// Free algebra over `n` Hermitian generators.
///
/// No relations hold between generators; conjugation reverses a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeContext {
    operators: usize,
}

impl FreeContext {
    /// Create a free context over the given number of generators.
    #[must_use]
    pub const fn new(operators: usize) -> Self {
        Self { operators }
    }
}

impl Context for FreeContext {
    fn operator_count(&self) -> usize {
        self.operators
    }

    fn osg_size(&self, level: usize) -> usize {
        // 1 + n + n^2 + ... + n^level, saturating on overflow.
        let mut total: usize = 0;
        let mut power: usize = 1;
        for _ in 0..=level {
            total = total.saturating_add(power);
            power = power.saturating_mul(self.operators);
        }
        total
    }

    fn generate_osg(&self, level: usize) -> Vec<OperatorSequence> {
        let mut words = vec![OperatorSequence::identity()];
        let mut frontier = vec![OperatorSequence::identity()];
        for _ in 0..level {
            let mut next = Vec::with_capacity(frontier.len() * self.operators);
            for word in &frontier {
                for op in 0..self.operators as u64 {
                    let mut ops = word.ops().to_vec();
                    ops.push(op);
                    next.push(OperatorSequence::new(ops));
                }
            }
            words.extend(next.iter().cloned());
            frontier = next;
        }
        words
    }

    fn multiply(&self, lhs: &OperatorSequence, rhs: &OperatorSequence) -> OperatorSequence {
        let mut ops = Vec::with_capacity(lhs.len() + rhs.len());
        ops.extend_from_slice(lhs.ops());
        ops.extend_from_slice(rhs.ops());
        OperatorSequence::new(ops)
    }

    fn conjugate(&self, word: &OperatorSequence) -> OperatorSequence {
        let mut ops = word.ops().to_vec();
        ops.reverse();
        OperatorSequence::new(ops)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osg_level_zero_is_identity_only() {
        let context = FreeContext::new(2);
        let osg = context.generate_osg(0);
        assert_eq!(osg, vec![OperatorSequence::identity()]);
        assert_eq!(context.osg_size(0), 1);
    }

    #[test]
    fn osg_size_matches_generated_set() {
        let context = FreeContext::new(2);
        for level in 0..4 {
            assert_eq!(context.osg_size(level), context.generate_osg(level).len());
        }
        // 1 + 2 + 4 = 7 words at level 2 over two generators.
        assert_eq!(context.osg_size(2), 7);
    }

    #[test]
    fn osg_is_graded() {
        let context = FreeContext::new(2);
        let osg = context.generate_osg(2);
        let lengths: Vec<usize> = osg.iter().map(OperatorSequence::len).collect();
        let mut sorted = lengths.clone();
        sorted.sort_unstable();
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn multiply_concatenates() {
        let context = FreeContext::new(3);
        let lhs = OperatorSequence::new(vec![0, 1]);
        let rhs = OperatorSequence::new(vec![2]);
        assert_eq!(
            context.multiply(&lhs, &rhs),
            OperatorSequence::new(vec![0, 1, 2])
        );
    }

    #[test]
    fn conjugate_reverses_word() {
        let context = FreeContext::new(3);
        let word = OperatorSequence::new(vec![0, 1, 2]);
        assert_eq!(
            context.conjugate(&word),
            OperatorSequence::new(vec![2, 1, 0])
        );
        // Involution.
        assert_eq!(context.conjugate(&context.conjugate(&word)), word);
    }

    #[test]
    fn single_generator_context_degenerates_gracefully() {
        let context = FreeContext::new(1);
        assert_eq!(context.osg_size(3), 4);
        let osg = context.generate_osg(3);
        assert_eq!(osg.len(), 4);
    }
}
