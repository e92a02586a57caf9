//! Cross-time sufficient statistic — a running sum of weighted outer products.
//!
//! Purpose
//! -------
//! Accumulate
//!
//! ```text
//! XfXp = Σ_t Σ_{k,j} Wxx_t[k, j] · x_{t+1}^{(k)} (x_t^{(j)})ᵀ
//! ```
//!
//! across all steps of a backward pass. This is a **sum**, never a mean:
//! consumers that need `E[x_{t+1} x_tᵀ]` averaged over time divide by the
//! number of transitions themselves.
//!
//! Key behaviors
//! -------------
//! - [`CrossMoment::add`] adds an arbitrary `S×S` term.
//! - [`CrossMoment::add_weighted_outer`] adds the whole per-step double sum
//!   as one batched product `X_{t+1} · Wxx · X_tᵀ`.
//! - [`CrossMoment::total`] / [`CrossMoment::into_total`] read the result.
//!
//! Invariants & assumptions
//! ------------------------
//! - The accumulator is owned by exactly one backward pass.
//! - Weights passed to `add_weighted_outer` are linear-scale joint weights.
use crate::smoothing::errors::{SmoothError, SmoothResult};
use ndarray::{Array2, ArrayView2};

/// CrossMoment — `S×S` running sum, created at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMoment {
    total: Array2<f64>,
}

impl CrossMoment {
    /// A zero accumulator for state dimension `s`.
    pub fn new(s: usize) -> Self {
        CrossMoment { total: Array2::zeros((s, s)) }
    }

    /// Add an `S×S` term.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::AccumulatorShapeMismatch` if `term` is not `S×S`.
    pub fn add(&mut self, term: ArrayView2<'_, f64>) -> SmoothResult<()> {
        if term.dim() != self.total.dim() {
            return Err(SmoothError::AccumulatorShapeMismatch {
                expected: self.total.dim(),
                actual: term.dim(),
            });
        }
        self.total += &term;
        Ok(())
    }

    /// Add `Σ_{k,j} w[k, j] · next[:, k] · prev[:, j]ᵀ`.
    ///
    /// Parameters
    /// ----------
    /// - `next`: `S×N_next` particle states at `t+1`.
    /// - `joint`: `N_next×N_prev` linear joint weights.
    /// - `prev`: `S×N_prev` particle states at `t`.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::AccumulatorShapeMismatch` if the product is not `S×S`.
    ///
    /// Panics
    /// ------
    /// - If the inner dimensions of the product disagree.
    pub fn add_weighted_outer(
        &mut self, next: ArrayView2<'_, f64>, joint: ArrayView2<'_, f64>,
        prev: ArrayView2<'_, f64>,
    ) -> SmoothResult<()> {
        let term = next.dot(&joint).dot(&prev.t());
        self.add(term.view())
    }

    /// Current total.
    pub fn total(&self) -> ArrayView2<'_, f64> {
        self.total.view()
    }

    /// Consume the accumulator and return the total.
    pub fn into_total(self) -> Array2<f64> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Zero initialization and plain summation (no averaging).
    // - Agreement of the batched product with the explicit double sum.
    // - Shape errors on `add`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The accumulator sums; it never divides by the number of terms.
    //
    // Given
    // -----
    // - Two identical 2×2 terms.
    //
    // Expect
    // ------
    // - The total is exactly twice the term.
    fn add_is_a_plain_sum() {
        let mut acc = CrossMoment::new(2);
        assert_eq!(acc.total(), Array2::<f64>::zeros((2, 2)));

        let term = array![[1.0, 2.0], [3.0, 4.0]];
        acc.add(term.view()).unwrap();
        acc.add(term.view()).unwrap();

        assert_eq!(acc.into_total(), 2.0 * &term);
    }

    #[test]
    // Purpose
    // -------
    // The batched product equals the explicit double sum of outer products.
    //
    // Given
    // -----
    // - S=2, N=2 particle slices and a non-symmetric joint weight matrix.
    //
    // Expect
    // ------
    // - Entries agree to 1e-14.
    fn add_weighted_outer_matches_explicit_double_sum() {
        let next = array![[1.0, -0.5], [2.0, 0.25]];
        let prev = array![[0.5, 1.5], [-1.0, 3.0]];
        let joint = array![[0.1, 0.2], [0.3, 0.4]];

        let mut acc = CrossMoment::new(2);
        acc.add_weighted_outer(next.view(), joint.view(), prev.view()).unwrap();

        let mut expected = Array2::<f64>::zeros((2, 2));
        for k in 0..2 {
            for j in 0..2 {
                for a in 0..2 {
                    for b in 0..2 {
                        expected[[a, b]] += joint[[k, j]] * next[[a, k]] * prev[[b, j]];
                    }
                }
            }
        }
        for a in 0..2 {
            for b in 0..2 {
                assert_relative_eq!(acc.total()[[a, b]], expected[[a, b]], epsilon = 1e-14);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Wrongly shaped terms are shape errors and leave the total untouched.
    fn add_rejects_wrong_shape() {
        let mut acc = CrossMoment::new(2);
        let err = acc.add(Array2::<f64>::ones((3, 3)).view()).unwrap_err();

        assert_eq!(err, SmoothError::AccumulatorShapeMismatch { expected: (2, 2), actual: (3, 3) });
        assert_eq!(acc.total(), Array2::<f64>::zeros((2, 2)));
    }
}
