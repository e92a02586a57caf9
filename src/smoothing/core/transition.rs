//! Pairwise transition scoring between consecutive particle clouds.
//!
//! Purpose
//! -------
//! For a time step `t`, evaluate the linear-Gaussian transition density of
//! every particle `k` at `t+1` given every particle `j` at `t`:
//!
//! ```text
//! ln P[k, j] = −½ ‖V[:, k, t+1] − M[:, j, t]‖² − logZ
//! ```
//!
//! in whitened coordinates, returned either as `P` (linear domain) or
//! `ln P` (log domain). This is the dominant cost of smoothing:
//! `O(S·N²)` per step.
//!
//! Key behaviors
//! -------------
//! - [`pairwise_log_density`] fills an `N×N` matrix by explicit pairwise
//!   evaluation over index pairs; nothing is replicated or tiled.
//! - [`TransitionScorer`] binds whitened particles and `logZ` and scores a
//!   given step in the domain chosen by a [`WeightAlgebra`] type parameter.
//! - With the `parallel` feature, entries are evaluated through `ndarray`'s
//!   rayon integration. Each entry is computed independently, so results
//!   are bit-identical to the sequential path.
//!
//! Conventions
//! -----------
//! - Output rows index the particle at `t+1` (`k`); columns index the
//!   particle at `t` (`j`).
use crate::smoothing::core::{domain::WeightAlgebra, whitening::WhitenedParticles};
use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Fill an `N_next × N_prev` matrix with `ln p(x_next^{(k)} | x_prev^{(j)})`.
///
/// Parameters
/// ----------
/// - `values_next`: `ArrayView2<f64>`
///   `S×N_next` whitened states at `t+1`.
/// - `predicted`: `ArrayView2<f64>`
///   `S×N_prev` whitened predicted means from particles at `t`.
/// - `log_norm`: `f64`
///   Gaussian log-normalizer `logZ`.
///
/// Panics
/// ------
/// - If the two views disagree on `S`.
pub fn pairwise_log_density(
    values_next: ArrayView2<'_, f64>, predicted: ArrayView2<'_, f64>, log_norm: f64,
) -> Array2<f64> {
    score_into(values_next, predicted, log_norm, |lp| lp)
}

/// TransitionScorer — per-step pairwise density evaluation.
#[derive(Debug, Clone, Copy)]
pub struct TransitionScorer<'a> {
    whitened: &'a WhitenedParticles,
    log_norm: f64,
}

impl<'a> TransitionScorer<'a> {
    /// Bind whitened particles and the log-normalizer.
    pub fn new(whitened: &'a WhitenedParticles, log_norm: f64) -> Self {
        TransitionScorer { whitened, log_norm }
    }

    /// `N×N` transition scores between `t+1` (rows) and `t` (columns) in the
    /// domain of `W`.
    ///
    /// Panics if `t + 1` is out of range.
    pub fn score<W: WeightAlgebra>(&self, t: usize) -> Array2<f64> {
        let values_next = self.whitened.values.index_axis(Axis(2), t + 1);
        let predicted = self.whitened.predicted.index_axis(Axis(2), t);
        score_into(values_next, predicted, self.log_norm, W::from_log_density)
    }
}

// ---- Helper methods ----

fn score_into<F>(
    values_next: ArrayView2<'_, f64>, predicted: ArrayView2<'_, f64>, log_norm: f64, map: F,
) -> Array2<f64>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    assert_eq!(values_next.nrows(), predicted.nrows(), "state dimension mismatch");
    let n_next = values_next.ncols();
    let n_prev = predicted.ncols();
    let mut out = Array2::<f64>::zeros((n_next, n_prev));

    let eval = |(k, j): (usize, usize), o: &mut f64| {
        let v = values_next.column(k);
        let m = predicted.column(j);
        let d2: f64 = v.iter().zip(m.iter()).map(|(a, b)| (a - b) * (a - b)).sum();
        *o = map(-0.5 * d2 - log_norm);
    };

    #[cfg(feature = "parallel")]
    Zip::indexed(&mut out).par_for_each(eval);
    #[cfg(not(feature = "parallel"))]
    Zip::indexed(&mut out).for_each(eval);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::core::{
        domain::{Linear, LogSpace},
        params::LdsParams,
        whitening::Whitener,
    };
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use ndarray::{Array3, array};
    use statrs::distribution::{Continuous, MultivariateNormal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of whitened pairwise log-densities with an independent
    //   multivariate normal implementation (`statrs`).
    // - Equivalence of the linear and log scoring domains.
    // - Output orientation (rows = t+1, columns = t).
    // -------------------------------------------------------------------------

    fn two_state_setup() -> (LdsParams, Array3<f64>) {
        let params = LdsParams::new(
            array![[0.9, 0.2], [-0.1, 0.7]],
            array![[0.5, 0.1], [0.1, 0.3]],
            array![0.1, -0.2],
        )
        .unwrap();
        // S=2, N=3, T=2.
        let states = Array3::from_shape_fn((2, 3, 2), |(s, n, t)| {
            0.3 * (s as f64) - 0.4 * (n as f64) + 0.25 * (t as f64) + 0.1 * ((s * n) as f64)
        });
        (params, states)
    }

    #[test]
    // Purpose
    // -------
    // Whitened squared distances reproduce the Gaussian transition density.
    //
    // Given
    // -----
    // - A correlated 2-state model and a 3-particle, 2-step tensor.
    //
    // Expect
    // ------
    // - `L[k, j] == ln N(x_1^{(k)}; A x_0^{(j)} + μ, Σ)` to 1e-10 for all
    //   pairs.
    fn log_scores_match_multivariate_normal_ln_pdf() {
        let (params, states) = two_state_setup();
        let w = Whitener::new(&params).unwrap();
        let whitened = w.whiten(states.view());
        let scorer = TransitionScorer::new(&whitened, w.log_norm());

        let scores = scorer.score::<LogSpace>(0);

        let cov: Vec<f64> = params.noise_cov.t().iter().copied().collect();
        for j in 0..3 {
            let x_prev = states.index_axis(Axis(2), 0).column(j).to_owned();
            let mean = params.transition.dot(&x_prev) + &params.offset;
            let mvn = MultivariateNormal::new(mean.to_vec(), cov.clone()).unwrap();
            for k in 0..3 {
                let x_next = states.index_axis(Axis(2), 1).column(k).to_owned();
                let expected = mvn.ln_pdf(&DVector::from_vec(x_next.to_vec()));
                assert_relative_eq!(scores[[k, j]], expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Linear scores are the exponential of log scores.
    fn linear_scores_are_exp_of_log_scores() {
        let (params, states) = two_state_setup();
        let w = Whitener::new(&params).unwrap();
        let whitened = w.whiten(states.view());
        let scorer = TransitionScorer::new(&whitened, w.log_norm());

        let lin = scorer.score::<Linear>(0);
        let log = scorer.score::<LogSpace>(0);

        Zip::from(&lin).and(&log).for_each(|&p, &lp| {
            assert_relative_eq!(p, lp.exp(), max_relative = 1e-14);
        });
    }

    #[test]
    // Purpose
    // -------
    // Rows index the next particle and columns the previous one.
    //
    // Given
    // -----
    // - Whitened next values `[0, 10]` and predicted means `[0, 10, 5]`,
    //   `logZ = 0`.
    //
    // Expect
    // ------
    // - A `2×3` matrix with `−½ (v_k − m_j)²` at `(k, j)`.
    fn scores_are_oriented_next_by_prev() {
        let values_next = array![[0.0, 10.0]];
        let predicted = array![[0.0, 10.0, 5.0]];
        let out = pairwise_log_density(values_next.view(), predicted.view(), 0.0);

        assert_eq!(out.dim(), (2, 3));
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 1]], 0.0);
        assert_relative_eq!(out[[0, 1]], -50.0);
        assert_relative_eq!(out[[1, 2]], -12.5);
    }
}
