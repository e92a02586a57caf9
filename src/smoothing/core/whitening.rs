//! Gaussian residual whitening — `Σ = L·Lᵀ`, then work in `L⁻¹` coordinates.
//!
//! Purpose
//! -------
//! Front-load the only matrix factorization of a smoothing call. With the
//! Cholesky factor `L` of the process noise covariance, the transition
//! log-density becomes
//!
//! ```text
//! ln p(x' | x) = −½ ‖L⁻¹x' − L⁻¹(A·x + μ)‖² − logZ,
//! logZ         = (S/2)·ln(2π) + Σᵢ ln Lᵢᵢ,
//! ```
//!
//! so the pairwise scorer only needs squared distances between whitened
//! particle values `V = L⁻¹X` and whitened predicted means
//! `M = L⁻¹(A·X + μ)`.
//!
//! Key behaviors
//! -------------
//! - [`Whitener::new`] checks symmetry of `Σ`, factors it with `nalgebra`'s
//!   Cholesky, and precomputes `L⁻¹`, `L⁻¹A`, `L⁻¹μ` and `logZ`.
//! - [`Whitener::whiten`] maps a full `S×N×T` particle tensor into a
//!   [`WhitenedParticles`] pair in one pass over time slices.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Σ` is symmetric within a relative [`SYMMETRY_TOL`] and positive
//!   definite; otherwise construction fails with a numerical error.
//! - Whitened tensors share the `[state, particle, time]` layout of the
//!   input.
//!
//! Conventions
//! -----------
//! - Parameters arrive as `ndarray` arrays and are copied into `DMatrix`
//!   only for the factorization; results are copied back so the rest of the
//!   crate stays on `ndarray`.
use crate::{
    numerical_stability::{LN_2PI, SYMMETRY_TOL},
    smoothing::{
        core::params::LdsParams,
        errors::{SmoothError, SmoothResult},
    },
};
use nalgebra::{Cholesky, DMatrix};
use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};

/// Whitened particle values and predicted means.
///
/// Fields
/// ------
/// - `values`: `Array3<f64>`
///   `V[:, k, t] = L⁻¹ x_t^{(k)}`.
/// - `predicted`: `Array3<f64>`
///   `M[:, j, t] = L⁻¹ (A x_t^{(j)} + μ)`, the whitened mean of the
///   transition out of particle `j` at time `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhitenedParticles {
    /// Whitened states `V`.
    pub values: Array3<f64>,
    /// Whitened predicted means `M`.
    pub predicted: Array3<f64>,
}

/// Whitener — Cholesky-based change of coordinates for one parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Whitener {
    l_inv: Array2<f64>,
    l_inv_transition: Array2<f64>,
    l_inv_offset: Array1<f64>,
    log_norm: f64,
}

impl Whitener {
    /// Factor `Σ` and precompute the whitened transition.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::NonSymmetricCovariance` if `|Σᵢⱼ − Σⱼᵢ|` exceeds
    ///   `SYMMETRY_TOL · max(1, |Σᵢⱼ|, |Σⱼᵢ|)`.
    /// - `SmoothError::NotPositiveDefinite` if the Cholesky factorization
    ///   fails.
    pub fn new(params: &LdsParams) -> SmoothResult<Self> {
        let s = params.state_dim();
        check_symmetric(params.noise_cov.view())?;

        let mut sigma = DMatrix::<f64>::zeros(s, s);
        fill_dmatrix(params.noise_cov.view(), &mut sigma);
        let chol = Cholesky::new(sigma).ok_or(SmoothError::NotPositiveDefinite)?;
        let l = chol.l();

        let log_norm = 0.5 * (s as f64) * LN_2PI + l.diagonal().iter().map(|d| d.ln()).sum::<f64>();
        if !log_norm.is_finite() {
            return Err(SmoothError::NotPositiveDefinite);
        }

        let l_inv_nalg = l
            .solve_lower_triangular(&DMatrix::<f64>::identity(s, s))
            .ok_or(SmoothError::NotPositiveDefinite)?;
        let l_inv = Array2::from_shape_fn((s, s), |(i, j)| l_inv_nalg[(i, j)]);

        let l_inv_transition = l_inv.dot(&params.transition);
        let l_inv_offset = l_inv.dot(&params.offset);

        Ok(Whitener { l_inv, l_inv_transition, l_inv_offset, log_norm })
    }

    /// Gaussian log-normalizer `logZ = (S/2)·ln(2π) + Σ ln Lᵢᵢ`.
    pub fn log_norm(&self) -> f64 {
        self.log_norm
    }

    /// `L⁻¹` as an `S×S` lower-triangular matrix.
    pub fn l_inv(&self) -> ArrayView2<'_, f64> {
        self.l_inv.view()
    }

    /// Whitened states `L⁻¹·X_t` for an `S×N` slice.
    pub fn whiten_states(&self, x_t: ArrayView2<'_, f64>) -> Array2<f64> {
        self.l_inv.dot(&x_t)
    }

    /// Whitened predicted means `L⁻¹·(A·X_t + μ)` for an `S×N` slice.
    pub fn whiten_predicted(&self, x_t: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut m = self.l_inv_transition.dot(&x_t);
        m += &self.l_inv_offset.view().insert_axis(Axis(1));
        m
    }

    /// Whiten a full `S×N×T` particle tensor.
    ///
    /// Predicted means at the last time step are computed for layout
    /// symmetry even though the backward pass never reads them.
    pub fn whiten(&self, states: ArrayView3<'_, f64>) -> WhitenedParticles {
        let mut values = Array3::<f64>::zeros(states.raw_dim());
        let mut predicted = Array3::<f64>::zeros(states.raw_dim());
        for (t, x_t) in states.axis_iter(Axis(2)).enumerate() {
            values.index_axis_mut(Axis(2), t).assign(&self.whiten_states(x_t));
            predicted.index_axis_mut(Axis(2), t).assign(&self.whiten_predicted(x_t));
        }
        WhitenedParticles { values, predicted }
    }
}

// ---- Helper methods ----

/// Copy an `ndarray` matrix into a preallocated `nalgebra::DMatrix` of the
/// same shape, column by column to match `DMatrix`'s storage order.
fn fill_dmatrix(src: ArrayView2<'_, f64>, dst: &mut DMatrix<f64>) {
    for j in 0..src.ncols() {
        for i in 0..src.nrows() {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

fn check_symmetric(m: ArrayView2<'_, f64>) -> SmoothResult<()> {
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (m[[i, j]], m[[j, i]]);
            let diff = (a - b).abs();
            if diff > SYMMETRY_TOL * 1.0_f64.max(a.abs()).max(b.abs()) {
                return Err(SmoothError::NonSymmetricCovariance { row: i, col: j, diff });
            }
        }
    }
    Ok(())
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
    // - `L⁻¹ Σ L⁻ᵀ = I` for a correlated 2×2 covariance.
    // - `logZ` for identity and scaled-identity covariances.
    // - Whitened predicted means on a hand-computable scalar model.
    // - Symmetry and positive-definiteness failures.
    //
    // They intentionally DO NOT cover:
    // - Density values; see `smoothing::core::transition`.
    // -------------------------------------------------------------------------

    fn params(a: Array2<f64>, sigma: Array2<f64>, mu: Array1<f64>) -> LdsParams {
        LdsParams::new(a, sigma, mu).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The inverse factor whitens the covariance.
    //
    // Given
    // -----
    // - `Σ = [[2, 0.6], [0.6, 1]]`.
    //
    // Expect
    // ------
    // - `L⁻¹ Σ L⁻ᵀ ≈ I` to 1e-12.
    fn l_inv_whitens_covariance() {
        let sigma = array![[2.0, 0.6], [0.6, 1.0]];
        let w = Whitener::new(&params(Array2::eye(2), sigma.clone(), array![0.0, 0.0])).unwrap();

        let l_inv = w.l_inv();
        let white = l_inv.dot(&sigma).dot(&l_inv.t());

        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(white[[i, j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // `logZ` equals the Gaussian normalizer.
    //
    // Given
    // -----
    // - `Σ = I₃` and `Σ = 4·I₂`.
    //
    // Expect
    // ------
    // - `1.5·ln 2π` and `ln 2π + 2·ln 2` respectively.
    fn log_norm_matches_gaussian_normalizer() {
        let w = Whitener::new(&params(Array2::eye(3), Array2::eye(3), Array1::zeros(3))).unwrap();
        assert_relative_eq!(w.log_norm(), 1.5 * LN_2PI, epsilon = 1e-14);

        let w = Whitener::new(&params(Array2::eye(2), 4.0 * Array2::<f64>::eye(2), Array1::zeros(2)))
            .unwrap();
        assert_relative_eq!(w.log_norm(), LN_2PI + 2.0 * 2.0_f64.ln(), epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Whitened tensors follow `V = X/σ`, `M = (a·X + μ)/σ` in the scalar case.
    //
    // Given
    // -----
    // - `A = 0.5`, `Σ = 4` (σ = 2), `μ = 1`, particles `[0, 2]` at t=0 and
    //   `[4, 6]` at t=1.
    //
    // Expect
    // ------
    // - `V[:, :, 1] = [2, 3]`, `M[:, :, 0] = [0.5, 1.0]`.
    fn whiten_matches_scalar_formula() {
        let w = Whitener::new(&params(array![[0.5]], array![[4.0]], array![1.0])).unwrap();
        let states = Array3::from_shape_vec((1, 2, 2), vec![0.0, 4.0, 2.0, 6.0]).unwrap();

        let out = w.whiten(states.view());

        assert_relative_eq!(out.values[[0, 0, 1]], 2.0, epsilon = 1e-14);
        assert_relative_eq!(out.values[[0, 1, 1]], 3.0, epsilon = 1e-14);
        assert_relative_eq!(out.predicted[[0, 0, 0]], 0.5, epsilon = 1e-14);
        assert_relative_eq!(out.predicted[[0, 1, 0]], 1.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Invalid covariances fail with numerical errors.
    //
    // Given
    // -----
    // - An indefinite symmetric matrix and an asymmetric matrix.
    //
    // Expect
    // ------
    // - `NotPositiveDefinite` and `NonSymmetricCovariance`.
    fn whitener_rejects_invalid_covariances() {
        let indefinite = array![[1.0, 2.0], [2.0, 1.0]];
        let err = Whitener::new(&params(Array2::eye(2), indefinite, Array1::zeros(2))).unwrap_err();
        assert_eq!(err, SmoothError::NotPositiveDefinite);

        let asym = array![[1.0, 0.5], [0.0, 1.0]];
        let err = Whitener::new(&params(Array2::eye(2), asym, Array1::zeros(2))).unwrap_err();
        assert!(matches!(err, SmoothError::NonSymmetricCovariance { row: 0, col: 1, .. }));

        let zero = array![[0.0]];
        let err = Whitener::new(&params(array![[1.0]], zero, array![0.0])).unwrap_err();
        assert_eq!(err, SmoothError::NotPositiveDefinite);
    }
}
