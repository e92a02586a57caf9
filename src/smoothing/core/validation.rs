//! smoothing::core::validation — preconditions checked before any recursion.
//!
//! Purpose
//! -------
//! Centralize the eager input checks that sit between a [`ParticleSet`] /
//! [`LdsParams`] pair and the numerical core: state-dimension agreement and
//! per-column normalization of the forward weights in the configured domain.
//!
//! Key behaviors
//! -------------
//! - [`validate_state_dims`] checks `X.shape[0] == A.rows`.
//! - [`validate_forward_weights`] checks every forward-weight column is a
//!   valid distribution: non-negative and summing to one (linear), or
//!   finite-or-`-∞` and log-sum-exping to zero (log), within `norm_tol`.
//!
//! Conventions
//! -----------
//! - Errors are reported as [`SmoothError`]; nothing here panics or
//!   allocates beyond error construction.
//! - An unnormalized column is a precondition violation (config-kind error),
//!   never silently renormalized.
//!
//! [`ParticleSet`]: crate::smoothing::core::data::ParticleSet
//! [`LdsParams`]: crate::smoothing::core::params::LdsParams
use crate::smoothing::{
    core::domain::{Linear, LogSpace, WeightAlgebra, WeightDomain},
    errors::{SmoothError, SmoothResult},
};
use ndarray::{ArrayView1, ArrayView2};

/// Check that the particle tensor's state dimension matches the parameters.
///
/// Errors
/// ------
/// - `SmoothError::StateDimMismatch` when `states_dim != params_dim`.
pub fn validate_state_dims(states_dim: usize, params_dim: usize) -> SmoothResult<()> {
    if states_dim != params_dim {
        return Err(SmoothError::StateDimMismatch {
            what: "particle tensor",
            expected: params_dim,
            actual: states_dim,
        });
    }
    Ok(())
}

/// Check each forward-weight column is a normalized distribution in `domain`.
///
/// Parameters
/// ----------
/// - `forward`: `ArrayView2<f64>`
///   `N×T` forward weights.
/// - `domain`: [`WeightDomain`]
///   Domain the weights are expressed in.
/// - `norm_tol`: `f64`
///   Absolute tolerance on `|Σ w − 1|` (linear) or `|lse(w)|` (log).
///
/// Errors
/// ------
/// - `SmoothError::NegativeWeight` / `NonFiniteInput` for bad linear entries.
/// - `SmoothError::InvalidLogWeight` for NaN or `+∞` log entries.
/// - `SmoothError::UnnormalizedWeights` for a column outside tolerance; the
///   reported `total` is on the linear scale in both domains.
pub fn validate_forward_weights(
    forward: ArrayView2<'_, f64>, domain: WeightDomain, norm_tol: f64,
) -> SmoothResult<()> {
    for (t, col) in forward.columns().into_iter().enumerate() {
        match domain {
            WeightDomain::Linear => {
                for (particle, &value) in col.iter().enumerate() {
                    if !value.is_finite() {
                        return Err(SmoothError::NonFiniteInput {
                            what: "forward weight",
                            index: vec![particle, t],
                            value,
                        });
                    }
                    if value < 0.0 {
                        return Err(SmoothError::NegativeWeight { particle, t, value });
                    }
                }
                check_column_mass::<Linear>(col, t, norm_tol)?;
            }
            WeightDomain::Log => {
                for (particle, &value) in col.iter().enumerate() {
                    if value.is_nan() || value == f64::INFINITY {
                        return Err(SmoothError::InvalidLogWeight { particle, t, value });
                    }
                }
                check_column_mass::<LogSpace>(col, t, norm_tol)?;
            }
        }
    }
    Ok(())
}

// ---- Helper methods ----

fn check_column_mass<W: WeightAlgebra>(
    col: ArrayView1<'_, f64>, t: usize, norm_tol: f64,
) -> SmoothResult<()> {
    let mass = W::sum(col.iter().copied());
    if !((mass - W::unit()).abs() <= norm_tol) {
        return Err(SmoothError::UnnormalizedWeights { t, total: W::to_linear(mass) });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical_stability::DEFAULT_NORM_TOL;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - All error branches of `validate_forward_weights` in both domains.
    // - The state-dimension check.
    // - Success on uniform weights and on `-∞` log entries (zero mass).
    // -------------------------------------------------------------------------

    const TOL: f64 = DEFAULT_NORM_TOL;

    #[test]
    // Purpose
    // -------
    // Uniform weights pass in both domains.
    fn validate_forward_weights_accepts_uniform_columns() {
        let lin = Array2::from_elem((4, 3), 0.25);
        let log = lin.mapv(f64::ln);

        assert!(validate_forward_weights(lin.view(), WeightDomain::Linear, TOL).is_ok());
        assert!(validate_forward_weights(log.view(), WeightDomain::Log, TOL).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A column scaled by a positive constant (and not renormalized) is a
    // precondition violation.
    //
    // Given
    // -----
    // - Uniform weights with column 1 multiplied by 2 (linear) or shifted by
    //   `ln 2` (log).
    //
    // Expect
    // ------
    // - `UnnormalizedWeights { t: 1, total ≈ 2 }` in both domains.
    fn validate_forward_weights_rejects_scaled_column() {
        let mut lin = Array2::from_elem((2, 3), 0.5);
        lin.column_mut(1).mapv_inplace(|w| 2.0 * w);
        let log = lin.mapv(f64::ln);

        match validate_forward_weights(lin.view(), WeightDomain::Linear, TOL) {
            Err(SmoothError::UnnormalizedWeights { t, total }) => {
                assert_eq!(t, 1);
                assert!((total - 2.0).abs() < 1e-12);
            }
            other => panic!("expected UnnormalizedWeights, got {other:?}"),
        }
        match validate_forward_weights(log.view(), WeightDomain::Log, TOL) {
            Err(SmoothError::UnnormalizedWeights { t, total }) => {
                assert_eq!(t, 1);
                assert!((total - 2.0).abs() < 1e-12);
            }
            other => panic!("expected UnnormalizedWeights, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // The default tolerance is tight enough that an accepted forward column
    // keeps every smoothed column normalized within 1e-9.
    //
    // Given
    // -----
    // - Uniform weights with `5e-9` extra mass on one particle at t=2, in
    //   both domains.
    //
    // Expect
    // ------
    // - Rejected with `UnnormalizedWeights { t: 2, .. }` at the default
    //   tolerance; accepted at `1e-8`.
    fn validate_forward_weights_rejects_small_mass_drift() {
        let mut lin = Array2::from_elem((2, 3), 0.5);
        lin[[0, 2]] += 5e-9;
        let log = lin.mapv(f64::ln);

        for (weights, domain) in [(&lin, WeightDomain::Linear), (&log, WeightDomain::Log)] {
            match validate_forward_weights(weights.view(), domain, TOL) {
                Err(SmoothError::UnnormalizedWeights { t, total }) => {
                    assert_eq!(t, 2);
                    assert!((total - 1.0 - 5e-9).abs() < 1e-12);
                }
                other => panic!("expected UnnormalizedWeights in {domain}, got {other:?}"),
            }
            assert!(validate_forward_weights(weights.view(), domain, 1e-8).is_ok());
        }
    }

    #[test]
    // Purpose
    // -------
    // Entry-level violations are reported before the column total.
    //
    // Given
    // -----
    // - A negative linear weight, a NaN linear weight, and a `+∞` log weight.
    //
    // Expect
    // ------
    // - `NegativeWeight`, `NonFiniteInput`, `InvalidLogWeight`.
    fn validate_forward_weights_rejects_bad_entries() {
        let neg = array![[1.5], [-0.5]];
        assert!(matches!(
            validate_forward_weights(neg.view(), WeightDomain::Linear, TOL),
            Err(SmoothError::NegativeWeight { particle: 1, t: 0, .. })
        ));

        let nan = array![[f64::NAN], [1.0]];
        assert!(matches!(
            validate_forward_weights(nan.view(), WeightDomain::Linear, TOL),
            Err(SmoothError::NonFiniteInput { .. })
        ));

        let inf = array![[f64::INFINITY], [0.0]];
        assert!(matches!(
            validate_forward_weights(inf.view(), WeightDomain::Log, TOL),
            Err(SmoothError::InvalidLogWeight { particle: 0, t: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Zero-mass particles are allowed: `-∞` in log domain, `0` in linear.
    fn validate_forward_weights_accepts_zero_mass_particles() {
        let log = array![[0.0], [f64::NEG_INFINITY]];
        let lin = array![[1.0], [0.0]];

        assert!(validate_forward_weights(log.view(), WeightDomain::Log, TOL).is_ok());
        assert!(validate_forward_weights(lin.view(), WeightDomain::Linear, TOL).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // State dimensions must agree between tensor and parameters.
    fn validate_state_dims_reports_mismatch() {
        assert!(validate_state_dims(3, 3).is_ok());
        assert_eq!(
            validate_state_dims(2, 3),
            Err(SmoothError::StateDimMismatch { what: "particle tensor", expected: 3, actual: 2 })
        );
    }
}
