//! Log-space aggregation utilities.
//!
//! Provides overflow/underflow-safe versions of the reductions used by the
//! log-domain smoothing path. All routines use the max-subtraction trick so
//! that the largest term is evaluated as `exp(0) = 1` and nothing overflows.
//!
//! # Provided items
//! - [`LN_2PI`]: `ln(2π)`, shared by Gaussian log-normalizers.
//! - [`log_sum_exp`]: stable `ln Σ exp(xᵢ)` over any iterator of `f64`.
//! - [`log_sum_exp_slice`]: slice convenience wrapper.
//! - [`log_add_exp`]: stable binary `ln(exp(a) + exp(b))`.
//!
//! # Edge cases
//! An empty input or an input whose entries are all `-∞` is the log of a zero
//! mass and returns `-∞` exactly. Subtracting the maximum in that case would
//! evaluate `-∞ - (-∞) = NaN`, so it is short-circuited before any
//! arithmetic. A `+∞` entry returns `+∞`.

/// `ln(2π)`.
pub const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Numerically stable `ln Σᵢ exp(xᵢ)`.
///
/// Computes `m + ln Σᵢ exp(xᵢ − m)` with `m = maxᵢ xᵢ`. The iterator is
/// traversed twice, so it must be `Clone` (slice and ndarray iterators are).
///
/// # Parameters
/// - `values`: iterator of log-values. `-∞` entries contribute zero mass.
///
/// # Returns
/// - `-∞` for an empty or all-`-∞` input.
/// - `+∞` if any entry is `+∞`.
/// - `NaN` if any entry is `NaN` (callers validate inputs upstream).
pub fn log_sum_exp<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let mut max = f64::NEG_INFINITY;
    for v in iter.clone() {
        if v.is_nan() {
            return f64::NAN;
        }
        if v > max {
            max = v;
        }
    }
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let sum: f64 = iter.map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Numerically stable `ln Σᵢ exp(xᵢ)` over a slice.
pub fn log_sum_exp_slice(values: &[f64]) -> f64 {
    log_sum_exp(values.iter().copied())
}

/// Numerically stable `ln(exp(a) + exp(b))`.
///
/// Uses `max(a, b) + ln1p(exp(−|a − b|))`, which keeps full precision when
/// one term dominates.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::NEG_INFINITY || hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of `log_sum_exp` / `log_add_exp` with the naïve formula on
    //   moderate inputs.
    // - Overflow and underflow behavior on extreme inputs.
    // - The zero-mass edge cases (empty and all `-∞`).
    //
    // They intentionally DO NOT cover:
    // - Use inside the backward recursion; see `smoothing::core::backward`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Check `log_sum_exp` against `ln Σ exp(x)` where the naïve form is safe.
    //
    // Given
    // -----
    // - `x = [-1.0, 0.5, 2.0]`.
    //
    // Expect
    // ------
    // - Results agree to 1e-12.
    fn log_sum_exp_matches_naive_formula_on_moderate_inputs() {
        let x = [-1.0_f64, 0.5, 2.0];
        let naive = x.iter().map(|v| v.exp()).sum::<f64>().ln();

        assert_relative_eq!(log_sum_exp_slice(&x), naive, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure large positive and large negative inputs neither overflow nor
    // underflow to a wrong answer.
    //
    // Given
    // -----
    // - `[1000, 1000]` (naïve `exp` overflows).
    // - `[-1000, -1000]` (naïve `exp` underflows to 0).
    //
    // Expect
    // ------
    // - `1000 + ln 2` and `-1000 + ln 2` respectively.
    fn log_sum_exp_is_stable_at_extremes() {
        assert_relative_eq!(
            log_sum_exp_slice(&[1000.0, 1000.0]),
            1000.0 + 2.0_f64.ln(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            log_sum_exp_slice(&[-1000.0, -1000.0]),
            -1000.0 + 2.0_f64.ln(),
            epsilon = 1e-9
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify zero-mass inputs return `-∞` without producing NaN.
    //
    // Given
    // -----
    // - An empty slice and an all-`-∞` slice.
    //
    // Expect
    // ------
    // - Both return exactly `f64::NEG_INFINITY`.
    fn log_sum_exp_of_zero_mass_is_negative_infinity() {
        assert_eq!(log_sum_exp_slice(&[]), f64::NEG_INFINITY);
        assert_eq!(
            log_sum_exp_slice(&[f64::NEG_INFINITY, f64::NEG_INFINITY]),
            f64::NEG_INFINITY
        );
    }

    #[test]
    // Purpose
    // -------
    // `-∞` entries mixed with finite entries contribute no mass.
    //
    // Given
    // -----
    // - `[-∞, 0.0]`.
    //
    // Expect
    // ------
    // - Exactly `0.0`.
    fn log_sum_exp_ignores_negative_infinity_entries() {
        assert_eq!(log_sum_exp_slice(&[f64::NEG_INFINITY, 0.0]), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Check `log_add_exp` against `log_sum_exp` and its edge cases.
    //
    // Given
    // -----
    // - Moderate pairs, a dominated pair, and `-∞` operands.
    //
    // Expect
    // ------
    // - Agreement with the n-ary routine; `-∞` is the additive identity.
    fn log_add_exp_agrees_with_log_sum_exp() {
        for &(a, b) in &[(0.0, 0.0), (-3.0, 1.5), (40.0, -40.0)] {
            assert_relative_eq!(log_add_exp(a, b), log_sum_exp_slice(&[a, b]), epsilon = 1e-12);
        }
        assert_eq!(log_add_exp(f64::NEG_INFINITY, -2.0), -2.0);
        assert_eq!(log_add_exp(f64::NEG_INFINITY, f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Sanity check on the `LN_2PI` constant.
    fn ln_2pi_matches_std() {
        assert_relative_eq!(LN_2PI, (2.0 * std::f64::consts::PI).ln(), epsilon = 1e-15);
    }
}
