//! Weight domains — linear vs log-space probability arithmetic.
//!
//! Purpose
//! -------
//! Let the backward recursion be written once and instantiated in either
//! probability domain. [`WeightDomain`] is the user-facing mode flag;
//! [`WeightAlgebra`] is the compile-time strategy the recursion is generic
//! over, with two zero-sized implementations: [`Linear`] and [`LogSpace`].
//!
//! Key behaviors
//! -------------
//! - `Linear` uses `(×, ÷, Σ)` on probabilities.
//! - `LogSpace` uses `(+, −, log-sum-exp)` on log-probabilities.
//! - Both map a transition log-density into their own representation and
//!   back to a linear weight for the sufficient-statistic accumulator.
//!
//! Invariants & assumptions
//! ------------------------
//! - For any valid input, running the recursion with `Linear` and with
//!   `LogSpace` yields the same linear-scale quantities up to rounding; the
//!   operations below are homomorphic images of each other under `ln`.
//! - `is_degenerate` is the single source of truth for "this normalizer is
//!   zero" in each domain.
//!
//! Conventions
//! -----------
//! - `WeightDomain` parses from `"linear"`/`"lin"` and `"log"`/`"log-domain"`
//!   (case-insensitive); anything else is a config error.
use crate::{
    numerical_stability::log_space::log_sum_exp,
    smoothing::errors::{SmoothError, SmoothResult},
};
use std::str::FromStr;

/// WeightDomain — representation of forward and smoothed weights.
///
/// `Linear` weights are probabilities whose per-time column sums to one.
/// `Log` weights are log-probabilities whose per-time column log-sum-exps to
/// zero. The smoothed output is returned in the same domain as the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightDomain {
    /// Probabilities.
    #[default]
    Linear,
    /// Log-probabilities.
    Log,
}

impl WeightDomain {
    /// Canonical lowercase name (`"linear"` or `"log"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightDomain::Linear => "linear",
            WeightDomain::Log => "log",
        }
    }

    /// Convert a single weight in this domain to a linear probability.
    pub fn to_linear(&self, w: f64) -> f64 {
        match self {
            WeightDomain::Linear => Linear::to_linear(w),
            WeightDomain::Log => LogSpace::to_linear(w),
        }
    }
}

impl FromStr for WeightDomain {
    type Err = SmoothError;

    fn from_str(s: &str) -> SmoothResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(WeightDomain::Linear),
            "log" | "log-domain" | "log_domain" => Ok(WeightDomain::Log),
            other => Err(SmoothError::UnknownDomain { name: other.to_string() }),
        }
    }
}

impl std::fmt::Display for WeightDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WeightAlgebra — the arithmetic a probability domain provides.
///
/// The backward recursion only ever combines weights through these
/// operations, so a single generic implementation serves both domains.
pub trait WeightAlgebra: Copy + Send + Sync + 'static {
    /// The matching runtime flag.
    const DOMAIN: WeightDomain;

    /// Represent a transition density given as `ln p`.
    fn from_log_density(log_p: f64) -> f64;

    /// Product of two weights.
    fn mul(a: f64, b: f64) -> f64;

    /// Quotient of two weights.
    fn div(a: f64, b: f64) -> f64;

    /// Sum of weights (log-sum-exp in log space).
    fn sum<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone;

    /// Linear probability represented by `w`.
    fn to_linear(w: f64) -> f64;

    /// Total mass of a normalized column (`1` or `0`).
    fn unit() -> f64;

    /// Whether `w` is zero or indistinguishable from it as a normalizer.
    fn is_degenerate(w: f64) -> bool;
}

/// Probabilities with ordinary arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Linear;

/// Log-probabilities with log-sum-exp aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSpace;

impl WeightAlgebra for Linear {
    const DOMAIN: WeightDomain = WeightDomain::Linear;

    #[inline]
    fn from_log_density(log_p: f64) -> f64 {
        log_p.exp()
    }

    #[inline]
    fn mul(a: f64, b: f64) -> f64 {
        a * b
    }

    #[inline]
    fn div(a: f64, b: f64) -> f64 {
        a / b
    }

    #[inline]
    fn sum<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        values.into_iter().sum()
    }

    #[inline]
    fn to_linear(w: f64) -> f64 {
        w
    }

    #[inline]
    fn unit() -> f64 {
        1.0
    }

    // Subnormal normalizers amplify rounding error past anything usable.
    #[inline]
    fn is_degenerate(w: f64) -> bool {
        !w.is_finite() || w < f64::MIN_POSITIVE
    }
}

impl WeightAlgebra for LogSpace {
    const DOMAIN: WeightDomain = WeightDomain::Log;

    #[inline]
    fn from_log_density(log_p: f64) -> f64 {
        log_p
    }

    #[inline]
    fn mul(a: f64, b: f64) -> f64 {
        a + b
    }

    // Callers never divide by a degenerate (-∞) normalizer, so -∞ - (-∞)
    // cannot occur here.
    #[inline]
    fn div(a: f64, b: f64) -> f64 {
        a - b
    }

    #[inline]
    fn sum<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        log_sum_exp(values)
    }

    #[inline]
    fn to_linear(w: f64) -> f64 {
        w.exp()
    }

    #[inline]
    fn unit() -> f64 {
        0.0
    }

    #[inline]
    fn is_degenerate(w: f64) -> bool {
        !w.is_finite()
    }
}
