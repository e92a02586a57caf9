//! numerical_stability — overflow/underflow-safe reductions and tolerances.
//!
//! Purpose
//! -------
//! Collect the small set of numerically robust primitives used by the
//! log-domain smoothing path, together with the tolerances shared across
//! validation and recursion code.
//!
//! Key behaviors
//! -------------
//! - Provide max-shift log-sum-exp reductions (`log_sum_exp`,
//!   `log_sum_exp_slice`, `log_add_exp`) that return `-∞` for zero-mass
//!   inputs instead of NaN.
//! - Centralize tolerances (`DEFAULT_NORM_TOL`, `SYMMETRY_TOL`) so the
//!   validation and whitening layers agree on what "normalized" and
//!   "symmetric" mean.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite or `-∞`; NaN inputs propagate as NaN and are expected
//!   to be rejected upstream by `smoothing::core::validation`.
//!
//! Conventions
//! -----------
//! - This module never logs, performs I/O, or touches global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`log_space`] cover agreement with naïve formulas, the
//!   extreme-value regime, and the all-`-∞` edge case.

pub mod log_space;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::log_space::{LN_2PI, log_add_exp, log_sum_exp, log_sum_exp_slice};

/// Default tolerance for the per-column normalization check on forward
/// weights (`|Σ w − 1|` in linear domain, `|lse(w)|` in log domain).
///
/// The boundary column of `Ws` is a copy of `Wf` and the recursion preserves
/// column mass, so this bounds the normalization error of every smoothed
/// column.
pub const DEFAULT_NORM_TOL: f64 = 1e-10;

/// Relative tolerance for the symmetry check on the process noise covariance.
pub const SYMMETRY_TOL: f64 = 1e-10;
