//! Errors for particle smoothing (shape checks, configuration and
//! precondition checks, numerical failures, and cancellation).
//!
//! This module defines the smoother error type, [`SmoothError`], and its coarse
//! classification, [`SmoothErrorKind`]. The error implements
//! `Display`/`Error` and converts to `PyErr` when the `python-bindings`
//! feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy). Time indices refer to the
//!   last axis of the particle tensor.
//! - Shape errors are detected eagerly, before any factorization or
//!   recursion step runs.
//! - Numerical errors replace silent NaN/∞ propagation: the recursion stops
//!   at the first degenerate quantity and reports where it happened.
//! - There is no partial-result path; an `Err` means no output is valid.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for smoothing operations that may produce
/// [`SmoothError`].
pub type SmoothResult<T> = Result<T, SmoothError>;

/// Coarse classification of a [`SmoothError`].
///
/// Callers that only need to decide between "fix the inputs", "fix the
/// configuration", and "the model is degenerate for these particles" can
/// match on this instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothErrorKind {
    /// Dimension mismatch among inputs.
    Shape,
    /// Missing parameters, unknown mode flags, or violated input preconditions.
    Config,
    /// Non-SPD covariance or degenerate normalization during the recursion.
    Numerical,
    /// The run was stopped through a cancellation token.
    Cancelled,
}

/// Unified error type for particle smoothing.
///
/// Covers input-shape validation, parameter/options checks, numerical
/// degeneracies in the whitening and backward passes, and cooperative
/// cancellation.
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothError {
    // ---- Shape ----
    /// A dimension that must be at least one is zero.
    EmptyDimension { what: &'static str },

    /// State dimension of an input disagrees with the particle tensor.
    StateDimMismatch { what: &'static str, expected: usize, actual: usize },

    /// Forward weights have a different particle count than the tensor.
    ParticleCountMismatch { expected: usize, actual: usize },

    /// Forward weights have a different time length than the tensor.
    TimeLengthMismatch { expected: usize, actual: usize },

    /// A matrix that must be square is not.
    NonSquareMatrix { what: &'static str, rows: usize, cols: usize },

    /// A term added to the accumulator has the wrong shape.
    AccumulatorShapeMismatch { expected: (usize, usize), actual: (usize, usize) },

    // ---- Config / preconditions ----
    /// A required model parameter was not supplied.
    MissingParameter { name: &'static str },

    /// Unrecognized weight-domain flag.
    UnknownDomain { name: String },

    /// An input contains NaN or ±∞ where a finite value is required.
    NonFiniteInput { what: &'static str, index: Vec<usize>, value: f64 },

    /// A linear-domain forward weight is negative.
    NegativeWeight { particle: usize, t: usize, value: f64 },

    /// A log-domain forward weight is NaN or `+∞`.
    InvalidLogWeight { particle: usize, t: usize, value: f64 },

    /// A forward-weight column is not a normalized distribution.
    UnnormalizedWeights { t: usize, total: f64 },

    /// Normalization tolerance must be finite and > 0.
    InvalidTolerance { value: f64 },

    // ---- Numerical ----
    /// The process noise covariance has no Cholesky factor.
    NotPositiveDefinite,

    /// The process noise covariance is not symmetric.
    NonSymmetricCovariance { row: usize, col: usize, diff: f64 },

    /// A backward-ratio denominator vanished (degenerate forward support).
    DegenerateDenominator { t: usize, particle: usize, value: f64 },

    /// The recursion produced a non-finite smoothed weight or statistic entry.
    NonFiniteResult { what: &'static str, t: usize },

    // ---- Cancellation ----
    /// A cancellation token was triggered before step `t` ran.
    Cancelled { t: usize },
}

impl SmoothError {
    /// Classify this error into one of the four [`SmoothErrorKind`]s.
    pub fn kind(&self) -> SmoothErrorKind {
        match self {
            SmoothError::EmptyDimension { .. }
            | SmoothError::StateDimMismatch { .. }
            | SmoothError::ParticleCountMismatch { .. }
            | SmoothError::TimeLengthMismatch { .. }
            | SmoothError::NonSquareMatrix { .. }
            | SmoothError::AccumulatorShapeMismatch { .. } => SmoothErrorKind::Shape,

            SmoothError::MissingParameter { .. }
            | SmoothError::UnknownDomain { .. }
            | SmoothError::NonFiniteInput { .. }
            | SmoothError::NegativeWeight { .. }
            | SmoothError::InvalidLogWeight { .. }
            | SmoothError::UnnormalizedWeights { .. }
            | SmoothError::InvalidTolerance { .. } => SmoothErrorKind::Config,

            SmoothError::NotPositiveDefinite
            | SmoothError::NonSymmetricCovariance { .. }
            | SmoothError::DegenerateDenominator { .. }
            | SmoothError::NonFiniteResult { .. } => SmoothErrorKind::Numerical,

            SmoothError::Cancelled { .. } => SmoothErrorKind::Cancelled,
        }
    }
}

impl std::error::Error for SmoothError {}

impl std::fmt::Display for SmoothError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shape ----
            SmoothError::EmptyDimension { what } => {
                write!(f, "Shape error: {what} must be at least 1.")
            }
            SmoothError::StateDimMismatch { what, expected, actual } => {
                write!(
                    f,
                    "Shape error: {what} has state dimension {actual}, expected {expected}."
                )
            }
            SmoothError::ParticleCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Shape error: forward weights have {actual} particles, expected {expected}."
                )
            }
            SmoothError::TimeLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Shape error: forward weights have {actual} time steps, expected {expected}."
                )
            }
            SmoothError::NonSquareMatrix { what, rows, cols } => {
                write!(f, "Shape error: {what} must be square; got {rows}x{cols}.")
            }
            SmoothError::AccumulatorShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Shape error: accumulator term is {}x{}, expected {}x{}.",
                    actual.0, actual.1, expected.0, expected.1
                )
            }
            // ---- Config / preconditions ----
            SmoothError::MissingParameter { name } => {
                write!(f, "Config error: required parameter `{name}` was not provided.")
            }
            SmoothError::UnknownDomain { name } => {
                write!(f, "Config error: unknown weight domain {name:?} (expected 'linear' or 'log').")
            }
            SmoothError::NonFiniteInput { what, index, value } => {
                write!(f, "Config error: {what} at index {index:?} is non-finite: {value}")
            }
            SmoothError::NegativeWeight { particle, t, value } => {
                write!(
                    f,
                    "Config error: forward weight for particle {particle} at t={t} is negative: {value}"
                )
            }
            SmoothError::InvalidLogWeight { particle, t, value } => {
                write!(
                    f,
                    "Config error: log forward weight for particle {particle} at t={t} must be finite or -inf; got {value}"
                )
            }
            SmoothError::UnnormalizedWeights { t, total } => {
                write!(
                    f,
                    "Config error: forward weights at t={t} are not normalized (total mass {total})."
                )
            }
            SmoothError::InvalidTolerance { value } => {
                write!(f, "Config error: normalization tolerance must be finite and > 0; got {value}")
            }
            // ---- Numerical ----
            SmoothError::NotPositiveDefinite => {
                write!(f, "Numerical error: process noise covariance is not positive-definite.")
            }
            SmoothError::NonSymmetricCovariance { row, col, diff } => {
                write!(
                    f,
                    "Numerical error: process noise covariance is not symmetric at ({row}, {col}); |Σ[i,j] - Σ[j,i]| = {diff}"
                )
            }
            SmoothError::DegenerateDenominator { t, particle, value } => {
                write!(
                    f,
                    "Numerical error: backward normalizer for particle {particle} at t={t} is degenerate ({value}); forward weights give it no support."
                )
            }
            SmoothError::NonFiniteResult { what, t } => {
                write!(f, "Numerical error: {what} became non-finite at t={t}.")
            }
            // ---- Cancellation ----
            SmoothError::Cancelled { t } => {
                write!(f, "Smoothing cancelled before time step {t}.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SmoothError> for PyErr {
    fn from(err: SmoothError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The variant → kind classification.
    // - `Display` messages embedding their payloads.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Each taxonomy bucket maps to the documented kind.
    //
    // Given
    // -----
    // - One representative variant per bucket.
    //
    // Expect
    // ------
    // - `kind()` returns Shape / Config / Numerical / Cancelled accordingly.
    fn kind_classifies_representative_variants() {
        assert_eq!(
            SmoothError::ParticleCountMismatch { expected: 2, actual: 3 }.kind(),
            SmoothErrorKind::Shape
        );
        assert_eq!(
            SmoothError::UnknownDomain { name: "exp".to_string() }.kind(),
            SmoothErrorKind::Config
        );
        assert_eq!(
            SmoothError::UnnormalizedWeights { t: 0, total: 2.0 }.kind(),
            SmoothErrorKind::Config
        );
        assert_eq!(SmoothError::NotPositiveDefinite.kind(), SmoothErrorKind::Numerical);
        assert_eq!(
            SmoothError::DegenerateDenominator { t: 1, particle: 0, value: 0.0 }.kind(),
            SmoothErrorKind::Numerical
        );
        assert_eq!(SmoothError::Cancelled { t: 4 }.kind(), SmoothErrorKind::Cancelled);
    }

    #[test]
    // Purpose
    // -------
    // Display strings carry the offending values so logs are actionable.
    //
    // Given
    // -----
    // - A degenerate-denominator error and an unnormalized-weights error.
    //
    // Expect
    // ------
    // - Messages mention particle/time indices and the bad total.
    fn display_embeds_payload() {
        let msg = SmoothError::DegenerateDenominator { t: 7, particle: 3, value: 0.0 }.to_string();
        assert!(msg.contains("particle 3"));
        assert!(msg.contains("t=7"));

        let msg = SmoothError::UnnormalizedWeights { t: 2, total: 1.5 }.to_string();
        assert!(msg.contains("t=2"));
        assert!(msg.contains("1.5"));
    }
}
