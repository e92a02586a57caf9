//! Linear-Gaussian transition parameters — `x_{t+1} ~ N(A·x_t + μ, Σ)`.
//!
//! Purpose
//! -------
//! Own and validate the model parameters the smoother conditions on: the
//! transition matrix `A`, the process noise covariance `Σ`, and the mean
//! offset `μ`. Construction checks shapes and finiteness; positive
//! definiteness of `Σ` is checked by the whitener, which needs the Cholesky
//! factor anyway.
//!
//! Key behaviors
//! -------------
//! - [`LdsParams::new`] validates `A: S×S`, `Σ: S×S`, `μ: S` and finite
//!   entries.
//! - [`LdsParamsBuilder`] assembles parameters field by field and reports a
//!   [`SmoothError::MissingParameter`] for absent fields, which is how
//!   partially specified configurations arrive from loosely typed callers.
//!
//! Invariants & assumptions
//! ------------------------
//! - After construction, `transition`, `noise_cov` and `offset` agree on the
//!   state dimension `S ≥ 1` and contain only finite values.
//! - Parameters are immutable for the duration of a smoothing call.
use crate::smoothing::errors::{SmoothError, SmoothResult};
use ndarray::{Array1, Array2, ArrayView2};

/// LdsParams — validated `(A, Σ, μ)` for a linear-Gaussian transition.
///
/// Fields
/// ------
/// - `transition`: `Array2<f64>`
///   `S×S` matrix `A` mapping the state at `t` to the predicted mean at `t+1`.
/// - `noise_cov`: `Array2<f64>`
///   `S×S` process noise covariance `Σ`; must be symmetric positive-definite
///   (checked when whitening).
/// - `offset`: `Array1<f64>`
///   Length-`S` additive mean offset `μ`.
///
/// Invariants
/// ----------
/// - All three agree on `S ≥ 1`; all entries are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct LdsParams {
    /// Transition matrix `A`.
    pub transition: Array2<f64>,
    /// Process noise covariance `Σ`.
    pub noise_cov: Array2<f64>,
    /// Mean offset `μ`.
    pub offset: Array1<f64>,
}

impl LdsParams {
    /// Construct validated parameters.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::EmptyDimension` when `S == 0`.
    /// - `SmoothError::NonSquareMatrix` when `A` or `Σ` is not square.
    /// - `SmoothError::StateDimMismatch` when `Σ` or `μ` disagrees with `A`.
    /// - `SmoothError::NonFiniteInput` for NaN/±∞ entries.
    pub fn new(
        transition: Array2<f64>, noise_cov: Array2<f64>, offset: Array1<f64>,
    ) -> SmoothResult<Self> {
        let s = transition.nrows();
        if s == 0 {
            return Err(SmoothError::EmptyDimension { what: "state dimension" });
        }
        check_square("transition matrix", transition.view())?;
        check_square("noise covariance", noise_cov.view())?;
        if noise_cov.nrows() != s {
            return Err(SmoothError::StateDimMismatch {
                what: "noise covariance",
                expected: s,
                actual: noise_cov.nrows(),
            });
        }
        if offset.len() != s {
            return Err(SmoothError::StateDimMismatch {
                what: "mean offset",
                expected: s,
                actual: offset.len(),
            });
        }

        check_finite(
            "transition matrix",
            transition.indexed_iter().map(|((i, j), &v)| (vec![i, j], v)),
        )?;
        check_finite(
            "noise covariance",
            noise_cov.indexed_iter().map(|((i, j), &v)| (vec![i, j], v)),
        )?;
        check_finite("mean offset", offset.indexed_iter().map(|(i, &v)| (vec![i], v)))?;

        Ok(LdsParams { transition, noise_cov, offset })
    }

    /// State dimension `S`.
    pub fn state_dim(&self) -> usize {
        self.transition.nrows()
    }

    /// Start a [`LdsParamsBuilder`].
    pub fn builder() -> LdsParamsBuilder {
        LdsParamsBuilder::default()
    }
}

/// LdsParamsBuilder — field-by-field assembly of [`LdsParams`].
#[derive(Debug, Clone, Default)]
pub struct LdsParamsBuilder {
    transition: Option<Array2<f64>>,
    noise_cov: Option<Array2<f64>>,
    offset: Option<Array1<f64>>,
}

impl LdsParamsBuilder {
    /// Set the transition matrix `A`.
    pub fn transition(mut self, transition: Array2<f64>) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Set the process noise covariance `Σ`.
    pub fn noise_cov(mut self, noise_cov: Array2<f64>) -> Self {
        self.noise_cov = Some(noise_cov);
        self
    }

    /// Set the mean offset `μ`.
    pub fn offset(mut self, offset: Array1<f64>) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Validate and build.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::MissingParameter` naming the first absent field
    ///   (`"transition"`, `"noise_cov"`, `"offset"`), then any error from
    ///   [`LdsParams::new`].
    pub fn build(self) -> SmoothResult<LdsParams> {
        let transition =
            self.transition.ok_or(SmoothError::MissingParameter { name: "transition" })?;
        let noise_cov = self.noise_cov.ok_or(SmoothError::MissingParameter { name: "noise_cov" })?;
        let offset = self.offset.ok_or(SmoothError::MissingParameter { name: "offset" })?;
        LdsParams::new(transition, noise_cov, offset)
    }
}

// ---- Helper methods ----

fn check_square(what: &'static str, m: ArrayView2<'_, f64>) -> SmoothResult<()> {
    if m.nrows() != m.ncols() {
        return Err(SmoothError::NonSquareMatrix { what, rows: m.nrows(), cols: m.ncols() });
    }
    Ok(())
}

fn check_finite<I>(what: &'static str, entries: I) -> SmoothResult<()>
where
    I: IntoIterator<Item = (Vec<usize>, f64)>,
{
    for (index, value) in entries {
        if !value.is_finite() {
            return Err(SmoothError::NonFiniteInput { what, index, value });
        }
    }
    Ok(())
}
