//! Smoother options — weight domain, tolerances, verbosity, cancellation.
//!
//! Purpose
//! -------
//! Bundle the run-time configuration of a smoothing call in one validated
//! value, so that models can be constructed once and reused across many
//! particle sets.
//!
//! Key behaviors
//! -------------
//! - [`SmootherOptions::new`] validates the normalization tolerance.
//! - [`SmootherOptions::default`] selects the linear domain, a `1e-10`
//!   normalization tolerance, no logging, and no cancellation.
//! - [`CancelToken`] is a cloneable handle the backward recursion polls once
//!   per time step.
//!
//! Invariants & assumptions
//! ------------------------
//! - `norm_tol` is finite and strictly positive.
//! - `verbose` only has an effect when the crate is built with the
//!   `obs_slog` feature.
//!
//! Conventions
//! -----------
//! - Options are cheap to clone; the cancel token shares its flag across
//!   clones.
use crate::{
    numerical_stability::DEFAULT_NORM_TOL,
    smoothing::{
        core::domain::WeightDomain,
        errors::{SmoothError, SmoothResult},
    },
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// CancelToken — cooperative cancellation flag shared across threads.
///
/// Cloning yields a handle to the same flag. The recursion checks the flag
/// before each time step; a triggered token makes the call return
/// [`SmoothError::Cancelled`] with no partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

/// SmootherOptions — configuration for [`ParticleSmoother`].
///
/// Fields
/// ------
/// - `domain`: [`WeightDomain`]
///   Domain of the forward weights supplied and of the smoothed weights
///   returned.
/// - `norm_tol`: `f64`
///   Absolute tolerance for the per-column normalization check on forward
///   weights.
/// - `verbose`: `bool`
///   Emit per-step structured logs (requires the `obs_slog` feature).
/// - `cancel`: `Option<CancelToken>`
///   Optional cooperative cancellation handle.
///
/// [`ParticleSmoother`]: crate::smoothing::models::smoother::ParticleSmoother
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherOptions {
    /// Weight domain of inputs and outputs.
    pub domain: WeightDomain,
    /// Normalization tolerance for forward-weight columns.
    pub norm_tol: f64,
    /// Emit per-step logs when built with `obs_slog`.
    pub verbose: bool,
    /// Optional cancellation handle.
    pub cancel: Option<CancelToken>,
}

impl SmootherOptions {
    /// Construct validated options.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::InvalidTolerance` when `norm_tol` is not finite or
    ///   not strictly positive.
    pub fn new(domain: WeightDomain, norm_tol: f64, verbose: bool) -> SmoothResult<Self> {
        if !norm_tol.is_finite() || norm_tol <= 0.0 {
            return Err(SmoothError::InvalidTolerance { value: norm_tol });
        }
        Ok(SmootherOptions { domain, norm_tol, verbose, cancel: None })
    }

    /// Options for `domain` with every other field at its default.
    pub fn with_domain(domain: WeightDomain) -> Self {
        SmootherOptions { domain, ..Self::default() }
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether an attached token has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Default for SmootherOptions {
    fn default() -> Self {
        SmootherOptions {
            domain: WeightDomain::Linear,
            norm_tol: DEFAULT_NORM_TOL,
            verbose: false,
            cancel: None,
        }
    }
}
