//! models — user-facing particle smoother and its outcome type.
//!
//! Purpose
//! -------
//! Wire the numerical core in `smoothing::core` into a validated, reusable
//! smoother. This layer decides the order in which inputs are checked,
//! dispatches the run-time [`WeightDomain`] to the generic recursion, and
//! owns optional logging.
//!
//! Key behaviors
//! -------------
//! - [`ParticleSmoother`] factors `Σ` once and smooths any number of
//!   particle sets.
//! - [`smooth_particles`] is the one-shot, view-based entry point.
//! - [`SmoothOutcome`] carries `Ws`, `XfXp` and the domain, plus helpers for
//!   smoothed means, the marginal second moment, and effective sample sizes.
//!
//! Downstream usage
//! ----------------
//! - Build [`LdsParams`] and [`SmootherOptions`], construct a
//!   [`ParticleSmoother`], then call `smooth(&particle_set)` once per set of
//!   forward-filtered particles (e.g. once per EM iteration).
//! - An EM M-step consumes `cross_moment` together with
//!   [`SmoothOutcome::second_moment`]; both are sums over time.
//!
//! [`WeightDomain`]: crate::smoothing::core::domain::WeightDomain
//! [`LdsParams`]: crate::smoothing::core::params::LdsParams
//! [`SmootherOptions`]: crate::smoothing::core::options::SmootherOptions

pub mod smoother;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::smoother::{ParticleSmoother, SmoothOutcome, smooth_particles};
