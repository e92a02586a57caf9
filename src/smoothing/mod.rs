//! smoothing — fixed-interval particle smoothing for linear-Gaussian models.
//!
//! Purpose
//! -------
//! Given particles and weights from a forward particle filter over a
//! linear-Gaussian state-space model `x_{t+1} ~ N(A·x_t + μ, Σ)`, compute the
//! fixed-interval smoothed weights `Ws` and the cross-time sufficient
//! statistic `XfXp` that an EM estimator needs to update `A`.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the containers, the weight-domain strategy, Gaussian
//!   whitening, pairwise transition scoring, the cross-moment accumulator,
//!   and the backward recursion.
//! - [`models`] exposes [`ParticleSmoother`], [`smooth_particles`] and
//!   [`SmoothOutcome`].
//! - [`errors`] defines [`SmoothError`], its [`SmoothErrorKind`]
//!   classification and the [`SmoothResult`] alias.
//!
//! Invariants & assumptions
//! ------------------------
//! - Layouts: particles `X[state, particle, time]` (`S×N×T`), weights
//!   `W[particle, time]` (`N×T`).
//! - Forward-weight columns are normalized in the configured domain; this is
//!   checked, never repaired.
//! - The same recursion runs in the linear and the log domain; results agree
//!   up to rounding.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. `Ws[:, T−1] = Wf[:, T−1]`.
//! - `XfXp` is a sum over the `T − 1` transitions, never an average.
//! - No I/O except optional `obs_slog` logging when `verbose` is set.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use ndarray::{Array2, Array3, array};
//! use rust_lds_smoother::smoothing::prelude::*;
//!
//! # fn main() -> SmoothResult<()> {
//! let params = LdsParams::new(array![[0.5]], array![[1.0]], array![0.0])?;
//! let states = Array3::from_shape_vec((1, 2, 3), vec![0.0, 0.5, 1.0, 1.0, 1.5, 2.0])
//!     .expect("shape matches data");
//! let data = ParticleSet::new(states, Array2::from_elem((2, 3), 0.5))?;
//!
//! let smoother = ParticleSmoother::new(params, SmootherOptions::default())?;
//! let out = smoother.smooth(&data)?;
//! println!("Ws = {:?}\nXfXp = {:?}", out.smoothed, out.cross_moment);
//! # Ok(())
//! # }
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule; an end-to-end pipeline test lives in
//!   `tests/integration_smoother_pipeline.rs`.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    CancelToken, LdsParams, LdsParamsBuilder, ParticleSet, SmootherOptions, WeightDomain,
};

pub use self::errors::{SmoothError, SmoothErrorKind, SmoothResult};

pub use self::models::{ParticleSmoother, SmoothOutcome, smooth_particles};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_lds_smoother::smoothing::prelude::*;
//
// to import the main smoothing surface in a single line.

pub mod prelude {
    pub use super::{
        CancelToken, LdsParams, LdsParamsBuilder, ParticleSet, ParticleSmoother, SmoothError,
        SmoothErrorKind, SmoothOutcome, SmoothResult, SmootherOptions, WeightDomain,
        smooth_particles,
    };
}
