//! core — particle data, model parameters, whitening, and the backward pass.
//!
//! Purpose
//! -------
//! Collect the numerical building blocks of fixed-interval particle
//! smoothing for linear-Gaussian state-space models: validated particle
//! containers, transition parameters, the weight-domain strategy, Gaussian
//! whitening, pairwise transition scoring, the cross-time accumulator, and
//! the backward recursion that ties them together. The model layer in
//! `smoothing::models` builds on top of these primitives.
//!
//! Key behaviors
//! -------------
//! - Hold inputs in validated containers ([`ParticleSet`], [`LdsParams`],
//!   [`SmootherOptions`]) so the numerical code can index without checks.
//! - Express the linear and log-domain arithmetic as one strategy trait,
//!   [`WeightAlgebra`], with [`Linear`] and [`LogSpace`] implementations
//!   selected at run time from a [`WeightDomain`].
//! - Factor `Σ` once per model ([`Whitener`]), then score all particle pairs
//!   per step ([`TransitionScorer`]) and run the backward recursion
//!   ([`BackwardPass`]) while folding joint weights into a [`CrossMoment`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Particle tensors are laid out `[state, particle, time]`, forward and
//!   smoothed weights `[particle, time]`.
//! - `Σ` is symmetric positive definite; `S, N, T ≥ 1`.
//! - Forward-weight columns are normalized in the configured domain before
//!   the recursion starts ([`validation`]).
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; time `T−1` is the boundary where smoothed and
//!   forward weights coincide.
//! - Pairwise matrices put the particle at `t+1` on rows and the particle at
//!   `t` on columns.
//! - This module performs no I/O; per-step diagnostics are handed to a
//!   caller-supplied observer as [`StepReport`]s.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule: domain arithmetic, parameter
//!   and data validation, whitening against hand-computed values, pairwise
//!   scores against `statrs`' multivariate normal, the accumulator against
//!   explicit double sums, and the backward pass against a hand-computable
//!   scalar scenario in both domains.

pub mod accumulator;
pub mod backward;
pub mod data;
pub mod domain;
pub mod options;
pub mod params;
pub mod transition;
pub mod validation;
pub mod whitening;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::accumulator::CrossMoment;
pub use self::backward::{BackwardOutput, BackwardPass, StepReport, effective_sample_size};
pub use self::data::ParticleSet;
pub use self::domain::{Linear, LogSpace, WeightAlgebra, WeightDomain};
pub use self::options::{CancelToken, SmootherOptions};
pub use self::params::{LdsParams, LdsParamsBuilder};
pub use self::transition::{TransitionScorer, pairwise_log_density};
pub use self::validation::{validate_forward_weights, validate_state_dims};
pub use self::whitening::{WhitenedParticles, Whitener};
