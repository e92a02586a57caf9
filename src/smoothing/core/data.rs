//! Particle sets — forward-filtered particle trajectories plus their weights.
//!
//! Purpose
//! -------
//! Hold the output of an upstream forward particle filter in the layout the
//! smoother consumes: a particle tensor `X[state, particle, time]` and a
//! forward-weight matrix `Wf[particle, time]`. Construction enforces shape
//! agreement and finiteness of the states so downstream code can index
//! freely.
//!
//! Key behaviors
//! -------------
//! - [`ParticleSet::new`] validates `X: S×N×T`, `Wf: N×T` with `S, N, T ≥ 1`
//!   and finite states.
//! - Dimension accessors and per-time views (`states_at`, `weights_at`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Forward weights are *not* domain-checked here: whether a column must sum
//!   to one or log-sum-exp to zero depends on the smoother's configured
//!   domain, and is checked by `validation::validate_forward_weights` at
//!   smoothing time.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based: time runs `0..T`, and `T-1` is the boundary where
//!   smoothed weights equal forward weights.
use crate::smoothing::errors::{SmoothError, SmoothResult};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

/// ParticleSet — validated particle tensor and forward weights.
///
/// Fields
/// ------
/// - `states`: `Array3<f64>`
///   Particle tensor `X[state, particle, time]`, shape `S×N×T`, finite.
/// - `forward`: `Array2<f64>`
///   Forward filter weights `Wf[particle, time]`, shape `N×T`.
///
/// Invariants
/// ----------
/// - `S, N, T ≥ 1`.
/// - `forward.dim() == (N, T)`.
/// - All entries of `states` are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    /// Particle tensor `X[state, particle, time]`.
    pub states: Array3<f64>,
    /// Forward weights `Wf[particle, time]`.
    pub forward: Array2<f64>,
}

impl ParticleSet {
    /// Construct a validated particle set.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::EmptyDimension` when `S`, `N` or `T` is zero.
    /// - `SmoothError::ParticleCountMismatch` / `TimeLengthMismatch` when the
    ///   forward weights disagree with the tensor.
    /// - `SmoothError::NonFiniteInput` for NaN/±∞ particle states.
    pub fn new(states: Array3<f64>, forward: Array2<f64>) -> SmoothResult<Self> {
        check_particle_shapes(states.view(), forward.view())?;
        Ok(ParticleSet { states, forward })
    }

    /// State dimension `S`.
    pub fn state_dim(&self) -> usize {
        self.states.len_of(Axis(0))
    }

    /// Number of particles `N`.
    pub fn n_particles(&self) -> usize {
        self.states.len_of(Axis(1))
    }

    /// Number of time steps `T`.
    pub fn n_steps(&self) -> usize {
        self.states.len_of(Axis(2))
    }

    /// `S×N` view of all particle states at time `t`.
    ///
    /// Panics if `t >= T`.
    pub fn states_at(&self, t: usize) -> ArrayView2<'_, f64> {
        self.states.index_axis(Axis(2), t)
    }

    /// Length-`N` view of forward weights at time `t`.
    ///
    /// Panics if `t >= T`.
    pub fn weights_at(&self, t: usize) -> ArrayView1<'_, f64> {
        self.forward.column(t)
    }

    /// States and forward weights at time `t` as one pair.
    ///
    /// Panics if `t >= T`.
    pub fn time_slice(&self, t: usize) -> (ArrayView2<'_, f64>, ArrayView1<'_, f64>) {
        (self.states_at(t), self.weights_at(t))
    }
}

/// Shape and finiteness checks shared by [`ParticleSet::new`] and the
/// view-based entry point.
pub(crate) fn check_particle_shapes(
    states: ArrayView3<'_, f64>, forward: ArrayView2<'_, f64>,
) -> SmoothResult<()> {
    let (s, n, t) = states.dim();
    if s == 0 {
        return Err(SmoothError::EmptyDimension { what: "state dimension" });
    }
    if n == 0 {
        return Err(SmoothError::EmptyDimension { what: "particle count" });
    }
    if t == 0 {
        return Err(SmoothError::EmptyDimension { what: "time length" });
    }
    if forward.nrows() != n {
        return Err(SmoothError::ParticleCountMismatch { expected: n, actual: forward.nrows() });
    }
    if forward.ncols() != t {
        return Err(SmoothError::TimeLengthMismatch { expected: t, actual: forward.ncols() });
    }
    for ((i, j, k), &value) in states.indexed_iter() {
        if !value.is_finite() {
            return Err(SmoothError::NonFiniteInput {
                what: "particle state",
                index: vec![i, j, k],
                value,
            });
        }
    }
    Ok(())
}
