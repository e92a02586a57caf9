//! Particle smoother model — validated entry points around the backward pass.
//!
//! Purpose
//! -------
//! Turn a parameter set and options into a reusable [`ParticleSmoother`],
//! and run it over forward-filtered particle sets. This layer owns the
//! validation order, the run-time dispatch from [`WeightDomain`] to the
//! generic recursion, optional logging, and the post-processing helpers on
//! [`SmoothOutcome`].
//!
//! Key behaviors
//! -------------
//! - [`ParticleSmoother::new`] factors `Σ` once; every subsequent
//!   [`ParticleSmoother::smooth`] call reuses the factor.
//! - [`smooth_particles`] is the one-shot, view-based equivalent.
//! - Inputs are checked in a fixed order before any numerical work: shapes,
//!   state dimension, forward-weight normalization. The free function
//!   factors `Σ` after those checks.
//! - With the `obs_slog` feature and `options.verbose`, one structured line
//!   per backward step and a closing summary are written to the terminal.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Ws[:, T−1] == Wf[:, T−1]` bit for bit; `T == 1` returns `(Wf, 0)`.
//! - `XfXp` is a sum over transitions, not an average.
//! - A smoother holds no mutable state, so one instance may serve concurrent
//!   callers.
use crate::smoothing::{
    core::{
        backward::{BackwardPass, StepReport, effective_sample_size},
        data::{ParticleSet, check_particle_shapes},
        domain::{Linear, LogSpace, WeightDomain},
        options::SmootherOptions,
        params::LdsParams,
        transition::TransitionScorer,
        validation::{validate_forward_weights, validate_state_dims},
        whitening::Whitener,
    },
    errors::{SmoothError, SmoothResult},
};
use ndarray::{Array1, Array2, ArrayView2, ArrayView3, Axis};

/// Result of a smoothing call.
///
/// Fields
/// ------
/// - `smoothed`: `Array2<f64>`
///   Smoothed weights `Ws[particle, time]`, `N×T`, in `domain`.
/// - `cross_moment`: `Array2<f64>`
///   `XfXp = Σ_t Σ_{k,j} Wxx_t[k, j] · x_{t+1}^{(k)} (x_t^{(j)})ᵀ`, `S×S`.
/// - `domain`: [`WeightDomain`]
///   Domain of `smoothed` (the same as the forward weights).
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothOutcome {
    /// Smoothed weights `Ws`.
    pub smoothed: Array2<f64>,
    /// Cross-time sufficient statistic `XfXp`.
    pub cross_moment: Array2<f64>,
    /// Domain of `smoothed`.
    pub domain: WeightDomain,
}

impl SmoothOutcome {
    /// Number of backward transitions folded into `cross_moment` (`T − 1`).
    pub fn n_transitions(&self) -> usize {
        self.smoothed.ncols().saturating_sub(1)
    }

    /// Smoothed weights as linear probabilities, whatever the domain.
    pub fn smoothed_linear(&self) -> Array2<f64> {
        let domain = self.domain;
        self.smoothed.mapv(|w| domain.to_linear(w))
    }

    /// Per-time effective sample size `1 / Σ_j Ws[j, t]²`.
    pub fn effective_sample_sizes(&self) -> Array1<f64> {
        let linear = self.smoothed_linear();
        linear.columns().into_iter().map(|col| effective_sample_size(col.iter().copied())).collect()
    }

    /// Smoothed posterior means `Σ_j Ws[j, t] · x_t^{(j)}`, shape `S×T`.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::ParticleCountMismatch` / `TimeLengthMismatch` if
    ///   `data` is not the particle set this outcome was computed from.
    pub fn smoothed_means(&self, data: &ParticleSet) -> SmoothResult<Array2<f64>> {
        self.check_matches(data)?;
        let linear = self.smoothed_linear();
        let mut means = Array2::<f64>::zeros((data.state_dim(), data.n_steps()));
        for (t, mut col) in means.columns_mut().into_iter().enumerate() {
            col.assign(&data.states_at(t).dot(&linear.column(t)));
        }
        Ok(means)
    }

    /// Marginal second moment `Σ_t Σ_j Ws[j, t] · x_t^{(j)} (x_t^{(j)})ᵀ`,
    /// shape `S×S`, summed over all `T` times.
    ///
    /// Errors
    /// ------
    /// - As for [`SmoothOutcome::smoothed_means`].
    pub fn second_moment(&self, data: &ParticleSet) -> SmoothResult<Array2<f64>> {
        self.check_matches(data)?;
        let linear = self.smoothed_linear();
        let s = data.state_dim();
        let mut total = Array2::<f64>::zeros((s, s));
        for t in 0..data.n_steps() {
            let x_t = data.states_at(t);
            let weighted = &x_t * &linear.column(t).insert_axis(Axis(0));
            total += &weighted.dot(&x_t.t());
        }
        Ok(total)
    }

    fn check_matches(&self, data: &ParticleSet) -> SmoothResult<()> {
        let (n, t) = self.smoothed.dim();
        if data.n_particles() != n {
            return Err(SmoothError::ParticleCountMismatch {
                expected: n,
                actual: data.n_particles(),
            });
        }
        if data.n_steps() != t {
            return Err(SmoothError::TimeLengthMismatch { expected: t, actual: data.n_steps() });
        }
        Ok(())
    }
}

/// ParticleSmoother — fixed-interval smoother for one linear-Gaussian model.
///
/// Parameters
/// ----------
/// - `params`: [`LdsParams`]
///   Transition `(A, Σ, μ)`; `Σ` is factored at construction.
/// - `options`: [`SmootherOptions`]
///   Weight domain, normalization tolerance, verbosity, cancellation.
///
/// Notes
/// -----
/// - Construction fails with a numerical error if `Σ` is not symmetric
///   positive definite.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSmoother {
    params: LdsParams,
    options: SmootherOptions,
    whitener: Whitener,
}

impl ParticleSmoother {
    /// Build a smoother and factor the noise covariance.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::NonSymmetricCovariance` / `NotPositiveDefinite` from
    ///   [`Whitener::new`].
    pub fn new(params: LdsParams, options: SmootherOptions) -> SmoothResult<Self> {
        let whitener = Whitener::new(&params)?;
        Ok(ParticleSmoother { params, options, whitener })
    }

    /// Model parameters.
    pub fn params(&self) -> &LdsParams {
        &self.params
    }

    /// Run-time options.
    pub fn options(&self) -> &SmootherOptions {
        &self.options
    }

    /// Smooth a validated particle set.
    ///
    /// Errors
    /// ------
    /// - Shape: `StateDimMismatch`.
    /// - Config: forward-weight violations from
    ///   [`validate_forward_weights`].
    /// - Numerical: `DegenerateDenominator`, `NonFiniteResult`.
    /// - `Cancelled` when the options' token fires.
    pub fn smooth(&self, data: &ParticleSet) -> SmoothResult<SmoothOutcome> {
        self.smooth_views(data.states.view(), data.forward.view())
    }

    /// Smooth borrowed arrays without building a [`ParticleSet`].
    ///
    /// Same errors as [`ParticleSmoother::smooth`], plus the shape and
    /// finiteness checks of [`ParticleSet::new`].
    pub fn smooth_views(
        &self, states: ArrayView3<'_, f64>, forward: ArrayView2<'_, f64>,
    ) -> SmoothResult<SmoothOutcome> {
        check_particle_shapes(states, forward)?;
        validate_state_dims(states.len_of(Axis(0)), self.params.state_dim())?;
        validate_forward_weights(forward, self.options.domain, self.options.norm_tol)?;
        run_backward(&self.whitener, states, forward, &self.options)
    }
}

/// One-shot smoothing on `ndarray` views.
///
/// Equivalent to `ParticleSmoother::new(params, options)?.smooth_views(..)`,
/// except that all input checks run before `Σ` is factored, so shape and
/// configuration errors take precedence over numerical ones.
///
/// Parameters
/// ----------
/// - `states`: `ArrayView3<f64>`
///   Particle tensor `X[state, particle, time]`, `S×N×T`.
/// - `forward`: `ArrayView2<f64>`
///   Forward weights `Wf[particle, time]`, `N×T`, in `options.domain`.
/// - `params`: `&LdsParams`
/// - `options`: `&SmootherOptions`
///
/// Returns
/// -------
/// `SmoothResult<SmoothOutcome>`
pub fn smooth_particles(
    states: ArrayView3<'_, f64>, forward: ArrayView2<'_, f64>, params: &LdsParams,
    options: &SmootherOptions,
) -> SmoothResult<SmoothOutcome> {
    check_particle_shapes(states, forward)?;
    validate_state_dims(states.len_of(Axis(0)), params.state_dim())?;
    validate_forward_weights(forward, options.domain, options.norm_tol)?;
    let whitener = Whitener::new(params)?;
    run_backward(&whitener, states, forward, options)
}

// ---- Helper methods ----

fn run_backward(
    whitener: &Whitener, states: ArrayView3<'_, f64>, forward: ArrayView2<'_, f64>,
    options: &SmootherOptions,
) -> SmoothResult<SmoothOutcome> {
    let whitened = whitener.whiten(states);
    let scorer = TransitionScorer::new(&whitened, whitener.log_norm());
    let pass = BackwardPass::new(states.view(), forward.view(), scorer, options.cancel.as_ref());

    #[cfg(feature = "obs_slog")]
    let logger = options.verbose.then(term_logger);

    let observe = |report: &StepReport| {
        #[cfg(feature = "obs_slog")]
        if let Some(log) = &logger {
            slog::info!(log, "backward step";
                "t" => report.t,
                "ess" => report.ess,
                "min_normalizer" => report.min_normalizer
            );
        }
        #[cfg(not(feature = "obs_slog"))]
        let _ = report;
    };

    let out = match options.domain {
        WeightDomain::Linear => pass.run::<Linear>(observe)?,
        WeightDomain::Log => pass.run::<LogSpace>(observe)?,
    };
    let outcome = SmoothOutcome {
        smoothed: out.smoothed,
        cross_moment: out.cross_moment,
        domain: options.domain,
    };

    #[cfg(feature = "obs_slog")]
    if let Some(log) = &logger {
        let min_ess = outcome.effective_sample_sizes().iter().copied().fold(f64::INFINITY, f64::min);
        slog::info!(log, "smoothing finished";
            "domain" => options.domain.as_str(),
            "transitions" => outcome.n_transitions(),
            "min_ess" => min_ess
        );
    }

    Ok(outcome)
}

#[cfg(feature = "obs_slog")]
fn term_logger() -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, slog::o!("component" => "particle_smoother"))
}
