//! Backward recursion — smoothed weights and the cross-time statistic.
//!
//! Purpose
//! -------
//! Run the fixed-interval backward pass over a forward-filtered particle
//! set. Starting from the boundary condition `Ws[:, T−1] = Wf[:, T−1]`, each
//! step `t = T−2, …, 0` combines the smoothed weights at `t+1`, the forward
//! weights at `t`, and the pairwise transition scores into
//!
//! ```text
//! D[k]     = ⊕_m  P[k, m] ⊗ Wf[m, t]                 (backward normalizer)
//! Wxx[k,j] = Wf[j, t] ⊗ P[k, j] ⊗ Ws[k, t+1] ⊘ D[k]  (joint weight)
//! Ws[j, t] = ⊕_k Wxx[k, j]                           (smoothed weight)
//! XfXp    += Σ_{k,j} Wxx[k, j] · x_{t+1}^{(k)} (x_t^{(j)})ᵀ
//! ```
//!
//! where `(⊗, ⊘, ⊕)` are `(×, ÷, Σ)` in the linear domain and
//! `(+, −, log-sum-exp)` in the log domain. `Wf[j, t] ⊗ P[k, j]` is one of
//! the terms of `D[k]`, so every joint weight is bounded by `Ws[k, t+1]`
//! even when `D[k]` is tiny; the backward ratio `Ws ⊗ P ⊘ D` is never formed
//! on its own.
//!
//! Key behaviors
//! -------------
//! - [`BackwardPass::run`] is generic over a [`WeightAlgebra`]; the same
//!   code is the linear and the log-domain recursion, so the two agree by
//!   construction up to rounding.
//! - The joint weights are consumed immediately by the [`CrossMoment`]
//!   accumulator and never stored across steps.
//! - A per-step [`StepReport`] is handed to a caller-supplied observer for
//!   logging; the recursion itself performs no I/O.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs were validated upstream: shapes agree, forward columns are
//!   normalized in the domain of `W`.
//! - Time is strictly sequential: step `t` reads `Ws[:, t+1]`.
//! - A degenerate normalizer `D[k]` (zero forward support for particle `k`
//!   at `t+1`) is a hard [`SmoothError::DegenerateDenominator`]; there is no
//!   fallback reweighting.
//! - Cancellation is polled before every step; a cancelled pass returns
//!   [`SmoothError::Cancelled`] and discards all partial results.
use crate::smoothing::{
    core::{
        accumulator::CrossMoment, domain::WeightAlgebra, options::CancelToken,
        transition::TransitionScorer,
    },
    errors::{SmoothError, SmoothResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis, Zip};

/// Diagnostics for one completed backward step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Time index whose smoothed weights were just produced.
    pub t: usize,
    /// Effective sample size `1 / Σ_j w_j²` of the new smoothed column.
    pub ess: f64,
    /// Smallest backward normalizer `D[k]`, in the recursion's domain.
    pub min_normalizer: f64,
}

/// Raw output of a backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardOutput {
    /// Smoothed weights `Ws`, `N×T`, in the recursion's domain.
    pub smoothed: Array2<f64>,
    /// Cross-time sufficient statistic `XfXp`, `S×S`, a sum over steps.
    pub cross_moment: Array2<f64>,
}

/// BackwardPass — inputs bound for one backward recursion.
///
/// Fields
/// ------
/// - `states`: `S×N×T` particle tensor (raw, not whitened; the accumulator
///   needs original coordinates).
/// - `forward`: `N×T` forward weights in the domain the pass will run in.
/// - `scorer`: pairwise transition scorer over the whitened tensor.
/// - `cancel`: optional cancellation token.
#[derive(Debug, Clone, Copy)]
pub struct BackwardPass<'a> {
    states: ArrayView3<'a, f64>,
    forward: ArrayView2<'a, f64>,
    scorer: TransitionScorer<'a>,
    cancel: Option<&'a CancelToken>,
}

impl<'a> BackwardPass<'a> {
    /// Bind the inputs of a backward pass.
    pub fn new(
        states: ArrayView3<'a, f64>, forward: ArrayView2<'a, f64>, scorer: TransitionScorer<'a>,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        BackwardPass { states, forward, scorer, cancel }
    }

    /// Run the recursion in the domain of `W`.
    ///
    /// Parameters
    /// ----------
    /// - `observe`: called once per completed step, from `t = T−2` down to
    ///   `t = 0`.
    ///
    /// Returns
    /// -------
    /// `SmoothResult<BackwardOutput>`
    ///   Smoothed weights in `W`'s domain and the accumulated `XfXp`. For
    ///   `T == 1` this is `(Wf, 0)` and `observe` is never called.
    ///
    /// Errors
    /// ------
    /// - `SmoothError::Cancelled { t }` if the token fires before step `t`.
    /// - `SmoothError::DegenerateDenominator { t, particle, .. }` when
    ///   `D[particle]` is degenerate at step `t`.
    /// - `SmoothError::NonFiniteResult` if a smoothed weight or the
    ///   statistic stops being finite.
    pub fn run<W: WeightAlgebra>(
        &self, mut observe: impl FnMut(&StepReport),
    ) -> SmoothResult<BackwardOutput> {
        let s = self.states.len_of(Axis(0));
        let n_steps = self.forward.ncols();

        let mut smoothed = self.forward.to_owned();
        let mut acc = CrossMoment::new(s);

        for t in (0..n_steps.saturating_sub(1)).rev() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SmoothError::Cancelled { t });
            }

            let forward_t = self.forward.column(t);
            let smoothed_next = smoothed.column(t + 1).to_owned();

            // Transition scores, overwritten in place by the joint weights.
            let mut joint = self.scorer.score::<W>(t);
            let normalizers = backward_normalizers::<W>(joint.view(), &forward_t, t)?;

            Zip::from(joint.rows_mut()).and(&smoothed_next).and(&normalizers).for_each(
                |mut row, &ws, &d| {
                    Zip::from(&mut row).and(&forward_t).for_each(|p, &wf| {
                        *p = W::div(W::mul(W::mul(wf, *p), ws), d);
                    });
                },
            );

            let mut column = Array1::<f64>::zeros(forward_t.len());
            Zip::from(&mut column)
                .and(joint.columns())
                .for_each(|out, col| *out = W::sum(col.iter().copied()));
            if column.iter().any(|&w| w.is_nan() || w == f64::INFINITY) {
                return Err(SmoothError::NonFiniteResult { what: "smoothed weight", t });
            }

            // Linear scale for the accumulator.
            joint.mapv_inplace(W::to_linear);

            acc.add_weighted_outer(
                self.states.index_axis(Axis(2), t + 1),
                joint.view(),
                self.states.index_axis(Axis(2), t),
            )?;
            if acc.total().iter().any(|v| !v.is_finite()) {
                return Err(SmoothError::NonFiniteResult { what: "cross moment", t });
            }

            let report = StepReport {
                t,
                ess: effective_sample_size(column.iter().map(|&w| W::to_linear(w))),
                min_normalizer: normalizers.iter().copied().fold(f64::INFINITY, f64::min),
            };
            smoothed.column_mut(t).assign(&column);
            observe(&report);
        }

        Ok(BackwardOutput { smoothed, cross_moment: acc.into_total() })
    }
}

/// `1 / Σ wᵢ²` for linear weights summing to one; `0` for an all-zero input.
pub fn effective_sample_size<I>(weights: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let sum_sq: f64 = weights.into_iter().map(|w| w * w).sum();
    if sum_sq > 0.0 { 1.0 / sum_sq } else { 0.0 }
}

// ---- Helper methods ----

fn backward_normalizers<W: WeightAlgebra>(
    scores: ArrayView2<'_, f64>, forward_t: &ArrayView1<'_, f64>, t: usize,
) -> SmoothResult<Array1<f64>> {
    let mut normalizers = Array1::<f64>::zeros(scores.nrows());
    for (particle, (row, d)) in scores.rows().into_iter().zip(normalizers.iter_mut()).enumerate() {
        let value = W::sum(row.iter().zip(forward_t.iter()).map(|(&p, &wf)| W::mul(p, wf)));
        if W::is_degenerate(value) {
            return Err(SmoothError::DegenerateDenominator { t, particle, value });
        }
        *d = value;
    }
    Ok(normalizers)
}
