//! rust_lds_smoother — fixed-interval particle smoothing for linear-Gaussian
//! state-space models, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the particle smoother to Python via the `_rust_lds_smoother`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes and the `smoothing` submodule
//! used by the `rust_lds_smoother` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`smoothing` and
//!   `numerical_stability`) as the public crate surface.
//! - Define `#[pyclass]` wrappers, a one-shot `#[pyfunction]`, and the
//!   `#[pymodule]` initializer for the `_rust_lds_smoother` extension.
//! - Register the `smoothing` submodule under `rust_lds_smoother` so that
//!   dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Python-visible types mirror the invariants and signatures of their Rust
//!   counterparts (`ParticleSmoother`, `SmoothOutcome`).
//!
//! Conventions
//! -----------
//! - Arrays cross the boundary as `float64` NumPy arrays in the same layouts
//!   as on the Rust side: particles `[state, particle, time]`, weights
//!   `[particle, time]`.
//! - `SmoothError` converts to `ValueError`; wrong input types raise
//!   `TypeError`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`smoothing`] (or
//!   `smoothing::prelude`) and can ignore the PyO3 items guarded by the
//!   `python-bindings` feature.
//! - The Python packaging layer imports `_rust_lds_smoother` and wraps its
//!   classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_smoother_pipeline.rs`.

pub mod numerical_stability;
pub mod smoothing;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    smoothing::{
        core::data::ParticleSet,
        models::smoother::{
            ParticleSmoother as RustParticleSmoother, SmoothOutcome as RustSmoothOutcome,
        },
    },
    utils::{build_lds_params, build_smoother_options, extract_f64_matrix, extract_f64_tensor},
};

/// ParticleSmoother — Python-facing wrapper around the Rust smoother.
///
/// Purpose
/// -------
/// Let Python callers build a smoother once for a parameter set and reuse it
/// across many particle sets (for example, once per EM iteration).
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `ParticleSmoother(transition, noise_cov, offset=None, mode="linear",
/// norm_tol=1e-10, verbose=False)`:
/// - `transition`, `noise_cov`: `S×S` array-likes.
/// - `offset`: optional length-`S` array-like; zeros when `None`.
/// - `mode`: `"linear"` or `"log"`; the domain of forward and smoothed
///   weights.
///
/// Notes
/// -----
/// - Construction raises `ValueError` if `noise_cov` is not symmetric
///   positive definite.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_lds_smoother.smoothing", name = "ParticleSmoother", frozen)]
pub struct PyParticleSmoother {
    inner: RustParticleSmoother,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyParticleSmoother {
    #[new]
    #[pyo3(
        signature = (transition, noise_cov, offset = None, mode = None, norm_tol = None, verbose = None),
        text_signature = "(transition, noise_cov, /, offset=None, mode='linear', norm_tol=1e-10, verbose=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, transition: &Bound<'py, PyAny>, noise_cov: &Bound<'py, PyAny>,
        offset: Option<&Bound<'py, PyAny>>, mode: Option<&str>, norm_tol: Option<f64>,
        verbose: Option<bool>,
    ) -> PyResult<Self> {
        let params = build_lds_params(py, transition, noise_cov, offset)?;
        let options = build_smoother_options(mode, norm_tol, verbose)?;
        Ok(PyParticleSmoother { inner: RustParticleSmoother::new(params, options)? })
    }

    /// Smooth one forward-filtered particle set.
    ///
    /// `states` is `S×N×T`, `forward` is `N×T` in the smoother's mode.
    #[pyo3(text_signature = "(self, states, forward, /)")]
    pub fn smooth<'py>(
        &self, states: &Bound<'py, PyAny>, forward: &Bound<'py, PyAny>,
    ) -> PyResult<PySmoothOutcome> {
        let data = ParticleSet::new(
            extract_f64_tensor(states, "states")?,
            extract_f64_matrix(forward, "forward")?,
        )?;
        Ok(PySmoothOutcome { inner: self.inner.smooth(&data)?, data })
    }

    /// Weight domain name (`"linear"` or `"log"`).
    #[getter]
    pub fn mode(&self) -> &'static str {
        self.inner.options().domain.as_str()
    }

    /// State dimension `S`.
    #[getter]
    pub fn state_dim(&self) -> usize {
        self.inner.params().state_dim()
    }
}

/// SmoothOutcome — smoothed weights and sufficient statistics for Python.
///
/// Holds the particle set it was computed from so that means and second
/// moments can be derived without passing the arrays back in.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_lds_smoother.smoothing", name = "SmoothOutcome", frozen)]
pub struct PySmoothOutcome {
    inner: RustSmoothOutcome,
    data: ParticleSet,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PySmoothOutcome {
    /// Smoothed weights `N×T` in the smoother's mode.
    #[getter]
    pub fn smoothed<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.smoothed.clone().into_pyarray(py)
    }

    /// Smoothed weights as linear probabilities.
    #[getter]
    pub fn smoothed_linear<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.smoothed_linear().into_pyarray(py)
    }

    /// Cross-time statistic `XfXp` (`S×S`, summed over transitions).
    #[getter]
    pub fn cross_moment<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.cross_moment.clone().into_pyarray(py)
    }

    /// Weight domain name.
    #[getter]
    pub fn mode(&self) -> &'static str {
        self.inner.domain.as_str()
    }

    /// Per-time effective sample sizes.
    #[getter]
    pub fn effective_sample_sizes<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.effective_sample_sizes().into_pyarray(py)
    }

    /// Smoothed means, `S×T`.
    pub fn smoothed_means<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.smoothed_means(&self.data)?.into_pyarray(py))
    }

    /// Marginal second moment `Σ_t Σ_j Ws x xᵀ`, `S×S`.
    pub fn second_moment<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.second_moment(&self.data)?.into_pyarray(py))
    }
}

/// smooth_particles — one-shot smoothing returning `(smoothed, cross_moment)`.
///
/// Parameters
/// ----------
/// - `states`: `S×N×T` float64 array.
/// - `forward`: `N×T` forward weights in `mode`.
/// - `transition`, `noise_cov`: `S×S` array-likes.
/// - `offset`: optional length-`S` array-like; zeros when `None`.
/// - `mode`: `"linear"` (default) or `"log"`.
///
/// Errors
/// ------
/// - `ValueError` for any smoothing error; `TypeError` for unusable inputs.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "smooth_particles",
    signature = (states, forward, transition, noise_cov, offset = None, mode = None),
    text_signature = "(states, forward, transition, noise_cov, /, offset=None, mode='linear')"
)]
pub fn py_smooth_particles<'py>(
    py: Python<'py>, states: &Bound<'py, PyAny>, forward: &Bound<'py, PyAny>,
    transition: &Bound<'py, PyAny>, noise_cov: &Bound<'py, PyAny>,
    offset: Option<&Bound<'py, PyAny>>, mode: Option<&str>,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray2<f64>>)> {
    let states = extract_f64_tensor(states, "states")?;
    let forward = extract_f64_matrix(forward, "forward")?;
    let params = build_lds_params(py, transition, noise_cov, offset)?;
    let options = build_smoother_options(mode, None, None)?;

    let out = crate::smoothing::models::smoother::smooth_particles(
        states.view(),
        forward.view(),
        &params,
        &options,
    )?;
    Ok((out.smoothed.into_pyarray(py), out.cross_moment.into_pyarray(py)))
}

/// _rust_lds_smoother — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `smoothing` submodule holding `ParticleSmoother`,
///   `SmoothOutcome` and `smooth_particles`, and attach it to the parent.
/// - Register the submodule in `sys.modules` so it is importable via a
///   dotted path from Python.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_lds_smoother<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let smoothing_mod = PyModule::new(_py, "smoothing")?;
    smoothing(_py, m, &smoothing_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_lds_smoother.smoothing", smoothing_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn smoothing<'py>(
    _py: Python, rust_lds_smoother: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyParticleSmoother>()?;
    m.add_class::<PySmoothOutcome>()?;
    m.add_function(wrap_pyfunction!(py_smooth_particles, m)?)?;
    rust_lds_smoother.add_submodule(m)?;
    Ok(())
}
