//! Python-side argument extraction for the smoothing bindings.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! converts loosely typed Python inputs (NumPy arrays, pandas objects,
//! nested sequences, mode strings) into the validated Rust types the
//! smoother expects. Validation errors surface as `ValueError`, wrong input
//! types as `TypeError`.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Array3};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::smoothing::core::{
    domain::WeightDomain, options::SmootherOptions, params::LdsParams,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3,
};

/// One-dimensional `float64` input as a contiguous read-only array.
///
/// Accepts a contiguous NumPy array, anything with `to_numpy()` (pandas
/// `Series`), or a sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Two-dimensional `float64` input copied into an owned `Array2`.
///
/// Accepts a NumPy array, anything with `to_numpy()` (pandas `DataFrame`),
/// or a rectangular sequence of sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>, name: &str) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err(format!(
            "{name} must be a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64"
        ))
    })?;
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err(format!("{name} must be rectangular")));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| PyValueError::new_err(format!("{name}: {e}")))
}

/// Three-dimensional `float64` particle tensor copied into an owned `Array3`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_tensor<'py>(raw_data: &Bound<'py, PyAny>, name: &str) -> PyResult<Array3<f64>> {
    let arr_ro = raw_data.extract::<PyReadonlyArray3<f64>>().map_err(|_| {
        PyTypeError::new_err(format!("{name} must be a 3-D numpy.ndarray of float64"))
    })?;
    Ok(arr_ro.as_array().to_owned())
}

/// Assemble validated [`LdsParams`] from Python inputs.
#[cfg(feature = "python-bindings")]
pub fn build_lds_params<'py>(
    py: Python<'py>, transition: &Bound<'py, PyAny>, noise_cov: &Bound<'py, PyAny>,
    offset: Option<&Bound<'py, PyAny>>,
) -> PyResult<LdsParams> {
    let transition = extract_f64_matrix(transition, "transition")?;
    let noise_cov = extract_f64_matrix(noise_cov, "noise_cov")?;
    let offset = match offset {
        Some(raw) => {
            let arr = extract_f64_array(py, raw)?;
            Array1::from(arr.as_slice()?.to_vec())
        }
        None => Array1::zeros(transition.nrows()),
    };
    Ok(LdsParams::new(transition, noise_cov, offset)?)
}

/// Build [`SmootherOptions`] from optional Python keyword arguments.
///
/// `mode` accepts the same spellings as [`WeightDomain`]'s `FromStr`
/// (`"linear"`, `"lin"`, `"log"`, `"log-domain"`); default `"linear"`.
#[cfg(feature = "python-bindings")]
pub fn build_smoother_options(
    mode: Option<&str>, norm_tol: Option<f64>, verbose: Option<bool>,
) -> PyResult<SmootherOptions> {
    let defaults = SmootherOptions::default();
    let domain: WeightDomain = match mode {
        Some(m) => m.parse()?,
        None => defaults.domain,
    };
    Ok(SmootherOptions::new(
        domain,
        norm_tol.unwrap_or(defaults.norm_tol),
        verbose.unwrap_or(defaults.verbose),
    )?)
}
