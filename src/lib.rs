//! Bioimage Transform
//!
//! General-purpose transforms for microscopy images, implemented in Rust
//! with Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Transforms operate on single 2D planes `(height, width)`; projections
//! reduce a stack `(height, width, depth)` to a plane.
//!
//! Supported element types:
//! - `bool`: binary masks
//! - `u8`, `u16`: integer intensities
//! - `f32`, `f64`: float intensities
//!
//! Every transform accepts anything implementing [`AsPlane`] (or
//! [`AsStack`]), so raw ndarray arrays and wrapped [`Image`]s are
//! interchangeable, and always returns a new [`Image`].
//!
//! ## Example
//! ```
//! use bioimage_transform::{threshold_otsu, remove_small_objects, Connectivity};
//! use ndarray::array;
//!
//! let plane = array![[1u8, 2, 3], [7, 8, 9]];
//! let mask = threshold_otsu(&plane, 1.0).unwrap();
//! let cleaned = remove_small_objects(&mask, 2, Connectivity::Four).unwrap();
//! assert_eq!(cleaned, array![[false, false, false], [true, true, true]]);
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod image;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{load_config, TransformConfig};
pub use error::{Result, TransformError};
pub use filters::{
    dilate_binary, erode_binary, find_edges_sobel, invert, max_intensity_projection,
    mean_intensity_projection, median_intensity_projection, min_intensity_projection,
    remove_small_objects, smooth_gaussian, sobel_h, sobel_v, threshold_otsu, Selem,
};
pub use image::{represent_as_image, AsPlane, AsStack, DType, Element, Image, PlaneView, Stack};
pub use selection::{label_components, Connectivity};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyTypeError;
    use pyo3::prelude::*;

    use crate::config::{
        DEFAULT_CONNECTIVITY, DEFAULT_GAUSSIAN_SIGMA, DEFAULT_MIN_SIZE, DEFAULT_OTSU_MULTIPLIER,
    };
    use crate::filters;
    use crate::filters::morphology::Selem;
    use crate::image::{AsPlane, Image, Stack};
    use crate::selection::Connectivity;

    // ========================================================================
    // numpy <-> Image
    // ========================================================================

    fn to_image<'py>(array: &Bound<'py, PyAny>) -> PyResult<Image> {
        if let Ok(a) = array.extract::<PyReadonlyArray2<'py, bool>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray2<'py, u8>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray2<'py, u16>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray2<'py, f32>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray2<'py, f64>>() {
            return Ok(a.as_array().to_owned().into());
        }
        Err(PyTypeError::new_err(
            "expected a 2-D numpy array of bool, uint8, uint16, float32 or float64",
        ))
    }

    fn to_stack<'py>(array: &Bound<'py, PyAny>) -> PyResult<Stack> {
        if let Ok(a) = array.extract::<PyReadonlyArray3<'py, bool>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray3<'py, u8>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray3<'py, u16>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray3<'py, f32>>() {
            return Ok(a.as_array().to_owned().into());
        }
        if let Ok(a) = array.extract::<PyReadonlyArray3<'py, f64>>() {
            return Ok(a.as_array().to_owned().into());
        }
        Err(PyTypeError::new_err(
            "expected a 3-D numpy array of bool, uint8, uint16, float32 or float64",
        ))
    }

    fn to_numpy(py: Python<'_>, image: Image) -> PyObject {
        match image {
            Image::Bool(a) => a.into_pyarray(py).into_any().unbind(),
            Image::U8(a) => a.into_pyarray(py).into_any().unbind(),
            Image::U16(a) => a.into_pyarray(py).into_any().unbind(),
            Image::F32(a) => a.into_pyarray(py).into_any().unbind(),
            Image::F64(a) => a.into_pyarray(py).into_any().unbind(),
        }
    }

    fn to_selem(selem: Option<&Bound<'_, PyAny>>) -> PyResult<Selem> {
        match selem {
            Some(s) => Ok(Selem::from_plane(&to_image(s)?)?),
            None => Ok(Selem::default()),
        }
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Per-pixel maximum across the last axis of a 3-D array.
    #[pyfunction]
    pub fn max_intensity_projection(py: Python<'_>, stack: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let stack = to_stack(stack)?;
        Ok(to_numpy(py, filters::max_intensity_projection(&stack)?))
    }

    /// Per-pixel minimum across the last axis of a 3-D array.
    #[pyfunction]
    pub fn min_intensity_projection(py: Python<'_>, stack: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let stack = to_stack(stack)?;
        Ok(to_numpy(py, filters::min_intensity_projection(&stack)?))
    }

    /// Per-pixel mean across the last axis; integer results keep their dtype.
    #[pyfunction]
    pub fn mean_intensity_projection(py: Python<'_>, stack: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let stack = to_stack(stack)?;
        Ok(to_numpy(py, filters::mean_intensity_projection(&stack)?))
    }

    /// Per-pixel median across the last axis.
    #[pyfunction]
    pub fn median_intensity_projection(py: Python<'_>, stack: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let stack = to_stack(stack)?;
        Ok(to_numpy(py, filters::median_intensity_projection(&stack)?))
    }

    // ========================================================================
    // Smoothing & Thresholding
    // ========================================================================

    /// Gaussian smoothing of a float32/float64 image.
    #[pyfunction]
    #[pyo3(signature = (image, sigma=DEFAULT_GAUSSIAN_SIGMA))]
    pub fn smooth_gaussian(py: Python<'_>, image: &Bound<'_, PyAny>, sigma: f64) -> PyResult<PyObject> {
        let image = to_image(image)?;
        Ok(to_numpy(py, filters::smooth_gaussian(&image, sigma)?))
    }

    /// Boolean image, true above the Otsu level times `multiplier`.
    #[pyfunction]
    #[pyo3(signature = (image, multiplier=DEFAULT_OTSU_MULTIPLIER))]
    pub fn threshold_otsu(py: Python<'_>, image: &Bound<'_, PyAny>, multiplier: f64) -> PyResult<PyObject> {
        let image = to_image(image)?;
        Ok(to_numpy(py, filters::threshold_otsu(&image, multiplier)?))
    }

    // ========================================================================
    // Binary Morphology
    // ========================================================================

    /// Binary dilation; `selem` defaults to the 3x3 cross.
    #[pyfunction]
    #[pyo3(signature = (image, selem=None))]
    pub fn dilate_binary(
        py: Python<'_>,
        image: &Bound<'_, PyAny>,
        selem: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let image = to_image(image)?;
        let selem = to_selem(selem)?;
        Ok(to_numpy(py, filters::dilate_binary(&image, &selem)?))
    }

    /// Binary erosion; `selem` defaults to the 3x3 cross.
    #[pyfunction]
    #[pyo3(signature = (image, selem=None))]
    pub fn erode_binary(
        py: Python<'_>,
        image: &Bound<'_, PyAny>,
        selem: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let image = to_image(image)?;
        let selem = to_selem(selem)?;
        Ok(to_numpy(py, filters::erode_binary(&image, &selem)?))
    }

    /// Remove connected components smaller than `min_size` pixels.
    ///
    /// `connectivity` is 1 (4-connected) or 2 (8-connected).
    #[pyfunction]
    #[pyo3(signature = (image, min_size=DEFAULT_MIN_SIZE, connectivity=DEFAULT_CONNECTIVITY))]
    pub fn remove_small_objects(
        py: Python<'_>,
        image: &Bound<'_, PyAny>,
        min_size: usize,
        connectivity: u8,
    ) -> PyResult<PyObject> {
        let image = to_image(image)?;
        let connectivity = Connectivity::from_rank(connectivity)?;
        Ok(to_numpy(py, filters::remove_small_objects(&image, min_size, connectivity)?))
    }

    // ========================================================================
    // Invert & Edges
    // ========================================================================

    /// Logical NOT for bool, `MAX - v` for uint8/uint16.
    #[pyfunction]
    pub fn invert(py: Python<'_>, image: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let image = to_image(image)?;
        Ok(to_numpy(py, filters::invert(&image)?))
    }

    /// Sobel gradient magnitude as float64; non-zero `mask` pixels are included.
    #[pyfunction]
    #[pyo3(signature = (image, mask=None))]
    pub fn find_edges_sobel(
        py: Python<'_>,
        image: &Bound<'_, PyAny>,
        mask: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let image = to_image(image)?;
        let mask = mask.map(to_image).transpose()?;
        let edges = filters::find_edges_sobel(&image, mask.as_ref().map(|m| m.as_plane()))?;
        Ok(to_numpy(py, edges))
    }

    /// Python module definition
    #[pymodule]
    pub fn bioimage_transform(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Projections
        m.add_function(wrap_pyfunction!(max_intensity_projection, m)?)?;
        m.add_function(wrap_pyfunction!(min_intensity_projection, m)?)?;
        m.add_function(wrap_pyfunction!(mean_intensity_projection, m)?)?;
        m.add_function(wrap_pyfunction!(median_intensity_projection, m)?)?;

        // Smoothing & thresholding
        m.add_function(wrap_pyfunction!(smooth_gaussian, m)?)?;
        m.add_function(wrap_pyfunction!(threshold_otsu, m)?)?;

        // Binary morphology
        m.add_function(wrap_pyfunction!(dilate_binary, m)?)?;
        m.add_function(wrap_pyfunction!(erode_binary, m)?)?;
        m.add_function(wrap_pyfunction!(remove_small_objects, m)?)?;

        // Invert & edges
        m.add_function(wrap_pyfunction!(invert, m)?)?;
        m.add_function(wrap_pyfunction!(find_edges_sobel, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::bioimage_transform;
