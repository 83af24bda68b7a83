//! WebAssembly exports for the transforms.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images are
//! passed as flat row-major buffers of `width * height` values.

use ndarray::Array2;
use wasm_bindgen::prelude::*;

use crate::error::TransformError;
use crate::filters;
use crate::image::Image;

fn plane_from_buffer<T: Clone>(data: &[T], width: usize, height: usize) -> Result<Array2<T>, JsValue> {
    Array2::from_shape_vec((height, width), data.to_vec()).map_err(|e| to_js(e.into()))
}

fn to_js(err: TransformError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn unexpected_output(image: &Image) -> JsValue {
    JsValue::from_str(&format!("unexpected output dtype {}", image.dtype()))
}

// ============================================================================
// Invert
// ============================================================================

/// Invert an 8-bit grayscale image.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
#[wasm_bindgen]
pub fn invert_u8_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let input = plane_from_buffer(data, width, height)?;
    match filters::invert(&input).map_err(to_js)? {
        Image::U8(a) => Ok(a.into_raw_vec_and_offset().0),
        other => Err(unexpected_output(&other)),
    }
}

// ============================================================================
// Otsu Threshold
// ============================================================================

/// Otsu threshold of an 8-bit grayscale image.
///
/// # Returns
/// Flat array of 0/1 bytes
#[wasm_bindgen]
pub fn threshold_otsu_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    multiplier: f64,
) -> Result<Vec<u8>, JsValue> {
    let input = plane_from_buffer(data, width, height)?;
    match filters::threshold_otsu(&input, multiplier).map_err(to_js)? {
        Image::Bool(a) => Ok(a.iter().map(|&v| u8::from(v)).collect()),
        other => Err(unexpected_output(&other)),
    }
}

// ============================================================================
// Gaussian Smoothing
// ============================================================================

/// Gaussian smoothing of a float image.
#[wasm_bindgen]
pub fn smooth_gaussian_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    sigma: f64,
) -> Result<Vec<f32>, JsValue> {
    let input = plane_from_buffer(data, width, height)?;
    match filters::smooth_gaussian(&input, sigma).map_err(to_js)? {
        Image::F32(a) => Ok(a.into_raw_vec_and_offset().0),
        other => Err(unexpected_output(&other)),
    }
}

// ============================================================================
// Sobel Edges
// ============================================================================

/// Sobel gradient magnitude of an 8-bit grayscale image.
///
/// # Returns
/// Flat array of floats, 0.0 at the image border
#[wasm_bindgen]
pub fn find_edges_sobel_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<f32>, JsValue> {
    let input = plane_from_buffer(data, width, height)?;
    match filters::find_edges_sobel(&input, None).map_err(to_js)? {
        Image::F64(a) => Ok(a.iter().map(|&v| v as f32).collect()),
        other => Err(unexpected_output(&other)),
    }
}
