//! Core utilities shared by the transforms.
//!
//! - Gaussian kernel generation
//! - Border handling for neighbourhood reads
//! - Separable correlation
//! - Row-parallel plane construction
//! - Conversion of any plane to unit-range floats

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::Result;
use crate::image::PlaneView;

/// How neighbourhood reads outside the plane are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Replicate the edge pixel (`a a | a b c | c c`).
    Nearest,
    /// Mirror about the edge, edge pixel included (`b a | a b c | c b`).
    Reflect,
}

impl BorderMode {
    /// Map a possibly out-of-range index onto `0..len`.
    ///
    /// `len` must be non-zero.
    #[inline]
    pub fn resolve(self, index: isize, len: usize) -> usize {
        let n = len as isize;
        match self {
            BorderMode::Nearest => index.clamp(0, n - 1) as usize,
            BorderMode::Reflect => {
                if n == 1 {
                    return 0;
                }
                let period = 2 * n;
                let i = index.rem_euclid(period);
                if i < n {
                    i as usize
                } else {
                    (period - 1 - i) as usize
                }
            }
        }
    }
}

/// Generate a normalized 1D Gaussian kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian
/// * `truncate` - Kernel half-width in standard deviations
///
/// # Returns
/// Kernel of length `2 * radius + 1` with `radius = floor(truncate * sigma + 0.5)`
pub fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    let radius = (truncate * sigma + 0.5).max(0.0) as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    // Normalize
    let sum: f64 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Build a plane by evaluating `f(y, x)` for every pixel, rows in parallel.
pub fn par_from_fn<T, F>(shape: (usize, usize), f: F) -> Result<Array2<T>>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    let (height, width) = shape;
    let f = &f;
    let data: Vec<T> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| (0..width).map(move |x| f(y, x)))
        .collect();
    Ok(Array2::from_shape_vec(shape, data)?)
}

/// Correlate a plane with a separable kernel.
///
/// `row_kernel` runs along x, `col_kernel` along y. Each kernel is centred
/// at `len / 2`; `out[x] = sum_k kernel[k] * in[x + k - len / 2]`.
pub fn correlate_separable(
    input: ArrayView2<'_, f64>,
    row_kernel: &[f64],
    col_kernel: &[f64],
    mode: BorderMode,
) -> Result<Array2<f64>> {
    let horizontal = correlate_axis(input, row_kernel, Axis(1), mode)?;
    correlate_axis(horizontal.view(), col_kernel, Axis(0), mode)
}

fn correlate_axis(
    input: ArrayView2<'_, f64>,
    kernel: &[f64],
    axis: Axis,
    mode: BorderMode,
) -> Result<Array2<f64>> {
    let (height, width) = input.dim();
    let half = (kernel.len() / 2) as isize;

    par_from_fn((height, width), |y, x| {
        let mut sum = 0.0f64;
        for (ki, &kv) in kernel.iter().enumerate() {
            let offset = ki as isize - half;
            let v = if axis == Axis(1) {
                input[[y, mode.resolve(x as isize + offset, width)]]
            } else {
                input[[mode.resolve(y as isize + offset, height), x]]
            };
            sum += v * kv;
        }
        sum
    })
}

/// Convert any plane to `f64` in the conventional unit range.
///
/// `bool` maps to 0/1, unsigned integers are divided by their maximum,
/// floats are taken as-is.
pub fn plane_to_unit_float(view: PlaneView<'_>) -> Array2<f64> {
    match view {
        PlaneView::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
        PlaneView::U8(a) => a.mapv(|v| v as f64 / u8::MAX as f64),
        PlaneView::U16(a) => a.mapv(|v| v as f64 / u16::MAX as f64),
        PlaneView::F32(a) => a.mapv(|v| v as f64),
        PlaneView::F64(a) => a.to_owned(),
    }
}
