//! Gaussian smoothing of floating-point planes.
//!
//! Uses separable 2-pass correlation with a normalized, truncated kernel.
//! Reads beyond the plane replicate the nearest edge pixel.

use log::{debug, trace};
use ndarray::{Array2, ArrayView2};

use super::core::{correlate_separable, gaussian_kernel_1d, BorderMode};
use crate::config::DEFAULT_GAUSSIAN_TRUNCATE;
use crate::error::{Result, TransformError};
use crate::image::{represent_as_image, AsPlane, Element, Image, PlaneView};

/// Apply an isotropic Gaussian blur.
///
/// # Arguments
/// * `input` - Float plane (float32 or float64)
/// * `sigma` - Standard deviation in pixels; `<= 0` returns a copy
///
/// # Returns
/// Smoothed plane with the input dtype
///
/// # Errors
/// `TypeContract` if the input is not floating point.
pub fn smooth_gaussian<P: AsPlane + ?Sized>(input: &P, sigma: f64) -> Result<Image> {
    smooth_gaussian_truncated(input, sigma, DEFAULT_GAUSSIAN_TRUNCATE)
}

/// [`smooth_gaussian`] with an explicit kernel truncation, in standard deviations.
pub fn smooth_gaussian_truncated<P: AsPlane + ?Sized>(
    input: &P,
    sigma: f64,
    truncate: f64,
) -> Result<Image> {
    let view = input.as_plane();
    debug!(
        "smooth_gaussian: dtype={} shape={:?} sigma={} truncate={}",
        view.dtype(),
        view.shape(),
        sigma,
        truncate
    );

    match view {
        PlaneView::F32(a) => Ok(represent_as_image(blur(a, sigma, truncate)?)),
        PlaneView::F64(a) => Ok(represent_as_image(blur(a, sigma, truncate)?)),
        other => Err(TransformError::type_contract(
            "smooth_gaussian",
            "floating-point",
            other.dtype(),
        )),
    }
}

fn blur<T: Element>(input: ArrayView2<'_, T>, sigma: f64, truncate: f64) -> Result<Array2<T>> {
    if sigma <= 0.0 {
        return Ok(input.to_owned());
    }

    let kernel = gaussian_kernel_1d(sigma, truncate);
    trace!("smooth_gaussian: kernel radius {}", kernel.len() / 2);

    // Work in f64 for precision
    let wide = input.mapv(|v| v.to_f64());
    let result = correlate_separable(wide.view(), &kernel, &kernel, BorderMode::Nearest)?;
    Ok(result.mapv(T::from_f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DType;
    use ndarray::{array, Array2};

    #[test]
    fn test_impulse_matches_reference() {
        let input = array![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
        let expected = array![
            [0.05855018, 0.09653293, 0.05855018],
            [0.09653293, 0.15915589, 0.09653293],
            [0.05855018, 0.09653293, 0.05855018]
        ];

        let result = smooth_gaussian(&input, 1.0).unwrap();
        let smoothed = result.as_f64().unwrap();
        for (a, b) in smoothed.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_f32_stays_f32() {
        let input = Array2::<f32>::ones((4, 4));
        let result = smooth_gaussian(&input, 1.5).unwrap();
        assert_eq!(result.dtype(), DType::F32);
        // Constant plane is a fixed point under nearest-edge blur
        assert!(result.as_f32().unwrap().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_preserves_mass_away_from_border() {
        let mut input = Array2::<f64>::zeros((21, 21));
        input[[10, 10]] = 1.0;
        let result = smooth_gaussian(&input, 2.0).unwrap();
        let sum: f64 = result.as_f64().unwrap().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sigma_is_copy() {
        let input = array![[0.25, 0.5], [0.75, 1.0]];
        assert_eq!(smooth_gaussian(&input, 0.0).unwrap(), input);
    }

    #[test]
    fn test_rejects_integer_and_bool() {
        let input = array![[0u8, 1], [2, 3]];
        assert!(matches!(
            smooth_gaussian(&input, 1.0),
            Err(TransformError::TypeContract { found: DType::U8, .. })
        ));
        let input = array![[true, false]];
        assert!(matches!(
            smooth_gaussian(&input, 1.0),
            Err(TransformError::TypeContract { found: DType::Bool, .. })
        ));
    }
}
