//! Edge detection: Sobel gradients and gradient magnitude.
//!
//! Any plane dtype is accepted and first converted to unit-range floats
//! (`u8 / 255`, `u16 / 65535`, `bool` as 0/1). The output is always `f64`.
//!
//! ## Kernels
//!
//! ```text
//! horizontal edges      vertical edges
//!  1  2  1               1  0 -1
//!  0  0  0     / 4       2  0 -2     / 4
//! -1 -2 -1               1  0 -1
//! ```
//!
//! Both are applied as correlations with reflected borders. Pixels on the
//! plane border, and pixels next to an excluded mask pixel, are set to 0 since
//! their 3x3 neighbourhood is incomplete.

use log::debug;
use ndarray::Array2;

use super::core::{correlate_separable, par_from_fn, plane_to_unit_float, BorderMode};
use crate::error::{Result, TransformError};
use crate::image::{dispatch_plane, represent_as_image, AsPlane, Element, Image, PlaneView};

const SMOOTH: [f64; 3] = [0.25, 0.5, 0.25];
const DIFF: [f64; 3] = [1.0, 0.0, -1.0];

/// Which gradient component to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gradient {
    Horizontal,
    Vertical,
}

// ============================================================================
// Sobel
// ============================================================================

/// Signed response to horizontal edges (intensity changing along y).
///
/// # Arguments
/// * `input` - Plane of any dtype
/// * `mask` - Optional plane of the same shape; non-zero pixels are included
pub fn sobel_h<P: AsPlane + ?Sized>(input: &P, mask: Option<PlaneView<'_>>) -> Result<Image> {
    let view = input.as_plane();
    let valid = valid_pixels(view.shape(), mask)?;
    let gradient = gradient(view, Gradient::Horizontal, &valid)?;
    Ok(represent_as_image(gradient))
}

/// Signed response to vertical edges (intensity changing along x).
pub fn sobel_v<P: AsPlane + ?Sized>(input: &P, mask: Option<PlaneView<'_>>) -> Result<Image> {
    let view = input.as_plane();
    let valid = valid_pixels(view.shape(), mask)?;
    let gradient = gradient(view, Gradient::Vertical, &valid)?;
    Ok(represent_as_image(gradient))
}

// ============================================================================
// Find Edges
// ============================================================================

/// Sobel gradient magnitude, `sqrt((h^2 + v^2) / 2)`.
///
/// A unit step between 0 and 1 yields at most 1.0.
///
/// # Errors
/// `ShapeMismatch` if `mask` does not have the shape of `input`.
pub fn find_edges_sobel<P: AsPlane + ?Sized>(
    input: &P,
    mask: Option<PlaneView<'_>>,
) -> Result<Image> {
    let view = input.as_plane();
    debug!(
        "find_edges_sobel: dtype={} shape={:?} masked={}",
        view.dtype(),
        view.shape(),
        mask.is_some()
    );

    let valid = valid_pixels(view.shape(), mask)?;
    let h = gradient(view, Gradient::Horizontal, &valid)?;
    let v = gradient(view, Gradient::Vertical, &valid)?;

    let magnitude = ndarray::Zip::from(&h)
        .and(&v)
        .map_collect(|&gh, &gv| ((gh * gh + gv * gv) / 2.0).sqrt());
    Ok(represent_as_image(magnitude))
}

fn gradient(view: PlaneView<'_>, which: Gradient, valid: &Array2<bool>) -> Result<Array2<f64>> {
    let unit = plane_to_unit_float(view);
    let (row_kernel, col_kernel) = match which {
        Gradient::Horizontal => (&SMOOTH, &DIFF),
        Gradient::Vertical => (&DIFF, &SMOOTH),
    };
    let mut response = correlate_separable(unit.view(), row_kernel, col_kernel, BorderMode::Reflect)?;

    ndarray::Zip::from(&mut response)
        .and(valid)
        .for_each(|r, &ok| {
            if !ok {
                *r = 0.0;
            }
        });
    Ok(response)
}

/// Pixels whose full 3x3 neighbourhood lies inside the plane and the mask.
fn valid_pixels(shape: (usize, usize), mask: Option<PlaneView<'_>>) -> Result<Array2<bool>> {
    let included = match mask {
        Some(m) => {
            if m.shape() != shape {
                return Err(TransformError::ShapeMismatch {
                    expected: shape,
                    found: m.shape(),
                });
            }
            dispatch_plane!(m, a => a.mapv(|v| v.to_f64() != 0.0))
        }
        None => Array2::from_elem(shape, true),
    };

    let (height, width) = shape;
    par_from_fn(shape, |y, x| {
        if y == 0 || x == 0 || y + 1 >= height || x + 1 >= width {
            return false;
        }
        (y - 1..=y + 1).all(|ny| (x - 1..=x + 1).all(|nx| included[[ny, nx]]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DType;
    use ndarray::array;

    fn square_on_black() -> Array2<u8> {
        Array2::from_shape_fn((7, 7), |(y, x)| {
            if (2..=4).contains(&y) && (2..=4).contains(&x) {
                255
            } else {
                0
            }
        })
    }

    fn assert_close(actual: &Image, expected: &Array2<f64>) {
        let actual = actual.as_f64().expect("f64 output");
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-6, "{} != {}", a, e);
        }
    }

    const A: f64 = 0.25;
    const B: f64 = 0.559_016_99;
    const C: f64 = 0.707_106_78;
    const D: f64 = 0.75;

    #[test]
    fn test_find_edges_square() {
        let expected = array![
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, A, B, C, B, A, 0.0],
            [0.0, B, D, C, D, B, 0.0],
            [0.0, C, C, 0.0, C, C, 0.0],
            [0.0, B, D, C, D, B, 0.0],
            [0.0, A, B, C, B, A, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        ];
        let edges = find_edges_sobel(&square_on_black(), None).unwrap();
        assert_eq!(edges.dtype(), DType::F64);
        assert_close(&edges, &expected);
    }

    #[test]
    fn test_find_edges_with_mask() {
        let mask = Array2::from_shape_fn((7, 7), |(y, x)| u8::from(!(y >= 4 && x >= 4)));
        let expected = array![
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, A, B, C, B, A, 0.0],
            [0.0, B, D, C, D, B, 0.0],
            [0.0, C, C, 0.0, 0.0, 0.0, 0.0],
            [0.0, B, D, 0.0, 0.0, 0.0, 0.0],
            [0.0, A, B, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        ];
        let edges = find_edges_sobel(&square_on_black(), Some(mask.as_plane())).unwrap();
        assert_close(&edges, &expected);
    }

    #[test]
    fn test_components_are_signed() {
        let step = Array2::from_shape_fn((5, 5), |(y, _)| if y >= 2 { 1.0f64 } else { 0.0 });
        let h = sobel_h(&step, None).unwrap();
        let v = sobel_v(&step, None).unwrap();
        // Intensity rises downward: the upper row weights are positive
        assert_eq!(h.as_f64().unwrap()[[2, 2]], -1.0);
        assert_eq!(v.as_f64().unwrap()[[2, 2]], 0.0);
    }

    #[test]
    fn test_uniform_plane_has_no_edges() {
        let plane = Array2::from_elem((6, 6), 40000u16);
        let edges = find_edges_sobel(&plane, None).unwrap();
        assert!(edges.as_f64().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bool_input_and_zero_mask() {
        let plane = Array2::from_shape_fn((5, 5), |(_, x)| x >= 2);
        let mask = Array2::<bool>::from_elem((5, 5), false);
        let edges = find_edges_sobel(&plane, Some(mask.as_plane())).unwrap();
        assert!(edges.as_f64().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let mask = Array2::<u8>::ones((3, 3));
        assert!(matches!(
            find_edges_sobel(&square_on_black(), Some(mask.as_plane())),
            Err(TransformError::ShapeMismatch { .. })
        ));
    }
}
