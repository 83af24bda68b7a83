//! Binary morphology: Dilate, Erode, Remove Small Objects.
//!
//! All operations require a `bool` plane and fail with a type-contract
//! violation otherwise.
//!
//! ## Borders
//!
//! Dilation reads pixels outside the plane as `false`, erosion reads them as
//! `true`. With these border values the two are exact duals under
//! complement: `erode(!p, s) == !dilate(p, s)` for every element `s`.

use log::{debug, trace};
use ndarray::{Array2, ArrayView2};

use super::core::par_from_fn;
use crate::error::{Result, TransformError};
use crate::image::{dispatch_plane, represent_as_image, require_dtype, AsPlane, Element, Image};
use crate::selection::label::{label_components, Connectivity};

/// Boolean structuring element.
///
/// The element is centred at `(rows / 2, cols / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selem {
    mask: Array2<bool>,
}

impl Default for Selem {
    /// 3x3 cross (4-connected neighbourhood).
    fn default() -> Self {
        Selem::cross(1)
    }
}

impl Selem {
    /// Plus-shaped element with arms of length `radius`.
    pub fn cross(radius: usize) -> Self {
        let r = radius as isize;
        Selem::from_offsets_fn(radius, |dy, dx| (dy == 0 || dx == 0) && dy.abs().max(dx.abs()) <= r)
    }

    /// Full square of side `2 * radius + 1`.
    pub fn square(radius: usize) -> Self {
        Selem::from_offsets_fn(radius, |_, _| true)
    }

    /// Cells within euclidean distance `radius` of the centre.
    pub fn disk(radius: usize) -> Self {
        let r_sq = (radius * radius) as isize;
        Selem::from_offsets_fn(radius, |dy, dx| dy * dy + dx * dx <= r_sq)
    }

    fn from_offsets_fn<F: Fn(isize, isize) -> bool>(radius: usize, active: F) -> Self {
        let size = 2 * radius + 1;
        let r = radius as isize;
        let mask = Array2::from_shape_fn((size, size), |(y, x)| {
            active(y as isize - r, x as isize - r)
        });
        Selem { mask }
    }

    /// Use a boolean mask as the element.
    ///
    /// # Errors
    /// `InvalidParameter` if the mask is empty or has no active cell.
    pub fn from_mask(mask: Array2<bool>) -> Result<Self> {
        let (rows, cols) = mask.dim();
        if rows == 0 || cols == 0 {
            return Err(TransformError::InvalidParameter {
                name: "selem",
                value: format!("{}x{}", rows, cols),
                reason: "structuring element must not be empty".to_string(),
            });
        }
        if !mask.iter().any(|&v| v) {
            return Err(TransformError::InvalidParameter {
                name: "selem",
                value: format!("{}x{}", rows, cols),
                reason: "structuring element has no active cell".to_string(),
            });
        }
        Ok(Selem { mask })
    }

    /// Build an element from any plane; non-zero cells are active.
    pub fn from_plane<P: AsPlane + ?Sized>(plane: &P) -> Result<Self> {
        let mask = dispatch_plane!(plane.as_plane(), a => a.mapv(|v| v.to_f64() != 0.0));
        Selem::from_mask(mask)
    }

    pub fn mask(&self) -> ArrayView2<'_, bool> {
        self.mask.view()
    }

    pub fn center(&self) -> (usize, usize) {
        let (rows, cols) = self.mask.dim();
        (rows / 2, cols / 2)
    }

    /// `(dy, dx)` offsets of the active cells relative to the centre.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let (cy, cx) = self.center();
        self.mask
            .indexed_iter()
            .filter(|(_, &active)| active)
            .map(|((y, x), _)| (y as isize - cy as isize, x as isize - cx as isize))
            .collect()
    }
}

#[inline]
fn sample(input: &ArrayView2<'_, bool>, y: usize, x: usize, dy: isize, dx: isize) -> Option<bool> {
    let (height, width) = input.dim();
    let sy = y as isize + dy;
    let sx = x as isize + dx;
    if sy < 0 || sy >= height as isize || sx < 0 || sx >= width as isize {
        None
    } else {
        Some(input[[sy as usize, sx as usize]])
    }
}

// ============================================================================
// Dilate
// ============================================================================

/// Binary dilation.
///
/// A pixel becomes `true` if any pixel under the element, centred on it, is
/// `true`.
///
/// # Arguments
/// * `input` - Bool plane
/// * `selem` - Structuring element, [`Selem::default`] for the 3x3 cross
pub fn dilate_binary<P: AsPlane + ?Sized>(input: &P, selem: &Selem) -> Result<Image> {
    let input = require_dtype::<bool>("dilate_binary", input.as_plane())?;
    debug!(
        "dilate_binary: shape={:?} selem={:?}",
        input.dim(),
        selem.mask.dim()
    );

    let offsets = selem.offsets();
    let output = par_from_fn(input.dim(), |y, x| {
        offsets
            .iter()
            .any(|&(dy, dx)| sample(&input, y, x, dy, dx).unwrap_or(false))
    })?;
    Ok(represent_as_image(output))
}

// ============================================================================
// Erode
// ============================================================================

/// Binary erosion.
///
/// A pixel stays `true` only if every pixel under the element, centred on
/// it, is `true`.
pub fn erode_binary<P: AsPlane + ?Sized>(input: &P, selem: &Selem) -> Result<Image> {
    let input = require_dtype::<bool>("erode_binary", input.as_plane())?;
    debug!(
        "erode_binary: shape={:?} selem={:?}",
        input.dim(),
        selem.mask.dim()
    );

    let offsets = selem.offsets();
    let output = par_from_fn(input.dim(), |y, x| {
        offsets
            .iter()
            .all(|&(dy, dx)| sample(&input, y, x, dy, dx).unwrap_or(true))
    })?;
    Ok(represent_as_image(output))
}

// ============================================================================
// Remove Small Objects
// ============================================================================

/// Remove connected components smaller than `min_size` pixels.
///
/// Components are found with `connectivity`; a blob joined only through a
/// corner is one object under [`Connectivity::Eight`] and two under
/// [`Connectivity::Four`]. Components of at least `min_size` pixels are
/// kept unchanged.
pub fn remove_small_objects<P: AsPlane + ?Sized>(
    input: &P,
    min_size: usize,
    connectivity: Connectivity,
) -> Result<Image> {
    let input = require_dtype::<bool>("remove_small_objects", input.as_plane())?;
    debug!(
        "remove_small_objects: shape={:?} min_size={} connectivity={}",
        input.dim(),
        min_size,
        connectivity.rank()
    );

    if min_size == 0 {
        return Ok(represent_as_image(input.to_owned()));
    }

    let labels = label_components(input, connectivity);
    let removed = labels.sizes.iter().filter(|&&s| s < min_size).count();
    trace!(
        "remove_small_objects: {} components, {} below min_size",
        labels.count(),
        removed
    );

    let output = labels
        .labels
        .mapv(|label| labels.size_of(label).is_some_and(|size| size >= min_size));
    Ok(represent_as_image(output))
}
