//! Intensity projections across the depth axis of a stack.
//!
//! A stack is `(height, width, depth)`; every projection reduces the depth
//! axis and returns a single `(height, width)` plane.

use std::cmp::Ordering;

use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView3, Axis};

use crate::error::{Result, TransformError};
use crate::image::{dispatch_stack, represent_as_image, AsStack, Element, Image};

/// Per-pixel reduction applied across the depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Max,
    Min,
    /// Arithmetic mean; integer results round to nearest, ties toward zero.
    Mean,
    /// Median; even depths average the two middle values.
    Median,
}

impl ProjectionMode {
    pub fn name(self) -> &'static str {
        match self {
            ProjectionMode::Max => "max",
            ProjectionMode::Min => "min",
            ProjectionMode::Mean => "mean",
            ProjectionMode::Median => "median",
        }
    }
}

/// Project a stack onto a single plane.
///
/// The output dtype always equals the stack dtype.
pub fn projection<S: AsStack + ?Sized>(stack: &S, mode: ProjectionMode) -> Result<Image> {
    let view = stack.as_stack();
    let (height, width, depth) = view.shape();
    debug!(
        "{}_intensity_projection: dtype={} shape=({}, {}, {})",
        mode.name(),
        view.dtype(),
        height,
        width,
        depth
    );

    if depth == 0 {
        return Err(TransformError::EmptyStack);
    }

    Ok(dispatch_stack!(view, a => represent_as_image(project(a, mode))))
}

pub fn max_intensity_projection<S: AsStack + ?Sized>(stack: &S) -> Result<Image> {
    projection(stack, ProjectionMode::Max)
}

pub fn min_intensity_projection<S: AsStack + ?Sized>(stack: &S) -> Result<Image> {
    projection(stack, ProjectionMode::Min)
}

pub fn mean_intensity_projection<S: AsStack + ?Sized>(stack: &S) -> Result<Image> {
    projection(stack, ProjectionMode::Mean)
}

pub fn median_intensity_projection<S: AsStack + ?Sized>(stack: &S) -> Result<Image> {
    projection(stack, ProjectionMode::Median)
}

fn project<T: Element>(stack: ArrayView3<'_, T>, mode: ProjectionMode) -> Array2<T> {
    stack.map_axis(Axis(2), |lane| match mode {
        ProjectionMode::Max => extreme(lane, Ordering::Greater),
        ProjectionMode::Min => extreme(lane, Ordering::Less),
        ProjectionMode::Mean => {
            let sum: f64 = lane.iter().map(|v| v.to_f64()).sum();
            T::from_f64(sum / lane.len() as f64)
        }
        ProjectionMode::Median => median(lane),
    })
}

/// First value that no other value beats in direction `wins`.
fn extreme<T: Element>(lane: ArrayView1<'_, T>, wins: Ordering) -> T {
    let mut best = lane[0];
    for &v in lane.iter().skip(1) {
        if v.partial_cmp(&best) == Some(wins) {
            best = v;
        }
    }
    best
}

fn median<T: Element>(lane: ArrayView1<'_, T>) -> T {
    let mut values: Vec<T> = lane.to_vec();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        T::from_f64((values[mid - 1].to_f64() + values[mid].to_f64()) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{DType, Stack};
    use ndarray::{array, stack, Array3};

    fn dstack<T: Element>(planes: &[Array2<T>]) -> Array3<T> {
        let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
        stack(Axis(2), &views).unwrap()
    }

    #[test]
    fn test_max_and_min_u8() {
        let s = dstack(&[array![[0u8, 1, 2]], array![[2u8, 1, 0]]]);
        assert_eq!(max_intensity_projection(&s).unwrap(), array![[2u8, 1, 2]]);
        assert_eq!(min_intensity_projection(&s).unwrap(), array![[0u8, 1, 0]]);
    }

    #[test]
    fn test_mean_u8_rounds_ties_toward_zero() {
        let s = dstack(&[array![[0u8, 1, 1, 2]], array![[1u8, 2, 4, 2]]]);
        // 0.5 -> 0, 1.5 -> 1, 2.5 -> 2, 2.0 -> 2
        assert_eq!(mean_intensity_projection(&s).unwrap(), array![[0u8, 1, 2, 2]]);

        let s = dstack(&[array![[0u8]], array![[1u8]], array![[7u8]]]);
        // 8 / 3 = 2.67 -> 3
        assert_eq!(mean_intensity_projection(&s).unwrap(), array![[3u8]]);
    }

    #[test]
    fn test_mean_f64_is_exact() {
        let s = dstack(&[array![[0.0, 1.0]], array![[1.0, 2.0]]]);
        assert_eq!(mean_intensity_projection(&s).unwrap(), array![[0.5, 1.5]]);
    }

    #[test]
    fn test_median_odd_depth() {
        let s = dstack(&[array![[5u8, 0]], array![[1u8, 9]], array![[3u8, 4]]]);
        assert_eq!(median_intensity_projection(&s).unwrap(), array![[3u8, 4]]);
    }

    #[test]
    fn test_median_even_depth_averages_middle() {
        let s = dstack(&[array![[1.0f32]], array![[4.0f32]], array![[2.0f32]], array![[8.0f32]]]);
        assert_eq!(median_intensity_projection(&s).unwrap(), array![[3.0f32]]);
    }

    #[test]
    fn test_projection_of_wrapped_stack() {
        let wrapped = Stack::from(dstack(&[array![[1u16, 2]], array![[3u16, 0]]]));
        let out = max_intensity_projection(&wrapped).unwrap();
        assert_eq!(out.dtype(), DType::U16);
        assert_eq!(out, array![[3u16, 2]]);
    }

    #[test]
    fn test_empty_stack_is_an_error() {
        let s = Array3::<u8>::zeros((2, 2, 0));
        assert!(matches!(
            max_intensity_projection(&s),
            Err(TransformError::EmptyStack)
        ));
    }
}
