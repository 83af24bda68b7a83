//! Global thresholding with Otsu's method.
//!
//! Integer planes are histogrammed with one bin per integer value between
//! the plane minimum and maximum; float planes use `nbins` equal-width bins
//! over the same range. The threshold is the centre of the first bin that
//! maximises the between-class variance, which is the same as minimising the
//! summed intra-class variance.

use log::{debug, trace, warn};
use ndarray::ArrayView2;

use crate::config::DEFAULT_OTSU_BINS;
use crate::error::{Result, TransformError};
use crate::image::{dispatch_plane, represent_as_image, AsPlane, DType, Element, Image, PlaneView};

/// Intensity histogram: pixel count and centre value of every bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<u64>,
    pub centers: Vec<f64>,
}

/// Threshold a plane at its Otsu level scaled by `multiplier`.
///
/// # Arguments
/// * `input` - Unsigned integer or float plane
/// * `multiplier` - Factor applied to the Otsu level before comparing
///
/// # Returns
/// Bool plane, `true` where `value > otsu_level * multiplier`
///
/// The cutoff scales the level itself, so a larger `multiplier` only shrinks
/// the foreground while the level is non-negative. For a plane whose Otsu
/// level is negative it lowers the cutoff and the foreground grows.
pub fn threshold_otsu<P: AsPlane + ?Sized>(input: &P, multiplier: f64) -> Result<Image> {
    threshold_otsu_with_bins(input, multiplier, DEFAULT_OTSU_BINS)
}

/// [`threshold_otsu`] with an explicit bin count for float planes.
pub fn threshold_otsu_with_bins<P: AsPlane + ?Sized>(
    input: &P,
    multiplier: f64,
    nbins: usize,
) -> Result<Image> {
    let view = input.as_plane();
    let level = otsu_threshold(&view, nbins)?;
    let cutoff = level * multiplier;
    debug!(
        "threshold_otsu: dtype={} shape={:?} level={} multiplier={} cutoff={}",
        view.dtype(),
        view.shape(),
        level,
        multiplier,
        cutoff
    );

    let mask = dispatch_plane!(view, a => a.mapv(|v| v.to_f64() > cutoff));
    Ok(represent_as_image(mask))
}

/// Compute the Otsu threshold level of a plane.
///
/// A constant plane returns its single value.
pub fn otsu_threshold<P: AsPlane + ?Sized>(input: &P, nbins: usize) -> Result<f64> {
    let view = input.as_plane();
    let histogram = match view {
        PlaneView::U8(a) => integer_histogram(a),
        PlaneView::U16(a) => integer_histogram(a),
        PlaneView::F32(a) => float_histogram(a, nbins)?,
        PlaneView::F64(a) => float_histogram(a, nbins)?,
        PlaneView::Bool(_) => {
            return Err(TransformError::type_contract(
                "threshold_otsu",
                "unsigned integer or floating-point",
                DType::Bool,
            ))
        }
    };
    trace!("threshold_otsu: {} histogram bins", histogram.counts.len());
    Ok(otsu_from_histogram(&histogram))
}

fn integer_histogram<T: Element>(input: ArrayView2<'_, T>) -> Histogram {
    let values: Vec<usize> = input.iter().map(|v| v.to_f64() as usize).collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Histogram {
            counts: Vec::new(),
            centers: Vec::new(),
        };
    };

    let mut counts = vec![0u64; max - min + 1];
    for v in values {
        counts[v - min] += 1;
    }
    let centers = (min..=max).map(|v| v as f64).collect();

    Histogram { counts, centers }
}

fn float_histogram<T: Element>(input: ArrayView2<'_, T>, nbins: usize) -> Result<Histogram> {
    if nbins == 0 {
        return Err(TransformError::InvalidParameter {
            name: "nbins",
            value: "0".to_string(),
            reason: "histogram needs at least one bin".to_string(),
        });
    }

    let values: Vec<f64> = input
        .iter()
        .map(|v| v.to_f64())
        .filter(|v| !v.is_nan())
        .collect();
    if values.is_empty() {
        return Ok(Histogram {
            counts: Vec::new(),
            centers: Vec::new(),
        });
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Ok(Histogram {
            counts: vec![values.len() as u64],
            centers: vec![min],
        });
    }

    let width = (max - min) / nbins as f64;
    let mut counts = vec![0u64; nbins];
    for v in values {
        // The top edge belongs to the last bin
        let bin = (((v - min) / width) as usize).min(nbins - 1);
        counts[bin] += 1;
    }
    let centers = (0..nbins)
        .map(|i| min + (i as f64 + 0.5) * width)
        .collect();

    Ok(Histogram { counts, centers })
}

/// Centre of the first bin maximising `w1 * w2 * (mu1 - mu2)^2`, splitting
/// the histogram into bins `..=i` and `i + 1..`.
pub fn otsu_from_histogram(histogram: &Histogram) -> f64 {
    let Histogram { counts, centers } = histogram;
    if counts.len() < 2 {
        if !counts.is_empty() {
            warn!("threshold_otsu: constant plane, threshold equals its value");
        }
        return centers.first().copied().unwrap_or(0.0);
    }

    let total_weight: f64 = counts.iter().map(|&c| c as f64).sum();
    let total_moment: f64 = counts
        .iter()
        .zip(centers)
        .map(|(&c, &x)| c as f64 * x)
        .sum();

    let mut weight1 = 0.0f64;
    let mut moment1 = 0.0f64;
    let mut best_variance = f64::NEG_INFINITY;
    let mut best_index = 0;

    for i in 0..counts.len() - 1 {
        weight1 += counts[i] as f64;
        moment1 += counts[i] as f64 * centers[i];
        let weight2 = total_weight - weight1;
        if weight1 == 0.0 || weight2 == 0.0 {
            continue;
        }

        let mean1 = moment1 / weight1;
        let mean2 = (total_moment - moment1) / weight2;
        let variance = weight1 * weight2 * (mean1 - mean2) * (mean1 - mean2);
        if variance > best_variance {
            best_variance = variance;
            best_index = i;
        }
    }

    centers[best_index]
}
