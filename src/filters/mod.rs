//! Image transforms.
//!
//! ## Supported Inputs
//!
//! | Transform | Bool | U8 | U16 | F32 | F64 | Output |
//! |-----------|------|----|-----|-----|-----|--------|
//! | projections | yes | yes | yes | yes | yes | stack dtype |
//! | smooth_gaussian | - | - | - | yes | yes | input dtype |
//! | threshold_otsu | - | yes | yes | yes | yes | bool |
//! | dilate / erode / remove_small_objects | yes | - | - | - | - | bool |
//! | invert | yes | yes | yes | - | - | input dtype |
//! | sobel / find_edges_sobel | yes | yes | yes | yes | yes | f64 |
//!
//! Unsupported dtypes fail with [`TransformError::TypeContract`] before any
//! work is done.
//!
//! ## Architecture
//!
//! - **Stateless** - Every transform is a pure function returning a new plane
//! - **Array-like input** - Generic over [`AsPlane`] / [`AsStack`]
//! - **Single output boundary** - Results go through [`represent_as_image`]
//! - **Thread-safe** - Neighbourhood loops run rows in parallel with rayon
//!
//! [`TransformError::TypeContract`]: crate::error::TransformError::TypeContract
//! [`AsPlane`]: crate::image::AsPlane
//! [`AsStack`]: crate::image::AsStack
//! [`represent_as_image`]: crate::image::represent_as_image

pub mod core;
pub mod projection;
pub mod blur;
pub mod threshold;
pub mod morphology;
pub mod invert;
pub mod edge;

pub use blur::{smooth_gaussian, smooth_gaussian_truncated};
pub use edge::{find_edges_sobel, sobel_h, sobel_v};
pub use invert::invert;
pub use morphology::{dilate_binary, erode_binary, remove_small_objects, Selem};
pub use projection::{
    max_intensity_projection, mean_intensity_projection, median_intensity_projection,
    min_intensity_projection, projection, ProjectionMode,
};
pub use threshold::{otsu_threshold, threshold_otsu, threshold_otsu_with_bins};
