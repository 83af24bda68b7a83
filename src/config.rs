//! Default parameters and JSON-loadable transform configuration.
//!
//! Every field is optional in the JSON file; missing fields take the
//! defaults below.
//!
//! ```json
//! {
//!   "smoothing": { "sigma": 2.0 },
//!   "threshold": { "multiplier": 0.8 },
//!   "small_objects": { "min_size": 30, "connectivity": 2 },
//!   "morphology": { "selem": { "shape": "disk", "radius": 2 } }
//! }
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::filters::morphology::{self, Selem};
use crate::filters::{blur, threshold};
use crate::image::{AsPlane, Image};
use crate::selection::label::Connectivity;

pub const DEFAULT_GAUSSIAN_SIGMA: f64 = 1.0;
/// Gaussian kernel half-width, in standard deviations.
pub const DEFAULT_GAUSSIAN_TRUNCATE: f64 = 4.0;
pub const DEFAULT_OTSU_MULTIPLIER: f64 = 1.0;
/// Histogram bins for float planes; integer planes use one bin per value.
pub const DEFAULT_OTSU_BINS: usize = 256;
pub const DEFAULT_MIN_SIZE: usize = 64;
/// 1 = 4-connected, 2 = 8-connected.
pub const DEFAULT_CONNECTIVITY: u8 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub smoothing: SmoothingConfig,
    pub threshold: ThresholdConfig,
    pub small_objects: SmallObjectsConfig,
    pub morphology: MorphologyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub sigma: f64,
    pub truncate: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_GAUSSIAN_SIGMA,
            truncate: DEFAULT_GAUSSIAN_TRUNCATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub multiplier: f64,
    pub nbins: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_OTSU_MULTIPLIER,
            nbins: DEFAULT_OTSU_BINS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallObjectsConfig {
    pub min_size: usize,
    pub connectivity: u8,
}

impl Default for SmallObjectsConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            connectivity: DEFAULT_CONNECTIVITY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    pub selem: SelemShape,
}

/// Serializable description of a structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "radius", rename_all = "lowercase")]
pub enum SelemShape {
    Cross(usize),
    Square(usize),
    Disk(usize),
}

impl Default for SelemShape {
    fn default() -> Self {
        SelemShape::Cross(1)
    }
}

impl SelemShape {
    pub fn to_selem(self) -> Selem {
        match self {
            SelemShape::Cross(r) => Selem::cross(r),
            SelemShape::Square(r) => Selem::square(r),
            SelemShape::Disk(r) => Selem::disk(r),
        }
    }
}

impl TransformConfig {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: TransformConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter values no transform accepts.
    pub fn validate(&self) -> Result<()> {
        Connectivity::from_rank(self.small_objects.connectivity)?;
        if self.threshold.nbins == 0 {
            return Err(TransformError::InvalidParameter {
                name: "threshold.nbins",
                value: "0".to_string(),
                reason: "histogram needs at least one bin".to_string(),
            });
        }
        for (name, value) in [
            ("smoothing.sigma", self.smoothing.sigma),
            ("smoothing.truncate", self.smoothing.truncate),
            ("threshold.multiplier", self.threshold.multiplier),
        ] {
            if !value.is_finite() {
                return Err(TransformError::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn smooth_gaussian<P: AsPlane + ?Sized>(&self, input: &P) -> Result<Image> {
        blur::smooth_gaussian_truncated(input, self.smoothing.sigma, self.smoothing.truncate)
    }

    pub fn threshold_otsu<P: AsPlane + ?Sized>(&self, input: &P) -> Result<Image> {
        threshold::threshold_otsu_with_bins(input, self.threshold.multiplier, self.threshold.nbins)
    }

    pub fn remove_small_objects<P: AsPlane + ?Sized>(&self, input: &P) -> Result<Image> {
        let connectivity = Connectivity::from_rank(self.small_objects.connectivity)?;
        morphology::remove_small_objects(input, self.small_objects.min_size, connectivity)
    }

    pub fn dilate_binary<P: AsPlane + ?Sized>(&self, input: &P) -> Result<Image> {
        morphology::dilate_binary(input, &self.morphology.selem.to_selem())
    }

    pub fn erode_binary<P: AsPlane + ?Sized>(&self, input: &P) -> Result<Image> {
        morphology::erode_binary(input, &self.morphology.selem.to_selem())
    }
}

/// Read and validate a JSON config file.
pub fn load_config(path: &Path) -> Result<TransformConfig> {
    let data = fs::read_to_string(path)?;
    let config = TransformConfig::from_json_str(&data)?;
    debug!("load_config: {} -> {:?}", path.display(), config);
    Ok(config)
}
