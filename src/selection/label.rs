//! Connected-component labeling of binary planes using flood fill.
//!
//! Components are numbered `1..=count` in raster order of their first
//! pixel; background pixels get label 0.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, TransformError};

/// Neighbourhood rule deciding which pixels touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only (rank 1, cross).
    #[default]
    Four,
    /// Edge and corner neighbours (rank 2, full 3x3).
    Eight,
}

impl Connectivity {
    /// Parse the rank form used by the Python API: 1 or 2.
    pub fn from_rank(rank: u8) -> Result<Self> {
        match rank {
            1 => Ok(Connectivity::Four),
            2 => Ok(Connectivity::Eight),
            other => Err(TransformError::InvalidParameter {
                name: "connectivity",
                value: other.to_string(),
                reason: "must be 1 (4-connected) or 2 (8-connected)".to_string(),
            }),
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Connectivity::Four => 1,
            Connectivity::Eight => 2,
        }
    }

    /// `(dy, dx)` offsets of the neighbours, centre excluded.
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &[(-1, 0), (0, -1), (0, 1), (1, 0)],
            Connectivity::Eight => &[
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ],
        }
    }
}

/// Label image plus the pixel count of every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    /// 0 for background, `1..=count` for components
    pub labels: Array2<u32>,
    /// `sizes[i]` is the pixel count of label `i + 1`
    pub sizes: Vec<usize>,
}

impl Labels {
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    pub fn size_of(&self, label: u32) -> Option<usize> {
        (label as usize)
            .checked_sub(1)
            .and_then(|i| self.sizes.get(i).copied())
    }
}

/// Label the connected `true` regions of a binary plane.
pub fn label_components(mask: ArrayView2<'_, bool>, connectivity: Connectivity) -> Labels {
    let (height, width) = mask.dim();
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if !mask[[y, x]] || labels[[y, x]] != 0 {
                continue;
            }

            let label = sizes.len() as u32 + 1;
            let mut pixel_count = 0usize;
            labels[[y, x]] = label;
            queue.push_back((y, x));

            while let Some((cy, cx)) = queue.pop_front() {
                pixel_count += 1;

                for &(dy, dx) in connectivity.offsets() {
                    let ny = cy as isize + dy;
                    let nx = cx as isize + dx;
                    if ny < 0 || ny >= height as isize || nx < 0 || nx >= width as isize {
                        continue;
                    }
                    let (ny, nx) = (ny as usize, nx as usize);
                    if mask[[ny, nx]] && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = label;
                        queue.push_back((ny, nx));
                    }
                }
            }

            sizes.push(pixel_count);
        }
    }

    Labels { labels, sizes }
}
