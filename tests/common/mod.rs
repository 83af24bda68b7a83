#![allow(dead_code)]

use ndarray::{stack, Array2, Array3, Axis};

/// Bool plane from rows of 0/1.
pub fn bool_plane<const W: usize>(rows: &[[u8; W]]) -> Array2<bool> {
    Array2::from_shape_fn((rows.len(), W), |(y, x)| rows[y][x] != 0)
}

/// Stack planes along a new last axis.
pub fn dstack<T: Clone>(planes: &[Array2<T>]) -> Array3<T> {
    let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
    stack(Axis(2), &views).expect("planes share a shape")
}

/// Deterministic pseudo-random u8 plane (xorshift).
pub fn noise_u8(height: usize, width: usize, seed: u32) -> Array2<u8> {
    let mut state = seed.max(1);
    Array2::from_shape_fn((height, width), |_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 24) as u8
    })
}

/// Deterministic binary plane, roughly `density` of pixels set.
pub fn noise_bool(height: usize, width: usize, seed: u32, density: f64) -> Array2<bool> {
    let cutoff = (density * 255.0) as u8;
    noise_u8(height, width, seed).mapv(|v| v < cutoff)
}

pub fn assert_all_close(actual: &Array2<f64>, expected: &Array2<f64>, tol: f64) {
    assert_eq!(actual.dim(), expected.dim());
    for ((idx, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!((a - e).abs() <= tol, "at {:?}: {} vs {}", idx, a, e);
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
