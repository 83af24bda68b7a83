mod common;

use bioimage_transform::filters::morphology::Selem;
use bioimage_transform::filters::threshold_otsu_with_bins;
use bioimage_transform::{
    dilate_binary, erode_binary, find_edges_sobel, invert, max_intensity_projection,
    mean_intensity_projection, median_intensity_projection, min_intensity_projection,
    remove_small_objects, smooth_gaussian, threshold_otsu, AsPlane, Connectivity, DType, Image,
    TransformError,
};
use common::{dstack, init_logging, noise_bool, noise_u8};
use ndarray::{Array2, Array3, Axis};

fn count_true(image: &Image) -> usize {
    image
        .as_bool()
        .map_or(0, |mask| mask.iter().filter(|&&v| v).count())
}

#[test]
fn projections_match_per_pixel_reduction() {
    init_logging();
    let planes: Vec<Array2<u8>> = (1..=4).map(|seed| noise_u8(9, 11, seed)).collect();
    let stack = dstack(&planes);

    let max = max_intensity_projection(&stack).unwrap();
    let min = min_intensity_projection(&stack).unwrap();
    let expected_max = stack.map_axis(Axis(2), |lane| *lane.iter().max().unwrap());
    let expected_min = stack.map_axis(Axis(2), |lane| *lane.iter().min().unwrap());
    assert_eq!(max, expected_max);
    assert_eq!(min, expected_min);
}

#[test]
fn mean_projection_rounds_integers_and_keeps_floats_exact() {
    init_logging();
    let planes: Vec<Array2<u16>> = (1..=3)
        .map(|seed| noise_u8(6, 6, seed).mapv(|v| v as u16 * 200))
        .collect();
    let stack = dstack(&planes);
    let mean = mean_intensity_projection(&stack).unwrap();
    assert_eq!(mean.dtype(), DType::U16);

    let exact = stack.mapv(f64::from).mean_axis(Axis(2)).unwrap();
    let rounded = mean.as_u16().unwrap();
    for (r, e) in rounded.iter().zip(exact.iter()) {
        assert!((*r as f64 - e).abs() <= 0.5);
    }

    let floats = stack.mapv(|v| v as f64 / 7.0);
    let mean = mean_intensity_projection(&floats).unwrap();
    let expected = floats.map_axis(Axis(2), |lane| lane.iter().sum::<f64>() / lane.len() as f64);
    assert_eq!(mean, expected);
}

#[test]
fn median_of_sorted_odd_stack_is_middle_plane() {
    init_logging();
    let base = noise_u8(5, 5, 7).mapv(|v| v / 4);
    let stack: Array3<u8> = dstack(&[base.clone(), base.mapv(|v| v + 10), base.mapv(|v| v + 20)]);
    assert_eq!(
        median_intensity_projection(&stack).unwrap(),
        base.mapv(|v| v + 10)
    );
}

#[test]
fn smoothing_rejects_integers_and_preserves_mass() {
    init_logging();
    let plane = noise_u8(16, 16, 3);
    assert!(matches!(
        smooth_gaussian(&plane, 1.0),
        Err(TransformError::TypeContract { .. })
    ));

    // Content well inside the border keeps all its mass
    let mut inner = Array2::<f64>::zeros((32, 32));
    inner
        .slice_mut(ndarray::s![12..20, 12..20])
        .assign(&noise_u8(8, 8, 5).mapv(f64::from));
    let smoothed = smooth_gaussian(&inner, 1.0).unwrap();
    let before = inner.sum();
    let after = smoothed.as_f64().unwrap().sum();
    assert!((before - after).abs() < 1e-6 * before.max(1.0));
}

#[test]
fn raising_multiplier_never_adds_foreground() {
    init_logging();
    let plane = noise_u8(20, 20, 11);
    let floats = plane.mapv(|v| v as f32 / 255.0);

    let mut previous = usize::MAX;
    for multiplier in [1.0, 1.1, 1.25, 1.5, 2.0] {
        let mask = threshold_otsu(&plane, multiplier).unwrap();
        assert_eq!(mask.dtype(), DType::Bool);
        let count = count_true(&mask);
        assert!(count <= previous);
        previous = count;
    }

    let mut previous = usize::MAX;
    for multiplier in [1.0, 1.2, 1.4] {
        let count = count_true(&threshold_otsu_with_bins(&floats, multiplier, 64).unwrap());
        assert!(count <= previous);
        previous = count;
    }
}

#[test]
fn small_object_removal_by_size_and_connectivity() {
    init_logging();
    for seed in 1..6 {
        let plane = noise_bool(24, 24, seed, 0.35);
        for min_size in [1, 3, 8] {
            let four = remove_small_objects(&plane, min_size, Connectivity::Four).unwrap();
            let eight = remove_small_objects(&plane, min_size, Connectivity::Eight).unwrap();

            // Survivors are a subset of the input
            let kept = four.as_bool().unwrap();
            assert!(kept.iter().zip(plane.iter()).all(|(&k, &p)| !k || p));

            // Every surviving 4-component is large enough
            let labels = bioimage_transform::label_components(kept.view(), Connectivity::Four);
            assert!(labels.sizes.iter().all(|&s| s >= min_size));

            assert!(count_true(&eight) >= count_true(&four));
        }
    }
}

#[test]
fn invert_twice_is_identity() {
    init_logging();
    let plane = noise_u8(10, 10, 21);
    assert_eq!(invert(&invert(&plane).unwrap()).unwrap(), plane);

    let wide = plane.mapv(|v| v as u16 * 257);
    assert_eq!(invert(&invert(&wide).unwrap()).unwrap(), wide);

    let mask = noise_bool(10, 10, 22, 0.5);
    assert_eq!(invert(&invert(&mask).unwrap()).unwrap(), mask);
}

#[test]
fn erosion_is_dual_to_dilation() {
    init_logging();
    let elements = [
        Selem::default(),
        Selem::square(1),
        Selem::disk(2),
        Selem::from_mask(Array2::from_shape_fn((2, 3), |(y, x)| y == 0 || x == 2)).unwrap(),
    ];
    for seed in 1..4 {
        let plane = noise_bool(15, 13, seed, 0.4);
        for selem in &elements {
            let lhs = erode_binary(&invert(&plane).unwrap(), selem).unwrap();
            let rhs = invert(&dilate_binary(&plane, selem).unwrap()).unwrap();
            assert_eq!(lhs, rhs);
        }
    }
}

#[test]
fn sobel_on_uniform_or_fully_masked_plane_is_zero() {
    init_logging();
    let uniform = Array2::from_elem((8, 8), 0.3f64);
    let edges = find_edges_sobel(&uniform, None).unwrap();
    assert!(edges.as_f64().unwrap().iter().all(|&v| v == 0.0));

    let textured = noise_u8(8, 8, 9);
    let excluded = Array2::<u8>::zeros((8, 8));
    let edges = find_edges_sobel(&textured, Some(excluded.as_plane())).unwrap();
    assert!(edges.as_f64().unwrap().iter().all(|&v| v == 0.0));
}
