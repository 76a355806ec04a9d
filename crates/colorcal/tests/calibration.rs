mod common;

use colorcal::chart::{colorchecker_classic, AlignmentError, ChartRegion};
use colorcal::core::{PixelFormat, PlanarImage, ReferenceColorSpace};
use colorcal::{
    calibrate, CalibrationError, FittingError, MappingMethod, RecipeError, SamplingError,
};

use common::{chart_region, render_chart};

#[test]
fn exact_camera_response_is_inverted() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let calibration = calibrate(
        &image,
        &chart,
        &chart_region(),
        ReferenceColorSpace::Srgb,
        MappingMethod::LinearCrossBand,
    )
    .expect("calibration");

    assert_eq!(calibration.fit.samples.len(), 24);
    assert!(
        calibration.fit.diagnostics.max < 0.05,
        "{:?}",
        calibration.fit.diagnostics
    );
}

#[test]
fn perturbed_patches_fit_within_tolerance() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.01);
    for method in [MappingMethod::LinearCrossBand, MappingMethod::QuadraticCrossBand] {
        let calibration = calibrate(
            &image,
            &chart,
            &chart_region(),
            ReferenceColorSpace::Srgb,
            method,
        )
        .expect("calibration");
        let d = &calibration.fit.diagnostics;
        assert!(d.mean < 4.0, "{method}: {d:?}");
        assert!(d.rms_residual.iter().all(|&r| r < 0.03), "{method}: {d:?}");
    }
}

#[test]
fn fitting_in_lab_and_xyz_works_too() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    for space in [ReferenceColorSpace::Xyz, ReferenceColorSpace::Lab] {
        let calibration = calibrate(
            &image,
            &chart,
            &chart_region(),
            space,
            MappingMethod::CubicCrossBand,
        )
        .expect("calibration");
        assert!(calibration.fit.diagnostics.mean < 3.0, "{space}");
        assert_eq!(calibration.recipe.reference_color_space(), space);
    }
}

#[test]
fn mapping_the_same_image_twice_is_identical() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let recipe = calibrate(
        &image,
        &chart,
        &chart_region(),
        ReferenceColorSpace::Lab,
        MappingMethod::LinearCrossBand,
    )
    .expect("calibration")
    .recipe;

    let first = recipe.map(&image).expect("map");
    let second = recipe.map(&image).expect("map");
    assert_eq!(first, second);
    assert_eq!(recipe.to_srgb(&first), recipe.to_srgb(&second));
}

#[test]
fn zero_area_region_fails_alignment() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let flat = ChartRegion::Quad([[10.0, 10.0], [100.0, 10.0], [200.0, 10.0], [50.0, 10.0]]);
    let err = calibrate(
        &image,
        &chart,
        &flat,
        ReferenceColorSpace::Srgb,
        MappingMethod::Linear,
    )
    .expect_err("degenerate");
    assert!(
        matches!(err, CalibrationError::Alignment(AlignmentError::ZeroArea { .. })),
        "{err:?}"
    );
}

#[test]
fn chart_outside_the_image_is_a_sampling_error() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let region = ChartRegion::rect(120.0, 20.0, 240.0, 140.0);
    let err = calibrate(
        &image,
        &chart,
        &region,
        ReferenceColorSpace::Srgb,
        MappingMethod::Linear,
    )
    .expect_err("out of bounds");
    match err {
        CalibrationError::Sampling(SamplingError::PatchOutOfBounds { x, width, .. }) => {
            assert!(x > width as f64);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn region_smaller_than_a_pixel_leaves_patches_empty() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let tiny = ChartRegion::rect(10.0, 10.0, 1.0, 1.0);
    let err = calibrate(
        &image,
        &chart,
        &tiny,
        ReferenceColorSpace::Srgb,
        MappingMethod::Linear,
    )
    .expect_err("no pixel centers");
    assert_eq!(
        err,
        CalibrationError::Sampling(SamplingError::EmptyPatch {
            index: 0,
            name: "Dark Skin".into(),
        })
    );
}

#[test]
fn too_many_disabled_patches_cannot_fit_cubic() {
    let mut mask = vec![false; 24];
    mask[..12].iter_mut().for_each(|m| *m = true);
    let chart = colorchecker_classic()
        .expect("chart")
        .copy_with_enabled(&mask)
        .expect("mask");
    let err = calibrate(
        &render_chart(0.0),
        &chart,
        &chart_region(),
        ReferenceColorSpace::Srgb,
        MappingMethod::CubicCrossBand,
    )
    .expect_err("12 < 20");
    assert!(matches!(
        err,
        CalibrationError::Fitting(FittingError::NotEnoughPatches {
            patches: 12,
            parameters: 20,
            ..
        })
    ));
}

#[test]
fn recipe_refuses_other_pixel_formats() {
    let chart = colorchecker_classic().expect("chart");
    let image = render_chart(0.0);
    let recipe = calibrate(
        &image,
        &chart,
        &chart_region(),
        ReferenceColorSpace::Srgb,
        MappingMethod::Linear,
    )
    .expect("calibration")
    .recipe;

    let deep = PlanarImage::from_planes(
        image.width(),
        image.height(),
        PixelFormat::Rgb16,
        image.planes().to_vec(),
    )
    .expect("16-bit copy");
    assert_eq!(
        recipe.map(&deep),
        Err(RecipeError::FormatMismatch {
            expected: PixelFormat::Rgb8,
            actual: PixelFormat::Rgb16
        })
    );
}
