#![allow(dead_code)]

use colorcal::chart::{colorchecker_classic, ChartRegion};
use colorcal::core::{
    homography_from_4pt, PixelFormat, PlanarImage, Point2, ReferenceColorSpace,
};

pub const WIDTH: usize = 240;
pub const HEIGHT: usize = 180;

/// Chart corners (TL, TR, BR, BL) in the synthetic shot, mildly keystoned.
pub const CHART_CORNERS: [[f64; 2]; 4] = [
    [24.0, 18.0],
    [214.0, 26.0],
    [208.0, 158.0],
    [30.0, 150.0],
];

pub fn chart_region() -> ChartRegion {
    ChartRegion::Quad(CHART_CORNERS)
}

/// Camera response used by the synthetic shots: cross-band mixing plus an
/// offset, kept inside `[0, 1]` for the ColorChecker gamut.
pub fn camera(rgb: [f64; 3]) -> [f64; 3] {
    [
        0.04 + 0.80 * rgb[0] + 0.10 * rgb[1] + 0.02 * rgb[2],
        0.02 + 0.05 * rgb[0] + 0.85 * rgb[1] + 0.05 * rgb[2],
        0.03 + 0.02 * rgb[0] + 0.12 * rgb[1] + 0.78 * rgb[2],
    ]
}

/// Render the ColorChecker through `camera`, with a small deterministic
/// per-patch perturbation of `jitter` amplitude.
pub fn render_chart(jitter: f64) -> PlanarImage {
    let chart = colorchecker_classic().expect("chart");
    let reference = chart.reference_values(ReferenceColorSpace::Srgb);
    let outline = [
        Point2::new(0.0, 0.0),
        Point2::new(6.0, 0.0),
        Point2::new(6.0, 4.0),
        Point2::new(0.0, 4.0),
    ];
    let image_pts = CHART_CORNERS.map(|[x, y]| Point2::new(x, y));
    let to_chart = homography_from_4pt(&image_pts, &outline).expect("homography");

    let mut data = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let p = to_chart.apply(Point2::new(x as f64 + 0.5, y as f64 + 0.5));
            let inside = (0.0..6.0).contains(&p.x) && (0.0..4.0).contains(&p.y);
            let rgb = if inside {
                let idx = p.y as usize * 6 + p.x as usize;
                let wobble = jitter * (((idx * 7919) % 13) as f64 / 6.0 - 1.0);
                camera(reference[idx]).map(|v| (v + wobble).clamp(0.0, 1.0))
            } else {
                [0.35, 0.35, 0.35]
            };
            data.extend(rgb.map(|v| v as f32));
        }
    }
    PlanarImage::from_interleaved(WIDTH, HEIGHT, PixelFormat::Rgb8, &data).expect("image")
}

/// Same content quantized to an 8-bit `image` buffer, for file-based tests.
#[cfg(feature = "image")]
pub fn render_chart_rgb8(jitter: f64) -> image::RgbImage {
    let planar = render_chart(jitter);
    let raw = planar
        .to_interleaved()
        .iter()
        .map(|v| (v * 255.0).round() as u8)
        .collect();
    image::RgbImage::from_raw(WIDTH as u32, HEIGHT as u32, raw).expect("buffer")
}

/// A small flat-colored scene to be corrected.
#[cfg(feature = "image")]
pub fn scene(seed: u8) -> image::RgbImage {
    image::RgbImage::from_fn(32, 24, |x, y| {
        image::Rgb([
            (x as u8).wrapping_mul(7).wrapping_add(seed),
            (y as u8).wrapping_mul(9),
            seed.wrapping_mul(31),
        ])
    })
}
