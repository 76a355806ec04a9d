//! Reusable correction recipe: a fitted mapping plus everything needed to
//! turn its output back into displayable sRGB.

use crate::mapping::CorrectionMapping;
use colorcal_core::{
    ColorConverter, ImageBufferError, PixelFormat, PlanarImage, ReferenceColorSpace,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecipeError {
    #[error("recipe was computed for {expected} images, got {actual}")]
    FormatMismatch {
        expected: PixelFormat,
        actual: PixelFormat,
    },
    #[error("recipes apply to three-band images only, this one targets {format}")]
    UnsupportedFormat { format: PixelFormat },
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),
}

#[derive(thiserror::Error, Debug)]
pub enum RecipeIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Output of [`CorrectionRecipe::map`]: three planes in a reference color space.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectedBands {
    width: usize,
    height: usize,
    space: ReferenceColorSpace,
    planes: [Vec<f32>; 3],
}

impl CorrectedBands {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn space(&self) -> ReferenceColorSpace {
        self.space
    }

    pub fn planes(&self) -> &[Vec<f32>; 3] {
        &self.planes
    }
}

/// Immutable correction recipe, shareable across threads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecipe {
    corrector: CorrectionMapping,
    color_converter: ColorConverter,
    reference_color_space: ReferenceColorSpace,
    pixel_format: PixelFormat,
}

impl CorrectionRecipe {
    pub fn new(
        corrector: CorrectionMapping,
        color_converter: ColorConverter,
        reference_color_space: ReferenceColorSpace,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            corrector,
            color_converter,
            reference_color_space,
            pixel_format,
        }
    }

    pub fn corrector(&self) -> &CorrectionMapping {
        &self.corrector
    }

    pub fn color_converter(&self) -> &ColorConverter {
        &self.color_converter
    }

    pub fn reference_color_space(&self) -> ReferenceColorSpace {
        self.reference_color_space
    }

    /// Pixel format of the images this recipe accepts.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Apply the mapping to every pixel of `image`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, image), fields(width = image.width(), height = image.height()))
    )]
    pub fn map(&self, image: &PlanarImage) -> Result<CorrectedBands, RecipeError> {
        if image.format() != self.pixel_format {
            return Err(RecipeError::FormatMismatch {
                expected: self.pixel_format,
                actual: image.format(),
            });
        }
        if !self.pixel_format.is_color() {
            return Err(RecipeError::UnsupportedFormat {
                format: self.pixel_format,
            });
        }

        let [r, g, b] = [0, 1, 2].map(|c| image.planes()[c].as_slice());
        let n = r.len();
        let mut planes: [Vec<f32>; 3] = std::array::from_fn(|_| Vec::with_capacity(n));
        for ((&r, &g), &b) in r.iter().zip(g).zip(b) {
            let y = self
                .corrector
                .map_color([f64::from(r), f64::from(g), f64::from(b)]);
            for (plane, v) in planes.iter_mut().zip(y) {
                plane.push(v as f32);
            }
        }

        Ok(CorrectedBands {
            width: image.width(),
            height: image.height(),
            space: self.reference_color_space,
            planes,
        })
    }

    /// Convert corrected bands to display sRGB clipped to `[0, 1]`, tagged
    /// with the recipe's pixel format.
    pub fn to_srgb(&self, bands: &CorrectedBands) -> Result<PlanarImage, RecipeError> {
        let n = bands.width * bands.height;
        let mut out: [Vec<f32>; 3] = std::array::from_fn(|_| Vec::with_capacity(n));
        let [p0, p1, p2] = &bands.planes;
        for ((&a, &b), &c) in p0.iter().zip(p1).zip(p2) {
            let rgb = self.color_converter.to_srgb(
                bands.space,
                [f64::from(a), f64::from(b), f64::from(c)],
            );
            for (plane, v) in out.iter_mut().zip(rgb) {
                // NaN from out-of-domain values clamps to black
                plane.push(if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) as f32 });
            }
        }
        Ok(PlanarImage::from_planes(
            bands.width,
            bands.height,
            self.pixel_format,
            out.into(),
        )?)
    }

    /// [`map`](Self::map) followed by [`to_srgb`](Self::to_srgb).
    pub fn correct(&self, image: &PlanarImage) -> Result<PlanarImage, RecipeError> {
        let bands = self.map(image)?;
        self.to_srgb(&bands)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RecipeIoError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), RecipeIoError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MappingMethod;
    use approx::assert_abs_diff_eq;

    fn swap_recipe(space: ReferenceColorSpace) -> CorrectionRecipe {
        // y = (g, b, r)
        let mapping = CorrectionMapping::new(
            MappingMethod::LinearCrossBand,
            [
                vec![0.0, 0.0, 1.0, 0.0],
                vec![0.0, 0.0, 0.0, 1.0],
                vec![0.0, 1.0, 0.0, 0.0],
            ],
        )
        .expect("mapping");
        CorrectionRecipe::new(mapping, ColorConverter::default(), space, PixelFormat::Rgb8)
    }

    fn image(format: PixelFormat) -> PlanarImage {
        PlanarImage::from_interleaved(2, 1, format, &[0.1, 0.2, 0.3, 0.9, 0.8, 0.7])
            .expect("image")
    }

    #[test]
    fn map_applies_the_mapping_per_pixel() {
        let recipe = swap_recipe(ReferenceColorSpace::Srgb);
        let bands = recipe.map(&image(PixelFormat::Rgb8)).expect("bands");
        assert_eq!(bands.space(), ReferenceColorSpace::Srgb);
        assert_abs_diff_eq!(bands.planes()[0][0], 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(bands.planes()[2][1], 0.9, epsilon = 1e-6);
    }

    #[test]
    fn map_is_repeatable() {
        let recipe = swap_recipe(ReferenceColorSpace::Srgb);
        let img = image(PixelFormat::Rgb8);
        assert_eq!(recipe.map(&img), recipe.map(&img));
    }

    #[test]
    fn other_formats_are_refused() {
        let recipe = swap_recipe(ReferenceColorSpace::Srgb);
        assert_eq!(
            recipe.map(&image(PixelFormat::Rgb16)),
            Err(RecipeError::FormatMismatch {
                expected: PixelFormat::Rgb8,
                actual: PixelFormat::Rgb16
            })
        );
    }

    #[test]
    fn srgb_output_is_clipped_and_tagged() {
        let mapping = CorrectionMapping::new(
            MappingMethod::Linear,
            [vec![-0.5, 1.0], vec![0.0, 3.0], vec![0.0, 1.0]],
        )
        .expect("mapping");
        let recipe = CorrectionRecipe::new(
            mapping,
            ColorConverter::default(),
            ReferenceColorSpace::Srgb,
            PixelFormat::Rgb8,
        );
        let out = recipe.correct(&image(PixelFormat::Rgb8)).expect("corrected");
        assert_eq!(out.format(), PixelFormat::Rgb8);
        let red = out.plane(0).expect("red");
        assert_eq!(red[0], 0.0);
        assert_abs_diff_eq!(red[1], 0.4, epsilon = 1e-6);
        assert_eq!(out.plane(1).map(|p| p[1]), Some(1.0));
    }

    #[test]
    fn xyz_bands_convert_back_to_srgb() {
        let conv = ColorConverter::default();
        let rgb = [0.2, 0.5, 0.7];
        let xyz = conv.srgb_to_xyz(rgb);
        // constant mapping onto one XYZ color
        let mapping = CorrectionMapping::new(
            MappingMethod::Linear,
            xyz.map(|v| vec![v, 0.0]),
        )
        .expect("mapping");
        let recipe =
            CorrectionRecipe::new(mapping, conv, ReferenceColorSpace::Xyz, PixelFormat::Rgb8);
        let out = recipe.correct(&image(PixelFormat::Rgb8)).expect("corrected");
        for (c, expected) in rgb.iter().enumerate() {
            assert_abs_diff_eq!(out.plane(c).expect("plane")[1], *expected as f32, epsilon = 1e-4);
        }
    }

    #[test]
    fn recipe_json_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recipe.json");
        let recipe = swap_recipe(ReferenceColorSpace::Lab);
        recipe.write_json(&path).expect("write");
        let loaded = CorrectionRecipe::load_json(&path).expect("load");
        assert_eq!(loaded, recipe);
    }
}
