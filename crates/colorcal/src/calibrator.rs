//! Patch sampling and calibration fitting against an aligned chart.

use crate::mapping::{CorrectionMapping, FittingError};
use crate::method::MappingMethod;
use crate::recipe::CorrectionRecipe;
use colorcal_chart::{AlignmentError, ChartRegion, GridColorChart};
use colorcal_core::{delta_e76, PixelFormat, PlanarImage, Point2, ReferenceColorSpace};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors reading patch colors out of an image.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error(
        "patch {index} (`{name}`) reaches ({x:.1}, {y:.1}), outside the {width}x{height} image"
    )]
    PatchOutOfBounds {
        index: usize,
        name: String,
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },
    #[error("patch {index} (`{name}`) covers no pixel centers")]
    EmptyPatch { index: usize, name: String },
}

/// Everything that can stop a calibration; no recipe exists afterwards.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration needs a three-band image, got {format}")]
    UnsupportedFormat { format: PixelFormat },
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Sampling(#[from] SamplingError),
    #[error(transparent)]
    Fitting(#[from] FittingError),
}

/// Mean device color of one chart patch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampledPatch {
    /// Index of the patch in the chart (row-major).
    pub index: usize,
    pub name: String,
    /// Normalized device value per band.
    pub value: [f64; 3],
    pub pixel_count: usize,
}

/// Quality of a fit, measured on the calibration patches themselves.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FitDiagnostics {
    /// CIE ΔE*76 between corrected and reference color, per sampled patch.
    pub delta_e: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    /// Root-mean-square residual per band of the reference space.
    pub rms_residual: [f64; 3],
}

impl FitDiagnostics {
    fn compute(
        converter: &colorcal_core::ColorConverter,
        space: ReferenceColorSpace,
        corrected: &[[f64; 3]],
        reference: &[[f64; 3]],
    ) -> Self {
        let delta_e: Vec<f64> = corrected
            .iter()
            .zip(reference)
            .map(|(c, r)| delta_e76(converter.to_lab(space, *c), converter.to_lab(space, *r)))
            .collect();

        let n = delta_e.len().max(1) as f64;
        let mean = delta_e.iter().sum::<f64>() / n;
        let max = delta_e.iter().copied().fold(0.0, f64::max);
        let mut sorted = delta_e.clone();
        sorted.sort_by(f64::total_cmp);
        let median = match sorted.len() {
            0 => 0.0,
            len if len % 2 == 1 => sorted[len / 2],
            len => 0.5 * (sorted[len / 2 - 1] + sorted[len / 2]),
        };

        let rms_residual = std::array::from_fn(|k| {
            let ss: f64 = corrected
                .iter()
                .zip(reference)
                .map(|(c, r)| (c[k] - r[k]).powi(2))
                .sum();
            (ss / n).sqrt()
        });

        Self {
            delta_e,
            mean,
            median,
            max,
            rms_residual,
        }
    }
}

/// Result of [`ColorCalibrator::compute_calibration_mapping`].
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationFit {
    pub corrector: CorrectionMapping,
    pub samples: Vec<SampledPatch>,
    /// Reference color of each sampled patch in the calibrator's space.
    pub reference: Vec<[f64; 3]>,
    /// Each sample pushed through `corrector`.
    pub corrected: Vec<[f64; 3]>,
    pub diagnostics: FitDiagnostics,
}

/// Fits a [`CorrectionMapping`] from an image of an aligned chart.
#[derive(Clone, Debug)]
pub struct ColorCalibrator {
    chart: GridColorChart,
    space: ReferenceColorSpace,
    method: MappingMethod,
}

impl ColorCalibrator {
    /// `chart` must already be aligned to the image it will be used on.
    pub fn new(chart: GridColorChart, space: ReferenceColorSpace, method: MappingMethod) -> Self {
        Self {
            chart,
            space,
            method,
        }
    }

    pub fn chart(&self) -> &GridColorChart {
        &self.chart
    }

    pub fn reference_color_space(&self) -> ReferenceColorSpace {
        self.space
    }

    pub fn mapping_method(&self) -> MappingMethod {
        self.method
    }

    /// Mean color of every enabled patch. Fails on the first patch whose
    /// sampling window leaves the image or holds no pixel centers.
    pub fn sample_patches(&self, image: &PlanarImage) -> Result<Vec<SampledPatch>, SamplingError> {
        self.chart
            .enabled_indices()
            .map(|index| sample_patch(&self.chart, image, index))
            .collect()
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image),
            fields(chart = %self.chart.name(), method = %self.method, space = %self.space)
        )
    )]
    pub fn compute_calibration_mapping(
        &self,
        image: &PlanarImage,
    ) -> Result<CalibrationFit, CalibrationError> {
        if !image.format().is_color() {
            return Err(CalibrationError::UnsupportedFormat {
                format: image.format(),
            });
        }

        let samples = self.sample_patches(image)?;
        let all_reference = self.chart.reference_values(self.space);
        let reference: Vec<[f64; 3]> = samples.iter().map(|s| all_reference[s.index]).collect();
        let observed: Vec<[f64; 3]> = samples.iter().map(|s| s.value).collect();

        let corrector = CorrectionMapping::fit(self.method, &observed, &reference)?;
        let corrected: Vec<[f64; 3]> = observed.iter().map(|&x| corrector.map_color(x)).collect();
        let diagnostics = FitDiagnostics::compute(
            self.chart.color_converter(),
            self.space,
            &corrected,
            &reference,
        );

        for (s, de) in samples.iter().zip(&diagnostics.delta_e) {
            log::debug!(
                "patch {:>2} {:<16} n={:<6} dE={:.2}",
                s.index,
                s.name,
                s.pixel_count,
                de
            );
        }
        log::info!(
            "{} fit on {} patches in {}: mean dE {:.2}, median {:.2}, max {:.2}",
            self.method,
            samples.len(),
            self.space,
            diagnostics.mean,
            diagnostics.median,
            diagnostics.max
        );

        Ok(CalibrationFit {
            corrector,
            samples,
            reference,
            corrected,
            diagnostics,
        })
    }

    /// Fit on `image` and package the result as a recipe for images of the
    /// same pixel format.
    pub fn create_recipe(
        &self,
        image: &PlanarImage,
    ) -> Result<(CorrectionRecipe, CalibrationFit), CalibrationError> {
        let fit = self.compute_calibration_mapping(image)?;
        let recipe = CorrectionRecipe::new(
            fit.corrector.clone(),
            *self.chart.color_converter(),
            self.space,
            image.format(),
        );
        Ok((recipe, fit))
    }
}

/// Fitted recipe plus the calibrator and fit it came from.
#[derive(Clone, Debug)]
pub struct Calibration {
    pub calibrator: ColorCalibrator,
    pub recipe: CorrectionRecipe,
    pub fit: CalibrationFit,
}

/// Align `chart` to `region` in `image` and fit a recipe in one go.
pub fn calibrate(
    image: &PlanarImage,
    chart: &GridColorChart,
    region: &ChartRegion,
    space: ReferenceColorSpace,
    method: MappingMethod,
) -> Result<Calibration, CalibrationError> {
    let aligned = chart.copy_aligned_to(region)?;
    let calibrator = ColorCalibrator::new(aligned, space, method);
    let (recipe, fit) = calibrator.create_recipe(image)?;
    Ok(Calibration {
        calibrator,
        recipe,
        fit,
    })
}

fn sample_patch(
    chart: &GridColorChart,
    image: &PlanarImage,
    index: usize,
) -> Result<SampledPatch, SamplingError> {
    let patch = &chart.patches()[index];
    let empty = || SamplingError::EmptyPatch {
        index,
        name: patch.name.clone(),
    };
    let quad = chart.patch_outline(index).ok_or_else(empty)?;

    let (w, h) = (image.width() as f64, image.height() as f64);
    if let Some(p) = quad
        .corners
        .iter()
        .find(|p| !(0.0..=w).contains(&p.x) || !(0.0..=h).contains(&p.y))
    {
        return Err(SamplingError::PatchOutOfBounds {
            index,
            name: patch.name.clone(),
            x: p.x,
            y: p.y,
            width: image.width(),
            height: image.height(),
        });
    }

    // corners are inside the image, so the casts below stay in range
    let (min, max) = quad.bounds();
    let x0 = min.x.floor() as usize;
    let y0 = min.y.floor() as usize;
    let x1 = (max.x.ceil() as usize).min(image.width());
    let y1 = (max.y.ceil() as usize).min(image.height());

    let planes = image.planes();
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            if !quad.contains(Point2::new(x as f64 + 0.5, y as f64 + 0.5)) {
                continue;
            }
            let idx = y * image.width() + x;
            for (acc, plane) in sum.iter_mut().zip(planes) {
                *acc += f64::from(plane[idx]);
            }
            count += 1;
        }
    }
    if count == 0 {
        return Err(empty());
    }

    let n = count as f64;
    Ok(SampledPatch {
        index,
        name: patch.name.clone(),
        value: sum.map(|s| s / n),
        pixel_count: count,
    })
}
