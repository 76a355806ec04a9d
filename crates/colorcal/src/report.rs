//! Serializable summary of a calibration and the batch that used it.

use crate::batch::BatchReport;
use crate::calibrator::{CalibrationFit, ColorCalibrator};
use crate::method::MappingMethod;
use colorcal_core::{Illuminant, PixelFormat, ReferenceColorSpace};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize)]
pub struct PatchReport {
    pub index: usize,
    pub name: String,
    pub pixel_count: usize,
    pub observed: [f64; 3],
    pub reference: [f64; 3],
    pub corrected: [f64; 3],
    pub delta_e: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct FitSummary {
    pub mean_delta_e: f64,
    pub median_delta_e: f64,
    pub max_delta_e: f64,
    /// Band labels of the reference space, in the order of `rms_residual`.
    pub bands: [&'static str; 3],
    pub rms_residual: [f64; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<FailedFile>,
}

impl From<&BatchReport> for BatchSummary {
    fn from(report: &BatchReport) -> Self {
        Self {
            written: report.written.iter().map(|w| w.output.clone()).collect(),
            failures: report
                .failures
                .iter()
                .map(|f| FailedFile {
                    source: f.source.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CalibrationReport {
    pub chart: String,
    pub method: MappingMethod,
    pub reference_space: ReferenceColorSpace,
    pub illuminant: Illuminant,
    pub pixel_format: PixelFormat,
    /// Chart-to-image homography, row-major.
    pub alignment: [[f64; 3]; 3],
    pub patches: Vec<PatchReport>,
    pub summary: FitSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchSummary>,
}

impl CalibrationReport {
    pub fn new(
        calibrator: &ColorCalibrator,
        fit: &CalibrationFit,
        pixel_format: PixelFormat,
    ) -> Self {
        let chart = calibrator.chart();
        let reference_space = calibrator.reference_color_space();
        let patches = fit
            .samples
            .iter()
            .zip(&fit.reference)
            .zip(&fit.corrected)
            .zip(&fit.diagnostics.delta_e)
            .map(|(((s, r), c), de)| PatchReport {
                index: s.index,
                name: s.name.clone(),
                pixel_count: s.pixel_count,
                observed: s.value,
                reference: *r,
                corrected: *c,
                delta_e: *de,
            })
            .collect();

        Self {
            chart: chart.name().to_string(),
            method: calibrator.mapping_method(),
            reference_space,
            illuminant: chart.color_converter().illuminant(),
            pixel_format,
            alignment: chart.alignment().to_array(),
            patches,
            summary: FitSummary {
                mean_delta_e: fit.diagnostics.mean,
                median_delta_e: fit.diagnostics.median,
                max_delta_e: fit.diagnostics.max,
                bands: reference_space.band_names(),
                rms_residual: fit.diagnostics.rms_residual,
            },
            batch: None,
        }
    }

    pub fn with_batch(mut self, batch: &BatchReport) -> Self {
        self.batch = Some(batch.into());
        self
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
