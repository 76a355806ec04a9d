//! End-to-end run: calibrate on one chart shot, then correct a directory.

use crate::batch::{BatchCorrector, BatchError, BatchReport};
use crate::calibrator::{calibrate, CalibrationError};
use crate::config::{BatchConfig, ConfigError};
use crate::io::{load_image, ImageIoError};
use crate::recipe::{CorrectionRecipe, RecipeIoError};
use crate::report::CalibrationReport;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Image(#[from] ImageIoError),
    #[error("calibration failed: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("cannot write recipe {}: {source}", path.display())]
    Recipe {
        path: PathBuf,
        #[source]
        source: RecipeIoError,
    },
    #[error("cannot write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

pub struct PipelineOutcome {
    pub recipe: CorrectionRecipe,
    pub report: CalibrationReport,
    pub batch: BatchReport,
}

/// Run everything a [`BatchConfig`] describes. Calibration failures stop the
/// run before any output is written.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cfg)))]
pub fn run_pipeline(cfg: &BatchConfig) -> Result<PipelineOutcome, PipelineError> {
    let chart = cfg.chart()?;
    let region = cfg.region()?;
    log::info!("calibrating on {}", cfg.chart_image.display());
    let image = load_image(&cfg.chart_image)?;
    let calibration = calibrate(&image, &chart, &region, cfg.reference_space, cfg.method)?;
    drop(image);

    if let Some(path) = &cfg.recipe_path {
        calibration
            .recipe
            .write_json(path)
            .map_err(|source| PipelineError::Recipe {
                path: path.clone(),
                source,
            })?;
        log::info!("recipe saved to {}", path.display());
    }

    let batch = BatchCorrector::new(calibration.recipe.clone())
        .with_extensions(&cfg.extensions)
        .run(&cfg.src_dir, &cfg.dst_dir)?;

    let report = CalibrationReport::new(
        &calibration.calibrator,
        &calibration.fit,
        calibration.recipe.pixel_format(),
    )
    .with_batch(&batch);
    if let Some(path) = &cfg.report_path {
        report.write_json(path).map_err(|source| PipelineError::Report {
            path: path.clone(),
            source,
        })?;
    }

    Ok(PipelineOutcome {
        recipe: calibration.recipe,
        report,
        batch,
    })
}
