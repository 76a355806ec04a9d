//! Chart-based color calibration.
//!
//! Photograph a reference chart with known patch colors, fit a mapping from
//! the camera's device colors to a reference color space, then apply that
//! mapping to every other shot taken under the same conditions.
//!
//! ## Quickstart
//!
//! ```no_run
//! use colorcal::{calibrate, load_image, BatchCorrector, MappingMethod};
//! use colorcal::chart::{builtin_chart, ChartRegion, COLORCHECKER_CLASSIC};
//! use colorcal::core::ReferenceColorSpace;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let chart = builtin_chart(COLORCHECKER_CLASSIC).expect("built-in chart");
//! let region = ChartRegion::load_json("chart_region.json")?;
//! let image = load_image("shots/chart.jpg")?;
//!
//! let calibration = calibrate(
//!     &image,
//!     &chart,
//!     &region,
//!     ReferenceColorSpace::Srgb,
//!     MappingMethod::LinearCrossBand,
//! )?;
//! println!("mean dE: {:.2}", calibration.fit.diagnostics.mean);
//!
//! let report = BatchCorrector::new(calibration.recipe)
//!     .run(Path::new("shots"), Path::new("corrected"))?;
//! println!("{} corrected, {} failed", report.written.len(), report.failures.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `colorcal::core`: color spaces, homographies, planar image buffers, logger.
//! - `colorcal::chart`: chart models, built-in charts, chart regions.
//! - [`ColorCalibrator`] / [`calibrate`]: patch sampling and fitting.
//! - [`CorrectionRecipe`]: applies a fitted mapping to whole images.
//! - [`BatchCorrector`] (feature `image`): directory-level correction.
//!
//! ## Features
//! - `image` (default): file I/O, batches, JSON run configs and reports.
//! - `cli` (default): the `colorcal` binary.
//! - `parallel`: process batch files on the `rayon` thread pool.
//! - `tracing`: spans on the fitting and batch entry points.

pub use colorcal_chart as chart;
pub use colorcal_core as core;

mod calibrator;
mod mapping;
mod method;
mod recipe;

pub use calibrator::{
    calibrate, Calibration, CalibrationError, CalibrationFit, ColorCalibrator, FitDiagnostics,
    SampledPatch, SamplingError,
};
pub use mapping::{CorrectionMapping, FittingError, MIN_RECIPROCAL_CONDITION};
pub use method::{MappingMethod, UnknownMappingMethod, MAX_TERMS};
pub use recipe::{CorrectedBands, CorrectionRecipe, RecipeError, RecipeIoError};

#[cfg(feature = "image")]
mod batch;
#[cfg(feature = "image")]
mod config;
#[cfg(feature = "image")]
mod io;
#[cfg(feature = "image")]
mod pipeline;
#[cfg(feature = "image")]
mod report;

#[cfg(feature = "image")]
pub use batch::{
    BatchCorrector, BatchError, BatchOutput, BatchReport, FileError, FileFailure,
    DEFAULT_EXTENSIONS,
};
#[cfg(feature = "image")]
pub use config::{customize_chart, resolve_chart, BatchConfig, ConfigError, RegionSource};
#[cfg(feature = "image")]
pub use io::{dynamic_from_planar, load_image, planar_from_dynamic, save_image, ImageIoError};
#[cfg(feature = "image")]
pub use pipeline::{run_pipeline, PipelineError, PipelineOutcome};
#[cfg(feature = "image")]
pub use report::{BatchSummary, CalibrationReport, FailedFile, FitSummary, PatchReport};
