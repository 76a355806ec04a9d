//! JSON configuration of a full calibrate-then-correct run.

use crate::batch::DEFAULT_EXTENSIONS;
use crate::method::MappingMethod;
use colorcal_chart::{
    builtin_chart, builtin_chart_names, ChartError, ChartIoError, ChartRegion, GridColorChart,
    COLORCHECKER_CLASSIC,
};
use colorcal_core::ReferenceColorSpace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown chart `{name}` (built-in charts: {})", builtin_chart_names().join(", "))]
    UnknownChart { name: String },
    #[error("give either a built-in chart name or a chart definition file, not both")]
    AmbiguousChart,
    #[error("chart definition {}: {source}", path.display())]
    ChartDefinition {
        path: PathBuf,
        #[source]
        source: ChartIoError,
    },
    #[error("region file {}: {source}", path.display())]
    Region {
        path: PathBuf,
        #[source]
        source: ChartIoError,
    },
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Chart region given inline or as a path to a region JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionSource {
    File(PathBuf),
    Inline(ChartRegion),
}

impl RegionSource {
    pub fn resolve(&self) -> Result<ChartRegion, ConfigError> {
        match self {
            RegionSource::Inline(region) => Ok(region.clone()),
            RegionSource::File(path) => {
                ChartRegion::load_json(path).map_err(|source| ConfigError::Region {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// Everything the `run` pipeline needs.
///
/// ```json
/// {
///   "chart": "ColorChecker Classic",
///   "chart_image": "shots/chart.jpg",
///   "chart_region": { "rect": { "x": 120, "y": 80, "width": 900, "height": 600 } },
///   "reference_space": "srgb",
///   "method": "linear_cross_band",
///   "src_dir": "shots",
///   "dst_dir": "corrected"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Built-in chart name; ColorChecker Classic when neither this nor
    /// `chart_definition` is set.
    #[serde(default)]
    pub chart: Option<String>,
    #[serde(default)]
    pub chart_definition: Option<PathBuf>,
    pub chart_image: PathBuf,
    pub chart_region: RegionSource,
    #[serde(default)]
    pub reference_space: ReferenceColorSpace,
    #[serde(default)]
    pub method: MappingMethod,
    #[serde(default)]
    pub chip_margin: Option<f64>,
    /// Per-patch enable mask, row-major.
    #[serde(default)]
    pub enabled: Option<Vec<bool>>,
    pub src_dir: PathBuf,
    pub dst_dir: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Where to save the fitted recipe.
    #[serde(default)]
    pub recipe_path: Option<PathBuf>,
    /// Where to save the calibration report.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl BatchConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The configured chart with margin and enable mask applied; not aligned.
    pub fn chart(&self) -> Result<GridColorChart, ConfigError> {
        let chart = resolve_chart(self.chart.as_deref(), self.chart_definition.as_deref())?;
        customize_chart(chart, self.chip_margin, self.enabled.as_deref())
    }

    pub fn region(&self) -> Result<ChartRegion, ConfigError> {
        self.chart_region.resolve()
    }
}

/// Pick a built-in chart by name or load a definition file.
pub fn resolve_chart(
    name: Option<&str>,
    definition: Option<&Path>,
) -> Result<GridColorChart, ConfigError> {
    match (name, definition) {
        (Some(_), Some(_)) => Err(ConfigError::AmbiguousChart),
        (None, Some(path)) => {
            colorcal_chart::load_chart_json(path).map_err(|source| ConfigError::ChartDefinition {
                path: path.to_path_buf(),
                source,
            })
        }
        (name, None) => {
            let name = name.unwrap_or(COLORCHECKER_CLASSIC);
            builtin_chart(name).ok_or_else(|| ConfigError::UnknownChart {
                name: name.to_string(),
            })
        }
    }
}

pub fn customize_chart(
    chart: GridColorChart,
    chip_margin: Option<f64>,
    enabled: Option<&[bool]>,
) -> Result<GridColorChart, ConfigError> {
    let chart = match chip_margin {
        Some(m) => chart.copy_with_chip_margin(m)?,
        None => chart,
    };
    Ok(match enabled {
        Some(mask) => chart.copy_with_enabled(mask)?,
        None => chart,
    })
}
