//! JSON chart definitions for charts that are not built in.

use crate::{ChartError, ChartIoError, GridColorChart, ReferenceColor, DEFAULT_CHIP_MARGIN};
use colorcal_core::{ColorConverter, Illuminant};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

fn default_chip_margin() -> f64 {
    DEFAULT_CHIP_MARGIN
}

/// One patch entry of a [`ChartDefinition`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchDefinition {
    pub name: String,
    pub color: ReferenceColor,
}

/// Serializable chart description; patches are listed row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    #[serde(default = "default_chip_margin")]
    pub chip_margin: f64,
    #[serde(default)]
    pub illuminant: Illuminant,
    pub patches: Vec<PatchDefinition>,
}

impl ChartDefinition {
    pub fn build(&self) -> Result<GridColorChart, ChartError> {
        let colors = self
            .patches
            .iter()
            .map(|p| (p.name.clone(), p.color))
            .collect();
        GridColorChart::new(
            self.name.clone(),
            self.rows,
            self.cols,
            colors,
            ColorConverter::new(self.illuminant),
        )?
        .copy_with_chip_margin(self.chip_margin)
    }

    pub fn from_chart(chart: &GridColorChart) -> Self {
        Self {
            name: chart.name().to_string(),
            rows: chart.n_rows(),
            cols: chart.n_cols(),
            chip_margin: chart.chip_margin(),
            illuminant: chart.color_converter().illuminant(),
            patches: chart
                .patches()
                .iter()
                .map(|p| PatchDefinition {
                    name: p.name.clone(),
                    color: p.color,
                })
                .collect(),
        }
    }

    /// Load a chart definition from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ChartIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this definition to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ChartIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Load and validate a chart definition file.
pub fn load_chart_json(path: impl AsRef<Path>) -> Result<GridColorChart, ChartIoError> {
    Ok(ChartDefinition::load_json(path)?.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorcal_core::ReferenceColorSpace;

    #[test]
    fn definition_defaults_margin_and_illuminant() {
        let json = r#"{
            "name": "two",
            "rows": 1,
            "cols": 2,
            "patches": [
                {"name": "white", "color": {"srgb8": [255, 255, 255]}},
                {"name": "mid", "color": {"lab": [50.0, 0.0, 0.0]}}
            ]
        }"#;
        let def: ChartDefinition = serde_json::from_str(json).expect("parse");
        assert_eq!(def.chip_margin, DEFAULT_CHIP_MARGIN);
        assert_eq!(def.illuminant, Illuminant::D65);

        let chart = def.build().expect("chart");
        assert_eq!(chart.patches().len(), 2);
        assert_eq!(ChartDefinition::from_chart(&chart), def);
    }

    #[test]
    fn d50_lab_definition_builds_a_user_chart() {
        let json = r#"{
            "name": "ColorGauge Matte",
            "rows": 1,
            "cols": 2,
            "illuminant": "D50",
            "patches": [
                {"name": "White", "color": {"lab": [95.9, -0.4, 1.9]}},
                {"name": "Blue", "color": {"srgb": [0.22, 0.24, 0.58]}}
            ]
        }"#;
        let chart = serde_json::from_str::<ChartDefinition>(json)
            .expect("parse")
            .build()
            .expect("chart");
        assert_eq!(chart.color_converter().illuminant(), Illuminant::D50);
        let white = chart.reference_values(ReferenceColorSpace::Srgb)[0];
        assert!(white.iter().all(|&c| c > 0.85 && c < 1.0), "{white:?}");
    }

    #[test]
    fn invalid_margin_in_definition_fails_build() {
        let def = ChartDefinition {
            name: "x".into(),
            rows: 1,
            cols: 1,
            chip_margin: 0.7,
            illuminant: Illuminant::D50,
            patches: vec![PatchDefinition {
                name: "p".into(),
                color: ReferenceColor::Xyz([0.2, 0.2, 0.2]),
            }],
        };
        assert_eq!(def.build(), Err(ChartError::InvalidChipMargin(0.7)));
    }
}
