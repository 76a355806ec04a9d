//! Chart location in an image.

use crate::{AlignmentError, ChartIoError};
use colorcal_core::{Point2, Quad};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Regions with area below this (px²) cannot carry a chart.
pub const MIN_REGION_AREA: f64 = 1e-6;

/// Where the chart appears in a calibration image.
///
/// Corners follow the chart's own orientation: top-left, top-right,
/// bottom-right, bottom-left of the chart, whatever their position in the
/// image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRegion {
    Quad([[f64; 2]; 4]),
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Polygon(Vec<[f64; 2]>),
}

impl ChartRegion {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        ChartRegion::Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Validated corner quad of this region.
    ///
    /// Rejects regions that cannot determine a chart-to-image mapping:
    /// wrong vertex count, non-finite or zero-area geometry, collinear corners
    /// and non-convex outlines.
    pub fn quad(&self) -> Result<Quad, AlignmentError> {
        let corners: [[f64; 2]; 4] = match self {
            ChartRegion::Quad(c) => *c,
            ChartRegion::Rect {
                x,
                y,
                width,
                height,
            } => {
                if !(*width > 0.0 && *height > 0.0) {
                    return Err(AlignmentError::EmptyRect {
                        width: *width,
                        height: *height,
                    });
                }
                [
                    [*x, *y],
                    [x + width, *y],
                    [x + width, y + height],
                    [*x, y + height],
                ]
            }
            ChartRegion::Polygon(pts) => pts
                .as_slice()
                .try_into()
                .map_err(|_| AlignmentError::VertexCount { got: pts.len() })?,
        };

        if let Some(index) = corners
            .iter()
            .position(|c| !c[0].is_finite() || !c[1].is_finite())
        {
            return Err(AlignmentError::NonFinite { index });
        }

        let quad = Quad::new(corners.map(|[x, y]| Point2::new(x, y)));
        let area = quad.area();
        if area < MIN_REGION_AREA {
            return Err(AlignmentError::ZeroArea { area });
        }

        let scale = area.sqrt();
        let turns = quad.turn_cross_products();
        if let Some(corner) = turns
            .iter()
            .position(|t| t.abs() <= 1e-9 * scale * scale)
        {
            return Err(AlignmentError::Collinear { corner });
        }
        if !quad.is_strictly_convex() {
            return Err(AlignmentError::NotConvex);
        }
        Ok(quad)
    }

    /// Load a region descriptor from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ChartIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this region to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ChartIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_expands_to_clockwise_corners() {
        let q = ChartRegion::rect(10.0, 20.0, 30.0, 40.0).quad().expect("quad");
        assert_eq!(q.corners[0], Point2::new(10.0, 20.0));
        assert_eq!(q.corners[2], Point2::new(40.0, 60.0));
    }

    #[test]
    fn zero_area_quad_is_rejected() {
        let region = ChartRegion::Quad([[5.0, 5.0]; 4]);
        assert!(matches!(
            region.quad(),
            Err(AlignmentError::ZeroArea { .. })
        ));
    }

    #[test]
    fn flat_quad_is_rejected() {
        let region = ChartRegion::Quad([[0.0, 0.0], [10.0, 0.0], [20.0, 0.0], [30.0, 0.0]]);
        assert!(matches!(
            region.quad(),
            Err(AlignmentError::ZeroArea { .. })
        ));
    }

    #[test]
    fn three_collinear_corners_are_rejected() {
        let region = ChartRegion::Quad([[0.0, 0.0], [10.0, 0.0], [20.0, 0.0], [0.0, 10.0]]);
        assert_eq!(region.quad(), Err(AlignmentError::Collinear { corner: 1 }));
    }

    #[test]
    fn polygon_needs_four_vertices() {
        let region = ChartRegion::Polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(region.quad(), Err(AlignmentError::VertexCount { got: 3 }));
    }

    #[test]
    fn self_intersecting_quad_is_rejected() {
        let region = ChartRegion::Quad([[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 12.0]]);
        assert!(region.quad().is_err());
    }

    #[test]
    fn negative_rect_is_rejected() {
        assert!(matches!(
            ChartRegion::rect(0.0, 0.0, -4.0, 3.0).quad(),
            Err(AlignmentError::EmptyRect { .. })
        ));
    }

    #[test]
    fn parses_json_descriptors() {
        let quad: ChartRegion =
            serde_json::from_str(r#"{"quad": [[0,0],[60,0],[60,40],[0,40]]}"#).expect("quad");
        let rect: ChartRegion =
            serde_json::from_str(r#"{"rect": {"x": 0, "y": 0, "width": 60, "height": 40}}"#)
                .expect("rect");
        assert_eq!(quad.quad().expect("q"), rect.quad().expect("r"));
    }
}
