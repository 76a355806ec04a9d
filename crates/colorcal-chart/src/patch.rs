use colorcal_core::{ColorConverter, ReferenceColorSpace};
use serde::{Deserialize, Serialize};

/// Reference value of a chart patch, in the notation it was published in.
///
/// `Xyz` and `Lab` are relative to the chart's illuminant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceColor {
    /// 8-bit gamma-encoded sRGB.
    Srgb8([u8; 3]),
    /// Gamma-encoded sRGB in `[0, 1]`.
    Srgb([f64; 3]),
    Xyz([f64; 3]),
    Lab([f64; 3]),
}

impl ReferenceColor {
    pub fn to_xyz(&self, converter: &ColorConverter) -> [f64; 3] {
        match *self {
            ReferenceColor::Srgb8(rgb) => converter.srgb_to_xyz(rgb.map(|v| f64::from(v) / 255.0)),
            ReferenceColor::Srgb(rgb) => converter.srgb_to_xyz(rgb),
            ReferenceColor::Xyz(xyz) => xyz,
            ReferenceColor::Lab(lab) => converter.lab_to_xyz(lab),
        }
    }

    /// Value of this color in `space`.
    pub fn in_space(&self, space: ReferenceColorSpace, converter: &ColorConverter) -> [f64; 3] {
        converter.from_xyz(space, self.to_xyz(converter))
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            ReferenceColor::Srgb8(_) => true,
            ReferenceColor::Srgb(v) | ReferenceColor::Xyz(v) | ReferenceColor::Lab(v) => {
                v.iter().all(|c| c.is_finite())
            }
        }
    }
}

/// One named color swatch at a fixed cell of the chart grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    /// Zero-based grid row.
    pub row: usize,
    /// Zero-based grid column.
    pub col: usize,
    pub color: ReferenceColor,
}
