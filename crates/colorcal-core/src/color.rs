//! Color spaces and conversions used by the calibration pipeline.
//!
//! All conversions go through CIE XYZ scaled so that the reference white has
//! `Y = 1`. A [`ColorConverter`] carries the reference white of a chart; sRGB
//! is always D65, so charts defined under D50 are Bradford-adapted on the way
//! to and from sRGB. The colorimetry itself is `palette`'s; values are never
//! clamped to the gamut.

use palette::chromatic_adaptation::{AdaptInto, Method};
use palette::convert::FromColorUnclamped;
use palette::white_point::{WhitePoint, D50, D65};
use palette::{Lab, LinSrgb, Srgb, Xyz};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Color space in which reference chart values are expressed and in which
/// the correction mapping produces its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceColorSpace {
    /// Gamma-encoded sRGB, components in `[0, 1]`.
    #[default]
    Srgb,
    /// CIE XYZ relative to the chart white, `Y_white = 1`.
    Xyz,
    /// CIE L*a*b* relative to the chart white.
    Lab,
}

impl ReferenceColorSpace {
    pub const ALL: [ReferenceColorSpace; 3] = [
        ReferenceColorSpace::Srgb,
        ReferenceColorSpace::Xyz,
        ReferenceColorSpace::Lab,
    ];

    pub fn band_names(self) -> [&'static str; 3] {
        match self {
            ReferenceColorSpace::Srgb => ["R", "G", "B"],
            ReferenceColorSpace::Xyz => ["X", "Y", "Z"],
            ReferenceColorSpace::Lab => ["L*", "a*", "b*"],
        }
    }
}

impl fmt::Display for ReferenceColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceColorSpace::Srgb => "sRGB",
            ReferenceColorSpace::Xyz => "XYZ",
            ReferenceColorSpace::Lab => "L*a*b*",
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown reference color space `{0}` (expected sRGB, XYZ or L*a*b*)")]
pub struct UnknownColorSpace(pub String);

impl FromStr for ReferenceColorSpace {
    type Err = UnknownColorSpace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srgb" => Ok(ReferenceColorSpace::Srgb),
            "xyz" => Ok(ReferenceColorSpace::Xyz),
            "lab" | "l*a*b*" | "cielab" => Ok(ReferenceColorSpace::Lab),
            _ => Err(UnknownColorSpace(s.to_string())),
        }
    }
}

/// CIE standard illuminant used as a chart's reference white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Illuminant {
    D50,
    #[default]
    D65,
}

impl Illuminant {
    /// XYZ of the white point with `Y = 1`.
    pub fn white_xyz(self) -> [f64; 3] {
        let white = match self {
            Illuminant::D50 => <D50 as WhitePoint<f64>>::get_xyz(),
            Illuminant::D65 => <D65 as WhitePoint<f64>>::get_xyz(),
        };
        [white.x, white.y, white.z]
    }
}

/// sRGB electro-optical transfer function (decode).
#[inline]
pub fn srgb_to_linear(v: f64) -> f64 {
    let linear: LinSrgb<f64> = Srgb::new(v, v, v).into_linear();
    linear.red
}

/// Inverse of [`srgb_to_linear`]; negative input is mirrored.
#[inline]
pub fn linear_to_srgb(v: f64) -> f64 {
    if v < 0.0 {
        return -linear_to_srgb(-v);
    }
    Srgb::<f64>::from_linear(LinSrgb::new(v, v, v)).red
}

/// CIE 1976 color difference between two L*a*b* colors.
#[inline]
pub fn delta_e76(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

fn xyz_components<Wp>(xyz: Xyz<Wp, f64>) -> [f64; 3] {
    [xyz.x, xyz.y, xyz.z]
}

fn lab_components<Wp>(lab: Lab<Wp, f64>) -> [f64; 3] {
    [lab.l, lab.a, lab.b]
}

/// Converts between the reference color spaces for one reference white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ColorConverter {
    illuminant: Illuminant,
}

impl ColorConverter {
    pub fn new(illuminant: Illuminant) -> Self {
        Self { illuminant }
    }

    #[inline]
    pub fn illuminant(&self) -> Illuminant {
        self.illuminant
    }

    /// Chart-relative XYZ to D65, the white of sRGB.
    fn to_d65(&self, xyz: [f64; 3]) -> Xyz<D65, f64> {
        let [x, y, z] = xyz;
        match self.illuminant {
            Illuminant::D65 => Xyz::new(x, y, z),
            Illuminant::D50 => Xyz::<D50, f64>::new(x, y, z).adapt_into_using(Method::Bradford),
        }
    }

    fn from_d65(&self, xyz: Xyz<D65, f64>) -> [f64; 3] {
        match self.illuminant {
            Illuminant::D65 => xyz_components(xyz),
            Illuminant::D50 => {
                let adapted: Xyz<D50, f64> = xyz.adapt_into_using(Method::Bradford);
                xyz_components(adapted)
            }
        }
    }

    pub fn srgb_to_xyz(&self, rgb: [f64; 3]) -> [f64; 3] {
        let linear: LinSrgb<f64> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_linear();
        self.from_d65(Xyz::from_color_unclamped(linear))
    }

    /// XYZ to sRGB, without gamut clipping.
    pub fn xyz_to_srgb(&self, xyz: [f64; 3]) -> [f64; 3] {
        let linear = LinSrgb::<f64>::from_color_unclamped(self.to_d65(xyz));
        [linear.red, linear.green, linear.blue].map(linear_to_srgb)
    }

    pub fn xyz_to_lab(&self, xyz: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = xyz;
        match self.illuminant {
            Illuminant::D50 => {
                lab_components(Lab::from_color_unclamped(Xyz::<D50, f64>::new(x, y, z)))
            }
            Illuminant::D65 => {
                lab_components(Lab::from_color_unclamped(Xyz::<D65, f64>::new(x, y, z)))
            }
        }
    }

    pub fn lab_to_xyz(&self, lab: [f64; 3]) -> [f64; 3] {
        let [l, a, b] = lab;
        match self.illuminant {
            Illuminant::D50 => {
                xyz_components(Xyz::from_color_unclamped(Lab::<D50, f64>::new(l, a, b)))
            }
            Illuminant::D65 => {
                xyz_components(Xyz::from_color_unclamped(Lab::<D65, f64>::new(l, a, b)))
            }
        }
    }

    /// Express an XYZ color in `space`.
    pub fn from_xyz(&self, space: ReferenceColorSpace, xyz: [f64; 3]) -> [f64; 3] {
        match space {
            ReferenceColorSpace::Srgb => self.xyz_to_srgb(xyz),
            ReferenceColorSpace::Xyz => xyz,
            ReferenceColorSpace::Lab => self.xyz_to_lab(xyz),
        }
    }

    /// Convert a color expressed in `space` to XYZ.
    pub fn to_xyz(&self, space: ReferenceColorSpace, value: [f64; 3]) -> [f64; 3] {
        match space {
            ReferenceColorSpace::Srgb => self.srgb_to_xyz(value),
            ReferenceColorSpace::Xyz => value,
            ReferenceColorSpace::Lab => self.lab_to_xyz(value),
        }
    }

    pub fn to_lab(&self, space: ReferenceColorSpace, value: [f64; 3]) -> [f64; 3] {
        match space {
            ReferenceColorSpace::Lab => value,
            _ => self.xyz_to_lab(self.to_xyz(space, value)),
        }
    }

    pub fn to_srgb(&self, space: ReferenceColorSpace, value: [f64; 3]) -> [f64; 3] {
        match space {
            ReferenceColorSpace::Srgb => value,
            _ => self.xyz_to_srgb(self.to_xyz(space, value)),
        }
    }
}
