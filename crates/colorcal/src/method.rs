use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Largest number of regressors of any [`MappingMethod`].
pub const MAX_TERMS: usize = 20;

/// Model family used to map device colors to reference colors.
///
/// Each output band is a polynomial in the device bands, fitted by linear
/// least squares:
///
/// | method               | regressors per output band                         |
/// |----------------------|----------------------------------------------------|
/// | Linear               | 1, x_c (the same band only)                        |
/// | Linear Cross-band    | 1, r, g, b                                         |
/// | Quadratic Cross-band | linear + r², g², b², rg, rb, gb                    |
/// | Cubic Cross-band     | quadratic + r³, g³, b³, r²g, r²b, g²r, g²b, b²r, b²g, rgb |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    Linear,
    #[default]
    LinearCrossBand,
    QuadraticCrossBand,
    CubicCrossBand,
}

impl MappingMethod {
    pub const ALL: [MappingMethod; 4] = [
        MappingMethod::Linear,
        MappingMethod::LinearCrossBand,
        MappingMethod::QuadraticCrossBand,
        MappingMethod::CubicCrossBand,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            MappingMethod::Linear => "Linear",
            MappingMethod::LinearCrossBand => "Linear Cross-band",
            MappingMethod::QuadraticCrossBand => "Quadratic Cross-band",
            MappingMethod::CubicCrossBand => "Cubic Cross-band",
        }
    }

    /// Number of coefficients per output band.
    pub fn n_terms(self) -> usize {
        match self {
            MappingMethod::Linear => 2,
            MappingMethod::LinearCrossBand => 4,
            MappingMethod::QuadraticCrossBand => 10,
            MappingMethod::CubicCrossBand => 20,
        }
    }

    /// Write the regressors of output `band` for device color `x` into `buf`
    /// and return the filled prefix.
    #[inline]
    pub fn fill_terms<'a>(
        self,
        band: usize,
        x: [f64; 3],
        buf: &'a mut [f64; MAX_TERMS],
    ) -> &'a [f64] {
        let [r, g, b] = x;
        buf[0] = 1.0;
        if self == MappingMethod::Linear {
            buf[1] = x[band];
            return &buf[..2];
        }
        buf[1] = r;
        buf[2] = g;
        buf[3] = b;
        if self == MappingMethod::LinearCrossBand {
            return &buf[..4];
        }
        buf[4] = r * r;
        buf[5] = g * g;
        buf[6] = b * b;
        buf[7] = r * g;
        buf[8] = r * b;
        buf[9] = g * b;
        if self == MappingMethod::QuadraticCrossBand {
            return &buf[..10];
        }
        buf[10] = r * r * r;
        buf[11] = g * g * g;
        buf[12] = b * b * b;
        buf[13] = r * r * g;
        buf[14] = r * r * b;
        buf[15] = g * g * r;
        buf[16] = g * g * b;
        buf[17] = b * b * r;
        buf[18] = b * b * g;
        buf[19] = r * g * b;
        &buf[..20]
    }
}

impl fmt::Display for MappingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown mapping method `{0}` (expected Linear, Linear Cross-band, Quadratic Cross-band or Cubic Cross-band)")]
pub struct UnknownMappingMethod(pub String);

impl FromStr for MappingMethod {
    type Err = UnknownMappingMethod;

    /// Accepts display names and snake/kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "linear" => Ok(MappingMethod::Linear),
            "linearcrossband" => Ok(MappingMethod::LinearCrossBand),
            "quadraticcrossband" => Ok(MappingMethod::QuadraticCrossBand),
            "cubiccrossband" => Ok(MappingMethod::CubicCrossBand),
            _ => Err(UnknownMappingMethod(s.to_string())),
        }
    }
}
