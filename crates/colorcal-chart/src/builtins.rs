//! Built-in reference charts.

use crate::{ChartError, GridColorChart, ReferenceColor};
use colorcal_core::{ColorConverter, Illuminant};

pub const COLORCHECKER_CLASSIC: &str = "ColorChecker Classic";

/// X-Rite ColorChecker Classic, sRGB (D65) values, 4 rows × 6 columns.
const COLORCHECKER_CLASSIC_SRGB: [(&str, [u8; 3]); 24] = [
    ("Dark Skin", [115, 82, 68]),
    ("Light Skin", [194, 150, 130]),
    ("Blue Sky", [98, 122, 157]),
    ("Foliage", [87, 108, 67]),
    ("Blue Flower", [133, 128, 177]),
    ("Bluish Green", [103, 189, 170]),
    ("Orange", [214, 126, 44]),
    ("Purplish Blue", [80, 91, 166]),
    ("Moderate Red", [193, 90, 99]),
    ("Purple", [94, 60, 108]),
    ("Yellow Green", [157, 188, 64]),
    ("Orange Yellow", [224, 163, 46]),
    ("Blue", [56, 61, 150]),
    ("Green", [70, 148, 73]),
    ("Red", [175, 54, 60]),
    ("Yellow", [231, 199, 31]),
    ("Magenta", [187, 86, 149]),
    ("Cyan", [8, 133, 161]),
    ("White 9.5", [243, 243, 242]),
    ("Neutral 8", [200, 200, 200]),
    ("Neutral 6.5", [160, 160, 160]),
    ("Neutral 5", [122, 122, 121]),
    ("Neutral 3.5", [85, 85, 85]),
    ("Black 2", [52, 52, 52]),
];

/// Names accepted by [`builtin_chart`].
pub fn builtin_chart_names() -> &'static [&'static str] {
    &[COLORCHECKER_CLASSIC]
}

/// Look up a built-in chart by name (case-insensitive).
pub fn builtin_chart(name: &str) -> Option<GridColorChart> {
    if name.eq_ignore_ascii_case(COLORCHECKER_CLASSIC) || name.eq_ignore_ascii_case("colorchecker")
    {
        return colorchecker_classic().ok();
    }
    None
}

pub fn colorchecker_classic() -> Result<GridColorChart, ChartError> {
    let colors = COLORCHECKER_CLASSIC_SRGB
        .iter()
        .map(|(name, rgb)| (name.to_string(), ReferenceColor::Srgb8(*rgb)))
        .collect();
    GridColorChart::new(
        COLORCHECKER_CLASSIC,
        4,
        6,
        colors,
        ColorConverter::new(Illuminant::D65),
    )
}
