//! Grid-layout color chart model.

use crate::{AlignmentError, ChartError, ChartRegion, Patch, ReferenceColor};
use colorcal_core::{homography_from_4pt, ColorConverter, Homography, Quad, ReferenceColorSpace};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fraction of each cell trimmed on every side before sampling.
pub const DEFAULT_CHIP_MARGIN: f64 = 0.2;

/// Reference chart with patches laid out on a regular `rows × cols` grid.
///
/// Chart coordinates put the top-left corner of the chart at `(0, 0)` and use
/// one unit per cell, so patch `(row, col)` covers `[col, col+1] × [row, row+1]`.
/// The alignment maps chart coordinates to image pixels; a freshly built chart
/// carries the identity.
///
/// Every `copy_*` method returns a new chart and leaves `self` untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct GridColorChart {
    name: String,
    n_rows: usize,
    n_cols: usize,
    chip_margin: f64,
    patches: Vec<Patch>,
    enabled: Vec<bool>,
    converter: ColorConverter,
    alignment: Homography,
}

impl GridColorChart {
    /// Build a chart from `(name, color)` pairs listed in row-major order.
    pub fn new(
        name: impl Into<String>,
        n_rows: usize,
        n_cols: usize,
        colors: Vec<(String, ReferenceColor)>,
        converter: ColorConverter,
    ) -> Result<Self, ChartError> {
        if n_rows == 0 || n_cols == 0 {
            return Err(ChartError::EmptyGrid {
                rows: n_rows,
                cols: n_cols,
            });
        }
        let expected = n_rows * n_cols;
        if colors.len() != expected {
            return Err(ChartError::PatchCount {
                rows: n_rows,
                cols: n_cols,
                expected,
                got: colors.len(),
            });
        }
        if let Some((name, _)) = colors.iter().find(|(_, c)| !c.is_finite()) {
            return Err(ChartError::NonFiniteColor { name: name.clone() });
        }

        let patches = colors
            .into_iter()
            .enumerate()
            .map(|(i, (name, color))| Patch {
                name,
                row: i / n_cols,
                col: i % n_cols,
                color,
            })
            .collect();

        Ok(Self {
            name: name.into(),
            n_rows,
            n_cols,
            chip_margin: DEFAULT_CHIP_MARGIN,
            patches,
            enabled: vec![true; expected],
            converter,
            alignment: Homography::identity(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    #[inline]
    pub fn chip_margin(&self) -> f64 {
        self.chip_margin
    }

    #[inline]
    pub fn color_converter(&self) -> &ColorConverter {
        &self.converter
    }

    /// Chart-to-image transform.
    #[inline]
    pub fn alignment(&self) -> &Homography {
        &self.alignment
    }

    #[inline]
    pub fn enabled(&self) -> &[bool] {
        &self.enabled
    }

    /// Indices of the patches used for calibration, in row-major order.
    pub fn enabled_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.enabled
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
    }

    /// Chart outline in chart coordinates.
    pub fn reference_outline(&self) -> Quad {
        Quad::from_bounds(0.0, 0.0, self.n_cols as f64, self.n_rows as f64)
    }

    /// Chart outline in image coordinates.
    pub fn aligned_outline(&self) -> Quad {
        self.reference_outline().map(&self.alignment)
    }

    /// Sampling window of patch `index` in image coordinates (cell shrunk by
    /// the chip margin).
    pub fn patch_outline(&self, index: usize) -> Option<Quad> {
        let p = self.patches.get(index)?;
        let m = self.chip_margin;
        let (x, y) = (p.col as f64, p.row as f64);
        Some(Quad::from_bounds(x + m, y + m, x + 1.0 - m, y + 1.0 - m).map(&self.alignment))
    }

    /// Reference colors of all patches expressed in `space`.
    pub fn reference_values(&self, space: ReferenceColorSpace) -> Vec<[f64; 3]> {
        self.patches
            .iter()
            .map(|p| p.color.in_space(space, &self.converter))
            .collect()
    }

    /// Copy of this chart whose patch positions follow `region` in an image.
    ///
    /// The chart's top-left, top-right, bottom-right and bottom-left corners
    /// are mapped to the region corners in that order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, region), fields(chart = %self.name))
    )]
    pub fn copy_aligned_to(&self, region: &ChartRegion) -> Result<Self, AlignmentError> {
        let target = region.quad()?;
        let h = homography_from_4pt(&self.reference_outline().corners, &target.corners)
            .ok_or(AlignmentError::SingularTransform)?;

        let aligned = self.reference_outline().map(&h);
        if !aligned.is_finite() {
            return Err(AlignmentError::SingularTransform);
        }
        log::debug!(
            "aligned chart `{}` to region of {:.1} px^2",
            self.name,
            target.area()
        );

        Ok(Self {
            alignment: h,
            ..self.clone()
        })
    }

    pub fn copy_with_chip_margin(&self, chip_margin: f64) -> Result<Self, ChartError> {
        if !(0.0..0.5).contains(&chip_margin) {
            return Err(ChartError::InvalidChipMargin(chip_margin));
        }
        Ok(Self {
            chip_margin,
            ..self.clone()
        })
    }

    /// Copy with a new enabled mask; disabled patches are skipped during
    /// calibration.
    pub fn copy_with_enabled(&self, enabled: &[bool]) -> Result<Self, ChartError> {
        if enabled.len() != self.patches.len() {
            return Err(ChartError::EnabledMaskLength {
                expected: self.patches.len(),
                got: enabled.len(),
            });
        }
        if !enabled.iter().any(|&on| on) {
            return Err(ChartError::NoEnabledPatches);
        }
        Ok(Self {
            enabled: enabled.to_vec(),
            ..self.clone()
        })
    }
}
