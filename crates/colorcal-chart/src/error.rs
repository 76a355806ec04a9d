/// Errors aligning a chart to a region in an image.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("region has {got} vertices, chart alignment needs exactly 4")]
    VertexCount { got: usize },
    #[error("region corner {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("region rectangle has non-positive size ({width} x {height})")]
    EmptyRect { width: f64, height: f64 },
    #[error("region is degenerate (area {area:.3e} px^2)")]
    ZeroArea { area: f64 },
    #[error("region corner {corner} is collinear with its neighbours")]
    Collinear { corner: usize },
    #[error("region is not a convex quadrilateral (self-intersecting or reflex corner)")]
    NotConvex,
    #[error("no projective transform maps the chart onto the region")]
    SingularTransform,
}

/// Chart definition validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("chart grid must have at least one row and column (got {rows} x {cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("chart grid {rows} x {cols} needs {expected} patches, got {got}")]
    PatchCount {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },
    #[error("chip margin must be in [0, 0.5), got {0}")]
    InvalidChipMargin(f64),
    #[error("enabled mask has {got} entries, chart has {expected} patches")]
    EnabledMaskLength { expected: usize, got: usize },
    #[error("at least one patch must stay enabled")]
    NoEnabledPatches,
    #[error("patch `{name}` has a non-finite reference color")]
    NonFiniteColor { name: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ChartIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Chart(#[from] ChartError),
}
