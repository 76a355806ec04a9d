//! Reference color charts and their alignment to images.
//!
//! A [`GridColorChart`] holds named patches with known reference colors on a
//! regular grid. Aligning it to a [`ChartRegion`] found in a photograph
//! yields a copy whose patch sampling windows are in image coordinates.
//!
//! Only the ColorChecker Classic is built in. Any other grid chart, for
//! instance the Image Science ColorGauge Matte, is described by a
//! [`ChartDefinition`] loaded from JSON.
//!
//! ```
//! use colorcal_chart::{builtin_chart, ChartRegion, COLORCHECKER_CLASSIC};
//!
//! let chart = builtin_chart(COLORCHECKER_CLASSIC).expect("built-in chart");
//! let aligned = chart
//!     .copy_aligned_to(&ChartRegion::rect(40.0, 30.0, 600.0, 400.0))
//!     .expect("non-degenerate region");
//! assert!(aligned.patch_outline(0).is_some());
//! ```

mod builtins;
mod chart;
mod definition;
mod error;
mod patch;
mod region;

pub use builtins::{builtin_chart, builtin_chart_names, colorchecker_classic, COLORCHECKER_CLASSIC};
pub use chart::{GridColorChart, DEFAULT_CHIP_MARGIN};
pub use definition::{load_chart_json, ChartDefinition, PatchDefinition};
pub use error::{AlignmentError, ChartError, ChartIoError};
pub use patch::{Patch, ReferenceColor};
pub use region::{ChartRegion, MIN_REGION_AREA};
