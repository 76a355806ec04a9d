//! Core types for chart-based color calibration.
//!
//! This crate is small and free of image codecs: planar image buffers,
//! quadrilateral geometry with a four-point homography, and the reference
//! color spaces the calibration maps into.

mod color;
mod homography;
mod image;
mod logger;
mod quad;

pub use color::{
    delta_e76, linear_to_srgb, srgb_to_linear, ColorConverter, Illuminant, ReferenceColorSpace,
    UnknownColorSpace,
};
pub use homography::{homography_from_4pt, Homography};
pub use image::{ImageBufferError, PixelFormat, PlanarImage};
pub use quad::Quad;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, init_with_verbosity, level_from_verbosity};

pub use nalgebra::Point2;
