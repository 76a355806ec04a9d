use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format of a source image.
///
/// Integer formats are normalized to `[0, 1]` when loaded into a
/// [`PlanarImage`]; float formats are kept as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Gray8,
    Gray16,
    Gray32F,
    Rgb8,
    Rgb16,
    Rgb32F,
}

impl PixelFormat {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 | PixelFormat::Gray16 | PixelFormat::Gray32F => 1,
            PixelFormat::Rgb8 | PixelFormat::Rgb16 | PixelFormat::Rgb32F => 3,
        }
    }

    /// Largest representable code value, used to normalize integer samples.
    #[inline]
    pub fn max_value(self) -> f32 {
        match self {
            PixelFormat::Gray8 | PixelFormat::Rgb8 => 255.0,
            PixelFormat::Gray16 | PixelFormat::Rgb16 => 65535.0,
            PixelFormat::Gray32F | PixelFormat::Rgb32F => 1.0,
        }
    }

    #[inline]
    pub fn is_color(self) -> bool {
        self.channels() == 3
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray8 => "8-bit gray",
            PixelFormat::Gray16 => "16-bit gray",
            PixelFormat::Gray32F => "32-bit float gray",
            PixelFormat::Rgb8 => "8-bit RGB",
            PixelFormat::Rgb16 => "16-bit RGB",
            PixelFormat::Rgb32F => "32-bit float RGB",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageBufferError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("{format} needs {expected} planes, got {got}")]
    PlaneCount {
        format: PixelFormat,
        expected: usize,
        got: usize,
    },
    #[error("plane {plane} has {got} samples, expected {expected}")]
    PlaneLength {
        plane: usize,
        expected: usize,
        got: usize,
    },
}

/// Band-separated image with normalized `f32` samples, row-major per plane.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarImage {
    width: usize,
    height: usize,
    format: PixelFormat,
    planes: Vec<Vec<f32>>,
}

impl PlanarImage {
    pub fn from_planes(
        width: usize,
        height: usize,
        format: PixelFormat,
        planes: Vec<Vec<f32>>,
    ) -> Result<Self, ImageBufferError> {
        let Some(len) = width.checked_mul(height).filter(|&n| n > 0) else {
            return Err(ImageBufferError::InvalidDimensions { width, height });
        };
        let expected = format.channels();
        if planes.len() != expected {
            return Err(ImageBufferError::PlaneCount {
                format,
                expected,
                got: planes.len(),
            });
        }
        if let Some((plane, p)) = planes.iter().enumerate().find(|(_, p)| p.len() != len) {
            return Err(ImageBufferError::PlaneLength {
                plane,
                expected: len,
                got: p.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            planes,
        })
    }

    /// Build from interleaved normalized samples (`channels` values per pixel).
    pub fn from_interleaved(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: &[f32],
    ) -> Result<Self, ImageBufferError> {
        let channels = format.channels();
        let Some(len) = width.checked_mul(height).filter(|&n| n > 0) else {
            return Err(ImageBufferError::InvalidDimensions { width, height });
        };
        if data.len() != len * channels {
            return Err(ImageBufferError::PlaneLength {
                plane: 0,
                expected: len * channels,
                got: data.len(),
            });
        }
        let planes = (0..channels)
            .map(|c| data.iter().skip(c).step_by(channels).copied().collect())
            .collect();
        Self::from_planes(width, height, format, planes)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn planes(&self) -> &[Vec<f32>] {
        &self.planes
    }

    #[inline]
    pub fn plane(&self, c: usize) -> Option<&[f32]> {
        self.planes.get(c).map(Vec::as_slice)
    }

    /// Samples of pixel `(x, y)`, one per channel.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        Some(self.planes.iter().map(|p| p[idx]).collect())
    }

    /// Interleave back into a single `width * height * channels` buffer.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let n = self.width * self.height;
        let mut out = Vec::with_capacity(n * self.planes.len());
        for i in 0..n {
            out.extend(self.planes.iter().map(|p| p[i]));
        }
        out
    }
}
