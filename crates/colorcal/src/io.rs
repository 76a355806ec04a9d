//! Image file I/O on top of the `image` crate.

use colorcal_core::{ImageBufferError, PixelFormat, PlanarImage};
use image::{DynamicImage, ImageBuffer, ImageReader, Luma, Rgb};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ImageIoError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported color type {color:?}")]
    UnsupportedColorType { color: image::ColorType },
    #[error("cannot encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),
}

/// Decode an image file into normalized planes.
pub fn load_image(path: impl AsRef<Path>) -> Result<PlanarImage, ImageIoError> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)
        .map_err(|source| ImageIoError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| ImageIoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let img = reader.decode().map_err(|source| ImageIoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    planar_from_dynamic(&img)
}

/// Normalize a decoded image. Alpha is dropped; gray+alpha becomes gray.
pub fn planar_from_dynamic(img: &DynamicImage) -> Result<PlanarImage, ImageIoError> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let (format, data): (PixelFormat, Vec<f32>) = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_) => {
            let data = img.to_luma8().into_raw();
            (PixelFormat::Gray8, normalize(&data, 255.0))
        }
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            let data = img.to_luma16().into_raw();
            (PixelFormat::Gray16, normalize(&data, 65535.0))
        }
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            let data = img.to_rgb8().into_raw();
            (PixelFormat::Rgb8, normalize(&data, 255.0))
        }
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_) => {
            let data = img.to_rgb16().into_raw();
            (PixelFormat::Rgb16, normalize(&data, 65535.0))
        }
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            (PixelFormat::Rgb32F, img.to_rgb32f().into_raw())
        }
        other => {
            return Err(ImageIoError::UnsupportedColorType {
                color: other.color(),
            })
        }
    };
    Ok(PlanarImage::from_interleaved(w, h, format, &data)?)
}

fn normalize<T: Copy + Into<f32>>(data: &[T], max: f32) -> Vec<f32> {
    data.iter().map(|&v| v.into() / max).collect()
}

fn quantize(v: f32, max: f32) -> f32 {
    (v.clamp(0.0, 1.0) * max).round()
}

/// Pack normalized planes into an `image` buffer of the matching bit depth.
///
/// Float gray has no encodable counterpart in most formats and is written as
/// 16-bit gray.
pub fn dynamic_from_planar(img: &PlanarImage) -> Result<DynamicImage, ImageIoError> {
    let (w, h) = (img.width() as u32, img.height() as u32);
    let data = img.to_interleaved();
    let buffer_error = || ImageBufferError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    };
    let dynamic = match img.format() {
        PixelFormat::Gray8 => {
            let raw = data.iter().map(|&v| quantize(v, 255.0) as u8).collect::<Vec<u8>>();
            DynamicImage::ImageLuma8(
                ImageBuffer::<Luma<u8>, _>::from_raw(w, h, raw).ok_or_else(buffer_error)?,
            )
        }
        PixelFormat::Gray16 | PixelFormat::Gray32F => {
            let raw = data.iter().map(|&v| quantize(v, 65535.0) as u16).collect::<Vec<u16>>();
            DynamicImage::ImageLuma16(
                ImageBuffer::<Luma<u16>, _>::from_raw(w, h, raw).ok_or_else(buffer_error)?,
            )
        }
        PixelFormat::Rgb8 => {
            let raw = data.iter().map(|&v| quantize(v, 255.0) as u8).collect::<Vec<u8>>();
            DynamicImage::ImageRgb8(
                ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, raw).ok_or_else(buffer_error)?,
            )
        }
        PixelFormat::Rgb16 => {
            let raw = data.iter().map(|&v| quantize(v, 65535.0) as u16).collect::<Vec<u16>>();
            DynamicImage::ImageRgb16(
                ImageBuffer::<Rgb<u16>, _>::from_raw(w, h, raw).ok_or_else(buffer_error)?,
            )
        }
        PixelFormat::Rgb32F => DynamicImage::ImageRgb32F(
            ImageBuffer::<Rgb<f32>, _>::from_raw(w, h, data).ok_or_else(buffer_error)?,
        ),
    };
    Ok(dynamic)
}

/// Encode `img` to `path`; the file format follows the extension.
///
/// 16-bit and float images are narrowed to 8-bit RGB for JPEG, which has no
/// deeper variant.
pub fn save_image(img: &PlanarImage, path: impl AsRef<Path>) -> Result<(), ImageIoError> {
    let path = path.as_ref();
    let mut dynamic = dynamic_from_planar(img)?;
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if is_jpeg && !matches!(img.format(), PixelFormat::Rgb8 | PixelFormat::Gray8) {
        dynamic = if img.format().is_color() {
            DynamicImage::ImageRgb8(dynamic.to_rgb8())
        } else {
            DynamicImage::ImageLuma8(dynamic.to_luma8())
        };
    }
    dynamic.save(path).map_err(|source| ImageIoError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rgba_input_drops_alpha_and_normalizes() {
        let rgba = image::RgbaImage::from_raw(1, 1, vec![255, 0, 51, 7]).expect("buffer");
        let img = planar_from_dynamic(&DynamicImage::ImageRgba8(rgba)).expect("planar");
        assert_eq!(img.format(), PixelFormat::Rgb8);
        assert_eq!(img.planes().len(), 3);
        assert_abs_diff_eq!(img.plane(2).expect("blue")[0], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn png_round_trip_keeps_16_bit_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("deep.png");
        let data = [0.0, 0.25, 0.5, 0.75, 1.0, 0.125];
        let img = PlanarImage::from_interleaved(2, 1, PixelFormat::Rgb16, &data).expect("image");
        save_image(&img, &path).expect("save");

        let back = load_image(&path).expect("load");
        assert_eq!(back.format(), PixelFormat::Rgb16);
        for (a, b) in back.to_interleaved().iter().zip(data) {
            assert_abs_diff_eq!(*a, b, epsilon = 1.0 / 65535.0);
        }
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").expect("write");
        assert!(matches!(load_image(&path), Err(ImageIoError::Decode { .. })));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_image("/nonexistent/colorcal/input.png").expect_err("missing");
        assert!(matches!(err, ImageIoError::Open { .. }));
        assert!(err.to_string().contains("input.png"));
    }
}
