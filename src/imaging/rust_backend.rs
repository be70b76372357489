//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, TIFF, BMP) | `image::ImageReader` with format sniffing |
//! | Orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Draw | `image::imageops::resize` with `Triangle` (bilinear) filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Decoded, Dimensions, ImageBackend};
use super::params::Quality;
use crate::asset::MediaType;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;

/// Largest surface [`RustBackend::new`] will allocate: 16384×16384.
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
];

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> Vec<&'static str> {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone)]
pub struct RustBackend {
    max_surface_pixels: u64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }

    /// Cap the pixel count of drawing surfaces.
    pub fn with_max_surface_pixels(max_surface_pixels: u64) -> Self {
        Self { max_surface_pixels }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with format sniffing and apply the EXIF orientation.
fn load_image(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to sniff format: {}", e)))?
        .into_decoder()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {}", e)))?;

    let orientation = decoder
        .orientation()
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to read orientation: {}", e)))?;

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode: {}", e)))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Composite onto black and drop alpha, as a canvas JPEG export does.
fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgb8(flatten_to_rgb(img));
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_scale());
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(buffer)
}

impl ImageBackend for RustBackend {
    type Surface = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<DynamicImage>, BackendError> {
        let img = load_image(bytes)?;
        Ok(Decoded {
            dimensions: Dimensions::new(img.width(), img.height()),
            surface: img,
        })
    }

    fn draw(
        &self,
        source: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        let pixels = width as u64 * height as u64;
        if pixels == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot allocate an empty {}x{} surface",
                width, height
            )));
        }
        if pixels > self.max_surface_pixels {
            return Err(BackendError::ProcessingFailed(format!(
                "{}x{} exceeds the surface limit of {} pixels",
                width, height, self.max_surface_pixels
            )));
        }

        if (source.width(), source.height()) == (width, height) {
            return Ok(source.clone());
        }
        Ok(source.resize_exact(width, height, FilterType::Triangle))
    }

    fn encode(
        &self,
        surface: &DynamicImage,
        media_type: &MediaType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        match media_type {
            MediaType::Jpeg => encode_jpeg(surface, quality),
            other => Err(BackendError::Unsupported(other.clone())),
        }
    }
}
