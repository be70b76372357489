//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the compress pipeline and
//! the code that actually touches pixels. It exposes three capabilities:
//! decode bytes into a surface, draw a surface at a new size, and encode a
//! surface into bytes.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` in this module.

use super::params::Quality;
use crate::asset::MediaType;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unsupported media type: {0}")]
    Unsupported(MediaType),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// A decoded image: its intrinsic size and the backend's pixel surface.
#[derive(Debug)]
pub struct Decoded<S> {
    pub dimensions: Dimensions,
    pub surface: S,
}

/// Trait for image processing backends.
///
/// Implementations must be shareable across threads: the pipeline holds the
/// backend in an `Arc` and calls it from tokio's blocking pool.
pub trait ImageBackend: Send + Sync + 'static {
    /// In-memory decoded bitmap. Never leaves the pipeline.
    type Surface: Send + 'static;

    /// Decode raw bytes. Dimensions are reported after orientation is applied.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Self::Surface>, BackendError>;

    /// Allocate a `width`×`height` surface and draw `source` scaled into it.
    fn draw(
        &self,
        source: &Self::Surface,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface, BackendError>;

    /// Encode a surface as `media_type`.
    fn encode(
        &self,
        surface: &Self::Surface,
        media_type: &MediaType,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
