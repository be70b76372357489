//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The
//! [`compress`](crate::compress) pipeline turns them into backend calls.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding factor in `[0.01, 1]`, default 0.8. Clamped on construction.
//! - [`Bounds`]: Maximum output width and height, default 1920×1920.
//! - [`CompressOptions`]: Bounds + quality for one compress call.

/// Encoding quality as a fraction (0.01–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub const MIN: f32 = 0.01;
    pub const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale JPEG encoders use.
    pub fn jpeg_scale(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Pixel bounding box the output must fit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Bounds {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1920,
        }
    }
}

/// Per-call settings for [`Compressor::compress`](crate::compress::Compressor::compress).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompressOptions {
    pub bounds: Bounds,
    pub quality: Quality,
}

impl CompressOptions {
    /// Returns a description of the first invalid setting, if any.
    pub fn invalid_reason(&self) -> Option<String> {
        if self.bounds.max_width == 0 || self.bounds.max_height == 0 {
            return Some(format!(
                "bounds must be positive, got {}x{}",
                self.bounds.max_width, self.bounds.max_height
            ));
        }
        None
    }
}
