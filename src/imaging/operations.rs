//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They are
//! synchronous; the async [`compress`](crate::compress) pipeline runs them on
//! the blocking pool.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within;
use super::params::Bounds;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What compressing an image would do, without encoding anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub source: Dimensions,
    pub target: Dimensions,
}

impl ResizePlan {
    pub fn is_resize(&self) -> bool {
        self.source != self.target
    }
}

/// Fit already-known dimensions into `bounds`.
pub fn plan_resize(source: Dimensions, bounds: Bounds) -> ResizePlan {
    ResizePlan {
        source,
        target: fit_within(source.as_tuple(), bounds).into(),
    }
}

/// Decode `bytes` and plan the resize.
pub fn inspect(backend: &impl ImageBackend, bytes: &[u8], bounds: Bounds) -> Result<ResizePlan> {
    let decoded = backend.decode(bytes)?;
    Ok(plan_resize(decoded.dimensions, bounds))
}
