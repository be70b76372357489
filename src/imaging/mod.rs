//! Image processing on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Fit** | [`fit_within`], pure dimension math |
//! | **Draw** | `resize_exact` with a bilinear filter |
//! | **Encode** | `JpegEncoder::new_with_quality` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Quality, bounds, per-call options
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Synchronous helpers combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, Dimensions, ImageBackend};
pub use calculations::fit_within;
pub use operations::{ResizePlan, inspect, plan_resize};
pub use params::{Bounds, CompressOptions, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
