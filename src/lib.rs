//! # fishspot-compress
//!
//! Shrinks photos before they are uploaded as fishing-spot or catch
//! pictures. Phone cameras produce images far larger than the app ever
//! displays; every photo goes through [`compress::Compressor::compress`]
//! first, which scales it down to fit a bounding box and re-encodes it as
//! JPEG.
//!
//! ```text
//! Asset ──read──▶ bytes ──decode──▶ surface ──fit + draw──▶ surface ──encode──▶ JPEG Asset
//! ```
//!
//! Each call is one linear async task. Decoding, drawing and encoding are
//! CPU bound and run on tokio's blocking pool; reading uses `tokio::fs`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`asset`] | `Asset` (named blob + media type + mtime) and `MediaType` |
//! | [`compress`] | The async pipeline and its `CompressError` |
//! | [`imaging`] | Fit math, quality/bounds, the `ImageBackend` trait and its `image`-crate implementation |
//! | [`batch`] | Input discovery and bounded-concurrency compression of many files |
//! | [`config`] | `fishspot.toml` loading, layering over stock defaults, validation |
//! | [`logging`] | `tracing` subscriber setup (pretty or bunyan JSON) |
//! | [`output`] | CLI report formatting |
//!
//! # Fit Policy
//!
//! Only the longer side is compared with its bound: landscape images with
//! `max_width`, portrait and square images with `max_height`. The other
//! side follows the aspect ratio, rounded to the nearest pixel and never
//! below 1. Images are never upscaled. With non-square bounds the shorter
//! side may therefore still exceed its own bound.
//!
//! # Example
//!
//! ```no_run
//! use fishspot_compress::asset::Asset;
//! use fishspot_compress::compress::compress;
//! use fishspot_compress::imaging::CompressOptions;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = Asset::open("catch.png").await?;
//! let small = compress(&photo, &CompressOptions::default()).await?;
//! assert_eq!(small.media_type().as_mime(), "image/jpeg");
//! small.save("catch.jpg").await?;
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod batch;
pub mod compress;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;
