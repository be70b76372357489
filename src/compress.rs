//! The resize/re-encode pipeline.
//!
//! [`Compressor::compress`] takes any decodable image [`Asset`] and returns a
//! new JPEG asset that fits the requested bounds. Each call is one linear
//! async task with three suspension points:
//!
//! ```text
//! read bytes ──▶ decode (blocking pool) ──▶ fit ──▶ draw + encode (blocking pool) ──▶ Asset
//! ```
//!
//! Every stage can fail with its own [`CompressError`] variant and the first
//! failure ends the call. No partial output is ever returned.
//!
//! Calls share nothing but the immutable backend, so any number may run at
//! once. Dropping the future abandons the result; blocking work already
//! handed to the pool still runs to completion and is discarded.

use crate::asset::{Asset, MediaType};
use crate::imaging::{
    BackendError, CompressOptions, Dimensions, ImageBackend, ResizePlan, RustBackend, fit_within,
    operations,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::spawn_blocking;
use tracing::{debug, instrument};

/// Media type of every compressed asset, whatever the input was.
pub const OUTPUT_MEDIA_TYPE: MediaType = MediaType::Jpeg;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Invalid compress options: {0}")]
    InvalidOptions(String),
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("No {width}x{height} drawing surface for {name}: {reason}")]
    Surface {
        name: String,
        width: u32,
        height: u32,
        reason: String,
    },
    #[error("Failed to encode {name}: {reason}")]
    Encode { name: String, reason: String },
}

impl CompressError {
    /// Pipeline stage that failed, as a stable lowercase name.
    pub fn stage(&self) -> &'static str {
        match self {
            CompressError::InvalidOptions(_) => "options",
            CompressError::Read { .. } => "read",
            CompressError::Decode { .. } => "decode",
            CompressError::Surface { .. } => "surface",
            CompressError::Encode { .. } => "encode",
        }
    }
}

/// A compressed asset plus the dimensions it was produced from.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub asset: Asset,
    pub source: Dimensions,
    pub target: Dimensions,
}

/// Failure inside the combined draw + encode step.
enum RenderFailure {
    Surface(BackendError),
    Encode(BackendError),
}

/// Runs the pipeline against a shared [`ImageBackend`].
pub struct Compressor<B: ImageBackend> {
    backend: Arc<B>,
}

impl<B: ImageBackend> Clone for Compressor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl Default for Compressor<RustBackend> {
    fn default() -> Self {
        Self::new(RustBackend::new())
    }
}

impl<B: ImageBackend> Compressor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resize `input` to fit `options.bounds` and re-encode it as JPEG.
    ///
    /// The output keeps the input's name, reports `image/jpeg`, and is
    /// stamped with the current time.
    pub async fn compress(
        &self,
        input: &Asset,
        options: &CompressOptions,
    ) -> Result<Asset, CompressError> {
        self.compress_detailed(input, options)
            .await
            .map(|compressed| compressed.asset)
    }

    /// Like [`Compressor::compress`], also returning source and target dimensions.
    #[instrument(skip_all, fields(asset = %input.name()))]
    pub async fn compress_detailed(
        &self,
        input: &Asset,
        options: &CompressOptions,
    ) -> Result<Compressed, CompressError> {
        if let Some(reason) = options.invalid_reason() {
            return Err(CompressError::InvalidOptions(reason));
        }
        let name = input.name().to_string();

        let bytes = read_input(input).await?;
        debug!(bytes = bytes.len(), media_type = %input.media_type(), "read");

        let backend = Arc::clone(&self.backend);
        let decoded = spawn_blocking(move || backend.decode(&bytes))
            .await
            .map_err(|e| decode_error(&name, e.to_string()))?
            .map_err(|e| decode_error(&name, e.to_string()))?;

        let source = decoded.dimensions;
        let target: Dimensions = fit_within(source.as_tuple(), options.bounds).into();
        debug!(%source, %target, "decoded");

        let backend = Arc::clone(&self.backend);
        let quality = options.quality;
        let rendered = spawn_blocking(move || {
            let surface = backend
                .draw(&decoded.surface, target.width, target.height)
                .map_err(RenderFailure::Surface)?;
            drop(decoded);
            backend
                .encode(&surface, &OUTPUT_MEDIA_TYPE, quality)
                .map_err(RenderFailure::Encode)
        })
        .await
        .map_err(|e| CompressError::Encode {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        let encoded = match rendered {
            Ok(encoded) => encoded,
            Err(RenderFailure::Surface(e)) => {
                return Err(CompressError::Surface {
                    name,
                    width: target.width,
                    height: target.height,
                    reason: e.to_string(),
                });
            }
            Err(RenderFailure::Encode(e)) => {
                return Err(CompressError::Encode {
                    name,
                    reason: e.to_string(),
                });
            }
        };
        if encoded.is_empty() {
            return Err(CompressError::Encode {
                name,
                reason: "encoder produced no output".to_string(),
            });
        }
        debug!(bytes = encoded.len(), quality = quality.value(), "encoded");

        Ok(Compressed {
            asset: Asset::from_bytes(name, OUTPUT_MEDIA_TYPE, encoded),
            source,
            target,
        })
    }

    /// Read and decode `input`, then report what compressing it would do.
    #[instrument(skip_all, fields(asset = %input.name()))]
    pub async fn inspect(
        &self,
        input: &Asset,
        options: &CompressOptions,
    ) -> Result<ResizePlan, CompressError> {
        if let Some(reason) = options.invalid_reason() {
            return Err(CompressError::InvalidOptions(reason));
        }
        let name = input.name().to_string();
        let bytes = read_input(input).await?;

        let backend = Arc::clone(&self.backend);
        let bounds = options.bounds;
        spawn_blocking(move || operations::inspect(&*backend, &bytes, bounds))
            .await
            .map_err(|e| decode_error(&name, e.to_string()))?
            .map_err(|e| decode_error(&name, e.to_string()))
    }
}

async fn read_input(input: &Asset) -> Result<Arc<[u8]>, CompressError> {
    input.read().await.map_err(|source| CompressError::Read {
        name: input.name().to_string(),
        source,
    })
}

fn decode_error(name: &str, reason: String) -> CompressError {
    CompressError::Decode {
        name: name.to_string(),
        reason,
    }
}

/// Compress with the default [`RustBackend`].
pub async fn compress(input: &Asset, options: &CompressOptions) -> Result<Asset, CompressError> {
    Compressor::default().compress(input, options).await
}
