//! Compressing many photos at once.
//!
//! [`collect_inputs`] expands the paths given on the command line into a
//! list of image files. [`compress_all`] then runs one compress task per file
//! on a [`JoinSet`], with at most `max_concurrent` in flight, and writes each
//! result to `out_dir/<stem>.jpg`.
//!
//! Every input gets exactly one [`CompressReport`], in input order. A failed
//! input never stops the others.

use crate::asset::Asset;
use crate::compress::{CompressError, Compressor};
use crate::imaging::{CompressOptions, Dimensions, ImageBackend, supported_input_extensions};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to one input of [`compress_all`].
#[derive(Debug, Clone, Serialize)]
pub struct CompressReport {
    pub input: PathBuf,
    pub name: String,
    pub input_bytes: u64,
    #[serde(flatten)]
    pub outcome: CompressOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompressOutcome {
    Compressed {
        output: PathBuf,
        source: Dimensions,
        target: Dimensions,
        output_bytes: u64,
    },
    Failed {
        stage: &'static str,
        message: String,
    },
}

impl CompressReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CompressOutcome::Compressed { .. })
    }

    fn failed(input: PathBuf, input_bytes: u64, stage: &'static str, message: String) -> Self {
        Self {
            name: display_name(&input),
            input,
            input_bytes,
            outcome: CompressOutcome::Failed { stage, message },
        }
    }
}

/// What compressing one input would do, from [`inspect_all`].
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub input: PathBuf,
    pub name: String,
    #[serde(flatten)]
    pub outcome: InspectOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InspectOutcome {
    Planned {
        source: Dimensions,
        target: Dimensions,
    },
    Failed {
        stage: &'static str,
        message: String,
    },
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_supported_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand command line paths into the list of files to compress.
///
/// Files are kept as given, even if they do not exist, so that they show up
/// as failed reports. Directories are walked recursively for files with a
/// decodable extension; hidden files and directories are skipped and each
/// directory's files are sorted.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let extensions = supported_input_extensions();
    let mut inputs = Vec::new();

    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        let walker = WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && has_supported_extension(entry.path(), &extensions)
            {
                found.push(entry.into_path());
            }
        }
        found.sort();
        inputs.extend(found);
    }

    Ok(inputs)
}

/// Output file for each input: `out_dir/<stem>.jpg`.
///
/// Stems that collide (case-insensitively) get a `-2`, `-3`, … suffix in
/// input order, so no output overwrites another. Inputs that already live
/// in `out_dir` keep their file name reserved: only the input itself may
/// be replaced by its own output.
pub fn output_paths(inputs: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
    let resident: Vec<Option<String>> = inputs
        .iter()
        .map(|input| {
            let parent = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            if same_dir(parent, out_dir) {
                input.file_name().map(|n| n.to_string_lossy().to_lowercase())
            } else {
                None
            }
        })
        .collect();
    let mut taken: HashSet<String> = resident.iter().flatten().cloned().collect();

    inputs
        .iter()
        .zip(&resident)
        .map(|(input, own)| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let mut file_name = format!("{stem}.jpg");
            let mut n = 2;
            loop {
                let key = file_name.to_lowercase();
                if own.as_deref() == Some(key.as_str()) || taken.insert(key) {
                    break;
                }
                file_name = format!("{stem}-{n}.jpg");
                n += 1;
            }
            out_dir.join(file_name)
        })
        .collect()
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Run `job` for every input with at most `max_concurrent` running at once.
///
/// Results come back in input order; a job that panicked yields `None`.
async fn run_bounded<T, F, Fut>(inputs: &[PathBuf], max_concurrent: usize, job: F) -> Vec<Option<T>>
where
    F: Fn(usize, PathBuf) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = job(index, input.clone());
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (index, work.await)
        });
    }

    let mut results: Vec<Option<T>> = inputs.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => warn!(error = %e, "batch task failed"),
        }
    }
    results
}

/// Compress every input into `out_dir`, creating it if needed.
pub async fn compress_all<B: ImageBackend>(
    compressor: &Compressor<B>,
    inputs: &[PathBuf],
    options: &CompressOptions,
    out_dir: &Path,
    max_concurrent: usize,
) -> Result<Vec<CompressReport>, BatchError> {
    tokio::fs::create_dir_all(out_dir).await?;
    let outputs = output_paths(inputs, out_dir);

    let results = run_bounded(inputs, max_concurrent, |index, input| {
        let compressor = compressor.clone();
        let options = *options;
        let output = outputs[index].clone();
        async move { compress_one(&compressor, input, output, &options).await }
    })
    .await;

    Ok(results
        .into_iter()
        .zip(inputs)
        .map(|(report, input)| {
            report.unwrap_or_else(|| {
                CompressReport::failed(input.clone(), 0, "task", "worker task panicked".into())
            })
        })
        .collect())
}

async fn compress_one<B: ImageBackend>(
    compressor: &Compressor<B>,
    input: PathBuf,
    output: PathBuf,
    options: &CompressOptions,
) -> CompressReport {
    let asset = match Asset::open(&input).await {
        Ok(asset) => asset,
        Err(source) => {
            let err = CompressError::Read {
                name: display_name(&input),
                source,
            };
            warn!(input = %input.display(), error = %err, "skipped");
            return CompressReport::failed(input, 0, err.stage(), err.to_string());
        }
    };
    let input_bytes = asset.len();

    let compressed = match compressor.compress_detailed(&asset, options).await {
        Ok(compressed) => compressed,
        Err(err) => {
            warn!(input = %input.display(), stage = err.stage(), error = %err, "failed");
            return CompressReport::failed(input, input_bytes, err.stage(), err.to_string());
        }
    };

    if let Err(e) = compressed.asset.save(&output).await {
        warn!(output = %output.display(), error = %e, "write failed");
        return CompressReport::failed(
            input,
            input_bytes,
            "write",
            format!("Failed to write {}: {}", output.display(), e),
        );
    }

    let output_bytes = compressed.asset.len();
    info!(
        input = %input.display(),
        output = %output.display(),
        input_bytes,
        output_bytes,
        "compressed"
    );
    CompressReport {
        name: asset.name().to_string(),
        input,
        input_bytes,
        outcome: CompressOutcome::Compressed {
            output,
            source: compressed.source,
            target: compressed.target,
            output_bytes,
        },
    }
}

/// Decode every input and report the planned output size without encoding.
pub async fn inspect_all<B: ImageBackend>(
    compressor: &Compressor<B>,
    inputs: &[PathBuf],
    options: &CompressOptions,
    max_concurrent: usize,
) -> Vec<InspectReport> {
    let results = run_bounded(inputs, max_concurrent, |_, input| {
        let compressor = compressor.clone();
        let options = *options;
        async move {
            let outcome = match Asset::open(&input).await {
                Ok(asset) => match compressor.inspect(&asset, &options).await {
                    Ok(plan) => InspectOutcome::Planned {
                        source: plan.source,
                        target: plan.target,
                    },
                    Err(err) => InspectOutcome::Failed {
                        stage: err.stage(),
                        message: err.to_string(),
                    },
                },
                Err(source) => {
                    let err = CompressError::Read {
                        name: display_name(&input),
                        source,
                    };
                    InspectOutcome::Failed {
                        stage: err.stage(),
                        message: err.to_string(),
                    }
                }
            };
            InspectReport {
                name: display_name(&input),
                input,
                outcome,
            }
        }
    })
    .await;

    results
        .into_iter()
        .zip(inputs)
        .map(|(report, input)| {
            report.unwrap_or_else(|| InspectReport {
                name: display_name(input),
                input: input.clone(),
                outcome: InspectOutcome::Failed {
                    stage: "task",
                    message: "worker task panicked".into(),
                },
            })
        })
        .collect()
}
