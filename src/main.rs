use clap::{Parser, Subcommand};
use fishspot_compress::compress::Compressor;
use fishspot_compress::{batch, config, logging, output};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bound overrides shared by commands that plan a resize.
#[derive(clap::Args, Clone)]
struct BoundsArgs {
    /// Largest output width in pixels [config: compress.max_width]
    #[arg(long)]
    max_width: Option<u32>,

    /// Largest output height in pixels [config: compress.max_height]
    #[arg(long)]
    max_height: Option<u32>,
}

impl BoundsArgs {
    fn overrides(&self) -> config::ConfigOverrides {
        config::ConfigOverrides {
            max_width: self.max_width,
            max_height: self.max_height,
            ..config::ConfigOverrides::default()
        }
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn version_string() -> &'static str {
    let on_tag = env!("FISHSPOT_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("FISHSPOT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "fishspot-compress")]
#[command(about = "Shrink photos for fishing-spot uploads")]
#[command(long_about = "\
Shrink photos for fishing-spot uploads

Every input is decoded, scaled down to fit the configured bounds (never up),
and re-encoded as JPEG. Landscape photos are checked against the maximum
width, portrait and square photos against the maximum height.

Inputs may be files or directories. Directories are searched recursively
for JPEG, PNG, GIF, WebP, TIFF and BMP files; hidden entries are skipped.

Run 'fishspot-compress gen-config' to generate a documented fishspot.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./fishspot.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize and re-encode photos as JPEG
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the compressed files
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,

        #[command(flatten)]
        bounds: BoundsArgs,

        /// JPEG quality, 0.01 <= q <= 1 [config: compress.quality]
        #[arg(long)]
        quality: Option<f64>,

        /// Max photos compressed at once [config: processing.max_concurrent]
        #[arg(long)]
        jobs: Option<usize>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode photos and show the planned output size without encoding
    Check {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        bounds: BoundsArgs,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock fishspot.toml with all options documented
    GenConfig,
}

/// Load the config file named on the command line, or the default one if
/// present, with flag overrides on top.
fn load_app_config(
    path: Option<&PathBuf>,
    overrides: &config::ConfigOverrides,
) -> Result<config::AppConfig, BoxError> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_layered(path, overrides)?),
        None => Ok(config::load_layered(
            Path::new(config::DEFAULT_CONFIG_FILE),
            overrides,
        )?),
    }
}

/// Load config and install the log subscriber it describes.
fn init(
    path: Option<&PathBuf>,
    overrides: &config::ConfigOverrides,
) -> Result<config::AppConfig, BoxError> {
    let app_config = load_app_config(path, overrides)?;
    logging::setup_logging(&app_config.logging)?;
    debug!(config = ?app_config, "loaded config");
    Ok(app_config)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let compressor = Compressor::default();

    match cli.command {
        Command::Compress {
            inputs,
            out_dir,
            bounds,
            quality,
            jobs,
            json,
        } => {
            let overrides = config::ConfigOverrides {
                quality,
                max_concurrent: jobs,
                ..bounds.overrides()
            };
            let app_config = init(cli.config.as_ref(), &overrides)?;

            let inputs = batch::collect_inputs(&inputs)?;
            let jobs = config::effective_concurrency(&app_config.processing);
            info!(inputs = inputs.len(), jobs, out_dir = %out_dir.display(), "compressing");

            let reports = batch::compress_all(
                &compressor,
                &inputs,
                &app_config.to_options(),
                &out_dir,
                jobs,
            )
            .await?;

            if json {
                output::print_json(&reports)?;
            } else {
                output::print_compress_output(&reports);
            }

            let failed = reports.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                return Err(format!("{} of {} inputs failed", failed, reports.len()).into());
            }
        }
        Command::Check {
            inputs,
            bounds,
            json,
        } => {
            let app_config = init(cli.config.as_ref(), &bounds.overrides())?;

            let inputs = batch::collect_inputs(&inputs)?;
            let jobs = config::effective_concurrency(&app_config.processing);
            let reports =
                batch::inspect_all(&compressor, &inputs, &app_config.to_options(), jobs).await;

            if json {
                output::print_json(&reports)?;
            } else {
                output::print_check_output(&reports);
            }

            let failed = reports
                .iter()
                .filter(|r| matches!(r.outcome, batch::InspectOutcome::Failed { .. }))
                .count();
            if failed > 0 {
                return Err(format!("{} of {} inputs failed", failed, reports.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
