//! Subscriber setup for the binary.
//!
//! Logs go to stderr so stdout stays free for reports. `RUST_LOG` wins over
//! the configured level.

use crate::config::{LogFormat, LoggingConfig};
use std::error::Error;
use std::io::stderr;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Fails if one is already installed.
pub fn setup_logging(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    match config.format {
        LogFormat::Json => {
            let formatting_layer =
                BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").to_string(), stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let format = fmt::format().with_target(false).compact();

            let mut subscriber = tracing_subscriber::fmt()
                .event_format(format)
                .with_writer(stderr)
                .with_env_filter(env_filter);

            if config.include_location {
                subscriber = subscriber.with_file(true).with_line_number(true);
            }

            subscriber.try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error() {
        let pretty = LoggingConfig {
            include_location: true,
            ..LoggingConfig::default()
        };
        let json = LoggingConfig {
            format: LogFormat::Json,
            ..LoggingConfig::default()
        };

        assert!(setup_logging(&pretty).is_ok());
        assert!(setup_logging(&pretty).is_err());
        assert!(setup_logging(&json).is_err());
    }
}
