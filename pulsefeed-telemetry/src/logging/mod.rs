//! Logging setup.

mod config;

pub use config::{LogConfig, LogFormat, LogOutput, RotationPolicy};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Errors from logging initialization.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("[Telemetry] Initialization failed: {reason}")]
    Init {
        /// Underlying failure description.
        reason: String,
    },
}

/// Initializes the global tracing subscriber from the given config.
///
/// Returns worker guards for the non-blocking file writers; the
/// caller must keep them alive for the life of the process or file
/// output silently stops.
///
/// # Errors
///
/// Returns `TelemetryError::Init` when a global subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, TelemetryError> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut guards = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stdout => {
                layers.push(format_layer(
                    config,
                    fmt::layer()
                        .with_thread_ids(config.include_thread_id)
                        .with_file(config.include_file_info)
                        .with_line_number(config.include_file_info),
                ));
            }
            LogOutput::File {
                directory,
                prefix,
                rotation,
            } => {
                let appender = match rotation {
                    RotationPolicy::Daily => tracing_appender::rolling::daily(directory, prefix),
                    RotationPolicy::Hourly => tracing_appender::rolling::hourly(directory, prefix),
                    RotationPolicy::Never => tracing_appender::rolling::never(directory, prefix),
                };
                let (writer, guard) = tracing_appender::non_blocking(appender);
                guards.push(guard);

                layers.push(format_layer(
                    config,
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_thread_ids(config.include_thread_id)
                        .with_file(config.include_file_info)
                        .with_line_number(config.include_file_info),
                ));
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| TelemetryError::Init {
            reason: e.to_string(),
        })?;

    Ok(guards)
}

fn format_layer<W>(
    config: &LogConfig,
    layer: fmt::Layer<Registry, fmt::format::DefaultFields, fmt::format::Format, W>,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_stdout() {
        let config = LogConfig::default();
        let guards = init_logging(&config).expect("first init succeeds");
        assert!(guards.is_empty());

        // A second install fails instead of silently replacing.
        assert!(init_logging(&config).is_err());
    }
}
