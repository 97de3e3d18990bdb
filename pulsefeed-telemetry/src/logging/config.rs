//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Newline-delimited JSON, for log shippers.
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

/// File rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate once a day.
    Daily,
    /// Rotate every hour.
    Hourly,
    /// Single file, never rotated.
    Never,
}

/// A log output destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to standard output.
    Stdout,
    /// Write to rotating files in a directory.
    File {
        /// Directory the log files are written to.
        directory: String,
        /// File name prefix.
        #[serde(default = "default_file_prefix")]
        prefix: String,
        /// Rotation policy.
        #[serde(default = "default_rotation")]
        rotation: RotationPolicy,
    },
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level filter directive (e.g. "info", "pulsefeed_client=debug").
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Output destinations.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<LogOutput>,

    /// Include the thread id in events.
    #[serde(default)]
    pub include_thread_id: bool,

    /// Include source file and line in events.
    #[serde(default)]
    pub include_file_info: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> LogFormat {
    LogFormat::Compact
}

fn default_outputs() -> Vec<LogOutput> {
    vec![LogOutput::Stdout]
}

fn default_file_prefix() -> String {
    "pulsefeed.log".to_string()
}

fn default_rotation() -> RotationPolicy {
    RotationPolicy::Daily
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            outputs: default_outputs(),
            include_thread_id: false,
            include_file_info: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.outputs, vec![LogOutput::Stdout]);
        assert!(!config.include_thread_id);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: LogConfig = serde_json::from_str(r#"{"level":"debug"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.outputs, vec![LogOutput::Stdout]);
    }

    #[test]
    fn test_file_output_deserializes() {
        let config: LogConfig = serde_json::from_str(
            r#"{"format":"json","outputs":[{"kind":"file","directory":"/var/log/pulsefeed"}]}"#,
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        let LogOutput::File {
            directory,
            prefix,
            rotation,
        } = &config.outputs[0]
        else {
            panic!("expected file output");
        };
        assert_eq!(directory, "/var/log/pulsefeed");
        assert_eq!(prefix, "pulsefeed.log");
        assert_eq!(*rotation, RotationPolicy::Daily);
    }
}
