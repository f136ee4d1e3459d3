//! Configuration file support for gap-analyzer.
//!
//! Settings are layered, lowest priority first:
//! - built-in defaults
//! - RON file from `--config`, or `./gap-analyzer.ron` if it exists
//! - command-line flags

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gap_core::PROGRESS_STAGES;
use gap_engine::{ClientSettings, EngineConfig, PipelineSettings, ProgressMode, DEFAULT_STAGE_DELAY};
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::platform::logging::{level_for_verbosity, LogDestination};

pub const DEFAULT_CONFIG_FILE: &str = "gap-analyzer.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid setting `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum ProgressModeSetting {
    Sequential,
    Concurrent,
}

impl From<ProgressModeSetting> for ProgressMode {
    fn from(setting: ProgressModeSetting) -> Self {
        match setting {
            ProgressModeSetting::Sequential => ProgressMode::Sequential,
            ProgressModeSetting::Concurrent => ProgressMode::Concurrent,
        }
    }
}

/// Contents of the RON file. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_response_bytes: Option<u64>,
    pub stage_delay_ms: Option<u64>,
    pub progress_mode: Option<ProgressModeSetting>,
    pub stages: Option<Vec<String>>,
    pub log_destination: Option<LogDestination>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(text)
            .map_err(|err| ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }
}

/// Loads the explicit config file, or the default one when it exists.
///
/// Also returns the path that was read, if any, so it can be logged once
/// the logger is up.
pub fn load(explicit: Option<&Path>) -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok((FileConfig::default(), None));
            }
            default
        }
    };
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = FileConfig::from_ron(&text, &path)?;
    Ok((config, Some(path)))
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub pipeline: PipelineSettings,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let defaults = ClientSettings::default();

        let endpoint = cli
            .endpoint
            .clone()
            .or(file.endpoint)
            .unwrap_or(defaults.endpoint);
        check_endpoint(&endpoint)?;

        let connect_timeout = positive_secs(
            "connect_timeout_secs",
            file.connect_timeout_secs,
            defaults.connect_timeout,
        )?;
        let request_timeout = positive_secs(
            "request_timeout_secs",
            file.request_timeout_secs,
            defaults.request_timeout,
        )?;
        let max_bytes = match file.max_response_bytes {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "max_response_bytes",
                    message: "must be greater than zero".to_string(),
                })
            }
            Some(bytes) => bytes,
            None => defaults.max_bytes,
        };

        let stage_delay = cli
            .stage_delay_ms
            .or(file.stage_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_STAGE_DELAY);
        let progress_mode = cli
            .progress_mode
            .or(file.progress_mode)
            .map(ProgressMode::from)
            .unwrap_or_default();
        let stages = file
            .stages
            .unwrap_or_else(|| PROGRESS_STAGES.iter().map(|s| s.to_string()).collect());

        let log_level = if cli.verbose > 0 {
            level_for_verbosity(cli.verbose)
        } else {
            match file.log_level.as_deref() {
                Some(level) => level.parse().map_err(|_| ConfigError::Invalid {
                    field: "log_level",
                    message: format!("unknown level {level:?}"),
                })?,
                None => level_for_verbosity(0),
            }
        };

        Ok(Self {
            client: ClientSettings {
                endpoint,
                connect_timeout,
                request_timeout,
                max_bytes,
            },
            pipeline: PipelineSettings {
                stages,
                stage_delay,
                progress_mode,
            },
            log_destination: cli.log.or(file.log_destination).unwrap_or_default(),
            log_level,
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: self.client.clone(),
            pipeline: self.pipeline.clone(),
        }
    }
}

fn positive_secs(
    field: &'static str,
    value: Option<u64>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Invalid {
            field,
            message: "must be greater than zero".to_string(),
        }),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}

fn check_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        field: "endpoint",
        message,
    };
    let url = Url::parse(endpoint).map_err(|err| invalid(format!("{endpoint:?}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("{endpoint:?} uses unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["gap-analyzer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_reference_behaviour() {
        let settings = Settings::resolve(FileConfig::default(), &cli(&[])).unwrap();

        assert_eq!(settings.client.endpoint, "http://localhost:5000/analyze");
        assert_eq!(settings.pipeline.stage_delay, Duration::from_millis(600));
        assert_eq!(settings.pipeline.progress_mode, ProgressMode::Sequential);
        assert_eq!(settings.pipeline.stages.len(), 5);
        assert_eq!(settings.pipeline.stages[0], "Extracting CV content...");
        assert_eq!(settings.log_destination, LogDestination::Terminal);
        assert_eq!(settings.log_level, LevelFilter::Warn);
    }

    #[test]
    fn ron_file_values_apply_and_flags_win() {
        let text = r#"(
            endpoint: "http://analysis.internal:8080/analyze",
            stage_delay_ms: 10,
            progress_mode: Concurrent,
            stages: ["Uploading..."],
            log_destination: File,
            log_level: "debug",
        )"#;
        let file = FileConfig::from_ron(text, Path::new("test.ron")).unwrap();

        let from_file = Settings::resolve(file.clone(), &cli(&[])).unwrap();
        assert_eq!(from_file.client.endpoint, "http://analysis.internal:8080/analyze");
        assert_eq!(from_file.pipeline.stage_delay, Duration::from_millis(10));
        assert_eq!(from_file.pipeline.progress_mode, ProgressMode::Concurrent);
        assert_eq!(from_file.pipeline.stages, vec!["Uploading...".to_string()]);
        assert_eq!(from_file.log_destination, LogDestination::File);
        assert_eq!(from_file.log_level, LevelFilter::Debug);

        let overridden = Settings::resolve(
            file,
            &cli(&[
                "--endpoint",
                "https://example.com/analyze",
                "--stage-delay-ms",
                "0",
                "--progress-mode",
                "sequential",
                "-v",
            ]),
        )
        .unwrap();
        assert_eq!(overridden.client.endpoint, "https://example.com/analyze");
        assert_eq!(overridden.pipeline.stage_delay, Duration::ZERO);
        assert_eq!(overridden.pipeline.progress_mode, ProgressMode::Sequential);
        assert_eq!(overridden.log_level, LevelFilter::Info);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_timeout = FileConfig {
            request_timeout_secs: Some(0),
            ..FileConfig::default()
        };
        assert!(matches!(
            Settings::resolve(zero_timeout, &cli(&[])),
            Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                ..
            })
        ));

        for endpoint in ["localhost:5000", "http://exa mple/analyze", "ftp://example.com/analyze"] {
            assert!(
                matches!(
                    Settings::resolve(FileConfig::default(), &cli(&["--endpoint", endpoint])),
                    Err(ConfigError::Invalid {
                        field: "endpoint",
                        ..
                    })
                ),
                "{endpoint} should be rejected"
            );
        }

        let bad_level = FileConfig {
            log_level: Some("loud".to_string()),
            ..FileConfig::default()
        };
        assert!(Settings::resolve(bad_level, &cli(&[])).is_err());
    }

    #[test]
    fn load_reads_explicit_file_and_reports_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(request_timeout_secs: 30)").unwrap();
        let (config, source) = load(Some(file.path())).unwrap();
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(source.as_deref(), Some(file.path()));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "(request_timeout_secs: \"soon\")").unwrap();
        assert!(matches!(
            load(Some(broken.path())),
            Err(ConfigError::Parse { .. })
        ));

        assert!(matches!(
            load(Some(Path::new("/no/such/gap-analyzer.ron"))),
            Err(ConfigError::Read { .. })
        ));
    }
}
