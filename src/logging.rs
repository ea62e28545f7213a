//! Logging setup.
//!
//! The handler topology lives in a JSON file (see `config/logging.json`):
//! a console handler on stderr, an optional rotating JSON file handler and a
//! `queue` flag that moves file writes onto a background worker. Levels from
//! [`Settings`](crate::config::Settings) override the ones in the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to read logging config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid logging config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Appender(#[from] rolling::InitError),

    #[error("Failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Console output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPeriod> for Rotation {
    fn from(period: RotationPeriod) -> Self {
        match period {
            RotationPeriod::Minutely => Rotation::MINUTELY,
            RotationPeriod::Hourly => Rotation::HOURLY,
            RotationPeriod::Daily => Rotation::DAILY,
            RotationPeriod::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub level: String,
    pub format: ConsoleFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: ConsoleFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub level: String,
    pub directory: PathBuf,
    pub file_prefix: String,
    pub rotation: RotationPeriod,
    /// Rotated files kept on disk; unlimited when absent.
    pub max_files: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            level: "DEBUG".to_string(),
            directory: PathBuf::from("logs"),
            file_prefix: "math-api".to_string(),
            rotation: RotationPeriod::Daily,
            max_files: Some(3),
        }
    }
}

/// Handler topology read from the logging config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: ConsoleConfig,
    pub file: Option<FileConfig>,
    /// Route file output through a non-blocking background writer.
    pub queue: bool,
}

/// Keeps the background writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops the background log writer"]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

impl LoggingConfig {
    /// Load the topology from `path`. A missing file yields the console-only default.
    pub fn load(path: &Path) -> Result<Self, LoggingError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| LoggingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Override the console and file levels.
    pub fn with_levels(mut self, console: &str, file: &str) -> Self {
        self.console.level = console.to_string();
        if let Some(file_config) = self.file.as_mut() {
            file_config.level = file.to_string();
        }
        self
    }

    /// Install the global subscriber.
    ///
    /// `RUST_LOG`, when set, replaces the console level with its own directives.
    pub fn init(&self) -> Result<LoggingGuard, LoggingError> {
        let mut layers: Vec<BoxedLayer> = vec![self.console_layer()?];
        let mut worker = None;

        if let Some(file_config) = &self.file {
            let (layer, guard) = self.file_layer(file_config)?;
            layers.push(layer);
            worker = guard;
        }

        tracing_subscriber::registry().with(layers).try_init()?;
        Ok(LoggingGuard { _worker: worker })
    }

    fn console_layer(&self) -> Result<BoxedLayer, LoggingError> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::default().add_directive(parse_level(&self.console.level)?.into()),
        };

        let layer = match self.console.format {
            ConsoleFormat::Text => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(filter)
                .boxed(),
            ConsoleFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(filter)
                .boxed(),
        };
        Ok(layer)
    }

    fn file_layer(
        &self,
        file_config: &FileConfig,
    ) -> Result<(BoxedLayer, Option<WorkerGuard>), LoggingError> {
        let level = parse_level(&file_config.level)?;

        fs::create_dir_all(&file_config.directory).map_err(|source| LoggingError::CreateDir {
            path: file_config.directory.clone(),
            source,
        })?;

        let mut builder = rolling::Builder::new()
            .rotation(file_config.rotation.into())
            .filename_prefix(&file_config.file_prefix)
            .filename_suffix("log.jsonl");
        if let Some(max_files) = file_config.max_files {
            builder = builder.max_log_files(max_files);
        }
        let appender = builder.build(&file_config.directory)?;

        let (writer, guard) = if self.queue {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        } else {
            (BoxMakeWriter::new(appender), None)
        };

        let layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(level)
            .boxed();
        Ok((layer, guard))
    }
}

/// Parse a level name. Accepts `WARNING` and `CRITICAL` as aliases.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        "OFF" => Ok(LevelFilter::OFF),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}
