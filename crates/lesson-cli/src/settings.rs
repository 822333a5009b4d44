//! Layered configuration: built-in defaults, then a TOML file, then
//! `LESSONS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// IANA zone used for "today" and for wall-clock conversion.
    pub timezone: String,
    /// JSON file holding schedules, groups and the directory.
    pub store_path: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `lesson_engine=debug`.
    pub log_level: String,
}

impl Settings {
    /// Load settings. An explicit `config_file` must exist; otherwise an
    /// optional `lessons.toml` in the working directory is read.
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or deserialized, or if the
    /// timezone is not a valid IANA identifier.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("timezone", "UTC")?
            .set_default("store_path", "schedules.json")?
            .set_default("log_level", "warn")?;

        let builder = match config_file {
            Some(path) => builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            ),
            None => builder.add_source(File::with_name("lessons").required(false)),
        };

        let settings: Settings = builder
            .add_source(Environment::with_prefix("LESSONS"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }
}
