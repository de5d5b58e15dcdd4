use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_CHART_WIDTH, DEFAULT_CONFIG_FILE, DEFAULT_INPUT_FILE,
    DEFAULT_ROW_GROUP_SIZE, ENV_PREFIX,
};
use crate::writers::OutputFormat;

/// Runtime settings: built-in defaults, then an optional TOML file, then
/// `AQP_*` environment variables. Command-line flags are applied on top by
/// the CLI.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    pub input: PathBuf,

    pub format: OutputFormat,

    #[validate(length(min = 1))]
    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,

    #[validate(range(min = 1, max = 200))]
    pub chart_width: usize,
}

impl Settings {
    /// Load settings. A missing `path` falls back to `aqp.toml` in the
    /// working directory, which is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .set_default("input", DEFAULT_INPUT_FILE)?
            .set_default("format", "table")?
            .set_default("compression", COMPRESSION_SNAPPY)?
            .set_default("row_group_size", DEFAULT_ROW_GROUP_SIZE as u64)?
            .set_default("chart_width", DEFAULT_CHART_WIDTH as u64)?
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            format: OutputFormat::Table,
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let settings = Settings::load(None)?;

        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.row_group_size, DEFAULT_ROW_GROUP_SIZE);
        assert!(settings.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "input = \"data/dingling.csv\"")?;
        writeln!(file, "format = \"json\"")?;
        writeln!(file, "chart_width = 60")?;

        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(settings.input, PathBuf::from("data/dingling.csv"));
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.chart_width, 60);
        assert_eq!(settings.compression, COMPRESSION_SNAPPY);
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "chart_width = 0")?;

        assert!(Settings::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/aqp.toml"))).is_err());
    }
}
