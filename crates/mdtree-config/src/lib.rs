//! Configuration management for mdtree.
//!
//! Parses `mdtree.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [parser]
//! gfm = true
//! footnotes = true
//! math = true
//! wikilinks = true
//! frontmatter = true
//! tasklists = true
//!
//! [convert]
//! blank_lines = true
//! decode_urls = true
//!
//! [output]
//! pretty = false
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override pretty-printed JSON output.
    pub pretty: Option<bool>,
    /// Override blank-line reconstruction.
    pub blank_lines: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdtree.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown syntax extensions.
    pub parser: ParserConfig,
    /// Conversion settings.
    pub convert: ConvertConfig,
    /// Output formatting.
    pub output: OutputConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown syntax extensions recognized by the parser.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParserConfig {
    /// Tables and strikethrough.
    pub gfm: bool,
    pub footnotes: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// `[[Page]]` links.
    pub wikilinks: bool,
    /// Leading YAML frontmatter.
    pub frontmatter: bool,
    /// `- [x]` task list items.
    pub tasklists: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            footnotes: true,
            math: true,
            wikilinks: true,
            frontmatter: true,
            tasklists: true,
        }
    }
}

/// Conversion settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Turn runs of blank lines between top-level blocks into empty paragraphs.
    pub blank_lines: bool,
    /// Percent-decode media and link URLs.
    pub decode_urls: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            blank_lines: true,
            decode_urls: true,
        }
    }
}

/// Output formatting.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdtree.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(pretty) = settings.pretty {
            self.output.pretty = pretty;
        }
        if let Some(blank_lines) = settings.blank_lines {
            self.convert.blank_lines = blank_lines;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.tasklists && !self.parser.gfm {
            return Err(ConfigError::Validation(
                "parser.tasklists requires parser.gfm".to_owned(),
            ));
        }
        Ok(())
    }
}
