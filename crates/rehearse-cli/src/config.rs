//! CLI configuration
//!
//! Settings come from four layers, highest first: command-line flags,
//! `REHEARSE_*` environment variables (resolved by clap), the optional
//! `rehearse.yaml` file, and built-in defaults.

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use rehearse::ReplayOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "rehearse.yaml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "warn,rehearse=info,rehearse_cli=info",
            Self::Debug => "info,rehearse=debug,rehearse_cli=debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Contents of `rehearse.yaml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Action and assertion timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: Option<u64>,
    /// Poll interval in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Report format
    pub format: Option<OutputFormat>,
    /// Site used when `run` gets no `--site`
    pub site: Option<PathBuf>,
}

impl FileConfig {
    /// Parse YAML
    pub fn from_yaml(yaml: &str) -> CliResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml).map_err(|e| CliError::config(e.to_string()))
    }

    /// Read a config file
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&text)?;
        // Site paths in the file are relative to the file.
        if let (Some(site), Some(dir)) = (&config.site, path.parent()) {
            if site.is_relative() {
                config.site = Some(dir.join(site));
            }
        }
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Load `explicit`, or `rehearse.yaml` in `dir` if present, or defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Log line format
    pub log_format: LogFormat,
    /// Report format
    pub format: OutputFormat,
    /// Replay timing
    pub options: ReplayOptions,
    /// Default site for `run`
    pub site: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            log_format: LogFormat::Text,
            format: OutputFormat::Text,
            options: ReplayOptions::default(),
            site: None,
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Set report format
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the action and assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.options = self.options.with_timeout(ms);
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, ms: u64) -> Self {
        self.options = self.options.with_navigation_timeout(ms);
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.options = self.options.with_poll_interval(ms);
        self
    }

    /// Layer file settings over the current values
    #[must_use]
    pub fn with_file(mut self, file: &FileConfig) -> Self {
        if let Some(ms) = file.timeout_ms {
            self = self.with_timeout(ms);
        }
        if let Some(ms) = file.navigation_timeout_ms {
            self = self.with_navigation_timeout(ms);
        }
        if let Some(ms) = file.poll_interval_ms {
            self = self.with_poll_interval(ms);
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(site) = &file.site {
            self.site = Some(site.clone());
        }
        self
    }

    /// Reject settings the replayer cannot honour
    pub fn validate(&self) -> CliResult<()> {
        if self.options.poll_interval_ms == 0 {
            return Err(CliError::config("poll interval must be at least 1ms"));
        }
        Ok(())
    }
}
