//! CLI command definitions using clap

use crate::config::{ColorChoice, LogFormat};
use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rehearse: replay recorded UI interaction scripts with auto-waiting locators
#[derive(Parser, Debug)]
#[command(name = "rehearse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true, env = "REHEARSE_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Config file (default: ./rehearse.yaml when present)
    #[arg(long, global = true, env = "REHEARSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a script against an in-memory site
    Run(RunArgs),

    /// Parse and check a script without running it
    Validate(ValidateArgs),

    /// Convert a recorded codegen script to YAML steps
    Import(ImportArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Script file (.yaml/.yml records or .ts/.js codegen)
    pub script: PathBuf,

    /// Site definition (YAML)
    #[arg(short, long, env = "REHEARSE_SITE")]
    pub site: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Action and assertion timeout in milliseconds
    #[arg(long, env = "REHEARSE_TIMEOUT_MS")]
    pub timeout: Option<u64>,

    /// Navigation timeout in milliseconds
    #[arg(long, env = "REHEARSE_NAVIGATION_TIMEOUT_MS")]
    pub navigation_timeout: Option<u64>,

    /// Poll interval in milliseconds
    #[arg(long, env = "REHEARSE_POLL_INTERVAL_MS")]
    pub poll_interval: Option<u64>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Script file
    pub script: PathBuf,

    /// Also check a site definition
    #[arg(short, long)]
    pub site: Option<PathBuf>,
}

/// Arguments for the import command
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Codegen script (.ts/.js)
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_with_flags() {
            let cli = Cli::try_parse_from([
                "rehearse",
                "-vv",
                "--color",
                "never",
                "run",
                "flow.yaml",
                "--site",
                "site.yaml",
                "--format",
                "json",
                "--timeout",
                "750",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.color, ColorArg::Never);
            match cli.command {
                Commands::Run(args) => {
                    assert_eq!(args.script, PathBuf::from("flow.yaml"));
                    assert_eq!(args.site, Some(PathBuf::from("site.yaml")));
                    assert_eq!(args.format, Some(FormatArg::Json));
                    assert_eq!(args.timeout, Some(750));
                }
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_global_flag_after_subcommand() {
            let cli = Cli::try_parse_from(["rehearse", "validate", "flow.yaml", "-q"]).unwrap();
            assert!(cli.quiet);
            assert!(matches!(cli.command, Commands::Validate(_)));
        }

        #[test]
        fn test_import_output() {
            let cli =
                Cli::try_parse_from(["rehearse", "import", "test.spec.ts", "-o", "out.yaml"])
                    .unwrap();
            match cli.command {
                Commands::Import(args) => {
                    assert_eq!(args.output, Some(PathBuf::from("out.yaml")));
                }
                other => panic!("unexpected command {other:?}"),
            }
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["rehearse"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_arg_conversions() {
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
            assert_eq!(OutputFormat::from(FormatArg::Text), OutputFormat::Text);
        }
    }
}
