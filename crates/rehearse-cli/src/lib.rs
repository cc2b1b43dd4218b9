//! Rehearse CLI Library
//!
//! Command-line interface for replaying interaction scripts against
//! in-memory sites.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, FormatArg, ImportArgs, LogFormatArg, RunArgs, ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, FileConfig, LogFormat, Verbosity, CONFIG_FILE_NAME};
pub use error::{CliError, CliResult};
pub use output::{render_json, render_text, OutputFormat, Reporter};
pub use runner::{import_script, ScriptRunner};
