//! Rehearse CLI: replay UI interaction scripts
//!
//! ## Usage
//!
//! ```bash
//! rehearse run flow.yaml --site site.yaml          # Replay, exit 1 on failure
//! rehearse run test-3.spec.ts --site site.yaml -f json
//! rehearse validate flow.yaml                      # Parse and check only
//! rehearse import test-3.spec.ts -o flow.yaml      # Codegen to YAML steps
//! ```

use clap::Parser;
use rehearse::describe_steps;
use rehearse_cli::{
    import_script, logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    FileConfig, ImportArgs, Reporter, RunArgs, ScriptRunner, ValidateArgs,
    Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    logging::init_logging(config.verbosity, config.log_format);

    match cli.command {
        Commands::Run(args) => run_script(config, &args),
        Commands::Validate(args) => run_validate(&config, &args),
        Commands::Import(args) => run_import(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    let cwd = std::env::current_dir()?;
    let file = FileConfig::discover(cli.config.as_deref(), &cwd)?;

    Ok(CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(cli.log_format.into())
        .with_file(&file))
}

fn reporter(config: &CliConfig) -> Reporter {
    Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

fn run_script(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut config = config;
    if let Some(ms) = args.timeout {
        config = config.with_timeout(ms);
    }
    if let Some(ms) = args.navigation_timeout {
        config = config.with_navigation_timeout(ms);
    }
    if let Some(ms) = args.poll_interval {
        config = config.with_poll_interval(ms);
    }
    if let Some(format) = args.format {
        config = config.with_format(format.into());
    }
    let site = args
        .site
        .clone()
        .or_else(|| config.site.clone())
        .ok_or_else(|| CliError::invalid_argument("no site given; pass --site or set it in rehearse.yaml"))?;

    let reporter = reporter(&config);
    let format = config.format;
    let report = ScriptRunner::new(config).run(&args.script, &site)?;
    reporter.report(&report, format)?;

    match report.failed_step() {
        None if report.is_success() => Ok(()),
        Some(step) => Err(CliError::run_failed(format!(
            "step {} ({})",
            step.index + 1,
            step.description
        ))),
        None => Err(CliError::run_failed("cancelled")),
    }
}

fn run_validate(config: &CliConfig, args: &ValidateArgs) -> CliResult<()> {
    let reporter = reporter(config);
    let runner = ScriptRunner::new(config.clone());
    let script = runner.validate(&args.script, args.site.as_deref())?;

    if config.verbosity.is_verbose() {
        for (index, description) in describe_steps(&script).iter().enumerate() {
            reporter.line(&format!("{:>3} {description}", index + 1))?;
        }
    }
    reporter.success(&format!(
        "{} is valid ({} steps)",
        args.script.display(),
        script.len()
    ));
    Ok(())
}

fn run_import(config: &CliConfig, args: &ImportArgs) -> CliResult<()> {
    let yaml = import_script(&args.input)?;
    let reporter = reporter(config);
    match &args.output {
        Some(path) => {
            std::fs::write(path, &yaml)?;
            reporter.success(&format!("wrote {}", path.display()));
        }
        None => reporter.line(yaml.trim_end())?,
    }
    Ok(())
}
