//! Script execution against an in-memory site

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use rehearse::{Clock, MemoryPage, Replayer, RunReport, Script, Site, SystemClock};
use std::path::Path;
use std::sync::Arc;

/// Loads scripts and sites and replays them with the configured timing
#[derive(Debug)]
pub struct ScriptRunner {
    config: CliConfig,
}

impl ScriptRunner {
    /// Create a new runner
    #[must_use]
    pub const fn new(config: CliConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Replay `script` against `site` on the wall clock
    pub fn run(&self, script: &Path, site: &Path) -> CliResult<RunReport> {
        let script = Script::load(script)?;
        let site = Site::load(site)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        self.run_loaded(&script, site, clock)
    }

    /// Replay an already loaded script on `clock`
    pub fn run_loaded(
        &self,
        script: &Script,
        site: Site,
        clock: Arc<dyn Clock>,
    ) -> CliResult<RunReport> {
        self.config.validate()?;
        let page = MemoryPage::new(site, Arc::clone(&clock))?;
        let mut replayer = Replayer::new(page)
            .with_clock(clock)
            .with_options(self.config.options);
        tracing::info!(
            steps = script.len(),
            timeout_ms = self.config.options.timeout_ms,
            "replaying"
        );
        Ok(replayer.run(script)?)
    }

    /// Load and check `script`, and `site` when given
    pub fn validate(&self, script: &Path, site: Option<&Path>) -> CliResult<Script> {
        let script = Script::load(script)?;
        if let Some(site) = site {
            Site::load(site)?;
        }
        Ok(script)
    }
}

/// Convert a codegen script file to YAML records
pub fn import_script(input: &Path) -> CliResult<String> {
    let is_codegen = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ts" | "js" | "mjs" | "cjs"));
    if !is_codegen {
        return Err(CliError::invalid_argument(format!(
            "{} is not a .ts or .js codegen script",
            input.display()
        )));
    }
    let script = Script::load(input)?;
    Ok(script.to_yaml()?)
}
