//! Action Replayer.
//!
//! Executes a [`Script`] against a [`Page`], one step at a time. Every
//! action and assertion waits for its condition through
//! [`crate::wait::poll_until`], re-resolving the locator on each poll. The
//! first failing step ends the run; the steps after it are reported as
//! skipped.
//!
//! ```
//! use rehearse::{AriaRole, Locator, ManualClock, MemoryPage, Replayer, Script, Site};
//! use std::sync::Arc;
//!
//! let site = Site::new().page("http://app.test/", r#"<p role="status">ready</p>"#);
//! let clock = Arc::new(ManualClock::new());
//! let page = MemoryPage::new(site, clock.clone()).unwrap();
//! let mut replayer = Replayer::new(page).with_clock(clock);
//!
//! let script = Script::new()
//!     .navigate("http://app.test/")
//!     .expect_contains_text(Locator::role(AriaRole::Status), "ready");
//! let report = replayer.run(&script).unwrap();
//! assert!(report.is_success());
//! ```

use crate::dom::{normalize_whitespace, Dom, NodeId};
use crate::locator::Locator;
use crate::page::Page;
use crate::resolve::{resolve, resolve_one, resolve_under};
use crate::result::{FailureKind, NotInteractableReason, ReplayError, ReplayResult};
use crate::step::{Action, Assertion, Script, Step};
use crate::wait::{
    poll_until, CancelToken, Clock, Probe, SystemClock, WaitError, WaitOptions,
    DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// OPTIONS
// =============================================================================

/// Run-wide timing defaults; steps may override the timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Action and assertion timeout in milliseconds
    pub timeout_ms: u64,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ReplayOptions {
    /// Defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action and assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, ms: u64) -> Self {
        self.navigation_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Lifecycle of a step within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started
    Pending,
    /// Executing
    Running,
    /// Completed
    Succeeded,
    /// Ended with an error
    Failed,
    /// Never started because an earlier step failed
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Why a step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Classification
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

impl From<&ReplayError> for StepFailure {
    fn from(error: &ReplayError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Zero-based position in the script
    pub index: usize,
    /// Step and target description
    pub description: String,
    /// Final status
    pub status: StepStatus,
    /// Time spent in the step
    pub elapsed_ms: u64,
    /// Failure detail when `status` is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepFailure>,
}

/// Overall result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every step succeeded
    Succeeded,
    /// A step failed and the run stopped there
    Failed {
        /// Index of the failing step
        step: usize,
        /// Failure detail
        error: StepFailure,
    },
    /// The cancel token fired
    Cancelled {
        /// Index of the step that was running or about to run
        step: usize,
    },
}

/// Per-step and overall results of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Script name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One entry per script step
    pub steps: Vec<StepReport>,
    /// Overall outcome
    pub outcome: RunOutcome,
    /// Total run time
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Whether every step succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Succeeded)
    }

    /// The failing step, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    /// Number of steps with `status`
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Pretty JSON
    pub fn to_json(&self) -> ReplayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Description of each step with the target it acts on
#[must_use]
pub fn describe_steps(script: &Script) -> Vec<String> {
    let mut target: Option<&Locator> = None;
    script
        .steps
        .iter()
        .map(|step| match step {
            Step::Locate { locator } => {
                target = Some(locator);
                step.to_string()
            }
            Step::Act { .. } | Step::Assert { .. } => match target {
                Some(locator) => format!("{step} [{locator}]"),
                None => step.to_string(),
            },
            Step::Navigate { .. } => step.to_string(),
        })
        .collect()
}

// =============================================================================
// REPLAYER
// =============================================================================

fn actionability(dom: &Dom, locator: &Locator, editable: bool) -> Result<NodeId, NotInteractableReason> {
    let node = resolve_one(dom, locator)?;
    if !dom.is_visible(node) {
        return Err(NotInteractableReason::Hidden);
    }
    if !dom.is_enabled(node) {
        return Err(NotInteractableReason::Disabled);
    }
    if editable && !dom.is_editable(node) {
        return Err(NotInteractableReason::NotEditable);
    }
    Ok(node)
}

/// Replays scripts against a page it owns
#[derive(Debug)]
pub struct Replayer<P: Page> {
    page: P,
    clock: Arc<dyn Clock>,
    options: ReplayOptions,
    cancel: CancelToken,
    target: Option<Locator>,
}

impl<P: Page> Replayer<P> {
    /// Replayer on the wall clock with default options
    pub fn new(page: P) -> Self {
        Self {
            page,
            clock: Arc::new(SystemClock::new()),
            options: ReplayOptions::default(),
            cancel: CancelToken::new(),
            target: None,
        }
    }

    /// Use `clock` for all waits; share it with the page for consistent time
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set timing defaults
    #[must_use]
    pub const fn with_options(mut self, options: ReplayOptions) -> Self {
        self.options = options;
        self
    }

    /// Use an externally owned cancel token
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels this replayer's runs
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Timing defaults
    #[must_use]
    pub const fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// Current target set by the last `Locate`
    #[must_use]
    pub const fn target(&self) -> Option<&Locator> {
        self.target.as_ref()
    }

    /// Page being driven
    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    /// Page being driven, mutably
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// Release the page
    pub fn into_page(self) -> P {
        self.page
    }

    fn wait_options(&self, timeout_ms: Option<u64>) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms.unwrap_or(self.options.timeout_ms))
            .with_poll_interval(self.options.poll_interval_ms)
    }

    fn elapsed_ms(&self, since: Duration) -> u64 {
        self.clock.now().saturating_sub(since).as_millis() as u64
    }

    /// Run every step in order.
    ///
    /// Scripts that fail validation are rejected before any step runs. Step
    /// failures are reported in the returned [`RunReport`], not as errors.
    pub fn run(&mut self, script: &Script) -> ReplayResult<RunReport> {
        script.validate()?;
        self.target = None;

        let started = self.clock.now();
        let mut steps: Vec<StepReport> = describe_steps(script)
            .into_iter()
            .enumerate()
            .map(|(index, description)| StepReport {
                index,
                description,
                status: StepStatus::Pending,
                elapsed_ms: 0,
                error: None,
            })
            .collect();
        let mut outcome = RunOutcome::Succeeded;

        tracing::info!(
            script = script.name.as_deref().unwrap_or("<unnamed>"),
            steps = script.len(),
            "run started"
        );

        for (index, step) in script.steps.iter().enumerate() {
            let step_started = self.clock.now();
            let result = if self.cancel.is_cancelled() {
                Err(ReplayError::Cancelled)
            } else {
                steps[index].status = StepStatus::Running;
                tracing::info!(step = index + 1, description = %steps[index].description, "step started");
                self.execute(step)
            };
            steps[index].elapsed_ms = self.elapsed_ms(step_started);

            match result {
                Ok(()) => {
                    steps[index].status = StepStatus::Succeeded;
                    tracing::info!(step = index + 1, elapsed_ms = steps[index].elapsed_ms, "step passed");
                }
                Err(error) => {
                    let failure = StepFailure::from(&error);
                    steps[index].status = StepStatus::Failed;
                    steps[index].error = Some(failure.clone());
                    if matches!(error, ReplayError::Cancelled) {
                        tracing::warn!(step = index + 1, "run cancelled");
                        outcome = RunOutcome::Cancelled { step: index };
                        self.page.close();
                    } else {
                        tracing::warn!(step = index + 1, error = %error, "step failed");
                        outcome = RunOutcome::Failed {
                            step: index,
                            error: failure,
                        };
                    }
                    break;
                }
            }
        }

        for report in &mut steps {
            if report.status == StepStatus::Pending {
                report.status = StepStatus::Skipped;
            }
        }

        let report = RunReport {
            name: script.name.clone(),
            steps,
            outcome,
            elapsed_ms: self.elapsed_ms(started),
        };
        tracing::info!(
            success = report.is_success(),
            elapsed_ms = report.elapsed_ms,
            "run finished"
        );
        Ok(report)
    }

    /// Execute one step against the current target
    pub fn execute(&mut self, step: &Step) -> ReplayResult<()> {
        match step {
            Step::Navigate { url, timeout_ms } => self.navigate(url, *timeout_ms),
            Step::Locate { locator } => {
                self.target = Some(locator.clone());
                Ok(())
            }
            Step::Act { action, timeout_ms } => {
                let target = self.current_target(step)?;
                match action {
                    Action::Click => self.click(&target, *timeout_ms),
                    Action::Fill { value } => self.fill(&target, value, *timeout_ms),
                }
            }
            Step::Assert {
                assertion: Assertion::ContainsText { expected },
                timeout_ms,
            } => {
                let target = self.current_target(step)?;
                self.assert_contains_text(&target, expected, *timeout_ms)
            }
        }
    }

    fn current_target(&self, step: &Step) -> ReplayResult<Locator> {
        self.target
            .clone()
            .ok_or_else(|| ReplayError::script(format!("'{step}' has no target")))
    }

    /// Load `url` and wait for the load to finish
    pub fn navigate(&mut self, url: &str, timeout_ms: Option<u64>) -> ReplayResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ReplayError::Cancelled);
        }
        let timeout = timeout_ms.unwrap_or(self.options.navigation_timeout_ms);
        tracing::debug!(url, timeout_ms = timeout, "navigating");
        self.page.navigate(url, Duration::from_millis(timeout))
    }

    /// Resolve `locator` against the current document, optionally under a
    /// previously resolved element. Never waits.
    pub fn locate(&mut self, locator: &Locator, scope: Option<NodeId>) -> ReplayResult<Vec<NodeId>> {
        let dom = self.page.document()?;
        let found = match scope {
            Some(root) => resolve_under(dom, locator, root),
            None => resolve(dom, locator),
        };
        tracing::debug!(%locator, candidates = found.len(), "located");
        Ok(found)
    }

    fn wait_actionable(
        &mut self,
        locator: &Locator,
        timeout_ms: Option<u64>,
        editable: bool,
    ) -> ReplayResult<NodeId> {
        let options = self.wait_options(timeout_ms);
        let clock = Arc::clone(&self.clock);
        let page = &mut self.page;
        let waited = poll_until(clock.as_ref(), &options, &self.cancel, || {
            let dom = page.document()?;
            Ok(match actionability(dom, locator, editable) {
                Ok(node) => Probe::Ready(node),
                Err(reason) => Probe::Pending(reason),
            })
        });
        match waited {
            Ok(waited) => {
                tracing::debug!(%locator, polls = waited.polls, "element actionable");
                Ok(waited.value)
            }
            Err(WaitError::Timeout { last, .. }) => Err(ReplayError::ElementNotInteractable {
                locator: locator.to_string(),
                reason: last,
                timeout_ms: options.timeout_ms,
            }),
            Err(WaitError::Cancelled) => Err(ReplayError::Cancelled),
            Err(WaitError::Failed(error)) => Err(error),
        }
    }

    /// Wait until `locator` is a single visible, enabled element, then click it
    pub fn click(&mut self, locator: &Locator, timeout_ms: Option<u64>) -> ReplayResult<()> {
        let node = self.wait_actionable(locator, timeout_ms, false)?;
        self.page.click(node)
    }

    /// Wait until `locator` is a single visible, enabled, editable element,
    /// then replace its value with `text`
    pub fn fill(&mut self, locator: &Locator, text: &str, timeout_ms: Option<u64>) -> ReplayResult<()> {
        let node = self.wait_actionable(locator, timeout_ms, true)?;
        self.page.fill(node, text)
    }

    /// Value of the single element `locator` resolves to, without waiting
    pub fn input_value(&mut self, locator: &Locator) -> ReplayResult<String> {
        let node = {
            let dom = self.page.document()?;
            resolve_one(dom, locator).map_err(|reason| ReplayError::ElementNotInteractable {
                locator: locator.to_string(),
                reason,
                timeout_ms: 0,
            })?
        };
        self.page.input_value(node)
    }

    /// Poll until the rendered text of `locator`'s single element contains
    /// `expected` (case-sensitive, whitespace-normalized)
    pub fn assert_contains_text(
        &mut self,
        locator: &Locator,
        expected: &str,
        timeout_ms: Option<u64>,
    ) -> ReplayResult<()> {
        let options = self.wait_options(timeout_ms);
        let wanted = normalize_whitespace(expected);
        let clock = Arc::clone(&self.clock);
        let page = &mut self.page;
        let waited = poll_until(clock.as_ref(), &options, &self.cancel, || {
            let dom = page.document()?;
            Ok(match resolve_one(dom, locator) {
                Ok(node) => {
                    let text = dom.rendered_text(node);
                    if text.contains(&wanted) {
                        Probe::Ready(())
                    } else {
                        Probe::Pending(Some(text))
                    }
                }
                Err(_) => Probe::Pending(None),
            })
        });
        match waited {
            Ok(_) => Ok(()),
            Err(WaitError::Timeout { last, .. }) => Err(ReplayError::AssertionTimeout {
                locator: locator.to_string(),
                expected: expected.to_string(),
                actual: last,
                timeout_ms: options.timeout_ms,
            }),
            Err(WaitError::Cancelled) => Err(ReplayError::Cancelled),
            Err(WaitError::Failed(error)) => Err(error),
        }
    }
}
