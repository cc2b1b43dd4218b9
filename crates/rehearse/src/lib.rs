//! Rehearse: declarative UI-interaction replay
//!
//! A [`Script`] is a sequence of steps (navigate, locate, act, assert). A
//! [`Replayer`] executes it against a [`Page`], waiting for every target to
//! become unique and actionable before touching it, and produces a
//! [`RunReport`] saying which step failed and why.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     REHEARSE Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Script     │    │ Replayer   │    │ Page       │             │
//! │   │ (YAML/TS)  │───►│ wait+act   │───►│ (memory)   │             │
//! │   └────────────┘    └─────┬──────┘    └─────┬──────┘             │
//! │                           │ resolve         │ Dom snapshot       │
//! │                     ┌─────▼──────┐          │                    │
//! │                     │ Locator    │◄─────────┘                    │
//! │                     │ role/css   │                               │
//! │                     └────────────┘                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Playwright-style codegen import
pub mod codegen;

/// Structural CSS selectors
pub mod css;

/// Document snapshot and HTML parsing
pub mod dom;

/// Locator expressions
pub mod locator;

/// In-memory page backend and site model
pub mod memory;

/// Page boundary
pub mod page;

/// Script execution and reports
pub mod replayer;

/// Locator resolution
pub mod resolve;

/// Error types
pub mod result;

/// ARIA roles and accessible names
pub mod role;

/// Script and step model
pub mod step;

/// Clocks, cancellation and polling
pub mod wait;

pub use css::CssSelector;
pub use dom::{Dom, NodeId};
pub use locator::{Filter, Locator, Pick, Selector, TextMatch};
pub use memory::{Effect, MemoryPage, Reaction, Site, SitePage};
pub use page::{Page, PageCall, RecordingPage};
pub use replayer::{
    describe_steps, ReplayOptions, Replayer, RunOutcome, RunReport, StepFailure, StepReport,
    StepStatus,
};
pub use resolve::{resolve, resolve_one};
pub use result::{FailureKind, NotInteractableReason, ReplayError, ReplayResult};
pub use role::AriaRole;
pub use step::{Action, Assertion, Script, Step};
pub use wait::{
    poll_until, CancelToken, Clock, ManualClock, SystemClock, WaitOptions, DEFAULT_NAVIGATION_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
