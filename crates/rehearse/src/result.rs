//! Result and error types for Rehearse.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for Rehearse operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Why an element could not be acted on.
///
/// Carried by [`ReplayError::ElementNotInteractable`]; this is the last
/// observation made before the wait deadline elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum NotInteractableReason {
    /// The locator resolved to zero elements
    NotFound,
    /// The locator resolved to several elements and no pick was given
    Ambiguous {
        /// Number of matching elements
        count: usize,
    },
    /// The element (or an ancestor) is not rendered
    Hidden,
    /// The element is disabled
    Disabled,
    /// The element does not accept text input
    NotEditable,
}

impl fmt::Display for NotInteractableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no element matches"),
            Self::Ambiguous { count } => {
                write!(f, "locator is ambiguous ({count} elements match)")
            }
            Self::Hidden => write!(f, "element is not visible"),
            Self::Disabled => write!(f, "element is disabled"),
            Self::NotEditable => write!(f, "element is not editable"),
        }
    }
}

/// Errors that can occur in Rehearse
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Page load failed
    #[error("Navigation to {url} failed: {reason}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        reason: String,
    },

    /// Target never became actionable within the timeout
    #[error("Element {locator} not interactable after {timeout_ms}ms: {reason}")]
    ElementNotInteractable {
        /// Locator description
        locator: String,
        /// Last observed reason
        reason: NotInteractableReason,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Text assertion never held within the timeout
    #[error(
        "Timed out after {timeout_ms}ms waiting for {locator} to contain '{expected}' (last text: {})",
        .actual.as_deref().map_or_else(|| "<unresolved>".to_string(), |t| format!("'{t}'"))
    )]
    AssertionTimeout {
        /// Locator description
        locator: String,
        /// Expected substring
        expected: String,
        /// Last observed text, if the locator resolved
        actual: Option<String>,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// The run was aborted through its cancel token
    #[error("Run cancelled")]
    Cancelled,

    /// Script is malformed
    #[error("Invalid script: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// CSS selector could not be parsed
    #[error("Unsupported selector '{selector}': {message}")]
    Selector {
        /// Selector source
        selector: String,
        /// Error message
        message: String,
    },

    /// Codegen script could not be imported
    #[error("Codegen import failed at line {line}: {message}")]
    Codegen {
        /// 1-based source line
        line: usize,
        /// Error message
        message: String,
    },

    /// Site definition is invalid
    #[error("Site error: {message}")]
    Site {
        /// Error message
        message: String,
    },

    /// HTML document could not be parsed
    #[error("HTML parse error: {message}")]
    Html {
        /// Error message
        message: String,
    },

    /// Page handle was used after it was closed
    #[error("Page is closed")]
    PageClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ReplayError {
    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a site error
    #[must_use]
    pub fn site(message: impl Into<String>) -> Self {
        Self::Site {
            message: message.into(),
        }
    }

    /// Create a navigation error
    #[must_use]
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Coarse classification used in run reports
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Navigation { .. } => FailureKind::Navigation,
            Self::ElementNotInteractable { .. } => FailureKind::ElementNotInteractable,
            Self::AssertionTimeout { .. } => FailureKind::AssertionTimeout,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Script { .. } | Self::Selector { .. } | Self::Codegen { .. } => {
                FailureKind::Script
            }
            Self::Site { .. }
            | Self::Html { .. }
            | Self::PageClosed
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => FailureKind::Page,
        }
    }
}

/// Classification of a step failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// `NavigationError`
    Navigation,
    /// `ElementNotInteractableError`
    ElementNotInteractable,
    /// `AssertionTimeoutError`
    AssertionTimeout,
    /// Run cancelled
    Cancelled,
    /// Script rejected before or while running
    Script,
    /// Page provider failure
    Page,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "NavigationError",
            Self::ElementNotInteractable => "ElementNotInteractableError",
            Self::AssertionTimeout => "AssertionTimeoutError",
            Self::Cancelled => "Cancelled",
            Self::Script => "ScriptError",
            Self::Page => "PageError",
        };
        f.write_str(name)
    }
}
