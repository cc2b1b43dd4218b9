//! Page boundary.
//!
//! The replayer drives a page only through [`Page`]. A real browser backend
//! would implement it over a remote protocol; [`crate::memory::MemoryPage`]
//! implements it in-process.

use crate::dom::{Dom, NodeId};
use crate::result::ReplayResult;
use std::fmt;
use std::time::Duration;

/// A live page the replayer owns for the duration of a run
pub trait Page: fmt::Debug {
    /// Load `url`; fail with a navigation error if it does not finish within `timeout`
    fn navigate(&mut self, url: &str, timeout: Duration) -> ReplayResult<()>;

    /// Snapshot of the current document
    fn document(&mut self) -> ReplayResult<&Dom>;

    /// Click an element of the current document
    fn click(&mut self, node: NodeId) -> ReplayResult<()>;

    /// Replace the value of an editable element
    fn fill(&mut self, node: NodeId, text: &str) -> ReplayResult<()>;

    /// Current value of a form control
    fn input_value(&mut self, node: NodeId) -> ReplayResult<String>;

    /// URL of the loaded document
    fn current_url(&self) -> Option<&str>;

    /// Release the page; later calls fail with [`crate::ReplayError::PageClosed`]
    fn close(&mut self);

    /// Whether [`Page::close`] was called
    fn is_closed(&self) -> bool;
}

/// Call recorded by [`RecordingPage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    /// `navigate(url)`
    Navigate(String),
    /// `click(node)`
    Click(NodeId),
    /// `fill(node, text)`
    Fill(NodeId, String),
    /// `close()`
    Close,
}

impl fmt::Display for PageCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(url) => write!(f, "navigate:{url}"),
            Self::Click(node) => write!(f, "click:{node}"),
            Self::Fill(node, text) => write!(f, "fill:{node}:{text}"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Wraps a page and records every side-effecting call, for verification in tests
#[derive(Debug)]
pub struct RecordingPage<P> {
    inner: P,
    calls: Vec<PageCall>,
}

impl<P: Page> RecordingPage<P> {
    /// Wrap `inner`
    #[must_use]
    pub const fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    /// Recorded calls in order
    #[must_use]
    pub fn history(&self) -> &[PageCall] {
        &self.calls
    }

    /// Whether a call whose display form starts with `method` was made
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.calls.iter().any(|c| c.to_string().starts_with(method))
    }

    /// Wrapped page
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Unwrap
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Page> Page for RecordingPage<P> {
    fn navigate(&mut self, url: &str, timeout: Duration) -> ReplayResult<()> {
        self.calls.push(PageCall::Navigate(url.to_string()));
        self.inner.navigate(url, timeout)
    }

    fn document(&mut self) -> ReplayResult<&Dom> {
        self.inner.document()
    }

    fn click(&mut self, node: NodeId) -> ReplayResult<()> {
        self.calls.push(PageCall::Click(node));
        self.inner.click(node)
    }

    fn fill(&mut self, node: NodeId, text: &str) -> ReplayResult<()> {
        self.calls.push(PageCall::Fill(node, text.to_string()));
        self.inner.fill(node, text)
    }

    fn input_value(&mut self, node: NodeId) -> ReplayResult<String> {
        self.inner.input_value(node)
    }

    fn current_url(&self) -> Option<&str> {
        self.inner.current_url()
    }

    fn close(&mut self) {
        self.calls.push(PageCall::Close);
        self.inner.close();
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
