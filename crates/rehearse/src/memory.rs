//! In-memory page provider.
//!
//! A [`Site`] is a set of HTML documents keyed by absolute URL, each with
//! optional click [`Reaction`]s that mutate the document (or navigate) after
//! an optional delay. [`MemoryPage`] serves a site through the [`Page`]
//! trait, reading time from an injected [`Clock`] so delayed reactions are
//! deterministic under a [`crate::ManualClock`].
//!
//! Sites are usually loaded from YAML:
//!
//! ```yaml
//! pages:
//!   "http://localhost:8000/":
//!     html: |
//!       <a href="/venue">Venue</a>
//!   "http://localhost:8000/venue":
//!     load_ms: 120
//!     html: |
//!       <button id="go">Go</button><dialog id="result"></dialog>
//!     reactions:
//!       - on_click: "#go"
//!         delay_ms: 300
//!         effects:
//!           - { type: set_text, target: "#result", text: "done" }
//!           - { type: show, target: "#result" }
//! ```

use crate::css::CssSelector;
use crate::dom::{style_hides, Dom, NodeId};
use crate::page::Page;
use crate::result::{ReplayError, ReplayResult};
use crate::wait::{Clock, DEFAULT_NAVIGATION_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// =============================================================================
// SITE MODEL
// =============================================================================

/// Document mutation or navigation triggered by a click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Effect {
    /// Make matching elements visible (`hidden` removed, dialogs opened)
    Show {
        /// CSS selector of the targets
        target: String,
    },
    /// Hide matching elements
    Hide {
        /// CSS selector of the targets
        target: String,
    },
    /// Replace the content of matching elements with text
    SetText {
        /// CSS selector of the targets
        target: String,
        /// New text
        text: String,
    },
    /// Set an attribute on matching elements
    SetAttribute {
        /// CSS selector of the targets
        target: String,
        /// Attribute name
        name: String,
        /// Attribute value
        #[serde(default)]
        value: String,
    },
    /// Remove an attribute from matching elements
    RemoveAttribute {
        /// CSS selector of the targets
        target: String,
        /// Attribute name
        name: String,
    },
    /// Load another document, relative to the current URL
    Navigate {
        /// Destination
        url: String,
    },
}

impl Effect {
    /// Show targets
    #[must_use]
    pub fn show(target: impl Into<String>) -> Self {
        Self::Show {
            target: target.into(),
        }
    }

    /// Hide targets
    #[must_use]
    pub fn hide(target: impl Into<String>) -> Self {
        Self::Hide {
            target: target.into(),
        }
    }

    /// Replace target text
    #[must_use]
    pub fn set_text(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::SetText {
            target: target.into(),
            text: text.into(),
        }
    }

    /// Set a target attribute
    #[must_use]
    pub fn set_attribute(
        target: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::SetAttribute {
            target: target.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Remove a target attribute
    #[must_use]
    pub fn remove_attribute(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self::RemoveAttribute {
            target: target.into(),
            name: name.into(),
        }
    }

    /// Navigate
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    fn target(&self) -> Option<&str> {
        match self {
            Self::Show { target }
            | Self::Hide { target }
            | Self::SetText { target, .. }
            | Self::SetAttribute { target, .. }
            | Self::RemoveAttribute { target, .. } => Some(target),
            Self::Navigate { .. } => None,
        }
    }
}

/// Effects to run when an element matching `on_click` (or one of its
/// descendants) is clicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reaction {
    /// CSS selector of the clicked element or an ancestor of it
    pub on_click: String,
    /// Delay before the effects apply
    #[serde(default)]
    pub delay_ms: u64,
    /// Suppress link navigation for this click
    #[serde(default)]
    pub prevent_default: bool,
    /// Effects in application order
    pub effects: Vec<Effect>,
}

impl Reaction {
    /// Reaction with no effects yet
    #[must_use]
    pub fn on_click(selector: impl Into<String>) -> Self {
        Self {
            on_click: selector.into(),
            delay_ms: 0,
            prevent_default: false,
            effects: Vec::new(),
        }
    }

    /// Apply effects `delay_ms` after the click
    #[must_use]
    pub const fn after_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Suppress link navigation
    #[must_use]
    pub const fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// Append an effect
    #[must_use]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// One document of a site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SitePage {
    /// Document source
    pub html: String,
    /// Simulated load time
    #[serde(default)]
    pub load_ms: u64,
    /// Click reactions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,
}

/// Documents keyed by absolute URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    /// Pages by URL
    #[serde(default)]
    pub pages: BTreeMap<String, SitePage>,
}

impl Site {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a page
    #[must_use]
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            SitePage {
                html: html.into(),
                ..SitePage::default()
            },
        );
        self
    }

    /// Set a page's simulated load time; no-op for unknown pages
    #[must_use]
    pub fn load_time(mut self, url: &str, load_ms: u64) -> Self {
        if let Some(page) = self.pages.get_mut(url) {
            page.load_ms = load_ms;
        }
        self
    }

    /// Attach a reaction to a page; no-op for unknown pages
    #[must_use]
    pub fn reaction(mut self, url: &str, reaction: Reaction) -> Self {
        if let Some(page) = self.pages.get_mut(url) {
            page.reactions.push(reaction);
        }
        self
    }

    /// Parse and validate a YAML site definition
    pub fn from_yaml(yaml: &str) -> ReplayResult<Self> {
        let site: Self = serde_yaml_ng::from_str(yaml)?;
        site.validate()?;
        Ok(site)
    }

    /// Load a YAML site definition from disk
    pub fn load(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check URLs, documents and selectors
    pub fn validate(&self) -> ReplayResult<()> {
        for (key, page) in &self.pages {
            let url = Url::parse(key)
                .map_err(|e| ReplayError::site(format!("page URL '{key}' is invalid: {e}")))?;
            if url.cannot_be_a_base() {
                return Err(ReplayError::site(format!("page URL '{key}' is not hierarchical")));
            }
            Dom::parse(&page.html)
                .map_err(|e| ReplayError::site(format!("page '{key}': {e}")))?;
            for reaction in &page.reactions {
                check_selector(key, &reaction.on_click)?;
                for effect in &reaction.effects {
                    if let Some(target) = effect.target() {
                        check_selector(key, target)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_selector(page: &str, selector: &str) -> ReplayResult<()> {
    CssSelector::parse(selector)
        .map(|_| ())
        .map_err(|e| ReplayError::site(format!("page '{page}': {e}")))
}

/// Schemes a page can load; other hrefs (`javascript:`, `mailto:`) stay put
fn is_loadable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "file")
}

/// Key used to match a URL against site pages: fragment dropped
fn page_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

// =============================================================================
// MEMORY PAGE
// =============================================================================

#[derive(Debug, Clone)]
struct Scheduled {
    due: Duration,
    effects: Vec<Effect>,
}

/// [`Page`] implementation serving a [`Site`]
#[derive(Debug)]
pub struct MemoryPage {
    site: Site,
    index: BTreeMap<String, String>,
    clock: Arc<dyn Clock>,
    dom: Dom,
    url: Option<Url>,
    url_text: Option<String>,
    current: Option<String>,
    pending: Vec<Scheduled>,
    closed: bool,
}

impl MemoryPage {
    /// Serve `site`, reading time from `clock`
    pub fn new(site: Site, clock: Arc<dyn Clock>) -> ReplayResult<Self> {
        site.validate()?;
        let mut index = BTreeMap::new();
        for key in site.pages.keys() {
            let url = Url::parse(key)
                .map_err(|e| ReplayError::site(format!("page URL '{key}' is invalid: {e}")))?;
            index.insert(page_key(&url), key.clone());
        }
        Ok(Self {
            site,
            index,
            clock,
            dom: Dom::new(),
            url: None,
            url_text: None,
            current: None,
            pending: Vec::new(),
            closed: false,
        })
    }

    /// Site being served
    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    /// Number of reactions waiting for their delay
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.pending.len()
    }

    fn ensure_open(&self) -> ReplayResult<()> {
        if self.closed {
            Err(ReplayError::PageClosed)
        } else {
            Ok(())
        }
    }

    fn resolve_url(&self, raw: &str) -> ReplayResult<Url> {
        let parsed = match &self.url {
            Some(base) => base.join(raw),
            None => Url::parse(raw),
        };
        parsed.map_err(|e| ReplayError::navigation(raw, e.to_string()))
    }

    fn set_url(&mut self, url: Url) {
        self.url_text = Some(url.to_string());
        self.url = Some(url);
    }

    fn load(&mut self, url: Url, timeout: Duration) -> ReplayResult<()> {
        let key = page_key(&url);
        let Some(site_key) = self.index.get(&key).cloned() else {
            let origin_known = self.index.keys().any(|k| {
                Url::parse(k).is_ok_and(|known| known.origin() == url.origin())
            });
            let reason = if origin_known {
                "404 Not Found"
            } else {
                "connection refused"
            };
            return Err(ReplayError::navigation(url.as_str(), reason));
        };
        let Some(page) = self.site.pages.get(&site_key) else {
            return Err(ReplayError::navigation(url.as_str(), "404 Not Found"));
        };

        let load = Duration::from_millis(page.load_ms);
        if load > timeout {
            self.clock.sleep(timeout);
            return Err(ReplayError::navigation(
                url.as_str(),
                format!("load did not finish within {}ms", timeout.as_millis()),
            ));
        }
        self.clock.sleep(load);

        let dom = Dom::parse(&page.html)
            .map_err(|e| ReplayError::navigation(url.as_str(), e.to_string()))?;
        tracing::debug!(url = %url, load_ms = page.load_ms, "page loaded");
        self.dom = dom;
        self.pending.clear();
        self.current = Some(site_key);
        self.set_url(url);
        Ok(())
    }

    fn apply_due(&mut self) -> ReplayResult<()> {
        let now = self.clock.now();
        while let Some(pos) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| s.due)
            .map(|(i, _)| i)
        {
            let scheduled = self.pending.remove(pos);
            self.apply_effects(&scheduled.effects)?;
        }
        Ok(())
    }

    fn apply_effects(&mut self, effects: &[Effect]) -> ReplayResult<()> {
        for effect in effects {
            if let Effect::Navigate { url } = effect {
                let url = self.resolve_url(url)?;
                // Remaining effects belonged to the old document.
                return self.load(url, Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS));
            }
            let Some(target) = effect.target() else {
                continue;
            };
            let selector = CssSelector::parse(target)?;
            let targets: Vec<NodeId> = self
                .dom
                .descendants(self.dom.root())
                .into_iter()
                .filter(|id| selector.matches(&self.dom, *id))
                .collect();
            tracing::debug!(?effect, targets = targets.len(), "applying effect");
            for id in targets {
                self.apply_to(effect, id);
            }
        }
        Ok(())
    }

    fn apply_to(&mut self, effect: &Effect, id: NodeId) {
        let dom = &mut self.dom;
        match effect {
            Effect::Show { .. } => {
                dom.remove_attr(id, "hidden");
                if dom.tag(id) == Some("dialog") {
                    dom.set_attr(id, "open", "");
                }
                if dom.attr(id, "style").is_some_and(style_hides) {
                    dom.remove_attr(id, "style");
                }
            }
            Effect::Hide { .. } => {
                dom.set_attr(id, "hidden", "");
                if dom.tag(id) == Some("dialog") {
                    dom.remove_attr(id, "open");
                }
            }
            Effect::SetText { text, .. } => {
                dom.set_text(id, text.clone());
            }
            Effect::SetAttribute { name, value, .. } => {
                dom.set_attr(id, name, value.clone());
            }
            Effect::RemoveAttribute { name, .. } => {
                dom.remove_attr(id, name);
            }
            Effect::Navigate { .. } => {}
        }
    }

    fn follow_link(&mut self, href: &str) -> ReplayResult<()> {
        let target = self.resolve_url(href)?;
        if !is_loadable(&target) {
            tracing::debug!(url = %target, "link not followed");
            return Ok(());
        }
        let same_document = self
            .url
            .as_ref()
            .is_some_and(|current| page_key(current) == page_key(&target));
        if same_document && target.fragment().is_some() {
            tracing::debug!(url = %target, "fragment navigation");
            self.set_url(target);
            return Ok(());
        }
        self.load(target, Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS))
    }
}

impl Page for MemoryPage {
    fn navigate(&mut self, url: &str, timeout: Duration) -> ReplayResult<()> {
        self.ensure_open()?;
        let target = self.resolve_url(url)?;
        if !is_loadable(&target) {
            return Err(ReplayError::navigation(url, "unsupported scheme"));
        }
        self.load(target, timeout)
    }

    fn document(&mut self) -> ReplayResult<&Dom> {
        self.ensure_open()?;
        self.apply_due()?;
        Ok(&self.dom)
    }

    fn click(&mut self, node: NodeId) -> ReplayResult<()> {
        self.ensure_open()?;
        self.apply_due()?;
        if self.dom.element(node).is_none() || !self.dom.is_attached(node) {
            return Err(ReplayError::site(format!(
                "element {node} is not attached to the document"
            )));
        }

        let path: Vec<NodeId> = std::iter::once(node).chain(self.dom.ancestors(node)).collect();
        let href = path.iter().find_map(|id| {
            (self.dom.tag(*id) == Some("a") || self.dom.tag(*id) == Some("area"))
                .then(|| self.dom.attr(*id, "href"))
                .flatten()
                .map(str::to_string)
        });

        let reactions = self
            .current
            .as_ref()
            .and_then(|key| self.site.pages.get(key))
            .map(|page| page.reactions.clone())
            .unwrap_or_default();

        let now = self.clock.now();
        let mut prevent_default = false;
        let mut immediate = Vec::new();
        for reaction in reactions {
            let selector = CssSelector::parse(&reaction.on_click)?;
            if !path.iter().any(|id| selector.matches(&self.dom, *id)) {
                continue;
            }
            tracing::debug!(on_click = %reaction.on_click, delay_ms = reaction.delay_ms, "reaction triggered");
            prevent_default |= reaction.prevent_default;
            if reaction.delay_ms == 0 {
                immediate.extend(reaction.effects);
            } else {
                self.pending.push(Scheduled {
                    due: now + Duration::from_millis(reaction.delay_ms),
                    effects: reaction.effects,
                });
            }
        }

        self.apply_effects(&immediate)?;
        match href {
            Some(href) if !prevent_default && !immediate.iter().any(|e| matches!(e, Effect::Navigate { .. })) => {
                self.follow_link(&href)
            }
            _ => Ok(()),
        }
    }

    fn fill(&mut self, node: NodeId, text: &str) -> ReplayResult<()> {
        self.ensure_open()?;
        self.apply_due()?;
        if !self.dom.is_editable(node) {
            return Err(ReplayError::site(format!("element {node} is not editable")));
        }
        self.dom.set_value(node, text);
        Ok(())
    }

    fn input_value(&mut self, node: NodeId) -> ReplayResult<String> {
        self.ensure_open()?;
        self.dom
            .input_value(node)
            .ok_or_else(|| ReplayError::site(format!("element {node} has no value")))
    }

    fn current_url(&self) -> Option<&str> {
        self.url_text.as_deref()
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wait::ManualClock;

    const HOME: &str = "http://localhost:8000/";
    const VENUE: &str = "http://localhost:8000/venue";

    fn site() -> Site {
        Site::new()
            .page(HOME, r##"<a id="venue" href="/venue">Venue</a><a id="top" href="#top">Top</a>"##)
            .page(
                VENUE,
                r#"<button id="go">Go</button><form id="f" hidden><input id="q"></form><dialog id="d"></dialog>"#,
            )
            .load_time(VENUE, 100)
            .reaction(VENUE, Reaction::on_click("#go").effect(Effect::show("#f")))
            .reaction(
                VENUE,
                Reaction::on_click("#go")
                    .after_ms(300)
                    .effect(Effect::set_text("#d", "done"))
                    .effect(Effect::show("#d")),
            )
    }

    fn page() -> (MemoryPage, ManualClock) {
        let clock = ManualClock::new();
        let page = MemoryPage::new(site(), Arc::new(clock.clone())).unwrap();
        (page, clock)
    }

    fn by_id(page: &mut MemoryPage, id: &str) -> NodeId {
        page.document().unwrap().element_by_id(id).unwrap()
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_navigate_loads_document() {
            let (mut page, _) = page();
            page.navigate(HOME, Duration::from_secs(30)).unwrap();
            assert_eq!(page.current_url(), Some(HOME));
            assert!(page.document().unwrap().element_by_id("venue").is_some());
        }

        #[test]
        fn test_unknown_path_and_origin() {
            let (mut page, _) = page();
            let err = page
                .navigate("http://localhost:8000/missing", Duration::from_secs(1))
                .unwrap_err();
            assert!(err.to_string().contains("404"));
            let err = page
                .navigate("http://localhost:9999/", Duration::from_secs(1))
                .unwrap_err();
            assert!(err.to_string().contains("connection refused"));
        }

        #[test]
        fn test_load_time_advances_clock_and_times_out() {
            let (mut page, clock) = page();
            page.navigate(VENUE, Duration::from_secs(1)).unwrap();
            assert_eq!(clock.now_ms(), 100);
            let err = page.navigate(VENUE, Duration::from_millis(50)).unwrap_err();
            assert!(matches!(err, ReplayError::Navigation { .. }));
            assert_eq!(clock.now_ms(), 150);
        }

        #[test]
        fn test_relative_without_base_fails() {
            let (mut page, _) = page();
            assert!(matches!(
                page.navigate("/venue", Duration::from_secs(1)),
                Err(ReplayError::Navigation { .. })
            ));
        }

        #[test]
        fn test_link_click_navigates_relative() {
            let (mut page, _) = page();
            page.navigate(HOME, Duration::from_secs(1)).unwrap();
            let link = by_id(&mut page, "venue");
            page.click(link).unwrap();
            assert_eq!(page.current_url(), Some(VENUE));
        }

        #[test]
        fn test_fragment_link_keeps_document() {
            let (mut page, _) = page();
            page.navigate(HOME, Duration::from_secs(1)).unwrap();
            let top = by_id(&mut page, "top");
            page.click(top).unwrap();
            assert_eq!(page.current_url(), Some("http://localhost:8000/#top"));
            assert_eq!(by_id(&mut page, "top"), top);
        }

        #[test]
        fn test_javascript_link_runs_reactions_in_place() {
            let site = Site::new()
                .page(
                    HOME,
                    r#"<a href="javascript:void(0)" id="open">Open</a><a href="mailto:a@b.nl" id="mail">Mail</a><dialog id="d">hello</dialog>"#,
                )
                .reaction(HOME, Reaction::on_click("#open").effect(Effect::show("#d")));
            let mut page = MemoryPage::new(site, Arc::new(ManualClock::new())).unwrap();
            page.navigate(HOME, Duration::from_secs(1)).unwrap();

            let open = by_id(&mut page, "open");
            page.click(open).unwrap();
            assert_eq!(page.current_url(), Some(HOME));
            let dialog = by_id(&mut page, "d");
            assert!(page.document().unwrap().is_visible(dialog));

            let mail = by_id(&mut page, "mail");
            page.click(mail).unwrap();
            assert_eq!(page.current_url(), Some(HOME));
        }
    }

    mod reaction_tests {
        use super::*;

        #[test]
        fn test_immediate_and_delayed_effects() {
            let (mut page, clock) = page();
            page.navigate(VENUE, Duration::from_secs(1)).unwrap();
            let go = by_id(&mut page, "go");
            page.click(go).unwrap();

            let form = by_id(&mut page, "f");
            let dialog = by_id(&mut page, "d");
            assert!(page.document().unwrap().is_visible(form));
            assert!(!page.document().unwrap().is_visible(dialog));
            assert_eq!(page.pending_effects(), 1);

            clock.advance(Duration::from_millis(299));
            assert!(!page.document().unwrap().is_visible(dialog));
            clock.advance(Duration::from_millis(1));
            let dom = page.document().unwrap();
            assert!(dom.is_visible(dialog));
            assert_eq!(dom.rendered_text(dialog), "done");
        }

        #[test]
        fn test_show_clears_hiding_style_in_any_case() {
            let site = Site::new()
                .page(
                    HOME,
                    r#"<button id="go">Go</button><p id="m" style="DISPLAY: None">ok</p>"#,
                )
                .reaction(HOME, Reaction::on_click("#go").effect(Effect::show("#m")));
            let mut page = MemoryPage::new(site, Arc::new(ManualClock::new())).unwrap();
            page.navigate(HOME, Duration::from_secs(1)).unwrap();
            let m = by_id(&mut page, "m");
            assert!(!page.document().unwrap().is_visible(m));

            let go = by_id(&mut page, "go");
            page.click(go).unwrap();
            let dom = page.document().unwrap();
            assert!(dom.is_visible(m));
            assert_eq!(dom.rendered_text(m), "ok");
        }

        #[test]
        fn test_fill_then_read_back() {
            let (mut page, _) = page();
            page.navigate(VENUE, Duration::from_secs(1)).unwrap();
            let q = by_id(&mut page, "q");
            page.fill(q, "pieter@hotmail.com").unwrap();
            assert_eq!(page.input_value(q).unwrap(), "pieter@hotmail.com");
            let go = by_id(&mut page, "go");
            assert!(page.fill(go, "x").is_err());
        }

        #[test]
        fn test_navigation_drops_pending_effects() {
            let (mut page, _) = page();
            page.navigate(VENUE, Duration::from_secs(1)).unwrap();
            let go = by_id(&mut page, "go");
            page.click(go).unwrap();
            page.navigate(HOME, Duration::from_secs(1)).unwrap();
            assert_eq!(page.pending_effects(), 0);
        }

        #[test]
        fn test_closed_page_rejects_calls() {
            let (mut page, _) = page();
            page.close();
            assert!(page.is_closed());
            assert!(matches!(page.document(), Err(ReplayError::PageClosed)));
            assert!(matches!(
                page.navigate(HOME, Duration::from_secs(1)),
                Err(ReplayError::PageClosed)
            ));
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_site_from_yaml() {
            let yaml = r##"
pages:
  "http://localhost:8000/":
    html: <button id="go">Go</button><p id="out" hidden></p>
    reactions:
      - on_click: "#go"
        delay_ms: 50
        effects:
          - { type: set_text, target: "#out", text: hi }
          - { type: show, target: "#out" }
          - { type: set_attribute, target: "#go", name: disabled }
"##;
            let site = Site::from_yaml(yaml).unwrap();
            let page = &site.pages["http://localhost:8000/"];
            assert_eq!(page.reactions[0].delay_ms, 50);
            assert_eq!(
                page.reactions[0].effects[2],
                Effect::set_attribute("#go", "disabled", "")
            );
        }

        #[test]
        fn test_invalid_selector_rejected() {
            let yaml = r#"
pages:
  "http://localhost:8000/":
    html: <p>x</p>
    reactions:
      - on_click: "p:hover"
        effects: []
"#;
            assert!(matches!(Site::from_yaml(yaml), Err(ReplayError::Site { .. })));
        }

        #[test]
        fn test_invalid_url_rejected() {
            let yaml = "pages:\n  \"/relative\":\n    html: <p>x</p>\n";
            assert!(matches!(Site::from_yaml(yaml), Err(ReplayError::Site { .. })));
        }

        #[test]
        fn test_unknown_effect_rejected() {
            let yaml = r#"
pages:
  "http://localhost:8000/":
    html: <p>x</p>
    reactions:
      - on_click: "p"
        effects:
          - { type: explode, target: "p" }
"#;
            assert!(matches!(Site::from_yaml(yaml), Err(ReplayError::Yaml(_))));
        }

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("site.yaml");
            std::fs::write(&path, "pages:\n  \"http://a.test/\":\n    html: <p>x</p>\n").unwrap();
            let site = Site::load(&path).unwrap();
            assert!(site.pages.contains_key("http://a.test/"));
        }
    }
}
