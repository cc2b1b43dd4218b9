//! Locator expressions.
//!
//! A [`Locator`] is an immutable description of how to find elements: a
//! selector, optional filters, an optional pick, and an optional parent
//! locator that scopes the search. Chaining builds a new value; nothing is
//! resolved until [`crate::resolve::resolve`] evaluates it against a
//! document snapshot.
//!
//! ```
//! use rehearse::{AriaRole, Locator};
//!
//! let amount = Locator::role(AriaRole::Listitem)
//!     .has_text("Gastronomisch buffet")
//!     .locator("#amount")
//!     .unwrap();
//! assert_eq!(
//!     amount.to_string(),
//!     "get_by_role(\"listitem\").filter(has_text=\"Gastronomisch buffet\").locator(\"#amount\")"
//! );
//! ```

use crate::css::CssSelector;
use crate::dom::normalize_whitespace;
use crate::result::ReplayResult;
use crate::role::AriaRole;
use std::fmt;

// =============================================================================
// TEXT MATCHING
// =============================================================================

/// Text criterion used by names, text selectors and `has_text` filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    /// Expected text as written
    pub text: String,
    /// Full case-sensitive match instead of case-insensitive substring
    pub exact: bool,
}

impl TextMatch {
    /// Case-insensitive substring match
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: false,
        }
    }

    /// Exact match
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: true,
        }
    }

    /// Whether `candidate` satisfies this criterion.
    ///
    /// Both sides are whitespace-normalized first.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let wanted = normalize_whitespace(&self.text);
        let candidate = normalize_whitespace(candidate);
        if self.exact {
            candidate == wanted
        } else {
            candidate.to_lowercase().contains(&wanted.to_lowercase())
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text)?;
        if self.exact {
            write!(f, ", exact=true")?;
        }
        Ok(())
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

/// What a locator matches before filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// ARIA role, optionally constrained by accessible name
    Role {
        /// Role to match
        role: AriaRole,
        /// Accessible name criterion
        name: Option<TextMatch>,
    },
    /// Structural CSS selector
    Css(CssSelector),
    /// `id` attribute
    Id(String),
    /// Innermost element whose rendered text matches
    Text(TextMatch),
    /// Form control whose label matches
    Label(TextMatch),
    /// Element whose `placeholder` matches
    Placeholder(TextMatch),
    /// `data-testid` attribute
    TestId(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role { role, name: None } => write!(f, "get_by_role({:?})", role.as_str()),
            Self::Role {
                role,
                name: Some(name),
            } => {
                write!(f, "get_by_role({:?}, name={name})", role.as_str())
            }
            Self::Css(css) => write!(f, "locator({:?})", css.as_str()),
            Self::Id(id) => write!(f, "locator(\"#{id}\")"),
            Self::Text(text) => write!(f, "get_by_text({text})"),
            Self::Label(text) => write!(f, "get_by_label({text})"),
            Self::Placeholder(text) => write!(f, "get_by_placeholder({text})"),
            Self::TestId(id) => write!(f, "get_by_test_id({id:?})"),
        }
    }
}

/// Narrowing applied to selector matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Rendered text contains the given text
    HasText(TextMatch),
    /// Has a descendant matching the locator
    Has(Box<Locator>),
}

/// Which candidate to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Index 0 in resolution order
    First,
    /// Last in resolution order
    Last,
    /// Zero-based index in resolution order
    Nth(usize),
}

impl Pick {
    /// Apply to a candidate list
    #[must_use]
    pub fn apply<T: Copy>(self, candidates: &[T]) -> Option<T> {
        match self {
            Self::First => candidates.first().copied(),
            Self::Last => candidates.last().copied(),
            Self::Nth(i) => candidates.get(i).copied(),
        }
    }
}

// =============================================================================
// LOCATOR
// =============================================================================

/// Composable, immutable element locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    scope: Option<Box<Locator>>,
    selector: Selector,
    filters: Vec<Filter>,
    pick: Option<Pick>,
}

impl Locator {
    /// Locator for a selector
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            scope: None,
            selector,
            filters: Vec::new(),
            pick: None,
        }
    }

    /// Match by ARIA role
    #[must_use]
    pub const fn role(role: AriaRole) -> Self {
        Self::new(Selector::Role { role, name: None })
    }

    /// Match by CSS selector
    pub fn css(selector: &str) -> ReplayResult<Self> {
        Ok(Self::new(Selector::Css(CssSelector::parse(selector)?)))
    }

    /// Match by `id` attribute
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Selector::Id(id.into()))
    }

    /// Match by rendered text (case-insensitive substring)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text(TextMatch::new(text)))
    }

    /// Match form controls by label text
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::new(Selector::Label(TextMatch::new(text)))
    }

    /// Match by `placeholder` attribute
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(Selector::Placeholder(TextMatch::new(text)))
    }

    /// Match by `data-testid` attribute
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::new(Selector::TestId(id.into()))
    }

    /// Constrain a role selector by accessible name.
    ///
    /// Has no effect on other selectors.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Selector::Role { name: slot, .. } = &mut self.selector {
            *slot = Some(TextMatch::new(name));
        }
        self
    }

    /// Make the selector's text criterion exact
    #[must_use]
    pub fn exact(mut self) -> Self {
        match &mut self.selector {
            Selector::Role {
                name: Some(name), ..
            }
            | Selector::Text(name)
            | Selector::Label(name)
            | Selector::Placeholder(name) => name.exact = true,
            _ => {}
        }
        self
    }

    /// Keep candidates whose rendered text contains `text`
    #[must_use]
    pub fn has_text(self, text: impl Into<String>) -> Self {
        self.filter(Filter::HasText(TextMatch::new(text)))
    }

    /// Keep candidates that contain an element matching `inner`
    #[must_use]
    pub fn has(self, inner: Self) -> Self {
        self.filter(Filter::Has(Box::new(inner)))
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Search by CSS inside the current matches
    pub fn locator(self, selector: &str) -> ReplayResult<Self> {
        Ok(Self::css(selector)?.within(self))
    }

    /// Search by role inside the current matches
    #[must_use]
    pub fn get_by_role(self, role: AriaRole) -> Self {
        Self::role(role).within(self)
    }

    /// Search by text inside the current matches
    #[must_use]
    pub fn get_by_text(self, text: impl Into<String>) -> Self {
        Self::text(text).within(self)
    }

    /// Chain any locator inside the current matches
    #[must_use]
    pub fn chain(self, inner: Self) -> Self {
        inner.within(self)
    }

    /// Scope this locator under `parent`.
    ///
    /// If this locator is already scoped, `parent` scopes its outermost
    /// ancestor instead.
    #[must_use]
    pub fn within(mut self, parent: Self) -> Self {
        self.scope = Some(Box::new(match self.scope.take() {
            Some(existing) => (*existing).within(parent),
            None => parent,
        }));
        self
    }

    /// Keep the first candidate
    #[must_use]
    pub const fn first(mut self) -> Self {
        self.pick = Some(Pick::First);
        self
    }

    /// Keep the last candidate
    #[must_use]
    pub const fn last(mut self) -> Self {
        self.pick = Some(Pick::Last);
        self
    }

    /// Keep the candidate at `index`
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.pick = Some(Pick::Nth(index));
        self
    }

    /// Parent locator
    #[must_use]
    pub fn scope(&self) -> Option<&Self> {
        self.scope.as_deref()
    }

    /// Selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Filters in application order
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Pick, if any
    #[must_use]
    pub const fn pick(&self) -> Option<Pick> {
        self.pick
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope}.")?;
        }
        write!(f, "{}", self.selector)?;
        for filter in &self.filters {
            match filter {
                Filter::HasText(text) => write!(f, ".filter(has_text={text})")?,
                Filter::Has(inner) => write!(f, ".filter(has={inner})")?,
            }
        }
        match self.pick {
            Some(Pick::First) => write!(f, ".first()"),
            Some(Pick::Last) => write!(f, ".last()"),
            Some(Pick::Nth(i)) => write!(f, ".nth({i})"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_substring_is_case_insensitive_and_normalized() {
            let m = TextMatch::new("gastronomisch  BUFFET");
            assert!(m.matches("name Gastronomisch buffet op aanvraag"));
            assert!(m.matches("  Gastronomisch\n buffet "));
            assert!(!m.matches("Gastronomisch"));
        }

        #[test]
        fn test_exact_is_full_and_case_sensitive() {
            let m = TextMatch::exact("Waerboom");
            assert!(m.matches("  Waerboom "));
            assert!(!m.matches("waerboom"));
            assert!(!m.matches("Waerboom bar"));
        }

        #[test]
        fn test_empty_substring_matches_anything() {
            assert!(TextMatch::new("").matches("whatever"));
            assert!(TextMatch::new("").matches(""));
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builders_do_not_mutate_original() {
            let base = Locator::role(AriaRole::Link);
            let named = base.clone().with_name("Waerboom");
            assert_eq!(base.selector(), &Selector::Role {
                role: AriaRole::Link,
                name: None
            });
            assert_ne!(base, named);
        }

        #[test]
        fn test_exact_applies_to_name() {
            let locator = Locator::role(AriaRole::Button).with_name("Go").exact();
            match locator.selector() {
                Selector::Role { name: Some(name), .. } => assert!(name.exact),
                other => panic!("unexpected selector {other:?}"),
            }
        }

        #[test]
        fn test_with_name_ignored_for_css() {
            let locator = Locator::css("#x").unwrap().with_name("ignored");
            assert_eq!(locator.to_string(), "locator(\"#x\")");
        }

        #[test]
        fn test_chaining_nests_scope() {
            let locator = Locator::role(AriaRole::Link)
                .with_name("name Gastronomisch buffet op")
                .get_by_role(AriaRole::Button);
            let scope = locator.scope().unwrap();
            assert_eq!(
                scope.selector(),
                &Selector::Role {
                    role: AriaRole::Link,
                    name: Some(TextMatch::new("name Gastronomisch buffet op"))
                }
            );
            assert!(scope.scope().is_none());
        }

        #[test]
        fn test_within_scopes_outermost() {
            let inner = Locator::id("amount").within(Locator::role(AriaRole::Listitem));
            let scoped = inner.within(Locator::css("form").unwrap());
            assert_eq!(
                scoped.to_string(),
                "locator(\"form\").get_by_role(\"listitem\").locator(\"#amount\")"
            );
        }

        #[test]
        fn test_invalid_css_is_error() {
            assert!(Locator::css("a:hover").is_err());
            assert!(Locator::role(AriaRole::List).locator("").is_err());
        }

        #[test]
        fn test_pick_apply() {
            let items = [1, 2, 3];
            assert_eq!(Pick::First.apply(&items), Some(1));
            assert_eq!(Pick::Last.apply(&items), Some(3));
            assert_eq!(Pick::Nth(1).apply(&items), Some(2));
            assert_eq!(Pick::Nth(9).apply(&items), None);
            assert_eq!(Pick::First.apply::<u8>(&[]), None);
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_display_role_with_name() {
            let locator = Locator::role(AriaRole::Link).with_name("Waerboom");
            assert_eq!(locator.to_string(), "get_by_role(\"link\", name=\"Waerboom\")");
        }

        #[test]
        fn test_display_pick_and_filters() {
            let locator = Locator::css(".mt-3 > .p-4").unwrap().first();
            assert_eq!(locator.to_string(), "locator(\".mt-3 > .p-4\").first()");
            let locator = Locator::text("Book").exact().nth(2);
            assert_eq!(locator.to_string(), "get_by_text(\"Book\", exact=true).nth(2)");
        }
    }
}
