//! Steps and scripts.
//!
//! A [`Script`] is a static, ordered list of [`Step`]s. `Locate` sets the
//! target for the `Act` and `Assert` steps that follow it. Scripts can be
//! built in code, loaded from YAML records, or imported from a codegen
//! `.spec.ts` file.
//!
//! YAML records fold a locate into the action that uses it:
//!
//! ```yaml
//! name: reservation
//! steps:
//!   - action: navigate
//!     url: http://localhost:8000/
//!   - action: click
//!     locator: { role: link, name: Waerboom }
//!   - action: fill
//!     locator: { within: { role: listitem, has_text: "buffet" }, id: amount }
//!     value: "3"
//!   - action: contains_text
//!     locator: { role: dialog }
//!     value: reservation requested
//!     timeout_ms: 2000
//! ```

use crate::locator::{Filter, Locator, Pick, Selector, TextMatch};
use crate::result::{ReplayError, ReplayResult};
use crate::role::AriaRole;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

// =============================================================================
// STEP MODEL
// =============================================================================

/// Action performed on the current target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Click the element
    Click,
    /// Replace the element's value
    Fill {
        /// Text to enter, verbatim
        value: String,
    },
}

/// Condition polled on the current target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// Rendered text contains `expected`
    ContainsText {
        /// Expected substring
        expected: String,
    },
}

/// One unit of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Load a URL
    Navigate {
        /// Destination, absolute or relative to the current page
        url: String,
        /// Navigation timeout override
        timeout_ms: Option<u64>,
    },
    /// Set the target for following steps
    Locate {
        /// Target locator
        locator: Locator,
    },
    /// Act on the target
    Act {
        /// What to do
        action: Action,
        /// Actionability timeout override
        timeout_ms: Option<u64>,
    },
    /// Assert on the target
    Assert {
        /// What must hold
        assertion: Assertion,
        /// Assertion timeout override
        timeout_ms: Option<u64>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate { url, .. } => write!(f, "navigate {url}"),
            Self::Locate { locator } => write!(f, "locate {locator}"),
            Self::Act {
                action: Action::Click,
                ..
            } => write!(f, "click"),
            Self::Act {
                action: Action::Fill { value },
                ..
            } => write!(f, "fill {value:?}"),
            Self::Assert {
                assertion: Assertion::ContainsText { expected },
                ..
            } => write!(f, "expect to contain text {expected:?}"),
        }
    }
}

impl Step {
    /// Timeout override, if the step carries one
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        match self {
            Self::Navigate { timeout_ms, .. }
            | Self::Act { timeout_ms, .. }
            | Self::Assert { timeout_ms, .. } => *timeout_ms,
            Self::Locate { .. } => None,
        }
    }

    const fn needs_target(&self) -> bool {
        matches!(self, Self::Act { .. } | Self::Assert { .. })
    }
}

// =============================================================================
// SCRIPT
// =============================================================================

/// An ordered step sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// Display name
    pub name: Option<String>,
    /// Steps in execution order
    pub steps: Vec<Step>,
}

impl Script {
    /// Empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a raw step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append `Navigate`
    #[must_use]
    pub fn navigate(self, url: impl Into<String>) -> Self {
        self.step(Step::Navigate {
            url: url.into(),
            timeout_ms: None,
        })
    }

    /// Append `Locate`
    #[must_use]
    pub fn locate(self, locator: Locator) -> Self {
        self.step(Step::Locate { locator })
    }

    /// Append `Locate` + click
    #[must_use]
    pub fn click(self, locator: Locator) -> Self {
        self.locate(locator).step(Step::Act {
            action: Action::Click,
            timeout_ms: None,
        })
    }

    /// Append `Locate` + fill
    #[must_use]
    pub fn fill(self, locator: Locator, value: impl Into<String>) -> Self {
        self.locate(locator).step(Step::Act {
            action: Action::Fill {
                value: value.into(),
            },
            timeout_ms: None,
        })
    }

    /// Append `Locate` + contains-text assertion
    #[must_use]
    pub fn expect_contains_text(self, locator: Locator, expected: impl Into<String>) -> Self {
        self.locate(locator).step(Step::Assert {
            assertion: Assertion::ContainsText {
                expected: expected.into(),
            },
            timeout_ms: None,
        })
    }

    /// Override the timeout of the last step that carries one
    #[must_use]
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        if let Some(
            Step::Navigate { timeout_ms, .. }
            | Step::Act { timeout_ms, .. }
            | Step::Assert { timeout_ms, .. },
        ) = self.steps.last_mut()
        {
            *timeout_ms = Some(ms);
        }
        self
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reject scripts that cannot run: an action or assertion with no
    /// preceding `Locate`, or an empty navigation URL
    pub fn validate(&self) -> ReplayResult<()> {
        let mut located = false;
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Navigate { url, .. } if url.trim().is_empty() => {
                    return Err(ReplayError::script(format!(
                        "step {}: navigate needs a URL",
                        index + 1
                    )));
                }
                Step::Locate { .. } => located = true,
                _ if step.needs_target() && !located => {
                    return Err(ReplayError::script(format!(
                        "step {} ({step}) has no target; add a locate step before it",
                        index + 1
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse YAML records
    pub fn from_yaml(yaml: &str) -> ReplayResult<Self> {
        let file: ScriptFile = serde_yaml_ng::from_str(yaml)?;
        file.into_script()
    }

    /// Render as YAML records
    pub fn to_yaml(&self) -> ReplayResult<String> {
        Ok(serde_yaml_ng::to_string(&ScriptFile::from_script(self))?)
    }

    /// Load a script, choosing the format by extension
    /// (`.yaml`/`.yml` records, `.ts`/`.js` codegen)
    pub fn load(path: impl AsRef<Path>) -> ReplayResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let script = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            Some("ts" | "js" | "mjs" | "cjs") => crate::codegen::import(&text)?,
            _ => {
                return Err(ReplayError::script(format!(
                    "unrecognised script extension: {}",
                    path.display()
                )))
            }
        };
        Ok(match script.name {
            Some(_) => script,
            None => {
                let stem = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.split('.').next().unwrap_or(n).to_string());
                Self { name: stem, ..script }
            }
        })
    }
}

// =============================================================================
// YAML RECORDS
// =============================================================================

/// Record action names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordAction {
    /// `Navigate`
    Navigate,
    /// `Locate` only
    Locate,
    /// click
    Click,
    /// fill
    Fill,
    /// contains-text assertion
    #[serde(alias = "expect_contains_text", alias = "to_contain_text")]
    ContainsText,
}

/// One YAML record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepRecord {
    /// What to do
    pub action: RecordAction,
    /// Navigation target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Target; omitted to reuse the previous target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<LocatorSpec>,
    /// Fill text or expected text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Timeout override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    steps: Vec<StepRecord>,
}

impl ScriptFile {
    fn into_script(self) -> ReplayResult<Script> {
        let mut script = Script {
            name: self.name,
            steps: Vec::new(),
        };
        for (index, record) in self.steps.into_iter().enumerate() {
            let at = |message: String| ReplayError::script(format!("step {}: {message}", index + 1));
            if let Some(spec) = &record.locator {
                let locator = spec.to_locator().map_err(|e| at(e.to_string()))?;
                script.steps.push(Step::Locate { locator });
            }
            let timeout_ms = record.timeout_ms;
            let step = match record.action {
                RecordAction::Navigate => {
                    if record.locator.is_some() {
                        return Err(at("navigate does not take a locator".to_string()));
                    }
                    let url = record
                        .url
                        .ok_or_else(|| at("navigate needs a url".to_string()))?;
                    Some(Step::Navigate { url, timeout_ms })
                }
                RecordAction::Locate => {
                    if record.locator.is_none() {
                        return Err(at("locate needs a locator".to_string()));
                    }
                    None
                }
                RecordAction::Click => Some(Step::Act {
                    action: Action::Click,
                    timeout_ms,
                }),
                RecordAction::Fill => {
                    let value = record
                        .value
                        .ok_or_else(|| at("fill needs a value".to_string()))?;
                    Some(Step::Act {
                        action: Action::Fill { value },
                        timeout_ms,
                    })
                }
                RecordAction::ContainsText => {
                    let expected = record
                        .value
                        .ok_or_else(|| at("contains_text needs a value".to_string()))?;
                    Some(Step::Assert {
                        assertion: Assertion::ContainsText { expected },
                        timeout_ms,
                    })
                }
            };
            script.steps.extend(step);
        }
        script.validate()?;
        Ok(script)
    }

    fn from_script(script: &Script) -> Self {
        let mut records = Vec::new();
        let mut pending: Option<LocatorSpec> = None;

        let flush = |pending: &mut Option<LocatorSpec>, records: &mut Vec<StepRecord>| {
            if let Some(locator) = pending.take() {
                records.push(StepRecord {
                    action: RecordAction::Locate,
                    url: None,
                    locator: Some(locator),
                    value: None,
                    timeout_ms: None,
                });
            }
        };

        for step in &script.steps {
            match step {
                Step::Navigate { url, timeout_ms } => {
                    flush(&mut pending, &mut records);
                    records.push(StepRecord {
                        action: RecordAction::Navigate,
                        url: Some(url.clone()),
                        locator: None,
                        value: None,
                        timeout_ms: *timeout_ms,
                    });
                }
                Step::Locate { locator } => {
                    flush(&mut pending, &mut records);
                    pending = Some(LocatorSpec::from_locator(locator));
                }
                Step::Act { action, timeout_ms } => {
                    let (action, value) = match action {
                        Action::Click => (RecordAction::Click, None),
                        Action::Fill { value } => (RecordAction::Fill, Some(value.clone())),
                    };
                    records.push(StepRecord {
                        action,
                        url: None,
                        locator: pending.take(),
                        value,
                        timeout_ms: *timeout_ms,
                    });
                }
                Step::Assert {
                    assertion: Assertion::ContainsText { expected },
                    timeout_ms,
                } => records.push(StepRecord {
                    action: RecordAction::ContainsText,
                    url: None,
                    locator: pending.take(),
                    value: Some(expected.clone()),
                    timeout_ms: *timeout_ms,
                }),
            }
        }
        flush(&mut pending, &mut records);

        Self {
            name: script.name.clone(),
            steps: records,
        }
    }
}

/// Pick keyword in a locator record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickSpec {
    /// `.first()`
    First,
    /// `.last()`
    Last,
}

/// Serializable locator description.
///
/// Exactly one of `role`, `css`, `id`, `text`, `label`, `placeholder`,
/// `test_id` selects; the other fields refine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorSpec {
    /// Parent locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<Box<LocatorSpec>>,
    /// ARIA role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Accessible name (role selectors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// CSS selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    /// `id` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Rendered text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Label text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Placeholder text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// `data-testid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    /// Exact name/text match
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exact: bool,
    /// `has_text` filters, one string or a list
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub has_text: Vec<String>,
    /// `has` filters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has: Vec<LocatorSpec>,
    /// `first` / `last`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<PickSpec>,
    /// Zero-based index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(one) => vec![one],
        OneOrMany::Many(many) => many,
    })
}

impl LocatorSpec {
    /// Build the locator this record describes
    pub fn to_locator(&self) -> ReplayResult<Locator> {
        let text = |t: &String| {
            if self.exact {
                TextMatch::exact(t.clone())
            } else {
                TextMatch::new(t.clone())
            }
        };

        let mut selectors = Vec::new();
        if let Some(role) = &self.role {
            let role: AriaRole = role.parse()?;
            selectors.push(Selector::Role {
                role,
                name: self.name.as_ref().map(text),
            });
        }
        if let Some(css) = &self.css {
            selectors.push(Selector::Css(crate::css::CssSelector::parse(css)?));
        }
        if let Some(id) = &self.id {
            selectors.push(Selector::Id(id.clone()));
        }
        if let Some(t) = &self.text {
            selectors.push(Selector::Text(text(t)));
        }
        if let Some(t) = &self.label {
            selectors.push(Selector::Label(text(t)));
        }
        if let Some(t) = &self.placeholder {
            selectors.push(Selector::Placeholder(text(t)));
        }
        if let Some(id) = &self.test_id {
            selectors.push(Selector::TestId(id.clone()));
        }

        if selectors.len() != 1 {
            return Err(ReplayError::script(
                "locator needs exactly one of role, css, id, text, label, placeholder, test_id",
            ));
        }
        if self.name.is_some() && self.role.is_none() {
            return Err(ReplayError::script("name is only valid with role"));
        }
        if self.pick.is_some() && self.nth.is_some() {
            return Err(ReplayError::script("use either pick or nth, not both"));
        }

        let mut locator = Locator::new(selectors.remove(0));
        for t in &self.has_text {
            locator = locator.filter(Filter::HasText(TextMatch::new(t.clone())));
        }
        for inner in &self.has {
            locator = locator.has(inner.to_locator()?);
        }
        locator = match (self.pick, self.nth) {
            (Some(PickSpec::First), _) => locator.first(),
            (Some(PickSpec::Last), _) => locator.last(),
            (None, Some(i)) => locator.nth(i),
            (None, None) => locator,
        };
        if let Some(parent) = &self.within {
            locator = locator.within(parent.to_locator()?);
        }
        Ok(locator)
    }

    /// Describe an existing locator
    #[must_use]
    pub fn from_locator(locator: &Locator) -> Self {
        let mut spec = Self {
            within: locator.scope().map(|s| Box::new(Self::from_locator(s))),
            ..Self::default()
        };
        match locator.selector() {
            Selector::Role { role, name } => {
                spec.role = Some(role.as_str().to_string());
                if let Some(name) = name {
                    spec.name = Some(name.text.clone());
                    spec.exact = name.exact;
                }
            }
            Selector::Css(css) => spec.css = Some(css.as_str().to_string()),
            Selector::Id(id) => spec.id = Some(id.clone()),
            Selector::Text(t) => {
                spec.text = Some(t.text.clone());
                spec.exact = t.exact;
            }
            Selector::Label(t) => {
                spec.label = Some(t.text.clone());
                spec.exact = t.exact;
            }
            Selector::Placeholder(t) => {
                spec.placeholder = Some(t.text.clone());
                spec.exact = t.exact;
            }
            Selector::TestId(id) => spec.test_id = Some(id.clone()),
        }
        for filter in locator.filters() {
            match filter {
                Filter::HasText(t) => spec.has_text.push(t.text.clone()),
                Filter::Has(inner) => spec.has.push(Self::from_locator(inner)),
            }
        }
        match locator.pick() {
            Some(Pick::First) => spec.pick = Some(PickSpec::First),
            Some(Pick::Last) => spec.pick = Some(PickSpec::Last),
            Some(Pick::Nth(i)) => spec.nth = Some(i),
            None => {}
        }
        spec
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reservation() -> Script {
        Script::new()
            .named("reservation")
            .navigate("http://localhost:8000/")
            .click(Locator::role(AriaRole::Link).with_name("Waerboom"))
            .fill(
                Locator::role(AriaRole::Listitem)
                    .has_text("Gastronomisch buffet")
                    .locator("#amount")
                    .unwrap(),
                "3",
            )
            .expect_contains_text(Locator::role(AriaRole::Dialog), "reservation requested")
            .timeout_ms(2000)
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder_expands_locate_pairs() {
            let script = reservation();
            assert_eq!(script.len(), 7);
            assert!(matches!(script.steps[1], Step::Locate { .. }));
            assert!(matches!(
                script.steps[2],
                Step::Act {
                    action: Action::Click,
                    ..
                }
            ));
            assert_eq!(script.steps[6].timeout_ms(), Some(2000));
            script.validate().unwrap();
        }

        #[test]
        fn test_empty_script_is_valid() {
            assert!(Script::new().validate().is_ok());
            assert!(Script::new().is_empty());
        }

        #[test]
        fn test_act_without_locate_rejected() {
            let script = Script::new().navigate("http://x.test/").step(Step::Act {
                action: Action::Click,
                timeout_ms: None,
            });
            let err = script.validate().unwrap_err();
            assert!(err.to_string().contains("step 2"));
        }

        #[test]
        fn test_empty_url_rejected() {
            assert!(Script::new().navigate("  ").validate().is_err());
        }

        #[test]
        fn test_step_display() {
            let script = reservation();
            assert_eq!(script.steps[0].to_string(), "navigate http://localhost:8000/");
            assert_eq!(
                script.steps[1].to_string(),
                "locate get_by_role(\"link\", name=\"Waerboom\")"
            );
            assert_eq!(script.steps[4].to_string(), "fill \"3\"");
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_from_yaml_records() {
            let yaml = r##"
name: reservation
steps:
  - action: navigate
    url: http://localhost:8000/
  - action: click
    locator: { role: link, name: Waerboom }
  - action: fill
    locator:
      within: { role: listitem, has_text: "Gastronomisch buffet" }
      css: "#amount"
    value: "3"
  - action: fill
    value: "4"
  - action: expect_contains_text
    locator: { role: dialog }
    value: reservation requested
    timeout_ms: 2000
"##;
            let script = Script::from_yaml(yaml).unwrap();
            assert_eq!(script.name.as_deref(), Some("reservation"));
            assert_eq!(script.len(), 8);
            match &script.steps[3] {
                Step::Locate { locator } => assert_eq!(
                    locator.to_string(),
                    "get_by_role(\"listitem\").filter(has_text=\"Gastronomisch buffet\").locator(\"#amount\")"
                ),
                other => panic!("unexpected {other:?}"),
            }
            assert!(matches!(&script.steps[5], Step::Act { action: Action::Fill { value }, .. } if value == "4"));
            assert_eq!(script.steps[7].timeout_ms(), Some(2000));
        }

        #[test]
        fn test_yaml_round_trip_of_builder_script() {
            let script = reservation();
            let yaml = script.to_yaml().unwrap();
            assert!(yaml.contains("action: click"));
            assert_eq!(Script::from_yaml(&yaml).unwrap(), script);
        }

        #[test]
        fn test_record_errors_name_the_step() {
            let cases = [
                ("steps:\n  - action: fill\n    locator: { id: a }\n", "fill needs a value"),
                ("steps:\n  - action: navigate\n", "navigate needs a url"),
                ("steps:\n  - action: click\n", "has no target"),
                ("steps:\n  - action: click\n    locator: { id: a, css: b }\n", "exactly one"),
                ("steps:\n  - action: click\n    locator: { role: blink }\n", "unknown ARIA role"),
                ("steps:\n  - action: click\n    locator: { css: 'a:hover' }\n", "Unsupported selector"),
            ];
            for (yaml, needle) in cases {
                let err = Script::from_yaml(yaml).unwrap_err().to_string();
                assert!(err.contains(needle), "{err} should mention {needle}");
            }
        }

        #[test]
        fn test_unknown_field_rejected() {
            let yaml = "steps:\n  - action: click\n    locator: { id: a }\n    bogus: 1\n";
            assert!(matches!(Script::from_yaml(yaml), Err(ReplayError::Yaml(_))));
        }

        #[test]
        fn test_has_text_accepts_list() {
            let spec: LocatorSpec =
                serde_yaml_ng::from_str("{ role: listitem, has_text: [a, b], pick: last }").unwrap();
            let locator = spec.to_locator().unwrap();
            assert_eq!(locator.filters().len(), 2);
            assert_eq!(locator.pick(), Some(Pick::Last));
        }

        #[test]
        fn test_load_by_extension() {
            let dir = tempfile::tempdir().unwrap();
            let yaml = dir.path().join("flow.yaml");
            std::fs::write(&yaml, "steps:\n  - action: navigate\n    url: http://a.test/\n").unwrap();
            let script = Script::load(&yaml).unwrap();
            assert_eq!(script.name.as_deref(), Some("flow"));

            let other = dir.path().join("flow.txt");
            std::fs::write(&other, "").unwrap();
            assert!(matches!(Script::load(&other), Err(ReplayError::Script { .. })));
        }
    }
}
