//! ARIA roles and accessible names.
//!
//! Roles come from an explicit `role` attribute when it names a known role,
//! otherwise from the element's implicit mapping. Names follow the usual
//! precedence: `aria-label`, `aria-labelledby`, associated `<label>`,
//! `placeholder`, content (for roles named from content), `alt`, `title`.

use crate::dom::{normalize_whitespace, Dom, NodeId, NodeKind};
use crate::result::ReplayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ARIA roles understood by role locators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    Alert,
    Article,
    Banner,
    Button,
    Cell,
    Checkbox,
    Columnheader,
    Combobox,
    Contentinfo,
    Dialog,
    Form,
    Group,
    Heading,
    Img,
    Link,
    List,
    Listbox,
    Listitem,
    Main,
    Navigation,
    Option,
    Paragraph,
    Progressbar,
    Radio,
    Region,
    Row,
    Searchbox,
    Slider,
    Spinbutton,
    Status,
    Tab,
    Table,
    Textbox,
}

impl AriaRole {
    /// Every known role
    pub const ALL: &'static [Self] = &[
        Self::Alert,
        Self::Article,
        Self::Banner,
        Self::Button,
        Self::Cell,
        Self::Checkbox,
        Self::Columnheader,
        Self::Combobox,
        Self::Contentinfo,
        Self::Dialog,
        Self::Form,
        Self::Group,
        Self::Heading,
        Self::Img,
        Self::Link,
        Self::List,
        Self::Listbox,
        Self::Listitem,
        Self::Main,
        Self::Navigation,
        Self::Option,
        Self::Paragraph,
        Self::Progressbar,
        Self::Radio,
        Self::Region,
        Self::Row,
        Self::Searchbox,
        Self::Slider,
        Self::Spinbutton,
        Self::Status,
        Self::Tab,
        Self::Table,
        Self::Textbox,
    ];

    /// Role name as used in markup
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Article => "article",
            Self::Banner => "banner",
            Self::Button => "button",
            Self::Cell => "cell",
            Self::Checkbox => "checkbox",
            Self::Columnheader => "columnheader",
            Self::Combobox => "combobox",
            Self::Contentinfo => "contentinfo",
            Self::Dialog => "dialog",
            Self::Form => "form",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::Img => "img",
            Self::Link => "link",
            Self::List => "list",
            Self::Listbox => "listbox",
            Self::Listitem => "listitem",
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Option => "option",
            Self::Paragraph => "paragraph",
            Self::Progressbar => "progressbar",
            Self::Radio => "radio",
            Self::Region => "region",
            Self::Row => "row",
            Self::Searchbox => "searchbox",
            Self::Slider => "slider",
            Self::Spinbutton => "spinbutton",
            Self::Status => "status",
            Self::Tab => "tab",
            Self::Table => "table",
            Self::Textbox => "textbox",
        }
    }

    /// Whether the accessible name is taken from the element's content
    #[must_use]
    pub const fn name_from_content(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Cell
                | Self::Checkbox
                | Self::Columnheader
                | Self::Heading
                | Self::Link
                | Self::Listitem
                | Self::Option
                | Self::Radio
                | Self::Row
                | Self::Tab
        )
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AriaRole {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| ReplayError::script(format!("unknown ARIA role '{s}'")))
    }
}

/// Role of an element, `None` when it has no role we model
#[must_use]
pub fn role_of(dom: &Dom, node: NodeId) -> Option<AriaRole> {
    let element = dom.element(node)?;
    if let Some(explicit) = element.attr("role") {
        // First recognised token wins; unknown tokens fall through.
        if let Some(role) = explicit
            .split_whitespace()
            .find_map(|token| token.parse::<AriaRole>().ok())
        {
            return Some(role);
        }
    }

    match element.tag.as_str() {
        "a" | "area" if element.has_attr("href") => Some(AriaRole::Link),
        "button" => Some(AriaRole::Button),
        "input" => match element.input_type().as_str() {
            "button" | "submit" | "reset" | "image" => Some(AriaRole::Button),
            "checkbox" => Some(AriaRole::Checkbox),
            "radio" => Some(AriaRole::Radio),
            "number" => Some(AriaRole::Spinbutton),
            "range" => Some(AriaRole::Slider),
            "search" => Some(AriaRole::Searchbox),
            "hidden" | "password" | "file" | "color" | "date" | "datetime-local" | "month"
            | "time" | "week" => None,
            _ => Some(AriaRole::Textbox),
        },
        "textarea" => Some(AriaRole::Textbox),
        "select" => {
            let size = element
                .attr("size")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(0);
            if element.has_attr("multiple") || size > 1 {
                Some(AriaRole::Listbox)
            } else {
                Some(AriaRole::Combobox)
            }
        }
        "option" => Some(AriaRole::Option),
        "li" => Some(AriaRole::Listitem),
        "ul" | "ol" | "menu" => Some(AriaRole::List),
        "dialog" => Some(AriaRole::Dialog),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(AriaRole::Heading),
        "img" => match element.attr("alt") {
            Some("") => None,
            _ => Some(AriaRole::Img),
        },
        "nav" => Some(AriaRole::Navigation),
        "main" => Some(AriaRole::Main),
        "form" => Some(AriaRole::Form),
        "table" => Some(AriaRole::Table),
        "tr" => Some(AriaRole::Row),
        "td" => Some(AriaRole::Cell),
        "th" => Some(AriaRole::Columnheader),
        "p" => Some(AriaRole::Paragraph),
        "header" => Some(AriaRole::Banner),
        "footer" => Some(AriaRole::Contentinfo),
        "article" => Some(AriaRole::Article),
        "section" => Some(AriaRole::Region),
        "fieldset" => Some(AriaRole::Group),
        "progress" => Some(AriaRole::Progressbar),
        "output" => Some(AriaRole::Status),
        _ => None,
    }
}

fn is_labelable(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "textarea" | "select" | "button" | "meter" | "output" | "progress"
    )
}

/// Text of the `<label>` elements associated with a form control
#[must_use]
pub fn label_text(dom: &Dom, node: NodeId) -> Option<String> {
    let element = dom.element(node)?;
    if !is_labelable(&element.tag) {
        return None;
    }

    let mut parts = Vec::new();
    if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
        for label in dom.descendants(dom.root()) {
            if dom.tag(label) == Some("label") && dom.attr(label, "for") == Some(id) {
                parts.push(dom.rendered_text(label));
            }
        }
    }
    if let Some(wrapping) = dom.ancestors(node).find(|a| dom.tag(*a) == Some("label")) {
        // A wrapping label that also points here via `for` was already collected.
        if parts.is_empty() || dom.attr(wrapping, "for").is_none() {
            parts.push(dom.rendered_text(wrapping));
        }
    }

    let joined = normalize_whitespace(&parts.join(" "));
    (!joined.is_empty()).then_some(joined)
}

/// Accessible name of an element (whitespace-normalized, possibly empty)
#[must_use]
pub fn accessible_name(dom: &Dom, node: NodeId) -> String {
    let Some(element) = dom.element(node) else {
        return String::new();
    };

    if let Some(label) = element.attr("aria-label").map(normalize_whitespace) {
        if !label.is_empty() {
            return label;
        }
    }

    if let Some(ids) = element.attr("aria-labelledby") {
        let text = ids
            .split_whitespace()
            .filter_map(|id| dom.element_by_id(id))
            .map(|id| dom.rendered_text(id))
            .collect::<Vec<_>>()
            .join(" ");
        let text = normalize_whitespace(&text);
        if !text.is_empty() {
            return text;
        }
    }

    if let Some(label) = label_text(dom, node) {
        return label;
    }

    if element.tag == "input" {
        let kind = element.input_type();
        if matches!(kind.as_str(), "button" | "submit" | "reset") {
            let value = element.attr("value").map(normalize_whitespace);
            return match (value, kind.as_str()) {
                (Some(v), _) if !v.is_empty() => v,
                (_, "submit") => "Submit".to_string(),
                (_, "reset") => "Reset".to_string(),
                _ => String::new(),
            };
        }
        if kind == "image" {
            if let Some(alt) = element.attr("alt") {
                return normalize_whitespace(alt);
            }
        }
    }

    if matches!(element.tag.as_str(), "input" | "textarea") {
        if let Some(placeholder) = element.attr("placeholder").map(normalize_whitespace) {
            if !placeholder.is_empty() {
                return placeholder;
            }
        }
    }

    if element.tag == "img" {
        if let Some(alt) = element.attr("alt").map(normalize_whitespace) {
            if !alt.is_empty() {
                return alt;
            }
        }
    }

    if role_of(dom, node).is_some_and(AriaRole::name_from_content) {
        let mut text = String::new();
        content_text(dom, node, &mut text);
        let text = normalize_whitespace(&text);
        if !text.is_empty() {
            return text;
        }
    }

    element
        .attr("title")
        .map(normalize_whitespace)
        .unwrap_or_default()
}

// Rendered text where embedded images contribute their alt and labelled
// children contribute their label.
fn content_text(dom: &Dom, node: NodeId, out: &mut String) {
    for child in dom.children(node) {
        let Some(child_node) = dom.node(*child) else {
            continue;
        };
        match &child_node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) => {
                if !dom.is_visible(*child) {
                    continue;
                }
                if let Some(label) = element.attr("aria-label").filter(|l| !l.trim().is_empty()) {
                    out.push(' ');
                    out.push_str(label);
                    out.push(' ');
                } else if element.tag == "img" {
                    out.push(' ');
                    out.push_str(element.attr("alt").unwrap_or_default());
                    out.push(' ');
                } else {
                    content_text(dom, *child, out);
                }
            }
            NodeKind::Document => {}
        }
    }
}
