//! Arena document model.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. Detached
//! nodes (replaced children) stay in the arena but are no longer reachable
//! from the root, so traversal never sees them.

mod html;

use crate::result::ReplayResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node in a [`Dom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Index into the arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes, names lower-cased
    pub attrs: BTreeMap<String, String>,
    /// Live value of form controls once edited
    pub value: Option<String>,
}

impl Element {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the attribute is present
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Whether `class` contains `class_name`
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    /// Lower-cased `type` attribute of an `input`, defaulting to `text`
    #[must_use]
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map_or_else(|| "text".to_string(), |t| t.trim().to_ascii_lowercase())
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element(Element),
    /// Text node
    Text(String),
}

/// A node and its links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Parent node, `None` for the root and detached nodes
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Payload
    pub kind: NodeKind,
}

const NOT_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "noscript",
];

const INPUT_NOT_EDITABLE: &[&str] = &[
    "button", "submit", "reset", "checkbox", "radio", "image", "file", "hidden", "range",
    "color",
];

/// An HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    /// Parse an HTML string
    pub fn parse(source: &str) -> ReplayResult<Self> {
        html::parse(source)
    }

    /// Document root
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes besides the root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element under `parent`
    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attrs: BTreeMap<String, String>,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Element(Element {
                tag: tag.into().to_ascii_lowercase(),
                attrs,
                value: None,
            }),
        )
    }

    /// Append a text node under `parent`
    pub fn create_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeKind::Text(text.into()))
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Element payload by id
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Tag name of an element
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Attribute of an element
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    /// Parent node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Parent if it is an element
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    /// Children in document order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Element ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_element(id), move |p| self.parent_element(*p))
    }

    /// Whether `id` is attached under the root
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Element descendants of `scope` in document order, `scope` excluded
    #[must_use]
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.element(id).is_some() {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` contains `id` (strictly)
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// First attached element whose `id` attribute equals `value`
    #[must_use]
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(value))
    }

    /// Raw concatenated text of all descendant text nodes
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, false, &mut out);
        out
    }

    /// Text as rendered: hidden subtrees skipped, whitespace collapsed
    #[must_use]
    pub fn rendered_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, true, &mut out);
        normalize_whitespace(&out)
    }

    fn collect_text(&self, id: NodeId, rendered_only: bool, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(element) => {
                if rendered_only && self.hides_subtree(element) {
                    return;
                }
                for child in &node.children {
                    self.collect_text(*child, rendered_only, out);
                }
            }
            NodeKind::Document => {
                for child in &node.children {
                    self.collect_text(*child, rendered_only, out);
                }
            }
        }
    }

    fn hides_subtree(&self, element: &Element) -> bool {
        if NOT_RENDERED.contains(&element.tag.as_str()) || element.has_attr("hidden") {
            return true;
        }
        if element.tag == "dialog" && !element.has_attr("open") {
            return true;
        }
        if element.tag == "input" && element.input_type() == "hidden" {
            return true;
        }
        element.attr("style").is_some_and(style_hides)
    }

    /// Whether the element and all its ancestors are rendered
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        if !self.is_attached(id) || self.hides_subtree(element) {
            return false;
        }
        self.ancestors(id)
            .all(|a| self.element(a).is_some_and(|e| !self.hides_subtree(e)))
    }

    /// Whether the element is enabled
    #[must_use]
    pub fn is_enabled(&self, id: NodeId) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        if element.has_attr("disabled") || element.attr("aria-disabled") == Some("true") {
            return false;
        }
        !self.ancestors(id).any(|a| {
            self.element(a)
                .is_some_and(|e| e.tag == "fieldset" && e.has_attr("disabled"))
        })
    }

    /// Whether the element accepts typed text
    #[must_use]
    pub fn is_editable(&self, id: NodeId) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        if element.has_attr("readonly") {
            return false;
        }
        match element.tag.as_str() {
            "input" => !INPUT_NOT_EDITABLE.contains(&element.input_type().as_str()),
            "textarea" => true,
            _ => element
                .attr("contenteditable")
                .is_some_and(|v| !v.eq_ignore_ascii_case("false")),
        }
    }

    /// Current value of a form control
    #[must_use]
    pub fn input_value(&self, id: NodeId) -> Option<String> {
        let element = self.element(id)?;
        if let Some(value) = &element.value {
            return Some(value.clone());
        }
        match element.tag.as_str() {
            "input" => Some(element.attr("value").unwrap_or_default().to_string()),
            "textarea" => Some(self.text_content(id)),
            _ if element.has_attr("contenteditable") => Some(self.text_content(id)),
            _ => None,
        }
    }

    /// Set the live value of a form control
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Set an attribute
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element
                    .attrs
                    .insert(name.to_ascii_lowercase(), value.into());
                true
            }
            None => false,
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id)
            .is_some_and(|element| element.attrs.remove(&name.to_ascii_lowercase()).is_some())
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        self.create_text(id, text);
        true
    }
}

/// Collapse whitespace runs to one space and trim
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether an inline `style` value hides the element
#[must_use]
pub fn style_hides(style: &str) -> bool {
    let compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.contains("display:none") || compact.contains("visibility:hidden")
}
