//! Structural CSS selectors.
//!
//! Supports compound steps (`tag`, `*`, `#id`, `.class`, attribute
//! conditions), the descendant and child combinators, and comma groups.
//! Pseudo-classes and sibling combinators are rejected with
//! [`ReplayError::Selector`].

use crate::dom::{Dom, Element, NodeId};
use crate::result::{ReplayError, ReplayResult};
use std::fmt;

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
    /// `[name]`
    Exists { name: String },
    /// `[name=value]`
    Eq { name: String, value: String },
    /// `[name^=value]`
    StartsWith { name: String, value: String },
    /// `[name$=value]`
    EndsWith { name: String, value: String },
    /// `[name*=value]`
    Contains { name: String, value: String },
    /// `[name~=value]`
    Includes { name: String, value: String },
}

impl AttrCondition {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Exists { name } => element.has_attr(name),
            Self::Eq { name, value } => element.attr(name) == Some(value.as_str()),
            Self::StartsWith { name, value } => {
                !value.is_empty() && element.attr(name).is_some_and(|v| v.starts_with(value.as_str()))
            }
            Self::EndsWith { name, value } => {
                !value.is_empty() && element.attr(name).is_some_and(|v| v.ends_with(value.as_str()))
            }
            Self::Contains { name, value } => {
                !value.is_empty() && element.attr(name).is_some_and(|v| v.contains(value.as_str()))
            }
            Self::Includes { name, value } => element
                .attr(name)
                .is_some_and(|v| v.split_whitespace().any(|part| part == value)),
        }
    }
}

/// One compound step, e.g. `li.item[data-x]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorStep {
    /// Tag name, `None` for `*` or no tag
    pub tag: Option<String>,
    /// `#id`
    pub id: Option<String>,
    /// `.class` list
    pub classes: Vec<String>,
    /// `[...]` conditions
    pub attrs: Vec<AttrCondition>,
}

impl SelectorStep {
    fn matches(&self, element: &Element) -> bool {
        if self.tag.as_deref().is_some_and(|tag| tag != element.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| element.attr("id") != Some(id)) {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self.attrs.iter().all(|a| a.matches(element))
    }
}

/// Relation between a step and the step on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
}

/// A chain of steps; `combinators[i]` joins `steps[i]` and `steps[i + 1]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chain {
    steps: Vec<SelectorStep>,
    combinators: Vec<Combinator>,
}

impl Chain {
    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.matches_at(dom, node, self.steps.len() - 1)
    }

    // Right-to-left with backtracking over ancestors for descendant joins.
    fn matches_at(&self, dom: &Dom, node: NodeId, index: usize) -> bool {
        let Some(element) = dom.element(node) else {
            return false;
        };
        if !self.steps[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => dom
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(dom, parent, index - 1)),
            Combinator::Descendant => dom
                .ancestors(node)
                .any(|ancestor| self.matches_at(dom, ancestor, index - 1)),
        }
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    source: String,
    groups: Vec<Chain>,
}

impl CssSelector {
    /// Parse a selector list
    pub fn parse(source: &str) -> ReplayResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(selector_error(source, "empty selector"));
        }
        let groups = split_groups(trimmed)
            .into_iter()
            .map(|group| parse_chain(source, group))
            .collect::<ReplayResult<Vec<_>>>()?;
        Ok(Self {
            source: trimmed.to_string(),
            groups,
        })
    }

    /// Selector text as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches any group
    #[must_use]
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.groups.iter().any(|chain| chain.matches(dom, node))
    }
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn selector_error(selector: &str, message: impl Into<String>) -> ReplayError {
    ReplayError::Selector {
        selector: selector.to_string(),
        message: message.into(),
    }
}

/// Split on commas outside brackets and quotes
fn split_groups(source: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&source[start..]);
    groups
}

const fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn read_ident(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_char(bytes[i]) {
        i += 1;
    }
    i
}

fn parse_chain(full: &str, group: &str) -> ReplayResult<Chain> {
    let bytes = group.as_bytes();
    let mut steps = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut i = 0usize;

    loop {
        let had_space = i < bytes.len() && bytes[i].is_ascii_whitespace();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        match bytes[i] {
            b'>' => {
                if steps.is_empty() || pending == Some(Combinator::Child) {
                    return Err(selector_error(full, "dangling '>' combinator"));
                }
                pending = Some(Combinator::Child);
                i += 1;
                continue;
            }
            b'+' | b'~' => {
                return Err(selector_error(full, "sibling combinators are not supported"));
            }
            b',' => return Err(selector_error(full, "empty selector group")),
            _ => {}
        }

        if !steps.is_empty() {
            let combinator = match pending.take() {
                Some(c) => c,
                None if had_space => Combinator::Descendant,
                None => return Err(selector_error(full, "unexpected character")),
            };
            combinators.push(combinator);
        }

        let (step, next) = parse_step(full, group, i)?;
        steps.push(step);
        i = next;
    }

    if steps.is_empty() {
        return Err(selector_error(full, "empty selector group"));
    }
    if pending.is_some() {
        return Err(selector_error(full, "dangling '>' combinator"));
    }
    Ok(Chain { steps, combinators })
}

fn parse_step(full: &str, src: &str, start: usize) -> ReplayResult<(SelectorStep, usize)> {
    let bytes = src.as_bytes();
    let mut step = SelectorStep::default();
    let mut i = start;
    let mut universal = false;

    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
        match bytes[i] {
            b'*' if i == start => {
                universal = true;
                i += 1;
            }
            b'#' => {
                let end = read_ident(bytes, i + 1);
                if end == i + 1 {
                    return Err(selector_error(full, "expected id after '#'"));
                }
                step.id = Some(src[i + 1..end].to_string());
                i = end;
            }
            b'.' => {
                let end = read_ident(bytes, i + 1);
                if end == i + 1 {
                    return Err(selector_error(full, "expected class after '.'"));
                }
                step.classes.push(src[i + 1..end].to_string());
                i = end;
            }
            b'[' => {
                let (condition, next) = parse_attr(full, src, i + 1)?;
                step.attrs.push(condition);
                i = next;
            }
            b':' => return Err(selector_error(full, "pseudo-classes are not supported")),
            b if is_ident_char(b) && i == start && !universal => {
                let end = read_ident(bytes, i);
                step.tag = Some(src[i..end].to_ascii_lowercase());
                i = end;
            }
            b',' | b'+' | b'~' => break,
            _ => return Err(selector_error(full, format!("unexpected '{}'", bytes[i] as char))),
        }
    }

    Ok((step, i))
}

fn parse_attr(full: &str, src: &str, start: usize) -> ReplayResult<(AttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && (is_ident_char(bytes[i]) || bytes[i] == b':') {
        i += 1;
    }
    if i == name_start {
        return Err(selector_error(full, "expected attribute name"));
    }
    let name = src[name_start..i].to_ascii_lowercase();
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let operator = match bytes.get(i) {
        Some(b']') => return Ok((AttrCondition::Exists { name }, i + 1)),
        Some(b'=') => {
            i += 1;
            "="
        }
        Some(&op @ (b'^' | b'$' | b'*' | b'~')) if bytes.get(i + 1) == Some(&b'=') => {
            i += 2;
            match op {
                b'^' => "^=",
                b'$' => "$=",
                b'*' => "*=",
                _ => "~=",
            }
        }
        _ => return Err(selector_error(full, "unsupported attribute operator")),
    };

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let value = match bytes.get(i) {
        Some(&quote @ (b'"' | b'\'')) => {
            let close = src[i + 1..]
                .find(quote as char)
                .map(|p| p + i + 1)
                .ok_or_else(|| selector_error(full, "unterminated attribute value"))?;
            let value = src[i + 1..close].to_string();
            i = close + 1;
            value
        }
        _ => {
            let value_start = i;
            i = read_ident(bytes, i);
            src[value_start..i].to_string()
        }
    };
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b']') {
        return Err(selector_error(full, "expected ']'"));
    }

    let condition = match operator {
        "=" => AttrCondition::Eq { name, value },
        "^=" => AttrCondition::StartsWith { name, value },
        "$=" => AttrCondition::EndsWith { name, value },
        "*=" => AttrCondition::Contains { name, value },
        _ => AttrCondition::Includes { name, value },
    };
    Ok((condition, i + 1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn matching_ids(html: &str, selector: &str) -> Vec<String> {
        let dom = Dom::parse(html).unwrap();
        let selector = CssSelector::parse(selector).unwrap();
        dom.descendants(dom.root())
            .into_iter()
            .filter(|id| selector.matches(&dom, *id))
            .map(|id| dom.attr(id, "id").unwrap_or("?").to_string())
            .collect()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_compound() {
            let selector = CssSelector::parse("li.item.big#x[data-k]").unwrap();
            let step = &selector.groups[0].steps[0];
            assert_eq!(step.tag.as_deref(), Some("li"));
            assert_eq!(step.id.as_deref(), Some("x"));
            assert_eq!(step.classes, vec!["item", "big"]);
            assert_eq!(
                step.attrs,
                vec![AttrCondition::Exists {
                    name: "data-k".to_string()
                }]
            );
        }

        #[test]
        fn test_parse_child_chain() {
            let selector = CssSelector::parse(".mt-3 > .p-4").unwrap();
            assert_eq!(selector.groups[0].steps.len(), 2);
            assert_eq!(selector.groups[0].combinators, vec![Combinator::Child]);
            assert_eq!(selector.to_string(), ".mt-3 > .p-4");
        }

        #[test]
        fn test_parse_groups() {
            let selector = CssSelector::parse("a, button[title='a,b']").unwrap();
            assert_eq!(selector.groups.len(), 2);
        }

        #[test]
        fn test_rejects_unsupported() {
            for bad in ["", "a:hover", "a + b", "a ~ b", "> a", "a >", "[=x]", "a[x|=y]", "a,"] {
                assert!(
                    matches!(CssSelector::parse(bad), Err(ReplayError::Selector { .. })),
                    "{bad} should be rejected"
                );
            }
        }
    }

    mod match_tests {
        use super::*;

        #[test]
        fn test_child_vs_descendant() {
            let html = r#"<div class="mt-3"><div class="p-4" id="a"></div><span><i class="p-4" id="b"></i></span></div>"#;
            assert_eq!(matching_ids(html, ".mt-3 > .p-4"), vec!["a"]);
            assert_eq!(matching_ids(html, ".mt-3 .p-4"), vec!["a", "b"]);
        }

        #[test]
        fn test_descendant_backtracks() {
            let html = r#"<section class="x"><div><section><p id="t"></p></section></div></section>"#;
            assert_eq!(matching_ids(html, ".x > div p"), vec!["t"]);
        }

        #[test]
        fn test_attribute_operators() {
            let html = r#"<a id="a" href="https://x.test/page" rel="nofollow noopener"></a><a id="b" href="/local"></a>"#;
            assert_eq!(matching_ids(html, "a[href^=https]"), vec!["a"]);
            assert_eq!(matching_ids(html, "a[href$='local']"), vec!["b"]);
            assert_eq!(matching_ids(html, "a[href*=page]"), vec!["a"]);
            assert_eq!(matching_ids(html, "[rel~=noopener]"), vec!["a"]);
            assert_eq!(matching_ids(html, "[href=\"/local\"]"), vec!["b"]);
        }

        #[test]
        fn test_universal_and_tag_case() {
            let html = r#"<DIV id="a"><p id="b"></p></DIV>"#;
            assert_eq!(matching_ids(html, "*"), vec!["a", "b"]);
            assert_eq!(matching_ids(html, "div > *"), vec!["b"]);
            assert_eq!(matching_ids(html, "DIV"), vec!["a"]);
        }
    }
}
