//! Tolerant HTML parser.
//!
//! Handles what generated pages and hand-written fixtures actually contain:
//! comments, doctype, void and raw-text elements, quoted and unquoted
//! attributes, character references, implied `</li>`, `</p>` and
//! `</option>`. Scripts are kept as inert text.

use super::{Dom, NodeId};
use crate::result::{ReplayError, ReplayResult};
use std::collections::BTreeMap;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const BLOCK_CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

fn html_error(message: impl Into<String>) -> ReplayError {
    ReplayError::Html {
        message: message.into(),
    }
}

pub(super) fn parse(source: &str) -> ReplayResult<Dom> {
    let mut dom = Dom::new();
    let mut stack = vec![dom.root()];
    let bytes = source.as_bytes();
    let mut i = 0usize;
    let mut text_start = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let is_markup = matches!(next, Some(b'!' | b'/' | b'?')) || next.is_some_and(|b| b.is_ascii_alphabetic());
        if !is_markup {
            i += 1;
            continue;
        }

        flush_text(&mut dom, &stack, &source[text_start..i]);

        if source[i..].starts_with("<!--") {
            let end = find(bytes, i + 4, b"-->").ok_or_else(|| html_error("unclosed HTML comment"))?;
            i = end + 3;
        } else if next == Some(b'!') || next == Some(b'?') {
            let end = find(bytes, i, b">").ok_or_else(|| html_error("unclosed declaration"))?;
            i = end + 1;
        } else if next == Some(b'/') {
            let (tag, after) = parse_end_tag(source, i)?;
            close_element(&dom, &mut stack, &tag);
            i = after;
        } else {
            let (tag, attrs, self_closing, after) = parse_start_tag(source, i)?;
            i = after;
            close_implied(&dom, &mut stack, &tag);

            let parent = *stack.last().ok_or_else(|| html_error("missing parent element"))?;
            let node = dom.create_element(parent, tag.clone(), attrs);

            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) && !self_closing {
                let close = find_end_tag(source, i, &tag)
                    .ok_or_else(|| html_error(format!("unclosed <{tag}>")))?;
                let body = &source[i..close];
                if !body.is_empty() {
                    let text = if tag == "script" || tag == "style" {
                        body.to_string()
                    } else {
                        decode_entities(body)
                    };
                    dom.create_text(node, text);
                }
                let (_, after_close) = parse_end_tag(source, close)?;
                i = after_close;
            } else if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                stack.push(node);
            }
        }
        text_start = i;
    }

    flush_text(&mut dom, &stack, &source[text_start..]);
    Ok(dom)
}

fn flush_text(dom: &mut Dom, stack: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    if let Some(parent) = stack.last() {
        dom.create_text(*parent, decode_entities(raw));
    }
}

fn close_element(dom: &Dom, stack: &mut Vec<NodeId>, tag: &str) {
    let open = stack
        .iter()
        .rposition(|id| dom.tag(*id).is_some_and(|t| t == tag));
    if let Some(pos) = open {
        stack.truncate(pos);
    }
}

fn close_implied(dom: &Dom, stack: &mut Vec<NodeId>, tag: &str) {
    let top_is = |stack: &Vec<NodeId>, name: &str| {
        stack
            .last()
            .and_then(|id| dom.tag(*id))
            .is_some_and(|t| t == name)
    };

    if tag == "li" {
        // A new item closes the nearest open item in the same list.
        let open_li = stack.iter().rposition(|id| dom.tag(*id) == Some("li"));
        let open_list = stack
            .iter()
            .rposition(|id| matches!(dom.tag(*id), Some("ul" | "ol")));
        if let Some(li) = open_li {
            if open_list.map_or(true, |list| li > list) {
                stack.truncate(li);
            }
        }
    }
    if (tag == "option" || tag == "optgroup") && top_is(stack, "option") {
        stack.pop();
    }
    if BLOCK_CLOSES_P.contains(&tag) && top_is(stack, "p") {
        stack.pop();
    }
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn find_end_tag(source: &str, from: usize, tag: &str) -> Option<usize> {
    let needle = format!("</{tag}");
    let needle = needle.as_bytes();
    source
        .as_bytes()
        .get(from..)?
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|p| p + from)
}

const fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}

const fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'>' | b'/' | b'=' | b'"' | b'\'' | b'<')
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn parse_end_tag(source: &str, at: usize) -> ReplayResult<(String, usize)> {
    let bytes = source.as_bytes();
    let mut i = at + 2;
    let start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = source[start..i].to_ascii_lowercase();
    let end = find(bytes, i, b">").ok_or_else(|| html_error(format!("unclosed end tag </{tag}")))?;
    Ok((tag, end + 1))
}

type StartTag = (String, BTreeMap<String, String>, bool, usize);

fn parse_start_tag(source: &str, at: usize) -> ReplayResult<StartTag> {
    let bytes = source.as_bytes();
    let mut i = at + 1;
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = source[tag_start..i].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(html_error("empty tag name"));
    }

    let mut attrs = BTreeMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(html_error(format!("unclosed start tag <{tag}")));
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b if !is_attr_name_char(b) => {
                // Stray quote or slash: skip it the way browsers recover.
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        let name = source[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            match bytes.get(i) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let close = find(bytes, i + 1, &[quote])
                        .ok_or_else(|| html_error(format!("unterminated attribute {name}")))?;
                    let raw = &source[i + 1..close];
                    i = close + 1;
                    decode_entities(raw)
                }
                _ => {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    decode_entities(&source[start..i])
                }
            }
        } else {
            String::new()
        };

        attrs.entry(name).or_insert(value);
    }

    Ok((tag, attrs, self_closing, i))
}

fn decode_named(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "euro" => Some('€'),
        "copy" => Some('©'),
        "times" => Some('×'),
        "hellip" => Some('…'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        "laquo" => Some('«'),
        "raquo" => Some('»'),
        _ => None,
    }
}

fn decode_numeric(value: &str) -> Option<char> {
    let codepoint = match value.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}

/// Decode character references; unknown ones are left verbatim
pub(crate) fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let name = &tail[..end];
            let ch = match name.strip_prefix('#') {
                Some(numeric) => decode_numeric(numeric),
                None => decode_named(name),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tags(dom: &Dom) -> Vec<String> {
        dom.descendants(dom.root())
            .into_iter()
            .map(|id| dom.tag(id).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_parse_nested_elements() {
        let dom = parse("<html><body><ul><li>a</li><li>b</li></ul></body></html>").unwrap();
        assert_eq!(tags(&dom), vec!["html", "body", "ul", "li", "li"]);
    }

    #[test]
    fn test_parse_attributes_quoted_unquoted_boolean() {
        let dom = parse(r#"<input id=amount type="number" value='1' required>"#).unwrap();
        let input = dom.descendants(dom.root())[0];
        let element = dom.element(input).unwrap();
        assert_eq!(element.attr("id"), Some("amount"));
        assert_eq!(element.attr("type"), Some("number"));
        assert_eq!(element.attr("value"), Some("1"));
        assert_eq!(element.attr("required"), Some(""));
    }

    #[test]
    fn test_void_elements_do_not_nest() {
        let dom = parse("<p><input><span>x</span></p>").unwrap();
        let all = dom.descendants(dom.root());
        let span = all[2];
        assert_eq!(dom.tag(dom.parent(span).unwrap()), Some("p"));
    }

    #[test]
    fn test_implied_li_close() {
        let dom = parse("<ul><li>one<li>two</ul>").unwrap();
        let all = dom.descendants(dom.root());
        assert_eq!(tags(&dom), vec!["ul", "li", "li"]);
        assert_eq!(dom.parent(all[2]), Some(all[0]));
    }

    #[test]
    fn test_nested_list_items_stay_nested() {
        let dom = parse("<ul><li>outer<ul><li>inner</li></ul></li></ul>").unwrap();
        let all = dom.descendants(dom.root());
        // ul > li > ul > li
        assert_eq!(dom.parent(all[3]), Some(all[2]));
        assert_eq!(dom.parent(all[2]), Some(all[1]));
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let dom = parse("<!DOCTYPE html><!-- <b>no</b> --><p>yes</p>").unwrap();
        assert_eq!(tags(&dom), vec!["p"]);
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let dom = parse("<script>if (a < b) { x('</div>') }</script><p>z</p>").unwrap();
        assert_eq!(tags(&dom), vec!["script", "p"]);
    }

    #[test]
    fn test_raw_text_end_tag_any_case() {
        let dom = parse("<TEXTAREA id=t>a</b> &amp; c</TextArea><Script>x</SCRIPT><p>z</p>").unwrap();
        assert_eq!(tags(&dom), vec!["textarea", "script", "p"]);
        let t = dom.descendants(dom.root())[0];
        assert_eq!(dom.text_content(t), "a</b> & c");
    }

    #[test]
    fn test_many_raw_text_elements() {
        let source = "<script>var a = '</p>';</script><p>x</p>".repeat(500);
        let dom = parse(&source).unwrap();
        assert_eq!(dom.descendants(dom.root()).len(), 1000);
    }

    #[test]
    fn test_entities_decoded() {
        let dom = parse("<p>&euro;97.00 &amp; more &#8364; &unknown;</p>").unwrap();
        let p = dom.descendants(dom.root())[0];
        assert_eq!(dom.rendered_text(p), "€97.00 & more € &unknown;");
    }

    #[test]
    fn test_lone_less_than_is_text() {
        let dom = parse("<p>1 < 2</p>").unwrap();
        let p = dom.descendants(dom.root())[0];
        assert_eq!(dom.rendered_text(p), "1 < 2");
    }

    #[test]
    fn test_unclosed_comment_is_error() {
        assert!(matches!(parse("<!-- nope"), Err(ReplayError::Html { .. })));
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let dom = parse("<div>a</span>b</div>").unwrap();
        let div = dom.descendants(dom.root())[0];
        assert_eq!(dom.rendered_text(div), "ab");
    }
}
