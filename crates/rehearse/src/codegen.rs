//! Codegen script import.
//!
//! Reads the TypeScript that browser recorders emit and turns its `await`
//! statements into a [`Script`]:
//!
//! ```text
//! await page.goto('http://localhost:8000/');
//! await page.getByRole('link', { name: 'Waerboom' }).click();
//! await page.getByRole('listitem').filter({ hasText: 'buffet' }).locator('#amount').fill('3');
//! await expect(page.getByRole('dialog')).toContainText('reservation requested');
//! ```
//!
//! Only the recorder's vocabulary is understood. Anything else is a
//! [`ReplayError::Codegen`] naming the offending line.

use crate::locator::{Locator, Selector, TextMatch};
use crate::result::{ReplayError, ReplayResult};
use crate::role::AriaRole;
use crate::step::Script;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Punct(char),
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    line: usize,
}

fn codegen_error(line: usize, message: impl Into<String>) -> ReplayError {
    ReplayError::Codegen {
        line,
        message: message.into(),
    }
}

fn tokenize(source: &str) -> ReplayResult<Vec<Spanned>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let start_line = line;
                i += 2;
                loop {
                    match chars.get(i) {
                        None => return Err(codegen_error(start_line, "unterminated comment")),
                        Some('*') if chars.get(i + 1) == Some(&'/') => {
                            i += 2;
                            break;
                        }
                        Some('\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            '\'' | '"' | '`' => {
                let (text, next, lines) = read_string(&chars, i, line)?;
                tokens.push(Spanned {
                    token: Token::Str(text),
                    line,
                });
                line += lines;
                i = next;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| codegen_error(line, format!("bad number '{text}'")))?;
                tokens.push(Spanned {
                    token: Token::Num(value),
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                tokens.push(Spanned {
                    token: Token::Ident(chars[start..i].iter().collect()),
                    line,
                });
            }
            _ => {
                tokens.push(Spanned {
                    token: Token::Punct(c),
                    line,
                });
                i += 1;
            }
        }
    }
    Ok(tokens)
}

// Returns the decoded text, the index after the closing quote, and how many
// newlines the literal spanned.
fn read_string(chars: &[char], start: usize, line: usize) -> ReplayResult<(String, usize, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    let mut lines = 0usize;
    loop {
        let Some(&c) = chars.get(i) else {
            return Err(codegen_error(line, "unterminated string"));
        };
        match c {
            c if c == quote => return Ok((out, i + 1, lines)),
            '\\' => {
                let Some(&escaped) = chars.get(i + 1) else {
                    return Err(codegen_error(line, "unterminated string"));
                };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    // line continuation
                    '\n' => lines += 1,
                    '\r' => {
                        if chars.get(i + 2) == Some(&'\n') {
                            i += 1;
                        }
                        lines += 1;
                    }
                    'u' => {
                        let hex: String = chars.iter().skip(i + 2).take(4).collect();
                        let ch = u32::from_str_radix(&hex, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| {
                                codegen_error(line + lines, format!("bad escape \\u{hex}"))
                            })?;
                        out.push(ch);
                        i += 4;
                    }
                    other => out.push(other),
                }
                i += 2;
            }
            '$' if quote == '`' && chars.get(i + 1) == Some(&'{') => {
                return Err(codegen_error(
                    line + lines,
                    "template interpolation is not supported",
                ));
            }
            '\n' if quote != '`' => return Err(codegen_error(line, "unterminated string")),
            c => {
                if c == '\n' {
                    lines += 1;
                }
                out.push(c);
                i += 1;
            }
        }
    }
}

/// Argument value in a call
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Object(Vec<(String, Value)>),
    Chain(Locator),
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> ReplayError {
        codegen_error(self.line(), message)
    }

    fn expect_punct(&mut self, wanted: char) -> ReplayResult<()> {
        if self.eat_punct(wanted) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{wanted}', found {}", describe(self.peek()))))
        }
    }

    fn eat_punct(&mut self, wanted: char) -> bool {
        if self.peek() == Some(&Token::Punct(wanted)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> ReplayResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            other => Err(self.error(format!("expected a name, found {}", describe(other)))),
        }
    }

    fn args(&mut self) -> ReplayResult<Vec<Value>> {
        self.expect_punct('(')?;
        let mut args = Vec::new();
        if self.eat_punct(')') {
            return Ok(args);
        }
        loop {
            args.push(self.value()?);
            if self.eat_punct(',') {
                if self.eat_punct(')') {
                    return Ok(args);
                }
                continue;
            }
            self.expect_punct(')')?;
            return Ok(args);
        }
    }

    fn value(&mut self) -> ReplayResult<Value> {
        match self.peek().cloned() {
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Value::Str(s))
            }
            Some(Token::Num(n)) => {
                self.pos += 1;
                Ok(Value::Num(n))
            }
            Some(Token::Ident(name)) if name == "true" || name == "false" => {
                self.pos += 1;
                Ok(Value::Bool(name == "true"))
            }
            Some(Token::Ident(name)) if name == "page" => {
                self.pos += 1;
                match self.chain()? {
                    ChainEnd::Locator(locator) => Ok(Value::Chain(locator)),
                    _ => Err(self.error("expected a locator")),
                }
            }
            Some(Token::Punct('{')) => self.object(),
            Some(Token::Punct('/')) => Err(self.error("regular expressions are not supported")),
            other => Err(self.error(format!("unexpected {}", describe(other.as_ref())))),
        }
    }

    fn object(&mut self) -> ReplayResult<Value> {
        self.expect_punct('{')?;
        let mut fields = Vec::new();
        loop {
            if self.eat_punct('}') {
                return Ok(Value::Object(fields));
            }
            let key = match self.next() {
                Some(Token::Ident(k) | Token::Str(k)) => k,
                other => {
                    return Err(self.error(format!("expected a key, found {}", describe(other.as_ref()))))
                }
            };
            self.expect_punct(':')?;
            fields.push((key, self.value()?));
            if !self.eat_punct(',') {
                self.expect_punct('}')?;
                return Ok(Value::Object(fields));
            }
        }
    }

    /// Parse `.method(args)...` after `page`
    fn chain(&mut self) -> ReplayResult<ChainEnd> {
        let mut locator: Option<Locator> = None;
        loop {
            if !self.eat_punct('.') {
                return locator
                    .map(ChainEnd::Locator)
                    .ok_or_else(|| self.error("expected a method call on page"));
            }
            let line = self.line();
            let method = self.ident()?;
            let args = self.args()?;
            let call = Call { line, method, args };

            if call.method == "goto" {
                if locator.is_some() {
                    return Err(call.error("goto must be called on page"));
                }
                return Ok(ChainEnd::Goto(call.string(0)?));
            }
            if let Some(end) = call.terminal(locator.as_ref())? {
                return Ok(end);
            }
            locator = Some(call.apply(locator)?);
        }
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of input".to_string(),
        Some(Token::Ident(name)) => format!("'{name}'"),
        Some(Token::Str(s)) => format!("string {s:?}"),
        Some(Token::Num(n)) => format!("number {n}"),
        Some(Token::Punct(c)) => format!("'{c}'"),
    }
}

enum ChainEnd {
    Goto(String),
    Locator(Locator),
    Click(Locator),
    Fill(Locator, String),
}

struct Call {
    line: usize,
    method: String,
    args: Vec<Value>,
}

impl Call {
    fn error(&self, message: impl Into<String>) -> ReplayError {
        codegen_error(self.line, message)
    }

    fn string(&self, index: usize) -> ReplayResult<String> {
        match self.args.get(index) {
            Some(Value::Str(s)) => Ok(s.clone()),
            _ => Err(self.error(format!("{}() expects a string argument", self.method))),
        }
    }

    fn option(&self, index: usize, key: &str) -> Option<&Value> {
        match self.args.get(index) {
            Some(Value::Object(fields)) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn check_options(&self, index: usize, allowed: &[&str]) -> ReplayResult<()> {
        match self.args.get(index) {
            None => Ok(()),
            Some(Value::Object(fields)) => match fields.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
                Some((key, _)) => Err(self.error(format!("{}() option '{key}' is not supported", self.method))),
                None => Ok(()),
            },
            Some(_) => Err(self.error(format!("{}() expects an options object", self.method))),
        }
    }

    fn exact(&self, index: usize) -> bool {
        matches!(self.option(index, "exact"), Some(Value::Bool(true)))
    }

    fn text_match(&self) -> ReplayResult<TextMatch> {
        self.check_options(1, &["exact"])?;
        let text = self.string(0)?;
        Ok(if self.exact(1) {
            TextMatch::exact(text)
        } else {
            TextMatch::new(text)
        })
    }

    fn terminal(&self, locator: Option<&Locator>) -> ReplayResult<Option<ChainEnd>> {
        let action = matches!(self.method.as_str(), "click" | "fill");
        if !action {
            return Ok(None);
        }
        let Some(locator) = locator.cloned() else {
            return Err(self.error(format!("{}() needs a locator", self.method)));
        };
        Ok(Some(match self.method.as_str() {
            "fill" => ChainEnd::Fill(locator, self.string(0)?),
            _ => ChainEnd::Click(locator),
        }))
    }

    fn apply(&self, current: Option<Locator>) -> ReplayResult<Locator> {
        let base = |next: Locator| match &current {
            Some(parent) => next.within(parent.clone()),
            None => next,
        };
        let existing = || {
            current
                .clone()
                .ok_or_else(|| self.error(format!("{}() needs a locator", self.method)))
        };

        match self.method.as_str() {
            "getByRole" => {
                self.check_options(1, &["name", "exact"])?;
                let role: AriaRole = self
                    .string(0)?
                    .parse()
                    .map_err(|e: ReplayError| self.error(e.to_string()))?;
                let mut locator = Locator::role(role);
                match self.option(1, "name") {
                    Some(Value::Str(name)) => {
                        locator = locator.with_name(name.clone());
                        if self.exact(1) {
                            locator = locator.exact();
                        }
                    }
                    Some(_) => return Err(self.error("getByRole() name must be a string")),
                    None => {}
                }
                Ok(base(locator))
            }
            "getByText" => Ok(base(Locator::new(Selector::Text(self.text_match()?)))),
            "getByLabel" => Ok(base(Locator::new(Selector::Label(self.text_match()?)))),
            "getByPlaceholder" => Ok(base(Locator::new(Selector::Placeholder(
                self.text_match()?,
            )))),
            "getByTestId" => Ok(base(Locator::test_id(self.string(0)?))),
            "locator" => {
                self.check_options(1, &["hasText"])?;
                let css = Locator::css(&self.string(0)?).map_err(|e| self.error(e.to_string()))?;
                let mut locator = base(css);
                if let Some(text) = self.option(1, "hasText") {
                    let Value::Str(text) = text else {
                        return Err(self.error("hasText must be a string"));
                    };
                    locator = locator.has_text(text.clone());
                }
                Ok(locator)
            }
            "filter" => {
                self.check_options(0, &["hasText", "has"])?;
                let mut locator = existing()?;
                match self.option(0, "hasText") {
                    Some(Value::Str(text)) => locator = locator.has_text(text.clone()),
                    Some(_) => return Err(self.error("hasText must be a string")),
                    None => {}
                }
                match self.option(0, "has") {
                    Some(Value::Chain(inner)) => locator = locator.has(inner.clone()),
                    Some(_) => return Err(self.error("has must be a page locator")),
                    None => {}
                }
                Ok(locator)
            }
            "first" => Ok(existing()?.first()),
            "last" => Ok(existing()?.last()),
            "nth" => match self.args.first() {
                Some(Value::Num(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(existing()?.nth(*n as usize)),
                _ => Err(self.error("nth() expects a non-negative integer")),
            },
            other => Err(self.error(format!("unsupported call '{other}()'"))),
        }
    }
}

/// Import a codegen script
pub fn import(source: &str) -> ReplayResult<Script> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let mut script = Script::new();

    while let Some(token) = parser.peek().cloned() {
        match token {
            Token::Ident(name) if name == "test" && script.name.is_none() => {
                parser.pos += 1;
                if parser.eat_punct('(') {
                    if let Some(Token::Str(title)) = parser.peek().cloned() {
                        parser.pos += 1;
                        script.name = Some(title);
                    }
                }
            }
            Token::Ident(name) if name == "await" => {
                parser.pos += 1;
                script = statement(&mut parser, script)?;
            }
            _ => parser.pos += 1,
        }
    }

    if script.is_empty() {
        return Err(codegen_error(parser.line(), "no page actions found"));
    }
    script.validate()?;
    tracing::debug!(steps = script.len(), "codegen script imported");
    Ok(script)
}

fn statement(parser: &mut Parser, script: Script) -> ReplayResult<Script> {
    let line = parser.line();
    match parser.ident()?.as_str() {
        "page" => Ok(match parser.chain()? {
            ChainEnd::Goto(url) => script.navigate(url),
            ChainEnd::Click(locator) => script.click(locator),
            ChainEnd::Fill(locator, value) => script.fill(locator, value),
            ChainEnd::Locator(_) => {
                return Err(codegen_error(line, "locator is never used"));
            }
        }),
        "expect" => {
            parser.expect_punct('(')?;
            if parser.ident()? != "page" {
                return Err(codegen_error(line, "expect() needs a page locator"));
            }
            let ChainEnd::Locator(locator) = parser.chain()? else {
                return Err(codegen_error(line, "expect() needs a page locator"));
            };
            parser.expect_punct(')')?;
            parser.expect_punct('.')?;
            let matcher = parser.ident()?;
            let args = parser.args()?;
            let call = Call {
                line,
                method: matcher,
                args,
            };
            match call.method.as_str() {
                "toContainText" => Ok(script.expect_contains_text(locator, call.string(0)?)),
                other => Err(call.error(format!("unsupported assertion '{other}'"))),
            }
        }
        other => Err(codegen_error(line, format!("unsupported statement 'await {other}'"))),
    }
}
