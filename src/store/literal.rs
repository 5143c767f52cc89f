//! Reader and writer for the results module file.
//!
//! The file is an ES module consumed directly by the web UI:
//!
//! ```text
//! // Расширенные научные описания для каждого модуля
//! export const topicDescriptions = {
//!   "1": {
//!     title: "...",
//!     description: "..."
//!   }
//! };
//! ```
//!
//! The reader accepts the object-literal subset this writer emits plus the small
//! variations a hand edit introduces: single-quoted strings, identifier or numeric
//! keys, trailing commas and comments. Nothing is ever evaluated.

use crate::generation::Description;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

pub const HEADER_COMMENT: &str = "// Расширенные научные описания для каждого модуля";
pub const EXPORT_NAME: &str = "topicDescriptions";

pub type Descriptions = BTreeMap<String, Description>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct LiteralError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Numeric ids compare as integers and sort before non-numeric ids, which
/// compare lexicographically.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Double-quoted string literal body for `value`
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0B}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

pub fn serialize(descriptions: &Descriptions) -> String {
    let mut ids: Vec<&String> = descriptions.keys().collect();
    ids.sort_by(|a, b| compare_ids(a, b));

    let mut lines = vec![
        HEADER_COMMENT.to_string(),
        format!("export const {} = {{", EXPORT_NAME),
    ];
    for (index, id) in ids.iter().enumerate() {
        let entry = &descriptions[id.as_str()];
        let separator = if index + 1 == ids.len() { "" } else { "," };
        lines.push(format!("  \"{}\": {{", escape(id)));
        lines.push(format!("    title: \"{}\",", escape(&entry.title)));
        lines.push(format!("    description: \"{}\"", escape(&entry.description)));
        lines.push(format!("  }}{}", separator));
    }
    lines.push("};".to_string());
    lines.push(String::new());
    lines.join("\n")
}

pub fn parse(text: &str) -> Result<Descriptions, LiteralError> {
    Reader::new(text).module()
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn new(text: &str) -> Self {
        Self {
            chars: text.trim_start_matches('\u{FEFF}').chars().collect(),
            pos: 0,
        }
    }

    fn module(mut self) -> Result<Descriptions, LiteralError> {
        self.skip_trivia()?;
        self.keyword("export")?;
        self.keyword("const")?;
        let name = self.identifier()?;
        if name != EXPORT_NAME {
            return Err(self.error(format!("expected export `{}`, found `{}`", EXPORT_NAME, name)));
        }
        self.skip_trivia()?;
        self.expect('=')?;
        let descriptions = self.entries()?;
        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.pos += 1;
        }
        self.skip_trivia()?;
        if self.pos < self.chars.len() {
            return Err(self.error("unexpected content after the export"));
        }
        Ok(descriptions)
    }

    fn entries(&mut self) -> Result<Descriptions, LiteralError> {
        let mut descriptions = Descriptions::new();
        self.skip_trivia()?;
        self.expect('{')?;
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(descriptions);
            }
            let id = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            let description = self.description()?;
            if descriptions.insert(id.clone(), description).is_some() {
                return Err(self.error(format!("duplicate topic id {:?}", id)));
            }
            self.separator()?;
        }
    }

    fn description(&mut self) -> Result<Description, LiteralError> {
        self.skip_trivia()?;
        self.expect('{')?;
        let mut title = None;
        let mut body = None;
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let field = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.string()?;
            match field.as_str() {
                "title" => title = Some(value),
                "description" => body = Some(value),
                // extra string fields are tolerated and dropped
                _ => {}
            }
            self.separator()?;
        }
        match (title, body) {
            (Some(title), Some(description)) => Ok(Description { title, description }),
            (None, _) => Err(self.error("entry is missing `title`")),
            (_, None) => Err(self.error("entry is missing `description`")),
        }
    }

    /// `,` before the next member, or nothing before the closing brace
    fn separator(&mut self) -> Result<(), LiteralError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                Ok(())
            }
            Some('}') => Ok(()),
            Some(c) => Err(self.error(format!("expected `,` or `}}`, found {:?}", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') => self.string(),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            _ => self.identifier(),
        }
    }

    fn identifier(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.pos += 1;
        }
        if start == self.pos || self.chars[start].is_ascii_digit() {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn keyword(&mut self, word: &str) -> Result<(), LiteralError> {
        let found = self.identifier()?;
        if found != word {
            return Err(self.error(format!("expected `{}`, found `{}`", word, found)));
        }
        let before = self.pos;
        self.skip_trivia()?;
        if before == self.pos {
            return Err(self.error(format!("expected whitespace after `{}`", word)));
        }
        Ok(())
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = match self.next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a string literal")),
        };
        let mut out = String::new();
        loop {
            match self.next() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\n') | Some('\r') => {
                    return Err(self.error("unescaped line break in string"))
                }
                Some('\\') => self.escape_sequence(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape_sequence(&mut self, out: &mut String) -> Result<(), LiteralError> {
        match self.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('b') => out.push('\u{08}'),
            Some('0') if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            Some('u') => {
                let ch = self.unicode_escape()?;
                out.push(ch);
            }
            // line continuation
            Some('\n') => {}
            Some('\r') => {
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            Some(c @ ('\\' | '"' | '\'' | '/')) => out.push(c),
            Some(c) => return Err(self.error(format!("unsupported escape `\\{}`", c))),
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let high = self.code_unit()?;
        if (0xD800..0xDC00).contains(&high) {
            if self.peek() == Some('\\') && self.chars.get(self.pos + 1) == Some(&'u') {
                self.pos += 2;
                let low = self.code_unit()?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error("invalid surrogate pair"));
                }
            }
            return Err(self.error("unpaired surrogate in \\u escape"));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid \\u escape"))
    }

    /// Hex digits of `\uXXXX` or `\u{X...}`
    fn code_unit(&mut self) -> Result<u32, LiteralError> {
        let digits: String = if self.peek() == Some('{') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c != '}') {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            self.expect('}')?;
            digits
        } else {
            let end = (self.pos + 4).min(self.chars.len());
            let digits: String = self.chars[self.pos..end].iter().collect();
            self.pos = end;
            digits
        };
        let valid = !digits.is_empty()
            && digits.len() <= 6
            && digits.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(self.error(format!("invalid \\u escape `{}`", digits)));
        }
        u32::from_str_radix(&digits, 16).map_err(|e| self.error(e.to_string()))
    }

    /// Whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{FEFF}' => self.pos += 1,
                Some('/') if self.chars.get(self.pos + 1) == Some(&'/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.pos += 2;
                    loop {
                        match self.next() {
                            None => return Err(self.error("unterminated comment")),
                            Some('*') if self.peek() == Some('/') => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{}`, found {:?}", expected, c))),
            None => Err(self.error(format!("expected `{}`, found end of input", expected))),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|&&c| c == '\n').count() + 1;
        let column = consumed.iter().rev().take_while(|&&c| c != '\n').count() + 1;
        LiteralError {
            line,
            column,
            message: message.into(),
        }
    }
}
