/*!
 * Structured literal decoding.
 *
 * Annotation exports embed nested values inside CSV fields using a small
 * literal syntax: `["clip.mp4"]`, `[1.25, 3.5]`, `(1.25, 3.5)`, `{"1": "0"}`.
 * This module decodes that syntax with an explicit grammar. Nothing is ever
 * evaluated: only lists, tuples, maps, strings, numbers, `True`, `False` and
 * `None` are accepted, and nesting depth is bounded.
 */

use std::fmt;

use crate::errors::LiteralError;

/// Maximum nesting depth of containers
pub const MAX_DEPTH: usize = 64;

/// A decoded literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Map entries in source order
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of an int or float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Render a scalar as an identifier string; containers and `None` have no id
    pub fn as_id(&self) -> Option<String> {
        match self {
            Literal::Str(s) => Some(s.clone()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::Float(f) => Some(f.to_string()),
            Literal::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            _ => None,
        }
    }

    /// Elements of a list or tuple
    pub fn items(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) | Literal::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map
    pub fn entries(&self) -> Option<&[(Literal, Literal)]> {
        match self {
            Literal::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Short name of the literal kind, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::None => "none",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "string",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Map(_) => "map",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write_quoted(f, s),
            Literal::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Literal::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Literal::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Double-quoted string using only escapes the parser accepts
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Parse a complete literal; trailing input is an error
pub fn parse_literal(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError::new(self.pos, message)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.sequence(depth, '[', ']').map(Literal::List),
            Some('(') => self.tuple(depth),
            Some('{') => self.map(depth),
            Some('"') | Some('\'') => self.string().map(Literal::Str),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, LiteralError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
        }
        Ok(depth + 1)
    }

    /// Comma-separated values between `open` and `close`, trailing comma allowed
    fn sequence(&mut self, depth: usize, open: char, close: char) -> Result<Vec<Literal>, LiteralError> {
        let depth = self.enter(depth)?;
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.value(depth)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(c) => {
                    return Err(LiteralError::new(
                        self.pos - c.len_utf8(),
                        format!("expected ',' or '{}', found '{}'", close, c),
                    ));
                }
                None => return Err(self.error(format!("unterminated container, expected '{}'", close))),
            }
        }
    }

    fn tuple(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let items = self.sequence(depth, '(', ')')?;
        // `(x)` is a parenthesised value, `(x,)` is a one-element tuple
        let body = &self.src[start..self.pos];
        let body = body.strip_suffix(')').unwrap_or(body);
        if items.len() == 1 && !body.trim_end().ends_with(',') {
            return Ok(items.into_iter().next().unwrap_or(Literal::None));
        }
        Ok(Literal::Tuple(items))
    }

    fn map(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        let depth = self.enter(depth)?;
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Map(entries));
            }
            let key_pos = self.pos;
            let key = self.value(depth)?;
            if matches!(key, Literal::List(_) | Literal::Map(_)) {
                return Err(LiteralError::new(key_pos, format!("{} cannot be a map key", key.kind())));
            }
            self.expect(':')?;
            let value = self.value(depth)?;
            entries.push((key, value));
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Literal::Map(entries)),
                Some(c) => {
                    return Err(LiteralError::new(
                        self.pos - c.len_utf8(),
                        format!("expected ',' or '}}', found '{}'", c),
                    ));
                }
                None => return Err(self.error("unterminated map, expected '}'")),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::new(start, "unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| LiteralError::new(start, "unterminated string"))?;
                    match escaped {
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        'u' => out.push(self.unicode_escape()?),
                        other => {
                            // Unknown escapes are kept verbatim
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let start = self.pos;
        let hex = self
            .src
            .get(start..start + 4)
            .ok_or_else(|| self.error("truncated \\u escape"))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| LiteralError::new(start, format!("invalid \\u escape '{}'", hex)))?;
        self.pos += 4;
        char::from_u32(code).ok_or_else(|| LiteralError::new(start, format!("invalid code point {:#x}", code)))
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let mut is_float = false;
        let mut seen_exp = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' if !is_float && !seen_exp => is_float = true,
                'e' | 'E' if !seen_exp => {
                    seen_exp = true;
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-') | Some('+')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }
        let text: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        if is_float {
            text.parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| LiteralError::new(start, format!("invalid number '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| LiteralError::new(start, format!("invalid number '{}'", text)))
        }
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            other => Err(LiteralError::new(start, format!("unknown name '{}'", other))),
        }
    }
}
