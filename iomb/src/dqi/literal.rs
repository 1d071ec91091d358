//! Literal matrix grammar
//!
//! ```text
//! matrix   := "[" row (";" row)* "]"
//! row      := cell+
//! cell     := "(" "none" ")"  |  "(" int ("," int)* ")"
//! int      := optional "-" digit+
//! ```
//!
//! Whitespace (including newlines) between tokens is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::matrix::DqiMatrix;
use crate::error::{DqiError, DqiResult};
use crate::models::ScoreEntry;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A(?:(?P<punct>[\[\];(),])|(?P<int>-?[0-9]+)|(?P<word>[A-Za-z_][A-Za-z0-9_]*))")
        .expect("token pattern is valid")
});

/// Literal parsing error with position context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset into the literal.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// Zero-based (row, column) of the cell being parsed, if any.
    pub cell: Option<(usize, usize)>,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell {
            Some((row, col)) => write!(
                f,
                "Line {}, offset {}, row {}, column {}: {}",
                self.line, self.offset, row, col, self.message
            ),
            None => write!(f, "Line {}, offset {}: {}", self.line, self.offset, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub fn new(offset: usize, line: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            line,
            cell: None,
            message: message.into(),
        }
    }

    pub fn with_cell(mut self, row: usize, col: usize) -> Self {
        self.cell = Some((row, col));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    OpenBracket,
    CloseBracket,
    Semicolon,
    OpenParen,
    CloseParen,
    Comma,
    Int(i32),
    Word(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::OpenBracket => write!(f, "'['"),
            TokenKind::CloseBracket => write!(f, "']'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::OpenParen => write!(f, "'('"),
            TokenKind::CloseParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Int(v) => write!(f, "'{}'", v),
            TokenKind::Word(w) => write!(f, "'{}'", w),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

/// Parse a matrix literal.
///
/// # Example
/// ```
/// let m = iomb::dqi::literal::parse("[ (1,2) (none) ; (3,4) (5,6) ]").unwrap();
/// assert_eq!(m.shape(), (2, 2));
/// assert!(m.get(0, 1).unwrap().is_missing());
/// ```
pub fn parse(text: &str) -> DqiResult<DqiMatrix> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
        arity: None,
    };
    parser.parse_matrix()
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }

        let caps = TOKEN.captures(trimmed).ok_or_else(|| {
            let c = trimmed.chars().next().unwrap_or(' ');
            ParseError::new(pos, line_of(text, pos), format!("unexpected character '{}'", c))
        })?;

        let kind = if let Some(m) = caps.name("punct") {
            match m.as_str() {
                "[" => TokenKind::OpenBracket,
                "]" => TokenKind::CloseBracket,
                ";" => TokenKind::Semicolon,
                "(" => TokenKind::OpenParen,
                ")" => TokenKind::CloseParen,
                _ => TokenKind::Comma,
            }
        } else if let Some(m) = caps.name("int") {
            let value = m.as_str().parse::<i32>().map_err(|_| {
                ParseError::new(
                    pos,
                    line_of(text, pos),
                    format!("integer '{}' out of range", m.as_str()),
                )
            })?;
            TokenKind::Int(value)
        } else {
            TokenKind::Word(caps["word"].to_string())
        };

        let len = caps.get(0).map_or(1, |m| m.len());
        tokens.push(Token { kind, offset: pos });
        pos += len;
    }

    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Length of the first populated cell.
    arity: Option<usize>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Offset of the next token, or end of input.
    fn offset(&self) -> usize {
        self.peek().map_or(self.text.len(), |t| t.offset)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(offset, line_of(self.text, offset), message)
    }

    fn unexpected(&self, token: Option<&Token>, expected: &str) -> ParseError {
        match token {
            Some(t) => self.error(t.offset, format!("expected {}, found {}", expected, t.kind)),
            None => self.error(
                self.text.len(),
                format!("expected {}, found end of input", expected),
            ),
        }
    }

    fn parse_matrix(&mut self) -> DqiResult<DqiMatrix> {
        match self.next() {
            Some(Token {
                kind: TokenKind::OpenBracket,
                ..
            }) => {}
            other => return Err(self.unexpected(other.as_ref(), "'['").into()),
        }

        let mut rows: Vec<Vec<ScoreEntry>> = Vec::new();
        loop {
            let row_idx = rows.len();
            let row_offset = self.offset();
            let row = self.parse_row(row_idx)?;

            if let Some(first) = rows.first() {
                if row.len() != first.len() {
                    return Err(self
                        .error(
                            row_offset,
                            format!(
                                "row {} has {} cells, expected {}",
                                row_idx,
                                row.len(),
                                first.len()
                            ),
                        )
                        .into());
                }
            }
            rows.push(row);

            match self.next() {
                Some(Token {
                    kind: TokenKind::Semicolon,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::CloseBracket,
                    ..
                }) => break,
                other => return Err(self.unexpected(other.as_ref(), "'(', ';' or ']'").into()),
            }
        }

        if let Some(t) = self.peek() {
            return Err(self
                .error(t.offset, format!("unexpected {} after end of matrix", t.kind))
                .into());
        }

        let cols = rows.first().map_or(0, Vec::len);
        Ok(DqiMatrix::from_rows(rows.len(), cols, rows.into_iter().flatten().collect()))
    }

    fn parse_row(&mut self, row: usize) -> DqiResult<Vec<ScoreEntry>> {
        let mut cells = Vec::new();
        while let Some(Token {
            kind: TokenKind::OpenParen,
            ..
        }) = self.peek()
        {
            let cell = self.parse_cell(row, cells.len())?;
            cells.push(cell);
        }

        if cells.is_empty() {
            let t = self.peek().cloned();
            return Err(self
                .unexpected(t.as_ref(), "'('")
                .with_cell(row, 0)
                .into());
        }
        Ok(cells)
    }

    fn parse_cell(&mut self, row: usize, col: usize) -> DqiResult<ScoreEntry> {
        let open = self.next();
        let open_offset = open.as_ref().map_or(self.text.len(), |t| t.offset);

        let first = self.next();
        let mut values = match first {
            Some(Token {
                kind: TokenKind::Word(ref w),
                offset,
            }) => {
                if w != "none" {
                    return Err(self
                        .error(offset, format!("expected integer or 'none', found '{}'", w))
                        .with_cell(row, col)
                        .into());
                }
                return match self.next() {
                    Some(Token {
                        kind: TokenKind::CloseParen,
                        ..
                    }) => Ok(ScoreEntry::Missing),
                    other => Err(self
                        .unexpected(other.as_ref(), "')'")
                        .with_cell(row, col)
                        .into()),
                };
            }
            Some(Token {
                kind: TokenKind::Int(v),
                ..
            }) => vec![v],
            other => {
                return Err(self
                    .unexpected(other.as_ref(), "integer or 'none'")
                    .with_cell(row, col)
                    .into())
            }
        };

        loop {
            match self.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => match self.next() {
                    Some(Token {
                        kind: TokenKind::Int(v),
                        ..
                    }) => values.push(v),
                    other => {
                        return Err(self
                            .unexpected(other.as_ref(), "integer")
                            .with_cell(row, col)
                            .into())
                    }
                },
                Some(Token {
                    kind: TokenKind::CloseParen,
                    ..
                }) => break,
                None => {
                    return Err(self
                        .error(open_offset, "unbalanced parentheses: missing ')'")
                        .with_cell(row, col)
                        .into())
                }
                other => {
                    return Err(self
                        .unexpected(other.as_ref(), "',' or ')'")
                        .with_cell(row, col)
                        .into())
                }
            }
        }

        match self.arity {
            None => self.arity = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(DqiError::ArityMismatch {
                    location: format!("row {}, column {}", row, col),
                    expected,
                    found: values.len(),
                })
            }
            Some(_) => {}
        }

        Ok(ScoreEntry::Present(values))
    }
}
