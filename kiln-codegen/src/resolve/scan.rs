//! Linear scanner for `{resource.property}` placeholders.

use crate::{Error, Result};

/// A reference expression found in a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// The full placeholder text, braces included.
    pub expression: &'a str,
    pub name: &'a str,
    pub property: &'a str,
    /// Byte offset of the opening brace.
    pub offset: usize,
}

/// A piece of a scanned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// A doubled brace, standing for a single literal brace.
    Escaped(char),
    Reference(Reference<'a>),
}

/// Split a value into literal text, escaped braces and references.
///
/// Single pass, left to right. A `{` that is not doubled opens a reference
/// which must close before the next brace; a lone `}` is an error.
pub fn scan(value: &str) -> Result<Vec<Token<'_>>> {
    let bytes = value.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    let malformed = |position: usize, reason: &'static str| Error::MalformedExpression {
        value: value.to_string(),
        position,
        reason,
    };

    while i < bytes.len() {
        let brace = bytes[i];
        if brace != b'{' && brace != b'}' {
            i += 1;
            continue;
        }

        if i > literal_start {
            tokens.push(Token::Literal(&value[literal_start..i]));
        }

        if bytes.get(i + 1) == Some(&brace) {
            tokens.push(Token::Escaped(brace as char));
            i += 2;
        } else if brace == b'}' {
            return Err(malformed(i, "unmatched '}'"));
        } else {
            let body_start = i + 1;
            let close = value[body_start..]
                .find(['{', '}'])
                .map(|at| body_start + at)
                .filter(|&at| bytes[at] == b'}')
                .ok_or_else(|| malformed(i, "unclosed '{'"))?;

            let body = &value[body_start..close];
            let (name, property) = body
                .split_once('.')
                .filter(|(name, property)| !name.is_empty() && !property.is_empty())
                .ok_or_else(|| malformed(i, "expected '{resource.property}'"))?;

            tokens.push(Token::Reference(Reference {
                expression: &value[i..=close],
                name,
                property,
                offset: i,
            }));
            i = close + 1;
        }

        literal_start = i;
    }

    if literal_start < bytes.len() {
        tokens.push(Token::Literal(&value[literal_start..]));
    }

    Ok(tokens)
}
