//! Rule-row tokenizer and term classifier.
//!
//! A row is split into whitespace-separated terms, except that a parenthesized group
//! or a quoted name runs to its closing delimiter and may contain spaces.

use crate::model::Color;

/// Lexical form of a single term, before it is placed in a match or replace grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lexeme<'a> {
    Wildcard,
    Color(Color),
    Identity(&'a str),
    Offset { dx: i8, dy: i8 },
    OffsetEdited { dx: i8, dy: i8, dr: i8, dg: i8, db: i8 },
    /// A lone character to be resolved through the symbol table.
    Symbol(char),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    /// `#` followed by something other than exactly six hex digits.
    MalformedColor,
    /// A number inside `( )` that does not fit an `i8`.
    OutOfRange(String),
    Unknown,
}

/// Unclosed `(` or `"` in a row; carries the offending fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unterminated(pub String);

/// Split one rule row into raw term texts.
pub fn tokenize_row(row: &str) -> Result<Vec<&str>, Unterminated> {
    let mut terms = Vec::new();
    let bytes = row.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let closer = match bytes[i] {
            b'(' => Some(b')'),
            b'"' => Some(b'"'),
            _ => None,
        };
        if let Some(close) = closer {
            match bytes[i + 1..].iter().position(|&b| b == close) {
                Some(rel) => i += rel + 2,
                None => return Err(Unterminated(row[start..].trim_end().to_string())),
            }
        }
        // Anything glued to the end of a group stays part of the same term.
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        terms.push(&row[start..i]);
    }

    Ok(terms)
}

/// Classify one raw term.
pub fn classify(text: &str) -> Result<Lexeme<'_>, LexError> {
    if text == "*" {
        return Ok(Lexeme::Wildcard);
    }

    if let Some(digits) = text.strip_prefix('#') {
        if digits.is_empty() {
            return Ok(Lexeme::Symbol('#'));
        }
        return Color::from_hex(digits)
            .map(Lexeme::Color)
            .ok_or(LexError::MalformedColor);
    }

    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        if !inner.contains('"') {
            return Ok(Lexeme::Identity(inner));
        }
        return Err(LexError::Unknown);
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        return match parts.as_slice() {
            [dx, dy] => Ok(Lexeme::Offset {
                dx: small_int(dx)?,
                dy: small_int(dy)?,
            }),
            [dx, dy, dr, dg, db] => Ok(Lexeme::OffsetEdited {
                dx: small_int(dx)?,
                dy: small_int(dy)?,
                dr: small_int(dr)?,
                dg: small_int(dg)?,
                db: small_int(db)?,
            }),
            _ => Err(LexError::Unknown),
        };
    }

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Lexeme::Symbol(c)),
        _ => Err(LexError::Unknown),
    }
}

fn small_int(text: &str) -> Result<i8, LexError> {
    let value: i32 = text.parse().map_err(|_| LexError::Unknown)?;
    i8::try_from(value).map_err(|_| LexError::OutOfRange(text.to_string()))
}
