//! Quote-aware scanning of stripped line text.

use deck_core::types::{COMMENT_MARKER, TERMINATOR};
use regex::Regex;
use std::sync::LazyLock;

static RE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// A quote character that is never closed on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbalancedQuote {
    /// 0-based byte column of the opening quote.
    pub column: usize,
}

/// First position where a line must be cut, outside any quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cut {
    Terminator(usize),
    Comment(usize),
}

fn is_quote(b: u8) -> bool {
    b == b'\'' || b == b'"'
}

/// Locate the first terminator or inline comment marker outside quotes.
pub fn find_cut(s: &str) -> Result<Option<Cut>, UnbalancedQuote> {
    let bytes = s.as_bytes();
    let marker = COMMENT_MARKER.as_bytes();
    let mut quote: Option<(u8, usize)> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some((q, _)) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        if is_quote(b) {
            quote = Some((b, i));
        } else if b == TERMINATOR as u8 {
            return Ok(Some(Cut::Terminator(i)));
        } else if bytes[i..].starts_with(marker) {
            return Ok(Some(Cut::Comment(i)));
        }
    }
    match quote {
        Some((_, column)) => Err(UnbalancedQuote { column }),
        None => Ok(None),
    }
}

/// Terminator position on a line whose quote never closes. The unclosed
/// quote is read as ordinary text and scanning resumes right after it.
pub fn find_terminator_past(s: &str, unbalanced: UnbalancedQuote) -> Option<usize> {
    let mut offset = unbalanced.column + 1;
    loop {
        match find_cut(&s[offset..]) {
            Ok(Some(Cut::Terminator(at))) => return Some(offset + at),
            Ok(Some(Cut::Comment(_))) | Ok(None) => return None,
            Err(UnbalancedQuote { column }) => offset += column + 1,
        }
    }
}

/// Split data text into whitespace-delimited tokens. A quoted literal,
/// spaces included, stays inside the token it occurs in.
pub fn tokenize(s: &str) -> Result<Vec<&str>, UnbalancedQuote> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<(u8, usize)> = None;
    for (i, b) in s.bytes().enumerate() {
        if let Some((q, _)) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        if b.is_ascii_whitespace() {
            if let Some(st) = start.take() {
                tokens.push(&s[st..i]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        if is_quote(b) {
            quote = Some((b, i));
        }
    }
    if let Some((_, column)) = quote {
        return Err(UnbalancedQuote { column });
    }
    if let Some(st) = start {
        tokens.push(&s[st..]);
    }
    Ok(tokens)
}

/// Whether `token` is a keyword name: an uppercase letter followed by
/// uppercase letters, digits or underscores, at most `max_len` long.
pub fn is_keyword_name(token: &str, max_len: usize) -> bool {
    token.len() <= max_len && RE_KEYWORD.is_match(token)
}

/// Split a leading keyword name off `s`. Returns the name and the
/// remainder when the identifier is followed by nothing, whitespace, a
/// terminator or a comment marker.
pub fn split_keyword(s: &str, max_len: usize) -> Option<(&str, &str)> {
    let end = s
        .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
        .unwrap_or(s.len());
    let (name, rest) = s.split_at(end);
    if !is_keyword_name(name, max_len) {
        return None;
    }
    let bounded = rest.is_empty()
        || rest.starts_with(|c: char| c.is_whitespace())
        || rest.starts_with(TERMINATOR)
        || rest.starts_with(COMMENT_MARKER);
    bounded.then_some((name, rest))
}
