//! Stage 3: run-length rewriting of a keyword block's token stream.
//!
//! A maximal run of two or more identical tokens becomes `<count>*<value>`
//! with the value text untouched. Tokens already in repeat notation are
//! never merged, so `3*0 3*0` stays as it is instead of nesting.

use crate::tokenize::{split_keyword, tokenize};
use deck_core::types::{KeywordSet, Line, LineKind};
use deck_core::CompactorConfig;
use regex::Regex;
use std::sync::LazyLock;

static RE_REPEAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\*(.+)$").unwrap());

pub fn is_repeat_token(token: &str) -> bool {
    token.contains('*')
}

/// Collapse consecutive duplicates.
pub fn encode_runs(tokens: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let mut j = i + 1;
        if !is_repeat_token(token) {
            while j < tokens.len() && tokens[j] == token {
                j += 1;
            }
        }
        let count = j - i;
        if count >= 2 {
            out.push(format!("{count}*{token}"));
        } else {
            out.push(token.to_string());
        }
        i = j;
    }
    out
}

/// Expand one `n*value` token back into its repetitions. Anything else,
/// including the bare default marker `1*`, is returned as a single token.
pub fn expand_token(token: &str) -> Vec<&str> {
    if let Some(caps) = RE_REPEAT.captures(token) {
        if let (Some(count), Some(value)) = (caps.get(1), caps.get(2)) {
            if let Ok(n) = count.as_str().parse::<usize>() {
                return vec![value.as_str(); n];
            }
        }
    }
    vec![token]
}

pub fn expand<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    tokens.into_iter().flat_map(expand_token).collect()
}

/// Whether a data row may start with `token`. A row led by a bare
/// keyword-like token would read back as a keyword header.
pub fn can_lead_row(token: &str, max_keyword_len: usize) -> bool {
    split_keyword(token, max_keyword_len).is_none()
}

fn row_width(tokens: &[String]) -> usize {
    tokens.iter().map(String::len).sum::<usize>() + tokens.len().saturating_sub(1)
}

/// Greedily pack tokens into rows no wider than `width`. A single token
/// longer than `width` gets a row of its own. Rows after the first only
/// break before a token accepted by `can_lead`; `None` when no such break
/// keeps every row within `width`.
pub fn wrap(
    tokens: &[String],
    width: usize,
    can_lead: impl Fn(&str) -> bool,
) -> Option<Vec<String>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut len = 0;
    for (i, token) in tokens.iter().enumerate() {
        if i > start && len + 1 + token.len() > width {
            let cut = (start + 1..=i).rev().find(|&k| can_lead(tokens[k].as_str()))?;
            rows.push(tokens[start..cut].join(" "));
            start = cut;
            len = row_width(&tokens[start..i]);
            if i > start && len + 1 + token.len() > width {
                return None;
            }
        }
        len = if i == start { token.len() } else { len + 1 + token.len() };
    }
    if start < tokens.len() {
        rows.push(tokens[start..].join(" "));
    }
    Some(rows)
}

/// Encode and wrap one comment-free segment onto `out`. A segment whose
/// first token cannot lead a row shares the header's row instead.
fn flush_segment(
    out: &mut Vec<Line>,
    segment: &mut Vec<&str>,
    line_no: usize,
    config: &CompactorConfig,
) -> Option<()> {
    if segment.is_empty() {
        return Some(());
    }
    let mut tokens = encode_runs(segment);
    segment.clear();
    let leads = |t: &str| can_lead_row(t, config.max_keyword_len);

    if leads(tokens[0].as_str()) {
        let rows = wrap(&tokens, config.max_line_width, leads)?;
        out.extend(rows.into_iter().map(|row| Line::data(row, line_no)));
        return Some(());
    }
    // Only data written on the header's own row can get here.
    if out.len() != 1 {
        return None;
    }
    let header = out.pop()?;
    tokens.insert(0, header.text.clone());
    let mut rows = wrap(&tokens, config.max_line_width, leads)?.into_iter();
    out.push(Line { text: rows.next()?, ..header });
    out.extend(rows.map(|row| Line::data(row, line_no)));
    Some(())
}

/// A block kept as it is. Data that followed the keyword on its row goes
/// back there when it would otherwise read back as a keyword.
fn unchanged(block: &[Line], config: &CompactorConfig) -> Vec<Line> {
    let mut out = block.to_vec();
    let rejoin = out.len() > 1
        && out[0].kind == LineKind::KeywordHeader
        && out[1].kind != LineKind::Comment
        && out[1].line_no == out[0].line_no
        && !can_lead_row(&out[1].text, config.max_keyword_len);
    if rejoin {
        let data = out.remove(1);
        out[0].text = format!("{} {}", out[0].text, data.text);
    }
    out
}

/// Rewrite one located block. Non-compressible blocks, and blocks whose
/// data cannot be tokenized or wrapped safely, come back unchanged.
pub fn compress_keyword_set(
    lines: &[Line],
    set: &KeywordSet,
    config: &CompactorConfig,
) -> Vec<Line> {
    let original = &lines[set.start..=set.end];
    if !set.compressible || !set.terminated {
        return unchanged(original, config);
    }
    rewrite(lines, set, config).unwrap_or_else(|| unchanged(original, config))
}

fn rewrite(lines: &[Line], set: &KeywordSet, config: &CompactorConfig) -> Option<Vec<Line>> {
    let mut out = vec![lines[set.start].clone()];
    let mut segment: Vec<&str> = Vec::new();
    let mut segment_line = lines[set.start].line_no;
    for line in &lines[set.start + 1..set.end] {
        match line.kind {
            LineKind::Data => {
                let tokens = tokenize(&line.text).ok()?;
                if segment.is_empty() {
                    segment_line = line.line_no;
                }
                segment.extend(tokens);
            }
            // A run never spans a comment.
            LineKind::Comment => {
                flush_segment(&mut out, &mut segment, segment_line, config)?;
                out.push(line.clone());
            }
            LineKind::KeywordHeader | LineKind::Terminator | LineKind::Blank => {}
        }
    }
    flush_segment(&mut out, &mut segment, segment_line, config)?;
    out.push(lines[set.end].clone());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_runs_example() {
        let tokens = ["0", "0", "0", "1", "1", "1", "3", "1", "4", "3", "2"];
        assert_eq!(encode_runs(&tokens).join(" "), "3*0 3*1 3 1 4 3 2");
    }

    #[test]
    fn test_encode_keeps_value_text() {
        let tokens = ["1.0", "1.0", "1.00", "1"];
        assert_eq!(encode_runs(&tokens), vec!["2*1.0", "1.00", "1"]);
    }

    #[test]
    fn test_encode_leaves_repeat_tokens_alone() {
        let tokens = ["3*0", "3*0", "1*", "1*", "0", "0"];
        assert_eq!(encode_runs(&tokens), vec!["3*0", "3*0", "1*", "1*", "2*0"]);
    }

    #[test]
    fn test_encode_quoted_values() {
        let tokens = ["'A B'", "'A B'", "'C'"];
        assert_eq!(encode_runs(&tokens), vec!["2*'A B'", "'C'"]);
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode_runs(&[]).is_empty());
    }

    #[test]
    fn test_expand_token() {
        assert_eq!(expand_token("3*0.25"), vec!["0.25", "0.25", "0.25"]);
        assert_eq!(expand_token("1*"), vec!["1*"]);
        assert_eq!(expand_token("7"), vec!["7"]);
        assert_eq!(expand_token("2*'A B'"), vec!["'A B'", "'A B'"]);
    }

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn leads(token: &str) -> bool {
        can_lead_row(token, 8)
    }

    #[test]
    fn test_wrap() {
        let tokens = strings(&["aaaa", "bb", "cc", "dddddd"]);
        let any = |_: &str| true;
        assert_eq!(wrap(&tokens, 7, any).unwrap(), vec!["aaaa bb", "cc", "dddddd"]);
        assert_eq!(wrap(&tokens, 100, any).unwrap(), vec!["aaaa bb cc dddddd"]);
        assert_eq!(wrap(&tokens, 3, any).unwrap(), vec!["aaaa", "bb", "cc", "dddddd"]);
    }

    #[test]
    fn test_wrap_never_leads_with_keyword_like_token() {
        let tokens = strings(&["1", "AB", "CD", "2", "EF"]);
        assert_eq!(wrap(&tokens, 8, leads).unwrap(), vec!["1 AB CD", "2 EF"]);
    }

    #[test]
    fn test_wrap_gives_up_without_safe_break() {
        let tokens = strings(&["1", "AB", "CD", "2", "EF"]);
        assert_eq!(wrap(&tokens, 6, leads), None);
    }

    #[test]
    fn test_can_lead_row() {
        assert!(leads("3*AB"));
        assert!(leads("FIP=2"));
        assert!(leads("'AB'"));
        assert!(leads("1*"));
        assert!(!leads("AB"));
        assert!(!leads("PRES"));
    }
}
