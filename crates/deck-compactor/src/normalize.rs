//! Stage 1: line normalization.
//!
//! Every raw line is classified and split so that each resulting line holds
//! exactly one unit: a keyword name, one data line, a lone terminator, or a
//! comment. After a multi-record keyword the normalizer switches to verbatim
//! mode and keeps lines whole, record slashes included.

use crate::tokenize::{find_cut, find_terminator_past, split_keyword, Cut};
use deck_core::types::{Diagnostic, DiagnosticKind, Line, COMMENT_MARKER, TERMINATOR};
use deck_core::CompactorConfig;

/// Normalized document plus the findings made while building it.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub lines: Vec<Line>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scan,
    Verbatim,
}

/// Line-classification state machine.
pub struct Normalizer<'a> {
    config: &'a CompactorConfig,
    mode: Mode,
    keyword: Option<String>,
    out: Normalized,
}

/// Normalize the whole text of one file.
pub fn normalize(text: &str, config: &CompactorConfig) -> Normalized {
    let mut normalizer = Normalizer::new(config);
    for (idx, raw) in text.lines().enumerate() {
        normalizer.push(raw, idx + 1);
    }
    normalizer.finish()
}

/// Turn content found after a terminator into a legal comment.
fn salvage(rest: &str) -> Option<String> {
    let rest = rest.trim();
    if rest.is_empty() {
        None
    } else if rest.starts_with(COMMENT_MARKER) {
        Some(rest.to_string())
    } else {
        Some(format!("{COMMENT_MARKER} {rest}"))
    }
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a CompactorConfig) -> Self {
        Self {
            config,
            mode: Mode::Scan,
            keyword: None,
            out: Normalized::default(),
        }
    }

    /// Classify one raw line and append the resulting normalized lines.
    pub fn push(&mut self, raw: &str, line_no: usize) {
        let s = raw.trim();
        if s.is_empty() {
            return;
        }
        if s.starts_with(COMMENT_MARKER) {
            self.out.lines.push(Line::comment(s, line_no));
            return;
        }
        match self.mode {
            Mode::Scan => self.push_scan(s, line_no),
            Mode::Verbatim => self.push_verbatim(s, line_no),
        }
    }

    pub fn finish(self) -> Normalized {
        self.out
    }

    fn push_scan(&mut self, s: &str, line_no: usize) {
        let mut content = s;
        if let Some((name, rest)) = split_keyword(s, self.config.max_keyword_len) {
            self.out.lines.push(Line::header(name, line_no));
            self.keyword = Some(name.to_string());
            let rest = rest.trim_start();
            if !self.config.is_compressible(name) {
                self.mode = Mode::Verbatim;
                if !rest.is_empty() {
                    self.push_verbatim(rest, line_no);
                }
                return;
            }
            if rest.is_empty() {
                return;
            }
            content = rest;
        }

        match find_cut(content) {
            Ok(None) => self.push_data(content, line_no),
            Ok(Some(Cut::Comment(at))) => {
                self.push_data(content[..at].trim(), line_no);
                self.out.lines.push(Line::comment(&content[at..], line_no));
            }
            Ok(Some(Cut::Terminator(at))) => {
                self.push_data(content[..at].trim(), line_no);
                self.push_terminator(&content[at + 1..], line_no);
            }
            Err(unbalanced) => {
                let mut diag = Diagnostic::new(
                    DiagnosticKind::UnbalancedQuote,
                    line_no,
                    format!("quote opened at column {} never closes", unbalanced.column + 1),
                );
                if let Some(keyword) = &self.keyword {
                    diag = diag.with_keyword(keyword.clone());
                }
                self.out.diagnostics.push(diag);
                // The row stays whole; a slash past the quote still closes the block.
                match find_terminator_past(content, unbalanced) {
                    Some(at) => self.close_block(Line::opaque_terminator(
                        &content[..=at],
                        salvage(&content[at + 1..]),
                        line_no,
                    )),
                    None => self.out.lines.push(Line::opaque_data(content, line_no)),
                }
            }
        }
    }

    fn push_verbatim(&mut self, s: &str, line_no: usize) {
        if s.starts_with(COMMENT_MARKER) {
            self.out.lines.push(Line::comment(s, line_no));
            return;
        }
        if let Some(rest) = s.strip_prefix(TERMINATOR) {
            self.push_terminator(rest, line_no);
            return;
        }
        let lone_keyword = split_keyword(s, self.config.max_keyword_len)
            .is_some_and(|(_, rest)| {
                let rest = rest.trim_start();
                rest.is_empty() || rest.starts_with(COMMENT_MARKER)
            });
        if lone_keyword {
            self.mode = Mode::Scan;
            self.push_scan(s, line_no);
            return;
        }
        self.out.lines.push(Line::opaque_data(s, line_no));
    }

    fn push_data(&mut self, text: &str, line_no: usize) {
        if !text.is_empty() {
            self.out.lines.push(Line::data(text, line_no));
        }
    }

    fn push_terminator(&mut self, rest: &str, line_no: usize) {
        self.close_block(Line::terminator(salvage(rest), line_no));
    }

    fn close_block(&mut self, terminator: Line) {
        self.out.lines.push(terminator);
        self.mode = Mode::Scan;
        self.keyword = None;
    }
}
