use serde::{Deserialize, Serialize};

/// Comment marker, always a two-character line prefix.
pub const COMMENT_MARKER: &str = "--";

/// Character closing a keyword's data block.
pub const TERMINATOR: char = '/';

/// Classification of one normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Blank,
    Comment,
    KeywordHeader,
    Data,
    Terminator,
}

/// One row of the normalized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    /// Verbatim content. Comments and quoted substrings are never altered.
    pub text: String,
    /// Content salvaged from after a terminator on the same source line.
    /// Only ever set on `Terminator` lines.
    pub trailing_comment: Option<String>,
    /// 1-based line number in the source file.
    pub line_no: usize,
    /// Set on rows that could not be tokenized safely (unbalanced quote)
    /// or that belong to a multi-record keyword kept verbatim.
    pub opaque: bool,
}

impl Line {
    fn with_kind(kind: LineKind, text: impl Into<String>, line_no: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            trailing_comment: None,
            line_no,
            opaque: false,
        }
    }

    pub fn comment(text: impl Into<String>, line_no: usize) -> Self {
        Self::with_kind(LineKind::Comment, text, line_no)
    }

    pub fn header(name: impl Into<String>, line_no: usize) -> Self {
        Self::with_kind(LineKind::KeywordHeader, name, line_no)
    }

    pub fn data(text: impl Into<String>, line_no: usize) -> Self {
        Self::with_kind(LineKind::Data, text, line_no)
    }

    pub fn opaque_data(text: impl Into<String>, line_no: usize) -> Self {
        Self { opaque: true, ..Self::data(text, line_no) }
    }

    pub fn terminator(trailing_comment: Option<String>, line_no: usize) -> Self {
        Self {
            trailing_comment,
            ..Self::with_kind(LineKind::Terminator, TERMINATOR.to_string(), line_no)
        }
    }

    /// A terminator sharing its row with text that could not be tokenized.
    /// `text` runs up to and including the slash and is kept as it is.
    pub fn opaque_terminator(
        text: impl Into<String>,
        trailing_comment: Option<String>,
        line_no: usize,
    ) -> Self {
        Self {
            trailing_comment,
            opaque: true,
            ..Self::with_kind(LineKind::Terminator, text, line_no)
        }
    }

    /// Append this line's output rows, newline-terminated.
    pub fn render_into(&self, out: &mut String) {
        out.push_str(&self.text);
        out.push('\n');
        if let Some(trailing) = &self.trailing_comment {
            out.push_str(trailing);
            out.push('\n');
        }
    }
}

/// A contiguous `[start, end]` range of lines forming one keyword's data block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    pub name: String,
    /// Index of the `KeywordHeader` line.
    pub start: usize,
    /// Inclusive index of the last line in the block. This is the
    /// `Terminator` line unless `terminated` is false.
    pub end: usize,
    /// Only multi-record keywords may close without a terminator.
    pub terminated: bool,
    pub compressible: bool,
}

impl KeywordSet {
    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnterminatedBlock,
    UnbalancedQuote,
    OrphanData,
    ValidationRejected,
}

/// A structured finding from one compression pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based source line, 0 when the finding concerns the whole file.
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self { kind, line, keyword: None, message: message.into() }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}
