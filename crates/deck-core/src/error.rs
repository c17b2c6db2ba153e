use crate::types::{Diagnostic, DiagnosticKind};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Unterminated block: keyword {keyword} at line {line} has no terminating slash")]
    UnterminatedBlock { keyword: String, line: usize },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Short machine-readable name, used in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnterminatedBlock { .. } => "unterminated_block",
            Self::Io { .. } => "io",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }

    /// The structured form of a format error, for per-file reports.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Self::UnterminatedBlock { keyword, line } => Some(
                Diagnostic::new(DiagnosticKind::UnterminatedBlock, *line, self.to_string())
                    .with_keyword(keyword.clone()),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
