//! Shared data model for deck include-file compression.

pub mod config;
pub mod error;
pub mod types;

pub use config::CompactorConfig;
pub use error::{DeckError, Result};
pub use types::{Diagnostic, DiagnosticKind, KeywordSet, Line, LineKind};
