//! Local filesystem operations for one deck file.

use deck_compactor::{DeckCompactor, GuardDecision};
use deck_core::error::{DeckError, Result};
use deck_core::types::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How the original file is named when it is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStyle {
    /// `deck.inc` -> `deck.inc<suffix>`
    Suffix(String),
    /// `deck.inc` -> `deck.inc.<UTC timestamp>.orig`
    Timestamped,
}

impl Default for BackupStyle {
    fn default() -> Self {
        Self::Suffix(".orig".into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Keep the original under a derived name before overwriting it.
    pub backup: Option<BackupStyle>,
    /// Process batch files on the rayon pool.
    pub parallel: bool,
}

impl WriteOptions {
    pub fn keep_original(mut self) -> Self {
        self.backup = Some(BackupStyle::default());
        self
    }

    pub fn with_backup(mut self, style: BackupStyle) -> Self {
        self.backup = Some(style);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Per-file outcome of a successful pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub decision: GuardDecision,
    pub original_bytes: usize,
    pub compressed_bytes: usize,
    pub keyword_sets: usize,
    /// Whether the target was overwritten.
    pub written: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derive the backup path for `path`.
pub fn backup_path(path: &Path, style: &BackupStyle) -> PathBuf {
    let name = file_name(path);
    match style {
        BackupStyle::Suffix(suffix) => path.with_file_name(format!("{name}{suffix}")),
        BackupStyle::Timestamped => {
            let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
            path.with_file_name(format!("{name}.{stamp}.orig"))
        }
    }
}

/// Write `contents` to a sibling temporary file and rename it over `path`,
/// so a crash mid-write never leaves a truncated target.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name(path), uuid::Uuid::new_v4()));
    let written = fs::File::create(&tmp).and_then(|mut f| {
        f.write_all(contents.as_bytes())?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(DeckError::io(path, e));
    }
    Ok(())
}

/// Read, compress and rewrite one file in place.
///
/// The target is left untouched when the pass fails or when the output
/// equals the input. A requested backup is in place before the rename.
pub fn compress_file(
    path: &Path,
    compactor: &DeckCompactor,
    options: &WriteOptions,
) -> Result<FileReport> {
    let original = fs::read_to_string(path).map_err(|e| DeckError::io(path, e))?;
    let result = compactor.compress(&original)?;

    let mut report = FileReport {
        path: path.to_path_buf(),
        decision: result.decision,
        original_bytes: result.original_len,
        compressed_bytes: result.compressed_len,
        keyword_sets: result.keyword_sets,
        written: false,
        backup: None,
        diagnostics: result.diagnostics,
    };

    if result.output != original {
        if let Some(style) = &options.backup {
            let backup = backup_path(path, style);
            fs::write(&backup, &original).map_err(|e| DeckError::io(&backup, e))?;
            debug!(backup = %backup.display(), "kept original");
            report.backup = Some(backup);
        }
        write_atomic(path, &result.output)?;
        report.written = true;
    }

    info!(
        path = %path.display(),
        decision = ?report.decision,
        original_bytes = report.original_bytes,
        compressed_bytes = report.compressed_bytes,
        written = report.written,
        "deck processed"
    );
    Ok(report)
}
