//! Batch processing: every file is independent, and one file's failure
//! never stops the others.

use crate::local_fs::{compress_file, FileReport, WriteOptions};
use deck_compactor::DeckCompactor;
use deck_core::error::Result;
use deck_core::types::Diagnostic;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed(FileReport),
    Failed {
        path: PathBuf,
        kind: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagnostic: Option<Diagnostic>,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Processed(report) => &report.path,
            Self::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Aggregated outcomes, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.is_failed()).count()
    }

    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Processed(r) if r.written))
            .count()
    }

    /// Non-zero when any file could not be read or parsed.
    pub fn exit_code(&self) -> i32 {
        if self.failed() > 0 { 1 } else { 0 }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn process_one(path: &Path, compactor: &DeckCompactor, options: &WriteOptions) -> FileOutcome {
    match compress_file(path, compactor, options) {
        Ok(report) => FileOutcome::Processed(report),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping deck");
            FileOutcome::Failed {
                path: path.to_path_buf(),
                kind: e.kind().to_string(),
                message: e.to_string(),
                diagnostic: e.to_diagnostic(),
            }
        }
    }
}

/// Compress every file in `paths`.
pub fn compress_files<P>(
    paths: &[P],
    compactor: &DeckCompactor,
    options: &WriteOptions,
) -> BatchReport
where
    P: AsRef<Path> + Sync,
{
    let files: Vec<FileOutcome> = if options.parallel {
        paths
            .par_iter()
            .map(|p| process_one(p.as_ref(), compactor, options))
            .collect()
    } else {
        paths
            .iter()
            .map(|p| process_one(p.as_ref(), compactor, options))
            .collect()
    };
    let report = BatchReport { files };
    info!(
        files = report.files.len(),
        written = report.written(),
        failed = report.failed(),
        "batch finished"
    );
    report
}
