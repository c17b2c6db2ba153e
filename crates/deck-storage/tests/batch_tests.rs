//! Batch processing over real files.

use deck_compactor::{DeckCompactor, GuardDecision, StructuralValidator};
use deck_storage::{compress_files, BackupStyle, FileOutcome, WriteOptions};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const GOOD: &str = "PORO\n0.2 0.2 0.2 0.2\n/\nPERMX\n100 100 100 250\n/\n";
const BAD: &str = "SATNUM\n1 1 1 1\n2 2 2 2\n";
const TIGHT: &str = "PORO\n1 2 3 /\n";

fn setup() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let files = [("good.inc", GOOD), ("bad.inc", BAD), ("tight.inc", TIGHT)];
    let paths = files
        .iter()
        .map(|(name, body)| {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

#[test]
fn test_batch_continues_after_failure() {
    let (dir, mut paths) = setup();
    paths.push(dir.path().join("missing.inc"));

    let report = compress_files(&paths, &DeckCompactor::default(), &WriteOptions::default());

    assert_eq!(report.files.len(), 4);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.written(), 1);
    assert_eq!(report.exit_code(), 1);

    assert_eq!(
        fs::read_to_string(&paths[0]).unwrap(),
        "PORO\n4*0.2\n/\nPERMX\n3*100 250\n/\n"
    );
    assert_eq!(fs::read_to_string(&paths[1]).unwrap(), BAD);
    assert_eq!(fs::read_to_string(&paths[2]).unwrap(), TIGHT);

    match &report.files[1] {
        FileOutcome::Failed { kind, message, diagnostic, .. } => {
            assert_eq!(kind, "unterminated_block");
            assert!(message.contains("SATNUM"));
            let diagnostic = diagnostic.as_ref().unwrap();
            assert_eq!(diagnostic.keyword.as_deref(), Some("SATNUM"));
            assert_eq!(diagnostic.line, 1);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    match &report.files[3] {
        FileOutcome::Failed { kind, diagnostic, .. } => {
            assert_eq!(kind, "io");
            assert!(diagnostic.is_none());
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_batch_parallel_matches_sequential() {
    let (_seq_dir, seq_paths) = setup();
    let (_par_dir, par_paths) = setup();
    let compactor = DeckCompactor::default();

    let sequential = compress_files(&seq_paths, &compactor, &WriteOptions::default());
    let parallel = compress_files(&par_paths, &compactor, &WriteOptions::default().parallel(true));

    assert_eq!(sequential.failed(), parallel.failed());
    assert_eq!(sequential.written(), parallel.written());
    for (a, b) in seq_paths.iter().zip(&par_paths) {
        assert_eq!(fs::read_to_string(a).unwrap(), fs::read_to_string(b).unwrap());
    }
    for (outcome, path) in parallel.files.iter().zip(&par_paths) {
        assert_eq!(outcome.path(), path.as_path());
    }
}

#[test]
fn test_batch_keeps_originals() {
    let (dir, paths) = setup();
    let options = WriteOptions::default().keep_original();
    let report = compress_files(&paths, &DeckCompactor::default(), &options);

    assert_eq!(fs::read_to_string(dir.path().join("good.inc.orig")).unwrap(), GOOD);
    assert!(!dir.path().join("bad.inc.orig").exists());
    assert!(!dir.path().join("tight.inc.orig").exists());
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_batch_timestamped_backup() {
    let (dir, paths) = setup();
    let options = WriteOptions::default().with_backup(BackupStyle::Timestamped);
    let report = compress_files(&paths[..1], &DeckCompactor::default(), &options);

    assert_eq!(report.exit_code(), 0);
    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("good.inc.") && n.ends_with(".orig"))
        .collect();
    assert_eq!(backups.len(), 1);
}

#[test]
fn test_batch_with_validator_rejection() {
    let (_dir, paths) = setup();
    let reject = |_: &str| -> anyhow::Result<()> { anyhow::bail!("simulator parser refused deck") };
    let compactor = DeckCompactor::default().with_validator(Arc::new(reject));
    let report = compress_files(&paths[..1], &compactor, &WriteOptions::default());

    assert_eq!(report.exit_code(), 0);
    match &report.files[0] {
        FileOutcome::Processed(r) => {
            assert_eq!(r.decision, GuardDecision::ValidatorRejected);
            assert!(!r.written);
            assert_eq!(r.diagnostics.len(), 1);
        }
        other => panic!("expected processed, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), GOOD);
}

#[test]
fn test_batch_with_structural_validator() {
    let (_dir, paths) = setup();
    let compactor =
        DeckCompactor::default().with_validator(Arc::new(StructuralValidator::default()));
    let report = compress_files(&paths[..1], &compactor, &WriteOptions::default());
    assert_eq!(report.written(), 1);
}

#[test]
fn test_batch_report_json() {
    let (_dir, paths) = setup();
    let report = compress_files(&paths, &DeckCompactor::default(), &WriteOptions::default());
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let files = value["files"].as_array().unwrap();
    assert_eq!(files[0]["status"], "processed");
    assert_eq!(files[0]["decision"], "committed");
    assert_eq!(files[1]["status"], "failed");
    assert_eq!(files[2]["decision"], "not_smaller");
}

#[test]
fn test_batch_empty() {
    let paths: Vec<PathBuf> = Vec::new();
    let report = compress_files(&paths, &DeckCompactor::default(), &WriteOptions::default());
    assert!(report.files.is_empty());
    assert_eq!(report.exit_code(), 0);
}
