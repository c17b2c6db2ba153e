//! Filesystem side of deck compression: whole-file read, backup, atomic
//! write and fail-soft batch processing.

pub mod batch;
pub mod local_fs;

pub use batch::{compress_files, BatchReport, FileOutcome};
pub use local_fs::{backup_path, compress_file, write_atomic, BackupStyle, FileReport, WriteOptions};
