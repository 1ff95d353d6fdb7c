// Reconciliation record files (JSON)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use assetrec_recon::ReconcileRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: invalid record: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a record. Legacy field names (`assets`, `reconcile_qty`, ...) and
/// numbers written as text are accepted.
pub fn load_record(path: &Path) -> Result<ReconcileRecord, RecordError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_record(&content).map_err(|source| RecordError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_record(content: &str) -> Result<ReconcileRecord, serde_json::Error> {
    serde_json::from_str(content)
}

/// Write a record as pretty JSON with a trailing newline.
pub fn save_record(record: &ReconcileRecord, path: &Path) -> Result<(), RecordError> {
    let write_err = |source| RecordError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record).map_err(|e| write_err(e.into()))?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)
}
