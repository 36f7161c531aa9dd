//! Append-only JSON-lines log of extracted records.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::record::Record;

/// Errors from reading or writing the record log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("record log I/O error at {path}: {source}")]
    Io {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Record could not be serialized.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A UTF-8 file holding one JSON record per line.
#[derive(Debug, Clone)]
pub struct RecordLog {
    path: PathBuf,
}

impl RecordLog {
    /// Log at `path`; the file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one record as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or written.
    pub fn append(&self, record: &Record) -> Result<(), StoreError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        // One write call per line keeps each append contiguous.
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "record appended");
        Ok(())
    }

    /// Read every stored record in append order.
    ///
    /// A missing file yields an empty list. Blank lines are ignored and
    /// lines that do not parse as a record are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index.saturating_add(1),
                    error = %e,
                    "skipping malformed record line"
                ),
            }
        }
        Ok(records)
    }
}
