//! Append-only file system log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::SystemLog;
use crate::error::LogTargetResult;

/// [`SystemLog`] appending one line per call to a file.
///
/// Every line is flushed before `write` returns, so concurrent readers and
/// a crashing process both see complete lines.
pub struct FileLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl FileLog {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> LogTargetResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush any buffered data to disk.
    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().flush()
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

impl SystemLog for FileLog {
    fn write(&self, line: &str) {
        if let Err(e) = self.append(line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write system log line");
        }
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
