//! Append-only output writer with durable sync points

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ComboForgeError, Result};

/// Buffered append-mode writer over the output file.
///
/// `sync` pushes the buffer to the OS and fsyncs the file. Dropping the sink
/// without `close` still makes a best-effort flush.
pub struct AppendSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    pending: u64,
}

impl AppendSink {
    /// Open (or create) the output file for appending
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ComboForgeError::io_at(e, parent))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ComboForgeError::io_at(e, path))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            pending: 0,
        })
    }

    /// Lines written since the last durable sync
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// Append one newline-terminated entry
    pub fn append(&mut self, entry: &str) -> Result<()> {
        let writer = live_writer(&mut self.writer, &self.path)?;
        writer
            .write_all(entry.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| ComboForgeError::io_at(e, &self.path))?;
        self.pending += 1;
        Ok(())
    }

    /// Flush buffered entries and force them to storage
    pub fn sync(&mut self) -> Result<()> {
        let writer = live_writer(&mut self.writer, &self.path)?;
        writer
            .flush()
            .and_then(|_| writer.get_ref().sync_data())
            .map_err(|e| ComboForgeError::io_at(e, &self.path))?;
        self.pending = 0;
        Ok(())
    }

    /// Final sync, then release the file. Calling it twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        let synced = self.sync();
        self.writer = None;
        synced
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

fn live_writer<'a>(writer: &'a mut Option<BufWriter<File>>, path: &Path) -> Result<&'a mut BufWriter<File>> {
    writer
        .as_mut()
        .ok_or_else(|| ComboForgeError::io("output file already closed", Some(path.display().to_string())))
}

impl Drop for AppendSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to flush output on drop");
            }
        }
    }
}
