//! Append-only record log.
//!
//! One `LogSink` is opened at startup and handed down by `&mut` to whoever
//! needs to write a record. Lines look like
//! `2024/01/31 14:02:11 INFO: User: ship the report`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use tracing::warn;

use crate::error::{BotError, Result};

pub struct LogSink<W: Write = File> {
    writer: W,
}

impl LogSink<File> {
    /// Open (or create) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| BotError::LogSink {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> LogSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one INFO record. Newlines inside `message` are escaped so the
    /// record stays on a single line.
    pub fn info(&mut self, message: &str) {
        let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S");
        let line = format!("{} INFO: {}\n", timestamp, escape_newlines(message));
        // A failed log write must not take the command down with it.
        if let Err(e) = self
            .writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            warn!("Failed to write log record: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn escape_newlines(message: &str) -> String {
    message.replace("\r\n", "\\n").replace('\n', "\\n").replace('\r', "\\n")
}
