use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use super::entities::LogRecord;

/// Interface for abstracting storage of records.
pub trait LogStore {
    /// Appends a single finished record.
    fn append(&self, record: &LogRecord) -> impl Future<Output = Result<()>>;

    /// Reads every record in the order they were written.
    fn read_all(&self) -> impl Future<Output = Result<LogContents>>;
}

impl<T: Deref> LogStore for T
where
    T::Target: LogStore,
{
    fn append(&self, record: &LogRecord) -> impl Future<Output = Result<()>> {
        self.deref().append(record)
    }

    fn read_all(&self) -> impl Future<Output = Result<LogContents>> {
        self.deref().read_all()
    }
}

/// A line of the log that couldn't be turned into a [LogRecord].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based
    pub line_number: usize,
    /// Lossily decoded when the line isn't UTF-8.
    pub content: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogContents {
    pub records: Vec<LogRecord>,
    pub malformed: Vec<MalformedLine>,
}

/// The main realization of [LogStore]: a plain text file with one record per line.
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all_inner(path: &Path) -> Result<LogContents, std::io::Error> {
        debug!("Reading log {path:?}");
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut reader = BufReader::new(file);
        let mut contents = LogContents::default();
        let mut line_number = 0;
        let mut buffer = Vec::new();
        let read_result = loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) => break Ok(()),
                Ok(_) => (),
                Err(e) => break Err(e),
            }
            line_number += 1;
            let raw = buffer.strip_suffix(b"\n").unwrap_or(&buffer[..]);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            // Decoding happens per line, so a stray byte only costs the line it's in.
            let parsed = match std::str::from_utf8(raw) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => line.parse::<LogRecord>().map_err(|e| e.to_string()),
                Err(e) => Err(format!("not valid UTF-8: {e}")),
            };
            match parsed {
                Ok(record) => contents.records.push(record),
                Err(reason) => {
                    // Skip illegal lines. Usually hand edits or a write cut off by a shutdown.
                    let line = String::from_utf8_lossy(raw).into_owned();
                    warn!("Skipping line {line_number} in {path:?} ({line:?}): {reason}");
                    contents.malformed.push(MalformedLine {
                        line_number,
                        content: line,
                        reason,
                    });
                }
            }
        };

        reader.into_inner().unlock_async().await?;
        read_result?;

        Ok(contents)
    }
}

impl LogStore for LogFile {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open log {:?}", self.path))?;

        // The whole line goes out in one write so a reader never sees half a record.
        file.lock_exclusive()?;
        let result = async {
            file.write_all(record.to_line().as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result?;

        debug!("Appended {record} to {:?}", self.path);
        Ok(())
    }

    async fn read_all(&self) -> Result<LogContents> {
        match Self::read_all_inner(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogContents::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read log {:?}", self.path)),
        }
    }
}
