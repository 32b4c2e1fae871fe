use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
    thread::JoinHandle,
};

use crossbeam_channel::{unbounded, Sender};
use time::{
    format_description::{self, FormatItem},
    OffsetDateTime, UtcOffset,
};
use tracing::debug;

use crate::result::{Error, Result};

/// Append-only record of successful downloads.
///
/// All records go through one dedicated writer thread, so concurrent
/// downloads can never interleave within a line. The file is opened in
/// append mode and never truncated.
pub struct CompletionLog {
    sender: Sender<String>,
    writer: JoinHandle<Result<()>>,
    offset: UtcOffset,
    time_format: Arc<Vec<FormatItem<'static>>>,
}

impl CompletionLog {
    pub fn create(path: &Path, offset: UtcOffset) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                Error::filesystem(format!("Could not open {}: {err}", path.display()))
            })?;

        let (sender, receiver) = unbounded::<String>();

        let writer = std::thread::Builder::new()
            .name("completion-log".to_owned())
            .spawn(move || -> Result<()> {
                let mut out = BufWriter::new(file);
                for line in receiver {
                    writeln!(out, "{line}")?;
                    out.flush()?;
                }
                debug!("All records written. Stopping the writer.");
                Ok(())
            })?;

        let time_format = format_description::parse("[hour]:[minute], [day] [month repr:short] [year]")
            .map_err(|err| Error::filesystem(format!("Invalid time format: {err}")))?;

        Ok(Self {
            sender,
            writer,
            offset,
            time_format: Arc::new(time_format),
        })
    }

    /// Hand out a cloneable recording handle for download workers
    pub fn handle(&self) -> CompletionHandle {
        CompletionHandle {
            sender: self.sender.clone(),
            offset: self.offset,
            time_format: self.time_format.clone(),
        }
    }

    /// Drop the sending side and wait for the writer to drain.
    ///
    /// Every handle must be dropped before calling this, or the join
    /// blocks until they are.
    pub fn close(self) -> Result<()> {
        drop(self.sender);
        self.writer
            .join()
            .map_err(|_| Error::filesystem("Completion log writer panicked"))?
    }
}

#[derive(Clone)]
pub struct CompletionHandle {
    sender: Sender<String>,
    offset: UtcOffset,
    time_format: Arc<Vec<FormatItem<'static>>>,
}

impl CompletionHandle {
    /// Queue one success record for the identifier.
    /// Called only after the download completed.
    pub fn record(&self, identifier: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        let stamp = now
            .format(&*self.time_format)
            .map_err(|err| Error::filesystem(format!("Could not format timestamp: {err}")))?;

        let line = format!("\"Timestamp\": {stamp}, \"URL\":\"{identifier}\", \"Download\":True");
        self.sender
            .send(line)
            .map_err(|_| Error::filesystem("Completion log already closed"))
    }
}

/// Plain append-only log for per-artifact analysis lines
/// (Sentiments.txt and Emotions.txt).
pub struct AnalysisLog {
    file: File,
}

impl AnalysisLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                Error::filesystem(format!("Could not open {}: {err}", path.display()))
            })?;
        Ok(Self { file })
    }

    pub fn append(&mut self, line: impl std::fmt::Display) -> Result<()> {
        writeln!(self.file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    fn utc() -> UtcOffset {
        UtcOffset::UTC
    }

    #[test]
    fn records_are_well_formed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("download_log.txt");

        let log = CompletionLog::create(&path, utc()).unwrap();
        let handle = log.handle();
        handle.record("https://example.com/v/1").unwrap();
        drop(handle);
        log.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let re = Regex::new(
            r#"^"Timestamp": \d{2}:\d{2}, \d{2} [A-Z][a-z]{2} \d{4}, "URL":"https://example\.com/v/1", "Download":True$"#,
        )
        .unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(re.is_match(content.lines().next().unwrap()), "{content}");
    }

    #[test]
    fn concurrent_records_never_interleave() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("download_log.txt");

        let log = CompletionLog::create(&path, utc()).unwrap();
        std::thread::scope(|scope| {
            for t in 0..8 {
                let handle = log.handle();
                scope.spawn(move || {
                    for i in 0..50 {
                        handle.record(&format!("https://example.com/{t}/{i}")).unwrap();
                    }
                });
            }
        });
        log.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let re = Regex::new(r#"^"Timestamp": .+, "URL":".+", "Download":True$"#).unwrap();
        assert_eq!(content.lines().count(), 8 * 50);
        for line in content.lines() {
            assert!(re.is_match(line), "corrupted line: {line}");
        }
    }

    #[test]
    fn close_appends_never_truncates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("download_log.txt");

        let log = CompletionLog::create(&path, utc()).unwrap();
        log.handle().record("first").unwrap();
        log.close().unwrap();

        let log = CompletionLog::create(&path, utc()).unwrap();
        log.handle().record("second").unwrap();
        log.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"URL\":\"first\""));
        assert!(lines[1].contains("\"URL\":\"second\""));
    }

    #[test]
    fn analysis_log_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Sentiments.txt");

        let mut log = AnalysisLog::create(&path).unwrap();
        log.append("Sentiment for clip1.mp4: Sentiment(polarity=0.2, subjectivity=0.5)")
            .unwrap();
        log.append("Sentiment for clip2.mp4: Sentiment(polarity=0, subjectivity=0)")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
