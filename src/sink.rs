use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::Snapshot;

/// Destination for content snapshots.
///
/// Emission may fail; the poll loop treats those failures as non-fatal, so
/// implementations do not need their own retry logic.
#[allow(async_fn_in_trait)]
pub trait Sink {
    async fn emit(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Prints each snapshot to stdout inside a decorative box
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    async fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        let width = snapshot
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(24, 80);
        let rule = "═".repeat(width);

        println!("\n{}", rule);
        println!(
            "📊 Scraped at {}",
            snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("{}", rule);
        println!("{}", snapshot.text);
        println!("{}\n", rule);
        Ok(())
    }
}

/// Appends each snapshot to a log file, the durable output the offline
/// extraction pass consumes
#[derive(Debug)]
pub struct FileSink {
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Open (creating if needed) the log file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Sink for FileSink {
    async fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(
            self.file,
            "--- {} ---",
            snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.file, "{}", snapshot.text)?;
        writeln!(self.file)?;
        self.file
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(())
    }
}

/// Fans one snapshot out to two sinks.
///
/// Both sinks are attempted even when the first fails; the first error
/// encountered is the one reported.
#[derive(Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Sink, B: Sink> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Sink, B: Sink> Sink for Tee<A, B> {
    async fn emit(&mut self, snapshot: &Snapshot) -> Result<()> {
        let first = self.first.emit(snapshot).await;
        let second = self.second.emit(snapshot).await;
        first.and(second)
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
