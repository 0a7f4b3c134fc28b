//! Batch ingestor: reset, then stream a stop file into the session

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::{IngestConfig, DEFAULT_COMMIT_EVERY};
use crate::error::{IngestError, RecordError, Result};
use crate::parser::parse_line;
use crate::schema::{ResetReport, SchemaManager};
use crate::session::Session;
use opentrain_common::OpentrainError;

/// Per-run knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Rows staged between commits; must be non-zero
    pub commit_every: usize,
    /// Stop after this many lines
    pub max_lines: Option<usize>,
    /// Draw a terminal progress bar
    pub show_progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            commit_every: DEFAULT_COMMIT_EVERY,
            max_lines: None,
            show_progress: false,
        }
    }
}

impl IngestOptions {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            commit_every: config.commit_every,
            max_lines: config.max_lines,
            ..Self::default()
        }
    }

    pub fn with_commit_every(mut self, commit_every: usize) -> Self {
        self.commit_every = commit_every;
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub lines_read: usize,
    pub rows_written: u64,
    /// Commits that wrote at least one row
    pub batches: usize,
    pub reset: ResetReport,
}

/// Reset the schema, then load every line of `path` through `session`
///
/// A malformed line aborts the run. Batches committed before it stay
/// durable; the staged partial batch is dropped.
pub async fn ingest<M, S>(
    path: &Path,
    schema: &mut M,
    session: &mut S,
    options: &IngestOptions,
) -> Result<IngestReport>
where
    M: SchemaManager + ?Sized,
    S: Session + ?Sized,
{
    if options.commit_every == 0 {
        return Err(OpentrainError::config("commit_every must be greater than 0").into());
    }

    let start = Instant::now();
    info!(path = %path.display(), "Resetting schema");
    let reset = schema.reset().await?;

    let total_lines = count_lines(path).await?;
    let row_count = options
        .max_lines
        .map_or(total_lines, |cap| total_lines.min(cap));
    info!(total_lines, row_count, "Counted input lines");

    let pb = progress_bar(row_count, options.show_progress);

    let file = File::open(path).await.map_err(IngestError::io(path))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let mut report = IngestReport {
        reset,
        ..IngestReport::default()
    };
    let mut count = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(IngestError::io(path))?;
        if read == 0 {
            break;
        }

        count += 1;
        if options.max_lines.is_some_and(|cap| count > cap) {
            break;
        }

        let stop = std::str::from_utf8(&buf)
            .map_err(RecordError::Encoding)
            .and_then(parse_line)
            .map_err(|source| IngestError::MalformedRecord { line: count, source })?;
        session.stage(stop);
        report.lines_read = count;

        if count % options.commit_every == 0 {
            flush(session, &mut report).await?;

            let percent = count * 100 / row_count.max(1);
            info!(rows = count, row_count, percent, "Progress");
            pb.set_position(count as u64);
        }
    }

    flush(session, &mut report).await?;
    pb.finish_and_clear();

    info!(
        lines = report.lines_read,
        rows = report.rows_written,
        batches = report.batches,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Done all"
    );

    Ok(report)
}

async fn flush<S: Session + ?Sized>(session: &mut S, report: &mut IngestReport) -> Result<()> {
    let written = session.commit().await?;
    if written > 0 {
        report.rows_written += written;
        report.batches += 1;
        debug!(batch = report.batches, rows = written, "Batch committed");
    }
    Ok(())
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} rows ({percent}%, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Number of lines in `path`; a final line without a newline still counts
pub async fn count_lines(path: &Path) -> Result<usize> {
    let file = File::open(path).await.map_err(IngestError::io(path))?;
    let mut reader = BufReader::new(file);
    let mut count = 0;
    let mut last_byte = None;

    loop {
        let buf = reader.fill_buf().await.map_err(IngestError::io(path))?;
        if buf.is_empty() {
            break;
        }
        count += buf.iter().filter(|&&b| b == b'\n').count();
        last_byte = buf.last().copied();
        let len = buf.len();
        reader.consume(len);
    }

    if last_byte.is_some_and(|b| b != b'\n') {
        count += 1;
    }
    Ok(count)
}
