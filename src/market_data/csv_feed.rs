// =============================================================================
// CSV bar source — bulk load and incremental polling
// =============================================================================
//
// Record layout: `Date,Open,High,Low,Close,Volume` with a header row.  Rows
// whose numeric fields fail to parse are skipped with a warning; a bad date
// only drops the date, the bar itself is kept.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use super::bar_window::{Bar, BarWindow};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Load bars from a CSV file, keeping only the last `max_rows` valid rows.
pub fn load_bars_csv(path: impl AsRef<Path>, max_rows: usize) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let rows = read_rows(path)?;
    let total = rows.len();

    let mut bars: Vec<Bar> = rows.into_iter().flatten().collect();
    let skipped = total - bars.len();
    let start = bars.len().saturating_sub(max_rows);
    bars.drain(..start);

    info!(
        path = %path.display(),
        rows = total,
        skipped,
        kept = bars.len(),
        "bars loaded from CSV"
    );
    Ok(bars)
}

/// Read every data row of the file.  Each row maps to `Some(bar)` or `None`
/// when it is malformed, so callers can still count rows positionally.
fn read_rows(path: &Path) -> Result<Vec<Option<Bar>>> {
    let reader = csv_reader(true)
        .from_path(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;
    Ok(parse_rows(reader, path, 2))
}

fn csv_reader(has_headers: bool) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Parse records, logging and skipping malformed ones.  `first_line` is the
/// 1-based file line of the first data record.
fn parse_rows<R: Read>(mut reader: csv::Reader<R>, path: &Path, first_line: usize) -> Vec<Option<Bar>> {
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = first_line + idx;
        let parsed = record
            .context("unreadable CSV record")
            .and_then(|r| parse_record(&r));
        match parsed {
            Ok(bar) => rows.push(Some(bar)),
            Err(e) => {
                warn!(path = %path.display(), line, error = %e, "skipping malformed bar row");
                rows.push(None);
            }
        }
    }
    rows
}

fn parse_record(record: &csv::StringRecord) -> Result<Bar> {
    if record.len() < 6 {
        bail!("expected 6 fields, found {}", record.len());
    }

    let date = parse_date(&record[0]);
    if date.is_none() && !record[0].is_empty() {
        debug!(date = &record[0], "unrecognised date format, bar kept undated");
    }

    Ok(Bar {
        date,
        open: parse_price(&record[1], "Open")?,
        high: parse_price(&record[2], "High")?,
        low: parse_price(&record[3], "Low")?,
        close: parse_price(&record[4], "Close")?,
        volume: parse_volume(&record[5])?,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_price(raw: &str, name: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("failed to parse {name} as f64: {raw:?}"))?;
    if !value.is_finite() {
        bail!("{name} is not finite: {raw:?}");
    }
    Ok(value)
}

/// Volume is an integer, but some exporters write it as `1234.0`.
fn parse_volume(raw: &str) -> Result<u64> {
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    let v: f64 = raw
        .parse()
        .with_context(|| format!("failed to parse Volume: {raw:?}"))?;
    if !v.is_finite() || v < 0.0 {
        bail!("Volume must be a non-negative number: {raw:?}");
    }
    Ok(v.round() as u64)
}

// ---------------------------------------------------------------------------
// CsvFeed -- incremental ingestion from an append-only CSV file
// ---------------------------------------------------------------------------

/// Tracks the byte offset of the last complete line ingested from a CSV file
/// and appends only newly completed rows on each [`poll`](CsvFeed::poll).
///
/// A trailing line without a newline is still being written and is left for
/// a later poll.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    path: PathBuf,
    offset: u64,
    rows_consumed: usize,
}

impl CsvFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            rows_consumed: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows completed since the previous poll to `window`.
    ///
    /// Returns the number of bars appended.  Only the last
    /// `window.capacity()` new bars are admitted since older ones would be
    /// evicted immediately.  A file shorter than the consumed offset was
    /// rewritten or rotated and is read again from the start.
    pub fn poll(&mut self, window: &BarWindow) -> Result<usize> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("failed to open bar file {}", self.path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat bar file {}", self.path.display()))?
            .len();

        if len < self.offset {
            warn!(
                path = %self.path.display(),
                len,
                offset = self.offset,
                "bar file shrank, reading again from the start"
            );
            self.offset = 0;
            self.rows_consumed = 0;
        }

        file.seek(SeekFrom::Start(self.offset))
            .with_context(|| format!("failed to seek in bar file {}", self.path.display()))?;
        let mut pending = Vec::new();
        file.read_to_end(&mut pending)
            .with_context(|| format!("failed to read bar file {}", self.path.display()))?;

        let Some(last_newline) = pending.iter().rposition(|&b| b == b'\n') else {
            return Ok(0);
        };
        let complete = &pending[..=last_newline];

        let at_start = self.offset == 0;
        // Header is line 1; data lines are numbered after it.
        let first_line = self.rows_consumed + 2;
        let rows = parse_rows(csv_reader(at_start).from_reader(complete), &self.path, first_line);
        self.offset += complete.len() as u64;
        self.rows_consumed += rows.len();

        let fresh: Vec<Bar> = rows.into_iter().flatten().collect();
        let start = fresh.len().saturating_sub(window.capacity());
        let appended = fresh.len() - start;
        window.extend(fresh.into_iter().skip(start));

        if appended > 0 {
            debug!(path = %self.path.display(), appended, offset = self.offset, "new bars ingested");
        }
        Ok(appended)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
