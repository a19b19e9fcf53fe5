// src/ingest/table.rs
//! Header-delimited text <-> [`RawTable`].
//!
//! Cells are kept as received (no trimming, no type coercion) so that an export
//! of untouched rows re-parses to the same strings.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

use crate::ingest::types::{RawRow, RawTable};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Pick the delimiter that occurs most often in the header line.
/// Ties go to the earlier candidate; `,` when none occur.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text
        .trim_start_matches('\u{feff}')
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();

    let mut best = b',';
    let mut best_count = 0usize;
    for d in CANDIDATE_DELIMITERS {
        let n = header.bytes().filter(|&b| b == d).count();
        if n > best_count {
            best = d;
            best_count = n;
        }
    }
    best
}

/// Parse header + rows. Fails only if there is no header at all.
pub fn parse_table(text: &str, delimiter: Option<u8>) -> Result<RawTable> {
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Arc<[String]> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(anyhow!("input has no header row"));
    }

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        match rec {
            Ok(rec) => {
                let cells = rec.iter().map(str::to_string).collect();
                rows.push(RawRow::new(headers.clone(), cells));
            }
            Err(e) => {
                // Only invalid UTF-8 gets here with a flexible reader; skip the row.
                tracing::debug!(error = %e, row = i + 1, "skipping unreadable row");
            }
        }
    }

    Ok(RawTable {
        headers,
        rows,
        delimiter,
    })
}

/// Serialize `headers` + `rows` back to text using `delimiter`.
pub fn write_rows<'a, I>(headers: &[String], rows: I, delimiter: u8) -> Result<String>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(headers).context("writing header row")?;
    for row in rows {
        wtr.write_record(row.cells()).context("writing row")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("flushing csv writer: {e}"))?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}
