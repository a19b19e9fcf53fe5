//! One ingested batch: the verbatim rows plus the records derived from them.
//!
//! A snapshot is built once and never mutated. Scores, ranks and filtered views
//! are computed from it on demand and are not stored here.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::ingest::table::write_rows;
use crate::ingest::types::RawTable;
use crate::normalize::{normalize_rows, retain_named, BotRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadInfo {
    pub source_name: String,
    pub bot_count: usize,
    pub dropped_rows: usize,
    pub with_weapons: usize,
    pub has_points: bool,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Named rows only, in input order.
    pub table: RawTable,
    /// `bots[i]` is derived from `table.rows[i]`.
    pub bots: Vec<BotRecord>,
    pub info: LoadInfo,
}

impl Snapshot {
    pub fn from_table(table: RawTable, source_name: &str) -> Self {
        let RawTable {
            headers,
            rows,
            delimiter,
        } = table;
        let (rows, dropped_rows) = retain_named(rows);
        let bots = normalize_rows(&rows);

        let info = LoadInfo {
            source_name: source_name.to_string(),
            bot_count: bots.len(),
            dropped_rows,
            with_weapons: bots.iter().filter(|b| b.has_weapon()).count(),
            has_points: bots.iter().any(|b| b.points.is_some()),
            loaded_at: Utc::now(),
        };

        Self {
            table: RawTable {
                headers,
                rows,
                delimiter,
            },
            bots,
            info,
        }
    }

    /// Any record carries a weapon description.
    pub fn has_weapon_columns(&self) -> bool {
        self.info.with_weapons > 0
    }

    /// Re-serialize the original rows of every bot named in `population`.
    ///
    /// Rows keep their input order, header order and delimiter; no derived
    /// field is written. Duplicate names export every matching row.
    pub fn export_filtered<'a, I>(&self, population: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a BotRecord>,
    {
        let names: HashSet<&str> = population.into_iter().map(|b| b.name.as_str()).collect();
        let rows = self
            .table
            .rows
            .iter()
            .filter(|r| r.name().is_some_and(|n| names.contains(n)));
        write_rows(&self.table.headers, rows, self.table.delimiter)
    }
}
