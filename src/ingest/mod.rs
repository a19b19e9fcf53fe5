// src/ingest/mod.rs
//! Batch ingestion: fetch text from a [`SourceProvider`], parse it into a
//! [`RawTable`], normalize, and publish one immutable [`Snapshot`].
//!
//! Fetching is the only await point. Everything after it runs to completion
//! before the snapshot becomes visible, and a newer request always supersedes
//! an older one (see [`IngestCoordinator`]).

pub mod providers;
pub mod table;
pub mod types;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::ingest::types::{RawTable, SourceProvider, SourceText};
use crate::snapshot::Snapshot;

// Recognized columns (header names compared after trimming).
pub const COL_BOT: &str = "Bot";
pub const COL_RANK: &str = "Rank";
pub const COL_RANK_CHANGE: &[&str] = &["Rank Change", "RankChange"];
pub const COL_EVENTS: &str = "Events";
pub const COL_FIGHTS: &str = "Fights";
pub const COL_WINS: &str = "W";
pub const COL_LOSSES: &str = "L";
pub const COL_KOS: &str = "KOs";
pub const COL_WINRATE: &[&str] = &["Winrate", "%", "Percent"];
pub const COL_KO_WINRATE: &str = "KOWinrate";
pub const COL_KOS_AGAINST: &[&str] = &["KO'd", "KOd"];
pub const COL_POINTS: &str = "Points";
pub const COL_WEAPON_TYPE: &str = "WeaponType";
pub const COL_WEAPON_SPECIFIC: &str = "WeaponType-specific";

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_rows_total", "Named rows accepted into a snapshot.");
        describe_counter!(
            "ingest_rows_dropped_total",
            "Rows discarded for lacking a bot name."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch or header parse failures."
        );
        describe_counter!(
            "ingest_superseded_total",
            "Completed ingests discarded because a newer request started."
        );
        describe_histogram!("ingest_parse_ms", "Parse + normalize time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts of the last published snapshot.");
    });
}

/// Parse and normalize fetched text into a snapshot. Fails only if the text
/// has no header row; individual rows never fail.
pub fn build_snapshot(source: &SourceText, delimiter: Option<u8>) -> Result<Snapshot> {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();

    let table: RawTable = table::parse_table(&source.body, delimiter)
        .with_context(|| format!("parsing {}", source.name))?;
    let snapshot = Snapshot::from_table(table, &source.name);

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_rows_total").increment(snapshot.bots.len() as u64);
    counter!("ingest_rows_dropped_total").increment(snapshot.info.dropped_rows as u64);

    tracing::info!(
        source = %source.name,
        bots = snapshot.bots.len(),
        dropped = snapshot.info.dropped_rows,
        with_weapons = snapshot.info.with_weapons,
        has_points = snapshot.info.has_points,
        "batch normalized"
    );
    Ok(snapshot)
}

/// Fetch once from `provider` and build a snapshot (no publication).
pub async fn run_once(provider: &dyn SourceProvider, delimiter: Option<u8>) -> Result<Snapshot> {
    ensure_metrics_described();
    let text = match provider.fetch_text().await {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = ?e, provider = provider.name(), "source unavailable");
            counter!("ingest_source_errors_total").increment(1);
            return Err(e).with_context(|| format!("fetching from {}", provider.name()));
        }
    };
    build_snapshot(&text, delimiter).inspect_err(|_| {
        counter!("ingest_source_errors_total").increment(1);
    })
}

/// What happened to one ingest request.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// This request's snapshot is now current.
    Published(Arc<Snapshot>),
    /// A newer request started before this one finished; its result was dropped.
    Superseded,
}

impl IngestOutcome {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            IngestOutcome::Published(s) => Some(s),
            IngestOutcome::Superseded => None,
        }
    }
}

/// Holds the current snapshot and enforces last-request-wins publication.
#[derive(Debug, Default)]
pub struct IngestCoordinator {
    generation: AtomicU64,
    current: RwLock<Option<Arc<Snapshot>>>,
    delimiter: Option<u8>,
}

impl IngestCoordinator {
    pub fn new(delimiter: Option<u8>) -> Self {
        Self {
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            delimiter,
        }
    }

    /// Latest published snapshot, if any.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match self.current.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Ingest from `provider`. On failure the current snapshot is left as is.
    pub async fn ingest(&self, provider: &dyn SourceProvider) -> Result<IngestOutcome> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, provider = provider.name(), "ingest started");

        let snapshot = run_once(provider, self.delimiter).await?;
        Ok(self.publish(ticket, snapshot))
    }

    fn publish(&self, ticket: u64, snapshot: Snapshot) -> IngestOutcome {
        let mut guard = match self.current.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Checked under the write lock so two completions cannot interleave.
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::info!(ticket, "ingest superseded; discarding result");
            counter!("ingest_superseded_total").increment(1);
            return IngestOutcome::Superseded;
        }
        let snapshot = Arc::new(snapshot);
        *guard = Some(snapshot.clone());
        gauge!("ingest_last_run_ts").set(snapshot.info.loaded_at.timestamp() as f64);
        IngestOutcome::Published(snapshot)
    }
}
