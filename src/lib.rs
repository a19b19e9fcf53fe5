// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod classify;
pub mod config;
pub mod filter;
pub mod ingest;
pub mod insights;
pub mod normalize;
pub mod rank_change;
pub mod scoring;
pub mod snapshot;

// ---- Re-exports for stable public API ----
pub use crate::classify::{classify, is_flamethrower, WeaponCategory};
pub use crate::config::PipelineConfig;
pub use crate::filter::{overview, weapon_type_options, Filter, Overview};
pub use crate::ingest::{IngestCoordinator, IngestOutcome};
pub use crate::insights::leaderboards::{
    build_report, InsightContext, InsightParams, InsightReport,
};
pub use crate::normalize::BotRecord;
pub use crate::rank_change::{parse_rank_change, Direction, RankChange};
pub use crate::scoring::{rank, rank_map, score, Ranked, ScoreConfig};
pub use crate::snapshot::{LoadInfo, Snapshot};
