// tests/pipeline_sample.rs
// End-to-end over data/sample.csv: ingest -> filter -> rank -> insights -> export.

use nhrl_stats::ingest::providers::FileSource;
use nhrl_stats::ingest::table::parse_table;
use nhrl_stats::insights::leaderboards::build_report;
use nhrl_stats::scoring::{rank, rank_map};
use nhrl_stats::{
    BotRecord, Filter, InsightParams, IngestCoordinator, ScoreConfig, Snapshot, WeaponCategory,
};
use std::sync::Arc;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample.csv");

async fn load() -> Arc<Snapshot> {
    let coord = IngestCoordinator::new(None);
    let outcome = coord.ingest(&FileSource::new(SAMPLE)).await.unwrap();
    outcome.snapshot().unwrap().clone()
}

fn names<'a>(it: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    it.into_iter().collect()
}

#[tokio::test]
async fn sample_loads_with_info() {
    let snap = load().await;
    assert_eq!(snap.info.source_name, "sample.csv");
    assert_eq!(snap.info.bot_count, 10);
    assert_eq!(snap.info.dropped_rows, 1);
    assert_eq!(snap.info.with_weapons, 10);
    assert!(snap.info.has_points);

    for b in &snap.bots {
        for r in [
            b.win_rate_normalized,
            b.ko_win_rate_normalized,
            b.ko_against_rate_normalized,
        ] {
            assert!((0.0..=1.0).contains(&r), "{}: {r}", b.name);
        }
    }

    let scorch = snap.bots.iter().find(|b| b.name == "Scorch").unwrap();
    assert_eq!(scorch.weapon_category, WeaponCategory::Control);
    assert!(!scorch.is_control_non_flame());
}

#[tokio::test]
async fn ranking_and_control_toggle() {
    let snap = load().await;
    let pop: Vec<&BotRecord> = Filter::default().apply(&snap.bots);

    let off = rank(pop.iter().copied(), ScoreConfig::default());
    assert_eq!(
        names(off.iter().take(3).map(|r| r.record.name.as_str())),
        ["Emulsifier", "Clampzilla", "Lynx"]
    );

    let on = rank_map(&rank(
        pop.iter().copied(),
        ScoreConfig::default().with_control_ko(true),
    ));
    assert_eq!(on["Clampzilla"], 5);
    assert_eq!(on["Emulsifier"], 1);
}

#[tokio::test]
async fn insights_over_sample() {
    let snap = load().await;
    let pop: Vec<&BotRecord> = snap.bots.iter().collect();
    let report = build_report(&pop, ScoreConfig::default(), InsightParams::default());

    let c = report.coverage;
    assert_eq!((c.up, c.down, c.new, c.same), (3, 3, 2, 2));

    assert_eq!(report.overperformers[0].row.record.name, "Clampzilla");
    assert_eq!(report.overperformers[0].row.delta, 3);
    assert_eq!(
        names(report.movers_up.iter().map(|e| e.row.record.name.as_str())),
        ["Sawblaze", "Clampzilla", "Emulsifier"]
    );
    assert_eq!(
        names(report.stable.iter().map(|e| e.row.record.name.as_str())),
        ["Cheesecake", "Lifter"]
    );
    assert_eq!(
        names(report.penalty_watchlist.iter().map(|e| e.row.record.name.as_str())),
        ["Rookie Ray"]
    );
    assert_eq!(report.ko_artists[0].row.record.name, "Emulsifier");
    assert!(report
        .control_specialists
        .iter()
        .all(|e| e.row.record.is_control_non_flame()));
    assert!(!report.points_per_fight_leaders.is_empty());
}

#[tokio::test]
async fn filtered_export_reparses_to_original_cells() {
    let snap = load().await;
    let filter = Filter {
        weapon_type: Some("control".into()),
        min_fights: 10,
    };
    let pop = filter.apply(&snap.bots);
    assert_eq!(
        names(pop.iter().map(|b| b.name.as_str())),
        ["Clampzilla", "Scorch"]
    );

    let text = snap.export_filtered(pop.iter().copied()).unwrap();
    let back = parse_table(&text, None).unwrap();
    assert_eq!(back.headers, snap.table.headers);
    assert_eq!(back.rows.len(), 2);

    let originals: Vec<_> = snap
        .table
        .rows
        .iter()
        .filter(|r| matches!(r.name(), Some("Clampzilla" | "Scorch")))
        .collect();
    for (a, b) in back.rows.iter().zip(originals) {
        assert_eq!(a.cells(), b.cells());
    }
}
