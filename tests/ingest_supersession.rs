// tests/ingest_supersession.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use nhrl_stats::ingest::providers::StaticSource;
use nhrl_stats::ingest::types::{SourceProvider, SourceText};
use nhrl_stats::{IngestCoordinator, IngestOutcome};
use std::time::Duration;

/// Resolves after a delay.
struct SlowSource {
    delay: Duration,
    body: &'static str,
}

#[async_trait]
impl SourceProvider for SlowSource {
    async fn fetch_text(&self) -> Result<SourceText> {
        tokio::time::sleep(self.delay).await;
        Ok(SourceText {
            name: "slow.csv".into(),
            body: self.body.into(),
        })
    }

    fn name(&self) -> &str {
        "slow"
    }
}

struct BrokenSource;

#[async_trait]
impl SourceProvider for BrokenSource {
    async fn fetch_text(&self) -> Result<SourceText> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn newer_request_wins_over_slower_older_one() {
    let coord = IngestCoordinator::new(None);
    let slow = SlowSource {
        delay: Duration::from_millis(50),
        body: "Bot,W\nOld,1\n",
    };
    let fast = StaticSource::new("fast.csv", "Bot,W\nNew1,1\nNew2,2\n");

    // join! polls in order: the slow request takes its ticket first.
    let (older, newer) = tokio::join!(coord.ingest(&slow), coord.ingest(&fast));

    assert!(matches!(older.unwrap(), IngestOutcome::Superseded));
    assert!(matches!(newer.unwrap(), IngestOutcome::Published(_)));

    let cur = coord.current().unwrap();
    assert_eq!(cur.info.source_name, "fast.csv");
    let names: Vec<&str> = cur.bots.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["New1", "New2"]);
    assert_eq!(cur.table.rows.len(), 2);
}

#[tokio::test]
async fn superseded_even_when_newer_request_fails() {
    let coord = IngestCoordinator::new(None);
    let slow = SlowSource {
        delay: Duration::from_millis(20),
        body: "Bot\nA\n",
    };

    let (older, newer) = tokio::join!(coord.ingest(&slow), coord.ingest(&BrokenSource));
    assert!(matches!(older.unwrap(), IngestOutcome::Superseded));
    assert!(newer.is_err());
    assert!(coord.current().is_none());
}

#[tokio::test]
async fn sequential_ingests_replace_whole_snapshot() {
    let coord = IngestCoordinator::new(None);
    coord
        .ingest(&StaticSource::new("a.csv", "Bot,Fights\nA,3\nB,4\n"))
        .await
        .unwrap();
    let first = coord.current().unwrap();

    coord
        .ingest(&StaticSource::new("b.csv", "Bot,Fights\nC,9\n"))
        .await
        .unwrap();
    let second = coord.current().unwrap();

    // No merging; the earlier Arc is untouched.
    assert_eq!(second.bots.len(), 1);
    assert_eq!(second.bots[0].name, "C");
    assert_eq!(first.bots.len(), 2);
}
