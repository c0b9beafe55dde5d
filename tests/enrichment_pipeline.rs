// tests/enrichment_pipeline.rs
//! End-to-end pipeline tests against an in-memory player repository.

use pretty_assertions::assert_eq;
use prop_enricher::{
    Artifact, Destination, EnrichmentPipeline, EntityRecord, FetchFailure, FetchFailureReason,
    IdentifierExtractor, PlayerFetcher, PlayerId, PlayerRepository, ResultSink, SourceDocument,
    SourceFormat,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Serves players from a map; anything not in it answers 404.
struct InMemoryPlayers {
    players: HashMap<String, EntityRecord>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryPlayers {
    fn with_players(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            players: ids.iter().map(|id| (id.to_string(), player(id))).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl PlayerRepository for InMemoryPlayers {
    async fn fetch_player(&self, id: &PlayerId) -> Result<EntityRecord, FetchFailure> {
        self.calls.lock().push(id.to_string());
        // Vary latency so workers finish out of order.
        let jitter = id.as_str().bytes().map(u64::from).sum::<u64>() % 7;
        tokio::time::sleep(Duration::from_millis(jitter)).await;

        self.players
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| FetchFailure::bad_status(id.clone(), 404, "HTTP 404 Not Found"))
    }
}

fn player(id: &str) -> EntityRecord {
    EntityRecord {
        id: PlayerId::new(id).unwrap(),
        name: format!("Player {}", id),
        position: "G".to_string(),
        team: "LAC".to_string(),
        team_name: "Lunar Owls".to_string(),
        market: "Lunar Owls".to_string(),
        image_url: format!("https://images.example/{}.png", id),
        league: "UNRIVALED".to_string(),
        updated_at: "2025-01-30T10:00:00-05:00".to_string(),
        created_at: "2025-01-10T09:00:00-05:00".to_string(),
        record_type: "new_player".to_string(),
    }
}

fn projections(ids: &[&str]) -> SourceDocument {
    let records: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "type": "projection",
                "attributes": {"stat_display_name": "Points"},
                "relationships": {"new_player": {"data": {"id": id, "type": "new_player"}}}
            })
        })
        .collect();
    let text = json!({ "data": records }).to_string();
    SourceDocument::from_json(&text, SourceFormat::Projections).unwrap()
}

fn pipeline(
    repo: Arc<InMemoryPlayers>,
    workers: usize,
) -> EnrichmentPipeline<PlayerFetcher> {
    EnrichmentPipeline::new(
        IdentifierExtractor::new(),
        PlayerFetcher::with_workers(repo, workers),
    )
}

fn record_ids(records: &[EntityRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn missing_player_is_reported_and_others_still_emitted() {
    let repo = InMemoryPlayers::with_players(&["a"]);

    let outcome = pipeline(repo, 1)
        .run(&projections(&["a", "b"]))
        .await
        .unwrap();

    assert_eq!(record_ids(&outcome.records), vec!["a"]);
    assert_eq!(outcome.records[0], player("a"));
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].identifier.as_str(), "b");
    assert!(matches!(
        outcome.failures[0].reason,
        FetchFailureReason::BadStatus { status: 404, .. }
    ));
}

#[tokio::test]
async fn empty_document_makes_no_requests() {
    let repo = InMemoryPlayers::with_players(&["a"]);

    let outcome = pipeline(repo.clone(), 4)
        .run(&projections(&[]))
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.attempted, 0);
    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn duplicate_references_are_fetched_once() {
    let repo = InMemoryPlayers::with_players(&["a", "b"]);

    let outcome = pipeline(repo.clone(), 2)
        .run(&projections(&["a", "a", "b", "a"]))
        .await
        .unwrap();

    assert_eq!(record_ids(&outcome.records), vec!["a", "b"]);
    let mut calls = repo.calls();
    calls.sort();
    assert_eq!(calls, vec!["a", "b"]);
}

#[tokio::test]
async fn failing_subset_is_reported_exactly_once() {
    let ids: Vec<String> = (0..30).map(|i| format!("p{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let known: Vec<&str> = id_refs.iter().copied().filter(|id| !id.ends_with('3')).collect();
    let repo = InMemoryPlayers::with_players(&known);

    let outcome = pipeline(repo, 4).run(&projections(&id_refs)).await.unwrap();

    let failed: Vec<&str> = outcome
        .failures
        .iter()
        .map(|f| f.identifier.as_str())
        .collect();
    assert_eq!(failed, vec!["p3", "p13", "p23"]);
    assert_eq!(outcome.records.len(), id_refs.len() - failed.len());
    assert_eq!(outcome.attempted, 30);
}

#[tokio::test]
async fn concurrent_runs_match_sequential_order() {
    let ids: Vec<String> = (0..25).map(|i| format!("id-{:02}", 24 - i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let sequential = pipeline(InMemoryPlayers::with_players(&id_refs), 1)
        .run(&projections(&id_refs))
        .await
        .unwrap();
    let repo = InMemoryPlayers::with_players(&id_refs);
    let concurrent = pipeline(repo.clone(), 4)
        .run(&projections(&id_refs))
        .await
        .unwrap();

    assert_eq!(concurrent.records, sequential.records);
    assert_eq!(record_ids(&concurrent.records), id_refs);
    let calls = repo.calls();
    let distinct: HashSet<&String> = calls.iter().collect();
    assert_eq!(calls.len(), 25);
    assert_eq!(distinct.len(), 25);
}

#[tokio::test]
async fn identifier_list_feeds_the_second_stage() {
    let doc = SourceDocument::from_json(r#"["b", "a", "b"]"#, SourceFormat::IdentifierList).unwrap();
    let repo = InMemoryPlayers::with_players(&["a", "b"]);

    let outcome = pipeline(repo, 2).run(&doc).await.unwrap();

    assert_eq!(record_ids(&outcome.records), vec!["b", "a"]);
}

#[tokio::test]
async fn written_records_parse_back_to_the_same_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/all_players.json");
    let repo = InMemoryPlayers::with_players(&["a", "b"]);
    let outcome = pipeline(repo, 2)
        .run(&projections(&["a", "b"]))
        .await
        .unwrap();

    ResultSink::new()
        .stage(
            Artifact::Records(&outcome.records),
            &Destination::File(path.clone()),
        )
        .unwrap()
        .write()
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n]\n"));
    let parsed: Vec<EntityRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, outcome.records);
}
