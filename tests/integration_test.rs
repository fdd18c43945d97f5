//! Integration tests for the alert lifecycle core
//!
//! These tests drive the full stack: repository validation, the store
//! actor's atomic transitions, the claim coordinator, and the live feeds.

use std::time::Duration;

use serde_json::Value;
use soscore::config::CoreConfig;
use soscore::coordinator::ClaimCoordinator;
use soscore::domain::{AlertKind, AlertStatus, GeoPoint, Principal, Role};
use soscore::error::SosError;
use soscore::repository::AlertRepository;
use soscore::store::AlertStore;
use soscore::sync::{ResponderBoard, SessionViews};

static TRACING: std::sync::Once = std::sync::Once::new();

fn setup() -> (AlertStore, AlertRepository, ClaimCoordinator) {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });

    let config = CoreConfig::default();
    let store = AlertStore::spawn(&config);
    let repo = AlertRepository::new(store.clone(), config);
    let coordinator = ClaimCoordinator::new(store.clone());
    (store, repo, coordinator)
}

fn citizen() -> Principal {
    Principal::new("u-cit", "Asha", Role::Citizen).with_email("asha@example.org")
}

fn responder(id: &str) -> Principal {
    Principal::new(id, "Responder", Role::Volunteer)
}

// =============================================================================
// End-to-end lifecycle
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_with_racing_claims() {
    let (store, repo, _) = setup();

    // Citizen raises an alert
    let id = repo
        .create_alert(&citizen(), GeoPoint::new(12.9, 77.6), AlertKind::General, "", Value::Null)
        .await
        .expect("create should succeed");

    let alert = repo.get_alert(&id).await.unwrap().unwrap();
    assert_eq!(alert.status, AlertStatus::Open);

    // Responders A and B race to claim
    let coord_a = ClaimCoordinator::new(store.clone());
    let coord_b = ClaimCoordinator::new(store.clone());
    let id_a = id.clone();
    let id_b = id.clone();
    let (res_a, res_b) = tokio::join!(
        tokio::spawn(async move { coord_a.claim(&id_a, &responder("u-a")).await }),
        tokio::spawn(async move { coord_b.claim(&id_b, &responder("u-b")).await }),
    );
    let res_a = res_a.unwrap();
    let res_b = res_b.unwrap();

    assert!(
        res_a.is_ok() ^ res_b.is_ok(),
        "exactly one of two racing claims must win"
    );
    let (winner_id, loser) = if res_a.is_ok() { ("u-a", res_b) } else { ("u-b", res_a) };
    assert!(matches!(loser.unwrap_err(), SosError::AlreadyClaimed { .. }));

    let alert = repo.get_alert(&id).await.unwrap().unwrap();
    assert!(alert.is_claimed_by(winner_id));

    // The winner resolves with notes
    let winner = responder(winner_id);
    let coord = ClaimCoordinator::new(store.clone());
    let resolved = coord
        .resolve(&id, &winner, Some("stabilized".to_string()))
        .await
        .unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);
    assert_eq!(resolved.resolution_notes.as_deref(), Some("stabilized"));
    assert_eq!(resolved.resolver.as_ref().map(|r| r.id.as_str()), Some(winner_id));

    // Any subsequent resolve fails
    let err = coord.resolve(&id, &responder("u-c"), None).await.unwrap_err();
    assert!(matches!(err, SosError::NotClaimed { .. }));
}

#[tokio::test]
async fn test_many_concurrent_claims_single_winner() {
    let (store, repo, _) = setup();
    let id = repo
        .create_alert(&citizen(), GeoPoint::new(12.9, 77.6), AlertKind::Fire, "", Value::Null)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let coord = ClaimCoordinator::new(store.clone());
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            coord.claim(&id, &responder(&format!("u-r{i}"))).await
        }));
    }

    let mut winners = Vec::new();
    let mut already_claimed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(alert) => winners.push(alert),
            Err(SosError::AlreadyClaimed { .. }) => already_claimed += 1,
            Err(e) => panic!("unexpected claim error: {e}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(already_claimed, 15);

    let persisted = repo.get_alert(&id).await.unwrap().unwrap();
    assert_eq!(persisted.claimant, winners[0].claimant);
}

// =============================================================================
// Live feeds
// =============================================================================

#[tokio::test]
async fn test_open_feed_follows_claim_transition() {
    let (store, repo, coordinator) = setup();
    let views = SessionViews::new(repo.clone());

    let mut open_feed = views.open_alerts().await.unwrap();
    assert!(open_feed.snapshot().is_empty());

    let id = repo
        .create_alert(&citizen(), GeoPoint::new(12.9, 77.6), AlertKind::Medical, "", Value::Null)
        .await
        .unwrap();

    let items = open_feed.recv().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].status, AlertStatus::Open);

    let resp = responder("u-r1");
    coordinator.claim(&id, &resp).await.unwrap();

    let items = open_feed.recv().await.unwrap();
    assert!(items.is_empty(), "open feed must never carry a claimed alert");

    // The responder's claims feed picks it up instead
    let claims_feed = views.own_claims(&resp).await.unwrap();
    assert_eq!(claims_feed.snapshot().len(), 1);
    assert!(claims_feed.snapshot()[0].is_claimed_by("u-r1"));

    // Reconciled board never shows it in both lists
    let mut board = ResponderBoard::new();
    board.apply_open_snapshot(open_feed.snapshot().to_vec());
    board.apply_claims_snapshot(claims_feed.snapshot().to_vec());
    assert!(board.open_visible().is_empty());
    assert_eq!(board.claims().len(), 1);

    // Store handle stays usable after the session drops its feeds
    drop(open_feed);
    assert!(store.get_alert(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_chat_flows_in_order_across_parties() {
    let (_, repo, coordinator) = setup();
    let views = SessionViews::new(repo.clone());

    let cit = citizen();
    let resp = responder("u-r1");
    let id = repo
        .create_alert(&cit, GeoPoint::new(12.9, 77.6), AlertKind::Flood, "water rising", Value::Null)
        .await
        .unwrap();
    coordinator.claim(&id, &resp).await.unwrap();

    let mut chat = views.messages(&id).await.unwrap();
    assert!(chat.snapshot().is_empty());

    repo.append_message(&id, &cit, "second floor, two people", false)
        .await
        .unwrap();
    repo.append_message(&id, &resp, "boat dispatched", true).await.unwrap();
    repo.append_message(&id, &cit, "thank you", false).await.unwrap();

    // Each append redelivers the full ordered set; take the last delivery
    let mut latest = Vec::new();
    for _ in 0..3 {
        latest = chat.recv().await.unwrap();
    }
    assert_eq!(latest.len(), 3);
    for pair in latest.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
    let senders: Vec<&str> = latest.iter().map(|m| m.sender.id.as_str()).collect();
    assert_eq!(senders, vec!["u-cit", "u-r1", "u-cit"]);
    assert!(latest[1].is_voice);

    chat.cancel();
    chat.cancel();
    assert!(chat.recv().await.is_none());
}

#[tokio::test]
async fn test_feed_cancellation_stops_delivery() {
    let (_, repo, _) = setup();
    let mut feed = repo.open_alerts().await.unwrap();
    feed.cancel();

    repo.create_alert(&citizen(), GeoPoint::new(1.0, 2.0), AlertKind::Other, "", Value::Null)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(feed.try_recv().is_none());
}

// =============================================================================
// Validation and shutdown
// =============================================================================

#[tokio::test]
async fn test_invalid_create_persists_nothing() {
    let (_, repo, _) = setup();

    let err = repo
        .create_alert(&citizen(), GeoPoint::new(f64::NAN, 10.0), AlertKind::General, "", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, SosError::InvalidInput(_)));

    let feed = repo.open_alerts().await.unwrap();
    assert!(feed.snapshot().is_empty());
}

#[tokio::test]
async fn test_store_shutdown_surfaces_as_failure() {
    let (store, repo, _) = setup();
    store.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = repo
        .create_alert(&citizen(), GeoPoint::new(1.0, 2.0), AlertKind::General, "", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, SosError::StoreClosed));
}
