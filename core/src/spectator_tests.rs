//! End-to-end polling loop tests with a scripted client and processes.

use crate::camera::camera_sequence;
use crate::error::SpectateError;
use crate::events::LifecycleEvent;
use crate::testing::{PLAYER_NAME, alice, drain, game, harness, names};
use caster_types::{SpectatorStatus, TeamSide, TrackedPlayer};
use std::time::Duration;
use tokio::time::sleep;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test(start_paused = true)]
async fn launches_once_per_new_match() {
    let mut h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;

    sleep(secs(1)).await;
    assert_eq!(h.host.spawned(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Loading);

    // Two more polls see the same match
    sleep(secs(10)).await;
    assert!(h.client.calls() >= 3);
    assert_eq!(h.host.spawned(), 1);

    h.client.set_match(Some(game(200)));
    sleep(secs(5)).await;
    assert_eq!(h.host.spawned(), 2);
    assert_eq!(h.host.max_alive(), 1);

    let found: Vec<u64> = drain(&mut h.events)
        .into_iter()
        .filter_map(|e| match e {
            LifecycleEvent::GameFound { game, .. } => Some(game.match_id),
            _ => None,
        })
        .collect();
    assert_eq!(found, vec![100, 200]);
}

#[tokio::test(start_paused = true)]
async fn replaced_session_keeps_loading_status() {
    let mut h = harness();
    h.host.set_kill_delay(Duration::from_millis(50));
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.client.set_match(Some(game(200)));
    sleep(secs(5)).await;

    assert_eq!(h.host.spawned(), 2);
    assert_eq!(h.host.max_alive(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Loading);
    assert!(h.spectator.is_spectating().await);
    assert_eq!(
        names(&drain(&mut h.events)),
        vec!["game_found", "game_loading", "game_found", "game_exited", "game_loading"]
    );
}

#[tokio::test(start_paused = true)]
async fn lookup_failures_are_retried_next_cycle() {
    let h = harness();
    h.client.set_match(Some(game(100)));
    h.client.fail_next(2);
    h.spectator.set_tracked_player(alice()).await;

    sleep(secs(1)).await;
    assert_eq!(h.client.calls(), 1);
    assert_eq!(h.host.spawned(), 0);
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);

    sleep(secs(5)).await;
    assert_eq!(h.client.calls(), 2);
    assert_eq!(h.host.spawned(), 0);
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);

    sleep(secs(5)).await;
    assert_eq!(h.client.calls(), 3);
    assert_eq!(h.host.spawned(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Loading);

    sleep(secs(10)).await;
    assert_eq!(h.host.spawned(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_match_keeps_searching() {
    let mut h = harness();
    h.spectator.set_tracked_player(alice()).await;

    sleep(secs(12)).await;
    assert_eq!(h.client.calls(), 3);
    assert_eq!(h.host.spawned(), 0);
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);
    assert!(drain(&mut h.events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_halts_polling_and_kills_client() {
    let h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.spectator.stop().await;
    let calls = h.client.calls();
    sleep(secs(30)).await;

    assert_eq!(h.client.calls(), calls);
    assert_eq!(h.host.spawned(), 1);
    assert_eq!(h.host.kills(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Idle);
    assert!(!h.spectator.is_spectating().await);
    assert_eq!(h.spectator.tracked_player().await, Some(alice()));

    h.spectator.stop().await;
    h.spectator.shutdown().await;
    assert_eq!(h.spectator.tracked_player().await, None);
}

#[tokio::test(start_paused = true)]
async fn replay_download_failure_is_requeued() {
    let mut h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.host.emit("ERROR| ReplayDownloader: chunk 3 missing\n");
    sleep(secs(1)).await;

    let events = drain(&mut h.events);
    assert_eq!(
        names(&events),
        vec!["game_found", "game_loading", "loading_failed", "game_exited"]
    );
    assert_eq!(h.host.kills(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);

    // The failed match is forgotten, so the next poll tries it again
    sleep(secs(4)).await;
    assert_eq!(h.host.spawned(), 2);
}

#[tokio::test(start_paused = true)]
async fn game_start_configures_camera_after_delay() {
    let mut h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.host.emit("TeamOrder 2 - Alice\n");
    h.host.emit("[00:01] Received Game Start Packet\n");

    sleep(secs(4)).await;
    assert!(h.driver.actions().is_empty());
    assert_eq!(h.spectator.status(), SpectatorStatus::Loading);

    sleep(secs(2)).await;
    assert_eq!(h.driver.actions(), camera_sequence(Some(2), Some(TeamSide::Blue)));
    assert_eq!(h.spectator.status(), SpectatorStatus::InGame);

    let events = drain(&mut h.events);
    assert_eq!(
        names(&events),
        vec!["game_found", "game_loading", "position_found", "game_started"]
    );
}

#[tokio::test(start_paused = true)]
async fn game_end_shuts_client_down_after_delay() {
    let mut h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.host.emit("Received Game End Packet\n");
    sleep(secs(5)).await;
    assert_eq!(h.host.kills(), 0);

    sleep(secs(6)).await;
    assert_eq!(h.host.kills(), 1);
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);

    // Same match still reported live: no relaunch
    sleep(secs(20)).await;
    assert_eq!(h.host.spawned(), 1);

    assert_eq!(
        names(&drain(&mut h.events)),
        vec!["game_found", "game_loading", "game_ended", "game_exited"]
    );
}

#[tokio::test(start_paused = true)]
async fn retarget_never_runs_two_clients() {
    let h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.client.set_match(Some(game(200)));
    h.spectator
        .set_tracked_player(TrackedPlayer::new("puuid-bob", "Bob"))
        .await;
    sleep(secs(1)).await;

    assert_eq!(h.host.spawned(), 2);
    assert_eq!(h.host.kills(), 1);
    assert_eq!(h.host.max_alive(), 1);
    assert_eq!(h.spectator.tracked_player().await.unwrap().name, "Bob");
}

#[tokio::test(start_paused = true)]
async fn retarget_to_same_match_relaunches() {
    let h = harness();
    h.client.set_match(Some(game(100)));
    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    h.spectator.set_tracked_player(alice()).await;
    sleep(secs(1)).await;

    assert_eq!(h.host.spawned(), 2);
    assert_eq!(h.host.max_alive(), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_without_player_fails() {
    let h = harness();
    let result = h.spectator.poll_once().await;
    assert!(matches!(result, Err(SpectateError::NoTrackedPlayer)));
    assert_eq!(h.client.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn watch_resolves_by_name() {
    let h = harness();
    let player = h.spectator.watch(PLAYER_NAME).await.unwrap();
    assert_eq!(player, alice());
    assert_eq!(h.spectator.status(), SpectatorStatus::Searching);
}

#[tokio::test(start_paused = true)]
async fn unknown_player_stops_spectator() {
    let h = harness();
    h.spectator.watch(PLAYER_NAME).await.unwrap();

    let result = h.spectator.watch("Nobody").await;
    assert!(result.is_err());
    assert_eq!(h.spectator.status(), SpectatorStatus::Idle);

    let calls = h.client.calls();
    sleep(secs(20)).await;
    assert_eq!(h.client.calls(), calls);
}
