use caster_core::context::AppConfig;
use caster_core::{LifecycleEvent, Spectator, TrackedPlayer};
use chrono::Local;
use std::time::Instant;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

pub async fn watch(spectator: &Spectator, name: &str) {
    let timer = Instant::now();
    match spectator.watch(name).await {
        Ok(player) => println!("Watching {} ({})", player.name, player.id),
        Err(e) => println!("Could not watch {name}: {e}"),
    }
    println!("Resolved in: {}ms", timer.elapsed().as_millis());
}

pub async fn track(spectator: &Spectator, id: &str, name: &str) {
    let player = TrackedPlayer::new(id, name);
    println!("Tracking {player}");
    spectator.set_tracked_player(player).await;
}

pub async fn stop(spectator: &Spectator) {
    spectator.stop().await;
    println!("Stopped");
}

pub async fn show_status(spectator: &Spectator) {
    println!("Status: {}", spectator.status());
    match spectator.tracked_player().await {
        Some(player) => println!("Tracked player: {player} ({})", player.id),
        None => println!("Tracked player: none"),
    }
    println!("Client running: {}", spectator.is_spectating().await);
}

pub fn show_settings(config: &AppConfig) {
    if let Some(path) = AppConfig::path() {
        println!("Config file: {}", path.display());
    }
    match toml::to_string_pretty(config) {
        Ok(text) => println!("{text}"),
        Err(e) => println!("Could not render config: {e}"),
    }
}

pub async fn exit(spectator: &Spectator) {
    spectator.shutdown().await;
    println!("Exiting...");
}

/// Print lifecycle events as they happen.
pub fn spawn_event_printer(spectator: &Spectator) -> JoinHandle<()> {
    let mut events = spectator.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("[{}] {}", Local::now().format("%H:%M:%S"), describe(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn describe(event: &LifecycleEvent) -> String {
    match event {
        LifecycleEvent::GameFound { player, game } => {
            format!("game found for {player}: match {} ({})", game.match_id, game.region)
        }
        LifecycleEvent::GameLoading { game, pid, attempt, .. } => {
            let pid = pid.map_or_else(|| "?".to_string(), |p| p.to_string());
            format!("loading match {} (pid {pid}, attempt {attempt})", game.match_id)
        }
        LifecycleEvent::PositionFound { seat } => format!("player seat {seat}"),
        LifecycleEvent::GameStarted { game, .. } => format!("match {} started", game.match_id),
        LifecycleEvent::GameEnded { game, .. } => format!("match {} ended", game.match_id),
        LifecycleEvent::GameExited { game, .. } => match game {
            Some(game) => format!("client exited (match {})", game.match_id),
            None => "client exited".to_string(),
        },
        LifecycleEvent::LoadingFailed { reason } => format!("loading failed: {reason}"),
    }
}
