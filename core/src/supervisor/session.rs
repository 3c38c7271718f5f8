//! Run-state of one spectate session and the loop that drives it.

use super::SupervisorContext;
use crate::error::SpectateError;
use crate::events::LifecycleEvent;
use crate::output::OutputSignal;
use crate::process::{LaunchCommand, ProcessOutput, SpawnedProcess};
use caster_types::{MatchDescriptor, SpectatorStatus, TrackedPlayer};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, trace, warn};

/// How a session finished without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The game end packet was seen and the client was shut down afterwards.
    Completed,
    /// The session was stopped from outside.
    Cancelled,
}

/// Mutable state of one supervised launch (and its relaunches).
#[derive(Debug)]
pub struct SpectateSession {
    pub player: TrackedPlayer,
    pub game: Arc<MatchDescriptor>,
    seat: Option<u8>,
    /// Set by the game end packet or by a forced stop; suppresses crash relaunch.
    ended: Arc<AtomicBool>,
    pub retry_count: u32,
    pub launched_at: DateTime<Local>,
}

impl SpectateSession {
    pub fn new(player: TrackedPlayer, game: Arc<MatchDescriptor>, ended: Arc<AtomicBool>) -> Self {
        Self {
            player,
            game,
            seat: None,
            ended,
            retry_count: 0,
            launched_at: Local::now(),
        }
    }

    pub fn seat(&self) -> Option<u8> {
        self.seat
    }

    /// Record the observed seat. The first observation wins.
    pub fn record_seat(&mut self, seat: u8) -> bool {
        if self.seat.is_some() {
            return false;
        }
        self.seat = Some(seat);
        true
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn mark_ended(&self) -> bool {
        !self.ended.swap(true, Ordering::SeqCst)
    }

    /// Wall-clock time since the session was first launched.
    pub fn elapsed(&self) -> chrono::Duration {
        Local::now() - self.launched_at
    }
}

/// Result of watching a single process run.
enum RunEnd {
    Completed,
    DownloadFailed,
    Crashed(Option<i32>),
}

pub(super) async fn run_session(
    ctx: Arc<SupervisorContext>,
    mut session: SpectateSession,
) -> Result<SessionOutcome, SpectateError> {
    loop {
        if session.is_ended() {
            return Ok(SessionOutcome::Cancelled);
        }

        let command = LaunchCommand::spectate(
            &ctx.settings.executable,
            &ctx.settings.game_dir,
            &session.game,
            &ctx.settings.locale,
        );
        info!(
            match_id = session.game.match_id,
            attempt = session.retry_count,
            command = %command.command_line(),
            "Launching spectator client"
        );

        match ctx.host.spawn(&command).await {
            Ok(process) => {
                info!(pid = ?process.pid, "Spectator client launched");
                ctx.status.advance(SpectatorStatus::Loading);
                ctx.events.emit(LifecycleEvent::GameLoading {
                    player: session.player.clone(),
                    game: Arc::clone(&session.game),
                    pid: process.pid,
                    attempt: session.retry_count,
                });

                match watch_process(&ctx, &mut session, process).await {
                    RunEnd::Completed => return Ok(SessionOutcome::Completed),
                    RunEnd::DownloadFailed => return Err(SpectateError::ReplayDownloadFailed),
                    RunEnd::Crashed(code) => {
                        warn!(exit_code = ?code, "Spectator client exited before the game ended");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to launch spectator client");
                ctx.events.emit(exited(&session));
            }
        }

        session.retry_count += 1;
        if let Some(max) = ctx.settings.max_launch_retries
            && session.retry_count > max
        {
            warn!(attempts = session.retry_count, "Giving up on spectator client");
            return Err(SpectateError::RetriesExhausted {
                attempts: session.retry_count,
            });
        }

        let backoff = ctx.settings.timings.retry_backoff();
        info!(retry = session.retry_count, ?backoff, "Relaunching spectator client after backoff");
        sleep(backoff).await;
    }
}

/// Consume one process's output until it exits or the session resolves.
async fn watch_process(
    ctx: &SupervisorContext,
    session: &mut SpectateSession,
    mut process: SpawnedProcess,
) -> RunEnd {
    let timings = ctx.settings.timings;
    let mut camera_at: Option<Instant> = None;
    let mut shutdown_at: Option<Instant> = None;
    let mut started = false;

    loop {
        tokio::select! {
            item = process.output.recv() => match item {
                Some(ProcessOutput::Chunk(text)) => {
                    debug!(output = %text.trim_end(), "Spectator output");

                    for signal in ctx.parser.classify(&text, &session.player.name) {
                        trace!(?signal, "Output signal");
                        match signal {
                            OutputSignal::ReplayDownloadFailed => {
                                warn!(match_id = session.game.match_id, "Failed to download replay");
                                session.mark_ended();
                                ctx.kill_client().await;
                                ctx.events.emit(LifecycleEvent::LoadingFailed {
                                    reason: "replay download failed".to_string(),
                                });
                                ctx.events.emit(exited(session));
                                return RunEnd::DownloadFailed;
                            }
                            OutputSignal::PositionDetected(seat) => {
                                if session.record_seat(seat) {
                                    debug!(seat, "Player position found");
                                    ctx.events.emit(LifecycleEvent::PositionFound { seat });
                                }
                            }
                            OutputSignal::GameStarted => {
                                if !started && camera_at.is_none() {
                                    debug!("Game started");
                                    camera_at = Some(Instant::now() + timings.post_start_delay());
                                }
                            }
                            OutputSignal::GameEnded => {
                                if shutdown_at.is_none() {
                                    session.mark_ended();
                                    info!(match_id = session.game.match_id, "Game ended");
                                    ctx.events.emit(LifecycleEvent::GameEnded {
                                        player: session.player.clone(),
                                        game: Arc::clone(&session.game),
                                    });
                                    shutdown_at = Some(Instant::now() + timings.post_end_delay());
                                }
                            }
                        }
                    }
                }
                exit => {
                    let code = match exit {
                        Some(ProcessOutput::Exited { code }) => code,
                        _ => None,
                    };
                    info!(
                        exit_code = ?code,
                        watched_secs = session.elapsed().num_seconds(),
                        "Spectator client exited"
                    );
                    ctx.events.emit(exited(session));
                    return if session.is_ended() {
                        RunEnd::Completed
                    } else {
                        RunEnd::Crashed(code)
                    };
                }
            },
            _ = wait_until(camera_at) => {
                camera_at = None;
                started = true;
                ctx.camera.configure(&session.player, &session.game, session.seat()).await;
                ctx.status.advance(SpectatorStatus::InGame);
                info!(match_id = session.game.match_id, "Game started");
                ctx.events.emit(LifecycleEvent::GameStarted {
                    player: session.player.clone(),
                    game: Arc::clone(&session.game),
                });
            }
            _ = wait_until(shutdown_at) => {
                info!(watched_secs = session.elapsed().num_seconds(), "Exiting spectator client");
                ctx.kill_client().await;
                ctx.events.emit(exited(session));
                return RunEnd::Completed;
            }
        }
    }
}

fn exited(session: &SpectateSession) -> LifecycleEvent {
    LifecycleEvent::GameExited {
        player: Some(session.player.clone()),
        game: Some(Arc::clone(&session.game)),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
