//! Supervision of the external spectator client.
//!
//! One session at a time: launching a new session first stops the previous
//! one and waits for it to be gone. A session relaunches the client after a
//! crash (exit without the game end packet) following a fixed backoff, and
//! shuts it down a fixed delay after the game end packet.

mod session;

pub use session::{SessionOutcome, SpectateSession};

use crate::camera::CameraAutomator;
use crate::error::SpectateError;
use crate::events::{EventBus, LifecycleEvent};
use crate::output::OutputParser;
use crate::process::ProcessHost;
use crate::status::StatusCell;
use caster_types::{MatchDescriptor, Timings, TrackedPlayer};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything the supervisor needs to build and run a launch.
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Client executable name, used both to launch and to kill.
    pub executable: String,
    /// Located game install directory, the client's working directory.
    pub game_dir: PathBuf,
    pub locale: String,
    pub timings: Timings,
    /// Relaunches allowed after crashes; `None` retries forever.
    pub max_launch_retries: Option<u32>,
}

pub(crate) struct SupervisorContext {
    host: Arc<dyn ProcessHost>,
    camera: CameraAutomator,
    parser: OutputParser,
    settings: SupervisorSettings,
    events: EventBus,
    status: StatusCell,
}

impl SupervisorContext {
    async fn kill_client(&self) {
        if let Err(e) = self.host.kill_by_name(&self.settings.executable).await {
            warn!(error = %e, executable = %self.settings.executable, "Failed to kill spectator client");
        }
    }
}

struct ActiveSession {
    player: TrackedPlayer,
    game: Arc<MatchDescriptor>,
    ended: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Resolves once a launched session is over.
#[derive(Debug)]
pub struct SessionHandle {
    pub match_id: u64,
    outcome: oneshot::Receiver<Result<SessionOutcome, SpectateError>>,
}

impl SessionHandle {
    /// Wait for the session to finish. A session stopped from outside
    /// resolves to [`SessionOutcome::Cancelled`].
    pub async fn finished(self) -> Result<SessionOutcome, SpectateError> {
        self.outcome.await.unwrap_or(Ok(SessionOutcome::Cancelled))
    }
}

/// Owns the spectator client process.
pub struct ProcessSupervisor {
    ctx: Arc<SupervisorContext>,
    active: Mutex<Option<ActiveSession>>,
}

impl ProcessSupervisor {
    pub fn new(
        host: Arc<dyn ProcessHost>,
        camera: CameraAutomator,
        parser: OutputParser,
        settings: SupervisorSettings,
        events: EventBus,
        status: StatusCell,
    ) -> Self {
        Self {
            ctx: Arc::new(SupervisorContext {
                host,
                camera,
                parser,
                settings,
                events,
                status,
            }),
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.ctx.settings
    }

    /// Start spectating `game`, stopping any session still running first.
    pub async fn launch(&self, player: TrackedPlayer, game: Arc<MatchDescriptor>) -> SessionHandle {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            self.shutdown(previous).await;
        }

        let ended = Arc::new(AtomicBool::new(false));
        let session = SpectateSession::new(player.clone(), Arc::clone(&game), Arc::clone(&ended));
        let (tx, rx) = oneshot::channel();
        let ctx = Arc::clone(&self.ctx);

        let task = tokio::spawn(async move {
            let result = session::run_session(ctx, session).await;
            tx.send(result).ok();
        });

        *active = Some(ActiveSession {
            player,
            game: Arc::clone(&game),
            ended,
            task,
        });

        SessionHandle {
            match_id: game.match_id,
            outcome: rx,
        }
    }

    /// Force-stop the running session, if any. Idempotent.
    pub async fn terminate(&self) {
        let mut active = self.active.lock().await;
        if let Some(session) = active.take() {
            self.shutdown(session).await;
        }
    }

    /// Whether a session is currently running (including crash backoff).
    pub async fn is_active(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    async fn shutdown(&self, session: ActiveSession) {
        if session.task.is_finished() {
            return;
        }

        info!(match_id = session.game.match_id, "Stopping spectator session");

        // Stop the task before killing so the kill's exit is never observed
        session.ended.store(true, Ordering::SeqCst);
        session.task.abort();
        let finished_on_its_own = session.task.await.is_ok();
        self.ctx.kill_client().await;

        if finished_on_its_own {
            // The session already reported its own exit
            return;
        }
        self.ctx.events.emit(LifecycleEvent::GameExited {
            player: Some(session.player),
            game: Some(session.game),
        });
    }
}
