//! The polling loop: tracks one player, discovers their matches and hands
//! each new match to the process supervisor.
//!
//! States: `Idle -> Searching -> Loading -> InGame -> Searching ... | Idle`.
//! Every retarget or stop bumps a generation counter and aborts the pending
//! poll timer, so a poll started for a superseded target can never launch
//! anything.

use crate::camera::CameraAutomator;
use crate::client::MatchStatusClient;
use crate::context::AppConfig;
use crate::error::{ClientError, SpectateError};
use crate::events::{EventBus, LifecycleEvent};
use crate::output::OutputParser;
use crate::process::ProcessHost;
use crate::status::StatusCell;
use crate::supervisor::{ProcessSupervisor, SessionHandle, SessionOutcome, SupervisorSettings};
use caster_types::{SpectatorStatus, TrackedPlayer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Loop settings that are not the supervisor's business.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub region: String,
    pub interval: Duration,
    /// Forget the last spectated match after a replay download failure.
    pub requeue_failed_downloads: bool,
}

#[derive(Default)]
struct LoopState {
    player: Option<TrackedPlayer>,
    last_match_id: Option<u64>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    client: Arc<dyn MatchStatusClient>,
    supervisor: ProcessSupervisor,
    settings: PollSettings,
    events: EventBus,
    status: StatusCell,
    state: Mutex<LoopState>,
}

/// The spectate orchestrator. Construct once and share by cloning.
#[derive(Clone)]
pub struct Spectator {
    inner: Arc<Inner>,
}

impl Spectator {
    pub fn new(
        client: Arc<dyn MatchStatusClient>,
        supervisor: ProcessSupervisor,
        settings: PollSettings,
        events: EventBus,
        status: StatusCell,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                supervisor,
                settings,
                events,
                status,
                state: Mutex::new(LoopState::default()),
            }),
        }
    }

    /// Wire up the whole stack from the application config.
    pub fn from_config(
        config: &AppConfig,
        client: Arc<dyn MatchStatusClient>,
        host: Arc<dyn ProcessHost>,
        camera: CameraAutomator,
    ) -> Result<Self, SpectateError> {
        let game_dir = config.resolve_game_dir()?;
        let events = EventBus::new();
        let status = StatusCell::new();

        let supervisor = ProcessSupervisor::new(
            host,
            camera,
            OutputParser::new(config.markers.clone()),
            SupervisorSettings {
                executable: config.executable.clone(),
                game_dir,
                locale: config.locale.clone(),
                timings: config.timings,
                max_launch_retries: config.max_launch_retries,
            },
            events.clone(),
            status.clone(),
        );

        let settings = PollSettings {
            region: config.region.clone(),
            interval: config.timings.poll_interval(),
            requeue_failed_downloads: config.requeue_failed_downloads,
        };

        Ok(Self::new(client, supervisor, settings, events, status))
    }

    pub fn status(&self) -> SpectatorStatus {
        self.inner.status.get()
    }

    pub fn watch_status(&self) -> watch::Receiver<SpectatorStatus> {
        self.inner.status.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }

    pub async fn tracked_player(&self) -> Option<TrackedPlayer> {
        self.inner.state.lock().await.player.clone()
    }

    pub async fn is_spectating(&self) -> bool {
        self.inner.supervisor.is_active().await
    }

    /// Resolve `name` with the match-status client and start tracking it.
    ///
    /// An unknown player stops the spectator.
    pub async fn watch(&self, name: &str) -> Result<TrackedPlayer, SpectateError> {
        let region = self.inner.settings.region.clone();
        match self.inner.client.resolve_player(name, &region).await {
            Ok(player) => {
                self.set_tracked_player(player.clone()).await;
                Ok(player)
            }
            Err(e @ ClientError::PlayerNotFound(_)) => {
                warn!(name, "Player not found, stopping spectator");
                self.stop().await;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Switch to `player`: cancel whatever runs for the previous target and
    /// poll immediately.
    pub async fn set_tracked_player(&self, player: TrackedPlayer) {
        info!(player = %player, "Tracking player");

        let generation = self.cancel_pending().await;
        self.inner.supervisor.terminate().await;

        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            // Superseded by a later switch or stop while terminating
            return;
        }

        state.player = Some(player);
        state.last_match_id = None;
        self.inner.status.set(SpectatorStatus::Searching);

        let inner = Arc::clone(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            Inner::run_loop(inner, generation).await;
        }));
    }

    /// Stop polling and kill any running session. Idempotent.
    pub async fn stop(&self) {
        info!("Stopping spectator");

        let generation = self.cancel_pending().await;
        self.inner.status.set(SpectatorStatus::Idle);
        self.inner.supervisor.terminate().await;

        let mut state = self.inner.state.lock().await;
        if state.generation == generation {
            state.last_match_id = None;
        }
    }

    /// Stop and forget the tracked player.
    pub async fn shutdown(&self) {
        self.stop().await;
        self.inner.state.lock().await.player = None;
    }

    /// Run one poll for the current target right now.
    pub async fn poll_once(&self) -> Result<(), SpectateError> {
        let generation = self.inner.state.lock().await.generation;
        Inner::poll_once(&self.inner, generation).await
    }

    async fn cancel_pending(&self) -> u64 {
        let mut state = self.inner.state.lock().await;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.generation
    }
}

impl Inner {
    async fn run_loop(inner: Arc<Inner>, generation: u64) {
        loop {
            if let Err(e) = Inner::poll_once(&inner, generation).await {
                warn!(error = %e, "Poll failed");
            }

            if !inner.is_current(generation).await {
                return;
            }
            tokio::time::sleep(inner.settings.interval).await;
        }
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
            && self.status.get() != SpectatorStatus::Idle
    }

    async fn poll_once(inner: &Arc<Inner>, generation: u64) -> Result<(), SpectateError> {
        let player = {
            let state = inner.state.lock().await;
            state.player.clone().ok_or(SpectateError::NoTrackedPlayer)?
        };

        let found = match inner.client.active_match(&player, &inner.settings.region).await {
            Ok(found) => found,
            Err(e) => {
                debug!(error = %e, "Match lookup failed, retrying next cycle");
                return Ok(());
            }
        };

        let Some(game) = found else {
            return Ok(());
        };

        // Held across the launch so a concurrent retarget waits for it and
        // then terminates what was launched.
        let mut state = inner.state.lock().await;
        if state.generation != generation || inner.status.get() == SpectatorStatus::Idle {
            debug!(match_id = game.match_id, "Discarding stale poll result");
            return Ok(());
        }
        if state.last_match_id == Some(game.match_id) {
            return Ok(());
        }
        state.last_match_id = Some(game.match_id);

        info!(match_id = game.match_id, player = %player, "New game found");
        let game = Arc::new(game);
        inner.status.advance(SpectatorStatus::Loading);
        inner.events.emit(LifecycleEvent::GameFound {
            player: player.clone(),
            game: Arc::clone(&game),
        });

        let handle = inner.supervisor.launch(player, game).await;
        drop(state);

        Inner::follow_session(Arc::clone(inner), generation, handle);
        Ok(())
    }

    /// React to the session's end without holding up the poll timer.
    fn follow_session(inner: Arc<Inner>, generation: u64, handle: SessionHandle) {
        tokio::spawn(async move {
            let match_id = handle.match_id;
            let result = handle.finished().await;

            match &result {
                Ok(SessionOutcome::Completed) => info!(match_id, "Spectate session complete"),
                Ok(SessionOutcome::Cancelled) => debug!(match_id, "Spectate session cancelled"),
                Err(e) => warn!(match_id, error = %e, "Spectate session failed"),
            }

            let mut state = inner.state.lock().await;
            // A newer match may have replaced this session already
            if state.generation != generation || state.last_match_id != Some(match_id) {
                return;
            }
            if matches!(result, Err(SpectateError::ReplayDownloadFailed))
                && inner.settings.requeue_failed_downloads
            {
                state.last_match_id = None;
            }
            if !matches!(result, Ok(SessionOutcome::Cancelled)) {
                inner.status.advance(SpectatorStatus::Searching);
            }
        });
    }
}
