use caster_types::{MatchDescriptor, TrackedPlayer};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_BUFFER: usize = 64;

/// Lifecycle signals emitted by the spectator.
///
/// These are the only contract between the core and downstream integrations
/// (scene switching, chat bots, overlays). Each emission is delivered once to
/// every subscriber that is listening at the time.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// A new match was found for the tracked player; fired before launch.
    GameFound {
        player: TrackedPlayer,
        game: Arc<MatchDescriptor>,
    },
    /// The spectator client process was started (`attempt` counts crash relaunches).
    GameLoading {
        player: TrackedPlayer,
        game: Arc<MatchDescriptor>,
        pid: Option<u32>,
        attempt: u32,
    },
    /// The tracked player's roster seat was read from client output.
    PositionFound { seat: u8 },
    /// The game is running and the camera has been configured.
    GameStarted {
        player: TrackedPlayer,
        game: Arc<MatchDescriptor>,
    },
    GameEnded {
        player: TrackedPlayer,
        game: Arc<MatchDescriptor>,
    },
    /// The spectator client is gone, for whatever reason.
    GameExited {
        player: Option<TrackedPlayer>,
        game: Option<Arc<MatchDescriptor>>,
    },
    LoadingFailed { reason: String },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameFound { .. } => "game_found",
            Self::GameLoading { .. } => "game_loading",
            Self::PositionFound { .. } => "position_found",
            Self::GameStarted { .. } => "game_started",
            Self::GameEnded { .. } => "game_ended",
            Self::GameExited { .. } => "game_exited",
            Self::LoadingFailed { .. } => "loading_failed",
        }
    }
}

/// Fan-out of lifecycle events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: LifecycleEvent) {
        trace!(event = event.name(), "Emitting lifecycle event");
        let _ = self.tx.send(event);
    }
}
