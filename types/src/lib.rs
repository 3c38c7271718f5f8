//! Shared types for caster.
//!
//! Everything here is plain data: match snapshots handed out by the match-status
//! client, the tracked player, and the serializable settings blocks embedded in
//! the application config.

mod match_info;
mod settings;

pub use match_info::{MatchDescriptor, ObserverCredentials, Participant, TeamSide, TrackedPlayer};
pub use settings::{OutputMarkers, Timings};

use serde::{Deserialize, Serialize};

/// Coarse state of the spectator, as reported to operators and overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectatorStatus {
    /// No player tracked, nothing scheduled.
    #[default]
    Idle,
    /// Polling for an active match.
    Searching,
    /// Spectator client launched, waiting for the game start packet.
    Loading,
    /// Game running and camera configured.
    InGame,
}

impl SpectatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Loading => "loading",
            Self::InGame => "ingame",
        }
    }
}

impl std::fmt::Display for SpectatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
