//! Serializable settings blocks shared by the core and the CLI.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Substrings the output parser looks for in the spectator client's diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputMarkers {
    pub replay_download_error: String,
    /// Any of these, together with the player's name, marks a roster line.
    pub team_markers: Vec<String>,
    pub game_start: String,
    pub game_end: String,
}

impl Default for OutputMarkers {
    fn default() -> Self {
        Self {
            replay_download_error: "ERROR| ReplayDownloader".to_string(),
            team_markers: vec!["TeamOrder".to_string(), "TeamChaos".to_string()],
            game_start: "Received Game Start Packet".to_string(),
            game_end: "Received Game End Packet".to_string(),
        }
    }
}

/// Fixed delays of the spectate cycle, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub poll_interval_ms: u64,
    /// Wait after the game start packet before touching the camera.
    pub post_start_delay_ms: u64,
    /// Wait after the game end packet before killing the client.
    pub post_end_delay_ms: u64,
    pub retry_backoff_ms: u64,
    /// Pause between simulated input actions.
    pub input_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            post_start_delay_ms: 5_000,
            post_end_delay_ms: 10_000,
            retry_backoff_ms: 10_000,
            input_delay_ms: 50,
        }
    }
}

impl Timings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn post_start_delay(&self) -> Duration {
        Duration::from_millis(self.post_start_delay_ms)
    }

    pub fn post_end_delay(&self) -> Duration {
        Duration::from_millis(self.post_end_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }
}
