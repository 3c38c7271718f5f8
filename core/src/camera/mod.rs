//! Camera setup for a freshly started spectator client.
//!
//! The sequence is fixed: zoom fully out, toggle the HUD panels, then either
//! lock the camera onto the tracked player's champion (when their seat is
//! known) or fall back to the free camera.

mod input;
#[cfg(target_os = "windows")]
mod win32;

pub use input::{InputAction, InputDriver, Key, TracingInputDriver};
#[cfg(target_os = "windows")]
pub use win32::SendInputDriver;

use caster_types::{MatchDescriptor, TeamSide, TrackedPlayer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Wheel notches needed to reach maximum zoom from any starting zoom.
const ZOOM_OUT_NOTCHES: u32 = 50;

/// Point clicked to give the client window focus.
const FOCUS_POINT: (i32, i32) = (10, 10);

const HUD_KEYS: [char; 3] = ['u', 'o', 'n'];
const FREE_CAMERA_KEYS: [char; 2] = ['y', 'd'];

/// Seat index -> champion lock key, per side. Each key is pressed twice.
const BLUE_LOCK_KEYS: [char; 5] = ['1', '2', '3', '4', '5'];
const RED_LOCK_KEYS: [char; 5] = ['q', 'w', 'e', 'r', 't'];

/// Build the full input sequence for the given seat and side.
///
/// The lock table is only consulted when both are known.
pub fn camera_sequence(seat: Option<u8>, side: Option<TeamSide>) -> Vec<InputAction> {
    let mut actions = vec![
        InputAction::MoveMouse {
            x: FOCUS_POINT.0,
            y: FOCUS_POINT.1,
        },
        InputAction::LeftClick,
        InputAction::KeyCombo(vec![Key::Control, Key::Shift, Key::Char('z')]),
        InputAction::ScrollDown {
            notches: ZOOM_OUT_NOTCHES,
        },
    ];

    actions.extend(HUD_KEYS.iter().map(|c| InputAction::KeyTap(Key::Char(*c))));

    match seat.zip(side).and_then(|(seat, side)| lock_key(seat, side).map(|k| (side, k))) {
        Some((side, lock)) => {
            actions.push(InputAction::KeyTap(fog_key(side)));
            actions.push(InputAction::KeyTap(Key::Char(lock)));
            actions.push(InputAction::KeyTap(Key::Char(lock)));
        }
        None => {
            actions.extend(FREE_CAMERA_KEYS.iter().map(|c| InputAction::KeyTap(Key::Char(*c))));
        }
    }

    actions
}

fn fog_key(side: TeamSide) -> Key {
    match side {
        TeamSide::Blue => Key::F(1),
        TeamSide::Red => Key::F(2),
    }
}

fn lock_key(seat: u8, side: TeamSide) -> Option<char> {
    let table = match side {
        TeamSide::Blue => &BLUE_LOCK_KEYS,
        TeamSide::Red => &RED_LOCK_KEYS,
    };
    table.get(usize::from(seat)).copied()
}

/// Drives the camera sequence through an [`InputDriver`].
#[derive(Clone)]
pub struct CameraAutomator {
    driver: Arc<dyn InputDriver>,
    action_delay: Duration,
}

impl CameraAutomator {
    pub fn new(driver: Arc<dyn InputDriver>, action_delay: Duration) -> Self {
        Self {
            driver,
            action_delay,
        }
    }

    /// Platform default: `SendInput` on Windows, a logging dry run elsewhere.
    pub fn platform_default(action_delay: Duration) -> Self {
        #[cfg(target_os = "windows")]
        let driver: Arc<dyn InputDriver> = Arc::new(SendInputDriver);
        #[cfg(not(target_os = "windows"))]
        let driver: Arc<dyn InputDriver> = Arc::new(TracingInputDriver);
        Self::new(driver, action_delay)
    }

    /// Configure zoom, HUD, fog of war and camera lock for the tracked player.
    ///
    /// Input is fire-and-forget: a failed action is logged and the rest of the
    /// sequence still runs. Returns the number of actions that failed.
    pub async fn configure(
        &self,
        player: &TrackedPlayer,
        game: &MatchDescriptor,
        seat: Option<u8>,
    ) -> usize {
        let side = game.side_of(&player.id);
        if seat.is_some() && side.is_none() {
            warn!(player = %player, match_id = game.match_id, "Player not in roster, using free camera");
        }

        info!(?seat, ?side, "Configuring camera");

        let mut failures = 0;
        for action in camera_sequence(seat, side) {
            debug!(action = %action, "Sending input");
            if let Err(e) = self.driver.perform(&action) {
                warn!(error = %e, "Input action failed");
                failures += 1;
            }
            tokio::time::sleep(self.action_delay).await;
        }
        failures
    }
}
