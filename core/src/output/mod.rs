//! Spectator client output classification.
//!
//! The client has no structured telemetry; it writes free-text diagnostics to
//! stderr. Each chunk read from that stream is matched against a fixed set of
//! marker substrings (see [`OutputMarkers`]) to recover lifecycle milestones.

mod signal;

pub use signal::OutputSignal;

use caster_types::OutputMarkers;
use memchr::memmem;

/// Number of bytes between the seat digit and the player name on a roster line.
const SEAT_DIGIT_OFFSET: usize = 4;

/// Highest seat index on a five-player team.
const MAX_SEAT: u8 = 4;

/// Classifies chunks of spectator client output.
#[derive(Debug, Clone, Default)]
pub struct OutputParser {
    markers: OutputMarkers,
}

impl OutputParser {
    pub fn new(markers: OutputMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &OutputMarkers {
        &self.markers
    }

    /// Scan one chunk and return every signal it contains, in evaluation order.
    ///
    /// A chunk can carry several markers at once. Position is checked before
    /// start/end because the roster lines and the start packet are usually
    /// flushed together.
    pub fn classify(&self, chunk: &str, player_name: &str) -> Vec<OutputSignal> {
        let mut signals = Vec::new();

        if contains(chunk, &self.markers.replay_download_error) {
            signals.push(OutputSignal::ReplayDownloadFailed);
        }

        let roster_line = self.markers.team_markers.iter().any(|m| contains(chunk, m));
        if roster_line && let Some(seat) = extract_seat_index(chunk, player_name) {
            signals.push(OutputSignal::PositionDetected(seat));
        }

        if contains(chunk, &self.markers.game_start) {
            signals.push(OutputSignal::GameStarted);
        }

        if contains(chunk, &self.markers.game_end) {
            signals.push(OutputSignal::GameEnded);
        }

        signals
    }
}

/// Read the tracked player's roster seat out of a client output chunk.
///
/// Roster lines put the seat digit four characters before the player's name.
/// Returns `None` when the name is absent or the character at that position is
/// not a digit in `0..=4`.
pub fn extract_seat_index(chunk: &str, player_name: &str) -> Option<u8> {
    if player_name.is_empty() {
        return None;
    }

    let bytes = chunk.as_bytes();
    let name_pos = memmem::find(bytes, player_name.as_bytes())?;
    let digit = *bytes.get(name_pos.checked_sub(SEAT_DIGIT_OFFSET)?)?;

    if !digit.is_ascii_digit() {
        return None;
    }

    let seat = digit - b'0';
    (seat <= MAX_SEAT).then_some(seat)
}

fn contains(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some()
}
