use serde::{Deserialize, Serialize};

/// The player whose matches are spectated.
///
/// `id` is what the match-status API is queried with; `name` is the in-game
/// display name, which is what shows up in the spectator client's output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedPlayer {
    pub id: String,
    pub name: String,
}

impl TrackedPlayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TrackedPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Which side of the map a participant plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    /// Team 100, "TeamOrder" in client output.
    Blue,
    /// Team 200, "TeamChaos" in client output.
    Red,
}

impl TeamSide {
    pub fn from_team_id(team_id: u16) -> Option<Self> {
        match team_id {
            100 => Some(Self::Blue),
            200 => Some(Self::Red),
            _ => None,
        }
    }

    pub fn team_id(&self) -> u16 {
        match self {
            Self::Blue => 100,
            Self::Red => 200,
        }
    }
}

/// One seat of the match roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Position within the team roster (0-4).
    pub seat: u8,
    pub side: TeamSide,
    pub player_id: String,
    pub name: String,
}

/// Observer endpoint and key required to attach a spectator client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverCredentials {
    pub host: String,
    pub port: u16,
    pub encryption_key: String,
}

/// Immutable snapshot of an active match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDescriptor {
    pub match_id: u64,
    /// Platform id the match is hosted on, e.g. `EUW1`.
    pub region: String,
    pub participants: Vec<Participant>,
    pub credentials: ObserverCredentials,
}

impl MatchDescriptor {
    /// Roster entry for the given player id, if they are in this match.
    pub fn participant(&self, player_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player_id)
    }

    pub fn side_of(&self, player_id: &str) -> Option<TeamSide> {
        self.participant(player_id).map(|p| p.side)
    }
}
