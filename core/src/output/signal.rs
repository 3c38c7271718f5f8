/// A lifecycle milestone recognised in spectator client output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSignal {
    /// Tracked player's seat within their team roster (0-4).
    PositionDetected(u8),
    GameStarted,
    GameEnded,
    ReplayDownloadFailed,
}
