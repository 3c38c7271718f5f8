//! Error taxonomy for the spectate core.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the match-status lookup. The polling loop treats every variant
/// as "no match this cycle".
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("player {0} not found")]
    PlayerNotFound(String),

    #[error("no API key configured (set api_key or RIOT_API_KEY)")]
    MissingApiKey,

    #[error("{0}")]
    Other(String),
}

/// Failures talking to the operating system about the spectator process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to kill {image}: {source}")]
    Kill {
        image: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of simulated keyboard/mouse input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input simulation is not supported on this platform")]
    Unsupported,

    #[error("failed to send {action}: {reason}")]
    Send { action: String, reason: String },
}

/// Game install discovery failures.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("base folder not found ({0})")]
    BaseFolderMissing(PathBuf),

    #[error("game folder not found ({0})")]
    GameFolderMissing(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save config: {0}")]
    Save(#[source] confy::ConfyError),
}

/// Errors surfaced by the orchestrator and the process supervisor.
#[derive(Debug, Error)]
pub enum SpectateError {
    #[error("no tracked player set")]
    NoTrackedPlayer,

    #[error("spectator client failed to download the replay")]
    ReplayDownloadFailed,

    #[error("spectator client crashed {attempts} times, giving up")]
    RetriesExhausted { attempts: u32 },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
