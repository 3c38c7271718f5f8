//! The external spectator client process.
//!
//! [`ProcessHost`] is the seam between the supervisor and the operating
//! system: it starts the client, streams its diagnostic output as chunks, and
//! kills it by executable name. The client is single-instance system-wide, so
//! there is no per-process handle to kill.

mod command;
mod system;

pub use command::LaunchCommand;
pub use system::{SystemProcessHost, decode_chunk};

use crate::error::ProcessError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Items streamed from a running spectator client, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutput {
    /// One read from the client's diagnostic stream.
    Chunk(String),
    /// The process is gone. Always the last item.
    Exited { code: Option<i32> },
}

/// A started spectator client.
#[derive(Debug)]
pub struct SpawnedProcess {
    pub pid: Option<u32>,
    pub output: mpsc::Receiver<ProcessOutput>,
}

#[async_trait]
pub trait ProcessHost: Send + Sync {
    async fn spawn(&self, command: &LaunchCommand) -> Result<SpawnedProcess, ProcessError>;

    /// Force-terminate every process with the given executable name.
    /// Finding nothing to kill is not an error.
    async fn kill_by_name(&self, image: &str) -> Result<(), ProcessError>;
}
