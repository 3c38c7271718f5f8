use caster_types::SpectatorStatus;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared, observable spectator status.
///
/// Written by the polling loop and the supervisor. Once the loop has gone
/// `Idle`, only the loop may move it out again.
#[derive(Debug, Clone)]
pub struct StatusCell {
    tx: Arc<watch::Sender<SpectatorStatus>>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SpectatorStatus::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> SpectatorStatus {
        *self.tx.borrow()
    }

    pub fn set(&self, status: SpectatorStatus) {
        self.tx.send_replace(status);
    }

    /// Update unless the spectator has been stopped. Returns whether it changed.
    pub fn advance(&self, status: SpectatorStatus) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == SpectatorStatus::Idle || *current == status {
                return false;
            }
            *current = status;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SpectatorStatus> {
        self.tx.subscribe()
    }
}
