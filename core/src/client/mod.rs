//! Match-status lookup.

mod riot;

pub use riot::RiotClient;

use crate::error::ClientError;
use async_trait::async_trait;
use caster_types::{MatchDescriptor, TrackedPlayer};

/// Answers "is this player in a match right now?".
///
/// Implementations are expected to be rate limited upstream; any error is
/// treated by the caller as transient.
#[async_trait]
pub trait MatchStatusClient: Send + Sync {
    async fn active_match(
        &self,
        player: &TrackedPlayer,
        region: &str,
    ) -> Result<Option<MatchDescriptor>, ClientError>;

    /// Turn an operator-supplied name (`GameName#TAG`) into a trackable player.
    async fn resolve_player(&self, name: &str, region: &str) -> Result<TrackedPlayer, ClientError>;
}
