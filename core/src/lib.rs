//! Automated spectating of live matches.
//!
//! [`Spectator`] polls a [`MatchStatusClient`] for the tracked player, hands
//! each new match to the [`ProcessSupervisor`], which runs the external
//! spectator client, reads its diagnostic output through the
//! [`OutputParser`] and sets up the camera with the [`CameraAutomator`].
//! Progress is published as [`LifecycleEvent`]s.

pub mod camera;
pub mod client;
pub mod context;
pub mod error;
pub mod events;
pub mod output;
pub mod process;
pub mod spectator;
pub mod status;
pub mod supervisor;

pub use camera::CameraAutomator;
pub use client::{MatchStatusClient, RiotClient};
pub use context::AppConfig;
pub use error::SpectateError;
pub use events::{EventBus, LifecycleEvent};
pub use output::{OutputParser, OutputSignal};
pub use process::{ProcessHost, SystemProcessHost};
pub use spectator::{PollSettings, Spectator};
pub use status::StatusCell;
pub use supervisor::{ProcessSupervisor, SessionOutcome, SupervisorSettings};

pub use caster_types::*;

#[cfg(test)]
mod spectator_tests;
#[cfg(test)]
mod testing;
