//! Scripted stand-ins for the outside world, shared by the async tests.

use crate::camera::{CameraAutomator, InputAction, InputDriver};
use crate::client::MatchStatusClient;
use crate::error::{ClientError, InputError, ProcessError};
use crate::events::{EventBus, LifecycleEvent};
use crate::output::OutputParser;
use crate::process::{LaunchCommand, ProcessHost, ProcessOutput, SpawnedProcess};
use crate::spectator::{PollSettings, Spectator};
use crate::status::StatusCell;
use crate::supervisor::{ProcessSupervisor, SupervisorSettings};
use async_trait::async_trait;
use caster_types::{
    MatchDescriptor, ObserverCredentials, OutputMarkers, Participant, TeamSide, Timings,
    TrackedPlayer,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub const PLAYER_ID: &str = "puuid-alice";
pub const PLAYER_NAME: &str = "Alice";

pub fn alice() -> TrackedPlayer {
    TrackedPlayer::new(PLAYER_ID, PLAYER_NAME)
}

/// A match with Alice in blue seat 2.
pub fn game(match_id: u64) -> MatchDescriptor {
    let mut participants: Vec<Participant> = (0..5)
        .map(|seat| Participant {
            seat,
            side: TeamSide::Blue,
            player_id: format!("blue-{seat}"),
            name: format!("Blue{seat}"),
        })
        .collect();
    participants[2].player_id = PLAYER_ID.to_string();
    participants[2].name = PLAYER_NAME.to_string();
    participants.extend((0..5).map(|seat| Participant {
        seat,
        side: TeamSide::Red,
        player_id: format!("red-{seat}"),
        name: format!("Red{seat}"),
    }));

    MatchDescriptor {
        match_id,
        region: "EUW1".to_string(),
        participants,
        credentials: ObserverCredentials {
            host: "observer.test".to_string(),
            port: 80,
            encryption_key: "key".to_string(),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Match status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeClient {
    current: Mutex<Option<MatchDescriptor>>,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeClient {
    /// Fail the next `n` lookups with a server error.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn set_match(&self, game: Option<MatchDescriptor>) {
        *self.current.lock().unwrap() = game;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchStatusClient for FakeClient {
    async fn active_match(
        &self,
        _player: &TrackedPlayer,
        _region: &str,
    ) -> Result<Option<MatchDescriptor>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.current.lock().unwrap().clone())
    }

    async fn resolve_player(&self, name: &str, _region: &str) -> Result<TrackedPlayer, ClientError> {
        if name == PLAYER_NAME {
            Ok(alice())
        } else {
            Err(ClientError::PlayerNotFound(name.to_string()))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Process host
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct HostState {
    alive: Vec<mpsc::Sender<ProcessOutput>>,
    spawned: usize,
    kills: usize,
    max_alive: usize,
    kill_delay: Duration,
}

/// Hands out in-memory processes whose output the test writes.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    /// Make `kill_by_name` take a while after signalling, like taskkill does.
    pub fn set_kill_delay(&self, delay: Duration) {
        self.state.lock().unwrap().kill_delay = delay;
    }

    /// Write a chunk to the most recently started live process.
    pub fn emit(&self, text: &str) {
        let state = self.state.lock().unwrap();
        let tx = state.alive.last().expect("no live process");
        tx.try_send(ProcessOutput::Chunk(text.to_string())).unwrap();
    }

    /// Make the most recently started live process exit on its own.
    pub fn crash(&self, code: i32) {
        let mut state = self.state.lock().unwrap();
        let tx = state.alive.pop().expect("no live process");
        tx.try_send(ProcessOutput::Exited { code: Some(code) }).unwrap();
    }

    pub fn spawned(&self) -> usize {
        self.state.lock().unwrap().spawned
    }

    pub fn kills(&self) -> usize {
        self.state.lock().unwrap().kills
    }

    pub fn max_alive(&self) -> usize {
        self.state.lock().unwrap().max_alive
    }
}

#[async_trait]
impl ProcessHost for FakeHost {
    async fn spawn(&self, _command: &LaunchCommand) -> Result<SpawnedProcess, ProcessError> {
        let (tx, rx) = mpsc::channel(16);
        let mut state = self.state.lock().unwrap();
        state.alive.retain(|tx| !tx.is_closed());
        state.alive.push(tx);
        state.spawned += 1;
        state.max_alive = state.max_alive.max(state.alive.len());

        Ok(SpawnedProcess {
            pid: Some(1000 + state.spawned as u32),
            output: rx,
        })
    }

    async fn kill_by_name(&self, _image: &str) -> Result<(), ProcessError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.kills += 1;
            for tx in state.alive.drain(..) {
                let _ = tx.try_send(ProcessOutput::Exited { code: None });
            }
            state.kill_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDriver {
    actions: Mutex<Vec<InputAction>>,
}

impl RecordingDriver {
    pub fn actions(&self) -> Vec<InputAction> {
        self.actions.lock().unwrap().clone()
    }
}

impl InputDriver for RecordingDriver {
    fn perform(&self, action: &InputAction) -> Result<(), InputError> {
        self.actions.lock().unwrap().push(action.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembly
// ─────────────────────────────────────────────────────────────────────────────

pub struct Harness {
    pub spectator: Spectator,
    pub client: Arc<FakeClient>,
    pub host: Arc<FakeHost>,
    pub driver: Arc<RecordingDriver>,
    pub events: broadcast::Receiver<LifecycleEvent>,
}

pub fn supervisor_settings(max_launch_retries: Option<u32>) -> SupervisorSettings {
    SupervisorSettings {
        executable: "League of Legends.exe".to_string(),
        game_dir: PathBuf::from("game"),
        locale: "en_GB".to_string(),
        timings: Timings::default(),
        max_launch_retries,
    }
}

pub fn supervisor(
    host: Arc<FakeHost>,
    driver: Arc<RecordingDriver>,
    max_launch_retries: Option<u32>,
    events: EventBus,
    status: StatusCell,
) -> ProcessSupervisor {
    let timings = Timings::default();
    ProcessSupervisor::new(
        host,
        CameraAutomator::new(driver, timings.input_delay()),
        OutputParser::new(OutputMarkers::default()),
        supervisor_settings(max_launch_retries),
        events,
        status,
    )
}

pub fn harness() -> Harness {
    let client = Arc::new(FakeClient::default());
    let host = Arc::new(FakeHost::default());
    let driver = Arc::new(RecordingDriver::default());
    let events = EventBus::new();
    let status = StatusCell::new();
    let receiver = events.subscribe();

    let supervisor = supervisor(
        Arc::clone(&host),
        Arc::clone(&driver),
        Some(5),
        events.clone(),
        status.clone(),
    );
    let settings = PollSettings {
        region: "EUW1".to_string(),
        interval: Timings::default().poll_interval(),
        requeue_failed_downloads: true,
    };
    let spectator = Spectator::new(client.clone(), supervisor, settings, events, status);

    Harness {
        spectator,
        client,
        host,
        driver,
        events: receiver,
    }
}

/// Everything emitted since the last drain.
pub fn drain(events: &mut broadcast::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub fn names(events: &[LifecycleEvent]) -> Vec<&'static str> {
    events.iter().map(LifecycleEvent::name).collect()
}
