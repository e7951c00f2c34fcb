use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::frame_capture::output::OutputTarget;
use crate::frame_capture::process::Termination;
use crate::SessionState;

/// One active recording, keyed in the session table by its grid label.
///
/// The session exclusively owns its capture process: the process id and the
/// monitor task handle live here until the entry is removed, and nothing
/// outside the owning label's operations ever touches them.
#[derive(Debug)]
pub struct Session {
    /// Caller-chosen grid label; unique among active sessions.
    pub label: String,
    /// Identity of this particular session, so a monitor never mistakes a
    /// later session reusing the label for its own.
    pub id: Uuid,
    /// When the session was registered.
    pub started_at: DateTime<Local>,
    /// Where this session's frames are written.
    pub output: OutputTarget,
    /// Lifecycle state; table entries only ever show `Starting` or `Running`.
    pub state: SessionState,
    /// OS process id of the capture process once it has been spawned.
    pub pid: Option<u32>,
    /// Monitor task blocking on the capture process's exit.
    pub monitor: Option<JoinHandle<()>>,
}

impl Session {
    /// Creates a fresh reservation in state [`SessionState::Starting`].
    pub fn new(label: &str, output: OutputTarget) -> Self {
        Session {
            label: label.to_string(),
            id: Uuid::new_v4(),
            started_at: Local::now(),
            output,
            state: SessionState::Starting,
            pid: None,
            monitor: None,
        }
    }

    /// Seconds since the session was registered, clamped to zero.
    pub fn elapsed_seconds(&self) -> i64 {
        (Local::now() - self.started_at).num_seconds().max(0)
    }
}

/// Point-in-time view of one session, as returned by a status query.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub label: String,
    pub state: SessionState,
    pub started_at: DateTime<Local>,
    pub elapsed_seconds: i64,
    pub frames_captured: usize,
    pub output_directory: PathBuf,
}

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartReport {
    pub label: String,
    pub output_directory: PathBuf,
}

/// Result of stopping one session.
///
/// `termination` is `None` when the entry was claimed before a capture
/// process had been attached, so there was nothing to terminate.
#[derive(Debug, Clone)]
pub struct StopReport {
    pub label: String,
    pub termination: Option<Termination>,
}

/// Aggregate counters describing current and historical session activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    /// Number of sessions currently in the table.
    pub active_count: usize,
    /// Total sessions successfully started since manager init.
    pub total_started: u64,
    /// Total sessions stopped through an explicit stop.
    pub total_stopped: u64,
    /// Capture processes that died on their own and were reaped by a monitor.
    pub unsolicited_exits: u64,
}
