//! Session management core module.
//!
//! This module provides the core types and submodules for managing recording
//! sessions: the session table, the start/stop/status protocols, and the
//! per-session process monitors.

use serde::{Deserialize, Serialize};

/// Submodule for session data structures and reports.
pub mod session;
/// Submodule for the session manager implementation.
pub mod session_manager;

pub use session::{Session, SessionReport, SessionStats, StartReport, StopReport};
pub use session_manager::SessionManager;

/// Lifecycle state of a recording session.
///
/// Variants:
/// - `Starting`: the table entry exists but the capture process has not been
///   attached yet; the entry is the reservation.
/// - `Running`: the capture process is attached and being monitored.
/// - `Stopping`: a stop has claimed the session and termination is underway.
/// - `Terminated`: the capture process is confirmed exited.
///
/// Table entries only ever show `Starting` or `Running`; the last two states
/// exist on claimed sessions while their termination runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Starting,
    Running,
    Stopping,
    Terminated,
}
