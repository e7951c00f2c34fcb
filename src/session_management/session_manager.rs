use chrono::Local;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::configuration::types::Settings;
use crate::error_handling::types::SessionError;
use crate::frame_capture::command::{CaptureSpawner, FfmpegCapture};
use crate::frame_capture::output::OutputTarget;
use crate::frame_capture::process::{terminate_with_grace, Termination, GRACE_PERIOD};
use crate::session_management::session::{
    Session, SessionReport, SessionStats, StartReport, StopReport,
};
use crate::SessionState;

type SessionTable = HashMap<String, Session>;

/// Orchestrates recording sessions against the shared video source.
///
/// The session table is the sole source of truth for "is this grid
/// recording": a label is recording exactly when it has an entry, and
/// everything derived from that (the dashboard, stop-all sweeps, conflict
/// checks) reads the table rather than tracking its own flag.
///
/// Design notes:
/// - The table lock serializes all mutations; the entry itself is the
///   reservation, so a second start for the same label loses even while the
///   first is still spawning its capture process.
/// - Stops claim the entry by removing it under the lock. Whoever removes
///   the entry owns the termination sequence, which makes concurrent stops
///   for one label naturally idempotent.
/// - Each session gets one monitor task that blocks on process exit and
///   reaps the table entry if the process dies on its own.
pub struct SessionManager {
    output_root: PathBuf,
    position: String,
    spawner: Arc<dyn CaptureSpawner>,
    sessions: Arc<Mutex<SessionTable>>,
    stats: Arc<Mutex<SessionStats>>,
}

impl SessionManager {
    /// Creates a manager capturing with ffmpeg per the given settings.
    pub fn new(settings: &Settings) -> Self {
        info!(
            "Initializing SessionManager (source: {}, output root: {}, position: {})",
            settings.rtsp_url,
            settings.output_root.display(),
            settings.position
        );
        Self::with_spawner(settings, Arc::new(FfmpegCapture::new(settings)))
    }

    /// Creates a manager with a custom capture backend.
    pub fn with_spawner(settings: &Settings, spawner: Arc<dyn CaptureSpawner>) -> Self {
        SessionManager {
            output_root: settings.output_root.clone(),
            position: settings.position.clone(),
            spawner,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(SessionStats::default())),
        }
    }

    /// Starts a recording session for `label`.
    ///
    /// Under the table lock this builds the output target, creates its
    /// directory and registers the reservation; the capture process is then
    /// spawned outside the lock and attached afterwards, together with the
    /// monitor task that will reap the entry if the process dies on its own.
    ///
    /// Side effects: one external capture process and one monitor task.
    ///
    /// Errors with [`SessionError::AlreadyRecording`] if the label has an
    /// active session, and with [`SessionError::CaptureError`] if the output
    /// directory cannot be created or the process cannot be spawned; in both
    /// failure cases the table is left without an entry for `label`.
    pub async fn start(&self, label: &str, token: &str) -> Result<StartReport, SessionError> {
        let (id, output) = {
            let mut sessions = self.sessions.lock().await;
            if sessions.contains_key(label) {
                debug!("Start refused for '{}': already recording", label);
                return Err(SessionError::AlreadyRecording(label.to_string()));
            }

            let output = OutputTarget::build(
                &self.output_root,
                label,
                token,
                &self.position,
                Local::now(),
            );
            output.ensure_directory()?;

            let session = Session::new(label, output.clone());
            let id = session.id;
            info!("Reserved recording session '{}' ({})", label, id);
            sessions.insert(label.to_string(), session);
            (id, output)
        };

        let child = match self.spawner.spawn_capture(&output) {
            Ok(child) => child,
            Err(e) => {
                self.roll_back_reservation(label, id).await;
                return Err(SessionError::CaptureError(e));
            }
        };
        let pid = child.id();

        let mut pending = Some(child);
        let attached = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get_mut(label) {
                Some(session) if session.id == id => {
                    if let Some(child) = pending.take() {
                        session.state = SessionState::Running;
                        session.pid = pid;
                        session.monitor = Some(tokio::spawn(monitor_capture(
                            label.to_string(),
                            id,
                            child,
                            Arc::clone(&self.sessions),
                            Arc::clone(&self.stats),
                        )));
                    }
                    true
                }
                _ => false,
            }
        };

        let report = StartReport {
            label: label.to_string(),
            output_directory: output.directory.clone(),
        };

        if attached {
            self.stats.lock().await.total_started += 1;
            info!(
                "Recording '{}' running (pid {:?}); frames go to {}",
                label,
                pid,
                output.directory.display()
            );
            return Ok(report);
        }

        // A stop swept the reservation while the process was spawning; the
        // session already counts as stopped, so the stray process just gets
        // killed.
        warn!(
            "Session '{}' was stopped before its capture process attached; killing pid {:?}",
            label, pid
        );
        if let Some(mut child) = pending {
            if let Err(e) = child.kill().await {
                warn!(
                    "Failed to kill detached capture process for '{}': {}",
                    label, e
                );
            }
        }
        Ok(report)
    }

    /// Stops the recording session for `label`.
    ///
    /// Removing the entry under the lock claims the session; only the
    /// claiming caller runs the termination sequence (graceful request,
    /// bounded grace period, forced kill), so concurrent stops cannot
    /// double-terminate. A forced kill is not an error: the report still
    /// says stopped, with the escalation noted in [`StopReport::termination`].
    ///
    /// Errors with [`SessionError::NotRecording`] if nothing is recording
    /// under `label`; for a concurrent second stop that is the expected
    /// benign outcome, not a failure.
    pub async fn stop(&self, label: &str) -> Result<StopReport, SessionError> {
        let mut session = {
            let mut sessions = self.sessions.lock().await;
            match sessions.remove(label) {
                Some(session) => session,
                None => {
                    debug!("Stop requested for '{}' but it is not recording", label);
                    return Err(SessionError::NotRecording(label.to_string()));
                }
            }
        };

        session.state = SessionState::Stopping;
        info!("Stopping recording '{}' ({})", label, session.id);

        let termination = match (session.pid, session.monitor.take()) {
            (Some(pid), Some(monitor)) => {
                // Signals by raw pid. If the monitor has already reaped the
                // child the pid could in principle be recycled before the
                // signal lands; a pidfd would close that window.
                let exited = async move {
                    if let Err(e) = monitor.await {
                        warn!("Monitor for process {} ended abnormally: {}", pid, e);
                    }
                };
                Some(terminate_with_grace(pid, GRACE_PERIOD, exited).await)
            }
            _ => {
                debug!(
                    "No capture process attached to '{}' yet; nothing to terminate",
                    label
                );
                None
            }
        };

        session.state = SessionState::Terminated;
        self.stats.lock().await.total_stopped += 1;

        match termination {
            Some(Termination::Forced) => {
                warn!("Recording '{}' stopped after a forced kill", label)
            }
            _ => info!("Recording '{}' stopped", label),
        }

        Ok(StopReport {
            label: label.to_string(),
            termination,
        })
    }

    /// Stops every active session and returns the labels that were stopped.
    ///
    /// Best-effort sweep over a snapshot of the table's membership: a label
    /// that starts concurrently with the sweep may or may not be included,
    /// and a label another caller stops first is silently skipped.
    pub async fn stop_all(&self) -> Vec<String> {
        let labels: Vec<String> = {
            let sessions = self.sessions.lock().await;
            sessions.keys().cloned().collect()
        };

        if labels.is_empty() {
            debug!("Stop-all requested with no active recordings");
            return Vec::new();
        }

        info!("Stopping all recordings: {:?}", labels);
        let mut stopped = Vec::new();
        for label in labels {
            match self.stop(&label).await {
                Ok(report) => stopped.push(report.label),
                Err(e) => debug!("Skipping '{}' during stop-all: {}", label, e),
            }
        }
        stopped
    }

    /// Reports every active session: label, state, elapsed time and how many
    /// frames its capture process has written so far.
    ///
    /// Takes a snapshot under the lock and inspects output directories after
    /// releasing it, so a status read never waits on process monitoring.
    pub async fn status(&self) -> Vec<SessionReport> {
        let snapshot: Vec<(String, SessionState, chrono::DateTime<Local>, i64, OutputTarget)> = {
            let sessions = self.sessions.lock().await;
            sessions
                .values()
                .map(|s| {
                    (
                        s.label.clone(),
                        s.state,
                        s.started_at,
                        s.elapsed_seconds(),
                        s.output.clone(),
                    )
                })
                .collect()
        };

        let mut reports: Vec<SessionReport> = snapshot
            .into_iter()
            .map(|(label, state, started_at, elapsed_seconds, output)| SessionReport {
                label,
                state,
                started_at,
                elapsed_seconds,
                frames_captured: output.frame_count(),
                output_directory: output.directory,
            })
            .collect();
        reports.sort_by(|a, b| a.label.cmp(&b.label));
        reports
    }

    /// Whether `label` currently has an active session.
    pub async fn is_active(&self, label: &str) -> bool {
        self.sessions.lock().await.contains_key(label)
    }

    /// Labels of all active sessions, sorted.
    pub async fn list_active(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Returns a snapshot of current counters. `active_count` is recomputed
    /// from the table to stay accurate.
    pub async fn get_stats(&self) -> SessionStats {
        let mut stats = self.stats.lock().await.clone();
        stats.active_count = self.sessions.lock().await.len();
        debug!(
            "Retrieved session stats: active={}, started={}, stopped={}, unsolicited={}",
            stats.active_count, stats.total_started, stats.total_stopped, stats.unsolicited_exits
        );
        stats
    }

    /// Removes a reservation that never got its capture process.
    async fn roll_back_reservation(&self, label: &str, id: Uuid) {
        let mut sessions = self.sessions.lock().await;
        let is_mine = matches!(sessions.get(label), Some(current) if current.id == id);
        if is_mine {
            sessions.remove(label);
            warn!("Rolled back reservation for '{}' after spawn failure", label);
        } else {
            debug!("Reservation for '{}' already gone during rollback", label);
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        match self.sessions.try_lock() {
            Ok(sessions) if !sessions.is_empty() => {
                warn!(
                    "SessionManager dropped with {} active recordings - their capture processes die with their handles instead of being stopped",
                    sessions.len()
                );
                let remaining: Vec<_> = sessions.keys().cloned().collect();
                warn!("Remaining recording labels: {:?}", remaining);
            }
            Ok(_) => debug!("SessionManager dropped cleanly with no active recordings"),
            Err(_) => debug!("SessionManager dropped while the session table was locked"),
        }
    }
}

/// Watches one capture process and reaps its table entry if it dies
/// unsolicited.
///
/// Blocks on process exit, then removes the entry only if it is still this
/// session. An explicit stop (or a later session reusing the label) leaves
/// nothing for the monitor to do.
async fn monitor_capture(
    label: String,
    id: Uuid,
    mut child: Child,
    sessions: Arc<Mutex<SessionTable>>,
    stats: Arc<Mutex<SessionStats>>,
) {
    let status = child.wait().await;

    let removed = {
        let mut sessions = sessions.lock().await;
        let is_mine = matches!(sessions.get(&label), Some(current) if current.id == id);
        if is_mine {
            sessions.remove(&label);
        }
        is_mine
    };

    if removed {
        match status {
            Ok(exit) => warn!(
                "Capture process for '{}' exited on its own ({}); session removed",
                label, exit
            ),
            Err(e) => warn!(
                "Capture process for '{}' could not be awaited ({}); session removed",
                label, e
            ),
        }
        stats.lock().await.unsolicited_exits += 1;
    } else {
        debug!(
            "Monitor for '{}' found its entry already claimed; nothing to reap",
            label
        );
    }
}
