use log::{debug, error};
use std::process::Stdio;
use tokio::process::{Child, Command};

use super::output::OutputTarget;
use crate::configuration::types::Settings;
use crate::error_handling::types::CaptureError;

/// Spawns the external process that captures frames for one session.
///
/// The session manager only depends on this seam; production uses
/// [`FfmpegCapture`] while tests substitute harmless stand-in commands.
pub trait CaptureSpawner: Send + Sync {
    /// Starts a capture process writing frames into `target`.
    ///
    /// The returned child is configured to be killed if its handle is
    /// dropped, so an abandoned session cannot leak a recorder process.
    fn spawn_capture(&self, target: &OutputTarget) -> Result<Child, CaptureError>;
}

/// ffmpeg-backed frame capture from a shared RTSP source.
///
/// One instance is shared by every session; sessions differ only in the
/// output target handed to [`CaptureSpawner::spawn_capture`].
pub struct FfmpegCapture {
    rtsp_url: String,
    width: u32,
    height: u32,
}

impl FfmpegCapture {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rtsp_url: settings.rtsp_url.clone(),
            width: settings.width,
            height: settings.height,
        }
    }

    /// Builds the ffmpeg argument vector for `target`.
    ///
    /// Frames are sampled at one per 0.7 seconds, scaled to the configured
    /// size and written as quality-2 JPEGs into the target's `%04d` pattern.
    fn args(&self, target: &OutputTarget) -> Vec<String> {
        vec![
            "-rtsp_transport".to_string(),
            "tcp".to_string(),
            "-i".to_string(),
            self.rtsp_url.clone(),
            "-vf".to_string(),
            format!("fps=1/0.7,scale={}:{}", self.width, self.height),
            "-q:v".to_string(),
            "2".to_string(),
            "-an".to_string(),
            target.pattern_path().to_string_lossy().into_owned(),
        ]
    }
}

impl CaptureSpawner for FfmpegCapture {
    fn spawn_capture(&self, target: &OutputTarget) -> Result<Child, CaptureError> {
        let args = self.args(target);
        debug!("Spawning ffmpeg with args: {:?}", args);

        Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn ffmpeg for {}: {}", self.rtsp_url, e);
                CaptureError::SpawnFailed(e)
            })
    }
}

/// Checks whether ffmpeg can be invoked on this system.
pub fn is_ffmpeg_available() -> bool {
    let available = std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    debug!("ffmpeg availability check: {}", available);
    available
}
