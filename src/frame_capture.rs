//! Frame capture subsystem.
//!
//! Everything that touches the external capture process lives here: where a
//! session's frames go, how the ffmpeg command line is built and spawned, and
//! the two-phase termination used to shut a capture process down.
//!
//! Components:
//! - `output`: per-session output targets and frame counting.
//! - `command`: the [`CaptureSpawner`] seam and its ffmpeg implementation.
//! - `process`: graceful-then-forced termination of a running capture.

pub mod command;
pub mod output;
pub mod process;

pub use command::{is_ffmpeg_available, CaptureSpawner, FfmpegCapture};
pub use output::OutputTarget;
pub use process::{terminate_with_grace, Termination, GRACE_PERIOD};
