use chrono::{DateTime, Local};
use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error_handling::types::CaptureError;

/// Destination for the frames of one recording session.
///
/// Built fresh for every start from the grid label, the caller-supplied
/// counter token, the camera position and the start instant, so no two
/// sessions ever share the exact same frame paths.
///
/// # Fields Overview
///
/// - `directory`: dated per-grid directory the frames land in
/// - `file_pattern`: `%04d`-style file name pattern handed to the capture process
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub file_pattern: String,
}

impl OutputTarget {
    /// Constructs the output target for a session starting at `now`.
    ///
    /// Layout: `<root>/recordings_<date>/<label>-<position>/` holding files
    /// named `GRID_<label>_<token>_recording_<stamp>_<position>_frame_%04d.jpg`.
    /// The token is sanitized before use in file names.
    pub fn build(
        root: &Path,
        label: &str,
        token: &str,
        position: &str,
        now: DateTime<Local>,
    ) -> OutputTarget {
        let label = sanitize_component(label);
        let token = sanitize_component(token);
        let date = now.format("%Y-%m-%d");
        let stamp = now.format("%Y%m%d_%H%M%S");

        let directory = root
            .join(format!("recordings_{}", date))
            .join(format!("{}-{}", label, position));
        let file_pattern = format!(
            "GRID_{}_{}_recording_{}_{}_frame_%04d.jpg",
            label, token, stamp, position
        );

        OutputTarget {
            directory,
            file_pattern,
        }
    }

    /// Full pattern path passed to the capture process.
    pub fn pattern_path(&self) -> PathBuf {
        self.directory.join(&self.file_pattern)
    }

    /// Creates the destination directory if it does not exist yet.
    pub fn ensure_directory(&self) -> Result<(), CaptureError> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            error!(
                "Failed to create output directory {}: {}",
                self.directory.display(),
                e
            );
            CaptureError::OutputSetup(e)
        })
    }

    /// Counts the frames captured into this target so far.
    ///
    /// Best-effort: a missing or unreadable directory counts as zero frames
    /// rather than failing a status read.
    pub fn frame_count(&self) -> usize {
        frame_count(&self.directory)
    }
}

/// Counts the `.jpg` frames in `directory`, treating read failures as empty.
pub fn frame_count(directory: &Path) -> usize {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                "Could not read frame directory {}: {}",
                directory.display(),
                e
            );
            return 0;
        }
    };

    entries
        .flatten()
        .filter(|entry| {
            entry.path().extension().and_then(|s| s.to_str()) == Some("jpg")
        })
        .count()
}

/// Makes a caller-supplied string safe for use as a path component.
///
/// Colons come from clock-style counters and path separators would escape the
/// output root; both become dashes. The string is otherwise left alone.
pub fn sanitize_component(raw: &str) -> String {
    raw.replace([':', '/', '\\'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn builds_dated_directory_and_pattern() {
        let target = OutputTarget::build(
            Path::new("/srv/recordings"),
            "A-1-A",
            "c1",
            "bottom",
            fixed_instant(),
        );

        assert_eq!(
            target.directory,
            PathBuf::from("/srv/recordings/recordings_2025-03-14/A-1-A-bottom")
        );
        assert_eq!(
            target.file_pattern,
            "GRID_A-1-A_c1_recording_20250314_092653_bottom_frame_%04d.jpg"
        );
    }

    #[test]
    fn sanitizes_clock_style_tokens() {
        let target = OutputTarget::build(
            Path::new("/srv/recordings"),
            "A-1-A",
            "12:30:05",
            "top",
            fixed_instant(),
        );

        assert!(target.file_pattern.contains("12-30-05"));
        assert!(!target.file_pattern.contains(':'));
    }

    #[test]
    fn sanitizes_path_separators_in_labels() {
        let target = OutputTarget::build(
            Path::new("/srv/recordings"),
            "../escape",
            "c1",
            "top",
            fixed_instant(),
        );

        assert_eq!(
            target.directory,
            PathBuf::from("/srv/recordings/recordings_2025-03-14/..-escape-top")
        );
    }

    #[test]
    fn targets_differ_across_start_instants() {
        let a = OutputTarget::build(
            Path::new("/srv/recordings"),
            "A-1-A",
            "c1",
            "bottom",
            Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
        );
        let b = OutputTarget::build(
            Path::new("/srv/recordings"),
            "A-1-A",
            "c1",
            "bottom",
            Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 54).unwrap(),
        );

        assert_ne!(a.pattern_path(), b.pattern_path());
    }

    #[test]
    fn counts_only_jpg_frames() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frame_0001.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("frame_0002.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(frame_count(dir.path()), 2);
    }

    #[test]
    fn missing_directory_counts_as_empty() {
        assert_eq!(frame_count(Path::new("/definitely/not/here")), 0);
    }
}
