use serde::Deserialize;
use std::path::PathBuf;

/// Settings as they appear in an optional TOML configuration file.
///
/// Every field is optional: values given on the command line take precedence,
/// file values fill the gaps, and built-in defaults cover the rest.
///
/// # Example file
///
/// ```toml
/// port = 5001
/// rtsp_url = "rtsp://192.168.1.20:8554/unicast"
/// width = 1280
/// height = 720
/// output_root = "/srv/recordings"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub rtsp_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub output_root: Option<PathBuf>,
}

/// Fully resolved runtime settings handed to the rest of the application.
///
/// # Fields Overview
///
/// - `port`: TCP port the control server listens on
/// - `rtsp_url`: the shared video source every recording session captures from
/// - `width` / `height`: frame size requested from the capture process
/// - `output_root`: base directory under which dated recording directories live
/// - `position`: camera position name derived from the port, used in output naming
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub rtsp_url: String,
    pub width: u32,
    pub height: u32,
    pub output_root: PathBuf,
    pub position: String,
}
