use super::types::{FileConfig, Settings};
use crate::error_handling::types::ConfigError;
use clap::Parser;
use regex::Regex;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_RTSP_URL: &str = "rtsp://192.168.1.20:8554/unicast";
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
pub const DEFAULT_OUTPUT_ROOT: &str = "./recordings";

/// Command-line configuration for the recording service.
///
/// Every option is optional on the command line: anything not given is looked
/// up in the TOML file named by `--config-file` (when present), and whatever
/// is still missing falls back to a built-in default. Call [`Configuration::resolve`]
/// to obtain the final [`Settings`].
///
/// # Fields Overview
///
/// - `port`: HTTP listen port; also selects the camera position name
/// - `rtsp_url`: shared RTSP source all sessions record from
/// - `width` / `height`: capture frame size
/// - `output_root`: base directory for recordings
/// - `config_file`: optional TOML file supplying any of the above
#[derive(Parser, Debug, Clone)]
#[command(name = "framegrab")]
#[command(about = "HTTP-controlled frame recorder for a shared RTSP source")]
pub struct Configuration {
    /// TCP port for the HTTP control surface.
    ///
    /// The port doubles as the camera identity: well-known ports map to a
    /// position name ("bottom", "middle", "top") that ends up in output paths.
    ///
    /// # Command Line
    /// Use `--port <PORT>` to set this value from the CLI. Defaults to 5000.
    #[arg(long)]
    port: Option<u16>,

    /// RTSP URL of the shared video source.
    ///
    /// Every recording session spawns a capture process against this one
    /// source; sessions differ only in where their frames are written.
    ///
    /// # Command Line
    /// Use `--rtsp-url <URL>` to set this value from the CLI.
    #[arg(long)]
    rtsp_url: Option<String>,

    /// Width of captured frames in pixels.
    ///
    /// # Command Line
    /// Use `--width <PIXELS>` to set this value from the CLI. Defaults to 1920.
    #[arg(long)]
    width: Option<u32>,

    /// Height of captured frames in pixels.
    ///
    /// # Command Line
    /// Use `--height <PIXELS>` to set this value from the CLI. Defaults to 1080.
    #[arg(long)]
    height: Option<u32>,

    /// Base directory under which recordings are written.
    ///
    /// Each session gets its own dated subdirectory beneath this root; the
    /// directory is created on demand.
    ///
    /// # Command Line
    /// Use `--output-root <PATH>` to set this value from the CLI.
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Optional TOML configuration file.
    ///
    /// File values fill in anything not given on the command line; command
    /// line values always win.
    ///
    /// # Command Line
    /// Use `--config-file <PATH>` to set this value from the CLI.
    #[arg(long)]
    config_file: Option<PathBuf>,
}

impl Configuration {
    /// Creates a new `Configuration` by parsing the command-line arguments.
    ///
    /// Argument validation and error reporting for malformed arguments is
    /// handled by `clap`; value-level validation (URL shape, frame size)
    /// happens later in [`Configuration::resolve`].
    pub fn from_args() -> Self {
        Configuration::parse()
    }

    #[cfg(test)]
    fn from_args_under_test(args: &[&str]) -> Result<Configuration, clap::Error> {
        Configuration::try_parse_from(args)
    }

    /// Resolves this configuration into concrete [`Settings`].
    ///
    /// Precedence per field: command line, then the `--config-file` TOML
    /// values, then the built-in default. The resolved values are validated
    /// before being returned.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the configuration file cannot be read
    /// or parsed, the RTSP URL is not an `rtsp://` URL, or the frame size has
    /// a zero dimension.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let file = match &self.config_file {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                toml::from_str::<FileConfig>(&raw)
                    .map_err(|e| ConfigError::TomlError(e.to_string()))?
            }
            None => FileConfig::default(),
        };

        let port = self.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let rtsp_url = self
            .rtsp_url
            .or(file.rtsp_url)
            .unwrap_or_else(|| DEFAULT_RTSP_URL.to_string());
        let width = self.width.or(file.width).unwrap_or(DEFAULT_WIDTH);
        let height = self.height.or(file.height).unwrap_or(DEFAULT_HEIGHT);
        let output_root = self
            .output_root
            .or(file.output_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));

        let url_shape = Regex::new(r"^rtsp://\S+$")
            .map_err(|e| ConfigError::BadSourceUrl(e.to_string()))?;
        if !url_shape.is_match(&rtsp_url) {
            return Err(ConfigError::BadSourceUrl(format!(
                "'{}' is not an rtsp:// URL",
                rtsp_url
            )));
        }
        if width == 0 || height == 0 {
            return Err(ConfigError::BadFrameSize(format!(
                "{}x{} has a zero dimension",
                width, height
            )));
        }

        let position = position_for_port(port);

        Ok(Settings {
            port,
            rtsp_url,
            width,
            height,
            output_root,
            position,
        })
    }
}

/// Maps a listen port onto the camera position name used in output paths.
///
/// Ports outside the well-known set get a generic `cam<port>` name so output
/// paths stay unambiguous when several instances share an output root.
pub fn position_for_port(port: u16) -> String {
    match port {
        5000 => "bottom".to_string(),
        5001 => "middle".to_string(),
        5002 => "top".to_string(),
        other => format!("cam{}", other),
    }
}
