use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadSourceUrl(String),
    BadFrameSize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadSourceUrl(e) => write!(f, "Source URL error: {}", e),
            ConfigError::BadFrameSize(e) => write!(f, "Frame size error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum CaptureError {
    OutputSetup(std::io::Error),
    SpawnFailed(std::io::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::OutputSetup(e) => write!(f, "Output directory setup failed: {}", e),
            CaptureError::SpawnFailed(e) => write!(f, "Capture process spawn failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

#[derive(Debug)]
pub enum SessionError {
    AlreadyRecording(String),
    NotRecording(String),
    CaptureError(CaptureError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyRecording(label) => {
                write!(f, "Recording already active for grid '{}'", label)
            }
            SessionError::NotRecording(label) => {
                write!(f, "No active recording for grid '{}'", label)
            }
            SessionError::CaptureError(e) => write!(f, "Capture error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        SessionError::CaptureError(err)
    }
}
