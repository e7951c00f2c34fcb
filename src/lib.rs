pub mod configuration;
pub mod error_handling;
pub mod frame_capture;
pub mod session_management;
pub mod web_interface;

pub use configuration::Configuration;
pub use session_management::{SessionManager, SessionState};
pub use web_interface::WebServer;
