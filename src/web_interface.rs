//! HTTP control surface: the recording API routes and the warp server
//! that hosts them together with the embedded dashboard.

pub mod routes;
pub mod web_server;

pub use web_server::WebServer;
