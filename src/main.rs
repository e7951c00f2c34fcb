use framegrab::configuration::config::Configuration;
use framegrab::frame_capture::is_ffmpeg_available;
use framegrab::session_management::SessionManager;
use framegrab::web_interface::WebServer;
use log::{error, info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Example how to log
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
███████╗██████╗  █████╗ ███╗   ███╗███████╗ ██████╗ ██████╗  █████╗ ██████╗
██╔════╝██╔══██╗██╔══██╗████╗ ████║██╔════╝██╔════╝ ██╔══██╗██╔══██╗██╔══██╗
█████╗  ██████╔╝███████║██╔████╔██║█████╗  ██║  ███╗██████╔╝███████║██████╔╝
██╔══╝  ██╔══██╗██╔══██║██║╚██╔╝██║██╔══╝  ██║   ██║██╔══██╗██╔══██║██╔══██╗
██║     ██║  ██║██║  ██║██║ ╚═╝ ██║███████╗╚██████╔╝██║  ██║██║  ██║██████╔╝
╚═╝     ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝
============================================================================
                 HTTP-controlled RTSP frame recorder v0.1.0
============================================================================
"
    );

    info!("Resolving configuration");

    let settings = match Configuration::from_args().resolve() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Unable to resolve configuration: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    info!(
        "Recording from {} at {}x{} (position: {})",
        settings.rtsp_url, settings.width, settings.height, settings.position
    );

    if !is_ffmpeg_available() {
        warn!("ffmpeg was not found on PATH; recordings will fail to start");
    }

    let session_manager = Arc::new(SessionManager::new(&settings));
    let server = WebServer::new(Arc::clone(&session_manager));

    tokio::select! {
        _ = server.start(settings.port) => {
            error!("Web server stopped unexpectedly, exiting...");
            std::process::exit(1);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested, stopping all recordings");
            let stopped = session_manager.stop_all().await;
            info!("Stopped {} recording(s) on shutdown", stopped.len());
        }
    }
}
