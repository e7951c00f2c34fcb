use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::Filter;

use crate::session_management::SessionManager;
use crate::web_interface::routes;

/// Web server for the recording control API and dashboard
pub struct WebServer {
    session_manager: Arc<SessionManager>,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(session_manager: Arc<SessionManager>) -> Self {
        Self { session_manager }
    }

    /// Start the web server on the given port
    pub async fn start(&self, port: u16) {
        let routes = routes::dashboard_route()
            .or(routes::static_route())
            .or(routes::start_route(Arc::clone(&self.session_manager)))
            .or(routes::stop_route(Arc::clone(&self.session_manager)))
            .or(routes::status_route(Arc::clone(&self.session_manager)));

        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        info!("Web interface listening on http://{}", addr);

        warp::serve(routes).run(addr).await;
    }
}
