use chrono::Local;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use crate::error_handling::types::SessionError;
use crate::session_management::SessionManager;

/// Dashboard page and its assets, embedded into the binary.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/src/web_interface/static"]
struct StaticAssets;

/// API error payload
#[derive(Serialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    pub grid_name: Option<String>,
    pub counter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StopQuery {
    pub grid_name: Option<String>,
}

#[derive(Serialize)]
pub struct StartResponse {
    pub grid_name: String,
    pub output_directory: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct StopResponse {
    pub stopped: Vec<String>,
    pub message: String,
}

/// GET /record/start?grid_name=..&counter=..
///
/// Missing `grid_name` falls back to `default`; missing `counter` falls back
/// to a per-request unix timestamp so the output target stays unique.
pub fn start_route(
    manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("record" / "start")
        .and(warp::get())
        .and(warp::query::<StartQuery>())
        .and_then(move |query: StartQuery| {
            let manager = manager.clone();
            async move {
                let grid_name = query.grid_name.unwrap_or_else(|| "default".to_string());
                let counter = query
                    .counter
                    .unwrap_or_else(|| format!("default_{}", Local::now().timestamp()));

                match manager.start(&grid_name, &counter).await {
                    Ok(report) => {
                        let res = reply::with_status(
                            reply::json(&StartResponse {
                                message: format!("Started recording grid {}", report.label),
                                output_directory: report.output_directory.display().to_string(),
                                grid_name: report.label,
                            }),
                            StatusCode::OK,
                        )
                        .into_response();
                        Ok::<_, Rejection>(res)
                    }
                    Err(e @ SessionError::AlreadyRecording(_)) => {
                        let res = reply::with_status(
                            reply::json(&ApiError {
                                message: e.to_string(),
                            }),
                            StatusCode::CONFLICT,
                        )
                        .into_response();
                        Ok::<_, Rejection>(res)
                    }
                    Err(e) => {
                        let res = reply::with_status(
                            reply::json(&ApiError {
                                message: e.to_string(),
                            }),
                            StatusCode::INTERNAL_SERVER_ERROR,
                        )
                        .into_response();
                        Ok::<_, Rejection>(res)
                    }
                }
            }
        })
}

/// GET /record/stop?grid_name=..
///
/// With `grid_name` this stops one recording; without it, every active
/// recording. Stopping a grid that is not recording is answered 200 with an
/// empty `stopped` list rather than an error.
pub fn stop_route(
    manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("record" / "stop")
        .and(warp::get())
        .and(warp::query::<StopQuery>())
        .and_then(move |query: StopQuery| {
            let manager = manager.clone();
            async move {
                let response = match query.grid_name {
                    Some(grid_name) => match manager.stop(&grid_name).await {
                        Ok(report) => StopResponse {
                            message: format!("Recording stopped for grid {}", report.label),
                            stopped: vec![report.label],
                        },
                        Err(e) => StopResponse {
                            stopped: Vec::new(),
                            message: e.to_string(),
                        },
                    },
                    None => {
                        let stopped = manager.stop_all().await;
                        let message = if stopped.is_empty() {
                            "No recordings are active".to_string()
                        } else {
                            format!("Stopped recording for grids: {}", stopped.join(", "))
                        };
                        StopResponse { stopped, message }
                    }
                };

                Ok::<_, Rejection>(reply::with_status(
                    reply::json(&response),
                    StatusCode::OK,
                ))
            }
        })
}

/// GET /status
pub fn status_route(
    manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || {
            let manager = manager.clone();
            async move {
                let reports = manager.status().await;
                Ok::<_, Rejection>(reply::with_status(reply::json(&reports), StatusCode::OK))
            }
        })
}

/// GET /
pub fn dashboard_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end().and(warp::get()).and_then(|| async move {
        match StaticAssets::get("index.html") {
            Some(page) => {
                let html = String::from_utf8_lossy(page.data.as_ref()).into_owned();
                Ok::<_, Rejection>(reply::html(html))
            }
            None => Err(warp::reject::not_found()),
        }
    })
}

/// GET /static/:asset
pub fn static_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("static")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|asset: String| async move {
            match StaticAssets::get(&asset) {
                Some(file) => {
                    let mime = mime_guess::from_path(&asset).first_or_octet_stream();
                    let res = reply::with_header(
                        file.data.into_owned(),
                        "Content-Type",
                        mime.as_ref(),
                    )
                    .into_response();
                    Ok::<_, Rejection>(res)
                }
                None => Err(warp::reject::not_found()),
            }
        })
}
