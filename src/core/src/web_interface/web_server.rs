use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::{Filter, Reply};

use super::routes::*;
use super::types::AppState;
use crate::auth_gate::AuthGate;
use crate::error_handling::types::WebError;
use crate::screenshot_channel::ScreenshotChannel;
use crate::work_queue::AckHandshake;

/// HTTP boundary in front of the handoff queue and the screenshot channel.
///
/// Holds no state of its own beyond the handles it was built with.
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(
        auth: AuthGate,
        queue: Arc<AckHandshake>,
        screenshots: Arc<ScreenshotChannel>,
        gallery_size: usize,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            state: AppState {
                auth,
                queue,
                screenshots,
                gallery_size,
                max_upload_bytes,
            },
        }
    }

    /// All routes composed into one filter. Rejections are answered with a
    /// JSON `ApiError`.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        let state = self.state.clone();

        index_route(state.clone())
            .or(static_route())
            .or(submit_route(state.clone()))
            .or(latest_route(state.clone()))
            .or(acknowledge_route(state.clone()))
            .or(interrupt_route(state.clone()))
            .or(force_unlock_route(state.clone()))
            .or(clear_queue_route(state.clone()))
            .or(status_route(state.clone()))
            .or(request_capture_route(state.clone()))
            .or(poll_capture_route(state.clone()))
            .or(upload_route(state.clone()))
            .or(list_screenshots_route(state.clone()))
            .or(clear_screenshots_route(state.clone()))
            .or(gallery_route(state))
            .recover(handle_rejection)
    }

    /// Start the web server on the given address
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        // warp panics when it cannot bind; probe first so an occupied port is
        // reported as an error.
        drop(
            std::net::TcpListener::bind(addr)
                .map_err(|e| WebError::BindFailed(format!("{}: {}", addr, e)))?,
        );
        info!("Web interface listening on http://{}", addr);

        warp::serve(self.routes()).run(addr).await;

        Ok(())
    }
}
