use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, links_handler, proxy_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(links_handler))
            .route("/health", get(health_handler))
            .route("/files/{name}", get(proxy_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
