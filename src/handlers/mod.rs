mod roi;
mod service_info;

pub use roi::get_roi_image;
pub use service_info::service_info;

use crate::service::RoiService;
use crate::types::BackendKind;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: RoiService,
    pub backend: BackendKind,
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/roi-image/:pid", get(get_roi_image))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
