use super::AppState;
use crate::types::ServiceInfo;
use axum::{Json, extract::State};

pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        id: "ifcb-roi".to_string(),
        name: "ifcb_roi".to_string(),
        description: "Service for accessing IFCB ROI images and associated technical metadata."
            .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend,
        read_only: state.service.store().read_only(),
    })
}
