use super::AppState;
use crate::{Result, types::RoiImage};
use axum::{
    Json,
    extract::{Path, State},
};

/// Fetch one ROI image as base64-encoded PNG.
pub async fn get_roi_image(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<RoiImage>> {
    tracing::info!(%pid, "ROI image requested");
    let roi = state.service.fetch_roi(&pid).await?;
    Ok(Json(roi))
}
