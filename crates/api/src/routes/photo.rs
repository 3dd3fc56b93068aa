use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::photo;
use crate::state::AppState;

/// Allowance for multipart boundaries and the text parts around the file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Mount photo routes.
///
/// The upload route's body limit follows the configured maximum file size,
/// so an oversized body fails while streaming rather than after buffering.
pub fn router(state: &AppState) -> Router<AppState> {
    let max_bytes = state.config.upload_limits().max_bytes;
    let body_limit = usize::try_from(max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/photo",
            post(photo::upload_photo).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/photo/{id}", get(photo::get_photo))
        .route("/photo/raw/{id}", get(photo::get_raw_photo))
}
