pub mod health;
pub mod photo;

use axum::Router;

use crate::state::AppState;

/// Build the route tree served at the root, `/api` and `/api/v1`.
///
/// ```text
/// /health              service health
/// /photo               upload (POST, multipart)
/// /photo/{id}          processed photo details
/// /photo/raw/{id}      raw photo details
/// ```
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(photo::router(state))
}
