pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod givers;
pub mod users;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::json;

use app_error::{AppError, AppResult};
use app_models::User;

use crate::extract::bearer_token;
use crate::state::AppState;

/// Resolve the request's bearer token to a user, or fail with the
/// generic 401.
pub(crate) async fn require_user(state: &AppState, headers: &HeaderMap) -> AppResult<User> {
    let token =
        bearer_token(headers).ok_or_else(|| AppError::could_not_validate_credentials())?;
    state.auth.current_user(token).await
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the Fundraiser Platform API",
        "version": "0.1.0"
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.db.query("RETURN 1").run().await {
        Ok(_) => Json(json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => Json(json!({
            "status": "unhealthy",
            "database": "disconnected",
            "error": e.to_string()
        })),
    }
}
