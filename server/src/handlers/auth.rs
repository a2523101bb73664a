use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};
use serde_json::json;

use app_error::AppResult;
use app_models::{LoginForm, RegisterRequest, TokenResponse, UserResponse};

use super::require_user;
use crate::extract::ClientKey;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ClientKey(client_key): ClientKey,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.register(&client_key, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login takes form-encoded credentials, not JSON, matching the OAuth2
/// password flow shape.
pub async fn login(
    State(state): State<AppState>,
    ClientKey(client_key): ClientKey,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth.login(&client_key, form).await?;
    Ok(Json(token))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<UserResponse>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Tokens are stateless; logout is a client-side delete. Kept for API
/// symmetry.
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Successfully logged out. Please remove the token from your client."
    }))
}
