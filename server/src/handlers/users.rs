use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;

use app_auth::validation;
use app_error::{AppError, AppResult};
use app_models::{UserResponse, UserUpdate};

use super::require_user;
use crate::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<UserResponse>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    let mut user = require_user(&state, &headers).await?;

    if let Some(email) = input.email {
        let email = validation::sanitize_string(&email);
        if let Err(message) = validation::validate_email(&email) {
            return Err(AppError::validation(message));
        }

        if email != user.email {
            let taken = state
                .users
                .get_records_by_field("email", email.clone())
                .await?;
            if !taken.is_empty() {
                return Err(AppError::email_registered());
            }
            user.email = email;
        }
    }

    if let Some(full_name) = input.full_name {
        let full_name = validation::sanitize_string(&full_name);
        if let Err(message) = validation::validate_full_name(&full_name) {
            return Err(AppError::validation(message));
        }
        user.full_name = if full_name.is_empty() {
            None
        } else {
            Some(full_name)
        };
    }

    user.updated_at = Utc::now();

    let record_id = user.record_id();
    let updated = state
        .users
        .update_record(&record_id, user)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(Json(UserResponse::from(updated)))
}
