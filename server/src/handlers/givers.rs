use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;

use app_error::{AppError, AppResult};
use app_models::{
    GiverProfile, GiverProfileCreate, GiverProfileResponse, GiverProfileUpdate, ProfileType,
};

use super::require_user;
use crate::state::AppState;

async fn my_profile(state: &AppState, user_id: String) -> AppResult<GiverProfile> {
    state
        .givers
        .get_records_by_field("user_id", user_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Giver profile"))
}

pub async fn create_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GiverProfileCreate>,
) -> AppResult<(StatusCode, Json<GiverProfileResponse>)> {
    let user = require_user(&state, &headers).await?;

    if input.profile_type == ProfileType::Company
        && input.company_name.as_deref().unwrap_or("").trim().is_empty()
    {
        return Err(AppError::validation(
            "company_name is required for company profiles",
        ));
    }

    let existing = state
        .givers
        .get_records_by_field("user_id", user.record_id())
        .await?;
    if !existing.is_empty() {
        return Err(AppError::InputError(
            "Giver profile already exists".to_string(),
        ));
    }

    let profile = GiverProfile::new(user.record_id(), input);
    let stored = state.givers.create_record(profile).await?.ok_or_else(|| {
        AppError::ServerError(anyhow::anyhow!("Database did not return stored profile"))
    })?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

pub async fn get_my_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<GiverProfileResponse>> {
    let user = require_user(&state, &headers).await?;
    let profile = my_profile(&state, user.record_id()).await?;
    Ok(Json(profile.into()))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<GiverProfileUpdate>,
) -> AppResult<Json<GiverProfileResponse>> {
    let user = require_user(&state, &headers).await?;
    let mut profile = my_profile(&state, user.record_id()).await?;

    if let Some(company_name) = input.company_name {
        profile.company_name = Some(company_name);
    }
    if let Some(bio) = input.bio {
        profile.bio = Some(bio);
    }
    if let Some(website_url) = input.website_url {
        profile.website_url = Some(website_url);
    }
    if let Some(is_public) = input.is_public {
        profile.is_public = is_public;
    }
    profile.updated_at = Utc::now();

    let record_id = profile.record_id();
    let updated = state
        .givers
        .update_record(&record_id, profile)
        .await?
        .ok_or_else(|| AppError::not_found("Giver profile"))?;

    Ok(Json(updated.into()))
}

/// Public lookup by user id. Private profiles are indistinguishable from
/// absent ones.
pub async fn get_profile_by_user_id(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<GiverProfileResponse>> {
    let profile = state
        .givers
        .get_records_by_field("user_id", user_id)
        .await?
        .into_iter()
        .next()
        .filter(|profile| profile.is_public)
        .ok_or_else(|| AppError::not_found("Giver profile"))?;

    Ok(Json(profile.into()))
}
