use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

use app_error::{AppError, AppResult};
use app_models::{
    CampaignStatus, Donation, DonationCreate, DonationListResponse, DonationResponse,
    GiverProfile,
};

use super::require_user;
use crate::state::AppState;

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct DonationListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

async fn giver_profile_for(state: &AppState, user_id: String) -> AppResult<GiverProfile> {
    state
        .givers
        .get_records_by_field("user_id", user_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Giver profile"))
}

/// Paginate a pre-sorted donation list into the standard list envelope.
fn paginate(
    donations: Vec<Donation>,
    page: u64,
    page_size: u64,
    project: fn(Donation) -> DonationResponse,
) -> DonationListResponse {
    let total = donations.len() as u64;
    let total_amount = donations.iter().map(|d| d.amount).sum();

    let start = ((page - 1) * page_size) as usize;
    let page_items: Vec<DonationResponse> = donations
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .map(project)
        .collect();

    DonationListResponse {
        donations: page_items,
        total,
        total_amount,
        page,
        page_size,
    }
}

pub async fn create_donation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<DonationCreate>,
) -> AppResult<(StatusCode, Json<DonationResponse>)> {
    let user = require_user(&state, &headers).await?;

    if input.amount <= 0.0 {
        return Err(AppError::validation(
            "Donation amount must be greater than 0",
        ));
    }

    let campaign = state
        .campaigns
        .get_record_by_id(&input.campaign_id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    if campaign.status != CampaignStatus::Active {
        return Err(AppError::InputError(
            "Campaign is not accepting donations".to_string(),
        ));
    }

    let giver = giver_profile_for(&state, user.record_id()).await?;

    let donation = Donation::new(input, campaign.record_id(), giver.record_id());
    let stored = state
        .donations
        .create_record(donation)
        .await?
        .ok_or_else(|| {
            AppError::ServerError(anyhow::anyhow!("Database did not return stored donation"))
        })?;

    Ok((StatusCode::CREATED, Json(DonationResponse::owned(stored))))
}

/// Public listing for a campaign; anonymous donors stay anonymous.
pub async fn campaign_donations(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<DonationListQuery>,
) -> AppResult<Json<DonationListResponse>> {
    state
        .campaigns
        .get_record_by_id(&campaign_id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    let mut donations = state
        .donations
        .get_records_by_field("campaign_id", campaign_id)
        .await?;
    donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);

    Ok(Json(paginate(
        donations,
        page,
        page_size,
        DonationResponse::public,
    )))
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<String>,
) -> AppResult<Json<DonationResponse>> {
    let donation = state
        .donations
        .get_record_by_id(&donation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Donation"))?;

    Ok(Json(DonationResponse::public(donation)))
}

pub async fn my_donations(
    State(state): State<AppState>,
    Query(query): Query<DonationListQuery>,
    headers: HeaderMap,
) -> AppResult<Json<DonationListResponse>> {
    let user = require_user(&state, &headers).await?;
    let giver = giver_profile_for(&state, user.record_id()).await?;

    let mut donations = state
        .donations
        .get_records_by_field("giver_id", giver.record_id())
        .await?;
    donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);

    Ok(Json(paginate(
        donations,
        page,
        page_size,
        DonationResponse::owned,
    )))
}
