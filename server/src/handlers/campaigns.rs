use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use app_error::{AppError, AppResult};
use app_models::{
    Campaign, CampaignCreate, CampaignListResponse, CampaignResponse, CampaignStatus,
    CampaignType, CampaignUpdate,
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
pub struct CampaignListQuery {
    pub status: Option<CampaignStatus>,
    pub campaign_type: Option<CampaignType>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn validate_campaign_fields(
    title: Option<&str>,
    description: Option<&str>,
    goal_amount: Option<f64>,
) -> AppResult<()> {
    let mut problems = Vec::new();

    if let Some(title) = title {
        let len = title.chars().count();
        if !(5..=255).contains(&len) {
            problems.push("Title must be between 5 and 255 characters".to_string());
        }
    }

    if let Some(description) = description {
        if description.chars().count() < 20 {
            problems.push("Description must be at least 20 characters".to_string());
        }
    }

    if let Some(goal) = goal_amount {
        if goal <= 0.0 {
            problems.push("Goal amount must be greater than 0".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(problems))
    }
}

pub async fn create_campaign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CampaignCreate>,
) -> AppResult<(StatusCode, Json<CampaignResponse>)> {
    let user = require_user(&state, &headers).await?;

    validate_campaign_fields(
        Some(input.title.as_str()),
        Some(input.description.as_str()),
        input.goal_amount,
    )?;

    let campaign = Campaign::new(input, user.record_id());
    let stored = state
        .campaigns
        .create_record(campaign)
        .await?
        .ok_or_else(|| {
            AppError::ServerError(anyhow::anyhow!("Database did not return stored campaign"))
        })?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignListQuery>,
) -> AppResult<Json<CampaignListResponse>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut filter_bindings: Vec<(String, serde_json::Value)> = Vec::new();

    if let Some(status) = query.status {
        clauses.push("status = $status");
        filter_bindings.push(("status".to_string(), serde_json::to_value(status).unwrap()));
    }

    if let Some(campaign_type) = query.campaign_type {
        clauses.push("campaign_type = $campaign_type");
        filter_bindings.push((
            "campaign_type".to_string(),
            serde_json::to_value(campaign_type).unwrap(),
        ));
    }

    let where_clause = if clauses.is_empty() {
        "true".to_string()
    } else {
        clauses.join(" AND ")
    };

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);
    let start = (page - 1) * page_size;

    let sql = format!(
        "SELECT * FROM campaigns WHERE {} ORDER BY created_at DESC LIMIT $limit START $start",
        where_clause
    );

    let mut bindings = filter_bindings.clone();
    bindings.push(("limit".to_string(), serde_json::json!(page_size)));
    bindings.push(("start".to_string(), serde_json::json!(start)));

    let campaigns = state.campaigns.run_custom_query(&sql, bindings).await?;
    let total = state
        .campaigns
        .count_where(&where_clause, filter_bindings)
        .await?;

    Ok(Json(CampaignListResponse {
        campaigns: campaigns.into_iter().map(CampaignResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<CampaignResponse>> {
    let campaign = state
        .campaigns
        .get_record_by_id(&campaign_id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    Ok(Json(campaign.into()))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CampaignUpdate>,
) -> AppResult<Json<CampaignResponse>> {
    let user = require_user(&state, &headers).await?;

    let mut campaign = state
        .campaigns
        .get_record_by_id(&campaign_id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    if campaign.creator_id != user.record_id() {
        return Err(AppError::AuthorizationError(
            "Not authorized to update this campaign".to_string(),
        ));
    }

    validate_campaign_fields(
        input.title.as_deref(),
        input.description.as_deref(),
        input.goal_amount,
    )?;

    if let Some(title) = input.title {
        campaign.title = title;
    }
    if let Some(description) = input.description {
        campaign.description = description;
    }
    if let Some(goal_amount) = input.goal_amount {
        campaign.goal_amount = Some(goal_amount);
    }
    if let Some(status) = input.status {
        campaign.status = status;
    }
    if let Some(start_date) = input.start_date {
        campaign.start_date = Some(start_date);
    }
    if let Some(end_date) = input.end_date {
        campaign.end_date = Some(end_date);
    }
    if let Some(image_url) = input.image_url {
        campaign.image_url = Some(image_url);
    }
    campaign.updated_at = Utc::now();

    let updated = state
        .campaigns
        .update_record(&campaign_id, campaign)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    Ok(Json(updated.into()))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let user = require_user(&state, &headers).await?;

    let campaign = state
        .campaigns
        .get_record_by_id(&campaign_id)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign"))?;

    if campaign.creator_id != user.record_id() {
        return Err(AppError::AuthorizationError(
            "Not authorized to delete this campaign".to_string(),
        ));
    }

    let donations = state
        .donations
        .get_records_by_field("campaign_id", campaign_id.clone())
        .await?;
    if !donations.is_empty() {
        return Err(AppError::InputError(
            "Cannot delete campaign with existing donations".to_string(),
        ));
    }

    state.campaigns.delete_record(&campaign_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignListQuery>,
    headers: HeaderMap,
) -> AppResult<Json<CampaignListResponse>> {
    let user = require_user(&state, &headers).await?;

    let mut campaigns = state
        .campaigns
        .get_records_by_field("creator_id", user.record_id())
        .await?;
    campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);
    let total = campaigns.len() as u64;

    let start = ((page - 1) * page_size) as usize;
    let page_items: Vec<CampaignResponse> = campaigns
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .map(CampaignResponse::from)
        .collect();

    Ok(Json(CampaignListResponse {
        campaigns: page_items,
        total,
        page,
        page_size,
    }))
}
