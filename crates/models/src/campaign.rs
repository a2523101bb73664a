use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Fundraising,
    Event,
    AdhocGiving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Campaign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    pub description: String,
    pub campaign_type: CampaignType,
    pub goal_amount: Option<f64>,
    pub current_amount: f64,
    pub currency: String,
    pub status: CampaignStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub creator_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(input: CampaignCreate, creator_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: input.title,
            description: input.description,
            campaign_type: input.campaign_type,
            goal_amount: input.goal_amount,
            current_amount: 0.0,
            currency: input.currency,
            status: CampaignStatus::Draft,
            start_date: input.start_date,
            end_date: input.end_date,
            image_url: input.image_url,
            creator_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_id(&self) -> String {
        self.id
            .as_ref()
            .map(|thing| thing.id.to_string())
            .unwrap_or_default()
    }
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_campaign_type() -> CampaignType {
    CampaignType::Fundraising
}

#[derive(Debug, Deserialize)]
pub struct CampaignCreate {
    pub title: String,
    pub description: String,
    #[serde(default = "default_campaign_type")]
    pub campaign_type: CampaignType,
    pub goal_amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// All fields optional; only provided fields are applied.
#[derive(Debug, Deserialize)]
pub struct CampaignUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<f64>,
    pub status: Option<CampaignStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CampaignResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub campaign_type: CampaignType,
    pub goal_amount: Option<f64>,
    pub current_amount: f64,
    pub currency: String,
    pub status: CampaignStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.record_id(),
            title: campaign.title,
            description: campaign.description,
            campaign_type: campaign.campaign_type,
            goal_amount: campaign.goal_amount,
            current_amount: campaign.current_amount,
            currency: campaign.currency,
            status: campaign.status,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            image_url: campaign.image_url,
            creator_id: campaign.creator_id,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}
