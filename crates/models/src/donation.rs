use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Donation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub amount: f64,
    pub currency: String,
    pub campaign_id: String,
    pub giver_id: String,
    pub payment_status: PaymentStatus,
    pub is_anonymous: bool,
    pub message: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Donation {
    pub fn new(input: DonationCreate, campaign_id: String, giver_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            amount: input.amount,
            currency: input.currency,
            campaign_id,
            giver_id,
            payment_status: PaymentStatus::Completed,
            is_anonymous: input.is_anonymous,
            message: input.message,
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

#[derive(Debug, Deserialize)]
pub struct DonationCreate {
    pub campaign_id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub message: Option<String>,
}

/// Donation as shown publicly. `giver_id` is withheld for anonymous
/// donations.
#[derive(Debug, Serialize, Deserialize)]
pub struct DonationResponse {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub campaign_id: String,
    pub giver_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DonationResponse {
    /// Projection for public listings: donor identity hidden when the
    /// donation is anonymous.
    pub fn public(donation: Donation) -> Self {
        let giver_id = if donation.is_anonymous {
            None
        } else {
            Some(donation.giver_id.clone())
        };
        Self::project(donation, giver_id)
    }

    /// Projection for the donor's own listings: identity always visible.
    pub fn owned(donation: Donation) -> Self {
        let giver_id = Some(donation.giver_id.clone());
        Self::project(donation, giver_id)
    }

    fn project(donation: Donation, giver_id: Option<String>) -> Self {
        Self {
            id: donation.record_id(),
            amount: donation.amount,
            currency: donation.currency,
            campaign_id: donation.campaign_id,
            giver_id,
            payment_status: donation.payment_status,
            is_anonymous: donation.is_anonymous,
            message: donation.message,
            created_at: donation.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DonationListResponse {
    pub donations: Vec<DonationResponse>,
    pub total: u64,
    pub total_amount: f64,
    pub page: u64,
    pub page_size: u64,
}
