use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Individual,
    Company,
}

/// Giver profile, one per user, created automatically at registration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GiverProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user_id: String,
    pub profile_type: ProfileType,
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    pub total_donated: f64,
    pub donation_count: u64,
    pub is_public: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl GiverProfile {
    pub fn new(user_id: String, input: GiverProfileCreate) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            profile_type: input.profile_type,
            company_name: input.company_name,
            bio: input.bio,
            website_url: input.website_url,
            total_donated: 0.0,
            donation_count: 0,
            is_public: input.is_public,
            created_at: now,
            updated_at: now,
        }
    }

    /// The default profile a new registration receives.
    pub fn individual(user_id: String) -> Self {
        Self::new(
            user_id,
            GiverProfileCreate {
                profile_type: ProfileType::Individual,
                company_name: None,
                bio: None,
                website_url: None,
                is_public: true,
            },
        )
    }

    pub fn record_id(&self) -> String {
        self.id
            .as_ref()
            .map(|thing| thing.id.to_string())
            .unwrap_or_default()
    }
}

fn default_profile_type() -> ProfileType {
    ProfileType::Individual
}

fn default_is_public() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct GiverProfileCreate {
    #[serde(default = "default_profile_type")]
    pub profile_type: ProfileType,
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct GiverProfileUpdate {
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GiverProfileResponse {
    pub id: String,
    pub user_id: String,
    pub profile_type: ProfileType,
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    pub total_donated: f64,
    pub donation_count: u64,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GiverProfile> for GiverProfileResponse {
    fn from(profile: GiverProfile) -> Self {
        Self {
            id: profile.record_id(),
            user_id: profile.user_id,
            profile_type: profile.profile_type,
            company_name: profile.company_name,
            bio: profile.bio,
            website_url: profile.website_url,
            total_donated: profile.total_donated,
            donation_count: profile.donation_count,
            is_public: profile.is_public,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}
