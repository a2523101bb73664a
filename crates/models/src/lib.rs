pub mod campaign;
pub mod donation;
pub mod giver;
pub mod user;

pub use campaign::{
    Campaign, CampaignCreate, CampaignListResponse, CampaignResponse, CampaignStatus, CampaignType,
    CampaignUpdate,
};
pub use donation::{
    Donation, DonationCreate, DonationListResponse, DonationResponse, PaymentStatus,
};
pub use giver::{
    GiverProfile, GiverProfileCreate, GiverProfileResponse, GiverProfileUpdate, ProfileType,
};
pub use user::{LoginForm, RegisterRequest, TokenResponse, User, UserResponse, UserUpdate};
