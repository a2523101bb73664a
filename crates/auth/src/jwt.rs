use app_error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject identity: the username.
    pub sub: String,
    /// Expiration time (unix seconds). Always `iat + ttl`.
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
}

/// Why a token was rejected. Externally every reason maps to the same 401;
/// the distinction exists for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    BadSignature,
    #[error("malformed token")]
    Malformed,
}

/// Issues and validates signed bearer tokens. Stateless: validation needs
/// only the secret key, never a store lookup.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(expiry_minutes),
        }
    }

    pub fn issue(&self, subject: &str) -> AppResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue with an explicit clock, for deterministic expiry tests.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> AppResult<String> {
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::ServerError(anyhow::anyhow!("Failed to generate token: {}", e))
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }),
        }
    }
}
