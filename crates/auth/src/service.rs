use app_config::{Argon2Config, SecurityConfig};
use app_database::service::DbService;
use app_error::{AppError, AppResult};
use app_models::user::{LoginForm, RegisterRequest, TokenResponse, User, UserResponse};
use app_models::giver::GiverProfile;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    credentials,
    jwt::TokenService,
    password_policy::PasswordPolicy,
    rate_limiter::{FixedWindowLimiter, RateDecision, RateLimiterConfig, RouteBucket},
    validation,
};

/// Wires the auth components into the register / login / current-user
/// operations. Persistence stays behind the injected record services;
/// this type never formats HTTP responses itself.
pub struct AuthService {
    token_service: Arc<TokenService>,
    password_policy: PasswordPolicy,
    argon2: Argon2Config,
    rate_limiter: Arc<FixedWindowLimiter>,
    users: Arc<DbService<User>>,
    givers: Arc<DbService<GiverProfile>>,
}

impl AuthService {
    pub fn new(
        security: &SecurityConfig,
        users: Arc<DbService<User>>,
        givers: Arc<DbService<GiverProfile>>,
    ) -> Self {
        Self {
            token_service: Arc::new(TokenService::new(
                security.jwt.secret.as_bytes(),
                security.jwt.expiry_minutes,
            )),
            password_policy: PasswordPolicy::from_config(&security.password),
            argon2: security.password.argon2.clone(),
            rate_limiter: Arc::new(FixedWindowLimiter::new(RateLimiterConfig::from_config(
                &security.rate_limiting,
            ))),
            users,
            givers,
        }
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        Arc::clone(&self.token_service)
    }

    pub fn rate_limiter(&self) -> Arc<FixedWindowLimiter> {
        Arc::clone(&self.rate_limiter)
    }

    async fn enforce_rate_limit(&self, client_key: &str, bucket: RouteBucket) -> AppResult<()> {
        match self.rate_limiter.check_and_record(client_key, bucket).await {
            RateDecision::Allowed => Ok(()),
            RateDecision::Denied { retry_after } => {
                warn!(client = %client_key, ?bucket, "Rate limit exceeded");
                Err(AppError::rate_limited(retry_after.as_secs().max(1)))
            }
        }
    }

    /// Register a new user. Validation failures report every violated
    /// rule at once; duplicates are checked before the insert and the
    /// store's uniqueness constraint settles any race that slips past.
    pub async fn register(
        &self,
        client_key: &str,
        input: RegisterRequest,
    ) -> AppResult<UserResponse> {
        self.enforce_rate_limit(client_key, RouteBucket::Register)
            .await?;

        let username = validation::sanitize_string(&input.username);
        let email = validation::sanitize_string(&input.email);
        let full_name = input
            .full_name
            .as_deref()
            .map(validation::sanitize_string)
            .filter(|name| !name.is_empty());

        let mut problems = Vec::new();
        if let Err(message) = validation::validate_username(&username) {
            problems.push(message);
        }
        if let Err(message) = validation::validate_email(&email) {
            problems.push(message);
        }
        if let Some(name) = &full_name {
            if let Err(message) = validation::validate_full_name(name) {
                problems.push(message);
            }
        }
        problems.extend(self.password_policy.validate(&input.password).messages());

        if !problems.is_empty() {
            return Err(AppError::ValidationError(problems));
        }

        if !self
            .users
            .get_records_by_field("username", username.clone())
            .await?
            .is_empty()
        {
            return Err(AppError::username_registered());
        }

        if !self
            .users
            .get_records_by_field("email", email.clone())
            .await?
            .is_empty()
        {
            return Err(AppError::email_registered());
        }

        let hashed_password = credentials::hash_password(&input.password, &self.argon2)?;

        let user = User::new(email, username, hashed_password, full_name);
        let stored = match self.users.create_record(user).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                return Err(AppError::ServerError(anyhow::anyhow!(
                    "Database did not return stored user"
                )));
            }
            // Lost a race against a concurrent registration; the unique
            // index decided.
            Err(AppError::ConflictError(_)) => return Err(AppError::username_registered()),
            Err(e) => return Err(e),
        };

        info!(username = %stored.username, "Registered new user");

        // Every account gets a giver profile immediately.
        let profile = GiverProfile::individual(stored.record_id());
        self.givers.create_record(profile).await?;

        Ok(UserResponse::from(stored))
    }

    /// Authenticate and issue a bearer token. Unknown usernames and wrong
    /// passwords produce identical failures; the rate check runs first and
    /// is independent of the credential outcome.
    pub async fn login(&self, client_key: &str, form: LoginForm) -> AppResult<TokenResponse> {
        self.enforce_rate_limit(client_key, RouteBucket::Login)
            .await?;

        let username = validation::sanitize_string(&form.username);
        if username.is_empty() || form.password.is_empty() {
            return Err(AppError::invalid_credentials());
        }

        // The login field accepts a username or an email address.
        let mut matches = self
            .users
            .get_records_by_field("username", username.clone())
            .await?;
        if matches.is_empty() {
            matches = self
                .users
                .get_records_by_field("email", username.clone())
                .await?;
        }

        let Some(user) = matches.into_iter().next() else {
            return Err(AppError::invalid_credentials());
        };

        if !credentials::verify_password(&form.password, &user.hashed_password)? {
            return Err(AppError::invalid_credentials());
        }

        let token = self.token_service.issue(&user.username)?;
        info!(username = %user.username, "User logged in");

        Ok(TokenResponse::bearer(token))
    }

    /// Resolve a bearer token to its user record. Every token problem
    /// surfaces as the same generic authentication failure.
    pub async fn current_user(&self, token: &str) -> AppResult<User> {
        let claims = self.token_service.validate(token).map_err(|reason| {
            debug!(%reason, "Bearer token rejected");
            AppError::could_not_validate_credentials()
        })?;

        let user = self
            .users
            .get_records_by_field("username", claims.sub.clone())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::could_not_validate_credentials())?;

        if !user.is_active {
            return Err(AppError::inactive_account());
        }

        Ok(user)
    }
}
