use app_config::Argon2Config;
use app_error::{AppError, AppResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{debug, error};

fn argon2_from_config(config: &Argon2Config) -> AppResult<Argon2<'static>> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
        .map_err(|e| AppError::ServerError(anyhow::anyhow!("Invalid argon2 parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with Argon2id and a fresh random salt. Two calls with
/// the same input produce different PHC strings; only `verify_password`
/// can compare.
pub fn hash_password(password: &str, config: &Argon2Config) -> AppResult<String> {
    let argon2 = argon2_from_config(config)?;
    let salt = SaltString::generate(&mut OsRng);

    debug!("Hashing password");
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            AppError::ServerError(anyhow::anyhow!("Failed to hash password: {}", e))
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored PHC hash string. The salt and cost
/// parameters are read from the hash itself. A mismatch is `Ok(false)`;
/// a hash that cannot be parsed is a `CredentialStoreError` because it
/// means the stored record is corrupt.
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Stored password hash is malformed: {}", e);
        AppError::CredentialStoreError(format!("Malformed password hash: {}", e))
    })?;

    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    debug!("Password verification result: {}", is_valid);
    Ok(is_valid)
}
