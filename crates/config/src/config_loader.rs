use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

use app_error::{AppError, AppResult};

/// Complete application configuration loaded from JSON file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    pub pool: DbPoolConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DbPoolConfig {
    pub size: usize,
    pub connection_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub rate_limiting: RateLimitingConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_minutes: i64,
    pub algorithm: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

/// Per-route quotas for the auth endpoints. Each setting is a fixed window:
/// `quota` requests per `window_secs` seconds per client.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitingConfig {
    pub register: RateLimitSettings,
    pub login: RateLimitSettings,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
    pub quota: usize,
    pub window_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub argon2: Argon2Config,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        debug!("Configuration loaded from file");
        Ok(config)
    }

    /// Load configuration from the embedded default file
    pub fn load() -> AppResult<Self> {
        let config_content =
            std::str::from_utf8(include_bytes!("../res/app-config.json")).expect("Invalid UTF-8");

        let config = match serde_json::from_str::<AppConfig>(config_content) {
            Ok(conf) => {
                info!("Loaded configuration for environment: {}", conf.environment);
                conf
            }
            Err(e) => {
                warn!(
                    "Failed to load config file: {}. Using default configuration.",
                    e
                );
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.environment == "production";

        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.database.endpoint.trim().is_empty() {
            errors.push("Database endpoint cannot be empty".to_string());
        } else if is_production
            && !self.database.endpoint.starts_with("wss://")
            && !self.database.endpoint.contains("memory")
        {
            errors.push("Production should use a secure 'wss://' database connection".to_string());
        }

        if self.database.namespace.trim().is_empty() {
            errors.push("Database namespace cannot be empty".to_string());
        }

        if self.database.database.trim().is_empty() {
            errors.push("Database name cannot be empty".to_string());
        }

        if is_production
            && (self.security.jwt.secret.len() < 32
                || self.security.jwt.secret == "your-secret-key-change-this")
        {
            errors.push("JWT secret is not secure for production use".to_string());
        }

        if self.security.jwt.expiry_minutes <= 0 {
            errors.push("JWT expiry must be positive".to_string());
        }

        if self.security.rate_limiting.register.quota == 0
            || self.security.rate_limiting.login.quota == 0
        {
            errors.push("Rate limit quotas must be greater than 0".to_string());
        }

        if self.security.password.min_length == 0 {
            errors.push("Password minimum length must be greater than 0".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                body_limit: 1048576, // 1MB
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                endpoint: "memory".to_string(),
                username: "root".to_string(),
                password: "root".to_string(),
                namespace: "fundraiser".to_string(),
                database: "fundraiser".to_string(),
                pool: DbPoolConfig {
                    size: 5,
                    connection_timeout_ms: 5000,
                },
            },
            security: SecurityConfig {
                jwt: JwtConfig {
                    secret: "your-secret-key-change-this".to_string(),
                    expiry_minutes: 30,
                    algorithm: "HS256".to_string(),
                },
                cors: CorsConfig {
                    allowed_origins: vec![
                        "http://localhost:3000".to_string(),
                        "http://localhost:5173".to_string(),
                    ],
                    allowed_methods: vec![
                        "GET".to_string(),
                        "POST".to_string(),
                        "PUT".to_string(),
                        "PATCH".to_string(),
                        "DELETE".to_string(),
                        "OPTIONS".to_string(),
                    ],
                    allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
                },
                rate_limiting: RateLimitingConfig {
                    register: RateLimitSettings {
                        quota: 5,
                        window_secs: 3600,
                    },
                    login: RateLimitSettings {
                        quota: 10,
                        window_secs: 60,
                    },
                    cleanup_interval_secs: 300,
                },
                password: PasswordConfig {
                    min_length: 8,
                    require_uppercase: true,
                    require_lowercase: true,
                    require_number: true,
                    argon2: Argon2Config {
                        memory_kib: 19456,
                        iterations: 2,
                        parallelism: 1,
                    },
                },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "plain".to_string(),
            },
        }
    }
}
