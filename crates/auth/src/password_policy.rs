use app_config::PasswordConfig;

/// Passwords rejected outright regardless of character-class compliance.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password123",
    "12345678",
    "qwerty123",
    "letmein1",
    "monkey",
    "dragon",
    "trustno1",
    "baseball",
    "iloveyou",
    "master",
    "sunshine",
    "ashley",
    "abc123",
    "1234567890",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize },
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one number")]
    MissingDigit,
    #[error("Password is too common. Please choose a stronger password")]
    CommonPassword,
}

/// Result of a policy check. Collects every violated rule rather than
/// stopping at the first, so the caller can report all problems at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub violations: Vec<PolicyViolation>,
}

impl PolicyOutcome {
    pub fn accepted(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
        }
    }
}

impl PasswordPolicy {
    pub fn from_config(config: &PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            require_uppercase: config.require_uppercase,
            require_lowercase: config.require_lowercase,
            require_number: config.require_number,
        }
    }

    /// Pure check, no I/O. The denylist comparison is case-insensitive.
    pub fn validate(&self, password: &str) -> PolicyOutcome {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(PolicyViolation::TooShort {
                min: self.min_length,
            });
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PolicyViolation::MissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PolicyViolation::MissingLowercase);
        }

        if self.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PolicyViolation::MissingDigit);
        }

        if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            violations.push(PolicyViolation::CommonPassword);
        }

        PolicyOutcome { violations }
    }
}
