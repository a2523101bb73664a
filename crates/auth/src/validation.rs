use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Must start with a letter; letters, digits, and underscores after
    // that. Constrains the input space before any database lookup and
    // rules out numeric-looking identifiers.
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap();

    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.][a-z0-9]+)*\.[a-z]{2,6})$"
    )
    .unwrap();
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.chars().count() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.chars().count() > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username must start with a letter and contain only letters, numbers, and underscores"
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_full_name(name: &str) -> Result<(), String> {
    if name.chars().count() > 255 {
        return Err("Full name cannot exceed 255 characters".to_string());
    }

    Ok(())
}

/// Trim surrounding whitespace. Never applied to passwords, which may
/// legitimately contain leading or trailing spaces.
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}
