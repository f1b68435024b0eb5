//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a configuration key (matches the column width).
pub const MAX_CONFIG_KEY_LENGTH: usize = 50;

/// Maximum length of a configuration value (matches the column width).
pub const MAX_CONFIG_VALUE_LENGTH: usize = 255;

lazy_static::lazy_static! {
    static ref CONFIG_KEY_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// Validates that a configuration key is snake_case and fits the column.
pub fn validate_config_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() || key.len() > MAX_CONFIG_KEY_LENGTH {
        let mut err = ValidationError::new("config_key_length");
        err.message = Some(
            format!("Config key must be 1-{} characters", MAX_CONFIG_KEY_LENGTH).into(),
        );
        return Err(err);
    }

    if !CONFIG_KEY_REGEX.is_match(key) {
        let mut err = ValidationError::new("config_key_format");
        err.message = Some(
            "Config key must start with a letter and contain only lowercase letters, digits and underscores"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a string is not empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a document format label such as `pdf` or `docx`.
pub fn validate_document_format(format: &str) -> Result<(), ValidationError> {
    let valid = !format.is_empty()
        && format.len() <= 16
        && format.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("document_format");
        err.message = Some("Document format must be 1-16 alphanumeric characters".into());
        Err(err)
    }
}
