//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest access code accepted on the wire.
const MAX_ACCESS_CODE_LEN: usize = 16;

/// Validates that an access code is a short, non-empty run of ASCII letters and digits.
///
/// Case is not checked here; codes are compared case-insensitively.
///
/// # Examples
///
/// ```ignore
/// validate_access_code("1hj8") // Ok
/// validate_access_code("1HJ8") // Ok
/// validate_access_code("1hj 8") // Err - space
/// ```
pub fn validate_access_code(code: &str) -> Result<(), ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_ACCESS_CODE_LEN {
        let mut err = ValidationError::new("access_code_length");
        err.message = Some(
            format!(
                "Access code must be 1 to {MAX_ACCESS_CODE_LEN} characters (got {})",
                trimmed.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("access_code_format");
        err.message = Some("Access code must contain only letters and digits".into());
        return Err(err);
    }

    Ok(())
}
