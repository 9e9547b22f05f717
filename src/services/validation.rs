//! Input length checks
//!
//! Limits mirror the VARCHAR widths in `migrations/`. Postgres measures
//! VARCHAR in characters, so the checks count chars rather than bytes.

use crate::error::AppError;

// ============================================================================
// Column Limits
// ============================================================================

pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const TITLE_MAX: usize = 200;
pub const TOPIC_MAX: usize = 200;
pub const PERSON_NAME_MAX: usize = 100;
pub const VIDEO_URL_MAX: usize = 500;
pub const COURSE_QUIZ_OPTION_MAX: usize = 200;
pub const QUESTION_OPTION_MAX: usize = 500;
pub const POLL_OPTION_MAX: usize = 300;

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate that `value` fits in a column of `max` characters
///
/// # Returns
/// * `Ok(())` if the value fits
/// * `Err(AppError::BadRequest)` naming the field otherwise
pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max {
        return Err(AppError::bad_request(format!(
            "{} must be at most {} characters, got {}",
            field, max, len
        )));
    }
    Ok(())
}

/// Same as [`validate_length`] for optional input
pub fn validate_optional_length(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| validate_length(field, v, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_length() {
        assert!(validate_length("Username", &"a".repeat(USERNAME_MAX), USERNAME_MAX).is_ok());

        let err = validate_length("Username", &"a".repeat(USERNAME_MAX + 1), USERNAME_MAX)
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("at most 150")));
    }

    #[test]
    fn test_length_counts_characters() {
        // 100 two-byte chars fit a 100-char column
        assert!(validate_length("Name", &"é".repeat(100), PERSON_NAME_MAX).is_ok());
    }

    #[test]
    fn test_validate_optional_length() {
        assert!(validate_optional_length("Name", None, 1).is_ok());
        assert!(validate_optional_length("Name", Some("ab"), 1).is_err());
    }
}
