//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Upper bound for distance filters (roughly half the Earth's circumference).
const MAX_DISTANCE_KM: f64 = 20_000.0;

/// Validates that chat message content is not blank and within the length limit.
pub fn validate_message_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        let mut err = ValidationError::new("content_blank");
        err.message = Some("Message content cannot be empty".into());
        return Err(err);
    }

    if content.chars().count() > MAX_MESSAGE_LENGTH {
        let mut err = ValidationError::new("content_length");
        err.message = Some("Message content must be at most 2000 characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a distance filter is a finite, non-negative number of kilometers.
pub fn validate_distance_km(distance: f64) -> Result<(), ValidationError> {
    if distance.is_finite() && (0.0..=MAX_DISTANCE_KM).contains(&distance) {
        Ok(())
    } else {
        let mut err = ValidationError::new("distance_range");
        err.message = Some("Distance must be between 0 and 20000 km".into());
        Err(err)
    }
}

/// Validates that a category tag is non-empty and contains no separators.
pub fn validate_category_tag(tag: &str) -> Result<(), ValidationError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() || trimmed.contains(',') || trimmed.len() > 100 {
        let mut err = ValidationError::new("category_tag");
        err.message = Some("Category must be 1-100 characters without commas".into());
        return Err(err);
    }
    Ok(())
}
