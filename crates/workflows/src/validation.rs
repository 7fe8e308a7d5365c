//! Input validation for workflow requests.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Coordinate missing or outside its legal range.
    InvalidCoordinate { field: String, value: f64 },
    /// Amount that must be positive was zero or negative.
    NotPositive { field: String, value: i64 },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::InvalidCoordinate { field, value } => {
                write!(f, "{} is out of range: {}", field, value)
            }
            ValidationError::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for report titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for report descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Maximum allowed length for street addresses.
pub const MAX_ADDRESS_LENGTH: usize = 300;

/// Maximum allowed length for status-update notes.
pub const MAX_NOTE_LENGTH: usize = 1000;

/// Maximum allowed length for media captions.
pub const MAX_CAPTION_LENGTH: usize = 300;

/// Maximum allowed length for media URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum allowed length for user display names.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for transaction descriptions.
pub const MAX_REASON_LENGTH: usize = 200;

/// Validate a required text field: non-empty after trimming, within `max`.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: value.len(),
        });
    }

    Ok(())
}

/// Validate an optional text field: length-checked only when present.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if value.len() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
                actual: value.len(),
            });
        }
    }

    Ok(())
}

/// Validate a latitude/longitude pair.
///
/// Both must be finite and within [-90, 90] / [-180, 180]. There is no
/// fallback location: a report without a usable position is rejected.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::InvalidCoordinate {
            field: "latitude".to_string(),
            value: latitude,
        });
    }

    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::InvalidCoordinate {
            field: "longitude".to_string(),
            value: longitude,
        });
    }

    Ok(())
}

/// Validate the optional geotag attached to a status update.
///
/// A geotag is both coordinates or neither; a half-supplied pair is
/// rejected rather than stored with one side missing.
pub fn validate_geo_tag(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), ValidationError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => validate_coordinates(lat, lon),
        (Some(_), None) => Err(ValidationError::Empty("longitude".to_string())),
        (None, Some(_)) => Err(ValidationError::Empty("latitude".to_string())),
    }
}

/// Validate a karma amount that must be strictly positive.
pub fn validate_amount(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validate an email address (basic RFC 5322 format check).
///
/// This is a basic validation that checks:
/// - Contains exactly one @
/// - Has at least one character before @
/// - Has at least one character after @
/// - Has at least one dot after @
/// - Is not too long
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    // Basic format check: local@domain.tld
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing domain (after @)".to_string(),
        ));
    }

    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    // Check for common invalid patterns
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::InvalidEmail(
            "domain cannot start or end with a dot".to_string(),
        ));
    }

    if domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("title", "Pothole on 5th Avenue", MAX_TITLE_LENGTH).is_ok());

        assert!(matches!(
            validate_text("title", "", MAX_TITLE_LENGTH),
            Err(ValidationError::Empty(_))
        ));

        // Whitespace-only counts as empty
        assert!(matches!(
            validate_text("title", "   ", MAX_TITLE_LENGTH),
            Err(ValidationError::Empty(_))
        ));

        let long = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            validate_text("title", &long, MAX_TITLE_LENGTH),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("note", None, MAX_NOTE_LENGTH).is_ok());
        assert!(validate_optional_text("note", Some("crew assigned"), MAX_NOTE_LENGTH).is_ok());

        let long = "a".repeat(MAX_NOTE_LENGTH + 1);
        assert!(matches!(
            validate_optional_text("note", Some(&long), MAX_NOTE_LENGTH),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(20.2961, 85.8245).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());

        assert!(matches!(
            validate_coordinates(90.5, 85.8245),
            Err(ValidationError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            validate_coordinates(20.2961, -180.5),
            Err(ValidationError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            validate_coordinates(f64::NAN, 85.8245),
            Err(ValidationError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_validate_geo_tag() {
        assert!(validate_geo_tag(None, None).is_ok());
        assert!(validate_geo_tag(Some(20.2961), Some(85.8245)).is_ok());

        assert!(matches!(
            validate_geo_tag(Some(120.0), Some(85.8245)),
            Err(ValidationError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_validate_geo_tag_rejects_half_pair() {
        assert!(matches!(
            validate_geo_tag(Some(20.2961), None),
            Err(ValidationError::Empty(field)) if field == "longitude"
        ));
        assert!(matches!(
            validate_geo_tag(None, Some(85.8245)),
            Err(ValidationError::Empty(field)) if field == "latitude"
        ));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", 10).is_ok());

        assert!(matches!(
            validate_amount("amount", 0),
            Err(ValidationError::NotPositive { .. })
        ));
        assert!(matches!(
            validate_amount("amount", -5),
            Err(ValidationError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email("a@b.c").is_ok());
        assert!(validate_email(" test@example.com ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_email_invalid() {
        // Empty
        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));

        // No @
        assert!(matches!(
            validate_email("test.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // Multiple @
        assert!(matches!(
            validate_email("test@example@com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // Missing local part
        assert!(matches!(
            validate_email("@example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // No dot in domain
        assert!(matches!(
            validate_email("test@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));

        // Consecutive dots
        assert!(matches!(
            validate_email("test@example..com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidCoordinate {
            field: "latitude".to_string(),
            value: 120.0,
        };
        assert_eq!(err.to_string(), "latitude is out of range: 120");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
            actual: 300,
        };
        assert_eq!(err.to_string(), "title is too long (300 chars, max 200)");
    }
}
