//! Input validators for registration and password flows.

use regex::Regex;

pub const DEFAULT_COUNTRY_CODE: &str = "998";
pub const SUBSCRIBER_DIGITS: usize = 9;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// `+<country code><9 digits>`, nothing else.
#[must_use]
pub fn is_valid_phone_number(phone: &str, country_code: &str) -> bool {
    let pattern = format!(
        r"^\+{}[0-9]{{{SUBSCRIBER_DIGITS}}}$",
        regex::escape(country_code)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(phone))
}

/// At least eight characters with one letter and one digit.
///
/// # Errors
/// Returns a human-readable message when the policy is not met.
pub fn validate_password(password: &str) -> Result<(), String> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err("Password must be at least 8 characters long and contain at least one letter and one number".to_string())
    }
}

/// Normalize an email for lookup and uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$")
        .is_ok_and(|re| re.is_match(email_normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_country_code_and_nine_digits() {
        assert!(is_valid_phone_number("+998901234567", DEFAULT_COUNTRY_CODE));
        assert!(is_valid_phone_number("+998000000000", DEFAULT_COUNTRY_CODE));
    }

    #[test]
    fn phone_rejects_other_shapes() {
        assert!(!is_valid_phone_number("998901234567", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number("+99890123456", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number("+9989012345678", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number("+997901234567", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number("+99890123456a", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number(" +998901234567", DEFAULT_COUNTRY_CODE));
        assert!(!is_valid_phone_number("", DEFAULT_COUNTRY_CODE));
    }

    #[test]
    fn phone_follows_configured_country_code() {
        assert!(is_valid_phone_number("+7901234567", "7"));
        assert!(!is_valid_phone_number("+998901234567", "7"));
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("secret123").is_ok());
        assert!(validate_password("a1b2c3d4").is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("abc1234").is_err());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
        assert!(!valid_email("user@example"));
    }
}
