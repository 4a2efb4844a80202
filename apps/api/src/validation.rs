//! Field checks shared by the request types. Each returns `AppError::Validation`
//! naming the offending field.

use crate::errors::AppError;

/// Trimmed length must fall within `min..=max` characters.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(AppError::Validation(if min <= 1 {
            format!("{field} cannot be empty")
        } else {
            format!("{field} must be at least {min} characters")
        }));
    }
    if len > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn check_range(field: &str, value: i32, min: i32, max: i32) -> Result<(), AppError> {
    if !(min..=max).contains(&value) {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Shape check only: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn check_email(field: &str, value: &str) -> Result<(), AppError> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|part| !part.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_counts_trimmed_characters() {
        assert!(check_length("name", "  Ñu ", 2, 10).is_ok());
        assert!(check_length("name", " a ", 2, 10).is_err());
        assert!(check_length("name", "abcdef", 1, 5).is_err());
    }

    #[test]
    fn test_empty_message_for_required_field() {
        let err = check_length("city", "   ", 1, 100).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: city cannot be empty");
    }

    #[test]
    fn test_check_range_is_inclusive() {
        assert!(check_range("min_experience", 0, 0, 30).is_ok());
        assert!(check_range("min_experience", 30, 0, 30).is_ok());
        assert!(check_range("min_experience", 31, 0, 30).is_err());
        assert!(check_range("min_experience", -1, 0, 30).is_err());
    }

    #[test]
    fn test_check_email() {
        for ok in ["ana@example.com", "hr.team@mail.acme.co"] {
            assert!(check_email("email", ok).is_ok(), "{ok}");
        }
        for bad in ["", "ana", "ana@", "@example.com", "ana@example", "a b@example.com", "a@b@c.com", "ana@.com"] {
            assert!(check_email("email", bad).is_err(), "{bad}");
        }
    }
}
