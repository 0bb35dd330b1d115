//! Reusable field validators
//!
//! Each factory returns a closure taking the field name and the value, so
//! rules can be stored, cloned and combined by [`super::FieldChecker`].

use regex::Regex;
use std::sync::OnceLock;

/// Validator: string must not be empty once trimmed
pub fn required() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if value.trim().is_empty() {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: string must look like an email address
pub fn email() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if is_valid_email(value) {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid email address", field))
        }
    }
}

/// Validator: string must look like a phone number
///
/// Separators (spaces, dashes, dots, slashes, parentheses) are ignored.
pub fn phone() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        let compact: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '/' | '(' | ')'))
            .collect();
        if is_valid_phone(&compact) {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid phone number", field))
        }
    }
}

/// Validator: string must be an http(s) URL or a storage object key
pub fn image_reference() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if is_valid_url(value) || is_valid_object_key(value) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be an http(s) URL or a storage object key",
                field
            ))
        }
    }
}

/// Validator: string length must not exceed `max` characters
pub fn max_length(max: usize) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        let len = value.chars().count();
        if len > max {
            Err(format!(
                "'{}' must not exceed {} characters (currently: {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: integer must be in `[min, max]` and a multiple of `step` away from `min`
pub fn range_with_step(
    min: u32,
    max: u32,
    step: u32,
) -> impl Fn(&str, u32) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: u32| {
        if value < min || value > max {
            Err(format!(
                "'{}' must be between {} and {} (value: {})",
                field, min, max, value
            ))
        } else if step > 0 && (value - min) % step != 0 {
            Err(format!(
                "'{}' must be a multiple of {} (value: {})",
                field, step, value
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be finite and not negative
pub fn non_negative() -> impl Fn(&str, f64) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: f64| {
        if !value.is_finite() || value < 0.0 {
            Err(format!(
                "'{}' must be a non-negative number (value: {})",
                field, value
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        if allowed.iter().any(|a| a == value) {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be one of {:?} (value: {})",
                field, allowed, value
            ))
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    });
    regex.is_match(email)
}

fn is_valid_url(url: &str) -> bool {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());
    regex.is_match(url)
}

fn is_valid_object_key(key: &str) -> bool {
    static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = KEY_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]*\.[A-Za-z0-9]{2,5}$").unwrap());
    regex.is_match(key) && !key.contains("..")
}

fn is_valid_phone(phone: &str) -> bool {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    // 6 to 15 digits, optional leading + or 0
    let regex = PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9]{6,15}$").unwrap());
    regex.is_match(phone)
}
