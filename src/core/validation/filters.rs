//! Reusable field filters
//!
//! These filters normalise field values before validation

/// Filter: trim surrounding whitespace
pub fn trim() -> impl Fn(&str, String) -> String + Send + Sync + Clone {
    |_: &str, value: String| {
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            value
        } else {
            trimmed.to_string()
        }
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(&str, String) -> String + Send + Sync + Clone {
    |_: &str, value: String| value.to_lowercase()
}

/// Filter: collapse runs of inner whitespace into a single space
pub fn collapse_whitespace() -> impl Fn(&str, String) -> String + Send + Sync + Clone {
    |_: &str, value: String| value.split_whitespace().collect::<Vec<_>>().join(" ")
}
