//! Small helpers shared by the models, services, and remote client.

/// Trim user-supplied text, treating blank input the same as absent input.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether a string looks like an `http://` or `https://` URL.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Shorten a response body to something safe to embed in an error message.
///
/// Keeps at most 180 characters after trimming.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Current Unix timestamp in milliseconds, matching the record timestamps.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_drops_blank_input() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(String::new())), None);
        assert_eq!(normalize_text_option(Some("\t \n".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_surrounding_whitespace() {
        assert_eq!(
            normalize_text_option(Some("  Weekly groceries\n".to_string())),
            Some("Weekly groceries".to_string())
        );
    }

    #[test]
    fn is_http_url_requires_http_scheme() {
        assert!(is_http_url("http://127.0.0.1:8080"));
        assert!(is_http_url("https://api.nook.app/v1"));
        assert!(!is_http_url("file:///tmp/notes"));
        assert!(!is_http_url("api.nook.app"));
    }

    #[test]
    fn compact_text_caps_long_bodies() {
        let body = "x".repeat(400);
        assert_eq!(compact_text(&body).chars().count(), 180);
        assert_eq!(compact_text("  short  "), "short");
    }
}
