//! Request-field validators. Each returns `Some(message)` on failure so
//! handlers can surface a 400 before touching storage.

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an agenda numeral: positive, at most 500.
pub fn validate_numeral(numeral: i32) -> Option<String> {
    if numeral < 1 {
        return Some("Agenda numeral must be positive".to_string());
    }
    if numeral > 500 {
        return Some("Agenda numeral must be at most 500".to_string());
    }
    None
}

/// Validate a voting option set: 2-10 distinct, non-empty values.
pub fn validate_options(options: &[String]) -> Option<String> {
    if options.len() < 2 {
        return Some("A voting needs at least 2 options".to_string());
    }
    if options.len() > 10 {
        return Some("A voting may have at most 10 options".to_string());
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Some("Voting options must not be empty".to_string());
        }
        if opt.len() > 100 {
            return Some("Voting options must be at most 100 characters".to_string());
        }
    }
    let mut seen = std::collections::HashSet::new();
    for opt in options {
        if !seen.insert(opt.as_str()) {
            return Some(format!("Duplicate voting option '{opt}'"));
        }
    }
    None
}

/// Parse an agenda item duration in `HH:MM:SS` form into seconds.
pub fn parse_duration_hms(value: &str) -> Option<i32> {
    let mut parts = value.split(':');
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = parts.next()?.parse().ok()?;
    let seconds: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}
