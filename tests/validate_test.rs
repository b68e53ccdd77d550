use asamblea::db::valid_schema_name;
use asamblea::validate::*;

#[test]
fn test_required_field() {
    assert!(validate_required("", "Title", 200).is_some());
    assert!(validate_required("   ", "Title", 200).is_some());
    assert!(validate_required(&"x".repeat(201), "Title", 200).is_some());
    assert!(validate_required("Annual assembly", "Title", 200).is_none());
}

#[test]
fn test_optional_field() {
    assert!(validate_optional("", "Notes", 10).is_none());
    assert!(validate_optional("short", "Notes", 10).is_none());
    assert!(validate_optional("far too long for this", "Notes", 10).is_some());
}

#[test]
fn test_numeral_bounds() {
    assert!(validate_numeral(0).is_some());
    assert!(validate_numeral(-3).is_some());
    assert!(validate_numeral(501).is_some());
    assert!(validate_numeral(1).is_none());
    assert!(validate_numeral(500).is_none());
}

#[test]
fn test_option_sets() {
    let ok = vec!["yes".to_string(), "no".to_string(), "abstain".to_string()];
    assert!(validate_options(&ok).is_none());

    assert!(validate_options(&["yes".to_string()]).is_some());
    assert!(validate_options(&vec!["o".to_string(); 11]).is_some());
    assert!(validate_options(&["yes".to_string(), "  ".to_string()]).is_some());
    assert!(validate_options(&["yes".to_string(), "yes".to_string()]).is_some());
}

#[test]
fn test_duration_parsing() {
    assert_eq!(parse_duration_hms("01:30:00"), Some(5400));
    assert_eq!(parse_duration_hms("00:00:45"), Some(45));
    assert_eq!(parse_duration_hms("10:00:00"), Some(36000));
    assert_eq!(parse_duration_hms("0:5:5"), Some(305));

    assert_eq!(parse_duration_hms("90:00"), None);
    assert_eq!(parse_duration_hms("00:61:00"), None);
    assert_eq!(parse_duration_hms("00:00:-1"), None);
    assert_eq!(parse_duration_hms("1:2:3:4"), None);
    assert_eq!(parse_duration_hms("abc"), None);
}

#[test]
fn test_schema_names() {
    assert!(valid_schema_name("tenant_mirador"));
    assert!(valid_schema_name("_t1"));
    assert!(!valid_schema_name(""));
    assert!(!valid_schema_name("1tenant"));
    assert!(!valid_schema_name("Tenant"));
    assert!(!valid_schema_name("tenant;DROP TABLE votes"));
    assert!(!valid_schema_name(&"a".repeat(64)));
}
