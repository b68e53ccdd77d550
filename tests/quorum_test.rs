use rust_decimal::Decimal;

use asamblea::quorum::{is_quorum_met, QuorumReport};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn test_quorum_met_with_two_of_three_attendees() {
    // Three units hold 0.5 / 0.3 / 0.2; the first two registered.
    let registered = dec("0.5") + dec("0.3");
    assert!(is_quorum_met(registered, dec("1.0"), dec("0.5")));
}

#[test]
fn test_quorum_not_met_below_threshold() {
    assert!(!is_quorum_met(dec("0.2"), dec("1.0"), dec("0.5")));
    assert!(!is_quorum_met(dec("0.49999"), dec("1.0"), dec("0.5")));
}

#[test]
fn test_quorum_met_at_exact_threshold() {
    assert!(is_quorum_met(dec("0.5"), dec("1.0"), dec("0.5")));
}

#[test]
fn test_epsilon_absorbs_residual_rounding() {
    // One micro-unit short of the threshold still passes; two do not.
    assert!(is_quorum_met(dec("0.499999"), dec("1.0"), dec("0.5")));
    assert!(!is_quorum_met(dec("0.499998"), dec("1.0"), dec("0.5")));
}

#[test]
fn test_quorum_scales_with_total_coefficient() {
    // Complexes whose coefficients sum to 100 instead of 1.0.
    assert!(is_quorum_met(dec("51"), dec("100"), dec("0.5")));
    assert!(!is_quorum_met(dec("49"), dec("100"), dec("0.5")));
}

#[test]
fn test_empty_complex_meets_any_threshold() {
    // Degenerate: zero total coefficient makes the requirement zero.
    assert!(is_quorum_met(Decimal::ZERO, Decimal::ZERO, dec("0.5")));
}

#[test]
fn test_report_carries_inputs_and_verdict() {
    let report = QuorumReport::compute(dec("0.8"), dec("1.0"), dec("0.5"));
    assert_eq!(report.registered_coefficient, dec("0.8"));
    assert_eq!(report.total_coefficient, dec("1.0"));
    assert_eq!(report.threshold, dec("0.5"));
    assert!(report.met);

    let report = QuorumReport::compute(dec("0.3"), dec("1.0"), dec("0.75"));
    assert!(!report.met);
}
