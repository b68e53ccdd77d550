use chrono::{Duration, TimeZone, Utc};

use asamblea::models::assembly::{assembly_end_time, AgendaItem, AssemblyStatus, AssemblyType};

fn agenda_item(numeral: i32, duration_seconds: i32) -> AgendaItem {
    AgendaItem {
        id: numeral as i64,
        numeral,
        topic: format!("Item {numeral}"),
        notes: String::new(),
        duration_seconds,
    }
}

// --- Transition legality ---

#[test]
fn test_planned_transitions() {
    use AssemblyStatus::*;
    assert!(Planned.can_transition_to(InProgress));
    assert!(Planned.can_transition_to(Cancelled));
    assert!(!Planned.can_transition_to(Completed));
    assert!(!Planned.can_transition_to(Planned));
}

#[test]
fn test_in_progress_transitions() {
    use AssemblyStatus::*;
    assert!(InProgress.can_transition_to(Completed));
    assert!(InProgress.can_transition_to(Cancelled));
    assert!(!InProgress.can_transition_to(Planned));
    assert!(!InProgress.can_transition_to(InProgress));
}

#[test]
fn test_terminal_states_allow_nothing() {
    use AssemblyStatus::*;
    for terminal in [Completed, Cancelled] {
        assert!(terminal.is_terminal());
        for next in [Planned, InProgress, Completed, Cancelled] {
            assert!(
                !terminal.can_transition_to(next),
                "{} -> {} should be illegal",
                terminal.as_str(),
                next.as_str()
            );
        }
    }
}

#[test]
fn test_non_terminal_states() {
    assert!(!AssemblyStatus::Planned.is_terminal());
    assert!(!AssemblyStatus::InProgress.is_terminal());
}

#[test]
fn test_status_parse_round_trip() {
    for status in [
        AssemblyStatus::Planned,
        AssemblyStatus::InProgress,
        AssemblyStatus::Completed,
        AssemblyStatus::Cancelled,
    ] {
        assert_eq!(AssemblyStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(AssemblyStatus::parse("projected"), None);
    assert_eq!(AssemblyStatus::parse(""), None);
}

#[test]
fn test_assembly_type_parse() {
    assert_eq!(AssemblyType::parse("ordinary"), Some(AssemblyType::Ordinary));
    assert_eq!(
        AssemblyType::parse("extraordinary"),
        Some(AssemblyType::Extraordinary)
    );
    assert_eq!(AssemblyType::parse("ORDINARY"), None);
}

// --- Computed end time ---

#[test]
fn test_end_time_sums_agenda_durations() {
    let start = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
    let agenda = vec![
        agenda_item(1, 3600), // 1h
        agenda_item(2, 1800), // 30m
        agenda_item(3, 900),  // 15m
    ];
    assert_eq!(
        assembly_end_time(start, &agenda),
        start + Duration::seconds(6300)
    );
}

#[test]
fn test_end_time_without_agenda_is_start() {
    let start = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
    assert_eq!(assembly_end_time(start, &[]), start);
}

#[test]
fn test_concluded_assembly_detected_by_end_time() {
    // Delete gating: an assembly whose computed end lies in the past has
    // concluded and must not be deletable.
    let start = Utc::now() - Duration::hours(3);
    let agenda = vec![agenda_item(1, 3600)];
    let end = assembly_end_time(start, &agenda);
    assert!(end < Utc::now());

    // With enough agenda ahead of it, the same start is still live.
    let agenda = vec![agenda_item(1, 4 * 3600)];
    let end = assembly_end_time(start, &agenda);
    assert!(end > Utc::now());
}
