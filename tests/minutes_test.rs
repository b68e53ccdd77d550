use chrono::Utc;
use rust_decimal::Decimal;

use asamblea::errors::AppError;
use asamblea::models::assembly::{AgendaItem, Assembly, AssemblyStatus, AssemblyType};
use asamblea::models::attendee::Attendee;
use asamblea::models::minutes::MinutesPayload;
use asamblea::models::voting::{OptionTally, VotingStats, VotingStatus};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn assembly(status: AssemblyStatus) -> Assembly {
    Assembly {
        id: 5,
        complex_id: 1,
        title: "Annual ordinary assembly".to_string(),
        description: String::new(),
        assembly_type: AssemblyType::Ordinary,
        scheduled_at: Utc::now(),
        location: "Clubhouse".to_string(),
        status,
        created_at: Utc::now(),
    }
}

fn attendee(user_id: i64, coefficient: &str, delegate: Option<&str>) -> Attendee {
    Attendee {
        id: user_id,
        assembly_id: 5,
        user_id,
        unit_id: user_id * 100,
        coefficient: dec(coefficient),
        delegate_name: delegate.map(String::from),
        registered_at: Utc::now(),
    }
}

fn closed_round_snapshot() -> VotingStats {
    VotingStats {
        voting_id: 9,
        assembly_id: 5,
        agenda_numeral: Some(3),
        question: "Approve the budget?".to_string(),
        status: VotingStatus::Closed,
        total_votes: 2,
        total_coefficient_voted: dec("0.8"),
        options: vec![
            OptionTally {
                option_value: "yes".to_string(),
                votes: 2,
                coefficient: dec("0.8"),
                percentage: 100,
            },
            OptionTally {
                option_value: "no".to_string(),
                votes: 0,
                coefficient: Decimal::ZERO,
                percentage: 0,
            },
        ],
        turnout: dec("0.8"),
    }
}

#[test]
fn test_minutes_rejected_while_in_progress() {
    let err = MinutesPayload::build(
        assembly(AssemblyStatus::InProgress),
        vec![],
        vec![],
        vec![],
        Decimal::ZERO,
    )
    .unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("completed"), "unexpected message: {msg}"),
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[test]
fn test_minutes_rejected_for_planned_and_cancelled() {
    for status in [AssemblyStatus::Planned, AssemblyStatus::Cancelled] {
        assert!(MinutesPayload::build(assembly(status), vec![], vec![], vec![], Decimal::ZERO)
            .is_err());
    }
}

#[test]
fn test_minutes_compose_once_completed() {
    let agenda = vec![AgendaItem {
        id: 1,
        numeral: 1,
        topic: "Budget".to_string(),
        notes: "Approved unanimously".to_string(),
        duration_seconds: 3600,
    }];
    let roll = vec![
        attendee(1, "0.5", None),
        attendee(2, "0.3", Some("J. Vargas (proxy)")),
    ];
    let payload = MinutesPayload::build(
        assembly(AssemblyStatus::Completed),
        agenda,
        roll,
        vec![closed_round_snapshot()],
        dec("0.8"),
    )
    .unwrap();

    assert_eq!(payload.assembly.id, 5);
    assert_eq!(payload.agenda.len(), 1);
    assert_eq!(payload.attendees.len(), 2);
    assert_eq!(
        payload.attendees[1].delegate_name.as_deref(),
        Some("J. Vargas (proxy)")
    );
    assert_eq!(payload.votings.len(), 1);
    assert_eq!(payload.votings[0].status, VotingStatus::Closed);
    assert_eq!(payload.total_registered_coefficient, dec("0.8"));
}

#[test]
fn test_minutes_payload_serializes_for_renderer() {
    let payload = MinutesPayload::build(
        assembly(AssemblyStatus::Completed),
        vec![],
        vec![attendee(1, "0.5", None)],
        vec![closed_round_snapshot()],
        dec("0.5"),
    )
    .unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["assembly"]["status"], "completed");
    assert_eq!(json["votings"][0]["options"][0]["percentage"], 100);
    assert_eq!(json["attendees"][0]["userId"], 1);
}
