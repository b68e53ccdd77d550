use chrono::Utc;
use rust_decimal::Decimal;

use asamblea::models::voting::{
    default_options, option_percentage, Voting, VotingStats, VotingStatus,
};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn round(total_votes: i64, total_coefficient_voted: Decimal, options: Vec<String>) -> Voting {
    Voting {
        id: 11,
        assembly_id: 3,
        agenda_numeral: Some(2),
        question: "Approve the renovation budget?".to_string(),
        options,
        status: VotingStatus::Active,
        total_votes,
        total_coefficient_voted,
        opened_at: Utc::now(),
        closed_at: None,
    }
}

#[test]
fn test_binary_result_percentages() {
    // 2 yes votes (0.5 + 0.3) and 1 no vote (0.2) out of 1.0 registered.
    let voting = round(3, dec("1.0"), default_options());
    let tallies = vec![
        ("yes".to_string(), 2, dec("0.8")),
        ("no".to_string(), 1, dec("0.2")),
    ];
    let stats = VotingStats::compute(&voting, &tallies, dec("1.0"));

    assert_eq!(stats.total_votes, 3);
    assert_eq!(stats.options[0].option_value, "yes");
    assert_eq!(stats.options[0].votes, 2);
    assert_eq!(stats.options[0].percentage, 80);
    assert_eq!(stats.options[1].option_value, "no");
    assert_eq!(stats.options[1].percentage, 20);
    assert_eq!(stats.turnout, dec("1.0"));
}

#[test]
fn test_percentages_round_independently() {
    // 0.1 of 0.8 is 12.5% and 0.7 of 0.8 is 87.5%; both round away from
    // the midpoint, so the rounded shares sum to 101. Accepted behavior.
    let voting = round(2, dec("0.8"), default_options());
    let tallies = vec![
        ("yes".to_string(), 1, dec("0.7")),
        ("no".to_string(), 1, dec("0.1")),
    ];
    let stats = VotingStats::compute(&voting, &tallies, dec("1.0"));

    assert_eq!(stats.options[0].percentage, 88);
    assert_eq!(stats.options[1].percentage, 13);
    assert_eq!(
        stats.options.iter().map(|o| o.percentage).sum::<i64>(),
        101
    );
}

#[test]
fn test_three_way_split_loses_a_percent() {
    let options = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let voting = round(3, dec("0.999999"), options);
    let tallies = vec![
        ("a".to_string(), 1, dec("0.333333")),
        ("b".to_string(), 1, dec("0.333333")),
        ("c".to_string(), 1, dec("0.333333")),
    ];
    let stats = VotingStats::compute(&voting, &tallies, dec("1.0"));
    assert!(stats.options.iter().all(|o| o.percentage == 33));
}

#[test]
fn test_unvoted_options_appear_zeroed() {
    let voting = round(1, dec("0.5"), default_options());
    let tallies = vec![("yes".to_string(), 1, dec("0.5"))];
    let stats = VotingStats::compute(&voting, &tallies, dec("1.0"));

    assert_eq!(stats.options.len(), 2);
    assert_eq!(stats.options[1].option_value, "no");
    assert_eq!(stats.options[1].votes, 0);
    assert_eq!(stats.options[1].coefficient, Decimal::ZERO);
    assert_eq!(stats.options[1].percentage, 0);
}

#[test]
fn test_no_votes_yet() {
    let voting = round(0, Decimal::ZERO, default_options());
    let stats = VotingStats::compute(&voting, &[], dec("0.8"));
    assert_eq!(stats.total_votes, 0);
    assert_eq!(stats.turnout, Decimal::ZERO);
    assert!(stats.options.iter().all(|o| o.percentage == 0));
}

#[test]
fn test_turnout_is_share_of_registered() {
    let voting = round(2, dec("0.6"), default_options());
    let stats = VotingStats::compute(&voting, &[], dec("0.8"));
    assert_eq!(stats.turnout, dec("0.75"));
}

#[test]
fn test_turnout_with_no_registered_attendees() {
    let voting = round(0, Decimal::ZERO, default_options());
    let stats = VotingStats::compute(&voting, &[], Decimal::ZERO);
    assert_eq!(stats.turnout, Decimal::ZERO);
}

#[test]
fn test_stats_are_idempotent() {
    let voting = round(3, dec("1.0"), default_options());
    let tallies = vec![
        ("yes".to_string(), 2, dec("0.8")),
        ("no".to_string(), 1, dec("0.2")),
    ];
    let first = VotingStats::compute(&voting, &tallies, dec("1.0"));
    let second = VotingStats::compute(&voting, &tallies, dec("1.0"));
    assert_eq!(first, second);
}

#[test]
fn test_option_percentage_edges() {
    assert_eq!(option_percentage(Decimal::ZERO, Decimal::ZERO), 0);
    assert_eq!(option_percentage(dec("0.5"), dec("0.5")), 100);
    assert_eq!(option_percentage(dec("0.005"), dec("1.0")), 1);
    assert_eq!(option_percentage(dec("0.004"), dec("1.0")), 0);
}

#[test]
fn test_voting_status_parse() {
    assert_eq!(VotingStatus::parse("active"), Some(VotingStatus::Active));
    assert_eq!(VotingStatus::parse("closed"), Some(VotingStatus::Closed));
    assert_eq!(VotingStatus::parse("open"), None);
}
