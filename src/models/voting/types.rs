use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Default option set for a binary round.
pub fn default_options() -> Vec<String> {
    vec!["yes".to_string(), "no".to_string()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    Active,
    Closed,
}

impl VotingStatus {
    pub fn parse(value: &str) -> Option<VotingStatus> {
        match value {
            "active" => Some(VotingStatus::Active),
            "closed" => Some(VotingStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VotingStatus::Active => "active",
            VotingStatus::Closed => "closed",
        }
    }
}

/// One agenda item's ballot round. The running counters are only mutated
/// through the atomic cast path in `queries::cast`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voting {
    pub id: i64,
    pub assembly_id: i64,
    pub agenda_numeral: Option<i32>,
    pub question: String,
    pub options: Vec<String>,
    pub status: VotingStatus,
    pub total_votes: i64,
    pub total_coefficient_voted: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// A single cast ballot. Append-only; the coefficient is a snapshot from
/// the attendee record at cast time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub voting_id: i64,
    pub user_id: i64,
    pub option_value: String,
    pub coefficient: Decimal,
    pub cast_at: DateTime<Utc>,
}

/// Per-option slice of a round's tallies.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub option_value: String,
    pub votes: i64,
    pub coefficient: Decimal,
    /// Share of the coefficient voted so far, rounded to the nearest whole
    /// percent independently per option. The rounded values may not sum to
    /// exactly 100; callers rely on that being stable, so it stays.
    pub percentage: i64,
}

/// Tally snapshot for a round: running while active, final once closed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VotingStats {
    pub voting_id: i64,
    pub assembly_id: i64,
    pub agenda_numeral: Option<i32>,
    pub question: String,
    pub status: VotingStatus,
    pub total_votes: i64,
    pub total_coefficient_voted: Decimal,
    pub options: Vec<OptionTally>,
    /// Fraction of the registered coefficient that has voted in this round.
    pub turnout: Decimal,
}

/// Round a coefficient share to a whole percentage of the voted total.
pub fn option_percentage(option_coefficient: Decimal, total_voted: Decimal) -> i64 {
    if total_voted.is_zero() {
        return 0;
    }
    (option_coefficient * Decimal::ONE_HUNDRED / total_voted)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

impl VotingStats {
    /// Compose a stats snapshot from the round, the per-option sums from the
    /// votes table, and the assembly's registered coefficient. Options with
    /// no votes yet still appear with zeroed tallies.
    pub fn compute(
        voting: &Voting,
        tallies: &[(String, i64, Decimal)],
        registered_coefficient: Decimal,
    ) -> VotingStats {
        let options = voting
            .options
            .iter()
            .map(|option| {
                let (votes, coefficient) = tallies
                    .iter()
                    .find(|(value, _, _)| value == option)
                    .map(|(_, votes, coefficient)| (*votes, *coefficient))
                    .unwrap_or((0, Decimal::ZERO));
                OptionTally {
                    option_value: option.clone(),
                    votes,
                    coefficient,
                    percentage: option_percentage(coefficient, voting.total_coefficient_voted),
                }
            })
            .collect();

        let turnout = if registered_coefficient.is_zero() {
            Decimal::ZERO
        } else {
            (voting.total_coefficient_voted / registered_coefficient).round_dp(6)
        };

        VotingStats {
            voting_id: voting.id,
            assembly_id: voting.assembly_id,
            agenda_numeral: voting.agenda_numeral,
            question: voting.question.clone(),
            status: voting.status,
            total_votes: voting.total_votes,
            total_coefficient_voted: voting.total_coefficient_voted,
            options,
            turnout,
        }
    }
}
