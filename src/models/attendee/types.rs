use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One eligible voter in one assembly. The coefficient is the owning unit's
/// share of total voting weight, frozen at check-in so later coefficient
/// changes in the property registry cannot skew this assembly's tallies.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: i64,
    pub assembly_id: i64,
    pub user_id: i64,
    pub unit_id: i64,
    pub coefficient: Decimal,
    pub delegate_name: Option<String>,
    pub registered_at: DateTime<Utc>,
}
