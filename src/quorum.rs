//! Quorum calculation over registered attendance coefficients.
//!
//! Stateless: recomputed on demand from the attendee registry and the
//! external unit registry totals. Coefficients are fixed-point decimals;
//! the epsilon absorbs residual rounding from per-unit coefficient entry.

use rust_decimal::Decimal;
use serde::Serialize;

/// Tolerance for coefficient comparisons (1e-6).
pub fn epsilon() -> Decimal {
    Decimal::new(1, 6)
}

/// Whether the registered coefficient reaches the threshold fraction of the
/// complex's total coefficient.
pub fn is_quorum_met(registered: Decimal, total: Decimal, threshold: Decimal) -> bool {
    registered + epsilon() >= threshold * total
}

/// Snapshot of one quorum evaluation, returned by the quorum endpoint and
/// used to gate the session-start transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumReport {
    pub registered_coefficient: Decimal,
    pub total_coefficient: Decimal,
    pub threshold: Decimal,
    pub met: bool,
}

impl QuorumReport {
    pub fn compute(registered: Decimal, total: Decimal, threshold: Decimal) -> QuorumReport {
        QuorumReport {
            registered_coefficient: registered,
            total_coefficient: total,
            threshold,
            met: is_quorum_met(registered, total, threshold),
        }
    }
}
