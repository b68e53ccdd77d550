//! Interface to the external unit/property registry.
//!
//! Ownership coefficients belong to the portal's property module; this
//! service only reads them. `PgUnitRegistry` reads the tenant's `units`
//! projection; tests substitute an in-memory implementation.

use rust_decimal::Decimal;

use crate::db::TenantDb;
use crate::errors::AppError;

/// A property unit and its share of the complex's total voting weight.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: i64,
    pub owner_user_id: Option<i64>,
    pub coefficient: Decimal,
}

pub trait UnitRegistry {
    /// The unit owned by a user, if any. Users without a unit are not
    /// eligible to register attendance.
    async fn unit_for_user(&self, user_id: i64) -> Result<Option<Unit>, AppError>;

    /// Sum of all unit coefficients in the complex (1.0 by construction).
    async fn total_complex_coefficient(&self) -> Result<Decimal, AppError>;
}

pub struct PgUnitRegistry {
    db: TenantDb,
}

impl PgUnitRegistry {
    pub fn new(db: TenantDb) -> Self {
        PgUnitRegistry { db }
    }
}

impl UnitRegistry for PgUnitRegistry {
    async fn unit_for_user(&self, user_id: i64) -> Result<Option<Unit>, AppError> {
        let mut tx = self.db.begin().await?;
        let row: Option<(i64, Option<i64>, Decimal)> = sqlx::query_as(
            "SELECT id, owner_user_id, coefficient FROM units \
             WHERE owner_user_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.map(|(id, owner_user_id, coefficient)| Unit {
            id,
            owner_user_id,
            coefficient,
        }))
    }

    async fn total_complex_coefficient(&self) -> Result<Decimal, AppError> {
        let mut tx = self.db.begin().await?;
        let row: (Decimal,) = sqlx::query_as("SELECT COALESCE(SUM(coefficient), 0) FROM units")
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row.0)
    }
}
