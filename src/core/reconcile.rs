//! Budget reconciler - applies signed spend deltas to the matching budget row.
//!
//! The transaction lifecycle maps onto deltas as follows:
//!
//! | Event                                  | Calls                                            |
//! |----------------------------------------|--------------------------------------------------|
//! | create (amount A, category C, date D)  | `+A` on `(C, D)`                                 |
//! | delete                                 | `-A` on `(C, D)`                                 |
//! | update, same category                  | `A_new - A_old` on `(C, D_new)`                  |
//! | update, category C_old -> C_new        | `-A_old` on `(C_old, D_old)`, then `+A_new` on `(C_new, D_new)` |
//!
//! A delta is not idempotent: applying it twice double-counts. The update is a plain
//! read-modify-write with no row lock or version check, so two concurrent deltas on the same
//! key can lose one of the updates.

use crate::{
    core::{
        budget::find_budget,
        period::{BudgetPeriod, BudgetScope},
    },
    entities::budget,
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, instrument};

/// Adds `amount` to the spend of the budget keyed by `(user_id, scope, period)`.
///
/// Never creates a budget: a missing row is `BudgetNotFound` and nothing is written.
/// Negative amounts undo earlier spend.
#[instrument(skip(db))]
pub async fn apply_delta<C>(
    db: &C,
    user_id: i64,
    scope: BudgetScope,
    amount: f64,
    period: BudgetPeriod,
) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let budget = find_budget(db, user_id, scope, period)
        .await?
        .ok_or(Error::BudgetNotFound {
            user_id,
            scope,
            period,
        })?;

    let spent = budget.spent_amount + amount;
    let remaining = budget.amount_limit - spent;

    let mut active_model: budget::ActiveModel = budget.into();
    active_model.spent_amount = Set(spent);
    active_model.remaining_amount = Set(remaining);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    debug!(
        budget_id = updated.id,
        spent = updated.spent_amount,
        remaining = updated.remaining_amount,
        "Applied budget delta"
    );
    Ok(updated)
}
