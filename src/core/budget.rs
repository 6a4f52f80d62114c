//! Budget store - creation, lookup and limit edits for budget rows.
//!
//! A budget row is keyed by `(user, scope, month, year)` and starts with `spent_amount = 0`
//! and `remaining_amount = amount_limit`. Spend only moves through
//! [`crate::core::reconcile::apply_delta`]; this module never touches it except to keep
//! `remaining_amount` in step when the limit changes.

use crate::{
    core::{
        category::require_owned_category,
        period::{BudgetPeriod, BudgetScope},
        user::require_user,
    },
    entities::{Budget, budget},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Select, Set, prelude::*};
use tracing::info;

/// Narrows a budget query to one scope. Overall rows have a NULL category.
fn filter_scope(query: Select<Budget>, scope: BudgetScope) -> Select<Budget> {
    match scope {
        BudgetScope::Overall => query.filter(budget::Column::CategoryId.is_null()),
        BudgetScope::Category(id) => query.filter(budget::Column::CategoryId.eq(id)),
    }
}

fn filter_period(query: Select<Budget>, period: BudgetPeriod) -> Select<Budget> {
    query
        .filter(budget::Column::BudgetMonth.eq(period.month_key()))
        .filter(budget::Column::BudgetYear.eq(period.year()))
}

fn validate_limit(amount_limit: f64) -> Result<()> {
    if !amount_limit.is_finite() || amount_limit < 0.0 {
        return Err(Error::InvalidAmount {
            amount: amount_limit,
        });
    }
    Ok(())
}

/// Finds the budget row for `(user, scope, month, year)`, if any.
pub async fn find_budget<C>(
    db: &C,
    user_id: i64,
    scope: BudgetScope,
    period: BudgetPeriod,
) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    let query = Budget::find().filter(budget::Column::UserId.eq(user_id));
    filter_period(filter_scope(query, scope), period)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every budget row (overall and per-category) a user has for one month.
pub async fn list_budgets_for_period<C>(
    db: &C,
    user_id: i64,
    period: BudgetPeriod,
) -> Result<Vec<budget::Model>>
where
    C: ConnectionTrait,
{
    let query = Budget::find().filter(budget::Column::UserId.eq(user_id));
    filter_period(query, period)
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a budget row for a known user id.
///
/// Rejects a second row for the same key; the reconciler relies on there being at most one.
pub async fn insert_budget<C>(
    db: &C,
    user_id: i64,
    scope: BudgetScope,
    amount_limit: f64,
    period: BudgetPeriod,
) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    validate_limit(amount_limit)?;

    if find_budget(db, user_id, scope, period).await?.is_some() {
        return Err(Error::Validation {
            message: format!("A budget for {scope} in {period} already exists"),
        });
    }

    let now = Utc::now();
    let budget = budget::ActiveModel {
        user_id: Set(user_id),
        category_id: Set(scope.category_id()),
        amount_limit: Set(amount_limit),
        spent_amount: Set(0.0),
        remaining_amount: Set(amount_limit),
        budget_month: Set(period.month_key()),
        budget_year: Set(period.year()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        user_id,
        budget_id = budget.id,
        "Created budget for {} in {} with limit {:.2}",
        scope,
        period,
        amount_limit
    );
    Ok(budget)
}

/// Creates a budget owned by `username`. Category budgets require the caller to own the category.
pub async fn create_budget(
    db: &DatabaseConnection,
    username: &str,
    scope: BudgetScope,
    amount_limit: f64,
    period: BudgetPeriod,
) -> Result<budget::Model> {
    validate_limit(amount_limit)?;
    let user = require_user(db, username).await?;

    if let BudgetScope::Category(category_id) = scope {
        require_owned_category(db, user.id, category_id).await?;
    }

    insert_budget(db, user.id, scope, amount_limit, period).await
}

/// Loads a budget and checks that `user_id` owns it.
pub async fn require_owned_budget<C>(db: &C, user_id: i64, id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let budget = Budget::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFoundById { id })?;

    if budget.user_id != user_id {
        return Err(Error::Unauthorized {
            message: format!("budget {id} does not belong to the user"),
        });
    }

    Ok(budget)
}

pub async fn get_budget(db: &DatabaseConnection, username: &str, id: i64) -> Result<budget::Model> {
    let user = require_user(db, username).await?;
    require_owned_budget(db, user.id, id).await
}

/// Lists all of a user's budgets, newest month first.
pub async fn list_budgets_for_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Vec<budget::Model>> {
    let user = require_user(db, username).await?;
    Budget::find()
        .filter(budget::Column::UserId.eq(user.id))
        .order_by_desc(budget::Column::BudgetYear)
        .order_by_desc(budget::Column::BudgetMonth)
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Looks up the budget for a scope and month on behalf of `username`.
pub async fn get_budget_for_scope(
    db: &DatabaseConnection,
    username: &str,
    scope: BudgetScope,
    period: BudgetPeriod,
) -> Result<budget::Model> {
    let user = require_user(db, username).await?;
    find_budget(db, user.id, scope, period)
        .await?
        .ok_or(Error::BudgetNotFound {
            user_id: user.id,
            scope,
            period,
        })
}

/// Changes a budget's limit, recomputing `remaining_amount` from the unchanged spend.
pub async fn update_budget_limit(
    db: &DatabaseConnection,
    username: &str,
    id: i64,
    amount_limit: f64,
) -> Result<budget::Model> {
    validate_limit(amount_limit)?;
    let user = require_user(db, username).await?;
    let budget = require_owned_budget(db, user.id, id).await?;

    let remaining = amount_limit - budget.spent_amount;
    let mut active_model: budget::ActiveModel = budget.into();
    active_model.amount_limit = Set(amount_limit);
    active_model.remaining_amount = Set(remaining);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a budget the caller owns.
pub async fn delete_budget(db: &DatabaseConnection, username: &str, id: i64) -> Result<()> {
    let user = require_user(db, username).await?;
    let budget = require_owned_budget(db, user.id, id).await?;
    budget.delete(db).await?;
    info!(user_id = user.id, budget_id = id, "Deleted budget");
    Ok(())
}
