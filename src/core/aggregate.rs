//! Budget aggregation - read-only summaries over budget rows.
//!
//! The overall summary covers the current month only. Rows with a positive limit are real
//! budgets and feed the limit/spent/remaining totals; zero-limit rows (the signup default
//! bucket) only contribute their spend to `uncategorized_total`, so they cannot drag the
//! remaining figure negative.
//!
//! Category history always has one entry per month for the last four months, newest first,
//! with zeros for months that have no budget row.

use crate::{
    core::{
        budget::{find_budget, list_budgets_for_period},
        category::require_owned_category,
        period::{BudgetPeriod, BudgetScope},
        user::require_user,
    },
    entities::budget,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::debug;

/// Number of months in a category history, including the current one
pub const HISTORY_MONTHS: u32 = 4;

/// A user's budget totals for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallBudgetResponse {
    pub user_id: i64,
    /// Sum of limits across budgets with a positive limit
    #[serde(rename = "amount_limit")]
    pub amount_limit_total: f64,
    /// Spend across budgets with a positive limit
    #[serde(rename = "spent_amount")]
    pub spent_total: f64,
    /// Remaining across budgets with a positive limit
    #[serde(rename = "remaining_amount")]
    pub remaining_total: f64,
    #[serde(rename = "budget_month")]
    pub month: String,
    #[serde(rename = "budget_year")]
    pub year: i32,
    /// Spend booked against zero-limit budgets
    pub uncategorized_total: f64,
}

/// One month of a category's budget figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetHistoryEntry {
    pub month: String,
    pub year: i32,
    pub amount_limit: f64,
    pub spent_amount: f64,
    pub remaining_amount: f64,
}

impl BudgetHistoryEntry {
    /// Placeholder for a month that has no budget row.
    #[must_use]
    pub fn empty(period: BudgetPeriod) -> Self {
        Self {
            month: period.month_key(),
            year: period.year(),
            amount_limit: 0.0,
            spent_amount: 0.0,
            remaining_amount: 0.0,
        }
    }

    #[must_use]
    pub fn from_budget(period: BudgetPeriod, budget: &budget::Model) -> Self {
        Self {
            month: period.month_key(),
            year: period.year(),
            amount_limit: budget.amount_limit,
            spent_amount: budget.spent_amount,
            remaining_amount: budget.remaining_amount,
        }
    }
}

/// Last [`HISTORY_MONTHS`] months of one category's budget, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudgetHistoryResponse {
    pub category_id: i64,
    pub history: Vec<BudgetHistoryEntry>,
}

/// Folds a month's budget rows into totals, splitting off zero-limit rows.
#[must_use]
pub fn summarize_budgets(
    user_id: i64,
    period: BudgetPeriod,
    budgets: &[budget::Model],
) -> OverallBudgetResponse {
    let mut summary = OverallBudgetResponse {
        user_id,
        amount_limit_total: 0.0,
        spent_total: 0.0,
        remaining_total: 0.0,
        month: period.month_key(),
        year: period.year(),
        uncategorized_total: 0.0,
    };

    for budget in budgets {
        if budget.amount_limit > 0.0 {
            summary.amount_limit_total += budget.amount_limit;
            summary.spent_total += budget.spent_amount;
            summary.remaining_total += budget.remaining_amount;
        } else {
            summary.uncategorized_total += budget.spent_amount;
        }
    }

    summary
}

/// Overall budget summary for `username` in the current month.
pub async fn calculate_overall_budget(
    db: &DatabaseConnection,
    username: &str,
) -> Result<OverallBudgetResponse> {
    let user = require_user(db, username).await?;
    calculate_overall_budget_for(db, user.id, BudgetPeriod::current()).await
}

/// Overall budget summary for a user id and explicit month.
pub async fn calculate_overall_budget_for(
    db: &DatabaseConnection,
    user_id: i64,
    period: BudgetPeriod,
) -> Result<OverallBudgetResponse> {
    let budgets = list_budgets_for_period(db, user_id, period).await?;
    debug!(user_id, "Summarizing {} budgets for {}", budgets.len(), period);
    Ok(summarize_budgets(user_id, period, &budgets))
}

/// Budget history for one of `username`'s categories, ending at the current month.
pub async fn budget_history_for_category(
    db: &DatabaseConnection,
    username: &str,
    category_id: i64,
) -> Result<CategoryBudgetHistoryResponse> {
    let user = require_user(db, username).await?;
    require_owned_category(db, user.id, category_id).await?;
    budget_history_for_category_at(db, user.id, category_id, BudgetPeriod::current()).await
}

/// Budget history for a category ending at `latest`, walking back across year boundaries.
pub async fn budget_history_for_category_at(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
    latest: BudgetPeriod,
) -> Result<CategoryBudgetHistoryResponse> {
    let scope = BudgetScope::Category(category_id);
    let mut history = Vec::with_capacity(HISTORY_MONTHS as usize);

    for offset in 0..HISTORY_MONTHS {
        let period = latest.months_back(offset);
        let entry = match find_budget(db, user_id, scope, period).await? {
            Some(budget) => BudgetHistoryEntry::from_budget(period, &budget),
            None => BudgetHistoryEntry::empty(period),
        };
        history.push(entry);
    }

    Ok(CategoryBudgetHistoryResponse {
        category_id,
        history,
    })
}
