//! Budget entity - one spending limit per (user, category-or-none, month, year).
//!
//! A NULL `category_id` marks the user's overall budget for the month. `remaining_amount`
//! is always `amount_limit - spent_amount`; only the reconciler moves `spent_amount`.
//! The category column carries no foreign key: deleting a category leaves its budget rows.

use crate::core::period::{BudgetPeriod, BudgetScope};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model, serialised with the field names clients expect
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub user_id: i64,
    /// Category this budget tracks, None for the overall budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Spending limit for the month
    pub amount_limit: f64,
    /// Cumulative spend booked against this row
    pub spent_amount: f64,
    /// `amount_limit - spent_amount`
    pub remaining_amount: f64,
    /// Two-digit month key, `"01"`..`"12"`
    pub budget_month: String,
    pub budget_year: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Overall or per-category, decoded from the nullable column.
    #[must_use]
    pub fn scope(&self) -> BudgetScope {
        BudgetScope::from(self.category_id)
    }

    /// Month/year this row covers.
    pub fn period(&self) -> crate::errors::Result<BudgetPeriod> {
        BudgetPeriod::parse(&self.budget_month, self.budget_year)
    }
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
