//! Shared test utilities for `Pennywise`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users, categories and budgets with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{
    config::settings::Settings,
    core::{
        budget::insert_budget,
        category::create_category,
        period::{BudgetPeriod, BudgetScope},
        user::sign_up,
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Username owned by the fixtures from [`setup_with_category`].
pub const TEST_USERNAME: &str = "test_user";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Default settings ("Uncategorized" default category, 60 minute reset tokens).
pub fn test_settings() -> Settings {
    Settings::default()
}

/// Signs up a user through the normal flow, so the default category and its
/// current-month budget exist.
///
/// # Defaults
/// * `email`: `"{username}@example.com"`
/// * `password_hash`: `"hash"`
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    sign_up(
        db,
        &test_settings(),
        username,
        &format!("{username}@example.com"),
        "hash",
    )
    .await
}

/// Sets up a complete test environment with a user and one named category.
/// Returns (db, user, category); the user is [`TEST_USERNAME`].
pub async fn setup_with_category(
    name: &str,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::category::Model,
)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, TEST_USERNAME).await?;
    let category = create_category(&db, TEST_USERNAME, name, "").await?;
    Ok((db, user, category))
}

/// Creates a budget with nothing spent.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    user_id: i64,
    scope: BudgetScope,
    amount_limit: f64,
    period: BudgetPeriod,
) -> Result<entities::budget::Model> {
    insert_budget(db, user_id, scope, amount_limit, period).await
}

/// Builds an unsaved budget row for September 2024 owned by user 1.
pub fn test_budget_model(
    id: i64,
    category_id: Option<i64>,
    amount_limit: f64,
    spent_amount: f64,
) -> entities::budget::Model {
    let now = Utc::now();
    entities::budget::Model {
        id,
        user_id: 1,
        category_id,
        amount_limit,
        spent_amount,
        remaining_amount: amount_limit - spent_amount,
        budget_month: "09".to_string(),
        budget_year: 2024,
        created_at: now,
        updated_at: now,
    }
}

/// Noon UTC on the given day.
pub fn test_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    test_date_time(year, month, day, 12, 0)
}

pub fn test_date_time(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test date")
}
