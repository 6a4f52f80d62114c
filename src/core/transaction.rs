//! Transaction business logic - the lifecycle of income/expense entries.
//!
//! Every state change is followed by the matching reconciler call(s) so budget spend stays in
//! step with the transactions booked against it. The transaction write and the budget write
//! are separate statements: if reconciliation fails (for instance because no budget row exists
//! for that category and month) the transaction change has already been stored and the error
//! is returned to the caller without rollback.

use crate::{
    config::settings::Settings,
    core::{
        category::{find_default_category, require_owned_category},
        period::{BudgetPeriod, BudgetScope},
        reconcile::apply_delta,
        user::require_user,
    },
    entities::{Category, Transaction, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::{info, warn};

/// A transaction together with the name of its category, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    /// Empty if the category has since been deleted
    pub category_name: String,
    pub amount: f64,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parses a transaction date given as RFC 3339 or as a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_transaction_date(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| Error::Validation {
            message: format!("Invalid transaction date '{text}': {e}"),
        })
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Loads a transaction and checks that `user_id` owns it.
async fn require_owned_transaction<C>(db: &C, user_id: i64, id: i64) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let transaction = Transaction::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id })?;

    if transaction.user_id != user_id {
        return Err(Error::Unauthorized {
            message: format!("transaction {id} does not belong to the user"),
        });
    }

    Ok(transaction)
}

/// Records a transaction and adds its amount to the matching category budget.
///
/// `category_id` of `None` (or `Some(0)`) books the transaction against the user's default
/// category. A missing default category is reported as `DefaultCategoryMissing`.
pub async fn create_transaction(
    db: &DatabaseConnection,
    settings: &Settings,
    username: &str,
    category_id: Option<i64>,
    amount: f64,
    description: &str,
    transaction_date: DateTime<Utc>,
) -> Result<transaction::Model> {
    validate_amount(amount)?;
    let user = require_user(db, username).await?;

    let category_id = match category_id.filter(|id| *id != 0) {
        Some(id) => require_owned_category(db, user.id, id).await?.id,
        None => {
            find_default_category(db, settings, user.id)
                .await?
                .ok_or(Error::DefaultCategoryMissing { user_id: user.id })?
                .id
        }
    };

    let now = Utc::now();
    let transaction = transaction::ActiveModel {
        user_id: Set(user.id),
        category_id: Set(category_id),
        amount: Set(amount),
        description: Set(description.to_string()),
        transaction_date: Set(transaction_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    apply_delta(
        db,
        user.id,
        BudgetScope::Category(category_id),
        amount,
        BudgetPeriod::from_date(&transaction_date),
    )
    .await
    .inspect_err(|e| {
        warn!(
            transaction_id = transaction.id,
            "Transaction stored but budget not updated: {}", e
        );
    })?;

    info!(
        user_id = user.id,
        transaction_id = transaction.id,
        category_id,
        "Created transaction of {:.2}",
        amount
    );
    Ok(transaction)
}

/// Rewrites a transaction's fields and moves its effect between budgets.
///
/// With an unchanged category, the difference `amount - old_amount` is applied to the month
/// of the new date. When the category changes, the old amount comes off the old category in
/// the old date's month and the new amount goes onto the new category in the new date's month.
pub async fn update_transaction(
    db: &DatabaseConnection,
    username: &str,
    id: i64,
    amount: f64,
    category_id: i64,
    description: &str,
    transaction_date: DateTime<Utc>,
) -> Result<transaction::Model> {
    validate_amount(amount)?;
    let user = require_user(db, username).await?;
    let existing = require_owned_transaction(db, user.id, id).await?;
    require_owned_category(db, user.id, category_id).await?;

    let old_amount = existing.amount;
    let old_category_id = existing.category_id;
    let old_period = BudgetPeriod::from_date(&existing.transaction_date);
    let new_period = BudgetPeriod::from_date(&transaction_date);

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.amount = Set(amount);
    active_model.category_id = Set(category_id);
    active_model.description = Set(description.to_string());
    active_model.transaction_date = Set(transaction_date);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    let reconciled: Result<()> = async {
        if old_category_id == category_id {
            apply_delta(
                db,
                user.id,
                BudgetScope::Category(category_id),
                amount - old_amount,
                new_period,
            )
            .await?;
        } else {
            apply_delta(
                db,
                user.id,
                BudgetScope::Category(old_category_id),
                -old_amount,
                old_period,
            )
            .await?;
            apply_delta(
                db,
                user.id,
                BudgetScope::Category(category_id),
                amount,
                new_period,
            )
            .await?;
        }
        Ok(())
    }
    .await;
    reconciled.inspect_err(|e| {
        warn!(
            transaction_id = id,
            "Transaction updated but budgets not reconciled: {}", e
        );
    })?;

    info!(
        user_id = user.id,
        transaction_id = id,
        "Updated transaction: {:.2} -> {:.2}, category {} -> {}",
        old_amount,
        amount,
        old_category_id,
        category_id
    );
    Ok(updated)
}

/// Deletes a transaction and takes its amount back off its budget.
pub async fn delete_transaction(db: &DatabaseConnection, username: &str, id: i64) -> Result<()> {
    let user = require_user(db, username).await?;
    let transaction = require_owned_transaction(db, user.id, id).await?;

    let category_id = transaction.category_id;
    let amount_to_reverse = -transaction.amount;
    let period = BudgetPeriod::from_date(&transaction.transaction_date);

    transaction.delete(db).await?;

    apply_delta(
        db,
        user.id,
        BudgetScope::Category(category_id),
        amount_to_reverse,
        period,
    )
    .await
    .inspect_err(|e| {
        warn!(
            transaction_id = id,
            "Transaction deleted but budget not updated: {}", e
        );
    })?;

    info!(user_id = user.id, transaction_id = id, "Deleted transaction");
    Ok(())
}

pub async fn get_transaction(
    db: &DatabaseConnection,
    username: &str,
    id: i64,
) -> Result<transaction::Model> {
    let user = require_user(db, username).await?;
    require_owned_transaction(db, user.id, id).await
}

/// Retrieves all of a user's transactions, newest transaction date first.
pub async fn list_transactions(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Vec<transaction::Model>> {
    let user = require_user(db, username).await?;
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user.id))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user's transactions in one category, newest transaction date first.
///
/// The category must belong to the user.
pub async fn list_transactions_for_category(
    db: &DatabaseConnection,
    username: &str,
    category_id: i64,
) -> Result<Vec<transaction::Model>> {
    let user = require_user(db, username).await?;
    require_owned_category(db, user.id, category_id).await?;
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user.id))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Attaches the category name to a transaction for display.
pub async fn transaction_with_category<C>(
    db: &C,
    transaction: transaction::Model,
) -> Result<TransactionResponse>
where
    C: ConnectionTrait,
{
    let category_name = Category::find_by_id(transaction.category_id)
        .one(db)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();

    Ok(TransactionResponse {
        id: transaction.id,
        user_id: transaction.user_id,
        category_id: transaction.category_id,
        category_name,
        amount: transaction.amount,
        description: transaction.description,
        transaction_date: transaction.transaction_date,
        created_at: transaction.created_at,
        updated_at: transaction.updated_at,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::core::{budget::find_budget, category::create_category, user::sign_up};
    use crate::entities::{Budget, category};
    use crate::test_utils::*;

    async fn spent(
        db: &DatabaseConnection,
        user_id: i64,
        category_id: i64,
        period: BudgetPeriod,
    ) -> Result<(f64, f64)> {
        let budget = find_budget(db, user_id, BudgetScope::Category(category_id), period)
            .await?
            .unwrap();
        assert_eq!(
            budget.remaining_amount,
            budget.amount_limit - budget.spent_amount
        );
        Ok((budget.spent_amount, budget.remaining_amount))
    }

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let (db, _user, category) = setup_with_category("Groceries").await?;
        let settings = test_settings();
        let date = test_date(2024, 9, 15);

        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = create_transaction(
                &db,
                &settings,
                TEST_USERNAME,
                Some(category.id),
                amount,
                "bad",
                date,
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        let unknown_user =
            create_transaction(&db, &settings, "ghost", Some(category.id), 5.0, "", date).await;
        assert!(matches!(unknown_user, Err(Error::UserNotFound { .. })));

        assert!(Transaction::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_update_delete_round_trip() -> Result<()> {
        let (db, user, category) = setup_with_category("Groceries").await?;
        let settings = test_settings();
        let period = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(category.id), 1000.0, period)
            .await?;
        let date = test_date(2024, 9, 15);

        let created = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(category.id),
            100.0,
            "Weekly shop",
            date,
        )
        .await?;
        assert_eq!(created.category_id, category.id);
        assert_eq!(spent(&db, user.id, category.id, period).await?, (100.0, 900.0));

        update_transaction(
            &db,
            TEST_USERNAME,
            created.id,
            250.0,
            category.id,
            "Weekly shop",
            date,
        )
        .await?;
        assert_eq!(spent(&db, user.id, category.id, period).await?, (250.0, 750.0));

        delete_transaction(&db, TEST_USERNAME, created.id).await?;
        assert_eq!(spent(&db, user.id, category.id, period).await?, (0.0, 1000.0));
        assert!(Transaction::find_by_id(created.id).one(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_category_move_shifts_spend() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let fun = create_category(&db, TEST_USERNAME, "Fun", "").await?;
        let rent = create_category(&db, TEST_USERNAME, "Rent", "").await?;
        let period = BudgetPeriod::new(8, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, period).await?;
        create_test_budget(&db, user.id, BudgetScope::Category(fun.id), 800.0, period).await?;
        create_test_budget(&db, user.id, BudgetScope::Category(rent.id), 1200.0, period).await?;
        let date = test_date(2024, 8, 10);

        let txn =
            create_transaction(&db, &settings, TEST_USERNAME, Some(food.id), 50.0, "", date)
                .await?;
        assert_eq!(spent(&db, user.id, food.id, period).await?, (50.0, 450.0));

        let moved = update_transaction(&db, TEST_USERNAME, txn.id, 70.0, fun.id, "", date).await?;
        assert_eq!(moved.category_id, fun.id);
        assert_eq!(moved.amount, 70.0);

        assert_eq!(spent(&db, user.id, food.id, period).await?, (0.0, 500.0));
        assert_eq!(spent(&db, user.id, fun.id, period).await?, (70.0, 730.0));
        assert_eq!(spent(&db, user.id, rent.id, period).await?, (0.0, 1200.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_category_move_uses_old_month_for_removal() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let fun = create_category(&db, TEST_USERNAME, "Fun", "").await?;
        let august = BudgetPeriod::new(8, 2024)?;
        let september = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, august).await?;
        create_test_budget(&db, user.id, BudgetScope::Category(fun.id), 800.0, september).await?;

        let txn = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            40.0,
            "",
            test_date(2024, 8, 20),
        )
        .await?;

        update_transaction(
            &db,
            TEST_USERNAME,
            txn.id,
            40.0,
            fun.id,
            "",
            test_date(2024, 9, 2),
        )
        .await?;

        assert_eq!(spent(&db, user.id, food.id, august).await?, (0.0, 500.0));
        assert_eq!(spent(&db, user.id, fun.id, september).await?, (40.0, 760.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_same_category_update_books_delta_in_new_month() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let august = BudgetPeriod::new(8, 2024)?;
        let september = BudgetPeriod::new(9, 2024)?;
        let scope = BudgetScope::Category(food.id);
        create_test_budget(&db, user.id, scope, 500.0, august).await?;
        create_test_budget(&db, user.id, scope, 500.0, september).await?;

        let txn = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            100.0,
            "",
            test_date(2024, 8, 31),
        )
        .await?;

        update_transaction(
            &db,
            TEST_USERNAME,
            txn.id,
            130.0,
            food.id,
            "",
            test_date(2024, 9, 1),
        )
        .await?;

        // Only the difference moves, and it lands in the new date's month
        assert_eq!(spent(&db, user.id, food.id, august).await?, (100.0, 400.0));
        assert_eq!(spent(&db, user.id, food.id, september).await?, (30.0, 470.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_without_category_uses_default() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let user = create_test_user(&db, TEST_USERNAME).await?;
        let default = find_default_category(&db, &settings, user.id).await?.unwrap();
        let now = Utc::now();

        let first =
            create_transaction(&db, &settings, TEST_USERNAME, None, 12.0, "Coffee", now).await?;
        let second =
            create_transaction(&db, &settings, TEST_USERNAME, Some(0), 8.0, "Snack", now).await?;
        assert_eq!(first.category_id, default.id);
        assert_eq!(second.category_id, default.id);

        let (spent_amount, remaining) =
            spent(&db, user.id, default.id, BudgetPeriod::current()).await?;
        assert_eq!(spent_amount, 20.0);
        assert_eq!(remaining, -20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_without_default_category_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = test_settings();
        let user = create_test_user(&db, TEST_USERNAME).await?;
        let default = find_default_category(&db, &settings, user.id).await?.unwrap();
        category::Entity::delete_by_id(default.id).exec(&db).await?;

        let result =
            create_transaction(&db, &settings, TEST_USERNAME, None, 5.0, "", Utc::now()).await;
        assert!(matches!(
            result,
            Err(Error::DefaultCategoryMissing { user_id }) if user_id == user.id
        ));
        assert!(Transaction::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_without_budget_keeps_transaction() -> Result<()> {
        let (db, _user, category) = setup_with_category("Travel").await?;
        let settings = test_settings();

        let result = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(category.id),
            300.0,
            "Flights",
            test_date(2023, 5, 1),
        )
        .await;
        assert!(matches!(result, Err(Error::BudgetNotFound { .. })));

        // The row was written before reconciliation failed
        let stored = Transaction::find().all(&db).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount, 300.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_are_owner_scoped() -> Result<()> {
        let (db, user, category) = setup_with_category("Groceries").await?;
        let settings = test_settings();
        create_test_user(&db, "mallory").await?;
        let period = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(category.id), 100.0, period)
            .await?;
        let date = test_date(2024, 9, 3);

        let foreign_category =
            create_transaction(&db, &settings, "mallory", Some(category.id), 5.0, "", date).await;
        assert!(matches!(foreign_category, Err(Error::Unauthorized { .. })));

        let txn =
            create_transaction(&db, &settings, TEST_USERNAME, Some(category.id), 5.0, "", date)
                .await?;

        assert!(matches!(
            get_transaction(&db, "mallory", txn.id).await,
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            update_transaction(&db, "mallory", txn.id, 1.0, category.id, "", date).await,
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            delete_transaction(&db, "mallory", txn.id).await,
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            delete_transaction(&db, TEST_USERNAME, 999).await,
            Err(Error::TransactionNotFound { id: 999 })
        ));

        assert_eq!(spent(&db, user.id, category.id, period).await?, (5.0, 95.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let fun = create_category(&db, TEST_USERNAME, "Fun", "").await?;
        let period = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, period).await?;
        create_test_budget(&db, user.id, BudgetScope::Category(fun.id), 500.0, period).await?;

        let early = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            10.0,
            "early",
            test_date(2024, 9, 1),
        )
        .await?;
        let late = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            20.0,
            "late",
            test_date(2024, 9, 20),
        )
        .await?;
        let other = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(fun.id),
            30.0,
            "other",
            test_date(2024, 9, 10),
        )
        .await?;

        let all: Vec<i64> = list_transactions(&db, TEST_USERNAME)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(all, vec![late.id, other.id, early.id]);

        let food_only: Vec<i64> = list_transactions_for_category(&db, TEST_USERNAME, food.id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(food_only, vec![late.id, early.id]);

        let fetched = get_transaction(&db, TEST_USERNAME, other.id).await?;
        assert_eq!(fetched.description, "other");
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_with_category_name() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let period = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, period).await?;
        let txn = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            10.0,
            "Lunch",
            test_date(2024, 9, 1),
        )
        .await?;

        let response = transaction_with_category(&db, txn.clone()).await?;
        assert_eq!(response.category_name, "Food");
        assert_eq!(response.amount, 10.0);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["category_name"], "Food");
        assert!(json["transaction_date"].as_str().unwrap().starts_with("2024-09-01"));
        Ok(())
    }

    #[test]
    fn test_parse_transaction_date() {
        let full = parse_transaction_date("2024-09-15T10:30:00Z").unwrap();
        assert_eq!(full, test_date_time(2024, 9, 15, 10, 30));

        let offset = parse_transaction_date("2024-09-01T01:00:00+02:00").unwrap();
        assert_eq!(BudgetPeriod::from_date(&offset).month_key(), "08");

        let bare = parse_transaction_date("2024-02-29").unwrap();
        assert_eq!(bare, test_date_time(2024, 2, 29, 0, 0));

        for bad in ["", "yesterday", "2024-13-01", "2023-02-29"] {
            assert!(matches!(
                parse_transaction_date(bad),
                Err(Error::Validation { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_category_move_keeps_first_leg_when_second_fails() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let fun = create_category(&db, TEST_USERNAME, "Fun", "").await?;
        let august = BudgetPeriod::new(8, 2024)?;
        let september = BudgetPeriod::new(9, 2024)?;
        create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, august).await?;
        // Nothing for Fun in September

        let txn = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            40.0,
            "Cinema",
            test_date(2024, 8, 20),
        )
        .await?;
        assert_eq!(spent(&db, user.id, food.id, august).await?, (40.0, 460.0));

        let result = update_transaction(
            &db,
            TEST_USERNAME,
            txn.id,
            60.0,
            fun.id,
            "Concert",
            test_date(2024, 9, 2),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::BudgetNotFound { scope, period, .. })
                if scope == BudgetScope::Category(fun.id) && period == september
        ));

        // The removal from the old budget stays applied
        assert_eq!(spent(&db, user.id, food.id, august).await?, (0.0, 500.0));
        assert!(
            find_budget(&db, user.id, BudgetScope::Category(fun.id), september)
                .await?
                .is_none()
        );

        // The transaction row already carries the new values
        let stored = Transaction::find_by_id(txn.id).one(&db).await?.unwrap();
        assert_eq!(stored.category_id, fun.id);
        assert_eq!(stored.amount, 60.0);
        assert_eq!(stored.description, "Concert");
        assert_eq!(stored.transaction_date, test_date(2024, 9, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_without_budget_still_removes_row() -> Result<()> {
        let (db, user, food) = setup_with_category("Food").await?;
        let settings = test_settings();
        let period = BudgetPeriod::new(9, 2024)?;
        let budget =
            create_test_budget(&db, user.id, BudgetScope::Category(food.id), 500.0, period).await?;
        let txn = create_transaction(
            &db,
            &settings,
            TEST_USERNAME,
            Some(food.id),
            25.0,
            "",
            test_date(2024, 9, 10),
        )
        .await?;

        Budget::delete_by_id(budget.id).exec(&db).await?;

        let result = delete_transaction(&db, TEST_USERNAME, txn.id).await;
        assert!(matches!(
            result,
            Err(Error::BudgetNotFound { user_id, period: p, .. })
                if user_id == user.id && p == period
        ));
        assert!(Transaction::find_by_id(txn.id).one(&db).await?.is_none());
        assert!(
            find_budget(&db, user.id, BudgetScope::Category(food.id), period)
                .await?
                .is_none()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_padded_default_name_still_resolves() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config("[defaults]\ncategory_name = \" Misc \"\n")?;
        let user = sign_up(&db, &config.defaults, "alice", "alice@example.com", "hash").await?;

        let txn =
            create_transaction(&db, &config.defaults, "alice", None, 5.0, "", Utc::now()).await?;
        let misc = find_default_category(&db, &config.defaults, user.id).await?.unwrap();
        assert_eq!(misc.name, "Misc");
        assert_eq!(txn.category_id, misc.id);

        // Settings built in code with padding resolve the same row
        let padded = Settings {
            category_name: " Misc ".to_string(),
            ..config.defaults.clone()
        };
        let again = create_transaction(&db, &padded, "alice", None, 7.0, "", Utc::now()).await?;
        assert_eq!(again.category_id, misc.id);
        assert_eq!(
            spent(&db, user.id, misc.id, BudgetPeriod::current()).await?,
            (12.0, -12.0)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_list_for_category_checks_owner() -> Result<()> {
        let (db, _user, food) = setup_with_category("Food").await?;
        create_test_user(&db, "mallory").await?;

        let foreign = list_transactions_for_category(&db, "mallory", food.id).await;
        assert!(matches!(foreign, Err(Error::Unauthorized { .. })));

        let unknown = list_transactions_for_category(&db, TEST_USERNAME, 999).await;
        assert!(matches!(unknown, Err(Error::CategoryNotFound { id: 999 })));

        assert!(list_transactions_for_category(&db, TEST_USERNAME, food.id).await?.is_empty());
        Ok(())
    }
}
