//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are generated
//! from the entity definitions with `Schema::create_table_from_entity`, so the schema always
//! matches the Rust structs. Creation is idempotent so the binary can run against an existing file.

use crate::entities::{Budget, Category, PasswordResetToken, Transaction, User, budget, category};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://pennywise.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not already exist.
///
/// Budgets get a unique index on `(user_id, category_id, budget_month, budget_year)`. SQLite
/// treats NULLs as distinct, so overall budgets (NULL category) are only kept unique by the
/// check in `core::budget::insert_budget`.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Budget),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(PasswordResetToken),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    let budget_key = Index::create()
        .name("idx_budgets_user_category_month")
        .table(Budget)
        .col(budget::Column::UserId)
        .col(budget::Column::CategoryId)
        .col(budget::Column::BudgetMonth)
        .col(budget::Column::BudgetYear)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&budget_key)).await?;

    let category_name = Index::create()
        .name("idx_categories_user_name")
        .table(Category)
        .col(category::Column::UserId)
        .col(category::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&category_name)).await?;

    info!("Database tables ensured.");
    Ok(())
}
