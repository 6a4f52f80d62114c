//! Startup seeding of users, categories and current-month budgets from configuration.
//!
//! Seeding is additive: existing users, categories and budget rows are left as they are, so
//! running it on every start is safe.

use crate::{
    config::settings::{AppConfig, SeedUser},
    core::{
        budget::{find_budget, insert_budget},
        category::{find_category_by_name, insert_category},
        period::{BudgetPeriod, BudgetScope},
        user::{find_by_username, sign_up},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

/// Counts of what a seeding pass created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub categories_created: usize,
    pub budgets_created: usize,
}

/// Seeds every configured user for the current month.
pub async fn seed_users(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    seed_users_at(db, config, BudgetPeriod::current()).await
}

/// Seeds every configured user, creating budgets for `period`.
pub async fn seed_users_at(
    db: &DatabaseConnection,
    config: &AppConfig,
    period: BudgetPeriod,
) -> Result<SeedReport> {
    info!(
        "Starting to seed users. Found {} configurations.",
        config.users.len()
    );
    let mut report = SeedReport::default();

    for seed in &config.users {
        seed_user(db, config, seed, period, &mut report).await?;
    }

    info!(
        users = report.users_created,
        categories = report.categories_created,
        budgets = report.budgets_created,
        "Seeding finished"
    );
    Ok(report)
}

async fn seed_user(
    db: &DatabaseConnection,
    config: &AppConfig,
    seed: &SeedUser,
    period: BudgetPeriod,
    report: &mut SeedReport,
) -> Result<()> {
    let user = if let Some(existing) = find_by_username(db, &seed.username).await? {
        debug!("User '{}' already exists. Skipping signup.", seed.username);
        existing
    } else {
        report.users_created += 1;
        sign_up(
            db,
            &config.defaults,
            &seed.username,
            &seed.email,
            &seed.password_hash,
        )
        .await?
    };

    for seed_category in &seed.categories {
        let category = if let Some(existing) =
            find_category_by_name(db, user.id, seed_category.name.trim()).await?
        {
            existing
        } else {
            report.categories_created += 1;
            insert_category(db, user.id, &seed_category.name, &seed_category.description).await?
        };

        let scope = BudgetScope::Category(category.id);
        if find_budget(db, user.id, scope, period).await?.is_none() {
            insert_budget(db, user.id, scope, seed_category.amount_limit, period).await?;
            report.budgets_created += 1;
        }
    }

    Ok(())
}
