use chrono::Utc;
use dotenvy::dotenv;
use pennywise::{
    config::{database, settings},
    core::{aggregate, reset_token, seed},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed configured users and their current-month budgets
    seed::seed_users(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed users: {}", e))?;

    // 6. Housekeeping
    reset_token::purge_expired_tokens(&db, Utc::now()).await?;

    for seed_user in &app_config.users {
        match aggregate::calculate_overall_budget(&db, &seed_user.username).await {
            Ok(overall) => info!(
                user = %seed_user.username,
                limit = overall.amount_limit_total,
                spent = overall.spent_total,
                remaining = overall.remaining_total,
                uncategorized = overall.uncategorized_total,
                "Overall budget for {}-{}",
                overall.year,
                overall.month
            ),
            Err(e) => warn!("Could not summarize budget for {}: {}", seed_user.username, e),
        }
    }

    Ok(())
}
