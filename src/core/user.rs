//! User registration and lookup.
//!
//! Signing up persists the user, then bootstraps the default category and a zero-limit budget
//! for the current month. The steps are independent writes: if bootstrap fails the user row
//! stays and the signup reports the error.

use crate::{
    config::settings::Settings,
    core::{
        budget, category,
        period::{BudgetPeriod, BudgetScope},
    },
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, info};

/// Finds a user by login name.
pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by email address.
pub async fn find_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn find_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Resolves the caller's username, failing with `UserNotFound` when it is unknown.
pub async fn require_user<C>(db: &C, username: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    find_by_username(db, username)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: username.to_string(),
        })
}

/// Registers a new user and runs the signup bootstrap.
///
/// Username and email must be non-empty and not already taken.
pub async fn sign_up(
    db: &DatabaseConnection,
    settings: &Settings,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<user::Model> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }
    if email.is_empty() {
        return Err(Error::Validation {
            message: "Email cannot be empty".to_string(),
        });
    }
    if find_by_username(db, username).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Username '{username}' is already taken"),
        });
    }
    if find_by_email(db, email).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Email '{email}' is already registered"),
        });
    }

    let now = Utc::now();
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(user_id = user.id, "Registered user '{}'", user.username);

    bootstrap_user(db, settings, &user).await?;
    Ok(user)
}

/// Creates the default category and its zero-limit budget for the current month.
pub async fn bootstrap_user<C>(db: &C, settings: &Settings, user: &user::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    bootstrap_user_at(db, settings, user, BudgetPeriod::current()).await
}

/// Same as [`bootstrap_user`] for an explicit month.
pub async fn bootstrap_user_at<C>(
    db: &C,
    settings: &Settings,
    user: &user::Model,
    period: BudgetPeriod,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let default_category = category::insert_category(
        db,
        user.id,
        &settings.category_name,
        &settings.category_description,
    )
    .await?;

    budget::insert_budget(
        db,
        user.id,
        BudgetScope::Category(default_category.id),
        0.0,
        period,
    )
    .await?;

    debug!(
        user_id = user.id,
        category_id = default_category.id,
        "Bootstrapped default category and budget for {}",
        period
    );
    Ok(())
}

/// Replaces the stored password hash.
pub async fn update_password_hash<C>(db: &C, user_id: i64, password_hash: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = find_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            username: user_id.to_string(),
        })?;

    let mut active_model: user::ActiveModel = user.into();
    active_model.password_hash = Set(password_hash.to_string());
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}
