//! Password reset tokens, stored in a table with an explicit expiry.
//!
//! A token is a random string tied to an account email. It is valid until `expires_at`,
//! consumed (deleted) by a successful reset, and expired rows are removed by
//! [`purge_expired_tokens`].

use crate::{
    config::settings::Settings,
    core::user::{find_by_email, update_password_hash},
    entities::{PasswordResetToken, password_reset_token},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::*};
use tracing::info;
use uuid::Uuid;

/// Issues a reset token for the account registered under `email`.
pub async fn request_password_reset(
    db: &DatabaseConnection,
    settings: &Settings,
    email: &str,
) -> Result<String> {
    let user = find_by_email(db, email)
        .await?
        .ok_or_else(|| Error::EmailNotFound {
            email: email.to_string(),
        })?;

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(settings.reset_token_ttl()?)
        .ok_or_else(|| Error::Config {
            message: format!(
                "reset token lifetime of {} minutes overflows the clock",
                settings.reset_token_ttl_minutes
            ),
        })?;
    let token = Uuid::new_v4().simple().to_string();
    password_reset_token::ActiveModel {
        token: Set(token.clone()),
        user_email: Set(user.email),
        expires_at: Set(expires_at),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(user_id = user.id, "Issued password reset token");
    Ok(token)
}

/// Returns the token row if it exists and has not expired at `now`.
pub async fn validate_reset_token<C>(
    db: &C,
    token: &str,
    now: DateTime<Utc>,
) -> Result<password_reset_token::Model>
where
    C: ConnectionTrait,
{
    PasswordResetToken::find_by_id(token.to_string())
        .one(db)
        .await?
        .filter(|row| now <= row.expires_at)
        .ok_or(Error::ResetTokenInvalid)
}

/// Removes a token so it cannot be used again.
pub async fn invalidate_reset_token<C>(db: &C, token: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    PasswordResetToken::delete_by_id(token.to_string())
        .exec(db)
        .await?;
    Ok(())
}

/// Sets a new password hash for the token's account and consumes the token.
pub async fn reset_password(
    db: &DatabaseConnection,
    token: &str,
    new_password_hash: &str,
) -> Result<()> {
    let reset_token = validate_reset_token(db, token, Utc::now()).await?;
    let user = find_by_email(db, &reset_token.user_email)
        .await?
        .ok_or_else(|| Error::EmailNotFound {
            email: reset_token.user_email.clone(),
        })?;

    update_password_hash(db, user.id, new_password_hash).await?;
    invalidate_reset_token(db, token).await?;

    info!(user_id = user.id, "Password reset completed");
    Ok(())
}

/// Deletes every token that expired before `now`, returning how many were removed.
pub async fn purge_expired_tokens<C>(db: &C, now: DateTime<Utc>) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = PasswordResetToken::delete_many()
        .filter(password_reset_token::Column::ExpiresAt.lt(now))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!("Purged {} expired password reset tokens", result.rows_affected);
    }
    Ok(result.rows_affected)
}
