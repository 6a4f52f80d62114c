//! Password reset token entity - short-lived tokens keyed by the token string itself.
//! Rows past `expires_at` are rejected on use and removed by the purge sweep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Password reset token database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_tokens")]
pub struct Model {
    /// Random token handed to the user
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    /// Email of the account the token resets
    pub user_email: String,
    /// Token is invalid after this instant
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

/// `PasswordResetToken` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
