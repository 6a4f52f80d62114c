//! Unified error type for the budget core.
//!
//! Every fallible operation returns [`Result`]. Lookups that miss surface as one of the
//! `*NotFound` variants; ownership mismatches as [`Error::Unauthorized`]; malformed input
//! as [`Error::Validation`], [`Error::InvalidAmount`] or [`Error::InvalidMonth`].

use crate::core::period::{BudgetPeriod, BudgetScope};
use thiserror::Error;

/// Errors produced by the budget core and its storage layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reported by the storage client
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Malformed input caught before any storage call
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Amount was NaN, infinite, or otherwise unusable
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Month could not be normalised to a `01`..`12` key
    #[error("Invalid month: {month}")]
    InvalidMonth {
        /// The rejected month text
        month: String,
    },

    #[error("User not found: {username}")]
    UserNotFound {
        /// Username that was looked up
        username: String,
    },

    #[error("No user registered with email: {email}")]
    EmailNotFound {
        /// Email that was looked up
        email: String,
    },

    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Category id that was looked up
        id: i64,
    },

    /// The user's default category is gone, so bootstrap did not run or was undone
    #[error("Default category not found for user {user_id}")]
    DefaultCategoryMissing {
        /// Owner whose default category is missing
        user_id: i64,
    },

    #[error("Budget not found for user {user_id} ({scope}, {period})")]
    BudgetNotFound {
        /// Budget owner
        user_id: i64,
        /// Overall or per-category
        scope: BudgetScope,
        /// Month the lookup targeted
        period: BudgetPeriod,
    },

    #[error("Budget not found: {id}")]
    BudgetNotFoundById {
        /// Budget id that was looked up
        id: i64,
    },

    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Transaction id that was looked up
        id: i64,
    },

    /// Record belongs to a different user than the caller
    #[error("Access denied: {message}")]
    Unauthorized {
        /// Which record was refused
        message: String,
    },

    #[error("Invalid or expired password reset token")]
    ResetTokenInvalid,
}

impl Error {
    /// Returns true for any of the lookup-miss variants.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::EmailNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::BudgetNotFound { .. }
                | Self::BudgetNotFoundById { .. }
                | Self::TransactionNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
