//! Core business logic - framework-agnostic budget, category, transaction and user operations.
//!
//! Transport concerns (HTTP routing, token issuance, password hashing) live outside this crate;
//! callers hand in an already-authenticated username.

pub mod aggregate;
pub mod budget;
pub mod category;
pub mod period;
pub mod reconcile;
pub mod reset_token;
pub mod seed;
pub mod transaction;
pub mod user;
