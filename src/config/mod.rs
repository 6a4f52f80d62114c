/// Database connection and table creation
pub mod database;

/// Application settings and seed data loaded from pennywise.toml
pub mod settings;
