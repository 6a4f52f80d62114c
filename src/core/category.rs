//! Category business logic - named spending buckets scoped to one user.
//!
//! Every lookup made on behalf of a user checks ownership; touching another user's category
//! fails with `Unauthorized`. Deleting a category does not cascade to its budgets or
//! transactions.

use crate::{
    config::settings::Settings,
    core::user::require_user,
    entities::{Category, category},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Finds a user's category by exact name.
pub async fn find_category_by_name<C>(
    db: &C,
    user_id: i64,
    name: &str,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the user's default category, the fallback for uncategorized transactions.
pub async fn find_default_category<C>(
    db: &C,
    settings: &Settings,
    user_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    find_category_by_name(db, user_id, settings.category_name.trim()).await
}

/// Loads a category and checks that `user_id` owns it.
pub async fn require_owned_category<C>(db: &C, user_id: i64, id: i64) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let category = Category::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id })?;

    if category.user_id != user_id {
        return Err(Error::Unauthorized {
            message: format!("category {id} does not belong to the user"),
        });
    }

    Ok(category)
}

/// Inserts a category for a known user id. Names must be non-empty and unique per user.
pub async fn insert_category<C>(
    db: &C,
    user_id: i64,
    name: &str,
    description: &str,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }
    if find_category_by_name(db, user_id, name).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Category '{name}' already exists"),
        });
    }

    let now = Utc::now();
    let category = category::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id, category_id = category.id, "Created category '{}'", category.name);
    Ok(category)
}

/// Creates a category owned by `username`.
pub async fn create_category(
    db: &DatabaseConnection,
    username: &str,
    name: &str,
    description: &str,
) -> Result<category::Model> {
    let user = require_user(db, username).await?;
    insert_category(db, user.id, name, description).await
}

pub async fn get_category(
    db: &DatabaseConnection,
    username: &str,
    id: i64,
) -> Result<category::Model> {
    let user = require_user(db, username).await?;
    require_owned_category(db, user.id, id).await
}

/// Lists all of a user's categories, ordered alphabetically by name.
pub async fn list_categories(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Vec<category::Model>> {
    let user = require_user(db, username).await?;
    Category::find()
        .filter(category::Column::UserId.eq(user.id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

fn is_default_category(settings: &Settings, category: &category::Model) -> bool {
    category.name == settings.category_name.trim()
}

/// Renames or re-describes a category the caller owns.
///
/// The default category keeps its name; only its description can change.
pub async fn update_category(
    db: &DatabaseConnection,
    settings: &Settings,
    username: &str,
    id: i64,
    name: &str,
    description: &str,
) -> Result<category::Model> {
    let user = require_user(db, username).await?;
    let category = require_owned_category(db, user.id, id).await?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }
    if is_default_category(settings, &category) && name != category.name {
        return Err(Error::Validation {
            message: format!("The default category '{}' cannot be renamed", category.name),
        });
    }
    if find_category_by_name(db, user.id, name)
        .await?
        .is_some_and(|existing| existing.id != id)
    {
        return Err(Error::Validation {
            message: format!("Category '{name}' already exists"),
        });
    }

    let mut active_model: category::ActiveModel = category.into();
    active_model.name = Set(name.to_string());
    active_model.description = Set(description.to_string());
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a category the caller owns. The default category cannot be deleted.
pub async fn delete_category(
    db: &DatabaseConnection,
    settings: &Settings,
    username: &str,
    id: i64,
) -> Result<()> {
    let user = require_user(db, username).await?;
    let category = require_owned_category(db, user.id, id).await?;
    if is_default_category(settings, &category) {
        return Err(Error::Validation {
            message: format!("The default category '{}' cannot be deleted", category.name),
        });
    }
    category.delete(db).await?;
    info!(user_id = user.id, category_id = id, "Deleted category");
    Ok(())
}
