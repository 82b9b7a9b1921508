use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, warn};

use crate::db::portfolio as portfolio_db;
use crate::models::categories;
use crate::models::portfolio::{Category, MAX_IMAGES_PER_CATEGORY};

/// Atomically take one of the category's slots.
///
/// The conditional increment is the authoritative capacity check: it returns
/// `false` when the category is full, and the row lock it takes serializes
/// concurrent writers of the same category until their transaction ends.
pub async fn reserve_slot<C: ConnectionTrait>(db: &C, category: Category) -> Result<bool, DbErr> {
    let result = categories::Entity::update_many()
        .col_expr(categories::Column::ImageCount, Expr::cust("image_count + 1"))
        .filter(categories::Column::Slug.eq(category.as_str()))
        .filter(categories::Column::ImageCount.lt(MAX_IMAGES_PER_CATEGORY as i32))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Give a slot back after an image was deleted.
pub async fn release_slot<C: ConnectionTrait>(db: &C, category: Category) -> Result<(), DbErr> {
    categories::Entity::update_many()
        .col_expr(categories::Column::ImageCount, Expr::cust("image_count - 1"))
        .filter(categories::Column::Slug.eq(category.as_str()))
        .filter(categories::Column::ImageCount.gt(0))
        .exec(db)
        .await?;

    Ok(())
}

/// Lock the category's counter row for the rest of the transaction without
/// changing it.
pub async fn lock_category<C: ConnectionTrait>(db: &C, category: Category) -> Result<(), DbErr> {
    categories::Entity::update_many()
        .col_expr(categories::Column::ImageCount, Expr::cust("image_count"))
        .filter(categories::Column::Slug.eq(category.as_str()))
        .exec(db)
        .await?;

    Ok(())
}

/// Fetch the stored counter for a category.
pub async fn get_counter<C: ConnectionTrait>(
    db: &C,
    category: Category,
) -> Result<Option<i32>, DbErr> {
    Ok(categories::Entity::find_by_id(category.as_str().to_string())
        .one(db)
        .await?
        .map(|row| row.image_count))
}

/// Make sure every category has a counter row and that it matches the number
/// of images actually stored. The migration seeds the rows; this repairs drift
/// and is run at startup.
pub async fn sync_counters(db: &DatabaseConnection) -> Result<(), DbErr> {
    for category in Category::ALL {
        let actual = portfolio_db::count_in_category(db, category).await?;
        if actual > MAX_IMAGES_PER_CATEGORY {
            warn!(%category, actual, "category holds more images than allowed");
        }
        let count = std::cmp::Ord::min(actual, MAX_IMAGES_PER_CATEGORY) as i32;

        match categories::Entity::find_by_id(category.as_str().to_string())
            .one(db)
            .await?
        {
            Some(row) if row.image_count == count => {}
            Some(row) => {
                warn!(%category, stored = row.image_count, actual = count, "repairing category counter");
                let mut active: categories::ActiveModel = row.into();
                active.image_count = Set(count);
                active.update(db).await?;
            }
            None => {
                categories::ActiveModel {
                    slug: Set(category.as_str().to_string()),
                    image_count: Set(count),
                }
                .insert(db)
                .await?;
            }
        }
    }

    info!("category counters in sync");
    Ok(())
}
