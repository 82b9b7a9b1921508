use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::portfolio::{
    self, Category, ImageFilter, NewImageRecord, UpdatePortfolioImage,
};

/// Fetch images matching the filter, ordered by `order` ascending and newest
/// upload first among equal orders.
pub async fn find_images<C: ConnectionTrait>(
    db: &C,
    filter: ImageFilter,
) -> Result<Vec<portfolio::Model>, DbErr> {
    let mut query = portfolio::Entity::find();

    if let Some(category) = filter.category {
        query = query.filter(portfolio::Column::Category.eq(category));
    }
    if filter.landing_only {
        query = query.filter(portfolio::Column::IsLandingPage.eq(true));
    }

    query
        .order_by_asc(portfolio::Column::Order)
        .order_by_desc(portfolio::Column::UploadedAt)
        .all(db)
        .await
}

/// Fetch a single image by ID.
pub async fn get_image_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<portfolio::Model>, DbErr> {
    portfolio::Entity::find_by_id(id).one(db).await
}

/// Count the images stored in a category.
pub async fn count_in_category<C: ConnectionTrait>(
    db: &C,
    category: Category,
) -> Result<u64, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::Category.eq(category))
        .count(db)
        .await
}

/// Highest `order` in a category, or `None` when the category is empty.
pub async fn max_order_in_category<C: ConnectionTrait>(
    db: &C,
    category: Category,
) -> Result<Option<i32>, DbErr> {
    let last = portfolio::Entity::find()
        .filter(portfolio::Column::Category.eq(category))
        .order_by_desc(portfolio::Column::Order)
        .one(db)
        .await?;

    Ok(last.map(|image| image.order))
}

/// Find the record bound to an external asset, if any.
pub async fn get_image_by_storage_key<C: ConnectionTrait>(
    db: &C,
    storage_key: &str,
) -> Result<Option<portfolio::Model>, DbErr> {
    portfolio::Entity::find()
        .filter(portfolio::Column::StorageKey.eq(storage_key))
        .one(db)
        .await
}

/// Clear the landing flag on every image of a category, optionally sparing one.
pub async fn clear_landing_in_category<C: ConnectionTrait>(
    db: &C,
    category: Category,
    except: Option<Uuid>,
) -> Result<u64, DbErr> {
    let mut update = portfolio::Entity::update_many()
        .col_expr(portfolio::Column::IsLandingPage, Expr::value(false))
        .filter(portfolio::Column::Category.eq(category))
        .filter(portfolio::Column::IsLandingPage.eq(true));

    if let Some(id) = except {
        update = update.filter(portfolio::Column::Id.ne(id));
    }

    let result = update.exec(db).await?;
    Ok(result.rows_affected)
}

/// Insert a new image row.
pub async fn insert_image<C: ConnectionTrait>(
    db: &C,
    input: NewImageRecord,
) -> Result<portfolio::Model, DbErr> {
    let new_image = portfolio::ActiveModel {
        id: Set(Uuid::new_v4()),
        url: Set(input.url),
        storage_key: Set(input.storage_key),
        category: Set(input.category),
        is_landing_page: Set(input.is_landing_page),
        order: Set(input.order),
        uploaded_at: Set(chrono::Utc::now()),
    };

    new_image.insert(db).await
}

/// Apply a partial update to an image that has already been loaded.
pub async fn update_image<C: ConnectionTrait>(
    db: &C,
    image: portfolio::Model,
    input: UpdatePortfolioImage,
) -> Result<portfolio::Model, DbErr> {
    let mut active: portfolio::ActiveModel = image.into();

    if let Some(is_landing_page) = input.is_landing_page {
        active.is_landing_page = Set(is_landing_page);
    }
    if let Some(order) = input.order {
        active.order = Set(order);
    }

    active.update(db).await
}

/// Delete an image row by ID.
pub async fn delete_image<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<DeleteResult, DbErr> {
    portfolio::Entity::delete_by_id(id).exec(db).await
}
