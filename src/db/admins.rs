use sea_orm::*;
use uuid::Uuid;

use crate::models::admins;

/// Insert a new admin with an already-hashed password.
pub async fn insert_admin(
    db: &DatabaseConnection,
    email: String,
    name: String,
    password_hash: String,
) -> Result<admins::Model, DbErr> {
    let new_admin = admins::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(name),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
    };

    new_admin.insert(db).await
}

/// Fetch a single admin by ID.
pub async fn get_admin_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<admins::Model>, DbErr> {
    admins::Entity::find_by_id(id).one(db).await
}

/// Fetch an admin by (normalised) email.
pub async fn get_admin_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<admins::Model>, DbErr> {
    admins::Entity::find()
        .filter(admins::Column::Email.eq(email))
        .one(db)
        .await
}
