use sea_orm::entity::prelude::*;

/// SeaORM entity for the `portfolio_categories` slot-counter table.
///
/// `image_count` mirrors the number of rows in `portfolio_images` for the
/// category and is only changed inside the transactions that insert or
/// delete images.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "portfolio_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub image_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
