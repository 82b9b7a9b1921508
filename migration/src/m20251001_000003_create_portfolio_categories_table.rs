use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Per-category slot counters, one row per category.
#[derive(DeriveIden)]
enum PortfolioCategories {
    Table,
    Slug,
    ImageCount,
}

const MAX_IMAGES_PER_CATEGORY: i32 = 20;

const CATEGORIES: [&str; 8] = [
    "wedding",
    "pre-wedding",
    "events",
    "portraits",
    "cinematic",
    "corporate",
    "maternity",
    "baby",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PortfolioCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortfolioCategories::Slug)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PortfolioCategories::ImageCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(
                                Expr::col(PortfolioCategories::ImageCount)
                                    .between(0, MAX_IMAGES_PER_CATEGORY),
                            ),
                    )
                    .to_owned(),
            )
            .await?;

        // Empty categories start with a free counter.
        let mut seed = Query::insert()
            .into_table(PortfolioCategories::Table)
            .columns([PortfolioCategories::Slug, PortfolioCategories::ImageCount])
            .on_conflict(
                OnConflict::column(PortfolioCategories::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        for slug in CATEGORIES {
            seed.values([slug.into(), 0i32.into()])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PortfolioCategories::Table).to_owned())
            .await
    }
}
