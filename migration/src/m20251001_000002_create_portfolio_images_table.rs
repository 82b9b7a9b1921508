use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `portfolio_images` table and its columns.
#[derive(DeriveIden)]
enum PortfolioImages {
    Table,
    Id,
    Url,
    StorageKey,
    Category,
    IsLandingPage,
    Order,
    UploadedAt,
}

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
                    .table(PortfolioImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PortfolioImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PortfolioImages::Url).text().not_null())
                    .col(
                        ColumnDef::new(PortfolioImages::StorageKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PortfolioImages::Category)
                            .string()
                            .not_null()
                            .check(Expr::col(PortfolioImages::Category).is_in(CATEGORIES)),
                    )
                    .col(
                        ColumnDef::new(PortfolioImages::IsLandingPage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PortfolioImages::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PortfolioImages::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One binding per external asset.
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_images_storage_key")
                    .table(PortfolioImages::Table)
                    .col(PortfolioImages::StorageKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Listing a category in display order.
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_images_category_order")
                    .table(PortfolioImages::Table)
                    .col(PortfolioImages::Category)
                    .col(PortfolioImages::Order)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_images_is_landing_page")
                    .table(PortfolioImages::Table)
                    .col(PortfolioImages::IsLandingPage)
                    .to_owned(),
            )
            .await?;

        // At most one landing image per category. Partial indexes are supported
        // by both Postgres and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_portfolio_images_one_landing_per_category \
                 ON portfolio_images (category) WHERE is_landing_page = TRUE",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_portfolio_images_one_landing_per_category")
            .await?;

        manager
            .drop_table(Table::drop().table(PortfolioImages::Table).to_owned())
            .await
    }
}
