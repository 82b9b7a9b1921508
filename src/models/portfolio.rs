use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of images a single category may hold.
pub const MAX_IMAGES_PER_CATEGORY: u64 = 20;

/// SeaORM entity for the `portfolio_images` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio_images")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    #[sea_orm(unique)]
    pub storage_key: String,
    pub category: Category,
    pub is_landing_page: bool,
    pub order: i32,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The fixed set of service categories a portfolio image can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[sea_orm(string_value = "wedding")]
    Wedding,
    #[sea_orm(string_value = "pre-wedding")]
    PreWedding,
    #[sea_orm(string_value = "events")]
    Events,
    #[sea_orm(string_value = "portraits")]
    Portraits,
    #[sea_orm(string_value = "cinematic")]
    Cinematic,
    #[sea_orm(string_value = "corporate")]
    Corporate,
    #[sea_orm(string_value = "maternity")]
    Maternity,
    #[sea_orm(string_value = "baby")]
    Baby,
}

impl Category {
    /// Every category, in the order the site presents them.
    pub const ALL: [Category; 8] = [
        Category::Wedding,
        Category::PreWedding,
        Category::Events,
        Category::Portraits,
        Category::Cinematic,
        Category::Corporate,
        Category::Maternity,
        Category::Baby,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wedding => "wedding",
            Category::PreWedding => "pre-wedding",
            Category::Events => "events",
            Category::Portraits => "portraits",
            Category::Cinematic => "cinematic",
            Category::Corporate => "corporate",
            Category::Maternity => "maternity",
            Category::Baby => "baby",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Wedding => "Wedding",
            Category::PreWedding => "Pre-Wedding",
            Category::Events => "Events",
            Category::Portraits => "Portraits",
            Category::Cinematic => "Cinematic",
            Category::Corporate => "Corporate",
            Category::Maternity => "Maternity",
            Category::Baby => "Baby Shoot",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Category::Wedding => "Intimate Ceremonies",
            Category::PreWedding => "Love Stories",
            Category::Events => "Celebrations",
            Category::Portraits => "Professional",
            Category::Cinematic => "Video Production",
            Category::Corporate => "Events & Conferences",
            Category::Maternity => "Pregnancy Journey",
            Category::Baby => "Newborn Memories",
        }
    }

    /// Image-store folder for this category, e.g. `jjclicks/wedding`.
    pub fn folder(&self, prefix: &str) -> String {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{prefix}/{}", self.as_str())
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ── DTOs ──

/// Filter for listing images. `landing_only` restricts to landing images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageFilter {
    pub category: Option<Category>,
    pub landing_only: bool,
}

/// Raw query string for `GET /api/portfolio`. The category is kept as a string
/// so an unknown label can be reported as a validation error; `landingOnly`
/// is only on for the literal `"true"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListQuery {
    pub category: Option<String>,
    pub landing_only: Option<String>,
}

/// An image upload as received from the admin dashboard.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub payload: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub category: Category,
    pub is_landing_page: bool,
}

/// Fields of a new `portfolio_images` row once the image store has accepted it.
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub url: String,
    pub storage_key: String,
    pub category: Category,
    pub is_landing_page: bool,
    pub order: i32,
}

/// Partial update for `PATCH /api/portfolio/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioImage {
    pub is_landing_page: Option<bool>,
    pub order: Option<i32>,
}

impl UpdatePortfolioImage {
    pub fn is_empty(&self) -> bool {
        self.is_landing_page.is_none() && self.order.is_none()
    }
}

/// Per-category overview used by the gallery landing view and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Category,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub count: u64,
    pub capacity: u64,
    pub landing_image_url: Option<String>,
}
