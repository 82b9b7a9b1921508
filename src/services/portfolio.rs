//! Portfolio curation.
//!
//! Owns the gallery invariants: at most [`MAX_IMAGES_PER_CATEGORY`] images per
//! category, at most one landing image per category, and append-only `order`
//! values for new uploads. Capacity and landing changes run inside a
//! transaction that holds the category's counter row, so concurrent writers
//! of one category are serialized.

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::categories as categories_db;
use crate::db::portfolio as portfolio_db;
use crate::errors::PortfolioError;
use crate::models::portfolio::{
    self, Category, CategorySummary, ImageFilter, MAX_IMAGES_PER_CATEGORY, NewImageRecord,
    NewUpload, UpdatePortfolioImage,
};
use crate::storage::{ImageStore, ImageUpload, StoredImage};

/// Limits and naming applied to uploads.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Image-store folder prefix; each category gets `<prefix>/<category>`.
    pub folder_prefix: String,
    pub max_upload_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            folder_prefix: "jjclicks".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct PortfolioService {
    db: DatabaseConnection,
    images: Arc<dyn ImageStore>,
    settings: UploadSettings,
}

impl PortfolioService {
    pub fn new(db: DatabaseConnection, images: Arc<dyn ImageStore>, settings: UploadSettings) -> Self {
        Self {
            db,
            images,
            settings,
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// List images matching the filter in display order.
    pub async fn list(&self, filter: ImageFilter) -> Result<Vec<portfolio::Model>, PortfolioError> {
        Ok(portfolio_db::find_images(&self.db, filter).await?)
    }

    /// Count, capacity and landing image of every category.
    pub async fn category_summaries(&self) -> Result<Vec<CategorySummary>, PortfolioError> {
        let images = portfolio_db::find_images(&self.db, ImageFilter::default()).await?;

        Ok(Category::ALL
            .into_iter()
            .map(|category| {
                let in_category = || images.iter().filter(move |i| i.category == category);
                CategorySummary {
                    category,
                    title: category.title(),
                    subtitle: category.subtitle(),
                    count: in_category().count() as u64,
                    capacity: MAX_IMAGES_PER_CATEGORY,
                    landing_image_url: in_category()
                        .find(|i| i.is_landing_page)
                        .map(|i| i.url.clone()),
                }
            })
            .collect())
    }

    /// Store a new image and record it at the end of its category.
    ///
    /// Nothing reaches the image store unless the payload is acceptable and
    /// the category has room. If recording fails after the store accepted the
    /// payload, the stored asset is deprovisioned again on a best-effort basis.
    pub async fn upload(&self, upload: NewUpload) -> Result<portfolio::Model, PortfolioError> {
        self.validate_upload(&upload)?;
        let category = upload.category;

        let count = portfolio_db::count_in_category(&self.db, category).await?;
        if count >= MAX_IMAGES_PER_CATEGORY {
            return Err(PortfolioError::CapacityExceeded {
                category,
                limit: MAX_IMAGES_PER_CATEGORY,
            });
        }

        let folder = category.folder(&self.settings.folder_prefix);
        let stored = self
            .images
            .store(ImageUpload {
                bytes: &upload.payload,
                file_name: upload.file_name.as_deref(),
                content_type: upload.content_type.as_deref(),
                folder: &folder,
            })
            .await?;

        match self
            .record_upload(category, upload.is_landing_page, &stored)
            .await
        {
            Ok(image) => {
                info!(
                    id = %image.id,
                    %category,
                    order = image.order,
                    landing = image.is_landing_page,
                    "portfolio image uploaded"
                );
                Ok(image)
            }
            Err(e) => {
                self.discard_stored(&stored, &e).await;
                Err(e)
            }
        }
    }

    async fn record_upload(
        &self,
        category: Category,
        is_landing_page: bool,
        stored: &StoredImage,
    ) -> Result<portfolio::Model, PortfolioError> {
        let txn = self.db.begin().await?;

        // Re-checks capacity under the category lock; a concurrent upload may
        // have taken the last slot since the pre-check.
        if !categories_db::reserve_slot(&txn, category).await? {
            let counter = categories_db::get_counter(&txn, category).await?;
            txn.rollback().await?;
            if counter.is_none() {
                return Err(PortfolioError::Database(DbErr::RecordNotFound(format!(
                    "no slot counter for category {category}"
                ))));
            }
            return Err(PortfolioError::CapacityExceeded {
                category,
                limit: MAX_IMAGES_PER_CATEGORY,
            });
        }

        if is_landing_page {
            portfolio_db::clear_landing_in_category(&txn, category, None).await?;
        }

        let order = match portfolio_db::max_order_in_category(&txn, category).await? {
            None => 0,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                PortfolioError::Validation(format!(
                    "No order value left after {max} in {category}; lower an existing order first"
                ))
            })?,
        };
        let image = portfolio_db::insert_image(
            &txn,
            NewImageRecord {
                url: stored.url.clone(),
                storage_key: stored.storage_key.clone(),
                category,
                is_landing_page,
                order,
            },
        )
        .await?;

        txn.commit().await?;
        Ok(image)
    }

    async fn discard_stored(&self, stored: &StoredImage, cause: &PortfolioError) {
        // The host may hand back a key that is already bound to a live record;
        // removing it would leave that record pointing at nothing.
        match portfolio_db::get_image_by_storage_key(&self.db, &stored.storage_key).await {
            Ok(Some(owner)) => {
                error!(
                    storage_key = %stored.storage_key,
                    owner = %owner.id,
                    error = %cause,
                    "upload not recorded; stored key belongs to an existing image, asset kept"
                );
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!(
                    storage_key = %stored.storage_key,
                    error = %cause,
                    lookup_error = %e,
                    "upload not recorded and key ownership unknown; asset kept"
                );
                return;
            }
        }

        match self.images.deprovision(&stored.storage_key).await {
            Ok(()) => warn!(
                storage_key = %stored.storage_key,
                error = %cause,
                "upload not recorded; stored asset removed again"
            ),
            Err(e) => error!(
                storage_key = %stored.storage_key,
                error = %cause,
                deprovision_error = %e,
                "upload not recorded and stored asset could not be removed; asset is orphaned"
            ),
        }
    }

    fn validate_upload(&self, upload: &NewUpload) -> Result<(), PortfolioError> {
        if upload.payload.is_empty() {
            return Err(PortfolioError::Validation(
                "File and category are required".to_string(),
            ));
        }
        if upload.payload.len() > self.settings.max_upload_bytes {
            return Err(PortfolioError::Validation(format!(
                "File is too large (limit is {} bytes)",
                self.settings.max_upload_bytes
            )));
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(PortfolioError::Validation(format!(
                    "Only image files can be uploaded (got {content_type})"
                )));
            }
        }
        Ok(())
    }

    /// Remove an image: the stored asset first, then the record.
    ///
    /// If the image store refuses, the record is kept so the gallery never
    /// points at a missing asset. Returns the removed record.
    pub async fn delete(&self, id: Uuid) -> Result<portfolio::Model, PortfolioError> {
        let image = portfolio_db::get_image_by_id(&self.db, id)
            .await?
            .ok_or(PortfolioError::NotFound(id))?;

        if let Err(e) = self.images.deprovision(&image.storage_key).await {
            error!(%id, storage_key = %image.storage_key, error = %e, "failed to deprovision image; record kept");
            return Err(e.into());
        }

        let txn = self.db.begin().await?;
        categories_db::release_slot(&txn, image.category).await?;
        let result = portfolio_db::delete_image(&txn, id).await?;
        if result.rows_affected == 0 {
            // Someone else removed it in the meantime; keep their slot accounting.
            txn.rollback().await?;
            return Err(PortfolioError::NotFound(id));
        }
        txn.commit().await?;

        info!(%id, category = %image.category, "portfolio image deleted");
        Ok(image)
    }

    /// Toggle the landing flag and/or change the order of one image.
    ///
    /// Setting the landing flag clears it on the image's siblings in the same
    /// transaction. Changing `order` never renumbers siblings.
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdatePortfolioImage,
    ) -> Result<portfolio::Model, PortfolioError> {
        if let Some(order) = patch.order {
            if order < 0 {
                return Err(PortfolioError::Validation(
                    "order must not be negative".to_string(),
                ));
            }
        }

        let image = portfolio_db::get_image_by_id(&self.db, id)
            .await?
            .ok_or(PortfolioError::NotFound(id))?;

        if patch.is_empty() {
            return Ok(image);
        }

        let updated = if patch.is_landing_page == Some(true) {
            let txn = self.db.begin().await?;
            categories_db::lock_category(&txn, image.category).await?;

            let image = portfolio_db::get_image_by_id(&txn, id)
                .await?
                .ok_or(PortfolioError::NotFound(id))?;
            let cleared =
                portfolio_db::clear_landing_in_category(&txn, image.category, Some(id)).await?;
            let updated = portfolio_db::update_image(&txn, image, patch)
                .await
                .map_err(|e| not_updated_as_not_found(e, id))?;
            txn.commit().await?;

            info!(%id, category = %updated.category, cleared, "landing image changed");
            updated
        } else {
            portfolio_db::update_image(&self.db, image, patch)
                .await
                .map_err(|e| not_updated_as_not_found(e, id))?
        };

        Ok(updated)
    }
}

fn not_updated_as_not_found(e: DbErr, id: Uuid) -> PortfolioError {
    match e {
        DbErr::RecordNotUpdated => PortfolioError::NotFound(id),
        other => PortfolioError::Database(other),
    }
}
