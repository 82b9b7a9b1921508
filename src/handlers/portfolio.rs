use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::cache::{CacheData, keys};
use crate::errors::PortfolioError;
use crate::handlers::success;
use crate::models::portfolio::{
    Category, ImageFilter, ImageListQuery, NewUpload, UpdatePortfolioImage,
};
use crate::services::PortfolioService;

/// Multipart body of `POST /api/portfolio`.
#[derive(MultipartForm)]
pub struct UploadForm {
    pub file: Option<Bytes>,
    pub category: Option<Text<String>>,
    /// Only the literal `"true"` marks the upload as the landing image.
    #[multipart(rename = "isLandingPage")]
    pub is_landing_page: Option<Text<String>>,
}

/// GET /api/portfolio — list images, optionally by category or landing only (public).
pub async fn get_images(
    service: web::Data<PortfolioService>,
    cache: web::Data<CacheData>,
    query: web::Query<ImageListQuery>,
) -> Result<HttpResponse, PortfolioError> {
    let query = query.into_inner();
    let filter = ImageFilter {
        category: query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse::<Category>)
            .transpose()?,
        landing_only: query.landing_only.as_deref() == Some("true"),
    };

    let cache_key = keys::image_list(&filter);
    if let Some(cached) = cache.get(&cache_key).await {
        return Ok(HttpResponse::Ok().json(success(cached.as_ref())));
    }

    let generation = cache.generation();
    let images = service.list(filter).await?;
    let data = serde_json::json!(images);
    cache.set(cache_key, data.clone(), generation).await;

    Ok(HttpResponse::Ok().json(success(data)))
}

/// GET /api/portfolio/categories — per-category count, capacity and cover image (public).
pub async fn get_category_summaries(
    service: web::Data<PortfolioService>,
    cache: web::Data<CacheData>,
) -> Result<HttpResponse, PortfolioError> {
    let cache_key = keys::category_summaries();
    if let Some(cached) = cache.get(&cache_key).await {
        return Ok(HttpResponse::Ok().json(success(cached.as_ref())));
    }

    let generation = cache.generation();
    let summaries = service.category_summaries().await?;
    let data = serde_json::json!(summaries);
    cache.set(cache_key, data.clone(), generation).await;

    Ok(HttpResponse::Ok().json(success(data)))
}

/// POST /api/portfolio — upload an image into a category (admin only).
pub async fn upload_image(
    _admin: AdminUser,
    service: web::Data<PortfolioService>,
    cache: web::Data<CacheData>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, PortfolioError> {
    let (Some(file), Some(category)) = (form.file, form.category) else {
        return Err(PortfolioError::Validation(
            "File and category are required".to_string(),
        ));
    };

    let category: Category = category.0.trim().parse()?;
    let is_landing_page = form
        .is_landing_page
        .map(|flag| flag.0 == "true")
        .unwrap_or(false);

    let image = service
        .upload(NewUpload {
            payload: file.data.to_vec(),
            content_type: file.content_type.map(|mime| mime.to_string()),
            file_name: file.file_name,
            category,
            is_landing_page,
        })
        .await?;
    cache.invalidate_all();

    Ok(HttpResponse::Created().json(success(image)))
}

/// PATCH /api/portfolio/{id} — toggle the landing flag or change the order (admin only).
pub async fn update_image(
    _admin: AdminUser,
    service: web::Data<PortfolioService>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePortfolioImage>,
) -> Result<HttpResponse, PortfolioError> {
    let image = service.update(path.into_inner(), body.into_inner()).await?;
    cache.invalidate_all();

    Ok(HttpResponse::Ok().json(success(image)))
}

/// DELETE /api/portfolio/{id} — remove an image from the store and the gallery (admin only).
pub async fn delete_image(
    _admin: AdminUser,
    service: web::Data<PortfolioService>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PortfolioError> {
    let id = path.into_inner();
    service.delete(id).await?;
    cache.invalidate_all();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Image deleted successfully",
    })))
}
