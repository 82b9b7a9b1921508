pub mod auth;
pub mod portfolio;

use actix_multipart::form::MultipartFormConfig;
use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::errors::error_body;

/// Wrap a payload in the `{ "success": true, "data": ... }` envelope.
pub fn success<T: Serialize>(data: T) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": data,
    })
}

fn bad_request(message: String) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(error_body("validation", message.clone()));
    InternalError::from_response(message, response).into()
}

/// Size limits for upload forms. The whole file is buffered in memory.
pub fn multipart_config(max_upload_bytes: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(max_upload_bytes + 64 * 1024)
        .memory_limit(max_upload_bytes)
        .error_handler(|err, _req| bad_request(format!("Invalid upload form: {err}")))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed query strings, paths and bodies get the same JSON envelope as
    // every other validation error.
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| bad_request(format!("Invalid query: {err}"))),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| bad_request(format!("Invalid image id: {err}"))),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| bad_request(format!("Invalid request body: {err}"))),
    );

    // ── Auth routes ──
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me)),
    );

    // ── Portfolio routes (reads are public, writes require an admin token) ──
    cfg.service(
        web::resource("/portfolio")
            .route(web::get().to(portfolio::get_images))
            .route(web::post().to(portfolio::upload_image)),
    );
    cfg.service(
        web::resource("/portfolio/categories")
            .route(web::get().to(portfolio::get_category_summaries)),
    );
    cfg.service(
        web::resource("/portfolio/{id}")
            .route(web::patch().to(portfolio::update_image))
            .route(web::delete().to(portfolio::delete_image)),
    );
}
