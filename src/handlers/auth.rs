use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::AuthError;
use crate::auth::jwt::JwtSecret;
use crate::auth::middleware::AdminUser;
use crate::handlers::success;
use crate::models::admins::{AdminResponse, LoginRequest};
use crate::services::auth as auth_service;

/// POST /api/auth/login — exchange admin credentials for a bearer token.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    jwt_secret: web::Data<JwtSecret>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let session = auth_service::login(db.get_ref(), jwt_secret.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(success(session)))
}

/// GET /api/auth/me — return the currently authenticated admin.
pub async fn me(admin: AdminUser) -> HttpResponse {
    HttpResponse::Ok().json(success(AdminResponse::from(admin.0)))
}
