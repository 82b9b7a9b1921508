use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::AuthError;
use crate::auth::jwt::{self, JwtSecret};
use crate::db::admins::get_admin_by_id;
use crate::models::admins;

/// An authenticated admin, extracted from `Authorization: Bearer <token>`.
pub struct AdminUser(pub admins::Model);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = BearerAuth::extract(&req)
                .await
                .map_err(|_| AuthError::MissingToken)?;

            // 2. Validate the JWT with the configured secret.
            let jwt_secret = req
                .app_data::<web::Data<JwtSecret>>()
                .ok_or(AuthError::Config("JWT secret not configured"))?;
            let claims = jwt::validate_token(bearer.token(), &jwt_secret.secret)?;
            let admin_id = claims.admin_id().map_err(AuthError::InvalidToken)?;

            // 3. Load the admin; a deleted account invalidates its tokens.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or(AuthError::Config("database not configured"))?;
            let admin = get_admin_by_id(db.get_ref(), admin_id)
                .await
                .map_err(AuthError::Database)?
                .ok_or_else(|| AuthError::InvalidToken("admin no longer exists".to_string()))?;

            Ok(AdminUser(admin))
        })
    }
}
