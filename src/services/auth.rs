use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::auth::AuthError;
use crate::auth::jwt::{self, JwtSecret};
use crate::auth::password;
use crate::db::admins as admin_db;
use crate::models::admins::{
    self, AdminResponse, CreateAdmin, LoginRequest, LoginResponse, normalize_email,
};

/// Result of provisioning an admin account.
#[derive(Debug)]
pub enum CreateAdminOutcome {
    Created(admins::Model),
    AlreadyExists(admins::Model),
}

/// Create an admin unless one with the same email already exists.
pub async fn create_admin(
    db: &DatabaseConnection,
    input: CreateAdmin,
) -> Result<CreateAdminOutcome, AuthError> {
    let email = normalize_email(&input.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation(format!(
            "'{}' is not a valid email address",
            input.email
        )));
    }
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AuthError::Validation("name is required".to_string()));
    }

    if let Some(existing) = admin_db::get_admin_by_email(db, &email).await? {
        return Ok(CreateAdminOutcome::AlreadyExists(existing));
    }

    let hash = password::hash_password(&input.password)?;
    let admin = admin_db::insert_admin(db, email, name, hash).await?;
    info!(admin_id = %admin.id, email = %admin.email, "admin created");
    Ok(CreateAdminOutcome::Created(admin))
}

/// Check credentials and issue a session token.
pub async fn login(
    db: &DatabaseConnection,
    jwt_secret: &JwtSecret,
    input: LoginRequest,
) -> Result<LoginResponse, AuthError> {
    let email = normalize_email(&input.email);

    let Some(admin) = admin_db::get_admin_by_email(db, &email).await? else {
        warn!(%email, "login attempt for unknown admin");
        return Err(AuthError::InvalidCredentials);
    };

    if !password::verify_password(&input.password, &admin.password_hash)? {
        warn!(admin_id = %admin.id, "login attempt with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let (token, expires_at) = jwt::issue_token(&admin, jwt_secret)?;
    info!(admin_id = %admin.id, "admin logged in");

    Ok(LoginResponse {
        token,
        expires_at,
        admin: AdminResponse::from(admin),
    })
}
