//! Provision the initial admin account.
//!
//! Usage: `create-admin [EMAIL] [NAME]` with the password taken from
//! `ADMIN_PASSWORD`. `ADMIN_EMAIL` and `ADMIN_NAME` are used when the
//! positional arguments are omitted.

use dotenv::dotenv;
use jjclicks_backend::create_pool;
use jjclicks_backend::models::admins::CreateAdmin;
use jjclicks_backend::services::auth::{CreateAdminOutcome, create_admin};
use migration::{Migrator, MigratorTrait};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let email = args
        .next()
        .or_else(|| std::env::var("ADMIN_EMAIL").ok())
        .ok_or("pass an email or set ADMIN_EMAIL")?;
    let name = args
        .next()
        .or_else(|| std::env::var("ADMIN_NAME").ok())
        .unwrap_or_else(|| "Admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").map_err(|_| "ADMIN_PASSWORD must be set")?;
    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

    let db = create_pool(&database_url)
        .await
        .map_err(|e| format!("failed to connect to database: {e}"))?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| format!("failed to run migrations: {e}"))?;

    let outcome = create_admin(
        &db,
        CreateAdmin {
            email,
            name,
            password,
        },
    )
    .await
    .map_err(|e| e.to_string())?;

    match outcome {
        CreateAdminOutcome::Created(admin) => {
            println!("Admin created: {} <{}>", admin.name, admin.email);
        }
        CreateAdminOutcome::AlreadyExists(admin) => {
            println!("Admin already exists: {}", admin.email);
        }
    }
    Ok(())
}
