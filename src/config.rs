use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::services::UploadSettings;
use crate::storage::{CloudinaryConfig, RetryPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub cloudinary: CloudinaryConfig,
    pub retry: RetryPolicy,
    pub uploads: UploadSettings,
    pub static_dir: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = UploadSettings::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 8080)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: ttl_from_hours(parsed("JWT_TTL_HOURS", 12)?)?,
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                request_timeout: Duration::from_secs(parsed("CLOUDINARY_TIMEOUT_SECS", 60)?),
            },
            retry: RetryPolicy {
                max_attempts: parsed("IMAGE_STORE_MAX_ATTEMPTS", RetryPolicy::default().max_attempts)?,
                ..RetryPolicy::default()
            },
            uploads: UploadSettings {
                folder_prefix: env::var("CLOUDINARY_FOLDER").unwrap_or(defaults.folder_prefix),
                max_upload_bytes: parsed("UPLOAD_MAX_BYTES", defaults.max_upload_bytes)?,
            },
            static_dir: env::var("STATIC_DIR").ok().filter(|s| !s.is_empty()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn ttl_from_hours(hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            name: "JWT_TTL_HOURS",
            value: hours.to_string(),
        })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
