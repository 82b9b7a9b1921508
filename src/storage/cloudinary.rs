use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;
use tracing::{debug, info};

use super::{ImageStore, ImageStoreError, ImageUpload, StoredImage};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Credentials for the Cloudinary upload API.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub request_timeout: Duration,
}

/// Signed-upload client for Cloudinary.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageStoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ImageStoreError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the client at another API host (used against local stand-ins).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{action}",
            self.api_base, self.config.cloud_name
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ImageStoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| ImageStoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ImageStoreError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ImageStoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Cloudinary request signature: SHA-1 over the parameters sorted by name,
/// joined as `k=v&k=v`, with the API secret appended.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn unix_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn store(&self, upload: ImageUpload<'_>) -> Result<StoredImage, ImageStoreError> {
        let timestamp = unix_timestamp();
        let signature = sign(
            &[("folder", upload.folder), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let mut file = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.unwrap_or("upload").to_string());
        if let Some(content_type) = upload.content_type {
            file = file
                .mime_str(content_type)
                .map_err(|e| ImageStoreError::Rejected {
                    status: 400,
                    message: format!("invalid content type: {e}"),
                })?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", upload.folder.to_string())
            .text("signature", signature);

        debug!(folder = upload.folder, bytes = upload.bytes.len(), "uploading image");
        let body = self
            .send(self.client.post(self.endpoint("upload")).multipart(form))
            .await?;

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| ImageStoreError::InvalidResponse(format!("upload response: {e}")))?;

        info!(public_id = %parsed.public_id, "image stored");
        Ok(StoredImage {
            url: parsed.secure_url,
            storage_key: parsed.public_id,
        })
    }

    async fn deprovision(&self, storage_key: &str) -> Result<(), ImageStoreError> {
        let timestamp = unix_timestamp();
        let signature = sign(
            &[("public_id", storage_key), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", storage_key),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let body = self
            .send(self.client.post(self.endpoint("destroy")).form(&params))
            .await?;

        let parsed: DestroyResponse = serde_json::from_str(&body)
            .map_err(|e| ImageStoreError::InvalidResponse(format!("destroy response: {e}")))?;

        if destroy_outcome(&parsed.result)? {
            info!(public_id = storage_key, "image deprovisioned");
        } else {
            info!(public_id = storage_key, "image already absent from store");
        }
        Ok(())
    }
}

/// Read the `result` of a destroy call: `true` when the asset was removed,
/// `false` when the host no longer had it.
fn destroy_outcome(result: &str) -> Result<bool, ImageStoreError> {
    match result {
        "ok" => Ok(true),
        "not found" => Ok(false),
        other => Err(ImageStoreError::InvalidResponse(format!(
            "destroy returned '{other}'"
        ))),
    }
}
