//! External image hosting.
//!
//! The curation service only needs two things from the host: store a payload
//! and hand back a public URL plus a deletion key, and later deprovision that
//! key. [`ImageStore`] is that seam; [`cloudinary::CloudinaryStore`] is the
//! production implementation and [`retry::Retrying`] adds bounded retries for
//! transient failures.

pub mod cloudinary;
pub mod retry;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use retry::{RetryPolicy, Retrying};

/// Where the host put an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub storage_key: String,
}

/// A payload to store. Borrowed so retries can resend it without copying the
/// caller's buffer up front.
#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    pub bytes: &'a [u8],
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    /// Grouping hint only, e.g. `jjclicks/wedding`.
    pub folder: &'a str,
}

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image store unreachable: {0}")]
    Transport(String),
    #[error("image store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected image store response: {0}")]
    InvalidResponse(String),
}

impl ImageStoreError {
    /// Network failures, throttling and server-side errors are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            ImageStoreError::Transport(_) => true,
            ImageStoreError::Rejected { status, .. } => *status == 429 || *status >= 500,
            ImageStoreError::InvalidResponse(_) => false,
        }
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the payload and return its public URL and deletion key.
    async fn store(&self, upload: ImageUpload<'_>) -> Result<StoredImage, ImageStoreError>;

    /// Remove a stored asset. A key the host no longer knows is not an error.
    async fn deprovision(&self, storage_key: &str) -> Result<(), ImageStoreError>;
}
