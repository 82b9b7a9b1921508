#![allow(dead_code)]

use async_trait::async_trait;
use jjclicks_backend::create_pool;
use jjclicks_backend::db::categories::sync_counters;
use jjclicks_backend::models::portfolio::{Category, NewUpload};
use jjclicks_backend::services::{PortfolioService, UploadSettings};
use jjclicks_backend::storage::{ImageStore, ImageStoreError, ImageUpload, StoredImage};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};

/// Fresh in-memory SQLite database with the schema and counter rows in place.
pub async fn setup_db() -> DatabaseConnection {
    let db = create_pool("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    sync_counters(&db).await.expect("Failed to sync counters");
    db
}

#[derive(Default)]
struct FakeState {
    next_id: u32,
    stored: Vec<(String, String)>,
    deprovisioned: Vec<String>,
    lost: Vec<String>,
    already_absent: Vec<String>,
    fixed_key: Option<String>,
    fail_store: bool,
    fail_deprovision: bool,
}

/// Image store double that records every call.
#[derive(Default)]
pub struct FakeImageStore {
    state: Mutex<FakeState>,
}

impl FakeImageStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `(folder, storage_key)` of every successful store call.
    pub fn stored(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().stored.clone()
    }

    pub fn store_calls(&self) -> usize {
        self.state.lock().unwrap().stored.len()
    }

    pub fn deprovisioned(&self) -> Vec<String> {
        self.state.lock().unwrap().deprovisioned.clone()
    }

    /// Keys stored and not deprovisioned since.
    pub fn live_keys(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .stored
            .iter()
            .map(|(_, key)| key.clone())
            .filter(|key| !state.deprovisioned.contains(key))
            .collect()
    }

    /// Keys the host reported as already gone when asked to deprovision them.
    pub fn already_absent(&self) -> Vec<String> {
        self.state.lock().unwrap().already_absent.clone()
    }

    /// Simulate the host losing an asset behind our back.
    pub fn lose(&self, storage_key: &str) {
        self.state.lock().unwrap().lost.push(storage_key.to_string());
    }

    /// Make every store call hand back the same key.
    pub fn always_return_key(&self, storage_key: &str) {
        self.state.lock().unwrap().fixed_key = Some(storage_key.to_string());
    }

    pub fn fail_store(&self, fail: bool) {
        self.state.lock().unwrap().fail_store = fail;
    }

    pub fn fail_deprovision(&self, fail: bool) {
        self.state.lock().unwrap().fail_deprovision = fail;
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn store(&self, upload: ImageUpload<'_>) -> Result<StoredImage, ImageStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_store {
            return Err(ImageStoreError::Rejected {
                status: 500,
                message: "store unavailable".to_string(),
            });
        }
        state.next_id += 1;
        let storage_key = state
            .fixed_key
            .clone()
            .unwrap_or_else(|| format!("{}/img{}", upload.folder, state.next_id));
        state
            .stored
            .push((upload.folder.to_string(), storage_key.clone()));

        Ok(StoredImage {
            url: format!("https://images.test/{storage_key}.jpg"),
            storage_key,
        })
    }

    async fn deprovision(&self, storage_key: &str) -> Result<(), ImageStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deprovision {
            return Err(ImageStoreError::Transport("connection refused".to_string()));
        }
        // A key the host no longer knows is reported as done, like Cloudinary's
        // "not found".
        if state.lost.iter().any(|k| k == storage_key) {
            state.already_absent.push(storage_key.to_string());
            return Ok(());
        }
        state.deprovisioned.push(storage_key.to_string());
        Ok(())
    }
}

pub fn service(db: &DatabaseConnection, store: &Arc<FakeImageStore>) -> PortfolioService {
    let images: Arc<dyn ImageStore> = store.clone();
    PortfolioService::new(db.clone(), images, UploadSettings::default())
}

/// A small JPEG-looking upload.
pub fn jpeg(category: Category, is_landing_page: bool) -> NewUpload {
    NewUpload {
        payload: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
        content_type: Some("image/jpeg".to_string()),
        file_name: Some("photo.jpg".to_string()),
        category,
        is_landing_page,
    }
}
