pub mod auth;
pub mod portfolio;

pub use portfolio::{PortfolioService, UploadSettings};
