//! Thin typed wrappers over the SynerHarvest REST API.

pub mod analytics;
pub mod auth;
pub mod batches;
pub mod config;
pub mod error;
pub mod http;
pub mod products;
pub mod session;
pub mod storage;
pub mod tracking;
pub mod weather;

pub use config::{ClientConfig, RegistrationMode};
pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use session::Session;

impl ApiClient {
    pub fn auth(&self) -> auth::AuthService {
        auth::AuthService::new(self.clone())
    }

    pub fn batches(&self) -> batches::BatchService {
        batches::BatchService::new(self.clone())
    }

    pub fn products(&self) -> products::ProductService {
        products::ProductService::new(self.clone())
    }

    pub fn tracking(&self) -> tracking::TrackingService {
        tracking::TrackingService::new(self.clone())
    }

    pub fn analytics(&self) -> analytics::AnalyticsService {
        analytics::AnalyticsService::new(self.clone())
    }
}
