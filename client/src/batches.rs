use harvest_common::batch::{Batch, BatchEvent};

use crate::error::Result;
use crate::http::ApiClient;

pub const DEFAULT_EXPIRING_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct BatchService {
    api: ApiClient,
}

impl BatchService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, batch: &Batch) -> Result<Batch> {
        self.api.post("/batches", batch).await
    }

    pub async fn get(&self, id: i64) -> Result<Batch> {
        self.api.get(&format!("/batches/{id}")).await
    }

    pub async fn by_code(&self, code: &str) -> Result<Batch> {
        self.api.get(&format!("/batches/code/{code}")).await
    }

    pub async fn by_product(&self, product_id: i64) -> Result<Vec<Batch>> {
        self.api.get(&format!("/batches/product/{product_id}")).await
    }

    /// Batches visible to the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Batch>> {
        self.api.get("/batches").await
    }

    pub async fn by_status(&self, status: &str) -> Result<Vec<Batch>> {
        self.api.get(&format!("/batches/status/{status}")).await
    }

    /// Set the status and record `event` alongside it.
    pub async fn update_status(&self, id: i64, status: &str, event: &BatchEvent) -> Result<Batch> {
        self.api
            .put_query(&format!("/batches/{id}/status"), &[("status", status)], event)
            .await
    }

    pub async fn add_event(&self, batch_id: i64, event: &BatchEvent) -> Result<BatchEvent> {
        self.api.post(&format!("/batches/{batch_id}/events"), event).await
    }

    pub async fn events(&self, batch_id: i64) -> Result<Vec<BatchEvent>> {
        self.api.get(&format!("/batches/{batch_id}/events")).await
    }

    pub async fn expiring(&self, days: u32) -> Result<Vec<Batch>> {
        self.api.get_query("/batches/expiring", &[("days", days)]).await
    }
}
