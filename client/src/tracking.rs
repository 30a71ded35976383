use harvest_common::batch::{Batch, BatchEvent};
use harvest_common::tracking::{decode_scan_payload, Journey};
use tracing::info;

use crate::error::{ClientError, Result};
use crate::http::ApiClient;

pub const JOURNEY_NOT_FOUND: &str =
    "Could not find information for this batch. Please check the code and try again.";

pub fn batch_not_found(code: &str) -> String {
    format!("Could not find batch with code: {code}")
}

fn no_code() -> ClientError {
    ClientError::Invalid("No batch code found in the scanned text".into())
}

/// Public, unauthenticated tracking endpoints.
#[derive(Debug, Clone)]
pub struct TrackingService {
    api: ApiClient,
}

impl TrackingService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn journey(&self, code: &str) -> Result<Journey> {
        self.api
            .get(&format!("/public/journey/{code}"))
            .await
            .map_err(|e| not_found_as(e, JOURNEY_NOT_FOUND.to_string()))
    }

    /// Batch, product, events and derived metrics in one document.
    pub async fn tracking(&self, code: &str) -> Result<Journey> {
        self.api
            .get(&format!("/public/tracking/batch/{code}"))
            .await
            .map_err(|e| not_found_as(e, JOURNEY_NOT_FOUND.to_string()))
    }

    pub async fn timeline(&self, code: &str) -> Result<Vec<BatchEvent>> {
        self.api.get(&format!("/public/tracking/timeline/{code}")).await
    }

    /// Resolve scanned or typed text to a journey with a single request.
    pub async fn journey_for_scan(&self, text: &str) -> Result<Journey> {
        let code = decode_scan_payload(text).ok_or_else(no_code)?;
        info!(%code, "tracking scanned batch");
        self.journey(&code).await
    }
}

/// Resolve scanned or typed text to a batch with a single authenticated
/// request. A 404 reads "Could not find batch with code: X".
pub async fn lookup_scanned_batch(api: &ApiClient, text: &str) -> Result<Batch> {
    let code = decode_scan_payload(text).ok_or_else(no_code)?;
    info!(%code, "looking up scanned batch");
    api.get(&format!("/batches/code/{code}"))
        .await
        .map_err(|e| not_found_as(e, batch_not_found(&code)))
}

fn not_found_as(err: ClientError, message: String) -> ClientError {
    if err.status() == Some(404) {
        ClientError::NotFound(message)
    } else {
        err
    }
}
