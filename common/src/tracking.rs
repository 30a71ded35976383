//! Public tracking: the QR payload convention and the journey view model.

use serde::{Deserialize, Serialize};

use crate::batch::{Batch, BatchEvent};
use crate::lifecycle::event_types;
use crate::product::Product;

pub const DEFAULT_TRACKING_BASE_URL: &str = "https://synerharvest.com/tracking/";

/// The text encoded into a batch's QR code.
pub fn tracking_url(base: &str, batch_code: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{batch_code}")
    } else {
        format!("{base}/{batch_code}")
    }
}

/// Extract the batch code from scanned or typed text.
///
/// A tracking URL yields its last path segment, anything else is taken as
/// the code itself. Returns `None` when nothing usable remains.
pub fn decode_scan_payload(text: &str) -> Option<String> {
    let text = text.trim();
    let code = match text.rsplit_once('/') {
        Some((_, last)) => last.trim(),
        None => text,
    };
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

/// Public view of a batch: where it came from and what happened to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub batch: Batch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default)]
    pub events: Vec<BatchEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JourneyMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_since_harvest: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_in_transit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_checks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_carbon_footprint: Option<f64>,
}

impl Journey {
    /// Events oldest first. Events without a timestamp sort last.
    pub fn timeline(&self) -> Vec<&BatchEvent> {
        let mut events: Vec<&BatchEvent> = self.events.iter().collect();
        events.sort_by_key(|e| (e.timestamp.is_none(), e.timestamp));
        events
    }

    pub fn quality_check_count(&self) -> usize {
        self.metrics
            .as_ref()
            .and_then(|m| m.quality_checks)
            .map(|n| n as usize)
            .unwrap_or_else(|| {
                self.events
                    .iter()
                    .filter(|e| e.event_type == event_types::QUALITY_CHECK)
                    .count()
            })
    }

    /// Location of the most recent event that recorded one.
    pub fn last_known_location(&self) -> Option<&str> {
        self.timeline()
            .into_iter()
            .rev()
            .find_map(|e| e.location.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tracking_url() {
        assert_eq!(
            decode_scan_payload("https://synerharvest.com/tracking/APL-20240101-042").as_deref(),
            Some("APL-20240101-042")
        );
    }

    #[test]
    fn test_decode_bare_code_and_whitespace() {
        assert_eq!(decode_scan_payload("  TOM-20231111-007\n").as_deref(), Some("TOM-20231111-007"));
    }

    #[test]
    fn test_decode_empty_tail() {
        assert_eq!(decode_scan_payload("https://synerharvest.com/tracking/"), None);
        assert_eq!(decode_scan_payload("   "), None);
    }

    #[test]
    fn test_tracking_url_round_trips_through_decode() {
        let url = tracking_url(DEFAULT_TRACKING_BASE_URL, "CAR-20240302-900");
        assert_eq!(url, "https://synerharvest.com/tracking/CAR-20240302-900");
        assert_eq!(decode_scan_payload(&url).as_deref(), Some("CAR-20240302-900"));
        assert_eq!(tracking_url("http://x/t", "A"), "http://x/t/A");
    }

    #[test]
    fn test_journey_from_backend_json() {
        let json = r#"{
            "batch": {"id": 5, "batchCode": "APL-1", "productId": 2, "productName": "Apples",
                      "quantity": 40, "productionDate": "2024-03-01", "status": "IN_TRANSIT"},
            "product": {"id": 2, "name": "Apples", "organic": true, "productType": "FRUIT",
                        "certification": "USDA_ORGANIC"},
            "events": [
                {"id": 2, "eventType": "SHIPPED", "timestamp": "2024-03-03T08:00:00", "location": "Farm gate"},
                {"id": 1, "eventType": "HARVESTED", "timestamp": "2024-03-01T06:30:00", "location": "Orchard"},
                {"id": 3, "eventType": "QUALITY_CHECK"}
            ],
            "metrics": {"daysSinceHarvest": 3, "estimatedCarbonFootprint": 15.0}
        }"#;
        let journey: Journey = serde_json::from_str(json).unwrap();
        assert_eq!(journey.batch.code(), "APL-1");
        assert!(journey.product.as_ref().is_some_and(|p| p.organic));

        let order: Vec<_> = journey.timeline().iter().map(|e| e.id).collect();
        assert_eq!(order, [Some(1), Some(2), Some(3)]);
        assert_eq!(journey.last_known_location(), Some("Farm gate"));
        assert_eq!(journey.quality_check_count(), 1);
        assert_eq!(journey.metrics.unwrap().days_since_harvest, Some(3));
    }
}
