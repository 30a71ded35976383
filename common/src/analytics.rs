//! Dashboard aggregations over lists already fetched from the backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::batch::{Batch, BatchStatus};
use crate::product::{EnvironmentalCondition, Product};

/// Window used for the "expiring soon" count on the dashboard.
pub const EXPIRING_WINDOW_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_products: usize,
    pub total_batches: usize,
    pub active_shipments: usize,
    pub expiring_batches: usize,
}

impl AnalyticsSummary {
    pub fn from_lists(products: &[Product], batches: &[Batch], expiring: &[Batch]) -> Self {
        Self {
            total_products: products.len(),
            total_batches: batches.len(),
            active_shipments: batches
                .iter()
                .filter(|b| b.status() == Some(BatchStatus::InTransit))
                .count(),
            expiring_batches: expiring.len(),
        }
    }
}

/// Batches still moving through the chain: not sold, expired or recalled.
pub fn active_batch_count(batches: &[Batch]) -> usize {
    batches
        .iter()
        .filter(|b| {
            !matches!(
                b.status(),
                Some(BatchStatus::Sold | BatchStatus::Expired | BatchStatus::Recalled)
            )
        })
        .count()
}

/// The `n` newest batches by production date. Undated batches come last.
pub fn most_recent(mut batches: Vec<Batch>, n: usize) -> Vec<Batch> {
    batches.sort_by(|a, b| b.production_date.cmp(&a.production_date));
    batches.truncate(n);
    batches
}

/// A label and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

/// Count keys in the order they are first seen.
fn tally<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<Count> {
    let mut out: Vec<Count> = Vec::new();
    for key in keys {
        match out.iter_mut().find(|c| c.key == key) {
            Some(c) => c.count += 1,
            None => out.push(Count {
                key: key.to_string(),
                count: 1,
            }),
        }
    }
    out
}

/// Batches per status; a missing status counts as `UNKNOWN`.
pub fn status_distribution(batches: &[Batch]) -> Vec<Count> {
    tally(batches.iter().map(Batch::status_str))
}

/// Products per type; a missing type counts as `UNKNOWN`.
pub fn product_type_distribution(products: &[Product]) -> Vec<Count> {
    tally(products.iter().map(Product::type_key))
}

/// Batches per `YYYY-MM` of production date, oldest month first.
pub fn monthly_production(batches: &[Batch]) -> Vec<Count> {
    let months: Vec<String> = batches
        .iter()
        .filter_map(|b| b.production_date)
        .map(|d| d.format("%Y-%m").to_string())
        .collect();
    let mut counts = tally(months.iter().map(String::as_str));
    counts.sort_by(|a, b| a.key.cmp(&b.key));
    counts
}

/// Recorded events per event type across all batches.
pub fn event_type_summary(batches: &[Batch]) -> Vec<Count> {
    tally(
        batches
            .iter()
            .flat_map(|b| b.events.iter())
            .map(|e| e.event_type.as_str()),
    )
}

/// One point on the environmental chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalPoint {
    pub timestamp: Option<NaiveDateTime>,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<f64>,
}

/// Chart series; missing temperature or humidity plot as zero.
pub fn environmental_series(conditions: &[EnvironmentalCondition]) -> Vec<EnvironmentalPoint> {
    conditions
        .iter()
        .map(|c| EnvironmentalPoint {
            timestamp: c.timestamp,
            temperature: c.temperature.unwrap_or(0.0),
            humidity: c.humidity.unwrap_or(0.0),
            soil_moisture: c.soil_moisture,
            soil_ph: c.soil_ph,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchEvent;
    use crate::product::ProductType;
    use chrono::NaiveDate;

    fn batch(status: Option<&str>, produced: Option<(i32, u32, u32)>) -> Batch {
        Batch {
            status: status.map(String::from),
            production_date: produced.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            ..Default::default()
        }
    }

    fn pairs(counts: &[Count]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.key.as_str(), c.count)).collect()
    }

    #[test]
    fn test_most_recent_newest_first() {
        let batches = vec![
            batch(Some("A"), Some((2024, 1, 5))),
            batch(Some("B"), None),
            batch(Some("C"), Some((2025, 3, 1))),
            batch(Some("D"), Some((2024, 11, 20))),
        ];
        let statuses: Vec<_> = most_recent(batches.clone(), 3)
            .into_iter()
            .map(|b| b.status.unwrap())
            .collect();
        assert_eq!(statuses, ["C", "D", "A"]);
        assert_eq!(most_recent(batches, 10).last().unwrap().status.as_deref(), Some("B"));
    }

    #[test]
    fn test_summary_counts_in_transit() {
        let batches = vec![
            batch(Some("IN_TRANSIT"), None),
            batch(Some("SOLD"), None),
            batch(Some("IN_TRANSIT"), None),
        ];
        let products = vec![Product::default(); 4];
        let s = AnalyticsSummary::from_lists(&products, &batches, &batches[..1]);
        assert_eq!(
            s,
            AnalyticsSummary {
                total_products: 4,
                total_batches: 3,
                active_shipments: 2,
                expiring_batches: 1,
            }
        );
    }

    #[test]
    fn test_active_batches() {
        let batches = vec![
            batch(Some("CREATED"), None),
            batch(Some("SOLD"), None),
            batch(None, None),
            batch(Some("RECALLED"), None),
            batch(Some("AT_RETAILER"), None),
        ];
        assert_eq!(active_batch_count(&batches), 3);
    }

    #[test]
    fn test_status_distribution_first_seen_order() {
        let batches = vec![
            batch(Some("SOLD"), None),
            batch(None, None),
            batch(Some("CREATED"), None),
            batch(Some("SOLD"), None),
        ];
        assert_eq!(
            pairs(&status_distribution(&batches)),
            [("SOLD", 2), ("UNKNOWN", 1), ("CREATED", 1)]
        );
    }

    #[test]
    fn test_monthly_production_sorted() {
        let batches = vec![
            batch(None, Some((2024, 3, 9))),
            batch(None, Some((2023, 12, 1))),
            batch(None, None),
            batch(None, Some((2024, 3, 28))),
        ];
        assert_eq!(
            pairs(&monthly_production(&batches)),
            [("2023-12", 1), ("2024-03", 2)]
        );
    }

    #[test]
    fn test_product_types_and_events() {
        let products = vec![
            Product {
                product_type: Some(ProductType::Fruit),
                ..Default::default()
            },
            Product::default(),
            Product {
                product_type: Some(ProductType::Fruit),
                ..Default::default()
            },
        ];
        assert_eq!(
            pairs(&product_type_distribution(&products)),
            [("FRUIT", 2), ("UNKNOWN", 1)]
        );

        let mut b = batch(None, None);
        b.events = vec![BatchEvent::new("HARVESTED"), BatchEvent::new("SHIPPED"), BatchEvent::new("HARVESTED")];
        assert_eq!(
            pairs(&event_type_summary(&[b])),
            [("HARVESTED", 2), ("SHIPPED", 1)]
        );
    }

    #[test]
    fn test_environmental_defaults_to_zero() {
        let series = environmental_series(&[EnvironmentalCondition {
            humidity: Some(61.5),
            soil_ph: Some(6.2),
            ..Default::default()
        }]);
        assert_eq!(series[0].temperature, 0.0);
        assert_eq!(series[0].humidity, 61.5);
        assert_eq!(series[0].soil_ph, Some(6.2));
        assert_eq!(series[0].soil_moisture, None);
    }
}
