use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where a batch is in the supply chain. The backend owns transitions; the
/// client only displays and suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Created,
    Harvested,
    InStorage,
    InTransit,
    Delivered,
    AtRetailer,
    Sold,
    Expired,
    Recalled,
}

impl BatchStatus {
    pub fn all() -> &'static [BatchStatus] {
        &[
            BatchStatus::Created,
            BatchStatus::Harvested,
            BatchStatus::InStorage,
            BatchStatus::InTransit,
            BatchStatus::Delivered,
            BatchStatus::AtRetailer,
            BatchStatus::Sold,
            BatchStatus::Expired,
            BatchStatus::Recalled,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Created => "CREATED",
            BatchStatus::Harvested => "HARVESTED",
            BatchStatus::InStorage => "IN_STORAGE",
            BatchStatus::InTransit => "IN_TRANSIT",
            BatchStatus::Delivered => "DELIVERED",
            BatchStatus::AtRetailer => "AT_RETAILER",
            BatchStatus::Sold => "SOLD",
            BatchStatus::Expired => "EXPIRED",
            BatchStatus::Recalled => "RECALLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatchStatus::Created => "Created",
            BatchStatus::Harvested => "Harvested",
            BatchStatus::InStorage => "In Storage",
            BatchStatus::InTransit => "In Transit",
            BatchStatus::Delivered => "Delivered",
            BatchStatus::AtRetailer => "At Retailer",
            BatchStatus::Sold => "Sold",
            BatchStatus::Expired => "Expired",
            BatchStatus::Recalled => "Recalled",
        }
    }

    /// CSS badge class used by status chips.
    pub fn badge_class(self) -> &'static str {
        match self {
            BatchStatus::Created => "badge-primary",
            BatchStatus::Harvested | BatchStatus::Sold => "badge-success",
            BatchStatus::InStorage => "badge-secondary",
            BatchStatus::InTransit => "badge-warning",
            BatchStatus::Delivered | BatchStatus::AtRetailer => "badge-info",
            BatchStatus::Expired | BatchStatus::Recalled => "badge-danger",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown batch status '{s}'"))
    }
}

/// Badge class for a raw status string, tolerating values the client does not know.
pub fn status_badge_class(status: &str) -> &'static str {
    status
        .parse::<BatchStatus>()
        .map(BatchStatus::badge_class)
        .unwrap_or("badge-secondary")
}

/// A tracked quantity of a product, identified by its batch code.
///
/// `status` is kept as the raw string so that statuses added server-side
/// still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<String>,
    #[serde(default)]
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BatchEvent>,
}

impl Batch {
    pub fn status(&self) -> Option<BatchStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn status_str(&self) -> &str {
        self.status.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn code(&self) -> &str {
        self.batch_code.as_deref().unwrap_or_default()
    }

    /// Case-insensitive match on batch code or product name. An empty term
    /// matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [self.batch_code.as_deref(), self.product_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// A timestamped record appended to a batch's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
}

impl BatchEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    /// Shortened anchor hash for display, e.g. `0x12ab34…cdef`.
    pub fn short_tx_hash(&self) -> Option<String> {
        self.blockchain_tx_hash.as_deref().map(truncate_hash)
    }
}

/// Keep the first 8 and last 4 characters of a long hash.
pub fn truncate_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 14 {
        return hash.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Generate a batch code as `{PREFIX}-{YYYYMMDD}-{NNN}`.
pub fn generate_batch_code(name: &str, date: NaiveDate) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format_batch_code(name, date, suffix)
}

/// Deterministic half of [`generate_batch_code`].
pub fn format_batch_code(name: &str, date: NaiveDate, suffix: u16) -> String {
    let prefix: String = name.trim().chars().take(3).collect::<String>().to_uppercase();
    let prefix = if prefix.is_empty() { "PRD".to_string() } else { prefix };
    format!("{}-{}-{:03}", prefix, date.format("%Y%m%d"), suffix % 1000)
}

/// Default expiry offered on the batch form: six months after production.
pub fn default_expiration_date(production: NaiveDate) -> NaiveDate {
    production
        .checked_add_months(Months::new(6))
        .unwrap_or(production)
}

/// Input collected by the batch creation wizard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchDraft {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub batch_code: String,
    pub quantity: u32,
    pub production_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub notes: String,
}

impl BatchDraft {
    /// Check the fields collected on wizard step `step` (1: product,
    /// 2: quantity and dates). Later steps have nothing to check.
    pub fn check_step(&self, step: u8) -> Result<(), String> {
        match step {
            1 if self.product_id.is_none() => Err("Please select a product".into()),
            2 if self.quantity == 0 => Err("Please enter a valid quantity".into()),
            2 if self.production_date.is_none() => Err("Please select a production date".into()),
            _ => Ok(()),
        }
    }

    /// Validate the draft and build the request body. A blank batch code is
    /// generated from the product name.
    pub fn into_batch(self) -> Result<Batch, String> {
        let product_id = self.product_id.ok_or("Please select a product")?;
        if self.quantity == 0 {
            return Err("Please enter a valid quantity".into());
        }
        let production = self
            .production_date
            .ok_or("Please select a production date")?;
        let code = if self.batch_code.trim().is_empty() {
            generate_batch_code(self.product_name.as_deref().unwrap_or_default(), production)
        } else {
            self.batch_code.trim().to_string()
        };
        Ok(Batch {
            batch_code: Some(code),
            product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            production_date: Some(production),
            expiration_date: Some(
                self.expiration_date
                    .unwrap_or_else(|| default_expiration_date(production)),
            ),
            status: Some(BatchStatus::Created.to_string()),
            notes: if self.notes.trim().is_empty() {
                None
            } else {
                Some(self.notes)
            },
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wizard_steps() {
        let mut draft = BatchDraft::default();
        assert_eq!(draft.check_step(1), Err("Please select a product".into()));
        draft.product_id = Some(3);
        assert_eq!(draft.check_step(1), Ok(()));
        assert_eq!(draft.check_step(2), Err("Please enter a valid quantity".into()));
        draft.quantity = 50;
        assert_eq!(draft.check_step(2), Err("Please select a production date".into()));
        draft.production_date = Some(day(2024, 3, 1));
        assert_eq!(draft.check_step(2), Ok(()));
        assert_eq!(draft.check_step(3), Ok(()));
    }

    #[test]
    fn test_batch_search_matches_code_or_product() {
        let b = Batch {
            batch_code: Some("TOM-20240301-042".into()),
            product_name: Some("Cherry Tomatoes".into()),
            ..Default::default()
        };
        assert!(b.matches(""));
        assert!(b.matches("tom-2024"));
        assert!(b.matches("CHERRY"));
        assert!(!b.matches("carrot"));
        assert!(!Batch::default().matches("x"));
    }

    #[test]
    fn test_status_round_trip_strings() {
        for st in BatchStatus::all() {
            assert_eq!(st.as_str().parse::<BatchStatus>(), Ok(*st));
        }
        assert!("LOST".parse::<BatchStatus>().is_err());
    }

    #[test]
    fn test_badge_classes() {
        assert_eq!(status_badge_class("IN_TRANSIT"), "badge-warning");
        assert_eq!(status_badge_class("RECALLED"), "badge-danger");
        assert_eq!(status_badge_class("WHATEVER"), "badge-secondary");
    }

    #[test]
    fn test_format_batch_code() {
        assert_eq!(format_batch_code("Organic Apples", day(2025, 4, 18), 1), "ORG-20250418-001");
        assert_eq!(format_batch_code("", day(2025, 4, 18), 42), "PRD-20250418-042");
        assert_eq!(format_batch_code("ok", day(2025, 1, 2), 999), "OK-20250102-999");
    }

    #[test]
    fn test_default_expiration_is_six_months() {
        assert_eq!(default_expiration_date(day(2025, 1, 31)), day(2025, 7, 31));
        assert_eq!(default_expiration_date(day(2025, 8, 31)), day(2026, 2, 28));
    }

    #[test]
    fn test_draft_validation() {
        let draft = BatchDraft::default();
        assert_eq!(draft.into_batch().unwrap_err(), "Please select a product");

        let draft = BatchDraft {
            product_id: Some(1),
            ..Default::default()
        };
        assert_eq!(draft.into_batch().unwrap_err(), "Please enter a valid quantity");

        let draft = BatchDraft {
            product_id: Some(1),
            quantity: 10,
            ..Default::default()
        };
        assert_eq!(draft.into_batch().unwrap_err(), "Please select a production date");
    }

    #[test]
    fn test_draft_fills_defaults() {
        let draft = BatchDraft {
            product_id: Some(5),
            product_name: Some("Bananas".into()),
            quantity: 200,
            production_date: Some(day(2025, 4, 10)),
            ..Default::default()
        };
        let batch = draft.into_batch().unwrap();
        assert!(batch.code().starts_with("BAN-20250410-"));
        assert_eq!(batch.expiration_date, Some(day(2025, 10, 10)));
        assert_eq!(batch.status(), Some(BatchStatus::Created));
        assert_eq!(batch.notes, None);
    }

    #[test]
    fn test_truncate_hash() {
        assert_eq!(truncate_hash("0xabc"), "0xabc");
        assert_eq!(
            truncate_hash("0x1234567890abcdef1234"),
            "0x123456…1234"
        );
    }

    #[test]
    fn test_batch_json_from_backend() {
        let json = r#"{
            "id": 11,
            "batchCode": "APL-20250418-001",
            "productId": 3,
            "productName": "Organic Apples",
            "quantity": 500,
            "productionDate": "2025-04-18",
            "status": "IN_TRANSIT",
            "events": [{"eventType": "SHIPPED", "timestamp": "2025-04-19T10:15:30.123"}]
        }"#;
        let batch: Batch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.status(), Some(BatchStatus::InTransit));
        assert_eq!(batch.events.len(), 1);
        assert!(batch.events[0].timestamp.is_some());
    }
}
