//! Suggested status transitions for the batch event log.
//!
//! These tables only pre-fill forms. The user can override every suggestion
//! and the backend decides what is actually allowed.

use crate::batch::BatchStatus;

pub mod event_types {
    pub const CREATED: &str = "CREATED";
    pub const HARVESTED: &str = "HARVESTED";
    pub const STORED: &str = "STORED";
    pub const PACKAGED: &str = "PACKAGED";
    pub const PROCESSED: &str = "PROCESSED";
    pub const SHIPPED: &str = "SHIPPED";
    pub const RECEIVED: &str = "RECEIVED";
    pub const IN_TRANSIT: &str = "IN_TRANSIT";
    pub const DELIVERED: &str = "DELIVERED";
    pub const STOCKED: &str = "STOCKED";
    pub const SOLD: &str = "SOLD";
    pub const PARTIAL_SALE: &str = "PARTIAL_SALE";
    pub const QUALITY_CHECK: &str = "QUALITY_CHECK";
    pub const RECALLED: &str = "RECALLED";
    pub const DISPOSED: &str = "DISPOSED";
    pub const CUSTOM_EVENT: &str = "CUSTOM_EVENT";
}

use event_types as ev;

/// A `(value, label)` pair for a select input.
pub type SelectOption = (&'static str, &'static str);

/// Status implied by recording `event_type`; unknown events keep `current`.
pub fn event_type_to_status(event_type: &str, current: &str) -> String {
    let mapped = match event_type {
        ev::HARVESTED => Some(BatchStatus::Harvested),
        ev::STORED => Some(BatchStatus::InStorage),
        ev::SHIPPED => Some(BatchStatus::InTransit),
        ev::RECEIVED => Some(BatchStatus::Delivered),
        ev::DELIVERED => Some(BatchStatus::AtRetailer),
        ev::SOLD => Some(BatchStatus::Sold),
        ev::RECALLED => Some(BatchStatus::Recalled),
        _ => None,
    };
    mapped
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| current.to_string())
}

/// Default event type on the status update form for a batch in `status`.
pub fn status_to_event_type(status: &str) -> &'static str {
    match status.parse::<BatchStatus>() {
        Ok(BatchStatus::Created) => ev::HARVESTED,
        Ok(BatchStatus::Harvested) => ev::STORED,
        Ok(BatchStatus::InStorage) => ev::SHIPPED,
        Ok(BatchStatus::InTransit) => ev::RECEIVED,
        Ok(BatchStatus::AtRetailer) => ev::SOLD,
        _ => ev::QUALITY_CHECK,
    }
}

/// Default event type on the add-event form for a batch in `status`.
///
/// Differs from [`status_to_event_type`] only for `HARVESTED`, which suggests
/// a quality check instead of storage.
pub fn suggest_event_type(status: &str) -> &'static str {
    match status.parse::<BatchStatus>() {
        Ok(BatchStatus::Created) => ev::HARVESTED,
        Ok(BatchStatus::InStorage) => ev::SHIPPED,
        Ok(BatchStatus::InTransit) => ev::RECEIVED,
        Ok(BatchStatus::AtRetailer) => ev::SOLD,
        _ => ev::QUALITY_CHECK,
    }
}

/// Every status a batch can be set to, in lifecycle order.
pub fn status_options() -> Vec<SelectOption> {
    BatchStatus::all()
        .iter()
        .map(|s| (s.as_str(), s.label()))
        .collect()
}

/// Event types offered on the status update page.
pub const STATUS_UPDATE_EVENT_OPTIONS: &[SelectOption] = &[
    (ev::CREATED, "Created"),
    (ev::HARVESTED, "Harvested"),
    (ev::STORED, "Stored"),
    (ev::SHIPPED, "Shipped"),
    (ev::RECEIVED, "Received"),
    (ev::QUALITY_CHECK, "Quality Check"),
    (ev::PROCESSED, "Processed"),
    (ev::PACKAGED, "Packaged"),
    (ev::DELIVERED, "Delivered"),
    (ev::SOLD, "Sold"),
    (ev::RECALLED, "Recalled"),
];

/// Event types offered on the add-event page.
pub const ADD_EVENT_OPTIONS: &[SelectOption] = &[
    (ev::HARVESTED, "Harvested"),
    (ev::QUALITY_CHECK, "Quality Check"),
    (ev::STORED, "Stored"),
    (ev::SHIPPED, "Shipped"),
    (ev::RECEIVED, "Received"),
    (ev::PROCESSED, "Processed"),
    (ev::PACKAGED, "Packaged"),
    (ev::DELIVERED, "Delivered"),
    (ev::SOLD, "Sold"),
];

/// Human label for an event type string, falling back to the raw value.
pub fn event_type_label(event_type: &str) -> String {
    STATUS_UPDATE_EVENT_OPTIONS
        .iter()
        .chain(crate::actions::ALL_EXTRA_EVENT_OPTIONS.iter())
        .find(|(value, _)| *value == event_type)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| title_case(event_type))
}

fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_to_status() {
        assert_eq!(event_type_to_status("HARVESTED", "CREATED"), "HARVESTED");
        assert_eq!(event_type_to_status("STORED", "HARVESTED"), "IN_STORAGE");
        assert_eq!(event_type_to_status("SHIPPED", "IN_STORAGE"), "IN_TRANSIT");
        assert_eq!(event_type_to_status("RECEIVED", "IN_TRANSIT"), "DELIVERED");
        assert_eq!(event_type_to_status("DELIVERED", "DELIVERED"), "AT_RETAILER");
        assert_eq!(event_type_to_status("SOLD", "AT_RETAILER"), "SOLD");
        assert_eq!(event_type_to_status("RECALLED", "SOLD"), "RECALLED");
    }

    #[test]
    fn test_unmapped_event_keeps_current_status() {
        assert_eq!(event_type_to_status("QUALITY_CHECK", "IN_STORAGE"), "IN_STORAGE");
        assert_eq!(event_type_to_status("PACKAGED", "HARVESTED"), "HARVESTED");
        assert_eq!(event_type_to_status("", "CREATED"), "CREATED");
    }

    #[test]
    fn test_status_to_event_type() {
        assert_eq!(status_to_event_type("CREATED"), "HARVESTED");
        assert_eq!(status_to_event_type("HARVESTED"), "STORED");
        assert_eq!(status_to_event_type("IN_STORAGE"), "SHIPPED");
        assert_eq!(status_to_event_type("IN_TRANSIT"), "RECEIVED");
        assert_eq!(status_to_event_type("DELIVERED"), "QUALITY_CHECK");
        assert_eq!(status_to_event_type("AT_RETAILER"), "SOLD");
        assert_eq!(status_to_event_type("SOLD"), "QUALITY_CHECK");
        assert_eq!(status_to_event_type(""), "QUALITY_CHECK");
    }

    #[test]
    fn test_suggest_event_type_differs_after_harvest() {
        assert_eq!(suggest_event_type("CREATED"), "HARVESTED");
        assert_eq!(suggest_event_type("HARVESTED"), "QUALITY_CHECK");
        assert_eq!(suggest_event_type("IN_STORAGE"), "SHIPPED");
        assert_eq!(suggest_event_type("IN_TRANSIT"), "RECEIVED");
        assert_eq!(suggest_event_type("DELIVERED"), "QUALITY_CHECK");
        assert_eq!(suggest_event_type("AT_RETAILER"), "SOLD");
        assert_eq!(suggest_event_type("RECALLED"), "QUALITY_CHECK");
    }

    #[test]
    fn test_status_options_cover_all_statuses() {
        let opts = status_options();
        assert_eq!(opts.len(), 9);
        assert_eq!(opts[0], ("CREATED", "Created"));
        assert_eq!(opts[5], ("AT_RETAILER", "At Retailer"));
    }

    #[test]
    fn test_event_type_label() {
        assert_eq!(event_type_label("QUALITY_CHECK"), "Quality Check");
        assert_eq!(event_type_label("SPOILAGE"), "Spoilage");
        assert_eq!(event_type_label("COLD_CHAIN_BREACH"), "Cold Chain Breach");
    }
}
