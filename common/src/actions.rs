//! Per-role actions offered on a batch's tracking page.

use crate::batch::BatchEvent;
use crate::lifecycle::{event_type_to_status, event_types as ev, SelectOption};
use crate::role::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleAction {
    QualityCheck,
    UpdateStatus,
    RecordConditions,
    PrepareShipment,
    RecordPickup,
    LogTransport,
    RecordDelivery,
    ReportIssue,
    ReceiveBatch,
    CheckQuality,
    RecordSale,
    ReportWaste,
    CreateEvent,
    ViewAllData,
    ManageBatch,
    VerifyAuthenticity,
    ProvideFeedback,
}

/// What the panel shows once an action is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionView {
    /// Event type from the role's list, location, temperature, humidity, notes.
    EventForm,
    /// Issue type, location and description, all required.
    IssueForm,
    /// Sale type and location required.
    SaleForm,
    /// Feedback type and text required.
    FeedbackForm,
    /// Static confirmation that the batch is registered.
    Verification,
    /// Links into the admin area.
    AdminLinks,
    /// Nothing to render.
    Empty,
}

impl RoleAction {
    pub fn id(self) -> &'static str {
        match self {
            RoleAction::QualityCheck => "quality-check",
            RoleAction::UpdateStatus => "update-status",
            RoleAction::RecordConditions => "record-conditions",
            RoleAction::PrepareShipment => "prepare-shipment",
            RoleAction::RecordPickup => "record-pickup",
            RoleAction::LogTransport => "log-transport",
            RoleAction::RecordDelivery => "record-delivery",
            RoleAction::ReportIssue => "report-issue",
            RoleAction::ReceiveBatch => "receive-batch",
            RoleAction::CheckQuality => "check-quality",
            RoleAction::RecordSale => "record-sale",
            RoleAction::ReportWaste => "report-waste",
            RoleAction::CreateEvent => "create-event",
            RoleAction::ViewAllData => "view-all-data",
            RoleAction::ManageBatch => "manage-batch",
            RoleAction::VerifyAuthenticity => "verify-authenticity",
            RoleAction::ProvideFeedback => "provide-feedback",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        use RoleAction::*;
        [
            QualityCheck,
            UpdateStatus,
            RecordConditions,
            PrepareShipment,
            RecordPickup,
            LogTransport,
            RecordDelivery,
            ReportIssue,
            ReceiveBatch,
            CheckQuality,
            RecordSale,
            ReportWaste,
            CreateEvent,
            ViewAllData,
            ManageBatch,
            VerifyAuthenticity,
            ProvideFeedback,
        ]
        .into_iter()
        .find(|a| a.id() == id)
    }

    pub fn view(self) -> ActionView {
        match self {
            RoleAction::QualityCheck
            | RoleAction::UpdateStatus
            | RoleAction::RecordConditions
            | RoleAction::RecordPickup
            | RoleAction::LogTransport
            | RoleAction::RecordDelivery
            | RoleAction::ReceiveBatch
            | RoleAction::CheckQuality
            | RoleAction::CreateEvent => ActionView::EventForm,
            RoleAction::ReportIssue | RoleAction::ReportWaste => ActionView::IssueForm,
            RoleAction::RecordSale => ActionView::SaleForm,
            RoleAction::ProvideFeedback => ActionView::FeedbackForm,
            RoleAction::VerifyAuthenticity => ActionView::Verification,
            RoleAction::ViewAllData | RoleAction::ManageBatch => ActionView::AdminLinks,
            RoleAction::PrepareShipment => ActionView::Empty,
        }
    }

    /// Whether completing this action ever talks to the backend.
    pub fn submits(self) -> bool {
        matches!(
            self.view(),
            ActionView::EventForm
                | ActionView::IssueForm
                | ActionView::SaleForm
                | ActionView::FeedbackForm
        )
    }
}

/// An action as shown on the panel for a particular role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub action: RoleAction,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const fn entry(
    action: RoleAction,
    label: &'static str,
    icon: &'static str,
    color: &'static str,
) -> ActionSpec {
    ActionSpec {
        action,
        label,
        icon,
        color,
    }
}

const FARMER_ACTIONS: &[ActionSpec] = &[
    entry(RoleAction::QualityCheck, "Record Quality Check", "check-circle", "primary"),
    entry(RoleAction::UpdateStatus, "Update Batch Status", "refresh-cw", "secondary"),
    entry(RoleAction::RecordConditions, "Record Storage Conditions", "thermometer", "info"),
    entry(RoleAction::PrepareShipment, "Prepare for Shipment", "package", "warning"),
];

const DISTRIBUTOR_ACTIONS: &[ActionSpec] = &[
    entry(RoleAction::RecordPickup, "Record Pickup", "truck", "secondary"),
    entry(RoleAction::LogTransport, "Log Transport Conditions", "activity", "primary"),
    entry(RoleAction::RecordDelivery, "Record Delivery", "map-pin", "success"),
    entry(RoleAction::ReportIssue, "Report Issue", "alert-triangle", "danger"),
];

const RETAILER_ACTIONS: &[ActionSpec] = &[
    entry(RoleAction::ReceiveBatch, "Receive Batch", "clipboard", "primary"),
    entry(RoleAction::CheckQuality, "Quality Inspection", "check-square", "info"),
    entry(RoleAction::RecordSale, "Record Sale", "shopping-cart", "success"),
    entry(RoleAction::ReportWaste, "Report Waste/Loss", "trash", "danger"),
];

const ADMIN_ACTIONS: &[ActionSpec] = &[
    entry(RoleAction::UpdateStatus, "Update Status", "edit", "primary"),
    entry(RoleAction::QualityCheck, "Quality Check", "check-circle", "success"),
    entry(RoleAction::CreateEvent, "Create Custom Event", "plus-circle", "secondary"),
    entry(RoleAction::ViewAllData, "View Complete Data", "database", "info"),
    entry(RoleAction::ManageBatch, "Batch Management", "settings", "warning"),
];

const CONSUMER_ACTIONS: &[ActionSpec] = &[
    entry(RoleAction::VerifyAuthenticity, "Verify Authenticity", "shield", "primary"),
    entry(RoleAction::ProvideFeedback, "Provide Feedback", "message-square", "secondary"),
];

/// Actions for a signed-in user. A role the client does not know gets the
/// consumer set.
pub fn actions_for_role(role: Option<UserRole>) -> &'static [ActionSpec] {
    match role {
        Some(UserRole::Farmer) => FARMER_ACTIONS,
        Some(UserRole::Distributor) => DISTRIBUTOR_ACTIONS,
        Some(UserRole::Retailer) => RETAILER_ACTIONS,
        Some(UserRole::Admin) => ADMIN_ACTIONS,
        Some(UserRole::Consumer) | None => CONSUMER_ACTIONS,
    }
}

/// Event types offered on the event form for `role`.
pub fn event_type_options(role: Option<UserRole>) -> Vec<SelectOption> {
    let mut options = vec![(ev::QUALITY_CHECK, "Quality Check")];
    let extra: &[SelectOption] = match role {
        Some(UserRole::Farmer) => &[
            (ev::HARVESTED, "Harvested"),
            (ev::STORED, "Stored"),
            (ev::PACKAGED, "Packaged"),
            (ev::SHIPPED, "Shipped"),
        ],
        Some(UserRole::Distributor) => &[
            (ev::RECEIVED, "Received"),
            (ev::IN_TRANSIT, "In Transit"),
            (ev::DELIVERED, "Delivered"),
        ],
        Some(UserRole::Retailer) => &[
            (ev::RECEIVED, "Received"),
            (ev::STOCKED, "Stocked"),
            (ev::SOLD, "Sold"),
        ],
        Some(UserRole::Admin) => &[
            (ev::HARVESTED, "Harvested"),
            (ev::STORED, "Stored"),
            (ev::PACKAGED, "Packaged"),
            (ev::SHIPPED, "Shipped"),
            (ev::RECEIVED, "Received"),
            (ev::IN_TRANSIT, "In Transit"),
            (ev::DELIVERED, "Delivered"),
            (ev::STOCKED, "Stocked"),
            (ev::SOLD, "Sold"),
            (ev::RECALLED, "Recalled"),
            (ev::DISPOSED, "Disposed"),
            (ev::CUSTOM_EVENT, "Custom Event"),
        ],
        Some(UserRole::Consumer) | None => &[],
    };
    options.extend_from_slice(extra);
    options
}

pub const ISSUE_TYPES: &[SelectOption] = &[
    ("QUALITY_ISSUE", "Quality Issue"),
    ("DAMAGE", "Damage"),
    ("SPOILAGE", "Spoilage"),
    ("PACKAGING_ISSUE", "Packaging Issue"),
    ("OTHER_ISSUE", "Other Issue"),
];

pub const SALE_TYPES: &[SelectOption] = &[(ev::SOLD, "Complete Sale"), (ev::PARTIAL_SALE, "Partial Sale")];

pub const FEEDBACK_TYPES: &[SelectOption] = &[
    ("CONSUMER_REVIEW", "Product Review"),
    ("QUALITY_FEEDBACK", "Quality Feedback"),
    ("SUGGESTION", "Suggestion"),
];

/// Event types that only appear on the panel's special forms, for labelling.
pub const ALL_EXTRA_EVENT_OPTIONS: &[SelectOption] = &[
    ("QUALITY_ISSUE", "Quality Issue"),
    ("DAMAGE", "Damage"),
    ("SPOILAGE", "Spoilage"),
    ("PACKAGING_ISSUE", "Packaging Issue"),
    ("OTHER_ISSUE", "Other Issue"),
    (ev::PARTIAL_SALE, "Partial Sale"),
    ("CONSUMER_REVIEW", "Product Review"),
    ("QUALITY_FEEDBACK", "Quality Feedback"),
    ("SUGGESTION", "Suggestion"),
    (ev::IN_TRANSIT, "In Transit"),
    (ev::STOCKED, "Stocked"),
    (ev::DISPOSED, "Disposed"),
    (ev::CUSTOM_EVENT, "Custom Event"),
];

/// Type options for the select on a given view.
pub fn type_options(view: ActionView, role: Option<UserRole>) -> Vec<SelectOption> {
    match view {
        ActionView::EventForm => event_type_options(role),
        ActionView::IssueForm => ISSUE_TYPES.to_vec(),
        ActionView::SaleForm => SALE_TYPES.to_vec(),
        ActionView::FeedbackForm => FEEDBACK_TYPES.to_vec(),
        _ => Vec::new(),
    }
}

/// Raw form state. Numeric fields stay strings until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionForm {
    pub event_type: String,
    pub location: String,
    pub temperature: String,
    pub humidity: String,
    pub notes: String,
}

impl ActionForm {
    /// Check the fields `view` marks as required and build the event body.
    pub fn to_event(&self, view: ActionView) -> Result<BatchEvent, String> {
        if self.event_type.trim().is_empty() {
            return Err("Please select a type".into());
        }
        let location_required = matches!(view, ActionView::IssueForm | ActionView::SaleForm);
        if location_required && self.location.trim().is_empty() {
            return Err("Location is required".into());
        }
        let notes_required = matches!(view, ActionView::IssueForm | ActionView::FeedbackForm);
        if notes_required && self.notes.trim().is_empty() {
            return Err("Please add a description".into());
        }

        Ok(BatchEvent {
            event_type: self.event_type.trim().to_string(),
            location: non_empty(&self.location),
            temperature: parse_reading(&self.temperature, "Temperature")?,
            humidity: parse_reading(&self.humidity, "Humidity")?,
            notes: non_empty(&self.notes),
            ..Default::default()
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn parse_reading(raw: &str, name: &str) -> Result<Option<f64>, String> {
    let t = raw.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| format!("{name} must be a number"))
}

/// The single request a submitted action turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSubmission {
    UpdateStatus {
        batch_id: i64,
        status: String,
        event: BatchEvent,
    },
    AddEvent {
        batch_id: i64,
        event: BatchEvent,
    },
}

pub const MISSING_BATCH_ID: &str = "Batch ID is missing, please reload the page.";

/// Decide which request a submitted form becomes.
///
/// Status updates send the status implied by the event type, or the current
/// status when the event type implies none.
pub fn plan_submission(
    action: RoleAction,
    batch_id: Option<i64>,
    current_status: &str,
    form: &ActionForm,
) -> Result<ActionSubmission, String> {
    let batch_id = batch_id.ok_or(MISSING_BATCH_ID)?;
    let event = form.to_event(action.view())?;
    if action == RoleAction::UpdateStatus {
        let status = event_type_to_status(&event.event_type, current_status);
        Ok(ActionSubmission::UpdateStatus {
            batch_id,
            status,
            event,
        })
    } else {
        Ok(ActionSubmission::AddEvent { batch_id, event })
    }
}

pub fn verification_message(product_name: &str, batch_code: &str) -> String {
    format!(
        "This {product_name} (Batch: {batch_code}) is authentic and properly registered in our system."
    )
}

/// Where the log-in prompt returns to after signing in.
pub fn login_return_url(batch_code: &str) -> String {
    format!("/tracking/{batch_code}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLink {
    pub label: &'static str,
    pub path: String,
}

pub fn admin_links(action: RoleAction, batch_id: i64) -> Vec<AdminLink> {
    let link = |label, suffix: &str| AdminLink {
        label,
        path: format!("/admin/batches/{batch_id}{suffix}"),
    };
    match action {
        RoleAction::ViewAllData => vec![link("View Details", ""), link("View Events", "/events")],
        RoleAction::ManageBatch => vec![link("Edit Batch", "/edit"), link("QR Code", "/qr-code")],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: Option<UserRole>) -> Vec<&'static str> {
        actions_for_role(role).iter().map(|a| a.action.id()).collect()
    }

    fn labels(role: Option<UserRole>) -> Vec<&'static str> {
        actions_for_role(role).iter().map(|a| a.label).collect()
    }

    #[test]
    fn test_farmer_actions() {
        assert_eq!(
            labels(Some(UserRole::Farmer)),
            [
                "Record Quality Check",
                "Update Batch Status",
                "Record Storage Conditions",
                "Prepare for Shipment"
            ]
        );
    }

    #[test]
    fn test_distributor_actions() {
        assert_eq!(
            ids(Some(UserRole::Distributor)),
            ["record-pickup", "log-transport", "record-delivery", "report-issue"]
        );
    }

    #[test]
    fn test_retailer_actions() {
        assert_eq!(
            labels(Some(UserRole::Retailer)),
            ["Receive Batch", "Quality Inspection", "Record Sale", "Report Waste/Loss"]
        );
    }

    #[test]
    fn test_admin_actions() {
        assert_eq!(
            ids(Some(UserRole::Admin)),
            ["update-status", "quality-check", "create-event", "view-all-data", "manage-batch"]
        );
        assert_eq!(labels(Some(UserRole::Admin))[0], "Update Status");
    }

    #[test]
    fn test_consumer_and_unknown_roles_share_actions() {
        assert_eq!(
            labels(Some(UserRole::Consumer)),
            ["Verify Authenticity", "Provide Feedback"]
        );
        assert_eq!(ids(None), ids(Some(UserRole::Consumer)));
    }

    #[test]
    fn test_verify_authenticity_never_submits() {
        assert_eq!(RoleAction::VerifyAuthenticity.view(), ActionView::Verification);
        assert!(!RoleAction::VerifyAuthenticity.submits());
        assert!(!RoleAction::ViewAllData.submits());
        assert!(!RoleAction::PrepareShipment.submits());
        assert!(RoleAction::ReportWaste.submits());
    }

    #[test]
    fn test_ids_round_trip() {
        for role in UserRole::all() {
            for a in actions_for_role(Some(*role)) {
                assert_eq!(RoleAction::from_id(a.action.id()), Some(a.action));
            }
        }
        assert_eq!(RoleAction::from_id("fly"), None);
    }

    #[test]
    fn test_event_type_options_per_role() {
        let farmer: Vec<_> = event_type_options(Some(UserRole::Farmer))
            .into_iter()
            .map(|(v, _)| v)
            .collect();
        assert_eq!(farmer, ["QUALITY_CHECK", "HARVESTED", "STORED", "PACKAGED", "SHIPPED"]);
        assert_eq!(event_type_options(Some(UserRole::Consumer)).len(), 1);
        assert_eq!(event_type_options(Some(UserRole::Admin)).len(), 13);
    }

    #[test]
    fn test_update_status_maps_event_to_status() {
        let form = ActionForm {
            event_type: "SHIPPED".into(),
            location: "Depot 4".into(),
            temperature: "4.5".into(),
            ..Default::default()
        };
        let plan = plan_submission(RoleAction::UpdateStatus, Some(9), "IN_STORAGE", &form).unwrap();
        match plan {
            ActionSubmission::UpdateStatus {
                batch_id,
                status,
                event,
            } => {
                assert_eq!(batch_id, 9);
                assert_eq!(status, "IN_TRANSIT");
                assert_eq!(event.temperature, Some(4.5));
                assert_eq!(event.humidity, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_status_with_unmapped_event_keeps_status() {
        let form = ActionForm {
            event_type: "QUALITY_CHECK".into(),
            ..Default::default()
        };
        let plan = plan_submission(RoleAction::UpdateStatus, Some(1), "HARVESTED", &form).unwrap();
        assert!(matches!(
            plan,
            ActionSubmission::UpdateStatus { ref status, .. } if status == "HARVESTED"
        ));
    }

    #[test]
    fn test_other_actions_append_events() {
        let form = ActionForm {
            event_type: "RECEIVED".into(),
            ..Default::default()
        };
        let plan = plan_submission(RoleAction::ReceiveBatch, Some(3), "IN_TRANSIT", &form).unwrap();
        assert!(matches!(plan, ActionSubmission::AddEvent { batch_id: 3, .. }));
    }

    #[test]
    fn test_missing_batch_id_fails_first() {
        let form = ActionForm::default();
        let err = plan_submission(RoleAction::QualityCheck, None, "CREATED", &form).unwrap_err();
        assert_eq!(err, MISSING_BATCH_ID);
    }

    #[test]
    fn test_required_fields_per_view() {
        let mut form = ActionForm {
            event_type: "DAMAGE".into(),
            ..Default::default()
        };
        assert!(form.to_event(ActionView::IssueForm).is_err());
        form.location = "Bay 2".into();
        assert!(form.to_event(ActionView::IssueForm).is_err());
        form.notes = "Crushed crates".into();
        assert!(form.to_event(ActionView::IssueForm).is_ok());

        let sale = ActionForm {
            event_type: "SOLD".into(),
            ..Default::default()
        };
        assert_eq!(sale.to_event(ActionView::SaleForm).unwrap_err(), "Location is required");
    }

    #[test]
    fn test_bad_reading_is_rejected() {
        let form = ActionForm {
            event_type: "QUALITY_CHECK".into(),
            humidity: "wet".into(),
            ..Default::default()
        };
        assert_eq!(
            form.to_event(ActionView::EventForm).unwrap_err(),
            "Humidity must be a number"
        );
    }

    #[test]
    fn test_messages_and_links() {
        assert_eq!(
            verification_message("Organic Apples", "APL-1"),
            "This Organic Apples (Batch: APL-1) is authentic and properly registered in our system."
        );
        assert_eq!(login_return_url("APL-1"), "/tracking/APL-1");
        let links = admin_links(RoleAction::ManageBatch, 4);
        assert_eq!(links[1].path, "/admin/batches/4/qr-code");
        assert!(admin_links(RoleAction::QualityCheck, 4).is_empty());
    }
}
