//! Sidebar entries and batch quick links, filtered by role.

use crate::role::UserRole;

use UserRole::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    /// Empty means every role.
    pub roles: &'static [UserRole],
}

impl NavItem {
    pub fn visible_to(&self, role: Option<UserRole>) -> bool {
        match role {
            None => true,
            Some(r) => self.roles.is_empty() || self.roles.contains(&r),
        }
    }
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        path: "/dashboard",
        icon: "home",
        roles: &[],
    },
    NavItem {
        label: "Products",
        path: "/products",
        icon: "package",
        roles: &[Farmer, Admin],
    },
    NavItem {
        label: "Batches",
        path: "/batches",
        icon: "layers",
        roles: &[Farmer, Distributor, Retailer, Admin],
    },
    NavItem {
        label: "Shipments",
        path: "/shipments",
        icon: "truck",
        roles: &[Distributor, Admin],
    },
    NavItem {
        label: "Inventory",
        path: "/inventory",
        icon: "archive",
        roles: &[Retailer, Admin],
    },
    NavItem {
        label: "Analytics",
        path: "/analytics",
        icon: "bar-chart-2",
        roles: &[Farmer, Distributor, Retailer, Admin],
    },
    NavItem {
        label: "Track Product",
        path: "/tracking",
        icon: "search",
        roles: &[],
    },
    NavItem {
        label: "Settings",
        path: "/settings",
        icon: "settings",
        roles: &[],
    },
];

/// Sidebar entries for `role`. With no known role everything is shown.
pub fn nav_items_for(role: Option<UserRole>) -> Vec<&'static NavItem> {
    NAV_ITEMS.iter().filter(|i| i.visible_to(role)).collect()
}

// ─── Batch quick links ───

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickLink {
    pub label: &'static str,
    pub path: String,
}

#[derive(Debug, Clone, Copy)]
enum Audience {
    Everyone,
    Staff,
    Only(&'static [UserRole]),
}

impl Audience {
    fn includes(self, role: Option<UserRole>) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Staff => !matches!(role, Some(Consumer)),
            Audience::Only(roles) => role.is_some_and(|r| roles.contains(&r)),
        }
    }
}

/// Links shown under a scanned batch. `batch_code` is used only for the
/// public journey link.
pub fn batch_quick_links(role: Option<UserRole>, batch_id: i64, batch_code: &str) -> Vec<QuickLink> {
    let base = format!("/batches/{batch_id}");
    let links: [(&'static str, String, Audience); 8] = [
        ("View Details", base.clone(), Audience::Everyone),
        ("View Events", format!("{base}/events"), Audience::Everyone),
        ("Update Status", format!("{base}/update-status"), Audience::Staff),
        ("Add Event", format!("{base}/add-event"), Audience::Staff),
        (
            "Check In Shipment",
            format!("{base}/update-status?status=DELIVERED"),
            Audience::Only(&[Distributor, Retailer]),
        ),
        ("QR Code", format!("{base}/qr-code"), Audience::Staff),
        ("View Journey", format!("/tracking/{batch_code}"), Audience::Everyone),
        (
            "Mark as Sold",
            format!("{base}/update-status?status=SOLD"),
            Audience::Only(&[Retailer]),
        ),
    ];
    links
        .into_iter()
        .filter(|(_, _, audience)| audience.includes(role))
        .map(|(label, path, _)| QuickLink { label, path })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(role: Option<UserRole>) -> Vec<&'static str> {
        nav_items_for(role).iter().map(|i| i.label).collect()
    }

    #[test]
    fn test_consumer_sidebar() {
        assert_eq!(
            labels(Some(Consumer)),
            ["Dashboard", "Track Product", "Settings"]
        );
    }

    #[test]
    fn test_distributor_sidebar() {
        assert_eq!(
            labels(Some(Distributor)),
            ["Dashboard", "Batches", "Shipments", "Analytics", "Track Product", "Settings"]
        );
    }

    #[test]
    fn test_unknown_role_sees_everything() {
        assert_eq!(labels(None).len(), NAV_ITEMS.len());
        assert_eq!(labels(Some(Admin)).len(), NAV_ITEMS.len());
    }

    #[test]
    fn test_retailer_quick_links() {
        let links = batch_quick_links(Some(Retailer), 12, "APL-20240101-001");
        let labels: Vec<_> = links.iter().map(|l| l.label).collect();
        assert_eq!(
            labels,
            [
                "View Details",
                "View Events",
                "Update Status",
                "Add Event",
                "Check In Shipment",
                "QR Code",
                "View Journey",
                "Mark as Sold"
            ]
        );
        assert_eq!(links[7].path, "/batches/12/update-status?status=SOLD");
        assert_eq!(links[6].path, "/tracking/APL-20240101-001");
    }

    #[test]
    fn test_consumer_quick_links() {
        let labels: Vec<_> = batch_quick_links(Some(Consumer), 1, "X")
            .into_iter()
            .map(|l| l.label)
            .collect();
        assert_eq!(labels, ["View Details", "View Events", "View Journey"]);
    }

    #[test]
    fn test_farmer_has_no_shipment_check_in() {
        let links = batch_quick_links(Some(Farmer), 1, "X");
        assert!(links.iter().all(|l| l.label != "Check In Shipment"));
        assert!(links.iter().all(|l| l.label != "Mark as Sold"));
    }
}
