//! Role-specific landing pages.

use dioxus::prelude::*;

use harvest_client::batches::DEFAULT_EXPIRING_DAYS;
use harvest_common::analytics::{active_batch_count, most_recent, AnalyticsSummary, Count};
use harvest_common::batch::{Batch, BatchStatus};
use harvest_common::role::UserRole;

use super::app::Route;
use super::auth_state::{use_api, use_auth};
use super::batch_views::BatchTable;
use super::weather_widget::WeatherWidget;

const DASHBOARD_FAILED: &str = "Failed to load dashboard data. Please try again later.";

#[component]
pub fn DashboardView() -> Element {
    let auth = use_auth();
    let state = auth.read();
    let name = state
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_default();
    let role = state.role();
    drop(state);

    let body = match role {
        Some(UserRole::Farmer) => rsx! { FarmerDashboard {} },
        Some(UserRole::Distributor) => rsx! {
            StatusDashboard {
                heading: "Shipments in transit",
                statuses: vec![BatchStatus::InTransit],
            }
        },
        Some(UserRole::Retailer) => rsx! {
            StatusDashboard {
                heading: "Stock on hand",
                statuses: vec![BatchStatus::Delivered, BatchStatus::AtRetailer],
            }
        },
        Some(UserRole::Admin) => rsx! { AdminDashboard {} },
        Some(UserRole::Consumer) | None => rsx! { ConsumerDashboard {} },
    };

    rsx! {
        div { class: "dashboard",
            h2 { "Welcome back, {name}" }
            {body}
        }
    }
}

#[component]
pub fn StatCard(label: &'static str, value: usize) -> Element {
    rsx! {
        div { class: "stat-card",
            span { class: "stat-value", "{value}" }
            span { class: "stat-label", "{label}" }
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq)]
struct FarmerStats {
    products: usize,
    batches: usize,
    expiring: usize,
    active: usize,
}

#[component]
fn FarmerDashboard() -> Element {
    let auth = use_auth();
    let api = use_api();
    let mut stats = use_signal(FarmerStats::default);
    let mut recent = use_signal(Vec::<Batch>::new);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| true);

    let location = auth.read().user.as_ref().and_then(|u| u.location());

    use_effect(move || {
        let api = api.clone();
        spawn(async move {
            let products = api.products();
            let batches = api.batches();
            let (mine, batch_list, expiring) = futures::join!(
                products.mine(),
                batches.mine(),
                batches.expiring(DEFAULT_EXPIRING_DAYS),
            );
            match (mine, batch_list, expiring) {
                (Ok(p), Ok(b), Ok(e)) => {
                    stats.set(FarmerStats {
                        products: p.len(),
                        batches: b.len(),
                        expiring: e.len(),
                        active: active_batch_count(&b),
                    });
                    recent.set(most_recent(b, 5));
                }
                (p, b, e) => {
                    let err = [p.err(), b.err(), e.err()].into_iter().flatten().next();
                    if let Some(err) = err {
                        tracing::error!("dashboard fetch failed: {err}");
                        error_msg.set(Some(err.user_message(DASHBOARD_FAILED)));
                    }
                }
            }
            loading.set(false);
        });
    });

    let s = stats();

    rsx! {
        if let Some(ref err) = *error_msg.read() {
            div { class: "alert alert-error", "{err}" }
        }

        div { class: "stat-grid",
            StatCard { label: "Products", value: s.products }
            StatCard { label: "Batches", value: s.batches }
            StatCard { label: "Active Batches", value: s.active }
            StatCard { label: "Expiring in 7 days", value: s.expiring }
        }

        div { class: "quick-actions",
            Link { class: "button", to: Route::ProductCreate {}, "Add Product" }
            Link { class: "button", to: Route::BatchCreate {}, "Create Batch" }
            Link { class: "button", to: Route::BatchScan {}, "Scan QR Code" }
        }

        div { class: "dashboard-columns",
            div { class: "card",
                h3 { "Recent Batches" }
                if loading() {
                    p { "Loading..." }
                } else {
                    BatchTable { batches: recent() }
                }
            }
            WeatherWidget { location }
        }
    }
}

/// Batches the user is handling, filtered by status.
#[component]
fn StatusDashboard(heading: &'static str, statuses: Vec<BatchStatus>) -> Element {
    let api = use_api();
    let mut batches = use_signal(Vec::<Batch>::new);
    let mut error_msg = use_signal(|| None::<String>);

    use_effect(move || {
        let api = api.clone();
        let statuses = statuses.clone();
        spawn(async move {
            let service = api.batches();
            let mut found = Vec::new();
            for status in statuses {
                match service.by_status(status.as_str()).await {
                    Ok(list) => found.extend(list),
                    Err(e) => {
                        error_msg.set(Some(e.user_message(DASHBOARD_FAILED)));
                        return;
                    }
                }
            }
            batches.set(found);
        });
    });

    rsx! {
        if let Some(ref err) = *error_msg.read() {
            div { class: "alert alert-error", "{err}" }
        }
        div { class: "quick-actions",
            Link { class: "button", to: Route::BatchScan {}, "Scan QR Code" }
            Link { class: "button", to: Route::Batches {}, "All Batches" }
        }
        div { class: "card",
            h3 { "{heading} ({batches.read().len()})" }
            BatchTable { batches: batches() }
        }
    }
}

#[component]
fn AdminDashboard() -> Element {
    let api = use_api();
    let mut summary = use_signal(AnalyticsSummary::default);
    let mut distribution = use_signal(Vec::<Count>::new);

    use_effect(move || {
        let api = api.clone();
        spawn(async move {
            let analytics = api.analytics();
            let (s, d) = futures::join!(analytics.summary(), analytics.batch_status_distribution());
            summary.set(s);
            distribution.set(d);
        });
    });

    let s = summary();

    rsx! {
        div { class: "stat-grid",
            StatCard { label: "Products", value: s.total_products }
            StatCard { label: "Batches", value: s.total_batches }
            StatCard { label: "Active Shipments", value: s.active_shipments }
            StatCard { label: "Expiring in 14 days", value: s.expiring_batches }
        }
        div { class: "card",
            h3 { "Batches by status" }
            ul { class: "distribution",
                for c in distribution.read().iter() {
                    li { key: "{c.key}", "{c.key}: {c.count}" }
                }
            }
        }
        div { class: "quick-actions",
            Link { class: "button", to: Route::Analytics {}, "Open Analytics" }
            Link { class: "button", to: Route::Batches {}, "Manage Batches" }
        }
    }
}

#[component]
fn ConsumerDashboard() -> Element {
    rsx! {
        div { class: "card",
            h3 { "Where does your food come from?" }
            p { "Scan the QR code on a package or enter its batch code to see its journey from the farm." }
            Link { class: "button", to: Route::TrackSearch {}, "Track a Product" }
        }
    }
}
