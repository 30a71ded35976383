use dioxus::prelude::*;

use super::analytics_view::AnalyticsView;
use super::auth_state::{use_auth, AuthState};
use super::batch_forms::{AddEventForm, BatchCreateWizard, UpdateStatusForm};
use super::batch_qr::BatchQrView;
use super::batch_views::{BatchDetailView, BatchEventsView, BatchListView, BatchStatusList};
use super::dashboard_view::DashboardView;
use super::login_view::LoginView;
use super::product_views::{ProductDetailView, ProductForm, ProductListView};
use super::register_view::RegisterView;
use super::scanner::BatchScanView;
use super::settings_view::SettingsView;
use super::sidebar::Sidebar;
use super::tracking_view::{TrackingSearch, TrackingView};

use harvest_common::batch::BatchStatus;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/login?:redirect")]
    Login { redirect: String },
    #[route("/register")]
    Register {},
    #[route("/tracking")]
    TrackSearch {},
    #[route("/tracking/:code")]
    Tracking { code: String },

    #[layout(AppLayout)]
    #[route("/dashboard")]
    Dashboard {},
    #[route("/products")]
    Products {},
    #[route("/products/new")]
    ProductCreate {},
    #[route("/products/:id")]
    ProductDetail { id: i64 },
    #[route("/products/:id/edit")]
    ProductEdit { id: i64 },
    #[route("/batches")]
    Batches {},
    #[route("/batches/new")]
    BatchCreate {},
    #[route("/batches/scan")]
    BatchScan {},
    #[route("/batches/:id")]
    BatchDetail { id: i64 },
    #[route("/batches/:id/events")]
    BatchEvents { id: i64 },
    #[route("/batches/:id/update-status?:status")]
    BatchUpdateStatus { id: i64, status: String },
    #[route("/batches/:id/add-event")]
    BatchAddEvent { id: i64 },
    #[route("/batches/:id/qr-code")]
    BatchQr { id: i64 },
    #[route("/admin/batches/:id")]
    AdminBatch { id: i64 },
    #[route("/admin/batches/:id/events")]
    AdminBatchEvents { id: i64 },
    #[route("/admin/batches/:id/edit")]
    AdminBatchEdit { id: i64 },
    #[route("/admin/batches/:id/qr-code")]
    AdminBatchQr { id: i64 },
    #[route("/shipments")]
    Shipments {},
    #[route("/inventory")]
    Inventory {},
    #[route("/analytics")]
    Analytics {},
    #[route("/settings")]
    Settings {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

#[component]
pub fn App() -> Element {
    let mut auth = use_context_provider(|| Signal::new(AuthState::new()));

    // Restore and confirm the stored session once
    use_effect(move || {
        spawn(async move {
            let session = auth.peek().session.clone();
            let user = session.init().await.unwrap_or_else(|e| {
                tracing::warn!("could not restore session: {e}");
                None
            });
            let mut state = auth.write();
            state.user = user;
            state.loading = false;
        });
    });

    rsx! { Router::<Route> {} }
}

/// Authenticated shell: sidebar plus the routed page.
#[component]
fn AppLayout() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    let state = auth.read();
    if state.loading {
        return rsx! { div { class: "loading-screen", "Loading..." } };
    }
    if !state.is_authenticated() {
        drop(state);
        nav.replace(Route::Login {
            redirect: String::new(),
        });
        return rsx! {};
    }
    drop(state);

    rsx! {
        div { class: "harvest-app",
            Sidebar {}
            main { class: "app-main",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Home() -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    let state = auth.read();
    if state.loading {
        return rsx! { div { class: "loading-screen", "Loading..." } };
    }
    if state.is_authenticated() {
        nav.replace(Route::Dashboard {});
    } else {
        nav.replace(Route::Login {
            redirect: String::new(),
        });
    }
    rsx! {}
}

#[component]
fn Login(redirect: String) -> Element {
    rsx! { LoginView { redirect } }
}

#[component]
fn Register() -> Element {
    rsx! { RegisterView {} }
}

#[component]
fn TrackSearch() -> Element {
    rsx! { TrackingSearch {} }
}

#[component]
fn Tracking(code: String) -> Element {
    rsx! { TrackingView { code } }
}

#[component]
fn Dashboard() -> Element {
    rsx! { DashboardView {} }
}

#[component]
fn Products() -> Element {
    rsx! { ProductListView {} }
}

#[component]
fn ProductCreate() -> Element {
    rsx! { ProductForm { id: None } }
}

#[component]
fn ProductDetail(id: i64) -> Element {
    rsx! { ProductDetailView { id } }
}

#[component]
fn ProductEdit(id: i64) -> Element {
    rsx! { ProductForm { id: Some(id) } }
}

#[component]
fn Batches() -> Element {
    rsx! { BatchListView {} }
}

#[component]
fn BatchCreate() -> Element {
    rsx! { BatchCreateWizard {} }
}

#[component]
fn BatchScan() -> Element {
    rsx! { BatchScanView {} }
}

#[component]
fn BatchDetail(id: i64) -> Element {
    rsx! { BatchDetailView { id } }
}

#[component]
fn BatchEvents(id: i64) -> Element {
    rsx! { BatchEventsView { id } }
}

#[component]
fn BatchUpdateStatus(id: i64, status: String) -> Element {
    rsx! { UpdateStatusForm { id, preset_status: status } }
}

#[component]
fn BatchAddEvent(id: i64) -> Element {
    rsx! { AddEventForm { id } }
}

#[component]
fn BatchQr(id: i64) -> Element {
    rsx! { BatchQrView { id } }
}

// ── Admin shortcuts from the action panel ──

#[component]
fn AdminBatch(id: i64) -> Element {
    rsx! { BatchDetailView { id } }
}

#[component]
fn AdminBatchEvents(id: i64) -> Element {
    rsx! { BatchEventsView { id } }
}

/// The API only lets a batch change through its status and event log.
#[component]
fn AdminBatchEdit(id: i64) -> Element {
    rsx! { UpdateStatusForm { id, preset_status: String::new() } }
}

#[component]
fn AdminBatchQr(id: i64) -> Element {
    rsx! { BatchQrView { id } }
}

#[component]
fn Shipments() -> Element {
    rsx! {
        BatchStatusList {
            title: "Shipments",
            statuses: vec![BatchStatus::InTransit],
        }
    }
}

#[component]
fn Inventory() -> Element {
    rsx! {
        BatchStatusList {
            title: "Inventory",
            statuses: vec![BatchStatus::Delivered, BatchStatus::AtRetailer],
        }
    }
}

#[component]
fn Analytics() -> Element {
    rsx! { AnalyticsView {} }
}

#[component]
fn Settings() -> Element {
    rsx! { SettingsView {} }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let nav = use_navigator();
    nav.replace(Route::Dashboard {});
    rsx! {}
}
