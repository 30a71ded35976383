//! Public product journey pages. No sign-in needed.

use dioxus::prelude::*;

use harvest_client::tracking::JOURNEY_NOT_FOUND;
use harvest_common::tracking::{decode_scan_payload, Journey};

use super::action_panel::RoleBasedActionPanel;
use super::app::Route;
use super::auth_state::use_auth;
use super::batch_views::{EventTimeline, StatusBadge};
use super::scanner::QrScanner;

#[component]
fn PublicShell(children: Element) -> Element {
    rsx! {
        div { class: "public-tracking-page",
            header { class: "tracking-header",
                h1 { "SynerHarvest" }
                h2 { "Product Journey Tracker" }
                p { "Trace your food from farm to fork with complete transparency" }
            }
            {children}
            footer { class: "public-footer",
                p { "Bringing transparency to the food supply chain" }
            }
        }
    }
}

/// Scan or type a code, then open its journey.
#[component]
pub fn TrackingSearch() -> Element {
    let nav = use_navigator();
    let mut error_msg = use_signal(|| None::<String>);

    let on_scan = move |text: String| match decode_scan_payload(&text) {
        Some(code) => {
            nav.push(Route::Tracking { code });
        }
        None => error_msg.set(Some("No batch code found in the scanned text".into())),
    };

    rsx! {
        PublicShell {
            div { class: "card",
                h3 { "Scan a product QR code" }
                if let Some(ref err) = *error_msg.read() {
                    div { class: "alert alert-error", "{err}" }
                }
                QrScanner { on_scan }
            }
        }
    }
}

#[component]
pub fn TrackingView(code: String) -> Element {
    let auth = use_auth();
    let mut journey = use_signal(|| None::<Journey>);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| true);
    let mut refresh = use_signal(|| 0u32);

    use_effect(use_reactive!(|code| {
        // Re-run after an action completes
        let _ = refresh();
        let api = auth.peek().api();
        spawn(async move {
            loading.set(true);
            error_msg.set(None);
            match api.tracking().journey(&code).await {
                Ok(j) => journey.set(Some(j)),
                Err(e) => {
                    tracing::warn!(%code, "journey lookup failed: {e}");
                    journey.set(None);
                    error_msg.set(Some(e.user_message(JOURNEY_NOT_FOUND)));
                }
            }
            loading.set(false);
        });
    }));

    let content = if loading() && journey.read().is_none() {
        rsx! { p { "Loading product journey..." } }
    } else if let Some(ref err) = *error_msg.read() {
        rsx! {
            div { class: "alert alert-error", "{err}" }
            Link { class: "button", to: Route::TrackSearch {}, "Try another code" }
        }
    } else if let Some(j) = journey() {
        rsx! { JourneyDetails { journey: j, on_action_complete: move |_| refresh += 1 } }
    } else {
        rsx! {}
    };

    rsx! {
        PublicShell {
            {content}
            div { class: "scan-another",
                Link { class: "button primary", to: Route::TrackSearch {}, "Scan Another Product" }
            }
        }
    }
}

#[component]
fn JourneyDetails(journey: Journey, on_action_complete: EventHandler<()>) -> Element {
    let batch = &journey.batch;
    let product_name = journey
        .product
        .as_ref()
        .map(|p| p.name.clone())
        .or_else(|| batch.product_name.clone())
        .unwrap_or_default();
    let timeline: Vec<_> = journey.timeline().into_iter().cloned().collect();
    let last_location = journey.last_known_location().map(str::to_string);

    rsx! {
        div { class: "tracking-content",
            div { class: "tracking-main",
                div { class: "card product-summary",
                    div { class: "page-header",
                        h3 { "{product_name}" }
                        StatusBadge { status: batch.status_str().to_string() }
                    }
                    p { "Batch: {batch.code()}" }
                    if let Some(ref p) = journey.product {
                        if !p.description.is_empty() {
                            p { "{p.description}" }
                        }
                        p { "Type: {p.type_label()}" }
                        if p.organic {
                            span { class: "badge badge-success", "Organic" }
                        }
                        if let Some(ref method) = p.cultivation_method {
                            p { "Cultivation: {method}" }
                        }
                        if let Some(ref by) = p.created_by_username {
                            p { "Grown by {by}" }
                        }
                    }
                    if let Some(d) = batch.production_date {
                        p { "Produced: {d}" }
                    }
                    if let Some(d) = batch.expiration_date {
                        p { "Best before: {d}" }
                    }
                    if let Some(ref loc) = last_location {
                        p { "Last seen at: {loc}" }
                    }
                }

                if let Some(ref m) = journey.metrics {
                    div { class: "stat-grid journey-metrics",
                        if let Some(days) = m.days_since_harvest {
                            div { class: "stat-card",
                                span { class: "stat-value", "{days}" }
                                span { class: "stat-label", "Days since harvest" }
                            }
                        }
                        if let Some(hours) = m.hours_in_transit {
                            div { class: "stat-card",
                                span { class: "stat-value", "{hours}" }
                                span { class: "stat-label", "Hours in transit" }
                            }
                        }
                        div { class: "stat-card",
                            span { class: "stat-value", "{m.quality_checks.unwrap_or(journey.quality_check_count() as u32)}" }
                            span { class: "stat-label", "Quality checks" }
                        }
                        if let Some(carbon) = m.estimated_carbon_footprint {
                            div { class: "stat-card",
                                span { class: "stat-value", "{carbon:.2}" }
                                span { class: "stat-label", "Est. kg CO₂e" }
                            }
                        }
                    }
                }

                div { class: "card",
                    h3 { "Journey" }
                    if timeline.is_empty() {
                        p { class: "empty-state", "No journey events have been recorded for this product yet." }
                    } else {
                        EventTimeline { events: timeline }
                    }
                }
            }

            div { class: "tracking-sidebar",
                RoleBasedActionPanel {
                    batch_id: batch.id,
                    batch_code: batch.code().to_string(),
                    current_status: batch.status_str().to_string(),
                    product_name: product_name.clone(),
                    on_action_complete,
                }
            }
        }
    }
}
