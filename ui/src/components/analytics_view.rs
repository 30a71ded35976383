use dioxus::prelude::*;

use harvest_common::analytics::{AnalyticsSummary, Count, EnvironmentalPoint};
use harvest_common::product::Product;

use super::auth_state::use_api;
use super::dashboard_view::StatCard;

#[derive(Clone, Default, PartialEq)]
struct Charts {
    statuses: Vec<Count>,
    product_types: Vec<Count>,
    monthly: Vec<Count>,
    events: Vec<Count>,
}

#[component]
pub fn AnalyticsView() -> Element {
    let api = use_api();
    let mut summary = use_signal(AnalyticsSummary::default);
    let mut charts = use_signal(Charts::default);
    let mut products = use_signal(Vec::<Product>::new);
    let mut loading = use_signal(|| true);

    use_effect(move || {
        let api = api.clone();
        spawn(async move {
            let analytics = api.analytics();
            let (s, statuses, product_types, monthly, events) = futures::join!(
                analytics.summary(),
                analytics.batch_status_distribution(),
                analytics.product_type_distribution(),
                analytics.monthly_production(),
                analytics.event_type_summary(),
            );
            summary.set(s);
            charts.set(Charts {
                statuses,
                product_types,
                monthly,
                events,
            });
            match api.products().mine().await {
                Ok(list) => products.set(list),
                Err(e) => tracing::warn!("products for analytics unavailable: {e}"),
            }
            loading.set(false);
        });
    });

    if loading() {
        return rsx! { p { "Loading analytics..." } };
    }

    let s = summary();
    let c = charts();

    rsx! {
        div { class: "analytics",
            h2 { "Analytics" }
            div { class: "stat-grid",
                StatCard { label: "Products", value: s.total_products }
                StatCard { label: "Batches", value: s.total_batches }
                StatCard { label: "In Transit", value: s.active_shipments }
                StatCard { label: "Expiring Soon", value: s.expiring_batches }
            }
            div { class: "chart-grid",
                CountChart { title: "Batch Status", counts: c.statuses }
                CountChart { title: "Product Types", counts: c.product_types }
                CountChart { title: "Monthly Production", counts: c.monthly }
                CountChart { title: "Supply Chain Events", counts: c.events }
            }
            EnvironmentalPanel { products: products() }
        }
    }
}

/// Horizontal bars scaled to the largest count.
#[component]
fn CountChart(title: &'static str, counts: Vec<Count>) -> Element {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    rsx! {
        div { class: "card chart",
            h3 { "{title}" }
            if counts.is_empty() {
                p { class: "empty-state", "No data yet." }
            }
            for c in counts {
                div { class: "bar-row", key: "{c.key}",
                    span { class: "bar-label", "{c.key}" }
                    div {
                        class: "bar",
                        style: "width: {c.count * 100 / max}%",
                    }
                    span { class: "bar-value", "{c.count}" }
                }
            }
        }
    }
}

#[component]
fn EnvironmentalPanel(products: Vec<Product>) -> Element {
    let api = use_api();
    let mut selected = use_signal(|| None::<i64>);
    let mut points = use_signal(Vec::<EnvironmentalPoint>::new);

    let choices: Vec<(i64, String)> = products
        .iter()
        .filter_map(|p| p.id.map(|id| (id, p.name.clone())))
        .collect();

    use_effect(move || {
        let Some(id) = selected() else {
            points.set(Vec::new());
            return;
        };
        let api = api.clone();
        spawn(async move {
            points.set(api.analytics().environmental_data(id).await);
        });
    });

    let rows = points();

    rsx! {
        div { class: "card environmental",
            h3 { "Environmental Conditions" }
            select {
                onchange: move |evt| selected.set(evt.value().parse().ok()),
                option { value: "", "Select a product" }
                for (id, name) in choices {
                    option { key: "{id}", value: "{id}", "{name}" }
                }
            }
            if selected().is_some() && rows.is_empty() {
                p { class: "empty-state", "No environmental readings for this product." }
            }
            if !rows.is_empty() {
                table {
                    thead {
                        tr {
                            th { "Time" }
                            th { "Temperature (°C)" }
                            th { "Humidity (%)" }
                            th { "Soil Moisture" }
                            th { "Soil pH" }
                        }
                    }
                    tbody {
                        for p in rows {
                            tr {
                                td { {p.timestamp.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()} }
                                td { "{p.temperature:.1}" }
                                td { "{p.humidity:.1}" }
                                td { {p.soil_moisture.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())} }
                                td { {p.soil_ph.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())} }
                            }
                        }
                    }
                }
            }
        }
    }
}
