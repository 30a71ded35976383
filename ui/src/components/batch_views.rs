use dioxus::prelude::*;

use harvest_common::batch::{status_badge_class, Batch, BatchEvent, BatchStatus};
use harvest_common::lifecycle::event_type_label;
use harvest_common::navigation::batch_quick_links;

use super::app::Route;
use super::auth_state::{use_api, use_auth};

const PAGE_SIZE: usize = 10;
const BATCHES_FAILED: &str = "Failed to load batches. Please try again later.";
const BATCH_FAILED: &str = "Failed to load batch details. Please try again later.";

#[component]
pub fn StatusBadge(status: String) -> Element {
    let class = status_badge_class(&status);
    let label = status
        .parse::<BatchStatus>()
        .map(|s| s.label().to_string())
        .unwrap_or(status.clone());
    rsx! { span { class: "badge {class}", "{label}" } }
}

fn date_or_dash(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

#[component]
pub fn BatchTable(batches: Vec<Batch>) -> Element {
    if batches.is_empty() {
        return rsx! { p { class: "empty-state", "No batches found." } };
    }
    rsx! {
        table { class: "batch-table",
            thead {
                tr {
                    th { "Batch Code" }
                    th { "Product" }
                    th { "Quantity" }
                    th { "Produced" }
                    th { "Expires" }
                    th { "Status" }
                }
            }
            tbody {
                for batch in batches {
                    tr { key: "{batch.code()}",
                        td {
                            if let Some(id) = batch.id {
                                Link { to: Route::BatchDetail { id }, "{batch.code()}" }
                            } else {
                                "{batch.code()}"
                            }
                        }
                        td { {batch.product_name.clone().unwrap_or_default()} }
                        td { "{batch.quantity}" }
                        td { {date_or_dash(batch.production_date)} }
                        td { {date_or_dash(batch.expiration_date)} }
                        td { StatusBadge { status: batch.status_str().to_string() } }
                    }
                }
            }
        }
    }
}

#[component]
pub fn BatchListView() -> Element {
    let api = use_api();
    let mut batches = use_signal(Vec::<Batch>::new);
    let mut selected_status = use_signal(|| "ALL".to_string());
    let mut search = use_signal(String::new);
    let mut page = use_signal(|| 0usize);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| true);

    // Refetch whenever the status filter changes
    use_effect(move || {
        let status = selected_status();
        let api = api.clone();
        spawn(async move {
            loading.set(true);
            let service = api.batches();
            let result = if status == "ALL" {
                service.mine().await
            } else {
                service.by_status(&status).await
            };
            match result {
                Ok(list) => {
                    batches.set(list);
                    error_msg.set(None);
                }
                Err(e) => error_msg.set(Some(e.user_message(BATCHES_FAILED))),
            }
            page.set(0);
            loading.set(false);
        });
    });

    let filtered: Vec<Batch> = batches
        .read()
        .iter()
        .filter(|b| b.matches(&search.read()))
        .cloned()
        .collect();
    let total = filtered.len();
    let pages = total.div_ceil(PAGE_SIZE).max(1);
    let current = page().min(pages - 1);
    let visible: Vec<Batch> = filtered
        .into_iter()
        .skip(current * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    let first = if total == 0 { 0 } else { current * PAGE_SIZE + 1 };
    let last = (current * PAGE_SIZE + visible.len()).min(total);

    rsx! {
        div { class: "batches-page",
            div { class: "page-header",
                h2 { "Batches" }
                div { class: "quick-actions",
                    Link { class: "button", to: Route::BatchScan {}, "Scan QR" }
                    Link { class: "button primary", to: Route::BatchCreate {}, "Create Batch" }
                }
            }

            div { class: "filters",
                label { r#for: "status-filter", "Status:" }
                select {
                    id: "status-filter",
                    value: "{selected_status}",
                    onchange: move |evt| selected_status.set(evt.value()),
                    option { value: "ALL", "All Statuses" }
                    for st in BatchStatus::all() {
                        option { value: st.as_str(), "{st.label()}" }
                    }
                }
                input {
                    r#type: "search",
                    placeholder: "Search by batch code or product",
                    value: "{search}",
                    oninput: move |evt| {
                        search.set(evt.value());
                        page.set(0);
                    },
                }
            }

            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            if loading() {
                p { "Loading batches..." }
            } else {
                BatchTable { batches: visible }
                div { class: "pagination",
                    span { "Showing {first} to {last} of {total} batches" }
                    button {
                        disabled: current == 0,
                        onclick: move |_| page.set(current.saturating_sub(1)),
                        "Previous"
                    }
                    span { "Page {current + 1} of {pages}" }
                    button {
                        disabled: current + 1 >= pages,
                        onclick: move |_| page.set(current + 1),
                        "Next"
                    }
                }
            }
        }
    }
}

/// Shipments and inventory: every batch in any of `statuses`.
#[component]
pub fn BatchStatusList(title: &'static str, statuses: Vec<BatchStatus>) -> Element {
    let api = use_api();
    let mut batches = use_signal(Vec::<Batch>::new);
    let mut error_msg = use_signal(|| None::<String>);

    use_effect(move || {
        let api = api.clone();
        let statuses = statuses.clone();
        spawn(async move {
            let service = api.batches();
            let lists = futures::future::join_all(
                statuses.iter().map(|st| service.by_status(st.as_str())),
            )
            .await;
            let mut found = Vec::new();
            for list in lists {
                match list {
                    Ok(list) => found.extend(list),
                    Err(e) => error_msg.set(Some(e.user_message(BATCHES_FAILED))),
                }
            }
            batches.set(found);
        });
    });

    rsx! {
        div { class: "batches-page",
            h2 { "{title}" }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            BatchTable { batches: batches() }
        }
    }
}

#[component]
pub fn BatchDetailView(id: i64) -> Element {
    let auth = use_auth();
    let api = use_api();
    let mut batch = use_signal(|| None::<Batch>);
    let mut error_msg = use_signal(|| None::<String>);

    use_effect(use_reactive!(|id| {
        let api = api.clone();
        spawn(async move {
            match api.batches().get(id).await {
                Ok(b) => batch.set(Some(b)),
                Err(e) => {
                    tracing::error!(id, "batch fetch failed: {e}");
                    error_msg.set(Some(e.user_message(BATCH_FAILED)));
                }
            }
        });
    }));

    if let Some(ref err) = *error_msg.read() {
        return rsx! {
            div { class: "alert alert-error", "{err}" }
            Link { to: Route::Batches {}, "Back to batches" }
        };
    }
    let Some(b) = batch() else {
        return rsx! { p { "Loading batch details..." } };
    };

    let role = auth.read().role();
    let links: Vec<_> = batch_quick_links(role, id, b.code())
        .into_iter()
        .filter(|l| l.label != "View Details")
        .collect();

    rsx! {
        div { class: "batch-detail",
            div { class: "page-header",
                h2 { "Batch {b.code()}" }
                StatusBadge { status: b.status_str().to_string() }
            }

            div { class: "card",
                table { class: "detail-table",
                    tbody {
                        tr {
                            td { "Product" }
                            td {
                                Link { to: Route::ProductDetail { id: b.product_id },
                                    {b.product_name.clone().unwrap_or_else(|| format!("#{}", b.product_id))}
                                }
                            }
                        }
                        tr { td { "Quantity" } td { "{b.quantity}" } }
                        tr { td { "Production Date" } td { {date_or_dash(b.production_date)} } }
                        tr { td { "Expiration Date" } td { {date_or_dash(b.expiration_date)} } }
                        if let Some(ref by) = b.created_by_username {
                            tr { td { "Created By" } td { "{by}" } }
                        }
                        if let Some(ref notes) = b.notes {
                            tr { td { "Notes" } td { "{notes}" } }
                        }
                    }
                }
            }

            div { class: "quick-actions",
                for link in links {
                    Link { class: "button", key: "{link.path}", to: link.path.clone(), "{link.label}" }
                }
            }

            if !b.events.is_empty() {
                div { class: "card",
                    h3 { "Recent Events" }
                    EventTimeline { events: b.events.iter().rev().take(3).cloned().collect::<Vec<_>>() }
                }
            }
        }
    }
}

#[component]
pub fn BatchEventsView(id: i64) -> Element {
    let api = use_api();
    let mut batch = use_signal(|| None::<Batch>);
    let mut events = use_signal(Vec::<BatchEvent>::new);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| true);

    use_effect(use_reactive!(|id| {
        let api = api.clone();
        spawn(async move {
            let service = api.batches();
            let (b, evs) = futures::join!(service.get(id), service.events(id));
            match (b, evs) {
                (Ok(b), Ok(evs)) => {
                    batch.set(Some(b));
                    events.set(evs);
                }
                (Err(e), _) | (_, Err(e)) => {
                    error_msg.set(Some(e.user_message("Failed to load batch events. Please try again later.")));
                }
            }
            loading.set(false);
        });
    }));

    let code = batch
        .read()
        .as_ref()
        .map(|b| b.code().to_string())
        .unwrap_or_default();

    rsx! {
        div { class: "batch-events",
            div { class: "page-header",
                h2 { "Events for batch {code}" }
                div { class: "quick-actions",
                    Link { class: "button", to: Route::BatchDetail { id }, "Back to batch" }
                    Link { class: "button primary", to: Route::BatchAddEvent { id }, "Add Event" }
                }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            if loading() {
                p { "Loading events..." }
            } else if events.read().is_empty() {
                p { class: "empty-state", "No events recorded for this batch yet." }
            } else {
                EventTimeline { events: events() }
            }
        }
    }
}

/// Events in the order given, one entry each.
#[component]
pub fn EventTimeline(events: Vec<BatchEvent>) -> Element {
    rsx! {
        ol { class: "timeline",
            for (i, ev) in events.into_iter().enumerate() {
                li { class: "timeline-item", key: "{ev.id.unwrap_or(i as i64)}",
                    div { class: "timeline-head",
                        strong { {event_type_label(&ev.event_type)} }
                        if let Some(ts) = ev.timestamp {
                            span { class: "muted", {ts.format("%Y-%m-%d %H:%M").to_string()} }
                        }
                    }
                    if let Some(ref loc) = ev.location {
                        p { "Location: {loc}" }
                    }
                    if let Some(t) = ev.temperature {
                        p { "Temperature: {t}°C" }
                    }
                    if let Some(h) = ev.humidity {
                        p { "Humidity: {h}%" }
                    }
                    if let Some(ref notes) = ev.notes {
                        p { class: "notes", "{notes}" }
                    }
                    if let Some(ref by) = ev.recorded_by_username {
                        p { class: "muted", "Recorded by {by}" }
                    }
                    if let Some(hash) = ev.short_tx_hash() {
                        p { class: "mono", "Tx: {hash}" }
                    }
                }
            }
        }
    }
}
