//! Creating batches and writing to their event log.

use chrono::{Local, NaiveDate};
use dioxus::prelude::*;

use harvest_common::actions::{ActionForm, ActionView};
use harvest_common::batch::{default_expiration_date, Batch, BatchDraft, BatchStatus};
use harvest_common::lifecycle::{
    event_type_to_status, status_options, status_to_event_type, suggest_event_type, SelectOption,
    ADD_EVENT_OPTIONS, STATUS_UPDATE_EVENT_OPTIONS,
};
use harvest_common::product::Product;

use super::app::Route;
use super::auth_state::use_api;
use super::timer::pause;

const BATCH_FAILED: &str = "Failed to load batch details. Please try again later.";

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn date_value(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

// ─── Event fields ───

/// Type, location, readings and notes, shared by every event form.
#[component]
pub fn EventFields(
    form: Signal<ActionForm>,
    options: Vec<SelectOption>,
    #[props(default)] location_required: bool,
    #[props(default)] notes_required: bool,
    on_type_change: Option<EventHandler<String>>,
) -> Element {
    let mut form = form;
    let current = form.read().clone();
    let location_label = if location_required { "Location (required):" } else { "Location:" };
    let notes_label = if notes_required { "Description (required):" } else { "Notes:" };

    rsx! {
        div { class: "form-group",
            label { "Type:" }
            select {
                value: "{current.event_type}",
                onchange: move |evt| {
                    let value = evt.value();
                    form.write().event_type = value.clone();
                    if let Some(handler) = on_type_change {
                        handler.call(value);
                    }
                },
                option { value: "", disabled: true, "Select a type" }
                for (value, label) in options {
                    option { value, "{label}" }
                }
            }
        }
        div { class: "form-group",
            label { "{location_label}" }
            input {
                r#type: "text",
                placeholder: "e.g., Warehouse A, Colombo",
                value: "{current.location}",
                oninput: move |evt| form.write().location = evt.value(),
            }
        }
        div { class: "form-row",
            div { class: "form-group",
                label { "Temperature (°C):" }
                input {
                    r#type: "number",
                    step: "0.1",
                    value: "{current.temperature}",
                    oninput: move |evt| form.write().temperature = evt.value(),
                }
            }
            div { class: "form-group",
                label { "Humidity (%):" }
                input {
                    r#type: "number",
                    step: "0.1",
                    value: "{current.humidity}",
                    oninput: move |evt| form.write().humidity = evt.value(),
                }
            }
        }
        div { class: "form-group",
            label { "{notes_label}" }
            textarea {
                value: "{current.notes}",
                oninput: move |evt| form.write().notes = evt.value(),
            }
        }
    }
}

// ─── Create wizard ───

const STEPS: [&str; 3] = ["Select Product", "Batch Details", "Review & Create"];

fn step_class(current: u8, index: usize) -> &'static str {
    let step = index + 1;
    match (current as usize).cmp(&step) {
        std::cmp::Ordering::Greater => "progress-step completed",
        std::cmp::Ordering::Equal => "progress-step active",
        std::cmp::Ordering::Less => "progress-step",
    }
}

#[component]
pub fn BatchCreateWizard() -> Element {
    let api = use_api();
    let nav = use_navigator();
    let mut products = use_signal(Vec::<Product>::new);
    let mut draft = use_signal(|| {
        let today = Local::now().date_naive();
        BatchDraft {
            production_date: Some(today),
            expiration_date: Some(default_expiration_date(today)),
            ..Default::default()
        }
    });
    let mut step = use_signal(|| 1u8);
    let mut error_msg = use_signal(|| None::<String>);
    let mut created = use_signal(|| None::<Batch>);
    let mut submitting = use_signal(|| false);

    let products_api = api.clone();
    use_effect(move || {
        let api = products_api.clone();
        spawn(async move {
            match api.products().mine().await {
                Ok(list) => {
                    if let Some(first) = list.first() {
                        let mut d = draft.write();
                        if d.product_id.is_none() {
                            d.product_id = first.id;
                            d.product_name = Some(first.name.clone());
                        }
                    }
                    products.set(list);
                }
                Err(e) => error_msg.set(Some(
                    e.user_message("Failed to load products. Please try again later."),
                )),
            }
        });
    });

    let next = move |_| match draft.read().check_step(step()) {
        Ok(()) => {
            error_msg.set(None);
            step += 1;
        }
        Err(msg) => error_msg.set(Some(msg)),
    };

    let submit = move |_| {
        let batch = match draft.read().clone().into_batch() {
            Ok(b) => b,
            Err(msg) => {
                error_msg.set(Some(msg));
                return;
            }
        };
        let api = api.clone();
        spawn(async move {
            submitting.set(true);
            error_msg.set(None);
            match api.batches().create(&batch).await {
                Ok(saved) => {
                    tracing::info!(code = %saved.code(), "batch created");
                    let id = saved.id;
                    created.set(Some(saved));
                    step.set(4);
                    pause(2000).await;
                    if let Some(id) = id {
                        nav.push(Route::BatchDetail { id });
                    }
                }
                Err(e) => error_msg.set(Some(
                    e.user_message("Failed to create batch. Please try again."),
                )),
            }
            submitting.set(false);
        });
    };

    let d = draft.read().clone();
    let current = step();

    rsx! {
        div { class: "batch-create",
            h2 { "Create Batch" }

            div { class: "progress-steps",
                for (i, label) in STEPS.iter().enumerate() {
                    div { class: step_class(current, i),
                        span { class: "step-number", "{i + 1}" }
                        span { class: "step-label", "{label}" }
                    }
                }
            }

            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            if current == 1 {
                div { class: "form-step",
                    h3 { "Select Product for Batch" }
                    if products.read().is_empty() {
                        p { class: "empty-state",
                            "You have no products yet. "
                            Link { to: Route::ProductCreate {}, "Create one first." }
                        }
                    }
                    div { class: "product-choices",
                        for p in products.read().iter().cloned() {
                            label { class: "product-choice", key: "{p.id.unwrap_or_default()}",
                                input {
                                    r#type: "radio",
                                    name: "product",
                                    checked: d.product_id == p.id,
                                    onchange: move |_| {
                                        let mut w = draft.write();
                                        w.product_id = p.id;
                                        w.product_name = Some(p.name.clone());
                                    },
                                }
                                span { "{p.name}" }
                                span { class: "muted", " {p.type_label()}" }
                            }
                        }
                    }
                }
            }

            if current == 2 {
                div { class: "form-step",
                    h3 { "Batch Details" }
                    div { class: "form-group",
                        label { "Batch Code (leave blank to generate):" }
                        input {
                            r#type: "text",
                            value: "{d.batch_code}",
                            oninput: move |evt| draft.write().batch_code = evt.value(),
                        }
                    }
                    div { class: "form-group",
                        label { "Quantity:" }
                        input {
                            r#type: "number",
                            min: "1",
                            value: "{d.quantity}",
                            oninput: move |evt| draft.write().quantity = evt.value().trim().parse().unwrap_or(0),
                        }
                    }
                    div { class: "form-row",
                        div { class: "form-group",
                            label { "Production Date:" }
                            input {
                                r#type: "date",
                                value: date_value(d.production_date),
                                oninput: move |evt| {
                                    let date = parse_date(&evt.value());
                                    let mut w = draft.write();
                                    w.production_date = date;
                                    if let Some(date) = date {
                                        w.expiration_date = Some(default_expiration_date(date));
                                    }
                                },
                            }
                        }
                        div { class: "form-group",
                            label { "Expiration Date:" }
                            input {
                                r#type: "date",
                                value: date_value(d.expiration_date),
                                oninput: move |evt| draft.write().expiration_date = parse_date(&evt.value()),
                            }
                        }
                    }
                    div { class: "form-group",
                        label { "Notes:" }
                        textarea {
                            value: "{d.notes}",
                            oninput: move |evt| draft.write().notes = evt.value(),
                        }
                    }
                }
            }

            if current == 3 {
                div { class: "form-step",
                    h3 { "Review & Create" }
                    table { class: "detail-table",
                        tbody {
                            tr { td { "Product" } td { {d.product_name.clone().unwrap_or_default()} } }
                            tr {
                                td { "Batch Code" }
                                td {
                                    if d.batch_code.trim().is_empty() { "(generated on create)" } else { "{d.batch_code}" }
                                }
                            }
                            tr { td { "Quantity" } td { "{d.quantity}" } }
                            tr { td { "Production Date" } td { {date_value(d.production_date)} } }
                            tr { td { "Expiration Date" } td { {date_value(d.expiration_date)} } }
                        }
                    }
                }
            }

            if current == 4 {
                if let Some(ref b) = *created.read() {
                    div { class: "alert alert-success", "Batch {b.code()} created successfully!" }
                }
            } else {
                div { class: "wizard-buttons",
                    if current > 1 {
                        button {
                            onclick: move |_| {
                                error_msg.set(None);
                                step -= 1;
                            },
                            "Back"
                        }
                    }
                    if current < 3 {
                        button { class: "primary", onclick: next, "Next" }
                    } else {
                        button {
                            class: "primary",
                            disabled: submitting(),
                            onclick: submit,
                            if submitting() { "Creating..." } else { "Create Batch" }
                        }
                    }
                }
            }
        }
    }
}

// ─── Status update ───

/// Event type whose suggested status is `status`, for preset links such as
/// "Check In Shipment".
fn event_for_status(status: &str, current: &str) -> &'static str {
    STATUS_UPDATE_EVENT_OPTIONS
        .iter()
        .map(|(value, _)| *value)
        .find(|ev| event_type_to_status(ev, "") == status)
        .unwrap_or_else(|| status_to_event_type(current))
}

#[component]
pub fn UpdateStatusForm(id: i64, preset_status: String) -> Element {
    let api = use_api();
    let nav = use_navigator();
    let mut batch = use_signal(|| None::<Batch>);
    let mut status = use_signal(String::new);
    let mut form = use_signal(ActionForm::default);
    let mut error_msg = use_signal(|| None::<String>);
    let mut success_msg = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let load_api = api.clone();
    use_effect(use_reactive!(|id, preset_status| {
        let api = load_api.clone();
        let preset = preset_status.clone();
        spawn(async move {
            match api.batches().get(id).await {
                Ok(b) => {
                    let current = b.status_str().to_string();
                    let (st, ev) = if preset.is_empty() {
                        (current.clone(), status_to_event_type(&current))
                    } else {
                        (preset.clone(), event_for_status(&preset, &current))
                    };
                    status.set(st);
                    form.write().event_type = ev.to_string();
                    batch.set(Some(b));
                }
                Err(e) => error_msg.set(Some(e.user_message(BATCH_FAILED))),
            }
        });
    }));

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let event = match form.read().to_event(ActionView::EventForm) {
            Ok(ev) => ev,
            Err(msg) => {
                error_msg.set(Some(msg));
                return;
            }
        };
        let new_status = status();
        let api = api.clone();
        spawn(async move {
            submitting.set(true);
            error_msg.set(None);
            match api.batches().update_status(id, &new_status, &event).await {
                Ok(_) => {
                    success_msg.set(Some(format!(
                        "Batch status updated to {}",
                        new_status.replace('_', " ")
                    )));
                    pause(1500).await;
                    nav.push(Route::BatchDetail { id });
                }
                Err(e) => error_msg.set(Some(
                    e.user_message("Failed to update batch status. Please try again."),
                )),
            }
            submitting.set(false);
        });
    };

    let Some(b) = batch() else {
        return rsx! {
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
                Link { to: Route::Batches {}, "Back to Batches" }
            } else {
                p { "Loading batch details..." }
            }
        };
    };
    let current_status = b.status_str().to_string();
    let status_base = current_status.clone();

    rsx! {
        div { class: "batch-form",
            h2 { "Update Status: {b.code()}" }
            p { "Current status: {current_status}" }

            if let Some(ref msg) = *success_msg.read() {
                div { class: "alert alert-success", "{msg}" }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            form { onsubmit: submit,
                div { class: "form-group",
                    label { "New Status:" }
                    select {
                        value: "{status}",
                        onchange: move |evt| status.set(evt.value()),
                        for (value, label) in status_options() {
                            option { value, "{label}" }
                        }
                    }
                }
                EventFields {
                    form,
                    options: STATUS_UPDATE_EVENT_OPTIONS.to_vec(),
                    on_type_change: move |ev: String| {
                        status.set(event_type_to_status(&ev, &status_base));
                    },
                }
                div { class: "wizard-buttons",
                    Link { class: "button", to: Route::BatchDetail { id }, "Cancel" }
                    button {
                        r#type: "submit",
                        class: "primary",
                        disabled: submitting(),
                        if submitting() { "Updating..." } else { "Update Status" }
                    }
                }
            }
        }
    }
}

// ─── Add event ───

#[component]
pub fn AddEventForm(id: i64) -> Element {
    let api = use_api();
    let nav = use_navigator();
    let mut batch = use_signal(|| None::<Batch>);
    let mut form = use_signal(ActionForm::default);
    let mut error_msg = use_signal(|| None::<String>);
    let mut success_msg = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let load_api = api.clone();
    use_effect(use_reactive!(|id| {
        let api = load_api.clone();
        spawn(async move {
            match api.batches().get(id).await {
                Ok(b) => {
                    form.write().event_type = suggest_event_type(b.status_str()).to_string();
                    batch.set(Some(b));
                }
                Err(e) => error_msg.set(Some(e.user_message(BATCH_FAILED))),
            }
        });
    }));

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let event = match form.read().to_event(ActionView::EventForm) {
            Ok(ev) => ev,
            Err(msg) => {
                error_msg.set(Some(msg));
                return;
            }
        };
        let api = api.clone();
        spawn(async move {
            submitting.set(true);
            error_msg.set(None);
            match api.batches().add_event(id, &event).await {
                Ok(_) => {
                    success_msg.set(Some("Event added successfully".into()));
                    pause(1500).await;
                    nav.push(Route::BatchEvents { id });
                }
                Err(e) => error_msg.set(Some(e.user_message("Failed to add event. Please try again."))),
            }
            submitting.set(false);
        });
    };

    let Some(b) = batch() else {
        return rsx! {
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
                Link { to: Route::Batches {}, "Back to Batches" }
            } else {
                p { "Loading batch details..." }
            }
        };
    };
    let status_label = b
        .status()
        .map(BatchStatus::label)
        .unwrap_or(b.status_str())
        .to_string();

    rsx! {
        div { class: "batch-form",
            h2 { "Add Event: {b.code()}" }
            p { "Current status: {status_label}" }

            if let Some(ref msg) = *success_msg.read() {
                div { class: "alert alert-success", "{msg}" }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            form { onsubmit: submit,
                EventFields { form, options: ADD_EVENT_OPTIONS.to_vec() }
                div { class: "wizard-buttons",
                    Link { class: "button", to: Route::BatchEvents { id }, "Cancel" }
                    button {
                        r#type: "submit",
                        class: "primary",
                        disabled: submitting(),
                        if submitting() { "Saving..." } else { "Add Event" }
                    }
                }
            }
        }
    }
}
