use dioxus::prelude::*;

use harvest_common::batch::Batch;
use harvest_common::product::{
    EnvironmentalCondition, Product, ProductFilter, ProductSort, ProductType, CERTIFICATIONS,
    CULTIVATION_METHODS,
};

use super::app::Route;
use super::auth_state::use_api;
use super::batch_views::BatchTable;

const PAGE_SIZE: usize = 10;
const PRODUCTS_FAILED: &str = "Failed to load products. Please try again.";
const PRODUCT_FAILED: &str = "Failed to load product details. Please try again.";
const DELETE_FAILED: &str = "Failed to delete product. Please try again.";

fn label_for(options: &[(&str, &'static str)], value: Option<&str>) -> String {
    match value {
        Some(v) => options
            .iter()
            .find(|(key, _)| *key == v)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| v.to_string()),
        None => "-".into(),
    }
}

// ─── List ───────────────────────────────────────────────────────────────────

#[component]
pub fn ProductListView() -> Element {
    let api = use_api();
    let mut products = use_signal(Vec::<Product>::new);
    let mut filter = use_signal(ProductFilter::default);
    let mut page = use_signal(|| 0usize);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| true);
    let mut confirm_delete = use_signal(|| None::<i64>);

    let fetch_api = api.clone();
    use_effect(move || {
        let api = fetch_api.clone();
        spawn(async move {
            match api.products().mine().await {
                Ok(list) => products.set(list),
                Err(e) => error_msg.set(Some(e.user_message(PRODUCTS_FAILED))),
            }
            loading.set(false);
        });
    });

    let delete = use_callback(move |id: i64| {
        let api = api.clone();
        spawn(async move {
            confirm_delete.set(None);
            match api.products().delete(id).await {
                Ok(()) => {
                    tracing::info!(product_id = id, "product deleted");
                    products.write().retain(|p| p.id != Some(id));
                }
                Err(e) => error_msg.set(Some(e.user_message(DELETE_FAILED))),
            }
        });
    });

    let filtered = filter.read().apply(&products.read());
    let total = filtered.len();
    let page_count = total.div_ceil(PAGE_SIZE).max(1);
    let current = page().min(page_count - 1);
    let start = current * PAGE_SIZE;
    let rows: Vec<Product> = filtered.into_iter().skip(start).take(PAGE_SIZE).collect();
    let end = start + rows.len();

    let sort_header = move |label: &'static str, sort: ProductSort| {
        let marker = {
            let f = filter.read();
            match (f.sort == sort, f.descending) {
                (true, false) => " ▲",
                (true, true) => " ▼",
                _ => "",
            }
        };
        rsx! {
            th {
                class: "sortable",
                onclick: move |_| {
                    filter.write().toggle_sort(sort);
                    page.set(0);
                },
                "{label}{marker}"
            }
        }
    };

    let table = if loading() {
        rsx! { p { "Loading products..." } }
    } else if rows.is_empty() {
        rsx! { p { class: "empty-state", "No products found." } }
    } else {
        rsx! {
            table { class: "product-table",
                thead {
                    tr {
                        {sort_header("Name", ProductSort::Name)}
                        th { "Type" }
                        {sort_header("Price", ProductSort::Price)}
                        {sort_header("Stock", ProductSort::Stock)}
                        {sort_header("Created", ProductSort::Created)}
                        th { "Actions" }
                    }
                }
                tbody {
                    for p in rows {
                        if let Some(id) = p.id {
                            tr { key: "{id}",
                                td {
                                    Link { to: Route::ProductDetail { id }, "{p.name}" }
                                    if p.organic {
                                        span { class: "badge badge-success", "Organic" }
                                    }
                                }
                                td { "{p.type_label()}" }
                                td { "{p.price:.2}" }
                                td { "{p.stock}" }
                                td { {p.created_at.map(|t| t.date().to_string()).unwrap_or_default()} }
                                td { class: "row-actions",
                                    Link { to: Route::ProductEdit { id }, "Edit" }
                                    if confirm_delete() == Some(id) {
                                        span { "Delete this product? " }
                                        button { class: "danger", onclick: move |_| delete.call(id), "Yes" }
                                        button { onclick: move |_| confirm_delete.set(None), "No" }
                                    } else {
                                        button { onclick: move |_| confirm_delete.set(Some(id)), "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "product-list",
            div { class: "page-header",
                h2 { "Products" }
                Link { class: "button primary", to: Route::ProductCreate {}, "Add Product" }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            div { class: "filters",
                input {
                    r#type: "search",
                    placeholder: "Search products...",
                    value: "{filter.read().search}",
                    oninput: move |evt| {
                        filter.write().search = evt.value();
                        page.set(0);
                    },
                }
                select {
                    onchange: move |evt| {
                        let value = evt.value();
                        filter.write().product_type = (value != "all").then(|| ProductType::from_value(&value));
                        page.set(0);
                    },
                    option { value: "all", "All Types" }
                    for t in ProductType::all() {
                        option { value: "{t.as_str()}", "{t.label()}" }
                    }
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: filter.read().organic_only,
                        onchange: move |evt| {
                            filter.write().organic_only = evt.checked();
                            page.set(0);
                        },
                    }
                    " Organic only"
                }
            }
            {table}
            if total > 0 {
                div { class: "pagination",
                    span { "Showing {start + 1} to {end} of {total} products" }
                    button { disabled: current == 0, onclick: move |_| page.set(current.saturating_sub(1)), "Previous" }
                    button { disabled: current + 1 >= page_count, onclick: move |_| page.set(current + 1), "Next" }
                }
            }
        }
    }
}

// ─── Detail ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default, PartialEq)]
struct ProductDetails {
    product: Product,
    batches: Vec<Batch>,
    conditions: Vec<EnvironmentalCondition>,
}

#[component]
pub fn ProductDetailView(id: i64) -> Element {
    let api = use_api();
    let nav = use_navigator();
    let mut details = use_signal(|| None::<ProductDetails>);
    let mut error_msg = use_signal(|| None::<String>);
    let mut confirming = use_signal(|| false);

    let fetch_api = api.clone();
    use_effect(use_reactive!(|id| {
        let api = fetch_api.clone();
        spawn(async move {
            let products = api.products();
            let batches = api.batches();
            let (product, batches, conditions) = futures::join!(
                products.get(id),
                batches.by_product(id),
                products.environmental_conditions(id),
            );
            match product {
                Ok(product) => details.set(Some(ProductDetails {
                    product,
                    batches: batches.unwrap_or_else(|e| {
                        tracing::warn!(product_id = id, "product batches unavailable: {e}");
                        Vec::new()
                    }),
                    conditions: conditions.unwrap_or_default(),
                })),
                Err(e) => error_msg.set(Some(e.user_message(PRODUCT_FAILED))),
            }
        });
    }));

    let delete = move |_| {
        let api = api.clone();
        spawn(async move {
            match api.products().delete(id).await {
                Ok(()) => {
                    tracing::info!(product_id = id, "product deleted");
                    nav.push(Route::Products {});
                }
                Err(e) => {
                    confirming.set(false);
                    error_msg.set(Some(e.user_message(DELETE_FAILED)));
                }
            }
        });
    };

    if let Some(ref err) = *error_msg.read() {
        return rsx! {
            div { class: "alert alert-error", "{err}" }
            Link { class: "button primary", to: Route::Products {}, "Back to Products" }
        };
    }
    let Some(ProductDetails {
        product: p,
        batches,
        conditions,
    }) = details()
    else {
        return rsx! { p { "Loading product details..." } };
    };

    rsx! {
        div { class: "product-detail",
            div { class: "page-header",
                h2 { "{p.name}" }
                div { class: "quick-actions",
                    Link { class: "button", to: Route::ProductEdit { id }, "Edit" }
                    if confirming() {
                        span { "Are you sure you want to delete this product? " }
                        button { class: "danger", onclick: delete, "Delete" }
                        button { onclick: move |_| confirming.set(false), "Cancel" }
                    } else {
                        button { class: "danger", onclick: move |_| confirming.set(true), "Delete" }
                    }
                }
            }
            div { class: "card",
                if !p.description.is_empty() {
                    p { "{p.description}" }
                }
                table { class: "details-table",
                    tbody {
                        tr { th { "Type" } td { "{p.type_label()}" } }
                        tr { th { "Price" } td { "{p.price:.2}" } }
                        tr { th { "Stock" } td { "{p.stock}" } }
                        tr {
                            th { "Organic" }
                            td {
                                if p.organic {
                                    span { class: "badge badge-success", "Yes" }
                                } else {
                                    "No"
                                }
                            }
                        }
                        if p.organic {
                            tr { th { "Certification" } td { {label_for(CERTIFICATIONS, p.certification.as_deref())} } }
                        }
                        tr { th { "Cultivation" } td { {label_for(CULTIVATION_METHODS, p.cultivation_method.as_deref())} } }
                        tr { th { "Harvest Date" } td { {p.harvest_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())} } }
                        tr { th { "Expiration Date" } td { {p.expiration_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())} } }
                        tr { th { "Batch Code" } td { {p.batch_code.clone().unwrap_or_else(|| "-".into())} } }
                    }
                }
            }
            div { class: "card",
                div { class: "page-header",
                    h3 { "Batches" }
                    Link { class: "button", to: Route::BatchCreate {}, "New Batch" }
                }
                BatchTable { batches }
            }
            div { class: "card",
                h3 { "Environmental Conditions" }
                if conditions.is_empty() {
                    p { class: "empty-state", "No environmental readings recorded." }
                } else {
                    table {
                        thead {
                            tr {
                                th { "Time" }
                                th { "Temperature (°C)" }
                                th { "Humidity (%)" }
                                th { "Location" }
                                th { "Notes" }
                            }
                        }
                        tbody {
                            for c in conditions {
                                tr {
                                    td { {c.timestamp.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()} }
                                    td { {c.temperature.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())} }
                                    td { {c.humidity.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())} }
                                    td { {c.location.clone().unwrap_or_default()} }
                                    td { {c.notes.clone().unwrap_or_default()} }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ─── Create / edit ──────────────────────────────────────────────────────────

/// Create a product, or edit one when `id` is set.
#[component]
pub fn ProductForm(#[props(!optional)] id: Option<i64>) -> Element {
    let api = use_api();
    let nav = use_navigator();
    let mut product = use_signal(|| Product {
        product_type: Some(ProductType::default()),
        ..Default::default()
    });
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| id.is_some());
    let mut saving = use_signal(|| false);

    let fetch_api = api.clone();
    use_effect(use_reactive!(|id| {
        let Some(id) = id else { return };
        let api = fetch_api.clone();
        spawn(async move {
            match api.products().get(id).await {
                Ok(p) => product.set(p),
                Err(e) => error_msg.set(Some(e.user_message(PRODUCT_FAILED))),
            }
            loading.set(false);
        });
    }));

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let mut draft = product();
        if let Err(msg) = draft.validate() {
            error_msg.set(Some(msg));
            return;
        }
        draft.prepare_for_submit(chrono::Local::now().date_naive());
        error_msg.set(None);
        let api = api.clone();
        spawn(async move {
            saving.set(true);
            let service = api.products();
            let result = match id {
                Some(id) => service.update(id, &draft).await,
                None => service.create(&draft).await,
            };
            saving.set(false);
            match result {
                Ok(saved) => {
                    tracing::info!(product_id = ?saved.id, name = %saved.name, "product saved");
                    match saved.id.or(id) {
                        Some(id) => nav.push(Route::ProductDetail { id }),
                        None => nav.push(Route::Products {}),
                    };
                }
                Err(e) => {
                    let fallback = if id.is_some() {
                        "Failed to update product. Please try again."
                    } else {
                        "Failed to create product. Please try again."
                    };
                    error_msg.set(Some(e.user_message(fallback)));
                }
            }
        });
    };

    if loading() {
        return rsx! { p { "Loading product details..." } };
    }

    let p = product();
    let title = if id.is_some() { "Edit Product" } else { "Add Product" };
    let date_value = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();

    rsx! {
        div { class: "product-form",
            h2 { "{title}" }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            form { onsubmit: submit,
                div { class: "form-group",
                    label { "Name *" }
                    input {
                        r#type: "text",
                        required: true,
                        value: "{p.name}",
                        oninput: move |evt| product.write().name = evt.value(),
                    }
                }
                div { class: "form-group",
                    label { "Description" }
                    textarea {
                        value: "{p.description}",
                        oninput: move |evt| product.write().description = evt.value(),
                    }
                }
                div { class: "form-row",
                    div { class: "form-group",
                        label { "Price" }
                        input {
                            r#type: "number",
                            min: "0",
                            step: "0.01",
                            value: "{p.price}",
                            oninput: move |evt| product.write().price = evt.value().parse().unwrap_or(0.0),
                        }
                    }
                    div { class: "form-group",
                        label { "Stock" }
                        input {
                            r#type: "number",
                            min: "0",
                            value: "{p.stock}",
                            oninput: move |evt| product.write().stock = evt.value().parse().unwrap_or(0),
                        }
                    }
                }
                div { class: "form-group",
                    label { "Product Type" }
                    select {
                        value: "{p.product_type.unwrap_or_default().as_str()}",
                        onchange: move |evt| product.write().product_type = Some(ProductType::from_value(&evt.value())),
                        for t in ProductType::all() {
                            option { value: "{t.as_str()}", "{t.label()}" }
                        }
                    }
                }
                div { class: "form-group",
                    label {
                        input {
                            r#type: "checkbox",
                            checked: p.organic,
                            onchange: move |evt| product.write().organic = evt.checked(),
                        }
                        " Organic"
                    }
                }
                if p.organic {
                    div { class: "form-group",
                        label { "Certification" }
                        select {
                            value: "{p.certification.clone().unwrap_or_default()}",
                            onchange: move |evt| {
                                let v = evt.value();
                                product.write().certification = (!v.is_empty()).then_some(v);
                            },
                            option { value: "", "Select certification" }
                            for (value, label) in CERTIFICATIONS.iter() {
                                option { value: "{value}", "{label}" }
                            }
                        }
                    }
                }
                div { class: "form-group",
                    label { "Cultivation Method" }
                    select {
                        value: "{p.cultivation_method.clone().unwrap_or_default()}",
                        onchange: move |evt| {
                            let v = evt.value();
                            product.write().cultivation_method = (!v.is_empty()).then_some(v);
                        },
                        option { value: "", "Select method" }
                        for (value, label) in CULTIVATION_METHODS.iter() {
                            option { value: "{value}", "{label}" }
                        }
                    }
                }
                div { class: "form-row",
                    div { class: "form-group",
                        label { "Harvest Date" }
                        input {
                            r#type: "date",
                            value: "{date_value(p.harvest_date)}",
                            oninput: move |evt| product.write().harvest_date = evt.value().parse().ok(),
                        }
                    }
                    div { class: "form-group",
                        label { "Expiration Date" }
                        input {
                            r#type: "date",
                            value: "{date_value(p.expiration_date)}",
                            oninput: move |evt| product.write().expiration_date = evt.value().parse().ok(),
                        }
                    }
                }
                div { class: "form-group",
                    label { "Batch Code" }
                    input {
                        r#type: "text",
                        placeholder: "Generated when left empty",
                        value: "{p.batch_code.clone().unwrap_or_default()}",
                        oninput: move |evt| {
                            let v = evt.value();
                            product.write().batch_code = (!v.trim().is_empty()).then_some(v);
                        },
                    }
                }
                div { class: "wizard-buttons",
                    button {
                        r#type: "button",
                        onclick: move |_| {
                            match id {
                                Some(id) => nav.push(Route::ProductDetail { id }),
                                None => nav.push(Route::Products {}),
                            };
                        },
                        "Cancel"
                    }
                    button {
                        r#type: "submit",
                        class: "primary",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Save Product" }
                    }
                }
            }
        }
    }
}
