use dioxus::prelude::*;

use harvest_common::batch::Batch;
use harvest_common::qr::render_svg;
use harvest_common::tracking::tracking_url;

use super::app::Route;
use super::auth_state::use_auth;

const QR_SIZES: [u32; 3] = [128, 256, 512];

/// Printable QR code pointing at the batch's public tracking page.
#[component]
pub fn BatchQrView(id: i64) -> Element {
    let auth = use_auth();
    let mut batch = use_signal(|| None::<Batch>);
    let mut error_msg = use_signal(|| None::<String>);
    let mut size = use_signal(|| 256u32);

    use_effect(use_reactive!(|id| {
        let api = auth.peek().api();
        spawn(async move {
            match api.batches().get(id).await {
                Ok(b) => batch.set(Some(b)),
                Err(e) => error_msg.set(Some(
                    e.user_message("Failed to load batch details. Please try again later."),
                )),
            }
        });
    }));

    if let Some(ref err) = *error_msg.read() {
        return rsx! {
            div { class: "alert alert-error", "{err}" }
            Link { to: Route::Batches {}, "Back to Batches" }
        };
    }
    let Some(b) = batch() else {
        return rsx! { p { "Loading batch details..." } };
    };

    let url = tracking_url(&auth.read().config.tracking_base_url, b.code());
    let svg = match render_svg(&url, size()) {
        Ok(svg) => svg,
        Err(e) => {
            tracing::error!("QR render failed: {e}");
            return rsx! { div { class: "alert alert-error", "Could not generate a QR code for this batch." } };
        }
    };
    let file_name = format!("synerharvest-batch-{}.svg", b.code());

    rsx! {
        div { class: "batch-qr",
            h2 { "QR Code: {b.code()}" }
            p { {b.product_name.clone().unwrap_or_default()} }

            div { class: "qr-frame", dangerous_inner_html: "{svg}" }

            div { class: "form-group",
                label { "Tracking URL:" }
                input { r#type: "text", readonly: true, value: "{url}" }
            }
            div { class: "form-group",
                label { "Size:" }
                select {
                    value: "{size}",
                    onchange: move |evt| size.set(evt.value().parse().unwrap_or(256)),
                    for s in QR_SIZES {
                        option { value: "{s}", "{s} px" }
                    }
                }
            }

            div { class: "quick-actions",
                QrDownload { svg: svg.clone(), file_name }
                CopyLink { url: url.clone() }
                PrintButton {}
                Link { class: "button", to: Route::BatchDetail { id }, "Back to batch" }
            }
        }
    }
}

#[component]
fn QrDownload(svg: String, file_name: String) -> Element {
    #[cfg(target_family = "wasm")]
    {
        let encoded: String = js_sys::encode_uri_component(&svg).into();
        let href = format!("data:image/svg+xml;charset=utf-8,{encoded}");
        return rsx! {
            a { class: "button", href: "{href}", download: "{file_name}", "Download SVG" }
        };
    }

    #[cfg(not(target_family = "wasm"))]
    {
        let _ = (svg, file_name);
        rsx! {}
    }
}

#[component]
fn CopyLink(url: String) -> Element {
    #[cfg(target_family = "wasm")]
    {
        let mut copy_status = use_signal(|| None::<&'static str>);
        return rsx! {
            button {
                onclick: move |_| {
                    let url = url.clone();
                    spawn(async move {
                        if let Some(window) = web_sys::window() {
                            let promise = window.navigator().clipboard().write_text(&url);
                            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
                            copy_status.set(Some("Copied!"));
                        }
                    });
                },
                if let Some(status) = *copy_status.read() { "{status}" } else { "Copy Link" }
            }
        };
    }

    #[cfg(not(target_family = "wasm"))]
    {
        let _ = url;
        rsx! {}
    }
}

#[component]
fn PrintButton() -> Element {
    rsx! {
        button {
            onclick: move |_| {
                #[cfg(target_family = "wasm")]
                if let Some(window) = web_sys::window() {
                    if let Err(e) = window.print() {
                        tracing::warn!("print failed: {e:?}");
                    }
                }
            },
            "Print"
        }
    }
}
