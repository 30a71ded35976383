//! Camera QR scanning with a typed-code fallback.
//!
//! One scan session at a time: the camera starts on "Start Scanning" and
//! stops on a successful decode, on "Stop", or when the component unmounts.

use dioxus::prelude::*;

use harvest_client::tracking::lookup_scanned_batch;
use harvest_common::batch::Batch;
use harvest_common::navigation::batch_quick_links;

use super::auth_state::use_auth;
use super::batch_views::StatusBadge;

#[cfg(target_family = "wasm")]
mod camera {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
        MediaStreamConstraints, MediaStreamTrack,
    };

    pub const VIDEO_ID: &str = "qr-scanner-video";

    fn js_err(e: JsValue) -> String {
        e.as_string().unwrap_or_else(|| format!("{e:?}"))
    }

    fn video_element() -> Result<HtmlVideoElement, String> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(VIDEO_ID))
            .ok_or("Scanner video element missing")?
            .dyn_into()
            .map_err(|_| "Scanner element is not a video".to_string())
    }

    /// Open the rear camera and attach it to the scanner video.
    pub async fn start() -> Result<MediaStream, String> {
        let window = web_sys::window().ok_or("No window")?;
        let devices = window.navigator().media_devices().map_err(js_err)?;

        let video = js_sys::Object::new();
        js_sys::Reflect::set(&video, &"facingMode".into(), &"environment".into()).map_err(js_err)?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(js_err)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        let element = video_element()?;
        element.set_src_object(Some(&stream));
        JsFuture::from(element.play().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok(stream)
    }

    /// Current video frame as RGBA, or `None` before the first frame arrives.
    pub fn grab_frame() -> Result<Option<(usize, usize, Vec<u8>)>, String> {
        let video = video_element()?;
        let (w, h) = (video.video_width(), video.video_height());
        if w == 0 || h == 0 {
            return Ok(None);
        }
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document")?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        canvas.set_width(w);
        canvas.set_height(h);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or("No 2d context")?
            .dyn_into()
            .map_err(js_err)?;
        ctx.draw_image_with_html_video_element(&video, 0.0, 0.0)
            .map_err(js_err)?;
        let image = ctx
            .get_image_data(0.0, 0.0, w as f64, h as f64)
            .map_err(js_err)?;
        Ok(Some((w as usize, h as usize, image.data().0)))
    }

    pub fn stop(stream: &MediaStream) {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        if let Ok(video) = video_element() {
            video.set_src_object(None);
        }
    }
}

#[cfg(target_family = "wasm")]
const FRAME_INTERVAL_MS: u32 = 300;

/// Emits the raw text of the first QR code seen, or a typed code.
#[component]
pub fn QrScanner(on_scan: EventHandler<String>) -> Element {
    let mut manual = use_signal(String::new);
    let mut camera_error = use_signal(|| None::<String>);
    let mut scanning = use_signal(|| false);

    #[cfg(target_family = "wasm")]
    let mut stream = use_signal(|| None::<web_sys::MediaStream>);

    #[cfg(target_family = "wasm")]
    use_drop(move || {
        if let Ok(mut slot) = stream.try_write() {
            if let Some(s) = slot.take() {
                camera::stop(&s);
            }
        }
    });

    let start = move |_| {
        #[cfg(target_family = "wasm")]
        {
            use harvest_common::qr::decode_rgba;

            use super::timer::pause;

            if *scanning.peek() {
                return;
            }
            camera_error.set(None);
            scanning.set(true);
            spawn(async move {
                match camera::start().await {
                    Ok(s) => stream.set(Some(s)),
                    Err(e) => {
                        tracing::warn!("camera unavailable: {e}");
                        camera_error.set(Some(format!("Could not access camera: {e}")));
                        scanning.set(false);
                        return;
                    }
                }
                let mut found = None;
                while *scanning.peek() {
                    pause(FRAME_INTERVAL_MS).await;
                    match camera::grab_frame() {
                        Ok(Some((w, h, rgba))) => {
                            if let Ok(text) = decode_rgba(w, h, &rgba) {
                                found = Some(text);
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            camera_error.set(Some(e));
                            break;
                        }
                    }
                }
                if let Some(s) = stream.write().take() {
                    camera::stop(&s);
                }
                scanning.set(false);
                if let Some(text) = found {
                    on_scan.call(text);
                }
            });
        }

        #[cfg(not(target_family = "wasm"))]
        camera_error.set(Some("Camera scanning is only available in the browser.".into()));
    };

    let submit_manual = move |evt: FormEvent| {
        evt.prevent_default();
        let text = manual.read().trim().to_string();
        if !text.is_empty() {
            on_scan.call(text);
        }
    };

    rsx! {
        div { class: "qr-scanner",
            div { class: "scanner-view", hidden: !scanning(),
                video {
                    id: "qr-scanner-video",
                    autoplay: true,
                    muted: true,
                    "playsinline": "true",
                }
            }

            if let Some(ref err) = *camera_error.read() {
                div { class: "alert alert-error", "{err}" }
            }

            div { class: "scanner-controls",
                if scanning() {
                    button { onclick: move |_| scanning.set(false), "Stop Scanning" }
                } else {
                    button { class: "primary", onclick: start, "Start Scanning" }
                }
            }

            form { class: "manual-entry", onsubmit: submit_manual,
                label { "Or enter a batch code:" }
                input {
                    r#type: "text",
                    placeholder: "e.g., TOM-20240301-042",
                    value: "{manual}",
                    oninput: move |evt| manual.set(evt.value()),
                }
                button { r#type: "submit", "Look up" }
            }
        }
    }
}

/// Scan a batch label and jump to what the user can do with it.
#[component]
pub fn BatchScanView() -> Element {
    let auth = use_auth();
    let mut batch = use_signal(|| None::<Batch>);
    let mut error_msg = use_signal(|| None::<String>);
    let mut looking_up = use_signal(|| false);

    let on_scan = move |text: String| {
        let api = auth.peek().api();
        spawn(async move {
            looking_up.set(true);
            error_msg.set(None);
            batch.set(None);
            match lookup_scanned_batch(&api, &text).await {
                Ok(b) => batch.set(Some(b)),
                Err(e) => {
                    tracing::warn!("scan lookup failed: {e}");
                    error_msg.set(Some(e.user_message("Could not look up the scanned batch.")));
                }
            }
            looking_up.set(false);
        });
    };

    let role = auth.read().role();

    rsx! {
        div { class: "batch-scan",
            h2 { "Scan Batch QR Code" }
            p { "Point the camera at a SynerHarvest label, or type the batch code." }

            QrScanner { on_scan }

            if looking_up() {
                p { "Looking up batch..." }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            if let Some(ref b) = *batch.read() {
                div { class: "card scan-result",
                    div { class: "page-header",
                        h3 { "{b.code()}" }
                        StatusBadge { status: b.status_str().to_string() }
                    }
                    p { {b.product_name.clone().unwrap_or_default()} }
                    p { "Quantity: {b.quantity}" }
                    if let Some(id) = b.id {
                        div { class: "quick-actions",
                            for link in batch_quick_links(role, id, b.code()) {
                                Link { class: "button", key: "{link.path}", to: link.path.clone(), "{link.label}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
