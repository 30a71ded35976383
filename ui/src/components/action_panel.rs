//! Role-based actions on the public tracking page.

use dioxus::prelude::*;

use harvest_common::actions::{
    actions_for_role, admin_links, login_return_url, plan_submission, type_options,
    verification_message, ActionForm, ActionSubmission, ActionView, RoleAction,
};

use super::app::Route;
use super::auth_state::use_auth;
use super::batch_forms::EventFields;
use super::timer::pause;

const ACTION_DONE: &str = "Action completed successfully!";
const ACTION_FAILED: &str = "Failed to complete action. Please try again.";

#[component]
pub fn RoleBasedActionPanel(
    #[props(!optional)] batch_id: Option<i64>,
    batch_code: String,
    current_status: String,
    product_name: String,
    on_action_complete: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let mut active = use_signal(|| None::<RoleAction>);
    let mut form = use_signal(ActionForm::default);
    let mut error_msg = use_signal(|| None::<String>);
    let mut success_msg = use_signal(|| None::<&'static str>);
    let mut submitting = use_signal(|| false);

    let state = auth.read();
    let Some(ref user) = state.user else {
        let redirect = login_return_url(&batch_code);
        return rsx! {
            div { class: "role-actions-panel card",
                h3 { "Take Action" }
                p { "Please log in to perform actions on this batch." }
                button {
                    class: "primary",
                    onclick: move |_| {
                        nav.push(Route::Login { redirect: redirect.clone() });
                    },
                    "Log In"
                }
            }
        };
    };
    let role = user.role();
    let role_label = user.role.clone();
    let api = state.api();
    drop(state);

    let submit = {
        let current_status = current_status.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let Some(action) = active() else { return };
            error_msg.set(None);
            success_msg.set(None);
            let plan = match plan_submission(action, batch_id, &current_status, &form.read()) {
                Ok(plan) => plan,
                Err(msg) => {
                    error_msg.set(Some(msg));
                    return;
                }
            };
            let api = api.clone();
            spawn(async move {
                submitting.set(true);
                let service = api.batches();
                let result = match plan {
                    ActionSubmission::UpdateStatus {
                        batch_id,
                        status,
                        event,
                    } => service.update_status(batch_id, &status, &event).await.map(|_| ()),
                    ActionSubmission::AddEvent { batch_id, event } => {
                        service.add_event(batch_id, &event).await.map(|_| ())
                    }
                };
                submitting.set(false);
                match result {
                    Ok(()) => {
                        tracing::info!(action = action.id(), "batch action recorded");
                        success_msg.set(Some(ACTION_DONE));
                        pause(2000).await;
                        success_msg.set(None);
                        active.set(None);
                        on_action_complete.call(());
                    }
                    Err(e) => error_msg.set(Some(e.user_message(ACTION_FAILED))),
                }
            });
        }
    };

    let body = match active() {
        None => rsx! {
            div { class: "action-buttons",
                for spec in actions_for_role(role) {
                    button {
                        key: "{spec.action.id()}",
                        class: "action-button action-{spec.color}",
                        onclick: move |_| {
                            form.set(ActionForm::default());
                            error_msg.set(None);
                            active.set(Some(spec.action));
                        },
                        span { class: "icon icon-{spec.icon}" }
                        span { "{spec.label}" }
                    }
                }
            }
        },
        Some(action) => match action.view() {
            ActionView::Verification => rsx! {
                div { class: "verification-success",
                    h3 { "Product Verified!" }
                    p { {verification_message(&product_name, &batch_code)} }
                    button { class: "primary", onclick: move |_| active.set(None), "Close" }
                }
            },
            ActionView::AdminLinks => {
                let links = batch_id.map(|id| admin_links(action, id)).unwrap_or_default();
                rsx! {
                    div { class: "admin-links",
                        for link in links {
                            Link { class: "button", key: "{link.path}", to: link.path.clone(), "{link.label}" }
                        }
                        button { onclick: move |_| active.set(None), "Cancel" }
                    }
                }
            }
            ActionView::Empty => rsx! {},
            view => {
                let options = type_options(view, role);
                rsx! {
                    form { class: "action-form", onsubmit: submit,
                        EventFields {
                            form,
                            options,
                            location_required: matches!(view, ActionView::IssueForm | ActionView::SaleForm),
                            notes_required: matches!(view, ActionView::IssueForm | ActionView::FeedbackForm),
                        }
                        div { class: "wizard-buttons",
                            button {
                                r#type: "button",
                                onclick: move |_| active.set(None),
                                "Cancel"
                            }
                            button {
                                r#type: "submit",
                                class: "primary",
                                disabled: submitting(),
                                if submitting() { "Submitting..." } else { "Submit" }
                            }
                        }
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "role-actions-panel card",
            div { class: "role-actions-header",
                h3 {
                    "Actions"
                    span { class: "role-badge", "{role_label}" }
                }
                if active().is_some() {
                    button {
                        class: "back-button",
                        title: "Back to actions",
                        onclick: move |_| active.set(None),
                        "←"
                    }
                }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            if let Some(msg) = success_msg() {
                div { class: "alert alert-success", "{msg}" }
            }
            {body}
        }
    }
}
