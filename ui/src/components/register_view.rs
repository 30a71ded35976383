use dioxus::prelude::*;

use harvest_client::auth::REGISTRATION_FAILED;
use harvest_client::session::RegistrationOutcome;
use harvest_common::registration::{FieldErrors, RegistrationForm};
use harvest_common::role::UserRole;

use super::app::Route;
use super::auth_state::use_auth;

#[component]
pub fn RegisterView() -> Element {
    let auth = use_auth();
    let nav = use_navigator();
    let mut form = use_signal(RegistrationForm::default);
    let mut field_errors = use_signal(FieldErrors::new);
    let mut error_msg = use_signal(|| None::<String>);
    let mut pending_msg = use_signal(|| None::<&'static str>);
    let mut submitting = use_signal(|| false);

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        error_msg.set(None);
        let request = match form.read().clone().into_request() {
            Ok(request) => request,
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };
        field_errors.set(FieldErrors::new());
        spawn(async move {
            submitting.set(true);
            let session = auth.peek().session.clone();
            let now = chrono::Local::now().naive_local();
            match session.register(request, now).await {
                Ok(RegistrationOutcome::Registered) => {
                    nav.push(Route::Login {
                        redirect: String::new(),
                    });
                }
                Ok(RegistrationOutcome::PendingApproval { message }) => {
                    pending_msg.set(Some(message));
                }
                Err(e) => {
                    tracing::warn!("registration failed: {e}");
                    if let Some(errors) = e.field_errors() {
                        field_errors.set(errors.clone());
                    }
                    error_msg.set(Some(e.user_message(REGISTRATION_FAILED)));
                }
            }
            submitting.set(false);
        });
    };

    if let Some(message) = pending_msg() {
        return rsx! {
            div { class: "auth-page",
                div { class: "auth-card",
                    h2 { "Thanks for registering" }
                    div { class: "alert alert-success", "{message}" }
                    Link { to: Route::Login { redirect: String::new() }, "Back to sign in" }
                }
            }
        };
    }

    let role_value = form.read().role.map(UserRole::as_str).unwrap_or_default();

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card wide",
                h2 { "Create an account" }

                if let Some(ref err) = *error_msg.read() {
                    div { class: "alert alert-error", "{err}" }
                }

                form { onsubmit: submit,
                    // ── Account ──
                    div { class: "form-row",
                        FormField {
                            label: "Username",
                            name: "username",
                            value: form.read().username.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().username = v,
                        }
                        FormField {
                            label: "Email",
                            name: "email",
                            input_type: "email",
                            value: form.read().email.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().email = v,
                        }
                    }
                    div { class: "form-row",
                        FormField {
                            label: "Password",
                            name: "password",
                            input_type: "password",
                            value: form.read().password.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().password = v,
                        }
                        FormField {
                            label: "Confirm Password",
                            name: "confirmPassword",
                            input_type: "password",
                            value: form.read().confirm_password.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().confirm_password = v,
                        }
                    }

                    // ── Person ──
                    div { class: "form-row",
                        FormField {
                            label: "First Name",
                            name: "firstName",
                            value: form.read().first_name.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().first_name = v,
                        }
                        FormField {
                            label: "Last Name",
                            name: "lastName",
                            value: form.read().last_name.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().last_name = v,
                        }
                    }
                    div { class: "form-group",
                        label { "Role:" }
                        select {
                            value: "{role_value}",
                            onchange: move |evt| form.write().role = evt.value().parse().ok(),
                            for role in UserRole::registrable() {
                                option { value: role.as_str(), "{role.label()}" }
                            }
                        }
                        if let Some(err) = field_errors.read().get("role") {
                            span { class: "field-error", "{err}" }
                        }
                    }

                    // ── Business (optional) ──
                    div { class: "form-row",
                        FormField {
                            label: "Phone Number",
                            name: "phoneNumber",
                            input_type: "tel",
                            value: form.read().phone_number.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().phone_number = v,
                        }
                        FormField {
                            label: "Company Name",
                            name: "companyName",
                            value: form.read().company_name.clone(),
                            errors: field_errors(),
                            oninput: move |v| form.write().company_name = v,
                        }
                    }
                    FormField {
                        label: "Company Address",
                        name: "companyAddress",
                        value: form.read().company_address.clone(),
                        errors: field_errors(),
                        oninput: move |v| form.write().company_address = v,
                    }
                    FormField {
                        label: "Location Coordinates (lat,lon)",
                        name: "locationCoordinates",
                        value: form.read().location_coordinates.clone(),
                        errors: field_errors(),
                        oninput: move |v| form.write().location_coordinates = v,
                    }

                    button {
                        r#type: "submit",
                        disabled: submitting(),
                        if submitting() { "Registering..." } else { "Register" }
                    }
                }

                p { class: "auth-footer",
                    "Already registered? "
                    Link { to: Route::Login { redirect: String::new() }, "Sign in" }
                }
            }
        }
    }
}

/// Labelled input that shows the error reported for `name`, if any.
#[component]
fn FormField(
    label: &'static str,
    name: &'static str,
    #[props(default = "text")] input_type: &'static str,
    value: String,
    errors: FieldErrors,
    oninput: EventHandler<String>,
) -> Element {
    rsx! {
        div { class: "form-group",
            label { r#for: name, "{label}:" }
            input {
                id: name,
                r#type: input_type,
                value: "{value}",
                oninput: move |evt| oninput.call(evt.value()),
            }
            if let Some(err) = errors.get(name) {
                span { class: "field-error", "{err}" }
            }
        }
    }
}
