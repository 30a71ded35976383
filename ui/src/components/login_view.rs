use dioxus::prelude::*;

use harvest_client::auth::LOGIN_FAILED;

use super::app::Route;
use super::auth_state::use_auth;

#[component]
pub fn LoginView(redirect: String) -> Element {
    let mut auth = use_auth();
    let nav = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error_msg = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let can_submit = use_memo(move || {
        !username.read().trim().is_empty() && !password.read().is_empty() && !submitting()
    });

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let redirect = redirect.clone();
        spawn(async move {
            submitting.set(true);
            error_msg.set(None);
            let session = auth.peek().session.clone();
            let name = username.read().clone();
            let pass = password.read().clone();
            match session.login(&name, &pass).await {
                Ok(user) => {
                    auth.write().user = Some(user);
                    let target = redirect.parse::<Route>().unwrap_or(Route::Dashboard {});
                    nav.replace(target);
                }
                Err(e) => {
                    tracing::warn!("login failed: {e}");
                    error_msg.set(Some(e.user_message(LOGIN_FAILED)));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h2 { "Sign in to SynerHarvest" }

                if let Some(ref err) = *error_msg.read() {
                    div { class: "alert alert-error", "{err}" }
                }

                form { onsubmit: submit,
                    div { class: "form-group",
                        label { "Username:" }
                        input {
                            r#type: "text",
                            autocomplete: "username",
                            value: "{username}",
                            oninput: move |evt| username.set(evt.value()),
                        }
                    }
                    div { class: "form-group",
                        label { "Password:" }
                        input {
                            r#type: "password",
                            autocomplete: "current-password",
                            value: "{password}",
                            oninput: move |evt| password.set(evt.value()),
                        }
                    }
                    button {
                        r#type: "submit",
                        disabled: !can_submit(),
                        if submitting() { "Signing in..." } else { "Sign In" }
                    }
                }

                p { class: "auth-footer",
                    "No account yet? "
                    Link { to: Route::Register {}, "Register" }
                }
                p { class: "auth-footer",
                    Link { to: Route::TrackSearch {}, "Track a product without signing in" }
                }
            }
        }
    }
}
