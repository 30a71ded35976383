use dioxus::prelude::*;

use harvest_common::navigation::nav_items_for;

use super::app::Route;
use super::auth_state::use_auth;

#[component]
pub fn Sidebar() -> Element {
    let mut auth = use_auth();
    let nav = use_navigator();
    let current = use_route::<Route>().to_string();

    let state = auth.read();
    let items = nav_items_for(state.role());
    let (name, role_label) = match state.user {
        Some(ref user) => (
            user.display_name(),
            user.role().map(|r| r.label().to_string()).unwrap_or(user.role.clone()),
        ),
        None => (String::new(), String::new()),
    };
    drop(state);

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar-brand",
                h1 { "SynerHarvest" }
                p { "Farm to table, traced" }
            }
            div { class: "sidebar-user",
                span { class: "user-name", "{name}" }
                span { class: "user-role", "{role_label}" }
            }
            nav {
                ul {
                    for item in items {
                        li {
                            key: "{item.path}",
                            class: if current.starts_with(item.path) { "active" } else { "" },
                            Link { to: item.path,
                                span { class: "icon icon-{item.icon}" }
                                "{item.label}"
                            }
                        }
                    }
                }
            }
            button {
                class: "logout-button",
                onclick: move |_| {
                    auth.write().sign_out();
                    nav.replace(Route::Login { redirect: String::new() });
                },
                "Log out"
            }
        }
    }
}
