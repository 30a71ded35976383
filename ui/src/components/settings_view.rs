use dioxus::prelude::*;

use harvest_client::auth::ProfileUpdate;
use harvest_common::identity::UserProfile;
use harvest_common::location::GeoLocation;

use super::auth_state::use_auth;

const PROFILE_FAILED: &str = "Failed to update profile. Please try again.";
const SUBMITTED_FORMAT: &str = "%Y-%m-%d %H:%M";

fn some_if_filled(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Clone, Default, PartialEq)]
struct ProfileFields {
    email: String,
    first_name: String,
    last_name: String,
    phone_number: String,
    company_name: String,
    company_address: String,
    location_coordinates: String,
}

impl ProfileFields {
    fn from_user(user: &UserProfile) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            company_name: user.company_name.clone().unwrap_or_default(),
            company_address: String::new(),
            location_coordinates: user.location_coordinates.clone().unwrap_or_default(),
        }
    }

    fn into_update(self) -> Result<ProfileUpdate, String> {
        let location_coordinates = some_if_filled(&self.location_coordinates);
        if let Some(ref coords) = location_coordinates {
            if GeoLocation::parse(coords).is_none() {
                return Err("Location must be given as latitude,longitude".into());
            }
        }
        Ok(ProfileUpdate {
            email: some_if_filled(&self.email),
            first_name: some_if_filled(&self.first_name),
            last_name: some_if_filled(&self.last_name),
            phone_number: some_if_filled(&self.phone_number),
            company_name: some_if_filled(&self.company_name),
            company_address: some_if_filled(&self.company_address),
            location_coordinates,
        })
    }
}

#[component]
pub fn SettingsView() -> Element {
    let mut auth = use_auth();
    let mut fields = use_signal(|| {
        auth.peek()
            .user
            .as_ref()
            .map(ProfileFields::from_user)
            .unwrap_or_default()
    });
    let mut error_msg = use_signal(|| None::<String>);
    let mut success_msg = use_signal(|| None::<&'static str>);
    let mut saving = use_signal(|| false);

    let pending = match auth.read().session.pending_registration() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("stored registration unreadable: {e}");
            None
        }
    };

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        error_msg.set(None);
        success_msg.set(None);
        let update = match fields().into_update() {
            Ok(u) => u,
            Err(msg) => {
                error_msg.set(Some(msg));
                return;
            }
        };
        let session = auth.peek().session.clone();
        spawn(async move {
            saving.set(true);
            match session.update_profile(&update).await {
                Ok(user) => {
                    tracing::info!(username = %user.username, "profile updated");
                    fields.set(ProfileFields::from_user(&user));
                    auth.write().user = Some(user);
                    success_msg.set(Some("Profile updated"));
                }
                Err(e) => error_msg.set(Some(e.user_message(PROFILE_FAILED))),
            }
            saving.set(false);
        });
    };

    let user = auth.read().user.clone();
    let f = fields();

    rsx! {
        div { class: "settings",
            h2 { "Settings" }
            if let Some(ref u) = user {
                p { class: "muted", "Signed in as {u.username} ({u.role})" }
            }
            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }
            if let Some(msg) = success_msg() {
                div { class: "alert alert-success", "{msg}" }
            }

            form { class: "card", onsubmit: submit,
                h3 { "Profile" }
                div { class: "form-row",
                    div { class: "form-group",
                        label { "First Name" }
                        input {
                            value: "{f.first_name}",
                            oninput: move |evt| fields.write().first_name = evt.value(),
                        }
                    }
                    div { class: "form-group",
                        label { "Last Name" }
                        input {
                            value: "{f.last_name}",
                            oninput: move |evt| fields.write().last_name = evt.value(),
                        }
                    }
                }
                div { class: "form-group",
                    label { "Email" }
                    input {
                        r#type: "email",
                        value: "{f.email}",
                        oninput: move |evt| fields.write().email = evt.value(),
                    }
                }
                div { class: "form-group",
                    label { "Phone Number" }
                    input {
                        r#type: "tel",
                        value: "{f.phone_number}",
                        oninput: move |evt| fields.write().phone_number = evt.value(),
                    }
                }
                div { class: "form-group",
                    label { "Company Name" }
                    input {
                        value: "{f.company_name}",
                        oninput: move |evt| fields.write().company_name = evt.value(),
                    }
                }
                div { class: "form-group",
                    label { "Company Address" }
                    input {
                        value: "{f.company_address}",
                        oninput: move |evt| fields.write().company_address = evt.value(),
                    }
                }
                div { class: "form-group",
                    label { "Location (latitude,longitude)" }
                    input {
                        placeholder: "7.8731,80.7718",
                        value: "{f.location_coordinates}",
                        oninput: move |evt| fields.write().location_coordinates = evt.value(),
                    }
                }
                button {
                    r#type: "submit",
                    class: "primary",
                    disabled: saving(),
                    if saving() { "Saving..." } else { "Save Changes" }
                }
            }

            if let Some(p) = pending {
                div { class: "card",
                    h3 { "Pending Registration" }
                    p { "{p.username} ({p.role}) submitted {p.submitted_at.format(SUBMITTED_FORMAT)}, awaiting admin approval." }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_left_out_of_update() {
        let fields = ProfileFields {
            first_name: " Ana ".into(),
            location_coordinates: "6.9271, 79.8612".into(),
            ..Default::default()
        };
        let update = fields.into_update().unwrap();
        assert_eq!(update.first_name.as_deref(), Some("Ana"));
        assert_eq!(update.email, None);
        assert_eq!(update.location_coordinates.as_deref(), Some("6.9271, 79.8612"));
    }

    #[test]
    fn test_bad_coordinates_rejected() {
        let fields = ProfileFields {
            location_coordinates: "somewhere".into(),
            ..Default::default()
        };
        assert!(fields.into_update().is_err());
    }
}
