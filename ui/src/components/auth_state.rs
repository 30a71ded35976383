use dioxus::prelude::*;

use harvest_client::{ApiClient, ClientConfig, Session};
use harvest_common::identity::UserProfile;
use harvest_common::role::UserRole;

use super::local_store::LocalStore;

/// Build-time configuration, baked in with `option_env!`.
pub fn ui_config() -> ClientConfig {
    ClientConfig::from_lookup(|key| {
        let value = match key {
            "HARVEST_API_URL" => option_env!("HARVEST_API_URL"),
            "HARVEST_WEATHER_URL" => option_env!("HARVEST_WEATHER_URL"),
            "HARVEST_WEATHER_GEO_URL" => option_env!("HARVEST_WEATHER_GEO_URL"),
            "HARVEST_WEATHER_KEY" => option_env!("HARVEST_WEATHER_KEY"),
            "HARVEST_TRACKING_URL" => option_env!("HARVEST_TRACKING_URL"),
            "HARVEST_REGISTRATION_MODE" => option_env!("HARVEST_REGISTRATION_MODE"),
            _ => None,
        };
        value.map(str::to_string)
    })
}

/// The signed-in user and the session that talks to the backend.
///
/// `user` mirrors `session.user()` so components re-render when it changes.
/// `loading` stays true until the stored token has been checked.
#[derive(Clone)]
pub struct AuthState {
    pub session: Session<LocalStore>,
    pub config: ClientConfig,
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl AuthState {
    pub fn new() -> Self {
        let config = ui_config();
        let api = ApiClient::new(config.api_base_url.clone());
        let session = Session::new(api, LocalStore::default(), config.registration_mode);
        Self {
            session,
            config,
            user: None,
            loading: true,
        }
    }

    pub fn api(&self) -> ApiClient {
        self.session.api().clone()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().and_then(UserProfile::role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.session.is_authenticated()
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!("failed to clear stored session: {e}");
        }
        self.user = None;
    }
}

pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Shorthand for pages that only need the HTTP client.
pub fn use_api() -> ApiClient {
    use_auth().peek().api()
}
