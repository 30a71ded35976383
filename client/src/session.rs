//! The signed-in user, shared with whoever holds a clone.

use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;
use harvest_common::identity::{LoginCredentials, UserProfile};
use harvest_common::registration::{PendingRegistration, RegisterRequest, PENDING_APPROVAL_MESSAGE};
use tracing::{info, warn};

use crate::auth::{AuthService, ProfileUpdate};
use crate::config::RegistrationMode;
use crate::error::Result;
use crate::http::ApiClient;
use crate::storage::{KeyValueStore, PENDING_REGISTRATION_KEY, TOKEN_KEY, USER_KEY};

/// Route a user lands on after signing in or registering.
pub const LANDING_ROUTE: &str = "/dashboard";

/// What happened to a valid registration.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Registered,
    PendingApproval { message: &'static str },
}

#[derive(Debug, Clone)]
pub struct Session<S> {
    api: ApiClient,
    store: S,
    mode: RegistrationMode,
    user: Arc<RwLock<Option<UserProfile>>>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(api: ApiClient, store: S, mode: RegistrationMode) -> Self {
        Self {
            api,
            store,
            mode,
            user: Arc::new(RwLock::new(None)),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn registration_mode(&self) -> RegistrationMode {
        self.mode
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.is_authenticated()
    }

    fn set_user(&self, user: Option<UserProfile>) {
        if let Ok(mut slot) = self.user.write() {
            *slot = user;
        }
    }

    /// Load the stored token and user without touching the network.
    pub fn restore(&self) -> Result<Option<UserProfile>> {
        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        self.api.set_token(Some(token));
        let user = match self.store.get(USER_KEY)? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| warn!("ignoring unreadable stored user: {e}"))
                .ok(),
            None => None,
        };
        self.set_user(user.clone());
        Ok(user)
    }

    /// Restore, then confirm the token with `/auth/me`. A rejected token
    /// signs the session out.
    pub async fn init(&self) -> Result<Option<UserProfile>> {
        if self.restore()?.is_none() && !self.is_authenticated() {
            return Ok(None);
        }
        match AuthService::new(self.api.clone()).current_user().await {
            Ok(user) => {
                self.remember(&user)?;
                Ok(Some(user))
            }
            Err(e) => {
                warn!("stored session rejected: {e}");
                self.logout()?;
                Ok(None)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let credentials = LoginCredentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let resp = AuthService::new(self.api.clone()).login(&credentials).await?;
        self.store.set(TOKEN_KEY, &resp.token)?;
        self.api.set_token(Some(resp.token));
        if let Err(e) = self.remember(&resp.user) {
            // No token without a user
            self.api.set_token(None);
            if let Err(clear) = self.store.remove(TOKEN_KEY) {
                warn!("could not clear token after failed sign-in: {clear}");
            }
            return Err(e);
        }
        info!(username = %resp.user.username, "signed in");
        Ok(resp.user)
    }

    /// Submit a validated registration the configured way.
    pub async fn register(
        &self,
        request: RegisterRequest,
        now: NaiveDateTime,
    ) -> Result<RegistrationOutcome> {
        match self.mode {
            RegistrationMode::Direct => {
                AuthService::new(self.api.clone()).register(&request).await?;
                info!(username = %request.username, "registered");
                Ok(RegistrationOutcome::Registered)
            }
            RegistrationMode::Pending => {
                let pending = PendingRegistration::new(request, now);
                self.store
                    .set(PENDING_REGISTRATION_KEY, &serde_json::to_string(&pending)?)?;
                info!(username = %pending.username, "registration parked for approval");
                Ok(RegistrationOutcome::PendingApproval {
                    message: PENDING_APPROVAL_MESSAGE,
                })
            }
        }
    }

    pub fn pending_registration(&self) -> Result<Option<PendingRegistration>> {
        match self.store.get(PENDING_REGISTRATION_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let user = AuthService::new(self.api.clone())
            .update_current_user(update)
            .await?;
        self.remember(&user)?;
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.api.set_token(None);
        self.set_user(None);
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    fn remember(&self, user: &UserProfile) -> Result<()> {
        self.store.set(USER_KEY, &serde_json::to_string(user)?)?;
        self.set_user(Some(user.clone()));
        Ok(())
    }
}
