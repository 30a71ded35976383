use harvest_common::identity::{AuthResponse, LoginCredentials, UserProfile};
use harvest_common::registration::RegisterRequest;
use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;

pub const LOGIN_FAILED: &str = "Failed to login. Please check your credentials.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        self.api.post("/auth/login", credentials).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value> {
        self.api.post("/auth/register", request).await
    }

    pub async fn current_user(&self) -> Result<UserProfile> {
        self.api.get("/auth/me").await
    }

    pub async fn update_current_user(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.api.put("/auth/me", update).await
    }
}
