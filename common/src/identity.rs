use serde::{Deserialize, Serialize};

use crate::location::GeoLocation;
use crate::role::UserRole;

/// Credentials posted to `/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Response from `/auth/login`. The token is a bearer token for every later call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: UserProfile,
}

/// The signed-in user as the backend describes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Raw role string; the backend may send roles this client does not know.
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<String>,
}

impl UserProfile {
    pub fn role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }

    /// Farm or depot position from the profile, when it parses.
    pub fn location(&self) -> Option<GeoLocation> {
        self.location_coordinates.as_deref().and_then(GeoLocation::parse)
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
