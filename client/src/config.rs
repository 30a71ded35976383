use std::fmt;
use std::str::FromStr;

use harvest_common::tracking::DEFAULT_TRACKING_BASE_URL;
use harvest_common::weather::{DEFAULT_GEO_BASE_URL, DEFAULT_WEATHER_BASE_URL};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// What registering does with a valid form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationMode {
    /// `POST /auth/register`.
    Direct,
    /// Park the request in local storage for an administrator.
    #[default]
    Pending,
}

impl FromStr for RegistrationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(RegistrationMode::Direct),
            "pending" => Ok(RegistrationMode::Pending),
            other => Err(format!("unknown registration mode: {other}")),
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegistrationMode::Direct => "direct",
            RegistrationMode::Pending => "pending",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub weather_base_url: String,
    pub weather_geo_url: String,
    /// Weather calls fail with a clear error while this is unset.
    pub weather_api_key: Option<String>,
    pub tracking_base_url: String,
    pub registration_mode: RegistrationMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            weather_geo_url: DEFAULT_GEO_BASE_URL.to_string(),
            weather_api_key: None,
            tracking_base_url: DEFAULT_TRACKING_BASE_URL.to_string(),
            registration_mode: RegistrationMode::default(),
        }
    }
}

impl ClientConfig {
    /// Build from `HARVEST_*` values supplied by `lookup`, falling back to
    /// defaults. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let registration_mode = match get("HARVEST_REGISTRATION_MODE").map(|v| v.parse()) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                tracing::warn!("{e}, using {}", defaults.registration_mode);
                defaults.registration_mode
            }
            None => defaults.registration_mode,
        };
        Self {
            api_base_url: get("HARVEST_API_URL").unwrap_or(defaults.api_base_url),
            weather_base_url: get("HARVEST_WEATHER_URL").unwrap_or(defaults.weather_base_url),
            weather_geo_url: get("HARVEST_WEATHER_GEO_URL").unwrap_or(defaults.weather_geo_url),
            weather_api_key: get("HARVEST_WEATHER_KEY"),
            tracking_base_url: get("HARVEST_TRACKING_URL").unwrap_or(defaults.tracking_base_url),
            registration_mode,
        }
    }

    #[cfg(not(target_family = "wasm"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
