//! Self-registration form rules.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::role::UserRole;

/// Central Sri Lanka.
pub const DEFAULT_LOCATION_COORDINATES: &str = "7.8731,80.7718";
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

/// Field name (camelCase, as the backend reports them) to message.
pub type FieldErrors = BTreeMap<String, String>;

/// Form state as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: Option<UserRole>,
    pub company_name: String,
    pub company_address: String,
    pub location_coordinates: String,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            role: Some(UserRole::Farmer),
            company_name: String::new(),
            company_address: String::new(),
            location_coordinates: DEFAULT_LOCATION_COORDINATES.to_string(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

impl RegistrationForm {
    /// Every field error at once. The required set does not depend on role.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut err = |field: &str, msg: &str| {
            errors.insert(field.to_string(), msg.to_string());
        };

        if self.username.trim().is_empty() {
            err("username", "Username is required");
        }
        if self.email.trim().is_empty() {
            err("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            err("email", "Email is invalid");
        }
        if self.password.is_empty() {
            err("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            err("password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            err("confirmPassword", "Passwords do not match");
        }
        if self.first_name.trim().is_empty() {
            err("firstName", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            err("lastName", "Last name is required");
        }
        match self.role {
            None => err("role", "Role is required"),
            Some(role) if !UserRole::registrable().contains(&role) => {
                err("role", "This role cannot be self-registered")
            }
            Some(_) => {}
        }
        errors
    }

    /// Validate and build the request body. The confirmation never leaves
    /// the form.
    pub fn into_request(self) -> Result<RegisterRequest, FieldErrors> {
        let errors = self.field_errors();
        let role = match self.role {
            Some(role) if errors.is_empty() => role,
            _ => return Err(errors),
        };
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role,
            phone_number: optional(self.phone_number),
            company_name: optional(self.company_name),
            company_address: optional(self.company_address),
            location_coordinates: optional(self.location_coordinates),
        })
    }
}

fn optional(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<String>,
}

/// A registration parked locally until an administrator approves it.
/// The password is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<String>,
    pub submitted_at: NaiveDateTime,
}

impl PendingRegistration {
    pub fn new(request: RegisterRequest, submitted_at: NaiveDateTime) -> Self {
        Self {
            username: request.username,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
            phone_number: request.phone_number,
            company_name: request.company_name,
            company_address: request.company_address,
            location_coordinates: request.location_coordinates,
            submitted_at,
        }
    }
}

pub const PENDING_APPROVAL_MESSAGE: &str =
    "Registration submitted. Your account is awaiting admin approval.";

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RegistrationForm {
        RegistrationForm {
            username: "kamal".into(),
            email: "kamal@farm.lk".into(),
            password: "rice-paddy-9".into(),
            confirm_password: "rice-paddy-9".into(),
            first_name: "Kamal".into(),
            last_name: "Perera".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_form_builds_request() {
        let req = filled().into_request().unwrap();
        assert_eq!(req.role, UserRole::Farmer);
        assert_eq!(req.location_coordinates.as_deref(), Some(DEFAULT_LOCATION_COORDINATES));
        assert_eq!(req.phone_number, None);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "Kamal");
        assert_eq!(json["role"], "FARMER");
        assert!(json.get("confirmPassword").is_none());
    }

    #[test]
    fn test_password_mismatch() {
        let mut form = filled();
        form.confirm_password = "something-else".into();
        let errors = form.into_request().unwrap_err();
        assert_eq!(errors.get("confirmPassword").map(String::as_str), Some("Passwords do not match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_short_password_and_bad_email() {
        let mut form = filled();
        form.password = "short".into();
        form.confirm_password = "short".into();
        form.email = "kamal.farm.lk".into();
        let errors = form.field_errors();
        assert_eq!(errors["password"], "Password must be at least 8 characters");
        assert_eq!(errors["email"], "Email is invalid");
    }

    #[test]
    fn test_required_fields_same_for_every_role() {
        let empty = RegistrationForm {
            location_coordinates: String::new(),
            ..Default::default()
        };
        let baseline: Vec<String> = empty.field_errors().into_keys().collect();
        for role in UserRole::registrable() {
            let form = RegistrationForm {
                role: Some(*role),
                ..empty.clone()
            };
            let keys: Vec<String> = form.field_errors().into_keys().collect();
            assert_eq!(keys, baseline);
        }
        assert_eq!(baseline, ["email", "firstName", "lastName", "password", "username"]);
    }

    #[test]
    fn test_admin_cannot_self_register() {
        let mut form = filled();
        form.role = Some(UserRole::Admin);
        assert!(form.field_errors().contains_key("role"));
        form.role = None;
        assert_eq!(form.field_errors()["role"], "Role is required");
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.c"));
    }

    #[test]
    fn test_pending_registration_drops_password() {
        let req = filled().into_request().unwrap();
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let pending = PendingRegistration::new(req, at);
        let json = serde_json::to_string(&pending).unwrap();
        assert!(!json.contains("rice-paddy-9"));
        assert!(json.contains("\"submittedAt\""));
    }
}
