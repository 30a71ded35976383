use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a user can have on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Farmer,
    Distributor,
    Retailer,
    Consumer,
    Admin,
}

impl UserRole {
    pub fn all() -> &'static [UserRole] {
        &[
            UserRole::Farmer,
            UserRole::Distributor,
            UserRole::Retailer,
            UserRole::Consumer,
            UserRole::Admin,
        ]
    }

    /// Roles offered on the self-registration form. Admins are provisioned elsewhere.
    pub fn registrable() -> &'static [UserRole] {
        &[
            UserRole::Farmer,
            UserRole::Distributor,
            UserRole::Retailer,
            UserRole::Consumer,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Farmer => "FARMER",
            UserRole::Distributor => "DISTRIBUTOR",
            UserRole::Retailer => "RETAILER",
            UserRole::Consumer => "CONSUMER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserRole::Farmer => "Farmer",
            UserRole::Distributor => "Distributor",
            UserRole::Retailer => "Retailer",
            UserRole::Consumer => "Consumer",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::all()
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("farmer".parse::<UserRole>(), Ok(UserRole::Farmer));
        assert_eq!(" ADMIN ".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("GROWER".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_unknown_role_error() {
        let err = "GROWER".parse::<UserRole>().unwrap_err();
        assert_eq!(err, UnknownRole("GROWER".into()));
        assert_eq!(err.to_string(), "unknown role 'GROWER'");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&UserRole::Distributor).unwrap();
        assert_eq!(json, "\"DISTRIBUTOR\"");
        let role: UserRole = serde_json::from_str("\"RETAILER\"").unwrap();
        assert_eq!(role, UserRole::Retailer);
    }

    #[test]
    fn test_admin_not_registrable() {
        assert!(!UserRole::registrable().contains(&UserRole::Admin));
        assert_eq!(UserRole::registrable().len(), 4);
    }
}
