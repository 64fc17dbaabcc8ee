use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Contributor,
}

impl UserRole {
    /// Role names arrive as free-form strings from the login form and
    /// the preference store; match them leniently.
    pub fn parse(raw: &str) -> Option<UserRole> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "contributor" => Some(UserRole::Contributor),
            _ => None,
        }
    }
}

/// The signed-in user. The role is self-declared at login and persisted
/// client-side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub role: UserRole,
}
