use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_newtype!(UserId);

/// Role names are whatever strings the backend hands out.
pub type RoleName = String;

pub const DEFAULT_ROLE: &str = "visiteur";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub pseudo: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<RoleName>,
}

impl UserRecord {
    pub fn roles_label(&self) -> String {
        if self.roles.is_empty() {
            "-".to_string()
        } else {
            self.roles.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: RoleName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// `None` keeps the role the backend already has on record.
    pub role: Option<RoleName>,
}

/// Opaque bearer credential handed out by `authentifierUtilisateur`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Result of add/modify/delete, passed through as the backend sent it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Acknowledgment {
    pub success: bool,
    pub message: Option<String>,
    pub new_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_debug_output_is_redacted() {
        let token = SessionToken::new("T1-secret");
        assert_eq!(format!("{token:?}"), "SessionToken(<redacted>)");
        assert_eq!(token.as_str(), "T1-secret");
    }

    #[test]
    fn blank_session_token_counts_as_empty() {
        assert!(SessionToken::new("  ").is_empty());
        assert!(!SessionToken::new("T1").is_empty());
    }

    #[test]
    fn user_id_parses_trimmed_text() {
        assert_eq!(" 42 ".parse::<UserId>().expect("id"), UserId(42));
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn roles_label_joins_roles_or_shows_dash() {
        let mut user = UserRecord {
            id: UserId(1),
            pseudo: "alice".into(),
            email: "alice@example.org".into(),
            roles: vec![],
        };
        assert_eq!(user.roles_label(), "-");
        user.roles = vec!["admin".into(), "editeur".into()];
        assert_eq!(user.roles_label(), "admin, editeur");
    }
}
