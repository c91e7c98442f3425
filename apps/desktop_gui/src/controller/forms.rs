//! Form state for the login and management screens, validated locally before
//! anything is queued for the backend.

use shared::domain::{NewUser, RoleName, UserId, UserUpdate};

use crate::backend_bridge::commands::BackendCommand;

pub const MISSING_FIELDS: &str = "Please fill in all fields";
pub const INVALID_ID: &str = "The user ID must be a number";
pub const NOTHING_TO_CHANGE: &str = "Enter a new pseudo or email";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn submit(&self) -> Result<BackendCommand, &'static str> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(MISSING_FIELDS);
        }
        Ok(BackendCommand::Login {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddUserForm {
    pub pseudo: String,
    pub email: String,
    pub password: String,
    pub role: RoleName,
}

impl AddUserForm {
    pub fn new(default_role: &str) -> Self {
        Self {
            pseudo: String::new(),
            email: String::new(),
            password: String::new(),
            role: default_role.to_string(),
        }
    }

    pub fn submit(&self) -> Result<BackendCommand, &'static str> {
        let pseudo = self.pseudo.trim();
        let email = self.email.trim();
        if pseudo.is_empty() || email.is_empty() || self.password.is_empty() || self.role.is_empty()
        {
            return Err(MISSING_FIELDS);
        }
        Ok(BackendCommand::AddUser(NewUser {
            username: pseudo.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role.clone(),
        }))
    }
}

/// `role` stays `None` until a role is picked, which leaves the stored role alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModifyUserForm {
    pub id: String,
    pub pseudo: String,
    pub email: String,
    pub role: Option<RoleName>,
}

impl ModifyUserForm {
    pub fn submit(&self) -> Result<BackendCommand, &'static str> {
        let id = parse_user_id(&self.id)?;
        let pseudo = self.pseudo.trim();
        let email = self.email.trim();
        if pseudo.is_empty() && email.is_empty() {
            return Err(NOTHING_TO_CHANGE);
        }
        Ok(BackendCommand::ModifyUser(UserUpdate {
            id,
            username: pseudo.to_string(),
            email: email.to_string(),
            role: self.role.clone(),
        }))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteUserForm {
    pub id: String,
}

impl DeleteUserForm {
    /// The id to confirm before a delete command is queued.
    pub fn target(&self) -> Result<UserId, &'static str> {
        parse_user_id(&self.id)
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, &'static str> {
    if raw.trim().is_empty() {
        return Err(MISSING_FIELDS);
    }
    raw.parse::<UserId>().map_err(|_| INVALID_ID)
}

/// Keeps the picked role when the backend offers it, otherwise falls back to
/// the default role or the first one offered.
pub fn reconcile_role(current: &str, default_role: &str, roles: &[RoleName]) -> RoleName {
    if roles.is_empty() || roles.iter().any(|role| role == current) {
        return current.to_string();
    }
    roles
        .iter()
        .find(|role| role.as_str() == default_role)
        .or_else(|| roles.first())
        .cloned()
        .unwrap_or_else(|| default_role.to_string())
}
