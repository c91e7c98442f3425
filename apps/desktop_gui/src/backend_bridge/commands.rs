//! Backend commands queued from UI to backend worker.

use shared::domain::{NewUser, UserId, UserUpdate};

pub enum BackendCommand {
    Login { username: String, password: String },
    ListUsers,
    ListRoles,
    AddUser(NewUser),
    ModifyUser(UserUpdate),
    DeleteUser(UserId),
    /// Drops the session and the binding held by the worker's gateway.
    SignOut,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::ListUsers => "list_users",
            Self::ListRoles => "list_roles",
            Self::AddUser(_) => "add_user",
            Self::ModifyUser(_) => "modify_user",
            Self::DeleteUser(_) => "delete_user",
            Self::SignOut => "sign_out",
        }
    }

    /// Whether the command runs against the signed-in session.
    pub fn needs_session(&self) -> bool {
        !matches!(self, Self::Login { .. } | Self::SignOut)
    }
}
