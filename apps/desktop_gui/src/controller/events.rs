//! Events sent from the backend worker to the UI.

use shared::domain::{Acknowledgment, RoleName, UserId, UserRecord};

pub enum UiEvent {
    LoggedIn {
        username: String,
    },
    /// The worker's gateway gained or lost its session token.
    SessionChanged {
        authenticated: bool,
    },
    UsersLoaded(Vec<UserRecord>),
    RolesLoaded(Vec<RoleName>),
    UserAdded(Acknowledgment),
    UserModified(Acknowledgment),
    UserDeleted {
        id: UserId,
        ack: Acknowledgment,
    },
    /// Any failure; the UI hands it to the failure handler untouched.
    Failed(anyhow::Error),
}
