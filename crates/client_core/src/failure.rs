//! Central reaction to failed remote calls.
//!
//! Every screen hands its failures to [`handle_failure`] together with the
//! application's [`AppShell`]; nothing else decides how an error is shown or
//! whether the session survives it.

use shared::{domain::Acknowledgment, error::GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    UserManagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Capabilities the handler may use on the running application.
pub trait AppShell {
    fn navigate(&mut self, screen: Screen);

    /// Drops the session held by the gateway.
    fn clear_session(&mut self);

    fn notify(&mut self, notice: Notice);

    fn record_unexpected(&mut self, detail: &str) {
        tracing::error!(detail, "unexpected failure");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledAs {
    SessionExpired,
    AuthenticationFailure,
    ConnectionFailure,
    Unexpected,
}

pub fn handle_failure<A: AppShell + ?Sized>(err: &anyhow::Error, app: &mut A) -> HandledAs {
    match err.downcast_ref::<GatewayError>() {
        Some(gateway_err) => handle_gateway_error(gateway_err, app),
        None => {
            let detail = format!("{err:#}");
            app.notify(Notice::error(
                "Unexpected error",
                format!("An unexpected error occurred: {detail}"),
            ));
            app.record_unexpected(&detail);
            HandledAs::Unexpected
        }
    }
}

pub fn handle_gateway_error<A: AppShell + ?Sized>(err: &GatewayError, app: &mut A) -> HandledAs {
    match err {
        GatewayError::SessionExpired => {
            app.notify(Notice::error(
                "Session expired",
                "Your session has expired. Please sign in again.",
            ));
            app.clear_session();
            app.navigate(Screen::Login);
            HandledAs::SessionExpired
        }
        GatewayError::AuthenticationFailure(message) => {
            app.notify(Notice::error("Authentication error", message.clone()));
            HandledAs::AuthenticationFailure
        }
        GatewayError::ConnectionFailure(message) => {
            app.notify(Notice::error("Connection error", message.clone()));
            HandledAs::ConnectionFailure
        }
    }
}

/// Notice for a mutation acknowledgment. A refusal shows the server's
/// message, or `fallback` when it sent none.
pub fn acknowledgment_notice(
    ack: &Acknowledgment,
    on_success: impl Into<String>,
    fallback: &str,
) -> Notice {
    if ack.success {
        return Notice::info("Success", on_success);
    }
    let message = ack
        .message
        .clone()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    Notice::error("Error", message)
}

#[cfg(test)]
#[path = "tests/failure_tests.rs"]
mod tests;
