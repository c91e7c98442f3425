//! Runtime bridge between UI command queue and backend event intake.
//!
//! One worker thread owns the [`SoapGateway`]: it is the only holder of the
//! binding and the session token, and it runs the queued commands one at a
//! time.

use std::thread;

use anyhow::Context;
use client_core::{ClientSettings, SoapConnector, SoapGateway};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::error::GatewayError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let gateway = match SoapGateway::from_settings(&settings)
            .context("backend worker startup failure")
        {
            Ok(gateway) => gateway,
            Err(err) => {
                tracing::error!("failed to start backend worker: {err:#}");
                emit(&ui_tx, UiEvent::Failed(err));
                return;
            }
        };
        tracing::info!(endpoint = %gateway.endpoint(), "backend worker ready");
        run_worker(gateway, &cmd_rx, &ui_tx);
    });
}

/// Drains commands until the UI side hangs up. Session transitions are
/// reported before the command's own outcome.
///
/// Once the session is lost, commands that were queued behind the failing one
/// are skipped until the next login or sign-out.
pub fn run_worker<C: SoapConnector>(
    mut gateway: SoapGateway<C>,
    cmd_rx: &Receiver<BackendCommand>,
    ui_tx: &Sender<UiEvent>,
) {
    let mut session_lost = false;
    while let Ok(cmd) = cmd_rx.recv() {
        if session_lost && cmd.needs_session() {
            tracing::debug!(command = cmd.name(), "backend: session lost; skipping command");
            continue;
        }
        session_lost = false;

        tracing::debug!(command = cmd.name(), "backend: running command");
        let was_authenticated = gateway.is_authenticated();
        let outcome = execute(&mut gateway, cmd);

        let authenticated = gateway.is_authenticated();
        if authenticated != was_authenticated {
            session_lost = !authenticated;
            emit(ui_tx, UiEvent::SessionChanged { authenticated });
        }
        if let Some(event) = outcome {
            emit(ui_tx, event);
        }
    }
    tracing::debug!("backend: command queue closed");
}

fn execute<C: SoapConnector>(gateway: &mut SoapGateway<C>, cmd: BackendCommand) -> Option<UiEvent> {
    let result: Result<UiEvent, GatewayError> = match cmd {
        BackendCommand::Login { username, password } => gateway
            .authenticate(&username, &password)
            .map(|_| UiEvent::LoggedIn { username }),
        BackendCommand::ListUsers => gateway.list_users(None).map(UiEvent::UsersLoaded),
        BackendCommand::ListRoles => gateway.list_roles(None).map(UiEvent::RolesLoaded),
        BackendCommand::AddUser(user) => gateway.add_user(None, &user).map(UiEvent::UserAdded),
        BackendCommand::ModifyUser(update) => gateway
            .modify_user(None, &update)
            .map(UiEvent::UserModified),
        BackendCommand::DeleteUser(id) => gateway
            .delete_user(None, id)
            .map(|ack| UiEvent::UserDeleted { id, ack }),
        BackendCommand::SignOut => {
            gateway.disconnect();
            return None;
        }
    };
    Some(result.unwrap_or_else(|err| UiEvent::Failed(err.into())))
}

/// Failures and session changes wait for room in the queue; anything else is
/// dropped when the UI falls behind.
fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if matches!(event, UiEvent::Failed(_) | UiEvent::SessionChanged { .. }) {
        if ui_tx.send(event).is_err() {
            tracing::debug!("ui event queue closed");
        }
        return;
    }
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => tracing::warn!("ui event queue is full; dropping event"),
        Err(TrySendError::Disconnected(_)) => tracing::debug!("ui event queue closed"),
    }
}
