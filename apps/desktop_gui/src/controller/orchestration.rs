//! Command orchestration helpers from UI actions to backend command queue.

use anyhow::{bail, Result};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand) -> Result<()> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => bail!("UI command queue is full; please retry"),
        Err(TrySendError::Disconnected(_)) => {
            bail!("backend command processor disconnected (possible startup failure); restart the application")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn full_and_closed_queues_are_reported() {
        let (cmd_tx, cmd_rx) = bounded(1);
        dispatch_backend_command(&cmd_tx, BackendCommand::ListUsers).expect("queued");

        let full = dispatch_backend_command(&cmd_tx, BackendCommand::ListRoles)
            .expect_err("queue full");
        assert!(full.to_string().contains("queue is full"));

        drop(cmd_rx);
        let closed =
            dispatch_backend_command(&cmd_tx, BackendCommand::SignOut).expect_err("disconnected");
        assert!(closed.to_string().contains("disconnected"));
    }
}
