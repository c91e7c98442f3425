//! `luxew-admin`: administer luXew user accounts from a terminal.

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use client_core::{
    acknowledgment_notice, handle_failure, load_settings, AppShell, Notice, NoticeLevel, Screen,
    SoapConnector, SoapGateway,
};
use shared::domain::{Acknowledgment, NewUser, UserId, UserRecord, UserUpdate};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "luxew-admin", version, about = "Administer luXew user accounts")]
struct Args {
    /// Service description URL. Overrides luxew-client.toml and the environment.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, short = 'u')]
    username: String,
    #[arg(long, short = 'p', env = "LUXEW_PASSWORD", hide_env_values = true)]
    password: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List the roles known to the backend.
    Roles,
    /// List user accounts.
    Users {
        #[arg(long)]
        json: bool,
    },
    /// Create an account.
    Add {
        pseudo: String,
        email: String,
        #[arg(long = "user-password")]
        user_password: String,
        /// Defaults to the configured role.
        #[arg(long)]
        role: Option<String>,
    },
    /// Change the pseudo, email or role of an account.
    #[command(group(ArgGroup::new("changes").args(["pseudo", "email"]).required(true).multiple(true)))]
    Modify {
        id: UserId,
        #[arg(long)]
        pseudo: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete an account.
    Delete {
        id: UserId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

/// Terminal rendition of the application shell: notices go to the output
/// streams and there is no screen to return to.
struct ConsoleShell<O: Write, E: Write> {
    out: O,
    err: E,
    signed_out: bool,
}

impl<O: Write, E: Write> ConsoleShell<O, E> {
    fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            signed_out: false,
        }
    }
}

impl<O: Write, E: Write> AppShell for ConsoleShell<O, E> {
    fn navigate(&mut self, screen: Screen) {
        if screen == Screen::Login {
            let _ = writeln!(self.err, "Sign in again with --username and --password.");
        }
    }

    fn clear_session(&mut self) {
        self.signed_out = true;
    }

    fn notify(&mut self, notice: Notice) {
        let _ = match notice.level {
            NoticeLevel::Info => writeln!(self.out, "{}", notice.message),
            NoticeLevel::Error => writeln!(self.err, "{}: {}", notice.title, notice.message),
        };
    }
}

/// Signs in, then runs one subcommand. `Ok(false)` means the backend refused
/// a mutation and its notice has already been shown.
fn execute<C, O, E>(
    args: &Args,
    default_role: &str,
    gateway: &mut SoapGateway<C>,
    input: &mut dyn BufRead,
    shell: &mut ConsoleShell<O, E>,
) -> Result<bool>
where
    C: SoapConnector,
    O: Write,
    E: Write,
{
    gateway.authenticate(&args.username, &args.password)?;

    match &args.command {
        Command::Roles => {
            for role in gateway.list_roles(None)? {
                writeln!(shell.out, "{role}")?;
            }
            Ok(true)
        }
        Command::Users { json } => {
            let users = gateway.list_users(None)?;
            if *json {
                writeln!(shell.out, "{}", serde_json::to_string_pretty(&users)?)?;
            } else {
                write_user_table(&mut shell.out, &users)?;
            }
            Ok(true)
        }
        Command::Add {
            pseudo,
            email,
            user_password,
            role,
        } => {
            let ack = gateway.add_user(
                None,
                &NewUser {
                    username: pseudo.clone(),
                    email: email.clone(),
                    password: user_password.clone(),
                    role: role.clone().unwrap_or_else(|| default_role.to_string()),
                },
            )?;
            Ok(report(shell, &ack, added_message(&ack), "Failed to add the user"))
        }
        Command::Modify {
            id,
            pseudo,
            email,
            role,
        } => {
            let ack = gateway.modify_user(
                None,
                &UserUpdate {
                    id: *id,
                    username: pseudo.clone().unwrap_or_default(),
                    email: email.clone().unwrap_or_default(),
                    role: role.clone(),
                },
            )?;
            Ok(report(shell, &ack, "User modified", "Failed to modify the user"))
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete user ID {id}?"), input, &mut shell.out)? {
                writeln!(shell.out, "Cancelled.")?;
                return Ok(true);
            }
            let ack = gateway.delete_user(None, *id)?;
            Ok(report(shell, &ack, "User deleted", "Failed to delete the user"))
        }
    }
}

fn added_message(ack: &Acknowledgment) -> String {
    match ack.new_id {
        Some(id) => format!("User added (ID: {id})"),
        None => "User added".to_string(),
    }
}

fn report<O: Write, E: Write>(
    shell: &mut ConsoleShell<O, E>,
    ack: &Acknowledgment,
    on_success: impl Into<String>,
    fallback: &str,
) -> bool {
    shell.notify(acknowledgment_notice(ack, on_success, fallback));
    ack.success
}

fn confirm(prompt: &str, input: &mut dyn BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui"
    ))
}

fn write_user_table(out: &mut impl Write, users: &[UserRecord]) -> io::Result<()> {
    if users.is_empty() {
        return writeln!(out, "No users.");
    }

    let pseudo_width = column_width("PSEUDO", users.iter().map(|user| user.pseudo.as_str()));
    let email_width = column_width("EMAIL", users.iter().map(|user| user.email.as_str()));
    writeln!(
        out,
        "{:>6}  {:<pseudo_width$}  {:<email_width$}  ROLES",
        "ID", "PSEUDO", "EMAIL"
    )?;
    for user in users {
        writeln!(
            out,
            "{:>6}  {:<pseudo_width$}  {:<email_width$}  {}",
            user.id.0,
            user.pseudo,
            user.email,
            user.roles_label()
        )?;
    }
    Ok(())
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = &args.endpoint {
        settings.endpoint_url = endpoint.clone();
    }
    tracing::debug!(endpoint = %settings.endpoint_url, "luxew-admin: settings loaded");

    let mut shell = ConsoleShell::new(io::stdout(), io::stderr());
    let mut gateway = match SoapGateway::from_settings(&settings) {
        Ok(gateway) => gateway,
        Err(err) => {
            handle_failure(&err, &mut shell);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let outcome = execute(
        &args,
        &settings.default_role,
        &mut gateway,
        &mut stdin.lock(),
        &mut shell,
    );
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            handle_failure(&err, &mut shell);
            if shell.signed_out {
                gateway.disconnect();
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
