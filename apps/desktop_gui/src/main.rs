mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::DesktopGuiApp;

#[derive(Parser, Debug)]
#[command(name = "luxew-desktop", about = "Desktop administration of luXew user accounts")]
struct Args {
    /// Service description URL. Overrides luxew-client.toml and the environment.
    #[arg(long)]
    endpoint: Option<String>,
    /// Prefills the login form.
    #[arg(long)]
    username: Option<String>,
}

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(endpoint) = args.endpoint {
        settings.endpoint_url = endpoint;
    }
    let default_role = settings.default_role.clone();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("luXew administration")
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([760.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "luXew administration",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(DesktopGuiApp::new(
                cmd_tx,
                ui_rx,
                default_role,
                args.username.unwrap_or_default(),
            )))
        }),
    )
}
