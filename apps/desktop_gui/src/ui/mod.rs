//! UI layer for desktop GUI: app shell and the login/management screens.

pub mod app;
mod screens;

pub use app::DesktopGuiApp;
