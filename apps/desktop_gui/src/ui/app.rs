use std::time::Duration;

use client_core::{acknowledgment_notice, handle_failure, AppShell, Notice, Screen};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Acknowledgment, RoleName, UserId, UserRecord};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    forms::{reconcile_role, AddUserForm, DeleteUserForm, LoginForm, ModifyUserForm},
    orchestration::dispatch_backend_command,
};

const MAX_NOTICES: usize = 4;

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(crate) default_role: RoleName,
    pub(crate) view: Screen,
    pub(crate) signed_in_as: Option<String>,
    pub(crate) login_pending: bool,
    pub(crate) login: LoginForm,
    pub(crate) users: Vec<UserRecord>,
    pub(crate) roles: Vec<RoleName>,
    pub(crate) add_form: AddUserForm,
    pub(crate) modify_form: ModifyUserForm,
    pub(crate) delete_form: DeleteUserForm,
    /// Set while the deletion confirmation is open.
    pub(crate) pending_delete: Option<UserId>,
    pub(crate) notices: Vec<Notice>,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        default_role: RoleName,
        username: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            add_form: AddUserForm::new(&default_role),
            default_role,
            view: Screen::Login,
            signed_in_as: None,
            login_pending: false,
            login: LoginForm {
                username,
                password: String::new(),
            },
            users: Vec::new(),
            roles: Vec::new(),
            modify_form: ModifyUserForm::default(),
            delete_form: DeleteUserForm::default(),
            pending_delete: None,
            notices: Vec::new(),
        }
    }

    pub(crate) fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::LoggedIn { username } => {
                tracing::info!(username = %username, "signed in");
                self.login_pending = false;
                self.login.password.clear();
                self.signed_in_as = Some(username);
                self.view = Screen::UserManagement;
                self.queue(BackendCommand::ListRoles);
                self.queue(BackendCommand::ListUsers);
            }
            UiEvent::SessionChanged { authenticated } => {
                if !authenticated {
                    self.leave_management();
                }
            }
            UiEvent::UsersLoaded(users) => self.users = users,
            UiEvent::RolesLoaded(roles) => {
                self.add_form.role =
                    reconcile_role(&self.add_form.role, &self.default_role, &roles);
                self.roles = roles;
            }
            UiEvent::UserAdded(ack) => {
                let on_success = match ack.new_id {
                    Some(id) => format!("User added (ID: {id})"),
                    None => "User added".to_string(),
                };
                if self.settle(&ack, on_success, "Failed to add the user") {
                    self.add_form = AddUserForm::new(&self.default_role);
                    self.add_form.role =
                        reconcile_role(&self.add_form.role, &self.default_role, &self.roles);
                }
            }
            UiEvent::UserModified(ack) => {
                if self.settle(&ack, "User modified", "Failed to modify the user") {
                    self.modify_form = ModifyUserForm::default();
                }
            }
            UiEvent::UserDeleted { id, ack } => {
                let on_success = format!("User ID {id} deleted");
                if self.settle(&ack, on_success, "Failed to delete the user") {
                    self.delete_form = DeleteUserForm::default();
                }
            }
            UiEvent::Failed(err) => {
                self.login_pending = false;
                handle_failure(&err, self);
            }
        }
    }

    /// Shows the acknowledgment and refreshes the list when it succeeded.
    fn settle(
        &mut self,
        ack: &Acknowledgment,
        on_success: impl Into<String>,
        fallback: &str,
    ) -> bool {
        self.notify(acknowledgment_notice(ack, on_success, fallback));
        if ack.success {
            self.queue(BackendCommand::ListUsers);
        }
        ack.success
    }

    fn leave_management(&mut self) {
        self.view = Screen::Login;
        self.signed_in_as = None;
        self.login_pending = false;
        self.users.clear();
        self.pending_delete = None;
    }

    pub(crate) fn queue(&mut self, cmd: BackendCommand) {
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            handle_failure(&err, self);
        }
    }

    pub(crate) fn submit_login(&mut self) {
        match self.login.submit() {
            Ok(cmd) => {
                self.login_pending = true;
                self.queue(cmd);
            }
            Err(message) => self.notify(Notice::error("Error", message)),
        }
    }

    pub(crate) fn sign_out(&mut self) {
        self.queue(BackendCommand::SignOut);
        self.leave_management();
        self.notify(Notice::info("Signed out", "You have been signed out."));
    }
}

impl AppShell for DesktopGuiApp {
    fn navigate(&mut self, screen: Screen) {
        match screen {
            Screen::Login => self.leave_management(),
            Screen::UserManagement => self.view = Screen::UserManagement,
        }
    }

    fn clear_session(&mut self) {
        self.queue(BackendCommand::SignOut);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        match self.view {
            Screen::Login => self.show_login_screen(ctx),
            Screen::UserManagement => self.show_management_screen(ctx),
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
