//! Login and user management screens.

use client_core::{AppShell, Notice, NoticeLevel};
use eframe::egui;
use shared::domain::RoleName;

use crate::backend_bridge::commands::BackendCommand;
use crate::ui::app::DesktopGuiApp;

const FIELD_WIDTH: f32 = 240.0;
const UNCHANGED_ROLE: &str = "(unchanged)";

fn notice_color(level: NoticeLevel) -> egui::Color32 {
    match level {
        NoticeLevel::Info => egui::Color32::from_rgb(96, 170, 110),
        NoticeLevel::Error => egui::Color32::from_rgb(205, 92, 92),
    }
}

fn text_field(ui: &mut egui::Ui, value: &mut String) -> egui::Response {
    ui.add(egui::TextEdit::singleline(value).desired_width(FIELD_WIDTH))
}

fn password_field(ui: &mut egui::Ui, value: &mut String) -> egui::Response {
    ui.add(
        egui::TextEdit::singleline(value)
            .password(true)
            .desired_width(FIELD_WIDTH),
    )
}

impl DesktopGuiApp {
    pub(crate) fn show_login_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(48.0);
            ui.vertical_centered(|ui| {
                ui.heading("luXew administration");
                ui.weak("Sign in with an administrator account.");
                ui.add_space(12.0);
                self.show_notices(ui);
                ui.add_space(8.0);

                let mut submitted = false;
                egui::Grid::new("login_form")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Username");
                        let username = text_field(ui, &mut self.login.username);
                        ui.end_row();

                        ui.label("Password");
                        let password = password_field(ui, &mut self.login.password);
                        ui.end_row();

                        // Enter in either field submits.
                        let enter = ui.input(|input| input.key_pressed(egui::Key::Enter));
                        submitted = enter && (username.lost_focus() || password.lost_focus());
                    });

                ui.add_space(10.0);
                let label = if self.login_pending {
                    "Signing in..."
                } else {
                    "Sign in"
                };
                let button = egui::Button::new(egui::RichText::new(label).strong())
                    .min_size(egui::vec2(FIELD_WIDTH, 32.0));
                if ui.add_enabled(!self.login_pending, button).clicked() {
                    submitted = true;
                }
                if submitted && !self.login_pending {
                    self.submit_login();
                }
            });
        });
    }

    pub(crate) fn show_management_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("User management");
                if let Some(username) = &self.signed_in_as {
                    ui.weak(format!("signed in as {username}"));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Log out").clicked() {
                        self.sign_out();
                    }
                    if ui.button("Refresh").clicked() {
                        self.queue(BackendCommand::ListUsers);
                    }
                });
            });
            ui.separator();
            self.show_notices(ui);

            egui::ScrollArea::vertical()
                .id_salt("management_scroll")
                .show(ui, |ui| {
                    self.show_users_table(ui);
                    ui.add_space(12.0);
                    ui.separator();
                    ui.columns(3, |columns| {
                        self.show_add_form(&mut columns[0]);
                        self.show_modify_form(&mut columns[1]);
                        self.show_delete_form(&mut columns[2]);
                    });
                });
        });

        self.show_delete_confirmation(ctx);
    }

    fn show_notices(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = None;
        for (index, notice) in self.notices.iter().enumerate() {
            let color = notice_color(notice.level);
            egui::Frame::group(ui.style())
                .stroke(egui::Stroke::new(1.0, color))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(notice.title.as_str()).strong().color(color));
                        ui.label(notice.message.as_str());
                        if ui.small_button("Dismiss").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
        }
        if let Some(index) = dismissed {
            self.notices.remove(index);
        }
    }

    fn show_users_table(&self, ui: &mut egui::Ui) {
        ui.strong(format!("Users ({})", self.users.len()));
        if self.users.is_empty() {
            ui.weak("No users loaded.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("users_table")
            .max_height(260.0)
            .show(ui, |ui| {
                egui::Grid::new("users_grid")
                    .num_columns(4)
                    .striped(true)
                    .spacing([18.0, 6.0])
                    .show(ui, |ui| {
                        for header in ["ID", "Pseudo", "Email", "Roles"] {
                            ui.strong(header);
                        }
                        ui.end_row();

                        for user in &self.users {
                            ui.label(user.id.to_string());
                            ui.label(user.pseudo.as_str());
                            ui.label(user.email.as_str());
                            ui.label(user.roles_label());
                            ui.end_row();
                        }
                    });
            });
    }

    /// Roles to offer in the pickers; the default role until the list arrives.
    fn offered_roles(&self) -> Vec<RoleName> {
        if self.roles.is_empty() {
            vec![self.default_role.clone()]
        } else {
            self.roles.clone()
        }
    }

    fn show_add_form(&mut self, ui: &mut egui::Ui) {
        ui.strong("Add a user");
        let roles = self.offered_roles();
        egui::Grid::new("add_user_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("Pseudo");
                text_field(ui, &mut self.add_form.pseudo);
                ui.end_row();

                ui.label("Email");
                text_field(ui, &mut self.add_form.email);
                ui.end_row();

                ui.label("Password");
                password_field(ui, &mut self.add_form.password);
                ui.end_row();

                ui.label("Role");
                egui::ComboBox::from_id_salt("add_user_role")
                    .selected_text(self.add_form.role.as_str())
                    .show_ui(ui, |ui| {
                        for role in &roles {
                            ui.selectable_value(&mut self.add_form.role, role.clone(), role.as_str());
                        }
                    });
                ui.end_row();
            });

        if ui.button("Add").clicked() {
            match self.add_form.submit() {
                Ok(cmd) => self.queue(cmd),
                Err(message) => self.notify(Notice::error("Error", message)),
            }
        }
    }

    fn show_modify_form(&mut self, ui: &mut egui::Ui) {
        ui.strong("Modify a user");
        let roles = self.offered_roles();
        egui::Grid::new("modify_user_form")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("User ID");
                text_field(ui, &mut self.modify_form.id);
                ui.end_row();

                ui.label("New pseudo");
                text_field(ui, &mut self.modify_form.pseudo);
                ui.end_row();

                ui.label("New email");
                text_field(ui, &mut self.modify_form.email);
                ui.end_row();

                ui.label("Role");
                let selected = self
                    .modify_form
                    .role
                    .clone()
                    .unwrap_or_else(|| UNCHANGED_ROLE.to_string());
                egui::ComboBox::from_id_salt("modify_user_role")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.modify_form.role, None, UNCHANGED_ROLE);
                        for role in &roles {
                            ui.selectable_value(
                                &mut self.modify_form.role,
                                Some(role.clone()),
                                role.as_str(),
                            );
                        }
                    });
                ui.end_row();
            });

        if ui.button("Modify").clicked() {
            match self.modify_form.submit() {
                Ok(cmd) => self.queue(cmd),
                Err(message) => self.notify(Notice::error("Error", message)),
            }
        }
    }

    fn show_delete_form(&mut self, ui: &mut egui::Ui) {
        ui.strong("Delete a user");
        ui.horizontal(|ui| {
            ui.label("User ID");
            text_field(ui, &mut self.delete_form.id);
        });

        if ui.button("Delete").clicked() {
            match self.delete_form.target() {
                Ok(id) => self.pending_delete = Some(id),
                Err(message) => self.notify(Notice::error("Error", message)),
            }
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(id) = self.pending_delete else {
            return;
        };

        let mut decision = None;
        egui::Window::new("Confirm deletion")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Delete user ID {id}?"));
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("No").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.pending_delete = None;
                self.queue(BackendCommand::DeleteUser(id));
            }
            Some(false) => self.pending_delete = None,
            None => {}
        }
    }
}
