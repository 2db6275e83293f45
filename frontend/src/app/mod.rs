//! Main application structure.

mod canvas;
mod data_loading;
mod dialogs;
mod inspector;
mod render;
mod textures;

use std::sync::Arc;

use egui::{CentralPanel, Color32, Context, RichText, SidePanel, TopBottomPanel};
use egui_phosphor::regular as icons;
use signage_types::{RotationPhase, TemplateId};

use crate::api::SignageBackend;
use crate::config::Config;
use crate::editor::EditorState;
use crate::interaction::DragController;
use crate::state::{AppMessage, AppStateChannels};

use dialogs::Dialogs;
use inspector::InspectorForm;
use textures::TextureCache;

/// Spawn an async task on the tokio runtime.
pub fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// The template editor application.
pub struct SignageApp {
    /// Backend for all template operations
    api: Arc<dyn SignageBackend>,
    /// Template being edited
    template_id: Option<TemplateId>,
    /// Template id typed into the toolbar
    template_input: String,
    editor: EditorState,
    /// Canvas and TV preview drag sessions
    drag: DragController,
    /// Rotation phase shown for the selected block's visual
    phase: RotationPhase,
    channels: AppStateChannels,
    textures: TextureCache,
    dialogs: Dialogs,
    form: InspectorForm,
}

impl SignageApp {
    pub fn new(cc: &eframe::CreationContext<'_>, api: Arc<dyn SignageBackend>, config: &Config) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let channels = AppStateChannels::new();
        let textures = TextureCache::new(api.clone(), channels.sender());

        let mut app = Self {
            api,
            template_id: config.template_id.clone(),
            template_input: config
                .template_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            editor: EditorState::new(config.tv_preview),
            drag: DragController::new(),
            phase: RotationPhase::First,
            channels,
            textures,
            dialogs: Dialogs::default(),
            form: InspectorForm::default(),
        };

        if app.template_id.is_some() {
            app.load_template(&cc.egui_ctx);
        } else {
            app.editor.status = "Enter a template id to start editing".to_string();
        }
        app
    }

    /// Handle all messages from async operations.
    fn process_messages(&mut self, ctx: &Context) {
        while let Ok(msg) = self.channels.rx.try_recv() {
            let reload = msg.triggers_reload();
            match msg {
                AppMessage::TemplateLoaded(tree) => {
                    self.editor.status = format!(
                        "Editing '{}' ({} blocks)",
                        tree.template.display_name,
                        tree.blocks.len()
                    );
                    self.editor.set_tree(tree);
                    self.ensure_phase_valid();
                }
                AppMessage::TemplateLoadError(e) => {
                    self.editor.set_load_error(e);
                }
                AppMessage::StyleCommitted {
                    content_id,
                    commit,
                    result,
                } => {
                    self.editor.finish_commit(&content_id, commit, result);
                }
                AppMessage::OperationDone(label) => {
                    self.editor.status = label;
                    self.editor.error = None;
                }
                AppMessage::OperationFailed(e) => {
                    self.editor.fail(e);
                }
                AppMessage::UsersLoaded(users) => {
                    self.dialogs.save_as.users = users;
                }
                AppMessage::TemplateSaved(template) => {
                    self.editor.loading = false;
                    self.editor.status = format!(
                        "Saved copy '{}' (id {})",
                        template.display_name, template.id
                    );
                    self.dialogs.save_as.open = false;
                }
                AppMessage::ImageLoaded { url, image } => {
                    self.textures.finish(ctx, url, image);
                }
            }
            if reload {
                self.load_template(ctx);
            }
        }
    }

    /// Fall back to the first item when the selected rotation item is gone.
    fn ensure_phase_valid(&mut self) {
        let RotationPhase::Item { kind, index } = self.phase else {
            return;
        };
        let exists = self
            .selected_visual()
            .and_then(|c| c.style_config.rotation(kind))
            .is_some_and(|r| index < r.rotation_items.len());
        if !exists {
            self.phase = RotationPhase::First;
        }
    }

    fn selected_visual(&self) -> Option<&signage_types::Content> {
        let id = self.editor.selected_block.as_ref()?;
        self.editor.tree()?.block(id)?.visual()
    }

    fn show_toolbar(&mut self, ctx: &Context) {
        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Template:");
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.template_input).desired_width(120.0),
                );
                let submitted =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button(format!("{} Load", icons::ARROW_CLOCKWISE)).clicked() || submitted {
                    let id = self.template_input.trim();
                    if !id.is_empty() {
                        self.template_id = Some(TemplateId::from(id));
                        self.load_template(ctx);
                    }
                }

                ui.separator();

                let has_tree = self.editor.tree().is_some();
                ui.add_enabled_ui(has_tree && !self.editor.loading, |ui| {
                    if ui.button(format!("{} Add block", icons::PLUS)).clicked() {
                        self.add_block(ctx);
                    }
                    let merge_label =
                        format!("{} Merge ({})", icons::ARROWS_MERGE, self.editor.merge_selection.len());
                    if ui
                        .add_enabled(self.editor.can_merge(), egui::Button::new(merge_label))
                        .on_hover_text("Shift-click blocks to select them for merging")
                        .clicked()
                    {
                        self.merge_selected(ctx);
                    }
                    if !self.editor.merge_selection.is_empty() && ui.button(icons::X).clicked() {
                        self.editor.merge_selection.clear();
                    }

                    ui.separator();

                    if ui.button(format!("{} Details", icons::PENCIL_SIMPLE)).clicked() {
                        if let Some(tree) = self.editor.tree() {
                            self.dialogs.template.open_for(&tree.template);
                        }
                    }
                    if ui.button(format!("{} Save as", icons::FLOPPY_DISK)).clicked() {
                        if let Some(tree) = self.editor.tree() {
                            self.dialogs.save_as.open_for(&tree.template);
                        }
                        self.load_users(ctx);
                    }
                    if ui.button(format!("{} TV preview", icons::TELEVISION)).clicked() {
                        self.set_tv_preview(ctx, true);
                    }
                });

                if self.editor.loading {
                    ui.spinner();
                }
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &Context) {
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.editor.status);
                if let Some(error) = self.editor.error.clone() {
                    ui.separator();
                    ui.colored_label(Color32::from_rgb(230, 90, 90), format!("Error: {}", error));
                    if ui.small_button(icons::X).clicked() {
                        self.editor.error = None;
                    }
                }
            });
        });
    }

    fn show_block_list(&mut self, ctx: &Context) {
        SidePanel::left("blocks")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Blocks");
                ui.separator();

                let mut select = None;
                let mut toggle = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for b in self.editor.blocks() {
                        let id = &b.block.id;
                        let selected = self.editor.selected_block.as_ref() == Some(id);
                        let mut merging = self.editor.merge_selection.contains(id);

                        ui.horizontal(|ui| {
                            if ui.checkbox(&mut merging, "").changed() {
                                toggle = Some(id.clone());
                            }
                            let icon = match b.visual().map(|c| c.content_type) {
                                Some(signage_types::ContentType::Video) => icons::VIDEO_CAMERA,
                                Some(_) => icons::IMAGE,
                                None => icons::SQUARE,
                            };
                            let label = format!("{} Block {}", icon, b.block.block_index + 1);
                            if ui.selectable_label(selected, label).clicked() {
                                select = Some(id.clone());
                            }
                        });
                        if !b.contents.is_empty() {
                            ui.label(
                                RichText::new(format!("  {} contents", b.contents.len()))
                                    .small()
                                    .weak(),
                            );
                        }
                    }
                });

                if let Some(id) = toggle {
                    self.editor.toggle_merge(&id);
                }
                if let Some(id) = select {
                    self.editor.select_block(Some(id));
                    self.phase = RotationPhase::First;
                }
            });
    }

    fn show_load_error(&mut self, ctx: &Context, error: String) {
        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Could not load template");
                ui.add_space(8.0);
                ui.colored_label(Color32::from_rgb(230, 90, 90), error);
                ui.add_space(16.0);
                if ui.button(format!("{} Retry", icons::ARROW_CLOCKWISE)).clicked() {
                    self.load_template(ctx);
                }
            });
        });
    }

    fn set_tv_preview(&mut self, ctx: &Context, enabled: bool) {
        self.drag.cancel();
        self.editor.tv_preview = enabled;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(enabled));
    }

    fn show_tv_preview(&mut self, ctx: &Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.set_tv_preview(ctx, false);
            return;
        }
        CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::BLACK))
            .show(ctx, |ui| {
                self.show_canvas(ui, true);
            });
        egui::Area::new(egui::Id::new("tv_preview_exit"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
            .show(ctx, |ui| {
                if ui
                    .button(format!("{} Exit preview", icons::X))
                    .on_hover_text("Esc")
                    .clicked()
                {
                    self.set_tv_preview(ctx, false);
                }
            });
    }
}

impl eframe::App for SignageApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages(ctx);

        if self.editor.tv_preview && self.editor.tree().is_some() {
            self.show_tv_preview(ctx);
            return;
        }

        self.show_toolbar(ctx);
        self.show_status_bar(ctx);

        if let Some(error) = self.editor.load_error.clone() {
            self.show_load_error(ctx, error);
            return;
        }

        self.show_block_list(ctx);
        self.show_inspector(ctx);
        CentralPanel::default().show(ctx, |ui| {
            if self.editor.tree().is_some() {
                self.show_canvas(ui, false);
            } else if self.editor.loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            }
        });
        self.show_dialogs(ctx);
    }
}
