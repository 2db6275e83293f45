use egui::{Color32, Context, Sense, Stroke, StrokeKind, Vec2};
use egui_phosphor::regular as icons;
use signage_types::api::{SaveAsRequest, TemplateScope, User};
use signage_types::{
    BlockId, Content, ContentId, DiscountAnimation, DiscountBlockStyle, IconPosition, RecordId,
    RotationPhase, StyleConfig, StyleEdit, Template, TextAlign, TextLayer,
};

use crate::interaction::{DragController, DragTarget, ResizeHandle, Surface};

use super::inspector::keyword_combo;
use super::render;
use super::*;

/// Height of the block the text dialog preview stands in for, in reference pixels.
const PREVIEW_REFERENCE_HEIGHT: f32 = 540.0;

const FONT_WEIGHTS: [&str; 3] = ["normal", "500", "bold"];
const FONT_STYLES: [&str; 2] = ["normal", "italic"];

#[derive(Default)]
pub(super) struct Dialogs {
    pub text: TextLayerDialog,
    pub save_as: SaveAsDialog,
    pub template: TemplateDialog,
    /// Block awaiting delete confirmation.
    pub confirm_delete: Option<BlockId>,
}

/// Modal editor for a single text layer.
///
/// Works on a copy of the content's style; nothing is sent until saved.
#[derive(Default)]
pub(super) struct TextLayerDialog {
    content_id: Option<ContentId>,
    phase: RotationPhase,
    is_new: bool,
    draft: StyleConfig,
    layer_id: String,
    image_url: Option<String>,
    drag: DragController,
}

impl TextLayerDialog {
    pub(super) fn open(&mut self, content: &Content, phase: RotationPhase, layer: Option<TextLayer>) {
        let is_new = layer.is_none();
        let layer = layer.unwrap_or_else(|| TextLayer::new("New text"));
        let mut draft = content.style_config.clone();
        if is_new {
            if let Err(e) = draft.edit(&StyleEdit::AddTextLayer {
                phase,
                layer: layer.clone(),
            }) {
                tracing::warn!("Cannot add text layer to {:?}: {}", phase, e);
                return;
            }
        }

        *self = Self {
            content_id: Some(content.id.clone()),
            phase,
            is_new,
            draft,
            layer_id: layer.id,
            image_url: content.image_url.clone(),
            drag: DragController::new(),
        };
    }

    fn is_open(&self) -> bool {
        self.content_id.is_some()
    }

    fn close(&mut self) {
        *self = Self::default();
    }

    fn layer(&self) -> Option<&TextLayer> {
        self.draft
            .text_layers(self.phase)
            .iter()
            .find(|l| l.id == self.layer_id)
    }

    /// The edit to persist for the current draft.
    fn to_edit(&self) -> Option<StyleEdit> {
        let layer = self.layer()?.clone();
        Some(if self.is_new {
            StyleEdit::AddTextLayer {
                phase: self.phase,
                layer,
            }
        } else {
            StyleEdit::UpdateTextLayer {
                phase: self.phase,
                layer,
            }
        })
    }

    fn show_fields(&mut self, ui: &mut egui::Ui) {
        let Ok(layer) = self.draft.text_layer_mut(self.phase, &self.layer_id) else {
            return;
        };
        egui::Grid::new("text_layer_fields").num_columns(2).show(ui, |ui| {
            ui.label("Text");
            ui.text_edit_singleline(&mut layer.text);
            ui.end_row();
            ui.label("Color");
            ui.text_edit_singleline(&mut layer.color);
            ui.end_row();
            ui.label("Size");
            ui.add(egui::Slider::new(
                &mut layer.size,
                signage_types::style::TEXT_SIZE_MIN..=signage_types::style::TEXT_SIZE_MAX,
            ));
            ui.end_row();

            ui.label("Font");
            let mut family = layer.font_family.clone().unwrap_or_default();
            if ui.text_edit_singleline(&mut family).changed() {
                layer.font_family = Some(family).filter(|f| !f.is_empty());
            }
            ui.end_row();
            ui.label("Weight");
            egui::ComboBox::from_id_salt("font_weight")
                .selected_text(layer.font_weight.as_deref().unwrap_or("normal"))
                .show_ui(ui, |ui| {
                    for weight in FONT_WEIGHTS {
                        ui.selectable_value(&mut layer.font_weight, Some(weight.to_string()), weight);
                    }
                });
            ui.end_row();
            ui.label("Style");
            egui::ComboBox::from_id_salt("font_style")
                .selected_text(layer.font_style.as_deref().unwrap_or("normal"))
                .show_ui(ui, |ui| {
                    for style in FONT_STYLES {
                        ui.selectable_value(&mut layer.font_style, Some(style.to_string()), style);
                    }
                });
            ui.end_row();

            ui.label("Align");
            keyword_combo(ui, "text_align", &mut layer.text_align, TextAlign::KNOWN, |a| {
                a.to_string()
            });
            ui.end_row();

            ui.label("Icon");
            ui.horizontal(|ui| {
                let mut icon = layer.icon.clone().unwrap_or_default();
                if ui.text_edit_singleline(&mut icon).changed() {
                    layer.icon = Some(icon).filter(|i| !i.is_empty());
                }
                keyword_combo(
                    ui,
                    "icon_position",
                    &mut layer.icon_position,
                    IconPosition::KNOWN,
                    |p| p.to_string(),
                );
            });
            ui.end_row();

            ui.label("Discount block");
            ui.checkbox(&mut layer.is_discount_block, "");
            ui.end_row();
            if layer.is_discount_block {
                ui.label("Block style");
                keyword_combo(
                    ui,
                    "discount_block_style",
                    &mut layer.discount_block_style,
                    DiscountBlockStyle::KNOWN,
                    |s| s.to_string(),
                );
                ui.end_row();
                ui.label("Animation");
                keyword_combo(
                    ui,
                    "discount_animation",
                    &mut layer.discount_animation,
                    DiscountAnimation::KNOWN,
                    |a| a.to_string(),
                );
                ui.end_row();
                ui.label("Block color");
                let mut color = layer.block_color.clone().unwrap_or_default();
                if ui.text_edit_singleline(&mut color).changed() {
                    layer.block_color = Some(color).filter(|c| !c.is_empty());
                }
                ui.end_row();
            }
        });
    }

    /// Draft surface: the layer can be moved and resized without saving.
    fn show_preview(&mut self, ui: &mut egui::Ui, textures: &mut super::textures::TextureCache) {
        let width = ui.available_width().min(560.0);
        let (response, painter) =
            ui.allocate_painter(Vec2::new(width, width * 9.0 / 16.0), Sense::click_and_drag());
        let rect = response.rect;
        let ctx = ui.ctx().clone();
        let px_scale = rect.height() / PREVIEW_REFERENCE_HEIGHT;

        painter.rect_filled(rect, 0.0, Color32::from_gray(24));
        if let Some(url) = self.image_url.as_deref() {
            if let Some(texture) = textures.get(&ctx, url) {
                let target = render::fitted_rect(
                    rect,
                    texture.size_vec2(),
                    &self.draft.image_fit.clone().unwrap_or_default(),
                    self.draft.image_scale_xy(),
                );
                painter.with_clip_rect(rect).image(
                    texture.id(),
                    target,
                    egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        }

        let clipped = painter.with_clip_rect(rect);
        let mut edited = None;
        for layer in self.draft.text_layers(self.phase) {
            let r = render::paint_text_layer(&clipped, rect, layer, px_scale);
            if layer.id == self.layer_id {
                edited = Some(r);
            }
        }
        let Some(layer_rect) = edited else {
            return;
        };
        clipped.rect_stroke(layer_rect, 0.0, Stroke::new(1.0, Color32::WHITE), StrokeKind::Outside);
        render::paint_handles(&clipped, layer_rect, ResizeHandle::corners());

        if self.drag.is_dragging() {
            if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                if let Some((_, patch)) = self.drag.on_pointer_move(pos) {
                    if let Err(e) = self.draft.apply(&patch) {
                        tracing::warn!("Draft edit rejected: {}", e);
                        self.drag.cancel();
                    }
                }
            }
            if ui.input(|i| i.pointer.any_released()) {
                self.drag.on_pointer_up();
            }
            return;
        }

        if !response.drag_started() {
            return;
        }
        let Some(origin) = ui.input(|i| i.pointer.press_origin()) else {
            return;
        };
        let handle = ResizeHandle::corners()
            .iter()
            .copied()
            .find(|h| egui::Rect::from_center_size(h.anchor(layer_rect), Vec2::splat(16.0)).contains(origin));
        let target = match handle {
            Some(handle) => DragTarget::TextResize {
                phase: self.phase,
                layer_id: self.layer_id.clone(),
                handle,
            },
            None if layer_rect.contains(origin) => DragTarget::TextMove {
                phase: self.phase,
                layer_id: self.layer_id.clone(),
            },
            None => return,
        };
        let Some(content_id) = self.content_id.clone() else {
            return;
        };
        if let Err(e) = self
            .drag
            .begin(content_id, &self.draft, target, Surface::Draft, rect, origin)
        {
            tracing::warn!("Cannot start draft drag: {}", e);
        }
    }
}

#[derive(Default)]
pub(super) struct SaveAsDialog {
    pub open: bool,
    name: String,
    scope: TemplateScope,
    target_user: Option<RecordId>,
    pub users: Vec<User>,
}

impl SaveAsDialog {
    pub(super) fn open_for(&mut self, template: &Template) {
        self.open = true;
        self.name = format!("{} (copy)", template.display_name);
        self.scope = TemplateScope::User;
        self.target_user = None;
    }

    fn request(&self) -> SaveAsRequest {
        SaveAsRequest {
            scope: self.scope,
            target_user_id: self.target_user.clone(),
            display_name: Some(self.name.trim().to_string()).filter(|n| !n.is_empty()),
        }
    }
}

fn user_label(user: &User) -> String {
    match &user.display_name {
        Some(name) => format!("{} <{}>", name, user.email),
        None => user.email.clone(),
    }
}

#[derive(Default)]
pub(super) struct TemplateDialog {
    open: bool,
    name: String,
    description: String,
}

impl TemplateDialog {
    pub(super) fn open_for(&mut self, template: &Template) {
        self.open = true;
        self.name = template.display_name.clone();
        self.description = template.description.clone().unwrap_or_default();
    }
}

impl SignageApp {
    pub(super) fn show_dialogs(&mut self, ctx: &Context) {
        self.show_text_dialog(ctx);
        self.show_save_as_dialog(ctx);
        self.show_template_dialog(ctx);
        self.show_delete_dialog(ctx);
    }

    fn show_text_dialog(&mut self, ctx: &Context) {
        if !self.dialogs.text.is_open() {
            return;
        }
        let mut open = true;
        let mut save = false;
        let mut cancel = false;

        egui::Window::new("Text layer")
            .open(&mut open)
            .resizable(true)
            .default_width(580.0)
            .show(ctx, |ui| {
                let dialog = &mut self.dialogs.text;
                dialog.show_fields(ui);
                ui.separator();
                ui.label(egui::RichText::new("Drag to move, corners to resize").small().weak());
                dialog.show_preview(ui, &mut self.textures);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button(format!("{} Save", icons::FLOPPY_DISK)).clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if save {
            let edit = self.dialogs.text.to_edit();
            let content_id = self.dialogs.text.content_id.clone();
            if let (Some(edit), Some(content_id)) = (edit, content_id) {
                self.edit_style(ctx, &content_id, edit);
            }
        }
        if save || cancel || !open {
            self.dialogs.text.close();
        }
    }

    fn show_save_as_dialog(&mut self, ctx: &Context) {
        if !self.dialogs.save_as.open {
            return;
        }
        let mut open = true;
        let mut submit = None;

        egui::Window::new("Save template as")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let dialog = &mut self.dialogs.save_as;
                egui::Grid::new("save_as_fields").num_columns(2).show(ui, |ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut dialog.name);
                    ui.end_row();

                    ui.label("Library");
                    ui.horizontal(|ui| {
                        ui.radio_value(&mut dialog.scope, TemplateScope::User, "User");
                        ui.radio_value(&mut dialog.scope, TemplateScope::System, "System");
                    });
                    ui.end_row();

                    ui.label("Owner");
                    let selected = dialog
                        .target_user
                        .as_ref()
                        .and_then(|id| dialog.users.iter().find(|u| &u.id == id))
                        .map(user_label)
                        .unwrap_or_else(|| "Me".to_string());
                    egui::ComboBox::from_id_salt("save_as_owner")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut dialog.target_user, None, "Me");
                            for user in &dialog.users {
                                ui.selectable_value(
                                    &mut dialog.target_user,
                                    Some(user.id.clone()),
                                    user_label(user),
                                );
                            }
                        });
                    ui.end_row();
                });

                ui.separator();
                let valid = !dialog.name.trim().is_empty();
                if ui
                    .add_enabled(valid && !self.editor.loading, egui::Button::new("Save copy"))
                    .clicked()
                {
                    submit = Some(dialog.request());
                }
            });

        if let Some(req) = submit {
            self.save_as(ctx, req);
        }
        if !open {
            self.dialogs.save_as.open = false;
        }
    }

    fn show_template_dialog(&mut self, ctx: &Context) {
        if !self.dialogs.template.open {
            return;
        }
        let mut open = true;
        let mut submit = None;

        egui::Window::new("Template details")
            .open(&mut open)
            .collapsible(false)
            .show(ctx, |ui| {
                let dialog = &mut self.dialogs.template;
                ui.label("Name");
                ui.text_edit_singleline(&mut dialog.name);
                ui.label("Description");
                ui.text_edit_multiline(&mut dialog.description);
                if ui.button(format!("{} Save", icons::FLOPPY_DISK)).clicked() {
                    submit = Some((dialog.name.clone(), Some(dialog.description.clone())));
                }
            });

        if let Some((name, description)) = submit {
            self.update_template_metadata(ctx, name, description);
            self.dialogs.template.open = false;
        }
        if !open {
            self.dialogs.template.open = false;
        }
    }

    fn show_delete_dialog(&mut self, ctx: &Context) {
        let Some(block_id) = self.dialogs.confirm_delete.clone() else {
            return;
        };
        let mut confirmed = false;
        let mut dismissed = false;

        egui::Window::new("Delete block")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Delete this block and all of its contents?");
                ui.horizontal(|ui| {
                    if ui.button(format!("{} Delete", icons::TRASH)).clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        dismissed = true;
                    }
                });
            });

        if confirmed {
            self.delete_block(ctx, block_id);
        }
        if confirmed || dismissed {
            self.dialogs.confirm_delete = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signage_types::ContentType;

    fn content() -> Content {
        let mut style = StyleConfig::default();
        style.text_layers.push(TextLayer {
            id: "t1".into(),
            ..TextLayer::new("Espresso")
        });
        Content {
            id: "c1".into(),
            block_id: Some("b1".into()),
            content_type: ContentType::Image,
            title: None,
            price: None,
            description: None,
            image_url: None,
            style_config: style,
        }
    }

    #[test]
    fn test_new_text_layer_becomes_add_edit() {
        let mut dialog = TextLayerDialog::default();
        dialog.open(&content(), RotationPhase::First, None);
        assert!(dialog.is_open());

        match dialog.to_edit() {
            Some(StyleEdit::AddTextLayer { layer, .. }) => assert_eq!(layer.text, "New text"),
            other => panic!("unexpected edit {:?}", other),
        }
    }

    #[test]
    fn test_draft_drag_stays_local() {
        let c = content();
        let layer = c.style_config.text_layers[0].clone();
        let mut dialog = TextLayerDialog::default();
        dialog.open(&c, RotationPhase::First, Some(layer));

        let container = egui::Rect::from_min_size(egui::Pos2::ZERO, Vec2::new(200.0, 100.0));
        dialog
            .drag
            .begin(
                "c1".into(),
                &dialog.draft,
                DragTarget::TextMove {
                    phase: RotationPhase::First,
                    layer_id: "t1".into(),
                },
                Surface::Draft,
                container,
                egui::pos2(100.0, 50.0),
            )
            .unwrap();
        let (_, patch) = dialog.drag.on_pointer_move(egui::pos2(20.0, 10.0)).unwrap();
        dialog.draft.apply(&patch).unwrap();
        assert!(dialog.drag.on_pointer_up().is_none());

        match dialog.to_edit() {
            Some(StyleEdit::UpdateTextLayer { layer, .. }) => {
                assert_eq!((layer.x, layer.y), (10.0, 10.0));
            }
            other => panic!("unexpected edit {:?}", other),
        }
    }

    #[test]
    fn test_save_as_request_from_dialog() {
        let mut dialog = SaveAsDialog::default();
        dialog.open_for(&Template {
            id: "tpl".into(),
            display_name: "Lunch".into(),
            description: None,
        });
        dialog.scope = TemplateScope::System;
        dialog.target_user = Some("42".into());

        let req = dialog.request();
        assert_eq!(req.display_name.as_deref(), Some("Lunch (copy)"));
        assert_eq!(req.scope, TemplateScope::System);
        assert_eq!(req.target_user_id, Some(RecordId::from("42")));
    }
}
