//! Side panel for editing the selected block and its visual content.

use egui::{Context, DragValue, RichText, SidePanel, Ui};
use egui_phosphor::regular as icons;
use signage_types::{
    BadgeAnchor, BadgeModel, BlockId, BlockStyle, BlockWithContents, ClipShape, Content,
    ContentId, ContentType, ImageFit, OverlayImageLayer, PriceBadge, RotationKind,
    RotationPhase, StyleEdit, TextLayer, Transition,
};

use super::*;

/// Content types that can be added next to the visual.
const EXTRA_CONTENT_TYPES: [ContentType; 5] = [
    ContentType::RegionalMenu,
    ContentType::Icon,
    ContentType::CampaignBadge,
    ContentType::Drink,
    ContentType::Text,
];

fn transition_label(transition: &Option<Transition>) -> &str {
    transition.as_ref().map_or("default", Transition::as_str)
}

/// Combo box over the known keywords plus "default" (unset).
pub(super) fn keyword_combo<T: Clone + PartialEq>(
    ui: &mut Ui,
    id: &str,
    value: &mut Option<T>,
    known: &[T],
    label: impl Fn(&T) -> String,
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_ref().map_or("default".to_string(), &label))
        .show_ui(ui, |ui| {
            ui.selectable_value(value, None, "default");
            for option in known {
                ui.selectable_value(value, Some(option.clone()), label(option));
            }
        });
}

fn rotation_kind_of(content: &Content) -> RotationKind {
    match content.content_type {
        ContentType::Video => RotationKind::Video,
        _ => RotationKind::Image,
    }
}

fn phase_label(phase: RotationPhase) -> String {
    match phase {
        RotationPhase::First => "First item".to_string(),
        RotationPhase::Item { kind, index } => format!("{} item {}", kind, index + 1),
    }
}

/// Requests collected while drawing the panel.
enum Action {
    SetBackground(BlockStyle),
    ConfirmDeleteBlock,
    SetVisual(ContentType, String),
    Upload(String),
    AddContent(ContentType),
    DeleteContent(ContentId),
    Edit(StyleEdit),
    EditTextLayer(Option<TextLayer>),
    AddRotationItem(RotationKind, String),
    SelectPhase(RotationPhase),
    SyncLibrary,
    RemoveBackground,
}

/// Text buffers of the inspector, refilled when the selection changes.
#[derive(Default)]
pub(super) struct InspectorForm {
    source: Option<(BlockId, RotationPhase)>,
    background_color: String,
    background_gradient: String,
    background_image: String,
    media_url: String,
    upload_path: String,
    overlay_url: String,
    rotation_url: String,
    new_content: Option<ContentType>,
    badge: PriceBadge,
    first_duration: f64,
    first_transition: Option<Transition>,
    rotation_transition: Option<Transition>,
    rotation_transition_ms: f64,
    blur: f64,
    opacity: f64,
    fit: Option<ImageFit>,
    clip: Option<ClipShape>,
}

impl InspectorForm {
    fn sync(&mut self, block: &BlockWithContents, phase: RotationPhase) {
        let source = Some((block.block.id.clone(), phase));
        if self.source == source {
            return;
        }
        *self = Self {
            source,
            ..Self::default()
        };

        let style = &block.block.style_config;
        self.background_color = style.background_color.clone().unwrap_or_default();
        self.background_gradient = style.background_gradient.clone().unwrap_or_default();
        self.background_image = style.background_image.clone().unwrap_or_default();

        if let Some(visual) = block.visual() {
            let s = &visual.style_config;
            self.media_url = visual.image_url.clone().unwrap_or_default();
            self.badge = s.price_badge(phase).cloned().unwrap_or_else(|| PriceBadge {
                price: visual.price.clone(),
                ..PriceBadge::default()
            });
            let kind = rotation_kind_of(visual);
            if let Some(rotation) = s.rotation(kind) {
                self.first_duration = rotation.first_duration(kind);
                self.first_transition = rotation.first_image_transition_type.clone();
            } else {
                self.first_duration = crate::ops::DEFAULT_IMAGE_DURATION;
            }
            self.rotation_transition = s.image_rotation_transition.clone();
            self.rotation_transition_ms = s
                .image_rotation_transition_duration
                .unwrap_or(signage_types::style::DEFAULT_TRANSITION_MS);
            self.blur = s.blur.unwrap_or(0.0);
            self.opacity = s.image_opacity.unwrap_or(1.0);
            self.fit = s.image_fit.clone();
            self.clip = s.image_clip_shape.clone();
        }
    }

    /// Force a refill on the next frame.
    pub(super) fn invalidate(&mut self) {
        self.source = None;
    }

    fn block_section(&mut self, ui: &mut Ui, block: &BlockWithContents, actions: &mut Vec<Action>) {
        ui.heading(format!("Block {}", block.block.block_index + 1));
        if let Some((x, y, w, h)) = block.block.explicit_rect() {
            ui.label(
                RichText::new(format!("Pinned at {:.1}%, {:.1}% ({:.1} × {:.1})", x, y, w, h))
                    .small()
                    .weak(),
            );
        }

        egui::Grid::new("block_background").num_columns(2).show(ui, |ui| {
            ui.label("Color");
            ui.text_edit_singleline(&mut self.background_color);
            ui.end_row();
            ui.label("Gradient");
            ui.text_edit_singleline(&mut self.background_gradient);
            ui.end_row();
            ui.label("Image URL");
            ui.text_edit_singleline(&mut self.background_image);
            ui.end_row();
        });

        ui.horizontal(|ui| {
            if ui.button("Apply background").clicked() {
                let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
                actions.push(Action::SetBackground(BlockStyle {
                    background_color: non_empty(&self.background_color),
                    background_gradient: non_empty(&self.background_gradient),
                    background_image: non_empty(&self.background_image),
                    extra: block.block.style_config.extra.clone(),
                }));
            }
            if ui.button(format!("{} Delete block", icons::TRASH)).clicked() {
                actions.push(Action::ConfirmDeleteBlock);
            }
        });
    }

    fn media_section(&mut self, ui: &mut Ui, block: &BlockWithContents, actions: &mut Vec<Action>) {
        ui.collapsing("Media", |ui| {
            if let Some(visual) = block.visual() {
                ui.label(format!("Current: {}", visual.content_type));
            } else {
                ui.label(RichText::new("No image or video yet").weak());
            }
            ui.text_edit_singleline(&mut self.media_url);
            ui.horizontal(|ui| {
                let url = self.media_url.trim().to_string();
                ui.add_enabled_ui(!url.is_empty(), |ui| {
                    if ui.button(format!("{} Image", icons::IMAGE)).clicked() {
                        actions.push(Action::SetVisual(ContentType::Image, url.clone()));
                    }
                    if ui.button(format!("{} Video", icons::VIDEO_CAMERA)).clicked() {
                        actions.push(Action::SetVisual(ContentType::Video, url.clone()));
                    }
                });
            });

            ui.label("Upload local file");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.upload_path);
                let path = self.upload_path.trim().to_string();
                if ui
                    .add_enabled(!path.is_empty(), egui::Button::new(icons::UPLOAD_SIMPLE))
                    .clicked()
                {
                    actions.push(Action::Upload(path));
                }
            });
        });
    }

    fn appearance_section(&mut self, ui: &mut Ui, visual: &Content, actions: &mut Vec<Action>) {
        ui.collapsing("Appearance", |ui| {
            ui.add(egui::Slider::new(&mut self.blur, 0.0..=20.0).text("Blur"));
            ui.add(egui::Slider::new(&mut self.opacity, 0.0..=1.0).text("Opacity"));

            ui.horizontal(|ui| {
                ui.label("Fit");
                keyword_combo(ui, "image_fit", &mut self.fit, ImageFit::KNOWN, |f| {
                    f.to_string()
                });
            });
            ui.horizontal(|ui| {
                ui.label("Clip");
                keyword_combo(ui, "image_clip", &mut self.clip, ClipShape::KNOWN, |c| {
                    c.to_string()
                });
            });

            let scale = visual.style_config.image_scale_xy();
            ui.label(format!("Scale {:.2} × {:.2} (drag the corners)", scale.x, scale.y));
            if ui.button("Apply").clicked() {
                actions.push(Action::Edit(StyleEdit::SetAppearance {
                    blur: Some(self.blur).filter(|b| *b > 0.0),
                    image_fit: self.fit.clone(),
                    image_clip_shape: self.clip.clone(),
                    image_opacity: Some(self.opacity),
                }));
            }
        });
    }

    fn text_section(
        &mut self,
        ui: &mut Ui,
        visual: &Content,
        phase: RotationPhase,
        actions: &mut Vec<Action>,
    ) {
        ui.collapsing(format!("Text ({})", phase_label(phase)), |ui| {
            for layer in visual.style_config.text_layers(phase) {
                ui.horizontal(|ui| {
                    ui.label(format!("{} ({:.0}px)", layer.text, layer.size));
                    if ui.small_button(icons::PENCIL_SIMPLE).clicked() {
                        actions.push(Action::EditTextLayer(Some(layer.clone())));
                    }
                    if ui.small_button(icons::TRASH).clicked() {
                        actions.push(Action::Edit(StyleEdit::RemoveTextLayer {
                            phase,
                            layer_id: layer.id.clone(),
                        }));
                    }
                });
            }
            if ui.button(format!("{} Add text", icons::PLUS)).clicked() {
                actions.push(Action::EditTextLayer(None));
            }
        });
    }

    fn badge_section(
        &mut self,
        ui: &mut Ui,
        visual: &Content,
        phase: RotationPhase,
        actions: &mut Vec<Action>,
    ) {
        ui.collapsing("Price badge", |ui| {
            let existing = visual.style_config.price_badge(phase).is_some();

            ui.checkbox(&mut self.badge.enabled, "Visible");
            egui::ComboBox::from_label("Model")
                .selected_text(self.badge.model.as_str())
                .show_ui(ui, |ui| {
                    for model in BadgeModel::KNOWN {
                        ui.selectable_value(&mut self.badge.model, model.clone(), model.as_str());
                    }
                });
            ui.horizontal(|ui| {
                ui.label("Corner");
                keyword_combo(ui, "badge_anchor", &mut self.badge.position, BadgeAnchor::KNOWN, |a| {
                    a.to_string()
                });
            });
            egui::Grid::new("badge_fields").num_columns(2).show(ui, |ui| {
                for (label, field) in [
                    ("Top line", &mut self.badge.text_top),
                    ("Price", &mut self.badge.price),
                    ("Bottom line", &mut self.badge.text_bottom),
                ] {
                    ui.label(label);
                    let mut text = field.clone().unwrap_or_default();
                    if ui.text_edit_singleline(&mut text).changed() {
                        *field = Some(text).filter(|t| !t.is_empty());
                    }
                    ui.end_row();
                }
                ui.label("Color");
                ui.text_edit_singleline(&mut self.badge.color);
                ui.end_row();
                ui.label("Text color");
                ui.text_edit_singleline(&mut self.badge.text_color);
                ui.end_row();
                ui.label("Size");
                let mut scale = self.badge.scale();
                if ui
                    .add(egui::Slider::new(
                        &mut scale,
                        signage_types::style::BADGE_SCALE_MIN..=signage_types::style::BADGE_SCALE_MAX,
                    ))
                    .changed()
                {
                    self.badge.size_scale = Some(scale);
                }
                ui.end_row();
            });

            ui.horizontal(|ui| {
                let label = if existing { "Save badge" } else { "Add badge" };
                if ui.button(label).clicked() {
                    actions.push(Action::Edit(StyleEdit::SetPriceBadge {
                        phase,
                        badge: Some(self.badge.clone()),
                    }));
                }
                if existing && ui.button(format!("{} Remove", icons::TRASH)).clicked() {
                    actions.push(Action::Edit(StyleEdit::SetPriceBadge { phase, badge: None }));
                }
            });
        });
    }

    fn overlay_section(&mut self, ui: &mut Ui, visual: &Content, actions: &mut Vec<Action>) {
        ui.collapsing("Overlay images", |ui| {
            for overlay in &visual.style_config.overlay_images {
                ui.horizontal(|ui| {
                    let name = overlay.image_url.rsplit('/').next().unwrap_or(&overlay.image_url);
                    ui.label(format!("{} ({:.0}%)", name, overlay.size));
                    if ui.small_button(icons::TRASH).clicked() {
                        actions.push(Action::Edit(StyleEdit::RemoveOverlay {
                            layer_id: overlay.id.clone(),
                        }));
                    }
                });
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.overlay_url);
                let url = self.overlay_url.trim().to_string();
                if ui.add_enabled(!url.is_empty(), egui::Button::new(icons::PLUS)).clicked() {
                    actions.push(Action::Edit(StyleEdit::AddOverlay(OverlayImageLayer::new(url))));
                    self.overlay_url.clear();
                }
            });
        });
    }

    fn rotation_section(
        &mut self,
        ui: &mut Ui,
        visual: &Content,
        phase: RotationPhase,
        actions: &mut Vec<Action>,
    ) {
        let kind = rotation_kind_of(visual);
        ui.collapsing(format!("{} rotation", kind), |ui| {
            let rotation = visual.style_config.rotation(kind);

            if let Some(rotation) = rotation {
                let mut selected = phase;
                egui::ComboBox::from_label("Editing")
                    .selected_text(phase_label(phase))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut selected, RotationPhase::First, "First item");
                        for index in 0..rotation.rotation_items.len() {
                            let item = RotationPhase::Item { kind, index };
                            ui.selectable_value(&mut selected, item, phase_label(item));
                        }
                    });
                if selected != phase {
                    actions.push(Action::SelectPhase(selected));
                }

                ui.horizontal(|ui| {
                    ui.label("First item");
                    ui.add(
                        DragValue::new(&mut self.first_duration)
                            .range(
                                signage_types::style::FIRST_DURATION_MIN
                                    ..=signage_types::style::FIRST_DURATION_MAX,
                            )
                            .suffix(" s"),
                    );
                    if kind == RotationKind::Image {
                        keyword_combo(
                            ui,
                            "first_transition",
                            &mut self.first_transition,
                            Transition::KNOWN,
                            |t| t.to_string(),
                        );
                    }
                    if ui.small_button(icons::CHECK).clicked() {
                        actions.push(Action::Edit(StyleEdit::SetFirstItemTiming {
                            kind,
                            duration: self.first_duration,
                            transition: self.first_transition.clone(),
                        }));
                    }
                });

                if kind == RotationKind::Image {
                    ui.horizontal(|ui| {
                        ui.label("Between items");
                        keyword_combo(
                            ui,
                            "rotation_transition",
                            &mut self.rotation_transition,
                            Transition::KNOWN,
                            |t| t.to_string(),
                        );
                        ui.add(
                            DragValue::new(&mut self.rotation_transition_ms)
                                .range(
                                    signage_types::style::TRANSITION_MS_MIN
                                        ..=signage_types::style::TRANSITION_MS_MAX,
                                )
                                .suffix(" ms"),
                        );
                        if ui.small_button(icons::CHECK).clicked() {
                            actions.push(Action::Edit(StyleEdit::SetRotationTransition {
                                transition: self.rotation_transition.clone(),
                                duration_ms: Some(self.rotation_transition_ms),
                            }));
                        }
                    });
                }

                let count = rotation.rotation_items.len();
                for (index, item) in rotation.rotation_items.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let name = item.url.rsplit('/').next().unwrap_or(&item.url);
                        ui.label(format!(
                            "{}. {} [{}]",
                            index + 1,
                            name,
                            transition_label(&item.transition_type)
                        ));
                        let mut duration = item.duration_seconds;
                        let response =
                            ui.add(DragValue::new(&mut duration).range(0.0..=3600.0).suffix(" s"));
                        if response.drag_stopped() || response.lost_focus() {
                            actions.push(Action::Edit(StyleEdit::SetItemTiming {
                                kind,
                                index,
                                duration,
                                transition: item.transition_type.clone(),
                            }));
                        }
                        if ui
                            .add_enabled(index > 0, egui::Button::new(icons::ARROW_UP).small())
                            .clicked()
                        {
                            actions.push(Action::Edit(StyleEdit::MoveRotationItem {
                                kind,
                                from: index,
                                to: index - 1,
                            }));
                        }
                        if ui
                            .add_enabled(index + 1 < count, egui::Button::new(icons::ARROW_DOWN).small())
                            .clicked()
                        {
                            actions.push(Action::Edit(StyleEdit::MoveRotationItem {
                                kind,
                                from: index,
                                to: index + 1,
                            }));
                        }
                        if ui.small_button(icons::TRASH).clicked() {
                            actions.push(Action::Edit(StyleEdit::RemoveRotationItem { kind, index }));
                        }
                    });
                }
                ui.label(format!("Cycle: {:.1}s", rotation.cycle_duration(kind)));
            }

            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.rotation_url);
                let url = self.rotation_url.trim().to_string();
                if ui
                    .add_enabled(!url.is_empty(), egui::Button::new(format!("{} Add", icons::PLUS)))
                    .clicked()
                {
                    actions.push(Action::AddRotationItem(kind, url));
                    self.rotation_url.clear();
                }
            });
            if rotation.is_some() && ui.button("Clear rotation").clicked() {
                actions.push(Action::Edit(StyleEdit::ClearRotation { kind }));
            }
        });
    }

    fn contents_section(&mut self, ui: &mut Ui, block: &BlockWithContents, actions: &mut Vec<Action>) {
        ui.collapsing("Contents", |ui| {
            for content in &block.contents {
                ui.horizontal(|ui| {
                    let title = content.title.as_deref().unwrap_or("untitled");
                    ui.label(format!("{}: {}", content.content_type, title));
                    if ui.small_button(icons::TRASH).clicked() {
                        actions.push(Action::DeleteContent(content.id.clone()));
                    }
                });
            }
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("new_content_type")
                    .selected_text(
                        self.new_content
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "Type...".to_string()),
                    )
                    .show_ui(ui, |ui| {
                        for t in EXTRA_CONTENT_TYPES {
                            ui.selectable_value(&mut self.new_content, Some(t), t.to_string());
                        }
                    });
                if let Some(t) = self.new_content {
                    if ui.button(format!("{} Add", icons::PLUS)).clicked() {
                        actions.push(Action::AddContent(t));
                    }
                }
            });
        });
    }
}

impl SignageApp {
    pub(super) fn show_inspector(&mut self, ctx: &Context) {
        let mut actions = Vec::new();
        let phase = self.phase;

        SidePanel::right("inspector")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let block = self
                        .editor
                        .selected_block
                        .as_ref()
                        .and_then(|id| self.editor.tree()?.block(id));
                    let Some(block) = block else {
                        ui.label(RichText::new("Select a block on the canvas").weak());
                        return;
                    };

                    let form = &mut self.form;
                    form.sync(block, phase);
                    form.block_section(ui, block, &mut actions);
                    ui.separator();
                    form.media_section(ui, block, &mut actions);

                    if let Some(visual) = block.visual() {
                        form.appearance_section(ui, visual, &mut actions);
                        form.text_section(ui, visual, phase, &mut actions);
                        form.badge_section(ui, visual, phase, &mut actions);
                        form.overlay_section(ui, visual, &mut actions);
                        form.rotation_section(ui, visual, phase, &mut actions);

                        ui.separator();
                        ui.horizontal(|ui| {
                            if visual.image_url.is_some()
                                && ui.button(format!("{} Save to library", icons::BOOKMARK_SIMPLE)).clicked()
                            {
                                actions.push(Action::SyncLibrary);
                            }
                            if visual.content_type == ContentType::Image
                                && ui.button(format!("{} Remove background", icons::MAGIC_WAND)).clicked()
                            {
                                actions.push(Action::RemoveBackground);
                            }
                        });
                    }

                    ui.separator();
                    form.contents_section(ui, block, &mut actions);
                });
            });

        if actions.is_empty() {
            return;
        }
        let Some(block_id) = self.editor.selected_block.clone() else {
            return;
        };
        let visual_id = self.selected_visual().map(|c| c.id.clone());
        for action in actions {
            self.apply_action(ctx, &block_id, visual_id.as_ref(), action);
        }
    }

    fn apply_action(
        &mut self,
        ctx: &Context,
        block_id: &BlockId,
        visual_id: Option<&ContentId>,
        action: Action,
    ) {
        match action {
            Action::SetBackground(style) => self.update_block_background(ctx, block_id, style),
            Action::ConfirmDeleteBlock => self.dialogs.confirm_delete = Some(block_id.clone()),
            Action::SetVisual(kind, url) => self.set_visual(ctx, block_id, kind, url),
            Action::Upload(path) => self.upload_visual(ctx, block_id, path),
            Action::AddContent(kind) => self.add_content(ctx, block_id, kind),
            Action::DeleteContent(id) => self.delete_content(ctx, id),
            Action::SelectPhase(phase) => self.phase = phase,
            Action::Edit(edit) => {
                if let Some(id) = visual_id {
                    self.edit_style(ctx, id, edit);
                }
            }
            Action::EditTextLayer(layer) => {
                if let Some(content) = visual_id.and_then(|id| self.editor.content(id)) {
                    self.dialogs.text.open(content, self.phase, layer);
                }
            }
            Action::AddRotationItem(kind, url) => {
                if let Some(id) = visual_id {
                    self.add_rotation_item(ctx, id, kind, url);
                }
            }
            Action::SyncLibrary => {
                if let Some(id) = visual_id {
                    self.sync_library(ctx, id);
                }
            }
            Action::RemoveBackground => {
                if let Some(id) = visual_id {
                    self.remove_background(ctx, id);
                }
            }
        }
        self.form.invalidate();
    }
}
