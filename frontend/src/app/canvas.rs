use egui::{Color32, CursorIcon, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};
use signage_types::{BlockId, Content, ContentId, ContentType, RotationKind, RotationPhase};

use crate::interaction::{DragTarget, ResizeHandle, Surface};
use crate::layout;

use super::render;
use super::*;

/// Aspect ratio of the signage screen.
const SCREEN_ASPECT: f32 = 16.0 / 9.0;

/// Hit area of a resize handle, in screen pixels.
const HANDLE_HIT_SIZE: f32 = 16.0;

const MERGE_COLOR: Color32 = Color32::from_rgb(255, 152, 0);

/// Interactive region collected while painting. Later entries are on top.
struct Hit {
    rect: Rect,
    block_id: BlockId,
    /// Screen rectangle of the block, the container for drags.
    block_rect: Rect,
    content_id: Option<ContentId>,
    target: Option<DragTarget>,
}

/// Largest 16:9 rectangle centered in `available`.
pub(super) fn screen_rect(available: Rect) -> Rect {
    if available.height() <= 0.0 || available.width() <= 0.0 {
        return available;
    }
    let size = if available.width() / available.height() > SCREEN_ASPECT {
        Vec2::new(available.height() * SCREEN_ASPECT, available.height())
    } else {
        Vec2::new(available.width(), available.width() / SCREEN_ASPECT)
    };
    Rect::from_center_size(available.center(), size)
}

/// Content shown for a rotation phase: the rotation item's media, or the
/// visual itself for the first item.
fn shown_visual(visual: &Content, phase: RotationPhase) -> Option<Content> {
    let RotationPhase::Item { kind, index } = phase else {
        return None;
    };
    let item = visual.style_config.rotation(kind)?.rotation_items.get(index)?;
    Some(Content {
        content_type: match kind {
            RotationKind::Image => ContentType::Image,
            RotationKind::Video => ContentType::Video,
        },
        image_url: Some(item.url.clone()),
        ..visual.clone()
    })
}

fn cursor_for(target: &DragTarget) -> CursorIcon {
    match target {
        DragTarget::TextResize { handle, .. }
        | DragTarget::OverlayResize { handle, .. }
        | DragTarget::ImageScale { handle } => handle.cursor_icon(),
        DragTarget::TextMove { .. } | DragTarget::OverlayMove { .. } | DragTarget::BadgeMove { .. } => {
            CursorIcon::Grab
        }
    }
}

fn handle_hits(
    hits: &mut Vec<Hit>,
    rect: Rect,
    block_id: &BlockId,
    block_rect: Rect,
    content_id: &ContentId,
    target: impl Fn(ResizeHandle) -> DragTarget,
) {
    for &handle in ResizeHandle::corners() {
        hits.push(Hit {
            rect: Rect::from_center_size(handle.anchor(rect), Vec2::splat(HANDLE_HIT_SIZE)),
            block_id: block_id.clone(),
            block_rect,
            content_id: Some(content_id.clone()),
            target: Some(target(handle)),
        });
    }
}

impl SignageApp {
    /// Show the template canvas.
    ///
    /// In TV preview mode selection outlines and resize handles are hidden
    /// but elements can still be moved.
    pub(super) fn show_canvas(&mut self, ui: &mut Ui, tv: bool) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let ctx = ui.ctx().clone();
        let screen = screen_rect(response.rect);
        let px_scale = screen.height() / render::REFERENCE_HEIGHT;

        if !tv {
            painter.rect_filled(response.rect, 0.0, Color32::from_gray(30));
        }
        painter.rect_filled(screen, 0.0, Color32::BLACK);

        let gap = layout::grid_layout(self.editor.block_count()).gap as f32 * px_scale;
        let mut hits: Vec<Hit> = Vec::new();

        if let Some(tree) = self.editor.tree() {
            for b in &tree.blocks {
                let block_id = &b.block.id;
                let rect = self
                    .editor
                    .block_rect(b)
                    .to_screen(screen)
                    .shrink(gap / 2.0);
                let selected = !tv && self.editor.selected_block.as_ref() == Some(block_id);
                let block_painter = painter.with_clip_rect(rect);

                render::paint_block_background(
                    &block_painter,
                    &ctx,
                    &mut self.textures,
                    rect,
                    &b.block.style_config,
                );
                hits.push(Hit {
                    rect,
                    block_id: block_id.clone(),
                    block_rect: rect,
                    content_id: b.visual().map(|c| c.id.clone()),
                    target: None,
                });

                if let Some(visual) = b.visual() {
                    let style = &visual.style_config;
                    let phase = if selected { self.phase } else { RotationPhase::First };
                    let shown = shown_visual(visual, phase);
                    render::paint_visual(
                        &block_painter,
                        &ctx,
                        &mut self.textures,
                        rect,
                        shown.as_ref().unwrap_or(visual),
                    );

                    if selected && visual.content_type == ContentType::Image {
                        let inner = rect.shrink(HANDLE_HIT_SIZE / 2.0);
                        render::paint_handles(&block_painter, inner, ResizeHandle::corners());
                        handle_hits(&mut hits, inner, block_id, rect, &visual.id, |handle| {
                            DragTarget::ImageScale { handle }
                        });
                    }

                    for overlay in &style.overlay_images {
                        let r = render::paint_overlay(&block_painter, &ctx, &mut self.textures, rect, overlay);
                        hits.push(Hit {
                            rect: r,
                            block_id: block_id.clone(),
                            block_rect: rect,
                            content_id: Some(visual.id.clone()),
                            target: Some(DragTarget::OverlayMove {
                                layer_id: overlay.id.clone(),
                            }),
                        });
                        if selected {
                            render::paint_handles(&block_painter, r, ResizeHandle::corners());
                            handle_hits(&mut hits, r, block_id, rect, &visual.id, |handle| {
                                DragTarget::OverlayResize {
                                    layer_id: overlay.id.clone(),
                                    handle,
                                }
                            });
                        }
                    }

                    for layer in style.text_layers(phase) {
                        let r = render::paint_text_layer(&block_painter, rect, layer, px_scale);
                        hits.push(Hit {
                            rect: r,
                            block_id: block_id.clone(),
                            block_rect: rect,
                            content_id: Some(visual.id.clone()),
                            target: Some(DragTarget::TextMove {
                                phase,
                                layer_id: layer.id.clone(),
                            }),
                        });
                        if selected {
                            block_painter.rect_stroke(
                                r,
                                0.0,
                                Stroke::new(1.0, Color32::from_white_alpha(90)),
                                StrokeKind::Outside,
                            );
                            render::paint_handles(&block_painter, r, ResizeHandle::corners());
                            handle_hits(&mut hits, r, block_id, rect, &visual.id, |handle| {
                                DragTarget::TextResize {
                                    phase,
                                    layer_id: layer.id.clone(),
                                    handle,
                                }
                            });
                        }
                    }

                    if let Some(badge) = style.price_badge(phase).filter(|b| b.enabled) {
                        let r = render::paint_badge(&block_painter, rect, badge, px_scale);
                        hits.push(Hit {
                            rect: r,
                            block_id: block_id.clone(),
                            block_rect: rect,
                            content_id: Some(visual.id.clone()),
                            target: Some(DragTarget::BadgeMove { phase }),
                        });
                    }
                } else if !tv {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("Block {}", b.block.block_index + 1),
                        FontId::proportional(14.0),
                        Color32::from_gray(110),
                    );
                }

                if selected {
                    painter.rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::WHITE), StrokeKind::Inside);
                }
                if !tv {
                    if let Some(pos) = self.editor.merge_selection.iter().position(|id| id == block_id) {
                        painter.rect_stroke(rect, 0.0, Stroke::new(3.0, MERGE_COLOR), StrokeKind::Inside);
                        painter.text(
                            rect.left_top() + Vec2::splat(8.0),
                            egui::Align2::LEFT_TOP,
                            format!("{}", pos + 1),
                            FontId::proportional(16.0),
                            MERGE_COLOR,
                        );
                    }
                }
            }
        }

        self.handle_canvas_interaction(ui, &response, &hits, tv);
    }

    fn handle_canvas_interaction(&mut self, ui: &Ui, response: &egui::Response, hits: &[Hit], tv: bool) {
        let ctx = ui.ctx().clone();

        // FIRST: ongoing session
        if self.drag.is_dragging() {
            let active = self.drag.active_target().map(|(id, _)| id.clone());
            if let Some(container) = active
                .as_ref()
                .and_then(|id| hits.iter().find(|h| h.content_id.as_ref() == Some(id)))
                .map(|h| h.block_rect)
            {
                self.drag.set_container(container);
            }

            if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                if let Some((content_id, patch)) = self.drag.on_pointer_move(pos) {
                    if let Err(e) = self.editor.apply_live(&content_id, &patch) {
                        self.drag.cancel();
                        self.editor.fail(e.to_string());
                        return;
                    }
                }
            }
            if let Some((_, target)) = self.drag.active_target() {
                ctx.set_cursor_icon(match target {
                    DragTarget::TextMove { .. }
                    | DragTarget::OverlayMove { .. }
                    | DragTarget::BadgeMove { .. } => CursorIcon::Grabbing,
                    other => cursor_for(other),
                });
            }

            if ui.input(|i| i.pointer.any_released()) {
                if let Some(commit) = self.drag.on_pointer_up() {
                    self.commit_style(&ctx, commit.content_id);
                }
            }
            return;
        }

        let draggable_at = |pos: egui::Pos2| {
            hits.iter()
                .rev()
                .find(|h| h.target.is_some() && h.rect.contains(pos))
        };

        // SECOND: hover feedback
        if let Some(target) = response
            .hover_pos()
            .and_then(draggable_at)
            .and_then(|h| h.target.as_ref())
        {
            ctx.set_cursor_icon(cursor_for(target));
        }

        // THIRD: new session or selection
        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            let Some(origin) = origin else { return };
            let Some(hit) = draggable_at(origin) else { return };
            let (Some(content_id), Some(target)) = (hit.content_id.clone(), hit.target.clone()) else {
                return;
            };

            if !tv {
                self.select(Some(hit.block_id.clone()), Some(content_id.clone()));
            }
            let Some(style) = self.editor.style_of(&content_id) else {
                return;
            };
            if let Err(e) =
                self.drag
                    .begin(content_id, style, target, Surface::Canvas, hit.block_rect, origin)
            {
                self.editor.fail(e.to_string());
            }
        } else if response.clicked() && !tv {
            let Some(pos) = response.interact_pointer_pos() else { return };
            let hit = hits.iter().rev().find(|h| h.rect.contains(pos));
            let multi = ui.input(|i| i.modifiers.shift || i.modifiers.command);
            match hit {
                Some(hit) if multi => self.editor.toggle_merge(&hit.block_id),
                Some(hit) => self.select(Some(hit.block_id.clone()), hit.content_id.clone()),
                None => self.select(None, None),
            }
        }
    }

    fn select(&mut self, block: Option<BlockId>, content: Option<ContentId>) {
        if self.editor.selected_block != block {
            self.phase = RotationPhase::First;
        }
        self.editor.select_block(block);
        self.editor.selected_content = content;
    }
}
