//! Pointer-driven drag and resize of style elements.
//!
//! A [`DragController`] owns at most one session at a time. Pointer-down on a
//! handle starts a session, every pointer move yields a live [`StylePatch`] for
//! immediate feedback, and pointer-up ends it. Canvas sessions produce a commit
//! patch on release when the value changed; draft sessions (inside a modal
//! editor) only ever touch the local copy.

use egui::{Pos2, Rect, Vec2};
use signage_types::style::{
    IMAGE_SCALE_MAX, IMAGE_SCALE_MIN, OVERLAY_SIZE_MAX, OVERLAY_SIZE_MIN, TEXT_SIZE_MAX,
    TEXT_SIZE_MIN,
};
use signage_types::{ContentId, RotationPhase, StyleConfig, StyleError, StylePatch};
use tracing::debug;

/// Pixels of drag that double a text layer's font size.
const TEXT_RESIZE_DIVISOR: f64 = 50.0;
/// Pixels of drag that double an overlay image's size.
const OVERLAY_RESIZE_DIVISOR: f64 = 30.0;

/// Resize handle positions around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ResizeHandle {
    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::TopLeft,
            ResizeHandle::Top,
            ResizeHandle::TopRight,
            ResizeHandle::Left,
            ResizeHandle::Right,
            ResizeHandle::BottomLeft,
            ResizeHandle::Bottom,
            ResizeHandle::BottomRight,
        ]
    }

    /// Corner handles only, used for uniformly scaled elements.
    pub fn corners() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::TopLeft,
            ResizeHandle::TopRight,
            ResizeHandle::BottomLeft,
            ResizeHandle::BottomRight,
        ]
    }

    pub fn cursor_icon(&self) -> egui::CursorIcon {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => egui::CursorIcon::ResizeNwSe,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => egui::CursorIcon::ResizeNeSw,
            ResizeHandle::Top | ResizeHandle::Bottom => egui::CursorIcon::ResizeVertical,
            ResizeHandle::Left | ResizeHandle::Right => egui::CursorIcon::ResizeHorizontal,
        }
    }

    /// Growth direction per axis: +1 when dragging toward positive x/y grows.
    pub fn axis_signs(&self) -> (f64, f64) {
        match self {
            ResizeHandle::TopLeft => (-1.0, -1.0),
            ResizeHandle::Top => (0.0, -1.0),
            ResizeHandle::TopRight => (1.0, -1.0),
            ResizeHandle::Left => (-1.0, 0.0),
            ResizeHandle::Right => (1.0, 0.0),
            ResizeHandle::BottomLeft => (-1.0, 1.0),
            ResizeHandle::Bottom => (0.0, 1.0),
            ResizeHandle::BottomRight => (1.0, 1.0),
        }
    }

    /// Signed growth in pixels for a pointer movement since drag start.
    ///
    /// Edge handles use their own axis; corners average both components.
    pub fn directional_delta(&self, delta: Vec2) -> f64 {
        let (sx, sy) = self.axis_signs();
        let dx = sx * delta.x as f64;
        let dy = sy * delta.y as f64;
        match (sx != 0.0, sy != 0.0) {
            (true, true) => (dx + dy) / 2.0,
            (true, false) => dx,
            (false, true) => dy,
            (false, false) => 0.0,
        }
    }

    /// Handle anchor on the given element rectangle.
    pub fn anchor(&self, rect: Rect) -> Pos2 {
        match self {
            ResizeHandle::TopLeft => rect.left_top(),
            ResizeHandle::Top => rect.center_top(),
            ResizeHandle::TopRight => rect.right_top(),
            ResizeHandle::Left => rect.left_center(),
            ResizeHandle::Right => rect.right_center(),
            ResizeHandle::BottomLeft => rect.left_bottom(),
            ResizeHandle::Bottom => rect.center_bottom(),
            ResizeHandle::BottomRight => rect.right_bottom(),
        }
    }
}

/// What a drag session manipulates.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    TextMove {
        phase: RotationPhase,
        layer_id: String,
    },
    TextResize {
        phase: RotationPhase,
        layer_id: String,
        handle: ResizeHandle,
    },
    OverlayMove {
        layer_id: String,
    },
    OverlayResize {
        layer_id: String,
        handle: ResizeHandle,
    },
    BadgeMove {
        phase: RotationPhase,
    },
    ImageScale {
        handle: ResizeHandle,
    },
}

/// Where the session is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Editor canvas or TV preview; changes are persisted on release.
    Canvas,
    /// Modal working copy; changes stay local until the modal is saved.
    Draft,
}

/// Value captured when the session started.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StartValue {
    Point(f64, f64),
    Size(f64),
    Scale(f64, f64),
}

#[derive(Debug, Clone)]
struct DragSession {
    content_id: ContentId,
    target: DragTarget,
    surface: Surface,
    container: Rect,
    origin: Pos2,
    start: StartValue,
    last: Option<StylePatch>,
}

/// Patch to persist after a canvas session ended with a change.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub content_id: ContentId,
    pub patch: StylePatch,
}

#[derive(Debug, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Single-session drag/resize state machine.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Target of the running session, if any.
    pub fn active_target(&self) -> Option<(&ContentId, &DragTarget)> {
        match &self.state {
            DragState::Dragging(session) => Some((&session.content_id, &session.target)),
            DragState::Idle => None,
        }
    }

    pub fn active_surface(&self) -> Option<Surface> {
        match &self.state {
            DragState::Dragging(session) => Some(session.surface),
            DragState::Idle => None,
        }
    }

    /// Start a session on pointer-down.
    ///
    /// `style` is the content's current style, used to capture the starting
    /// value. Returns `Ok(false)` when a session is already running; the new
    /// pointer-down is ignored in that case.
    pub fn begin(
        &mut self,
        content_id: ContentId,
        style: &StyleConfig,
        target: DragTarget,
        surface: Surface,
        container: Rect,
        pointer: Pos2,
    ) -> Result<bool, StyleError> {
        if self.is_dragging() {
            debug!("Ignoring pointer down on {:?}: drag in progress", target);
            return Ok(false);
        }

        let start = start_value(style, &target)?;
        debug!(
            "Drag started on content {} ({:?}, {:?}) from {:?}",
            content_id, target, surface, start
        );
        self.state = DragState::Dragging(DragSession {
            content_id,
            target,
            surface,
            container,
            origin: pointer,
            start,
            last: None,
        });
        Ok(true)
    }

    /// Update the container rectangle, e.g. after the window was resized.
    pub fn set_container(&mut self, container: Rect) {
        if let DragState::Dragging(session) = &mut self.state {
            session.container = container;
        }
    }

    /// Live patch for the current pointer position.
    pub fn on_pointer_move(&mut self, pointer: Pos2) -> Option<(ContentId, StylePatch)> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };

        let patch = session.patch_at(pointer);
        session.last = Some(patch.clone());
        Some((session.content_id.clone(), patch))
    }

    /// End the session.
    ///
    /// Returns the patch to persist for canvas sessions whose value changed.
    pub fn on_pointer_up(&mut self) -> Option<DragCommit> {
        let DragState::Dragging(session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };

        let patch = session.last?;
        if !changes_start(&patch, session.start) {
            debug!("Drag on content {} ended without change", session.content_id);
            return None;
        }

        match session.surface {
            Surface::Canvas => {
                debug!(
                    "Drag on content {} committed: {:?}",
                    session.content_id, patch
                );
                Some(DragCommit {
                    content_id: session.content_id,
                    patch,
                })
            }
            Surface::Draft => None,
        }
    }

    /// Abandon the session without producing a commit.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

impl DragSession {
    fn patch_at(&self, pointer: Pos2) -> StylePatch {
        let size = self.container.size();
        match &self.target {
            DragTarget::TextMove { phase, layer_id } => {
                let (x, y) = percent_in(self.container, pointer);
                StylePatch::TextPosition {
                    phase: *phase,
                    layer_id: layer_id.clone(),
                    x,
                    y,
                }
            }
            DragTarget::OverlayMove { layer_id } => {
                let (x, y) = percent_in(self.container, pointer);
                StylePatch::OverlayPosition {
                    layer_id: layer_id.clone(),
                    x,
                    y,
                }
            }
            DragTarget::BadgeMove { phase } => {
                let (x, y) = percent_in(self.container, pointer);
                StylePatch::BadgePosition { phase: *phase, x, y }
            }
            DragTarget::TextResize {
                phase,
                layer_id,
                handle,
            } => {
                let delta = handle.directional_delta(pointer - self.origin);
                StylePatch::TextSize {
                    phase: *phase,
                    layer_id: layer_id.clone(),
                    size: scaled_size(
                        self.start_size(),
                        delta,
                        TEXT_RESIZE_DIVISOR,
                        TEXT_SIZE_MIN,
                        TEXT_SIZE_MAX,
                    ),
                }
            }
            DragTarget::OverlayResize { layer_id, handle } => {
                let delta = handle.directional_delta(pointer - self.origin);
                StylePatch::OverlaySize {
                    layer_id: layer_id.clone(),
                    size: scaled_size(
                        self.start_size(),
                        delta,
                        OVERLAY_RESIZE_DIVISOR,
                        OVERLAY_SIZE_MIN,
                        OVERLAY_SIZE_MAX,
                    ),
                }
            }
            DragTarget::ImageScale { handle } => {
                let (start_x, start_y) = match self.start {
                    StartValue::Scale(x, y) => (x, y),
                    _ => (1.0, 1.0),
                };
                let (sx, sy) = handle.axis_signs();
                let delta = pointer - self.origin;
                let x = axis_scale(start_x, sx * delta.x as f64, size.x as f64);
                let y = axis_scale(start_y, sy * delta.y as f64, size.y as f64);
                StylePatch::ImageScale { x, y }
            }
        }
    }

    fn start_size(&self) -> f64 {
        match self.start {
            StartValue::Size(size) => size,
            _ => 0.0,
        }
    }
}

fn start_value(style: &StyleConfig, target: &DragTarget) -> Result<StartValue, StyleError> {
    let find_text = |phase: RotationPhase, layer_id: &str| {
        style
            .text_layers(phase)
            .iter()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StyleError::TextLayerNotFound(layer_id.to_string()))
    };
    let find_overlay = |layer_id: &str| {
        style
            .overlay_images
            .iter()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StyleError::OverlayNotFound(layer_id.to_string()))
    };

    Ok(match target {
        DragTarget::TextMove { phase, layer_id } => {
            let layer = find_text(*phase, layer_id)?;
            StartValue::Point(layer.x, layer.y)
        }
        DragTarget::TextResize {
            phase, layer_id, ..
        } => StartValue::Size(find_text(*phase, layer_id)?.size),
        DragTarget::OverlayMove { layer_id } => {
            let layer = find_overlay(layer_id)?;
            StartValue::Point(layer.x, layer.y)
        }
        DragTarget::OverlayResize { layer_id, .. } => StartValue::Size(find_overlay(layer_id)?.size),
        DragTarget::BadgeMove { phase } => {
            let badge = style.price_badge(*phase).ok_or(StyleError::NoPriceBadge)?;
            let (x, y) = badge.resolved_position();
            StartValue::Point(x, y)
        }
        DragTarget::ImageScale { .. } => {
            let scale = style.image_scale_xy();
            StartValue::Scale(scale.x, scale.y)
        }
    })
}

fn changes_start(patch: &StylePatch, start: StartValue) -> bool {
    match (patch, start) {
        (StylePatch::TextPosition { x, y, .. }, StartValue::Point(sx, sy))
        | (StylePatch::OverlayPosition { x, y, .. }, StartValue::Point(sx, sy))
        | (StylePatch::BadgePosition { x, y, .. }, StartValue::Point(sx, sy))
        | (StylePatch::ImageScale { x, y }, StartValue::Scale(sx, sy)) => *x != sx || *y != sy,
        (StylePatch::TextSize { size, .. }, StartValue::Size(start))
        | (StylePatch::OverlaySize { size, .. }, StartValue::Size(start)) => *size != start,
        _ => true,
    }
}

/// Pointer position as percent of the container, clamped to [0, 100].
pub fn percent_in(container: Rect, pointer: Pos2) -> (f64, f64) {
    let axis = |p: f32, min: f32, len: f32| {
        if len <= 0.0 {
            return 0.0;
        }
        (((p - min) / len) as f64 * 100.0).clamp(0.0, 100.0)
    };
    (
        axis(pointer.x, container.min.x, container.width()),
        axis(pointer.y, container.min.y, container.height()),
    )
}

fn scaled_size(start: f64, delta: f64, divisor: f64, min: f64, max: f64) -> f64 {
    (start * (1.0 + delta / divisor)).clamp(min, max)
}

fn axis_scale(start: f64, delta: f64, container_len: f64) -> f64 {
    if container_len <= 0.0 {
        return start.clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX);
    }
    (start + 2.0 * delta / container_len).clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};
    use signage_types::{OverlayImageLayer, PriceBadge, RotationItem, RotationKind, TextLayer};

    fn container() -> Rect {
        Rect::from_min_size(pos2(100.0, 100.0), vec2(400.0, 200.0))
    }

    fn style() -> StyleConfig {
        let mut style = StyleConfig::default();
        style.text_layers.push(TextLayer {
            id: "t".into(),
            ..TextLayer::new("Sale")
        });
        style.overlay_images.push(OverlayImageLayer {
            id: "o".into(),
            ..OverlayImageLayer::new("logo.png")
        });
        style.price_badge = Some(PriceBadge::default());
        style
    }

    fn text_move() -> DragTarget {
        DragTarget::TextMove {
            phase: RotationPhase::First,
            layer_id: "t".into(),
        }
    }

    #[test]
    fn test_move_is_clamped_to_container() {
        let mut ctl = DragController::new();
        let start = container().center();
        ctl.begin("c".into(), &style(), text_move(), Surface::Canvas, container(), start)
            .unwrap();

        for pointer in [pos2(-500.0, 900.0), pos2(2000.0, -40.0), pos2(300.0, 150.0)] {
            let (_, patch) = ctl.on_pointer_move(pointer).unwrap();
            let StylePatch::TextPosition { x, y, .. } = patch else {
                panic!("unexpected patch {:?}", patch);
            };
            assert!((0.0..=100.0).contains(&x));
            assert!((0.0..=100.0).contains(&y));
        }

        let (_, patch) = ctl.on_pointer_move(pos2(200.0, 150.0)).unwrap();
        assert_eq!(
            patch,
            StylePatch::TextPosition {
                phase: RotationPhase::First,
                layer_id: "t".into(),
                x: 25.0,
                y: 25.0
            }
        );
    }

    #[test]
    fn test_text_resize_clamps() {
        let mut ctl = DragController::new();
        let target = DragTarget::TextResize {
            phase: RotationPhase::First,
            layer_id: "t".into(),
            handle: ResizeHandle::BottomRight,
        };
        let origin = pos2(300.0, 200.0);
        ctl.begin("c".into(), &style(), target, Surface::Canvas, container(), origin)
            .unwrap();

        // 24px * (1 + 50/50) with a corner averaging equal components.
        let (_, patch) = ctl.on_pointer_move(origin + vec2(50.0, 50.0)).unwrap();
        assert!(matches!(patch, StylePatch::TextSize { size, .. } if size == 48.0));

        let (_, patch) = ctl.on_pointer_move(origin + vec2(5000.0, 5000.0)).unwrap();
        assert!(matches!(patch, StylePatch::TextSize { size, .. } if size == TEXT_SIZE_MAX));

        let (_, patch) = ctl.on_pointer_move(origin - vec2(5000.0, 5000.0)).unwrap();
        assert!(matches!(patch, StylePatch::TextSize { size, .. } if size == TEXT_SIZE_MIN));
    }

    #[test]
    fn test_overlay_resize_clamps() {
        let mut ctl = DragController::new();
        let target = DragTarget::OverlayResize {
            layer_id: "o".into(),
            handle: ResizeHandle::Left,
        };
        let origin = pos2(300.0, 200.0);
        ctl.begin("c".into(), &style(), target, Surface::Canvas, container(), origin)
            .unwrap();

        // Dragging the left handle leftwards grows the overlay.
        let (_, patch) = ctl.on_pointer_move(origin - vec2(30.0, 0.0)).unwrap();
        assert!(matches!(patch, StylePatch::OverlaySize { size, .. } if size == 50.0));

        for dx in [-10_000.0, 10_000.0] {
            let (_, patch) = ctl.on_pointer_move(origin + vec2(dx, 0.0)).unwrap();
            let StylePatch::OverlaySize { size, .. } = patch else {
                panic!("unexpected patch");
            };
            assert!((OVERLAY_SIZE_MIN..=OVERLAY_SIZE_MAX).contains(&size));
        }
    }

    #[test]
    fn test_image_scale_per_axis() {
        let mut ctl = DragController::new();
        let target = DragTarget::ImageScale {
            handle: ResizeHandle::Right,
        };
        let origin = pos2(500.0, 200.0);
        ctl.begin("c".into(), &style(), target, Surface::Canvas, container(), origin)
            .unwrap();

        let (_, patch) = ctl.on_pointer_move(origin + vec2(100.0, 80.0)).unwrap();
        assert_eq!(patch, StylePatch::ImageScale { x: 1.5, y: 1.0 });

        let (_, patch) = ctl.on_pointer_move(origin + vec2(99_999.0, 0.0)).unwrap();
        assert_eq!(patch, StylePatch::ImageScale { x: IMAGE_SCALE_MAX, y: 1.0 });
        let (_, patch) = ctl.on_pointer_move(origin - vec2(99_999.0, 0.0)).unwrap();
        assert_eq!(patch, StylePatch::ImageScale { x: IMAGE_SCALE_MIN, y: 1.0 });
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut ctl = DragController::new();
        let style = style();
        assert!(ctl
            .begin("a".into(), &style, text_move(), Surface::Canvas, container(), pos2(0.0, 0.0))
            .unwrap());
        assert!(!ctl
            .begin(
                "b".into(),
                &style,
                DragTarget::BadgeMove {
                    phase: RotationPhase::First
                },
                Surface::Canvas,
                container(),
                pos2(0.0, 0.0)
            )
            .unwrap());
        assert_eq!(ctl.active_target().unwrap().0.as_str(), "a");
    }

    #[test]
    fn test_release_commits_only_changed_canvas_sessions() {
        let mut ctl = DragController::new();
        let style = style();

        // Click without movement.
        ctl.begin("c".into(), &style, text_move(), Surface::Canvas, container(), pos2(0.0, 0.0))
            .unwrap();
        assert_eq!(ctl.on_pointer_up(), None);
        assert!(!ctl.is_dragging());

        // Moved back onto the starting position (center = 50%, 50%).
        ctl.begin("c".into(), &style, text_move(), Surface::Canvas, container(), pos2(0.0, 0.0))
            .unwrap();
        ctl.on_pointer_move(container().center());
        assert_eq!(ctl.on_pointer_up(), None);

        // Real change on the canvas.
        ctl.begin("c".into(), &style, text_move(), Surface::Canvas, container(), pos2(0.0, 0.0))
            .unwrap();
        ctl.on_pointer_move(container().min);
        let commit = ctl.on_pointer_up().unwrap();
        assert_eq!(commit.content_id.as_str(), "c");
        assert!(matches!(
            commit.patch,
            StylePatch::TextPosition { x, y, .. } if x == 0.0 && y == 0.0
        ));

        // Same change inside a modal draft stays local.
        ctl.begin("c".into(), &style, text_move(), Surface::Draft, container(), pos2(0.0, 0.0))
            .unwrap();
        assert!(ctl.on_pointer_move(container().min).is_some());
        assert_eq!(ctl.on_pointer_up(), None);
    }

    #[test]
    fn test_badge_move_on_rotation_item() {
        let mut style = style();
        let rotation = style.rotation_entry(RotationKind::Image);
        let mut item = RotationItem::new("b.jpg", 5.0);
        item.price_badge = Some(PriceBadge::default());
        rotation.rotation_items.push(item);

        let phase = RotationPhase::Item {
            kind: RotationKind::Image,
            index: 0,
        };
        let mut ctl = DragController::new();
        ctl.begin(
            "c".into(),
            &style,
            DragTarget::BadgeMove { phase },
            Surface::Canvas,
            container(),
            pos2(0.0, 0.0),
        )
        .unwrap();
        ctl.on_pointer_move(pos2(500.0, 300.0));
        let commit = ctl.on_pointer_up().unwrap();
        assert_eq!(
            commit.patch,
            StylePatch::BadgePosition {
                phase,
                x: 100.0,
                y: 100.0
            }
        );

        style.apply(&commit.patch).unwrap();
        assert_eq!(style.price_badge(phase).unwrap().resolved_position(), (100.0, 100.0));
        assert_eq!(style.price_badge.as_ref().unwrap().position_x, None);
    }

    #[test]
    fn test_begin_on_missing_layer_fails() {
        let mut ctl = DragController::new();
        let target = DragTarget::OverlayMove {
            layer_id: "gone".into(),
        };
        let err = ctl
            .begin("c".into(), &style(), target, Surface::Canvas, container(), pos2(0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, StyleError::OverlayNotFound("gone".into()));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_directional_delta() {
        let d = vec2(10.0, -20.0);
        assert_eq!(ResizeHandle::Right.directional_delta(d), 10.0);
        assert_eq!(ResizeHandle::Left.directional_delta(d), -10.0);
        assert_eq!(ResizeHandle::Top.directional_delta(d), 20.0);
        assert_eq!(ResizeHandle::Bottom.directional_delta(d), -20.0);
        assert_eq!(ResizeHandle::TopRight.directional_delta(d), 15.0);
    }
}
