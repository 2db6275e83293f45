//! Typed `style_config` schema for blocks and contents.
//!
//! The backend treats style configuration as an opaque JSON blob. These types
//! give every known key an explicit optional field and keep unknown keys in an
//! `extra` map at every level, so a read/modify/write cycle never drops data
//! written by other clients.

pub mod blob;
mod edit;
mod keyword;
pub mod patch;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::template::{lenient_string, ContentType};
use keyword::keyword_enum;

pub use edit::StyleEdit;
pub use patch::{RotationPhase, StylePatch};

/// Text layer font size range in pixels.
pub const TEXT_SIZE_MIN: f64 = 8.0;
pub const TEXT_SIZE_MAX: f64 = 120.0;
/// Overlay image size range in percent of the container width.
pub const OVERLAY_SIZE_MIN: f64 = 10.0;
pub const OVERLAY_SIZE_MAX: f64 = 80.0;
/// Per-axis scale range for the block's visual image.
pub const IMAGE_SCALE_MIN: f64 = 0.5;
pub const IMAGE_SCALE_MAX: f64 = 2.5;
/// Price badge zoom range.
pub const BADGE_SCALE_MIN: f64 = 0.5;
pub const BADGE_SCALE_MAX: f64 = 2.0;
/// Seconds the first item of a rotation stays on screen.
pub const FIRST_DURATION_MIN: f64 = 1.0;
pub const FIRST_DURATION_MAX: f64 = 120.0;
pub const DEFAULT_ITEM_DURATION: f64 = 10.0;
/// Transition length range in milliseconds.
pub const TRANSITION_MS_MIN: f64 = 200.0;
pub const TRANSITION_MS_MAX: f64 = 5000.0;
pub const DEFAULT_TRANSITION_MS: f64 = 500.0;

/// Errors raised while addressing or validating parts of a style config.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("text layer '{0}' not found")]
    TextLayerNotFound(String),
    #[error("overlay image '{0}' not found")]
    OverlayNotFound(String),
    #[error("content has no {0} rotation")]
    NoRotation(RotationKind),
    #[error("{kind} rotation item {index} out of range ({len} items)")]
    RotationItemOutOfRange {
        kind: RotationKind,
        index: usize,
        len: usize,
    },
    #[error("price badge is not configured")]
    NoPriceBadge,
    #[error("{kind} rotation is not allowed on {content_type} content")]
    RotationKindMismatch {
        kind: RotationKind,
        content_type: ContentType,
    },
}

/// Decode a content `style_config` and pull stored values into editor ranges.
pub(crate) fn deserialize_content_style<'de, D>(deserializer: D) -> Result<StyleConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let mut style: StyleConfig = blob::deserialize(deserializer)?;
    style.normalize();
    Ok(style)
}

// ============================================================================
// Block style
// ============================================================================

/// Background styling of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    #[serde(default, alias = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<String>,
    #[serde(default, alias = "backgroundImage", skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Content style
// ============================================================================

keyword_enum! {
    #[derive(Default)]
    pub enum ImageFit {
        #[default]
        Cover => "cover",
        Contain => "contain",
    }
}

keyword_enum! {
    #[derive(Default)]
    pub enum ClipShape {
        #[default]
        Rect => "rect",
        Circle => "circle",
    }
}

/// Resolved per-axis scale of the visual image inside its block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageScale {
    pub x: f64,
    pub y: f64,
}

impl Default for ImageScale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

fn clamp_scale(value: f64) -> f64 {
    value.clamp(IMAGE_SCALE_MIN, IMAGE_SCALE_MAX)
}

/// Style configuration of a content record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub text_layers: Vec<TextLayer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub overlay_images: Vec<OverlayImageLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub price_badge: Option<PriceBadge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub image_rotation: Option<RotationSequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub video_rotation: Option<RotationSequence>,
    /// Default transition between image rotation items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_rotation_transition: Option<Transition>,
    /// Default transition length in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 200.0, max = 5000.0)))]
    pub image_rotation_transition_duration: Option<f64>,
    /// Background blur radius in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 50.0)))]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_fit: Option<ImageFit>,
    /// CSS-style object position, e.g. "center" or "50% 20%".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_position: Option<String>,
    /// Uniform scale, used when an axis has no scale of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.5, max = 2.5)))]
    pub image_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.5, max = 2.5)))]
    pub image_scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.5, max = 2.5)))]
    pub image_scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_clip_shape: Option<ClipShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 1.0)))]
    pub image_opacity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StyleConfig {
    /// Effective per-axis image scale: each axis falls back to `imageScale`,
    /// then to 1.
    pub fn image_scale_xy(&self) -> ImageScale {
        let uniform = self.image_scale.map(clamp_scale).unwrap_or(1.0);
        ImageScale {
            x: self.image_scale_x.map(clamp_scale).unwrap_or(uniform),
            y: self.image_scale_y.map(clamp_scale).unwrap_or(uniform),
        }
    }

    /// Store a per-axis scale. `imageScale` gets the mean of both axes for
    /// players that only read a uniform scale.
    pub fn set_image_scale(&mut self, scale: ImageScale) {
        let x = clamp_scale(scale.x);
        let y = clamp_scale(scale.y);
        self.image_scale_x = Some(x);
        self.image_scale_y = Some(y);
        self.image_scale = Some((x + y) / 2.0);
    }

    /// Pull stored values into the editor's ranges and upgrade legacy
    /// `rotationUrls` lists into rotation items.
    pub fn normalize(&mut self) {
        for layer in &mut self.text_layers {
            layer.clamp();
        }
        for overlay in &mut self.overlay_images {
            overlay.clamp();
        }
        if let Some(badge) = &mut self.price_badge {
            badge.clamp();
        }
        for rotation in [&mut self.image_rotation, &mut self.video_rotation]
            .into_iter()
            .flatten()
        {
            rotation.normalize();
        }
        self.blur = self.blur.map(|b| b.clamp(0.0, 50.0));
        self.image_opacity = self.image_opacity.map(|o| o.clamp(0.0, 1.0));
        self.image_scale = self.image_scale.map(clamp_scale);
        self.image_scale_x = self.image_scale_x.map(clamp_scale);
        self.image_scale_y = self.image_scale_y.map(clamp_scale);
        self.image_rotation_transition_duration = self
            .image_rotation_transition_duration
            .map(|ms| ms.clamp(TRANSITION_MS_MIN, TRANSITION_MS_MAX));
    }

    pub fn rotation(&self, kind: RotationKind) -> Option<&RotationSequence> {
        match kind {
            RotationKind::Image => self.image_rotation.as_ref(),
            RotationKind::Video => self.video_rotation.as_ref(),
        }
    }

    pub fn rotation_mut(&mut self, kind: RotationKind) -> Option<&mut RotationSequence> {
        match kind {
            RotationKind::Image => self.image_rotation.as_mut(),
            RotationKind::Video => self.video_rotation.as_mut(),
        }
    }

    /// Rotation sequence of the given kind, created empty if absent.
    pub fn rotation_entry(&mut self, kind: RotationKind) -> &mut RotationSequence {
        let slot = match kind {
            RotationKind::Image => &mut self.image_rotation,
            RotationKind::Video => &mut self.video_rotation,
        };
        slot.get_or_insert_with(RotationSequence::default)
    }

    fn rotation_item_mut(
        &mut self,
        kind: RotationKind,
        index: usize,
    ) -> Result<&mut RotationItem, StyleError> {
        let rotation = self
            .rotation_mut(kind)
            .ok_or(StyleError::NoRotation(kind))?;
        let len = rotation.rotation_items.len();
        rotation
            .rotation_items
            .get_mut(index)
            .ok_or(StyleError::RotationItemOutOfRange { kind, index, len })
    }

    /// Text layers shown during the given rotation phase.
    pub fn text_layers(&self, phase: RotationPhase) -> &[TextLayer] {
        match phase {
            RotationPhase::First => &self.text_layers,
            RotationPhase::Item { kind, index } => self
                .rotation(kind)
                .and_then(|r| r.rotation_items.get(index))
                .map(|item| item.text_layers.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn text_layers_mut(
        &mut self,
        phase: RotationPhase,
    ) -> Result<&mut Vec<TextLayer>, StyleError> {
        match phase {
            RotationPhase::First => Ok(&mut self.text_layers),
            RotationPhase::Item { kind, index } => {
                Ok(&mut self.rotation_item_mut(kind, index)?.text_layers)
            }
        }
    }

    pub fn text_layer_mut(
        &mut self,
        phase: RotationPhase,
        layer_id: &str,
    ) -> Result<&mut TextLayer, StyleError> {
        self.text_layers_mut(phase)?
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StyleError::TextLayerNotFound(layer_id.to_string()))
    }

    pub fn overlay_mut(&mut self, layer_id: &str) -> Result<&mut OverlayImageLayer, StyleError> {
        self.overlay_images
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| StyleError::OverlayNotFound(layer_id.to_string()))
    }

    /// Price badge shown during the given rotation phase.
    pub fn price_badge(&self, phase: RotationPhase) -> Option<&PriceBadge> {
        match phase {
            RotationPhase::First => self.price_badge.as_ref(),
            RotationPhase::Item { kind, index } => self
                .rotation(kind)
                .and_then(|r| r.rotation_items.get(index))
                .and_then(|item| item.price_badge.as_ref()),
        }
    }

    pub fn price_badge_slot(
        &mut self,
        phase: RotationPhase,
    ) -> Result<&mut Option<PriceBadge>, StyleError> {
        match phase {
            RotationPhase::First => Ok(&mut self.price_badge),
            RotationPhase::Item { kind, index } => {
                Ok(&mut self.rotation_item_mut(kind, index)?.price_badge)
            }
        }
    }

    /// Reject rotation sequences that do not belong to the content type.
    pub fn check_kind(&self, content_type: ContentType) -> Result<(), StyleError> {
        if self.video_rotation.is_some() && content_type != ContentType::Video {
            return Err(StyleError::RotationKindMismatch {
                kind: RotationKind::Video,
                content_type,
            });
        }
        if self.image_rotation.is_some() && content_type != ContentType::Image {
            return Err(StyleError::RotationKindMismatch {
                kind: RotationKind::Image,
                content_type,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Text layers
// ============================================================================

keyword_enum! {
    #[derive(Default)]
    pub enum DiscountAnimation {
        None => "none",
        #[default]
        Pulse => "pulse",
        Shake => "shake",
        Bounce => "bounce",
        Glow => "glow",
    }
}

keyword_enum! {
    #[derive(Default)]
    pub enum DiscountBlockStyle {
        #[default]
        Rounded => "rounded",
        Outline => "outline",
        Ribbon => "ribbon",
        Burst => "burst",
        Tag => "tag",
    }
}

keyword_enum! {
    #[derive(Default)]
    pub enum TextAlign {
        Left => "left",
        #[default]
        Center => "center",
        Right => "right",
    }
}

keyword_enum! {
    #[derive(Default)]
    pub enum IconPosition {
        #[default]
        Before => "before",
        After => "after",
    }
}

/// Fill of a discount block when none is stored.
pub const DEFAULT_BLOCK_COLOR: &str = "rgba(251, 191, 36, 0.95)";

/// A free-positioned line of text drawn over a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_text_color")]
    pub color: String,
    /// Font size in pixels.
    #[serde(default = "default_text_size")]
    #[cfg_attr(feature = "validation", garde(range(min = 8.0, max = 120.0)))]
    pub size: f64,
    /// Horizontal anchor in percent of the block width.
    #[serde(default = "default_center")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub x: f64,
    /// Vertical anchor in percent of the block height.
    #[serde(default = "default_center")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_position: Option<IconPosition>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_discount_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_animation: Option<DiscountAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_block_style: Option<DiscountBlockStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_text_size() -> f64 {
    24.0
}

fn default_center() -> f64 {
    50.0
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

impl TextLayer {
    /// New centered white text layer with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            color: default_text_color(),
            size: default_text_size(),
            x: default_center(),
            y: default_center(),
            font_family: None,
            font_weight: None,
            font_style: None,
            text_align: None,
            icon: None,
            icon_position: None,
            rotation: None,
            is_discount_block: false,
            discount_animation: None,
            discount_block_style: None,
            block_color: None,
            extra: Map::new(),
        }
    }

    /// Text as displayed, with the icon placed before or after it.
    pub fn display_text(&self) -> String {
        match self.icon.as_deref().filter(|i| !i.is_empty()) {
            Some(icon) => match self.icon_position.clone().unwrap_or_default() {
                IconPosition::After => format!("{} {}", self.text, icon),
                _ => format!("{} {}", icon, self.text),
            },
            None => self.text.clone(),
        }
    }

    fn clamp(&mut self) {
        self.size = self.size.clamp(TEXT_SIZE_MIN, TEXT_SIZE_MAX);
        self.x = clamp_percent(self.x);
        self.y = clamp_percent(self.y);
    }
}

// ============================================================================
// Overlay images
// ============================================================================

keyword_enum! {
    #[derive(Default)]
    pub enum OverlayShape {
        #[default]
        Square => "square",
        Round => "round",
        Rounded => "rounded",
        Shadow => "shadow",
    }
}

/// A decorative image drawn over a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
pub struct OverlayImageLayer {
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub id: String,
    #[serde(alias = "imageUrl")]
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub image_url: String,
    #[serde(default = "default_center")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub x: f64,
    #[serde(default = "default_center")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub y: f64,
    /// Width in percent of the block width.
    #[serde(default = "default_overlay_size")]
    #[cfg_attr(feature = "validation", garde(range(min = 10.0, max = 80.0)))]
    pub size: f64,
    #[serde(default)]
    pub shape: OverlayShape,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_overlay_size() -> f64 {
    25.0
}

impl OverlayImageLayer {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image_url: image_url.into(),
            x: default_center(),
            y: default_center(),
            size: default_overlay_size(),
            shape: OverlayShape::default(),
            extra: Map::new(),
        }
    }

    fn clamp(&mut self) {
        self.size = self.size.clamp(OVERLAY_SIZE_MIN, OVERLAY_SIZE_MAX);
        self.x = clamp_percent(self.x);
        self.y = clamp_percent(self.y);
    }
}

// ============================================================================
// Price badge
// ============================================================================

keyword_enum! {
    /// Visual template of a price badge.
    #[derive(Default)]
    pub enum BadgeModel {
        #[default]
        Rounded => "rounded",
        PriceTag => "price-tag",
        Circle => "circle",
        Starburst => "starburst",
        Tag => "tag",
        Ribbon => "ribbon",
        Square => "square",
        Pill => "pill",
        Banner => "banner",
        Shield => "shield",
        Hexagon => "hexagon",
        Sticker => "sticker",
        Bubble => "bubble",
        Flag => "flag",
        Splash => "splash",
    }
}

keyword_enum! {
    /// Preset badge corner used when no free position is set.
    #[derive(Default)]
    pub enum BadgeAnchor {
        TopLeft => "top-left",
        TopRight => "top-right",
        BottomLeft => "bottom-left",
        #[default]
        BottomRight => "bottom-right",
    }
}

impl BadgeAnchor {
    /// Anchor position in percent of the block.
    pub fn percent(&self) -> (f64, f64) {
        match self {
            BadgeAnchor::TopLeft => (15.0, 15.0),
            BadgeAnchor::TopRight => (85.0, 15.0),
            BadgeAnchor::BottomLeft => (15.0, 85.0),
            BadgeAnchor::BottomRight | BadgeAnchor::Other(_) => (85.0, 85.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
#[serde(rename_all = "camelCase")]
pub struct PriceBadge {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub model: BadgeModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_top: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_bottom: Option<String>,
    #[serde(default = "default_badge_color")]
    pub color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BadgeAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0, max = 100.0)))]
    pub position_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.5, max = 2.0)))]
    pub size_scale: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_badge_color() -> String {
    "#E53935".to_string()
}

impl Default for PriceBadge {
    fn default() -> Self {
        Self {
            enabled: true,
            model: BadgeModel::default(),
            text_top: None,
            price: None,
            text_bottom: None,
            color: default_badge_color(),
            text_color: default_text_color(),
            position: None,
            position_x: None,
            position_y: None,
            size_scale: None,
            extra: Map::new(),
        }
    }
}

impl PriceBadge {
    /// Effective badge position in percent: the free position when both axes
    /// are set, otherwise the preset anchor.
    pub fn resolved_position(&self) -> (f64, f64) {
        match (self.position_x, self.position_y) {
            (Some(x), Some(y)) => (x, y),
            _ => self.position.clone().unwrap_or_default().percent(),
        }
    }

    pub fn scale(&self) -> f64 {
        self.size_scale
            .map(|s| s.clamp(BADGE_SCALE_MIN, BADGE_SCALE_MAX))
            .unwrap_or(1.0)
    }

    fn clamp(&mut self) {
        self.position_x = self.position_x.map(clamp_percent);
        self.position_y = self.position_y.map(clamp_percent);
        self.size_scale = self
            .size_scale
            .map(|s| s.clamp(BADGE_SCALE_MIN, BADGE_SCALE_MAX));
    }
}

// ============================================================================
// Rotation sequences
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationKind {
    Image,
    Video,
}

impl std::fmt::Display for RotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationKind::Image => write!(f, "image"),
            RotationKind::Video => write!(f, "video"),
        }
    }
}

keyword_enum! {
    #[derive(Default)]
    pub enum Transition {
        #[default]
        Fade => "fade",
        SlideLeft => "slide-left",
        SlideRight => "slide-right",
        SlideUp => "slide-up",
        SlideDown => "slide-down",
        ZoomIn => "zoom-in",
        ZoomOut => "zoom-out",
        BlurIn => "blur-in",
        FlipH => "flip-h",
        FlipV => "flip-v",
        RotateIn => "rotate-in",
        RevealCenter => "reveal-center",
        Dissolve => "dissolve",
        IrisOpen => "iris-open",
        IrisClose => "iris-close",
        SpiralIn => "spiral-in",
        BlindsH => "blinds-h",
        BlindsV => "blinds-v",
        Tiles => "tiles",
        PuzzleExpand => "puzzle-expand",
        PuzzleRows => "puzzle-rows",
        PuzzleCols => "puzzle-cols",
        PuzzleDiagonal => "puzzle-diagonal",
        PuzzleGrid => "puzzle-grid",
        None => "none",
    }
}

/// Ordered media sequence played in a block after its first (primary) item.
///
/// Image and video rotations name the first item's duration differently; both
/// keys are kept and [`RotationSequence::first_duration`] picks the right one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
#[serde(rename_all = "camelCase")]
pub struct RotationSequence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 1.0, max = 120.0)))]
    pub first_image_duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 1.0, max = 120.0)))]
    pub first_video_duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_image_transition_type: Option<Transition>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(range(min = 200.0, max = 5000.0)))]
    pub first_image_transition_duration: Option<f64>,
    #[serde(default)]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub rotation_items: Vec<RotationItem>,
    /// Older video rotations list bare urls instead of items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotation_urls: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RotationSequence {
    /// Seconds the primary item stays on screen.
    pub fn first_duration(&self, kind: RotationKind) -> f64 {
        let stored = match kind {
            RotationKind::Image => self.first_image_duration_seconds,
            RotationKind::Video => self.first_video_duration_seconds,
        };
        stored
            .map(|s| s.clamp(FIRST_DURATION_MIN, FIRST_DURATION_MAX))
            .unwrap_or(DEFAULT_ITEM_DURATION)
    }

    pub fn set_first_duration(&mut self, kind: RotationKind, seconds: f64) {
        let seconds = Some(seconds.clamp(FIRST_DURATION_MIN, FIRST_DURATION_MAX));
        match kind {
            RotationKind::Image => self.first_image_duration_seconds = seconds,
            RotationKind::Video => self.first_video_duration_seconds = seconds,
        }
    }

    /// Total cycle length in seconds.
    pub fn cycle_duration(&self, kind: RotationKind) -> f64 {
        self.first_duration(kind)
            + self
                .rotation_items
                .iter()
                .map(|i| i.duration_seconds)
                .sum::<f64>()
    }

    /// Move an item to a new position; out-of-range indices are ignored.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rotation_items.len() || to >= self.rotation_items.len() {
            return false;
        }
        let item = self.rotation_items.remove(from);
        self.rotation_items.insert(to, item);
        true
    }

    fn normalize(&mut self) {
        if self.rotation_items.is_empty() && !self.rotation_urls.is_empty() {
            self.rotation_items = self
                .rotation_urls
                .drain(..)
                .map(|url| RotationItem::new(url, DEFAULT_ITEM_DURATION))
                .collect();
        }
        for item in &mut self.rotation_items {
            for layer in &mut item.text_layers {
                layer.clamp();
            }
            if let Some(badge) = &mut item.price_badge {
                badge.clamp();
            }
        }
        self.first_image_transition_duration = self
            .first_image_transition_duration
            .map(|ms| ms.clamp(TRANSITION_MS_MIN, TRANSITION_MS_MAX));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "validation",
    derive(garde::Validate),
    garde(allow_unvalidated)
)]
#[serde(rename_all = "camelCase")]
pub struct RotationItem {
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub url: String,
    #[serde(default = "default_item_duration")]
    #[cfg_attr(feature = "validation", garde(range(min = 0.0)))]
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_type: Option<Transition>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_video: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub text_layers: Vec<TextLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "validation", garde(dive))]
    pub price_badge: Option<PriceBadge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_item_duration() -> f64 {
    DEFAULT_ITEM_DURATION
}

impl RotationItem {
    pub fn new(url: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            url: url.into(),
            duration_seconds,
            transition_type: None,
            transition_duration: None,
            is_video: false,
            text_layers: Vec::new(),
            title: None,
            price: None,
            price_badge: None,
            extra: Map::new(),
        }
    }
}
