//! Shared types for the signage template editor.
//!
//! This crate contains the template/block/content data model, the typed
//! `style_config` schema and the REST API request and response types.

pub mod api;
pub mod id;
pub mod style;
pub mod template;

// Re-export commonly used types
pub use id::{BlockId, ContentId, RecordId, TemplateId};
pub use style::{
    BadgeAnchor, BadgeModel, BlockStyle, ClipShape, DiscountAnimation, DiscountBlockStyle,
    IconPosition, ImageFit, ImageScale, OverlayImageLayer, OverlayShape, PriceBadge, RotationItem,
    RotationKind, RotationPhase, RotationSequence, StyleConfig, StyleEdit, StyleError, StylePatch,
    TextAlign, TextLayer, Transition,
};
pub use template::{Block, BlockWithContents, Content, ContentType, Template, TemplateTree};
