//! Field-level edits to a content's style configuration.
//!
//! Interactive editing produces one [`StylePatch`] per pointer move (for live
//! feedback) and one on release (for persistence). Applying a patch touches a
//! single field and leaves every other key of the style untouched.

use super::{ImageScale, PriceBadge, RotationKind, StyleConfig, StyleError};

/// Which part of a rotating block an edit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationPhase {
    /// The primary item (top-level style fields).
    #[default]
    First,
    /// Item `index` of the image or video rotation sequence.
    Item { kind: RotationKind, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StylePatch {
    TextPosition {
        phase: RotationPhase,
        layer_id: String,
        x: f64,
        y: f64,
    },
    TextSize {
        phase: RotationPhase,
        layer_id: String,
        size: f64,
    },
    OverlayPosition {
        layer_id: String,
        x: f64,
        y: f64,
    },
    OverlaySize {
        layer_id: String,
        size: f64,
    },
    BadgePosition {
        phase: RotationPhase,
        x: f64,
        y: f64,
    },
    ImageScale {
        x: f64,
        y: f64,
    },
}

impl StyleConfig {
    /// Merge a single-field edit into this style.
    pub fn apply(&mut self, patch: &StylePatch) -> Result<(), StyleError> {
        match patch {
            StylePatch::TextPosition {
                phase,
                layer_id,
                x,
                y,
            } => {
                let layer = self.text_layer_mut(*phase, layer_id)?;
                layer.x = *x;
                layer.y = *y;
            }
            StylePatch::TextSize {
                phase,
                layer_id,
                size,
            } => {
                self.text_layer_mut(*phase, layer_id)?.size = *size;
            }
            StylePatch::OverlayPosition { layer_id, x, y } => {
                let layer = self.overlay_mut(layer_id)?;
                layer.x = *x;
                layer.y = *y;
            }
            StylePatch::OverlaySize { layer_id, size } => {
                self.overlay_mut(layer_id)?.size = *size;
            }
            StylePatch::BadgePosition { phase, x, y } => {
                let badge: &mut PriceBadge = self
                    .price_badge_slot(*phase)?
                    .as_mut()
                    .ok_or(StyleError::NoPriceBadge)?;
                badge.position_x = Some(*x);
                badge.position_y = Some(*y);
            }
            StylePatch::ImageScale { x, y } => {
                self.set_image_scale(ImageScale { x: *x, y: *y });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{OverlayImageLayer, RotationItem, TextLayer};

    fn style_with_rotation() -> StyleConfig {
        let mut style = StyleConfig::default();
        style.text_layers.push(TextLayer {
            id: "head".into(),
            ..TextLayer::new("Headline")
        });
        let rotation = style.rotation_entry(RotationKind::Image);
        let mut item = RotationItem::new("b.jpg", 6.0);
        item.text_layers.push(TextLayer {
            id: "head".into(),
            ..TextLayer::new("Second slide")
        });
        item.price_badge = Some(PriceBadge::default());
        rotation.rotation_items.push(item);
        style
    }

    #[test]
    fn test_text_patch_routes_to_rotation_item() {
        let mut style = style_with_rotation();
        let phase = RotationPhase::Item {
            kind: RotationKind::Image,
            index: 0,
        };
        style
            .apply(&StylePatch::TextPosition {
                phase,
                layer_id: "head".into(),
                x: 12.5,
                y: 80.0,
            })
            .unwrap();

        // Same layer id on the primary item stays where it was.
        assert_eq!(style.text_layers[0].x, 50.0);
        let item_layer = &style.text_layers(phase)[0];
        assert_eq!((item_layer.x, item_layer.y), (12.5, 80.0));
    }

    #[test]
    fn test_badge_patch_requires_badge() {
        let mut style = style_with_rotation();
        let err = style
            .apply(&StylePatch::BadgePosition {
                phase: RotationPhase::First,
                x: 1.0,
                y: 2.0,
            })
            .unwrap_err();
        assert_eq!(err, StyleError::NoPriceBadge);

        let phase = RotationPhase::Item {
            kind: RotationKind::Image,
            index: 0,
        };
        style
            .apply(&StylePatch::BadgePosition { phase, x: 1.0, y: 2.0 })
            .unwrap();
        assert_eq!(style.price_badge(phase).unwrap().resolved_position(), (1.0, 2.0));
    }

    #[test]
    fn test_overlay_and_scale_patches() {
        let mut style = StyleConfig::default();
        style.overlay_images.push(OverlayImageLayer {
            id: "logo".into(),
            ..OverlayImageLayer::new("logo.png")
        });

        style
            .apply(&StylePatch::OverlaySize {
                layer_id: "logo".into(),
                size: 40.0,
            })
            .unwrap();
        style.apply(&StylePatch::ImageScale { x: 1.5, y: 0.75 }).unwrap();

        assert_eq!(style.overlay_images[0].size, 40.0);
        assert_eq!(style.image_scale_xy(), ImageScale { x: 1.5, y: 0.75 });
        assert_eq!(style.image_scale_x, Some(1.5));
        assert!(matches!(
            style.apply(&StylePatch::OverlaySize {
                layer_id: "missing".into(),
                size: 20.0
            }),
            Err(StyleError::OverlayNotFound(_))
        ));
    }
}
