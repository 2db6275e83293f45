//! Structural edits to a content's style: adding and removing layers,
//! configuring price badges and managing rotation sequences.

use super::{
    ClipShape, ImageFit, OverlayImageLayer, PriceBadge, RotationItem, RotationKind,
    RotationPhase, StyleConfig, StyleError, TextLayer, Transition, TRANSITION_MS_MAX,
    TRANSITION_MS_MIN,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StyleEdit {
    AddTextLayer {
        phase: RotationPhase,
        layer: TextLayer,
    },
    /// Replace the layer with the same id.
    UpdateTextLayer {
        phase: RotationPhase,
        layer: TextLayer,
    },
    RemoveTextLayer {
        phase: RotationPhase,
        layer_id: String,
    },
    AddOverlay(OverlayImageLayer),
    RemoveOverlay {
        layer_id: String,
    },
    /// Set or clear the price badge of a phase.
    SetPriceBadge {
        phase: RotationPhase,
        badge: Option<PriceBadge>,
    },
    AddRotationItem {
        kind: RotationKind,
        item: RotationItem,
    },
    RemoveRotationItem {
        kind: RotationKind,
        index: usize,
    },
    MoveRotationItem {
        kind: RotationKind,
        from: usize,
        to: usize,
    },
    /// Duration of the primary item; image rotations also carry its
    /// transition.
    SetFirstItemTiming {
        kind: RotationKind,
        duration: f64,
        transition: Option<Transition>,
    },
    SetItemTiming {
        kind: RotationKind,
        index: usize,
        duration: f64,
        transition: Option<Transition>,
    },
    /// Default transition between image rotation items.
    SetRotationTransition {
        transition: Option<Transition>,
        duration_ms: Option<f64>,
    },
    ClearRotation {
        kind: RotationKind,
    },
    SetAppearance {
        blur: Option<f64>,
        image_fit: Option<ImageFit>,
        image_clip_shape: Option<ClipShape>,
        image_opacity: Option<f64>,
    },
}

impl StyleConfig {
    pub fn edit(&mut self, edit: &StyleEdit) -> Result<(), StyleError> {
        match edit {
            StyleEdit::AddTextLayer { phase, layer } => {
                self.text_layers_mut(*phase)?.push(layer.clone());
            }
            StyleEdit::UpdateTextLayer { phase, layer } => {
                *self.text_layer_mut(*phase, &layer.id)? = layer.clone();
            }
            StyleEdit::RemoveTextLayer { phase, layer_id } => {
                let layers = self.text_layers_mut(*phase)?;
                let before = layers.len();
                layers.retain(|l| &l.id != layer_id);
                if layers.len() == before {
                    return Err(StyleError::TextLayerNotFound(layer_id.clone()));
                }
            }
            StyleEdit::AddOverlay(layer) => self.overlay_images.push(layer.clone()),
            StyleEdit::RemoveOverlay { layer_id } => {
                let before = self.overlay_images.len();
                self.overlay_images.retain(|l| &l.id != layer_id);
                if self.overlay_images.len() == before {
                    return Err(StyleError::OverlayNotFound(layer_id.clone()));
                }
            }
            StyleEdit::SetPriceBadge { phase, badge } => {
                *self.price_badge_slot(*phase)? = badge.clone();
            }
            StyleEdit::AddRotationItem { kind, item } => {
                self.rotation_entry(*kind).rotation_items.push(item.clone());
            }
            StyleEdit::RemoveRotationItem { kind, index } => {
                let rotation = self
                    .rotation_mut(*kind)
                    .ok_or(StyleError::NoRotation(*kind))?;
                let len = rotation.rotation_items.len();
                if *index >= len {
                    return Err(StyleError::RotationItemOutOfRange {
                        kind: *kind,
                        index: *index,
                        len,
                    });
                }
                rotation.rotation_items.remove(*index);
            }
            StyleEdit::MoveRotationItem { kind, from, to } => {
                let rotation = self
                    .rotation_mut(*kind)
                    .ok_or(StyleError::NoRotation(*kind))?;
                let len = rotation.rotation_items.len();
                if !rotation.move_item(*from, *to) {
                    return Err(StyleError::RotationItemOutOfRange {
                        kind: *kind,
                        index: (*from).max(*to),
                        len,
                    });
                }
            }
            StyleEdit::SetFirstItemTiming {
                kind,
                duration,
                transition,
            } => {
                let rotation = self.rotation_entry(*kind);
                rotation.set_first_duration(*kind, *duration);
                if *kind == RotationKind::Image {
                    rotation.first_image_transition_type = transition.clone();
                }
            }
            StyleEdit::SetItemTiming {
                kind,
                index,
                duration,
                transition,
            } => {
                let item = self.rotation_item_mut(*kind, *index)?;
                item.duration_seconds = duration.max(0.0);
                item.transition_type = transition.clone();
            }
            StyleEdit::SetRotationTransition {
                transition,
                duration_ms,
            } => {
                self.image_rotation_transition = transition.clone();
                self.image_rotation_transition_duration =
                    duration_ms.map(|ms| ms.clamp(TRANSITION_MS_MIN, TRANSITION_MS_MAX));
            }
            StyleEdit::ClearRotation { kind } => match kind {
                RotationKind::Image => self.image_rotation = None,
                RotationKind::Video => self.video_rotation = None,
            },
            StyleEdit::SetAppearance {
                blur,
                image_fit,
                image_clip_shape,
                image_opacity,
            } => {
                self.blur = *blur;
                self.image_fit = image_fit.clone();
                self.image_clip_shape = image_clip_shape.clone();
                self.image_opacity = *image_opacity;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_layer_lifecycle() {
        let mut style = StyleConfig::default();
        let mut layer = TextLayer::new("Coffee");
        let phase = RotationPhase::First;

        style
            .edit(&StyleEdit::AddTextLayer {
                phase,
                layer: layer.clone(),
            })
            .unwrap();
        layer.text = "Tea".into();
        style
            .edit(&StyleEdit::UpdateTextLayer {
                phase,
                layer: layer.clone(),
            })
            .unwrap();
        assert_eq!(style.text_layers[0].text, "Tea");

        style
            .edit(&StyleEdit::RemoveTextLayer {
                phase,
                layer_id: layer.id.clone(),
            })
            .unwrap();
        assert!(style.text_layers.is_empty());
        assert_eq!(
            style.edit(&StyleEdit::RemoveTextLayer {
                phase,
                layer_id: layer.id.clone(),
            }),
            Err(StyleError::TextLayerNotFound(layer.id))
        );
    }

    #[test]
    fn test_rotation_items_are_managed_in_order() {
        let mut style = StyleConfig::default();
        let kind = RotationKind::Video;
        for url in ["a.mp4", "b.mp4", "c.mp4"] {
            style
                .edit(&StyleEdit::AddRotationItem {
                    kind,
                    item: RotationItem::new(url, 0.0),
                })
                .unwrap();
        }

        style
            .edit(&StyleEdit::MoveRotationItem { kind, from: 2, to: 0 })
            .unwrap();
        style
            .edit(&StyleEdit::RemoveRotationItem { kind, index: 1 })
            .unwrap();

        let urls: Vec<_> = style
            .rotation(kind)
            .unwrap()
            .rotation_items
            .iter()
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(urls, ["c.mp4", "b.mp4"]);

        assert_eq!(
            style.edit(&StyleEdit::RemoveRotationItem { kind, index: 9 }),
            Err(StyleError::RotationItemOutOfRange {
                kind,
                index: 9,
                len: 2
            })
        );
        assert_eq!(
            style.edit(&StyleEdit::RemoveRotationItem {
                kind: RotationKind::Image,
                index: 0
            }),
            Err(StyleError::NoRotation(RotationKind::Image))
        );
    }

    #[test]
    fn test_price_badge_per_phase() {
        let mut style = StyleConfig::default();
        style
            .edit(&StyleEdit::SetPriceBadge {
                phase: RotationPhase::First,
                badge: Some(PriceBadge {
                    price: Some("9.90".into()),
                    ..PriceBadge::default()
                }),
            })
            .unwrap();
        assert_eq!(
            style.price_badge.as_ref().unwrap().price.as_deref(),
            Some("9.90")
        );

        // Rotation item phases need an existing item.
        let missing = StyleEdit::SetPriceBadge {
            phase: RotationPhase::Item {
                kind: RotationKind::Image,
                index: 0,
            },
            badge: None,
        };
        assert!(style.edit(&missing).is_err());

        style
            .edit(&StyleEdit::SetPriceBadge {
                phase: RotationPhase::First,
                badge: None,
            })
            .unwrap();
        assert!(style.price_badge.is_none());
    }

    #[test]
    fn test_timing_edits_write_stored_keys() {
        let mut style = StyleConfig::default();
        let kind = RotationKind::Image;
        style
            .edit(&StyleEdit::AddRotationItem {
                kind,
                item: RotationItem::new("b.jpg", 10.0),
            })
            .unwrap();
        style
            .edit(&StyleEdit::SetFirstItemTiming {
                kind,
                duration: 500.0,
                transition: Some(Transition::ZoomIn),
            })
            .unwrap();
        style
            .edit(&StyleEdit::SetItemTiming {
                kind,
                index: 0,
                duration: 4.0,
                transition: Some(Transition::Dissolve),
            })
            .unwrap();
        style
            .edit(&StyleEdit::SetRotationTransition {
                transition: Some(Transition::SlideUp),
                duration_ms: Some(50.0),
            })
            .unwrap();

        let value = serde_json::to_value(&style).unwrap();
        let rotation = &value["imageRotation"];
        assert_eq!(rotation["firstImageDurationSeconds"], serde_json::json!(120.0));
        assert_eq!(rotation["firstImageTransitionType"], "zoom-in");
        assert_eq!(rotation["rotationItems"][0]["durationSeconds"], serde_json::json!(4.0));
        assert_eq!(rotation["rotationItems"][0]["transitionType"], "dissolve");
        assert_eq!(value["imageRotationTransition"], "slide-up");
        assert_eq!(value["imageRotationTransitionDuration"], serde_json::json!(200.0));
    }
}
