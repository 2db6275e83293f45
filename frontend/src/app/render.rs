//! Painting of blocks and their layers.
//!
//! Positions are percentages of the block rectangle. Sizes given in pixels
//! refer to a 1080 pixel high screen and are scaled with the canvas.

use egui::epaint::RectShape;
use egui::{Align2, Color32, Context, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};
use signage_types::style::DEFAULT_BLOCK_COLOR;
use signage_types::{
    BadgeModel, BlockStyle, ClipShape, Content, ContentType, DiscountBlockStyle, ImageFit,
    ImageScale, OverlayImageLayer, OverlayShape, PriceBadge, TextAlign, TextLayer,
};

use super::textures::TextureCache;

/// Screen height the pixel sizes of text layers and badges are designed for.
pub(super) const REFERENCE_HEIGHT: f32 = 1080.0;

/// Badge diameter at zoom 1.0, in reference pixels.
const BADGE_SIZE: f32 = 140.0;

const PLACEHOLDER: Color32 = Color32::from_gray(24);

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)` or `rgba(...)`.
pub(super) fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(args);
    }
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut c = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(Color32::from_rgb(c.next()??, c.next()??, c.next()??))
        }
        6 => Some(Color32::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Color32> {
    let parts: Vec<f32> = args
        .split(',')
        .map(|p| p.trim().parse::<f32>().ok())
        .collect::<Option<_>>()?;
    let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
    match parts.as_slice() {
        [r, g, b] => Some(Color32::from_rgb(channel(*r), channel(*g), channel(*b))),
        [r, g, b, a] => Some(Color32::from_rgba_unmultiplied(
            channel(*r),
            channel(*g),
            channel(*b),
            (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )),
        _ => None,
    }
}

/// Hex colors of a CSS gradient expression, in order.
pub(super) fn gradient_colors(gradient: &str) -> Vec<Color32> {
    gradient
        .match_indices('#')
        .filter_map(|(start, _)| {
            let hex: String = gradient[start + 1..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            parse_color(&format!("#{}", hex))
        })
        .collect()
}

pub(super) fn at_percent(rect: Rect, x: f64, y: f64) -> Pos2 {
    rect.min + Vec2::new(rect.width() * x as f32 / 100.0, rect.height() * y as f32 / 100.0)
}

/// Target rectangle of an image of `image_size` drawn into `block`.
///
/// The result may extend past the block; callers clip to the block.
/// Anything but `contain` covers the block.
pub(super) fn fitted_rect(block: Rect, image_size: Vec2, fit: &ImageFit, scale: ImageScale) -> Rect {
    let size = if image_size.x <= 0.0 || image_size.y <= 0.0 {
        block.size()
    } else {
        let (w, h) = (block.width() / image_size.x, block.height() / image_size.y);
        match fit {
            ImageFit::Contain => image_size * w.min(h),
            _ => image_size * w.max(h),
        }
    };
    let size = Vec2::new(size.x * scale.x as f32, size.y * scale.y as f32);
    Rect::from_center_size(block.center(), size)
}

pub(super) fn paint_block_background(
    painter: &Painter,
    ctx: &Context,
    textures: &mut TextureCache,
    rect: Rect,
    style: &BlockStyle,
) {
    let gradient = style
        .background_gradient
        .as_deref()
        .map(gradient_colors)
        .unwrap_or_default();

    if let [top, .., bottom] = gradient.as_slice() {
        let mut mesh = Mesh::default();
        mesh.colored_vertex(rect.left_top(), *top);
        mesh.colored_vertex(rect.right_top(), *top);
        mesh.colored_vertex(rect.left_bottom(), *bottom);
        mesh.colored_vertex(rect.right_bottom(), *bottom);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(1, 3, 2);
        painter.add(Shape::mesh(mesh));
    } else {
        let color = style
            .background_color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(PLACEHOLDER);
        painter.rect_filled(rect, 0.0, color);
    }

    if let Some(url) = style.background_image.as_deref() {
        if let Some(texture) = textures.get(ctx, url) {
            let target = fitted_rect(rect, texture.size_vec2(), &ImageFit::Cover, ImageScale::default());
            painter.with_clip_rect(rect).image(
                texture.id(),
                target,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }
}

/// Paint a block's image or video content.
pub(super) fn paint_visual(
    painter: &Painter,
    ctx: &Context,
    textures: &mut TextureCache,
    rect: Rect,
    content: &Content,
) {
    let style = &content.style_config;
    match content.content_type {
        ContentType::Video => {
            painter.rect_filled(rect, 0.0, Color32::from_gray(12));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                egui_phosphor::regular::PLAY_CIRCLE,
                FontId::proportional((rect.height() * 0.2).clamp(12.0, 96.0)),
                Color32::from_white_alpha(160),
            );
            if let Some(url) = content.image_url.as_deref() {
                let name = url.rsplit('/').next().unwrap_or(url);
                painter.text(
                    rect.center_bottom() - Vec2::new(0.0, 8.0),
                    Align2::CENTER_BOTTOM,
                    name,
                    FontId::proportional(11.0),
                    Color32::from_white_alpha(120),
                );
            }
        }
        _ => {
            let Some(url) = content.image_url.as_deref() else {
                return;
            };
            let Some(texture) = textures.get(ctx, url) else {
                painter.rect_filled(rect, 0.0, PLACEHOLDER);
                return;
            };

            let target = fitted_rect(
                rect,
                texture.size_vec2(),
                &style.image_fit.clone().unwrap_or_default(),
                style.image_scale_xy(),
            );
            let opacity = style.image_opacity.unwrap_or(1.0).clamp(0.0, 1.0);
            let tint = Color32::from_white_alpha((opacity * 255.0) as u8);
            let radius = match style.image_clip_shape {
                Some(ClipShape::Circle) => target.width().min(target.height()) / 2.0,
                _ => 0.0,
            };

            let shape = RectShape::filled(target, radius, tint).with_texture(
                texture.id(),
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            );
            painter.with_clip_rect(rect).add(shape);
        }
    }
}

/// Paint a text layer and return the rectangle it covers.
pub(super) fn paint_text_layer(painter: &Painter, block: Rect, layer: &TextLayer, px_scale: f32) -> Rect {
    let mut color = parse_color(&layer.color).unwrap_or(Color32::WHITE);
    let block_color = layer
        .block_color
        .as_deref()
        .and_then(parse_color)
        .or_else(|| parse_color(DEFAULT_BLOCK_COLOR))
        .unwrap_or(Color32::GOLD);
    let outline = layer.discount_block_style == Some(DiscountBlockStyle::Outline);
    if layer.is_discount_block {
        color = if outline { block_color } else { Color32::from_rgb(0x1f, 0x29, 0x37) };
    }

    let font = FontId::proportional((layer.size as f32 * px_scale).max(4.0));
    let galley = painter.layout_no_wrap(layer.display_text(), font, color);
    let anchor = match layer.text_align.clone().unwrap_or_default() {
        TextAlign::Left => Align2::LEFT_CENTER,
        TextAlign::Right => Align2::RIGHT_CENTER,
        _ => Align2::CENTER_CENTER,
    };
    let rect = anchor.anchor_size(at_percent(block, layer.x, layer.y), galley.size());

    if layer.is_discount_block {
        let frame = rect.expand(4.0 * px_scale.max(0.5));
        if outline {
            painter.rect_stroke(frame, 4.0, Stroke::new(2.0, block_color), StrokeKind::Outside);
        } else {
            painter.rect_filled(frame, 4.0, block_color);
        }
    }
    painter.galley(rect.min, galley, color);
    rect
}

pub(super) fn overlay_rect(block: Rect, layer: &OverlayImageLayer) -> Rect {
    let side = block.width() * layer.size as f32 / 100.0;
    Rect::from_center_size(at_percent(block, layer.x, layer.y), Vec2::splat(side))
}

pub(super) fn paint_overlay(
    painter: &Painter,
    ctx: &Context,
    textures: &mut TextureCache,
    block: Rect,
    layer: &OverlayImageLayer,
) -> Rect {
    let rect = overlay_rect(block, layer);
    let radius = match layer.shape {
        OverlayShape::Round => rect.width() / 2.0,
        OverlayShape::Rounded => rect.width() * 0.12,
        _ => 0.0,
    };
    if layer.shape == OverlayShape::Shadow {
        painter.rect_filled(
            rect.translate(Vec2::new(0.0, 4.0)),
            radius,
            Color32::from_black_alpha(90),
        );
    }
    match textures.get(ctx, &layer.image_url) {
        Some(texture) => {
            let shape = RectShape::filled(rect, radius, Color32::WHITE).with_texture(
                texture.id(),
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            );
            painter.add(shape);
        }
        None => {
            painter.rect_filled(rect, radius, Color32::from_white_alpha(30));
        }
    }
    rect
}

/// Paint a price badge and return the rectangle it covers.
pub(super) fn paint_badge(painter: &Painter, block: Rect, badge: &PriceBadge, px_scale: f32) -> Rect {
    let (x, y) = badge.resolved_position();
    let side = BADGE_SIZE * px_scale * badge.scale() as f32;
    let center = at_percent(block, x, y);
    let fill = parse_color(&badge.color).unwrap_or(Color32::from_rgb(229, 57, 53));
    let text_color = parse_color(&badge.text_color).unwrap_or(Color32::WHITE);

    let rect = match badge.model {
        BadgeModel::Circle
        | BadgeModel::Starburst
        | BadgeModel::Sticker
        | BadgeModel::Bubble
        | BadgeModel::Splash => {
            painter.circle_filled(center, side / 2.0, fill);
            Rect::from_center_size(center, Vec2::splat(side))
        }
        BadgeModel::Pill | BadgeModel::Banner | BadgeModel::Ribbon | BadgeModel::Flag => {
            let rect = Rect::from_center_size(center, Vec2::new(side * 1.6, side * 0.6));
            painter.rect_filled(rect, rect.height() / 2.0, fill);
            rect
        }
        BadgeModel::PriceTag => {
            let rect = Rect::from_center_size(center, Vec2::new(side * 1.2, side * 0.8));
            painter.rect_filled(rect, side * 0.06, fill);
            painter.circle_filled(
                rect.left_center() + Vec2::new(side * 0.12, 0.0),
                side * 0.05,
                Color32::from_white_alpha(200),
            );
            rect
        }
        _ => {
            let rect = Rect::from_center_size(center, Vec2::splat(side * 0.9));
            let radius = if badge.model == BadgeModel::Square { 0.0 } else { side * 0.15 };
            painter.rect_filled(rect, radius, fill);
            rect
        }
    };

    let main_size = (side * 0.28).max(6.0);
    let line = |offset: f32, text: &str, size: f32| {
        painter.text(
            center + Vec2::new(0.0, offset),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(size),
            text_color,
        );
    };
    line(0.0, badge.price.as_deref().unwrap_or_default(), main_size);
    if let Some(top) = badge.text_top.as_deref().filter(|t| !t.is_empty()) {
        line(-main_size * 0.9, top, main_size * 0.45);
    }
    if let Some(bottom) = badge.text_bottom.as_deref().filter(|t| !t.is_empty()) {
        line(main_size * 0.9, bottom, main_size * 0.45);
    }
    rect
}

/// Paint the eight resize handles around `rect`.
pub(super) fn paint_handles(painter: &Painter, rect: Rect, handles: &[crate::interaction::ResizeHandle]) {
    for handle in handles {
        let handle_rect = Rect::from_center_size(handle.anchor(rect), Vec2::splat(8.0));
        painter.rect_filled(handle_rect, 2.0, Color32::WHITE);
        painter.rect_stroke(handle_rect, 2.0, Stroke::new(1.0, Color32::BLACK), StrokeKind::Inside);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Color32::from_rgb(255, 128, 0)));
        assert_eq!(parse_color(" #fff "), Some(Color32::WHITE));
        assert_eq!(
            parse_color("#00000080"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 128))
        );
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(
            parse_color("rgba(251, 191, 36, 0.5)"),
            Some(Color32::from_rgba_unmultiplied(251, 191, 36, 128))
        );
        assert_eq!(parse_color("rgb(0,0,0)"), Some(Color32::BLACK));
        assert_eq!(parse_color("rgba(1, 2)"), None);
    }

    #[test]
    fn test_gradient_colors_in_order() {
        let colors = gradient_colors("linear-gradient(180deg, #000000 0%, #ff0000 100%)");
        assert_eq!(colors, vec![Color32::BLACK, Color32::from_rgb(255, 0, 0)]);
        assert!(gradient_colors("none").is_empty());
    }

    #[test]
    fn test_fitted_rect_modes() {
        let block = Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 100.0));
        let square = Vec2::splat(50.0);
        let unscaled = ImageScale::default();

        let cover = fitted_rect(block, square, &ImageFit::Cover, unscaled);
        assert_eq!(cover.size(), Vec2::splat(200.0));
        assert_eq!(cover.center(), block.center());

        let contain = fitted_rect(block, square, &ImageFit::Contain, unscaled);
        assert_eq!(contain.size(), Vec2::splat(100.0));

        let scaled = fitted_rect(block, square, &ImageFit::Contain, ImageScale { x: 2.0, y: 0.5 });
        assert_eq!(scaled.size(), Vec2::new(200.0, 50.0));

        // Unknown fit keywords cover the block.
        let other = fitted_rect(block, square, &ImageFit::Other("fill".into()), unscaled);
        assert_eq!(other.size(), cover.size());
    }

    #[test]
    fn test_overlay_rect_is_square_relative_to_width() {
        let block = Rect::from_min_size(Pos2::new(100.0, 0.0), Vec2::new(400.0, 200.0));
        let mut layer = OverlayImageLayer::new("https://cdn/logo.png");
        layer.x = 25.0;
        layer.y = 50.0;
        layer.size = 20.0;

        let rect = overlay_rect(block, &layer);
        assert_eq!(rect.size(), Vec2::splat(80.0));
        assert_eq!(rect.center(), Pos2::new(200.0, 100.0));
    }
}
