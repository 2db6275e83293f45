//! Templates, blocks and block contents as stored by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::id::{BlockId, ContentId, TemplateId};
use crate::style::{BlockStyle, StyleConfig};

/// A signage display template: the root of a block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A rectangular region of a template.
///
/// Position and size are percentages of the template canvas. When any of them
/// is missing the block is placed by the grid auto-layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    #[serde(default)]
    pub block_index: u32,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default, with = "crate::style::blob")]
    pub style_config: BlockStyle,
}

impl Block {
    /// Explicit `(x, y, w, h)` when all four are stored.
    pub fn explicit_rect(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.position_x?, self.position_y?, self.width?, self.height?))
    }
}

/// Kind of a block content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Image,
    Video,
    RegionalMenu,
    Icon,
    CampaignBadge,
    Drink,
    Text,
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Image and video contents provide a block's visual background.
    pub fn is_visual(&self) -> bool {
        matches!(self, ContentType::Image | ContentType::Video)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::RegionalMenu => "regional_menu",
            ContentType::Icon => "icon",
            ContentType::CampaignBadge => "campaign_badge",
            ContentType::Drink => "drink",
            ContentType::Text => "text",
            ContentType::Other => "other",
        };
        f.write_str(name)
    }
}

/// A piece of content layered into a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::style::blob::serialize",
        deserialize_with = "crate::style::deserialize_content_style"
    )]
    pub style_config: StyleConfig,
}

/// Accept prices stored either as text or as a JSON number.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

/// A block together with its contents, as held by the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockWithContents {
    pub block: Block,
    pub contents: Vec<Content>,
}

impl BlockWithContents {
    /// The image or video content acting as the block's visual.
    ///
    /// Only one is expected; if several exist the first one wins.
    pub fn visual(&self) -> Option<&Content> {
        self.contents.iter().find(|c| c.content_type.is_visual())
    }

    pub fn content(&self, id: &ContentId) -> Option<&Content> {
        self.contents.iter().find(|c| &c.id == id)
    }

    pub fn content_mut(&mut self, id: &ContentId) -> Option<&mut Content> {
        self.contents.iter_mut().find(|c| &c.id == id)
    }
}

/// A fully loaded template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTree {
    pub template: Template,
    /// Blocks ordered by `block_index`.
    pub blocks: Vec<BlockWithContents>,
}

impl TemplateTree {
    pub fn new(template: Template, mut blocks: Vec<BlockWithContents>) -> Self {
        blocks.sort_by_key(|b| b.block.block_index);
        Self { template, blocks }
    }

    pub fn block(&self, id: &BlockId) -> Option<&BlockWithContents> {
        self.blocks.iter().find(|b| &b.block.id == id)
    }

    pub fn find_content(&self, id: &ContentId) -> Option<&Content> {
        self.blocks.iter().find_map(|b| b.content(id))
    }

    pub fn find_content_mut(&mut self, id: &ContentId) -> Option<&mut Content> {
        self.blocks.iter_mut().find_map(|b| b.content_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::RotationKind;
    use serde_json::json;

    #[test]
    fn test_content_decodes_stringified_style() {
        let raw = json!({
            "id": 7,
            "block_id": "b1",
            "content_type": "video",
            "price": 4.5,
            "image_url": "https://cdn/x.mp4",
            "style_config": "{\"blur\":4,\"videoRotation\":{\"rotationItems\":[{\"url\":\"y.mp4\",\"durationSeconds\":8}]},\"textLayers\":[{\"id\":\"t\",\"size\":140}]}"
        });
        let content: Content = serde_json::from_value(raw).unwrap();
        assert_eq!(content.id.as_str(), "7");
        assert_eq!(content.price.as_deref(), Some("4.5"));
        assert_eq!(content.style_config.blur, Some(4.0));
        let rotation = content.style_config.video_rotation.as_ref().unwrap();
        assert_eq!(rotation.rotation_items[0].duration_seconds, 8.0);
        assert_eq!(rotation.first_duration(RotationKind::Video), 10.0);
        // Stored values outside the editor's ranges are pulled in on read.
        assert_eq!(content.style_config.text_layers[0].size, 120.0);

        // Writes always send the stringified form.
        let back = serde_json::to_value(&content).unwrap();
        assert!(back["style_config"].is_string());
    }

    #[test]
    fn test_unknown_content_type_is_tolerated() {
        let content: Content =
            serde_json::from_value(json!({"id": "c", "content_type": "hologram"})).unwrap();
        assert_eq!(content.content_type, ContentType::Other);
        assert_eq!(content.style_config, StyleConfig::default());
    }

    #[test]
    fn test_explicit_rect_requires_all_fields() {
        let mut block: Block = serde_json::from_value(json!({
            "id": "b", "block_index": 0, "position_x": 0.0, "position_y": 50.0, "width": 100.0
        }))
        .unwrap();
        assert_eq!(block.explicit_rect(), None);
        block.height = Some(50.0);
        assert_eq!(block.explicit_rect(), Some((0.0, 50.0, 100.0, 50.0)));
    }

    #[test]
    fn test_tree_orders_blocks_by_index() {
        let block = |id: &str, index: u32| BlockWithContents {
            block: Block {
                id: id.into(),
                template_id: None,
                block_index: index,
                position_x: None,
                position_y: None,
                width: None,
                height: None,
                style_config: BlockStyle::default(),
            },
            contents: Vec::new(),
        };
        let tree = TemplateTree::new(
            Template {
                id: "t".into(),
                display_name: "Menu".into(),
                description: None,
            },
            vec![block("c", 2), block("a", 0), block("b", 1)],
        );
        let ids: Vec<_> = tree.blocks.iter().map(|b| b.block.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
