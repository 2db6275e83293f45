//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::id::{BlockId, RecordId, TemplateId};
use crate::style::{BlockStyle, StyleConfig};
use crate::template::ContentType;

// ============================================================================
// Template API Types
// ============================================================================

/// Request to update template metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Library a saved template copy is published into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateScope {
    System,
    #[default]
    User,
}

/// Request to copy a template, optionally on behalf of another user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAsRequest {
    pub scope: TemplateScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A user a template copy can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

// ============================================================================
// Block API Types
// ============================================================================

/// Request to create a block.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBlockRequest {
    pub template_id: TemplateId,
    pub block_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(serialize_with = "crate::style::blob::serialize")]
    pub style_config: BlockStyle,
}

/// Partial block update. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBlockRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::style::blob::serialize_option"
    )]
    pub style_config: Option<BlockStyle>,
}

impl UpdateBlockRequest {
    /// Pin a block to an explicit rectangle.
    pub fn placement(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            position_x: Some(x),
            position_y: Some(y),
            width: Some(w),
            height: Some(h),
            ..Self::default()
        }
    }
}

// ============================================================================
// Content API Types
// ============================================================================

/// Request to create a content record inside a block.
#[derive(Debug, Clone, Serialize)]
pub struct CreateContentRequest {
    pub block_id: BlockId,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(serialize_with = "crate::style::blob::serialize")]
    pub style_config: StyleConfig,
}

impl CreateContentRequest {
    pub fn new(block_id: BlockId, content_type: ContentType) -> Self {
        Self {
            block_id,
            content_type,
            title: None,
            price: None,
            description: None,
            image_url: None,
            style_config: StyleConfig::default(),
        }
    }
}

/// Partial content update. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::style::blob::serialize_option"
    )]
    pub style_config: Option<StyleConfig>,
}

impl UpdateContentRequest {
    pub fn style(style_config: StyleConfig) -> Self {
        Self {
            style_config: Some(style_config),
            ..Self::default()
        }
    }
}

// ============================================================================
// Content Library API Types
// ============================================================================

/// A reusable asset in the shared content library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

/// Create or patch body for a library item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

// ============================================================================
// Media API Types
// ============================================================================

/// One stored file in an upload reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub src: String,
}

/// Response of the file upload endpoint. Both lists carry the same assets;
/// files that could not be stored are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub data: Vec<UploadedAsset>,
    #[serde(default)]
    pub assets: Vec<UploadedAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    /// Public URL of the first stored file.
    pub fn first_url(&self) -> Option<&str> {
        self.assets
            .first()
            .or_else(|| self.data.first())
            .map(|asset| asset.src.as_str())
            .filter(|src| !src.is_empty())
    }
}

/// Body of `POST /ai/remove-background`: an image URL or a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveBackgroundRequest {
    pub image: String,
}

/// Result of server-side background removal, a `data:` URL of the cut-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveBackgroundResponse {
    #[serde(rename = "dataUrl")]
    pub data_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_block_sends_only_set_fields() {
        let body = serde_json::to_value(UpdateBlockRequest::placement(0.0, 0.0, 50.0, 100.0)).unwrap();
        assert_eq!(
            body,
            json!({"position_x": 0.0, "position_y": 0.0, "width": 50.0, "height": 100.0})
        );

        let body = serde_json::to_value(UpdateBlockRequest {
            style_config: Some(BlockStyle {
                background_color: Some("#000".into()),
                ..BlockStyle::default()
            }),
            ..UpdateBlockRequest::default()
        })
        .unwrap();
        assert_eq!(body, json!({"style_config": "{\"background_color\":\"#000\"}"}));
    }

    #[test]
    fn test_save_as_body() {
        let body = serde_json::to_value(SaveAsRequest {
            scope: TemplateScope::User,
            target_user_id: Some("42".into()),
            display_name: None,
        })
        .unwrap();
        assert_eq!(body, json!({"scope": "user", "target_user_id": "42"}));

    }

    #[test]
    fn test_upload_reply_yields_first_asset() {
        let resp: UploadResponse = serde_json::from_value(json!({
            "data": [{"src": "https://cdn/uploads/2026-10-16/a-1.png"}],
            "assets": [{"src": "https://cdn/uploads/2026-10-16/a-1.png"}]
        }))
        .unwrap();
        assert_eq!(resp.first_url(), Some("https://cdn/uploads/2026-10-16/a-1.png"));

        // Rejected file types come back as empty lists.
        let empty: UploadResponse =
            serde_json::from_value(json!({"data": [], "assets": []})).unwrap();
        assert_eq!(empty.first_url(), None);

        let failed: UploadResponse =
            serde_json::from_value(json!({"error": "upload failed", "data": [], "assets": []}))
                .unwrap();
        assert_eq!(failed.error.as_deref(), Some("upload failed"));
    }

    #[test]
    fn test_remove_background_wire_format() {
        let body = serde_json::to_value(RemoveBackgroundRequest {
            image: "https://cdn/p.jpg".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"image": "https://cdn/p.jpg"}));

        let resp: RemoveBackgroundResponse =
            serde_json::from_value(json!({"dataUrl": "data:image/png;base64,AAAA"})).unwrap();
        assert!(resp.data_url.starts_with("data:"));
    }

    #[test]
    fn test_update_content_style_is_stringified() {
        let body = serde_json::to_value(UpdateContentRequest::style(StyleConfig {
            blur: Some(3.0),
            ..StyleConfig::default()
        }))
        .unwrap();
        assert_eq!(body, json!({"style_config": "{\"blur\":3.0}"}));
    }
}
