use garde::Validate;
use signage_types::api::{CreateContentRequest, UpdateContentRequest};
use signage_types::{BlockId, Content, ContentId, ContentType, StyleConfig};
use tracing::{info, warn};

use super::*;

/// Validate a style config before it is serialized into a request.
pub(crate) fn validate_style(
    style: &StyleConfig,
    content_type: Option<ContentType>,
) -> ApiResult<()> {
    style.validate().map_err(|report| {
        warn!("Rejected style config: {}", report);
        ApiError::Invalid(report.to_string())
    })?;
    if let Some(content_type) = content_type {
        style
            .check_kind(content_type)
            .map_err(|e| ApiError::Invalid(e.to_string()))?;
    }
    Ok(())
}

impl ApiClient {
    /// List the contents of a block.
    pub async fn list_block_contents(&self, block_id: &BlockId) -> ApiResult<Vec<Content>> {
        let url = format!("{}/template-block-contents/block/{}", self.base_url, block_id);
        info!("Fetching block contents from: {}", url);

        let response = self
            .send(self.client.get(&url), "fetching block contents")
            .await?;
        // The backend answers `null` for blocks without contents.
        let contents: Option<Vec<Content>> = Self::decode(response, "block contents").await?;
        Ok(contents.unwrap_or_default())
    }

    /// Create a content record.
    pub async fn create_content(&self, req: &CreateContentRequest) -> ApiResult<Content> {
        validate_style(&req.style_config, Some(req.content_type))?;

        let url = format!("{}/template-block-contents", self.base_url);
        info!(
            "Creating {} content in block {} via API: POST {}",
            req.content_type, req.block_id, url
        );

        let response = self
            .send(self.client.post(&url).json(req), "creating content")
            .await?;
        let content: Content = Self::decode(response, "created content").await?;

        info!("Successfully created content: {}", content.id);
        Ok(content)
    }

    /// Update a content record. Only fields set on `req` are sent.
    pub async fn update_content(&self, id: &ContentId, req: &UpdateContentRequest) -> ApiResult<()> {
        if let Some(style) = &req.style_config {
            validate_style(style, req.content_type)?;
        }

        let url = format!("{}/template-block-contents/{}", self.base_url, id);
        info!("Updating content via API: PATCH {}", url);

        self.send(self.client.patch(&url).json(req), "updating content")
            .await?;
        Ok(())
    }

    /// Delete a content record.
    pub async fn delete_content(&self, id: &ContentId) -> ApiResult<()> {
        let url = format!("{}/template-block-contents/{}", self.base_url, id);
        info!("Deleting content via API: DELETE {}", url);

        self.send(self.client.delete(&url), "deleting content")
            .await?;

        info!("Successfully deleted content: {}", id);
        Ok(())
    }
}
