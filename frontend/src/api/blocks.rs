use signage_types::api::{CreateBlockRequest, UpdateBlockRequest};
use signage_types::{Block, BlockId};
use tracing::info;

use super::*;

impl ApiClient {
    /// Create a block in a template.
    pub async fn create_block(&self, req: &CreateBlockRequest) -> ApiResult<Block> {
        let url = format!("{}/template-blocks", self.base_url);
        info!(
            "Creating block {} of template {} via API: POST {}",
            req.block_index, req.template_id, url
        );

        let response = self
            .send(self.client.post(&url).json(req), "creating block")
            .await?;
        let block: Block = Self::decode(response, "created block").await?;

        info!("Successfully created block: {}", block.id);
        Ok(block)
    }

    /// Update a block's placement, index or background.
    pub async fn update_block(&self, id: &BlockId, req: &UpdateBlockRequest) -> ApiResult<()> {
        let url = format!("{}/template-blocks/{}", self.base_url, id);
        info!("Updating block via API: PATCH {}", url);

        self.send(self.client.patch(&url).json(req), "updating block")
            .await?;
        Ok(())
    }

    /// Delete a block.
    pub async fn delete_block(&self, id: &BlockId) -> ApiResult<()> {
        let url = format!("{}/template-blocks/{}", self.base_url, id);
        info!("Deleting block via API: DELETE {}", url);

        self.send(self.client.delete(&url), "deleting block").await?;

        info!("Successfully deleted block: {}", id);
        Ok(())
    }
}
