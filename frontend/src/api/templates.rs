use signage_types::api::{SaveAsRequest, UpdateTemplateRequest, User};
use signage_types::{Block, Template, TemplateId};
use tracing::info;

use super::*;

impl ApiClient {
    /// Get a template by ID.
    pub async fn get_template(&self, id: &TemplateId) -> ApiResult<Template> {
        let url = format!("{}/templates/{}", self.base_url, id);
        info!("Fetching template from: {}", url);

        let response = self.send(self.client.get(&url), "fetching template").await?;
        let template: Template = Self::decode(response, "template").await?;

        info!("Loaded template '{}'", template.display_name);
        Ok(template)
    }

    /// List the blocks of a template.
    pub async fn list_template_blocks(&self, id: &TemplateId) -> ApiResult<Vec<Block>> {
        let url = format!("{}/templates/{}/blocks", self.base_url, id);
        info!("Fetching template blocks from: {}", url);

        let response = self
            .send(self.client.get(&url), "fetching template blocks")
            .await?;
        let blocks: Vec<Block> = Self::decode(response, "template blocks").await?;

        info!("Successfully loaded {} blocks", blocks.len());
        Ok(blocks)
    }

    /// Update template metadata.
    pub async fn update_template(
        &self,
        id: &TemplateId,
        req: &UpdateTemplateRequest,
    ) -> ApiResult<()> {
        let url = format!("{}/templates/{}", self.base_url, id);
        info!("Updating template via API: PATCH {}", url);

        self.send(self.client.patch(&url).json(req), "updating template")
            .await?;
        Ok(())
    }

    /// Copy a template.
    pub async fn save_template_as(
        &self,
        id: &TemplateId,
        req: &SaveAsRequest,
    ) -> ApiResult<Template> {
        let url = format!("{}/templates/{}/save-as", self.base_url, id);
        info!("Saving template copy via API: POST {}", url);

        let response = self
            .send(self.client.post(&url).json(req), "saving template copy")
            .await?;
        let template: Template = Self::decode(response, "saved template").await?;

        info!("Template {} saved as {}", id, template.id);
        Ok(template)
    }

    /// List users a template copy can be assigned to.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        let url = format!("{}/users", self.base_url);
        info!("Fetching users from: {}", url);

        let response = self.send(self.client.get(&url), "fetching users").await?;
        Self::decode(response, "user list").await
    }
}
