use signage_types::api::{LibraryItem, LibraryItemRequest};
use signage_types::RecordId;
use tracing::info;

use super::*;

impl ApiClient {
    /// List content library items.
    pub async fn list_library(&self) -> ApiResult<Vec<LibraryItem>> {
        let url = format!("{}/content-library", self.base_url);
        info!("Fetching content library from: {}", url);

        let response = self
            .send(self.client.get(&url), "fetching content library")
            .await?;
        let items: Vec<LibraryItem> = Self::decode(response, "content library").await?;

        info!("Content library has {} items", items.len());
        Ok(items)
    }

    /// Add an item to the content library.
    pub async fn create_library_item(&self, req: &LibraryItemRequest) -> ApiResult<LibraryItem> {
        let url = format!("{}/content-library", self.base_url);
        info!("Creating library item via API: POST {}", url);

        let response = self
            .send(self.client.post(&url).json(req), "creating library item")
            .await?;
        Self::decode(response, "created library item").await
    }

    /// Update a content library item.
    pub async fn update_library_item(
        &self,
        id: &RecordId,
        req: &LibraryItemRequest,
    ) -> ApiResult<LibraryItem> {
        let url = format!("{}/content-library/{}", self.base_url, id);
        info!("Updating library item via API: PATCH {}", url);

        let response = self
            .send(self.client.patch(&url).json(req), "updating library item")
            .await?;
        Self::decode(response, "updated library item").await
    }
}
