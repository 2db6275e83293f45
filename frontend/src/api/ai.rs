use signage_types::api::{RemoveBackgroundRequest, RemoveBackgroundResponse};
use tracing::info;

use super::*;

impl ApiClient {
    /// Remove an image's background server-side.
    ///
    /// The result is a `data:` URL holding a PNG.
    pub async fn remove_background(&self, image_url: &str) -> ApiResult<String> {
        let url = format!("{}/ai/remove-background", self.base_url);
        info!("Requesting background removal via API: POST {}", url);

        let req = RemoveBackgroundRequest {
            image: image_url.to_string(),
        };
        let response = self
            .send(self.client.post(&url).json(&req), "removing background")
            .await?;
        let result: RemoveBackgroundResponse = Self::decode(response, "background removal").await?;
        Ok(result.data_url)
    }
}
