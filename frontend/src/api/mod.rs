//! API client for communicating with the signage backend.

mod ai;
mod blocks;
mod contents;
mod library;
mod media;
mod templates;

pub(crate) use contents::validate_style;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use signage_types::api::{
    CreateBlockRequest, CreateContentRequest, LibraryItem, LibraryItemRequest, SaveAsRequest,
    UpdateBlockRequest, UpdateContentRequest, UpdateTemplateRequest, User,
};
use signage_types::{Block, BlockId, Content, ContentId, RecordId, Template, TemplateId};
use thiserror::Error;
use tracing::{debug, error, info};

/// Upload endpoint used when none is configured.
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:3000/api/upload";

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Network error
    #[error("Network error: {0}")]
    Network(String),
    /// HTTP error with status code
    #[error("HTTP {0} error: {1}")]
    Http(u16, String),
    /// Deserialization error
    #[error("Decode error: {0}")]
    Decode(String),
    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(status, _) => Some(*status),
            _ => None,
        }
    }
}

/// Client for the signage REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    upload_url: String,
    client: reqwest::Client,
    /// Optional auth token for Bearer authentication
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client with an optional authentication token.
    pub fn new_with_auth(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            client: reqwest::Client::new(),
            auth_token,
        }
    }

    /// Use a different file upload endpoint.
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    /// Helper to add auth header to a request builder
    pub(super) fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.auth_token {
            builder.header("Authorization", format!("Bearer {}", token))
        } else {
            builder
        }
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Send a request and turn non-success statuses into [`ApiError::Http`].
    pub(super) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = self.with_auth(builder).send().await.map_err(|e| {
            error!("Network error {}: {}", what, e);
            ApiError::Network(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("HTTP error {} {}: {}", status, what, text);
            return Err(ApiError::Http(status, text));
        }

        Ok(response)
    }

    pub(super) async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> ApiResult<T> {
        response.json().await.map_err(|e| {
            error!("Failed to parse response {}: {}", what, e);
            ApiError::Decode(e.to_string())
        })
    }
}

/// Backend operations the editor depends on.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory backend.
#[async_trait]
pub trait SignageBackend: Send + Sync {
    async fn get_template(&self, id: &TemplateId) -> ApiResult<Template>;
    async fn list_template_blocks(&self, id: &TemplateId) -> ApiResult<Vec<Block>>;
    async fn update_template(&self, id: &TemplateId, req: &UpdateTemplateRequest)
        -> ApiResult<()>;
    async fn save_template_as(&self, id: &TemplateId, req: &SaveAsRequest) -> ApiResult<Template>;
    async fn list_users(&self) -> ApiResult<Vec<User>>;

    async fn create_block(&self, req: &CreateBlockRequest) -> ApiResult<Block>;
    async fn update_block(&self, id: &BlockId, req: &UpdateBlockRequest) -> ApiResult<()>;
    async fn delete_block(&self, id: &BlockId) -> ApiResult<()>;

    async fn list_block_contents(&self, block_id: &BlockId) -> ApiResult<Vec<Content>>;
    async fn create_content(&self, req: &CreateContentRequest) -> ApiResult<Content>;
    async fn update_content(&self, id: &ContentId, req: &UpdateContentRequest) -> ApiResult<()>;
    async fn delete_content(&self, id: &ContentId) -> ApiResult<()>;

    async fn list_library(&self) -> ApiResult<Vec<LibraryItem>>;
    async fn create_library_item(&self, req: &LibraryItemRequest) -> ApiResult<LibraryItem>;
    async fn update_library_item(
        &self,
        id: &RecordId,
        req: &LibraryItemRequest,
    ) -> ApiResult<LibraryItem>;

    /// Upload a file and return its public URL.
    async fn upload_file(&self, filename: &str, data: Vec<u8>, mime: &str) -> ApiResult<String>;
    /// Ask the backend to remove an image's background.
    async fn remove_background(&self, image_url: &str) -> ApiResult<String>;
    /// Download a media asset.
    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>>;
    /// Read up to `len` bytes of a media asset starting at `start`.
    async fn fetch_range(&self, url: &str, start: u64, len: u64) -> ApiResult<Vec<u8>>;
}

#[async_trait]
impl SignageBackend for ApiClient {
    async fn get_template(&self, id: &TemplateId) -> ApiResult<Template> {
        ApiClient::get_template(self, id).await
    }

    async fn list_template_blocks(&self, id: &TemplateId) -> ApiResult<Vec<Block>> {
        ApiClient::list_template_blocks(self, id).await
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        req: &UpdateTemplateRequest,
    ) -> ApiResult<()> {
        ApiClient::update_template(self, id, req).await
    }

    async fn save_template_as(&self, id: &TemplateId, req: &SaveAsRequest) -> ApiResult<Template> {
        ApiClient::save_template_as(self, id, req).await
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        ApiClient::list_users(self).await
    }

    async fn create_block(&self, req: &CreateBlockRequest) -> ApiResult<Block> {
        ApiClient::create_block(self, req).await
    }

    async fn update_block(&self, id: &BlockId, req: &UpdateBlockRequest) -> ApiResult<()> {
        ApiClient::update_block(self, id, req).await
    }

    async fn delete_block(&self, id: &BlockId) -> ApiResult<()> {
        ApiClient::delete_block(self, id).await
    }

    async fn list_block_contents(&self, block_id: &BlockId) -> ApiResult<Vec<Content>> {
        ApiClient::list_block_contents(self, block_id).await
    }

    async fn create_content(&self, req: &CreateContentRequest) -> ApiResult<Content> {
        ApiClient::create_content(self, req).await
    }

    async fn update_content(&self, id: &ContentId, req: &UpdateContentRequest) -> ApiResult<()> {
        ApiClient::update_content(self, id, req).await
    }

    async fn delete_content(&self, id: &ContentId) -> ApiResult<()> {
        ApiClient::delete_content(self, id).await
    }

    async fn list_library(&self) -> ApiResult<Vec<LibraryItem>> {
        ApiClient::list_library(self).await
    }

    async fn create_library_item(&self, req: &LibraryItemRequest) -> ApiResult<LibraryItem> {
        ApiClient::create_library_item(self, req).await
    }

    async fn update_library_item(
        &self,
        id: &RecordId,
        req: &LibraryItemRequest,
    ) -> ApiResult<LibraryItem> {
        ApiClient::update_library_item(self, id, req).await
    }

    async fn upload_file(&self, filename: &str, data: Vec<u8>, mime: &str) -> ApiResult<String> {
        ApiClient::upload_file(self, filename, data, mime).await
    }

    async fn remove_background(&self, image_url: &str) -> ApiResult<String> {
        ApiClient::remove_background(self, image_url).await
    }

    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        info!("Downloading media from: {}", url);
        ApiClient::fetch_bytes(self, url).await
    }

    async fn fetch_range(&self, url: &str, start: u64, len: u64) -> ApiResult<Vec<u8>> {
        debug!("Reading {} bytes at {} of {}", len, start, url);
        ApiClient::fetch_range(self, url, start, len).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new_with_auth("http://localhost:3001/api/", None);
        assert_eq!(client.base_url(), "http://localhost:3001/api");
        assert_eq!(client.upload_url(), DEFAULT_UPLOAD_URL);

        let client = client.with_upload_url("https://cdn.example/upload");
        assert_eq!(client.upload_url(), "https://cdn.example/upload");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::Http(501, "Not Implemented".into()).to_string(),
            "HTTP 501 error: Not Implemented"
        );
        assert_eq!(ApiError::Http(404, String::new()).status(), Some(404));
        assert_eq!(ApiError::Network("down".into()).status(), None);
    }
}
