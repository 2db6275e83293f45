use reqwest::header::RANGE;
use reqwest::StatusCode;
use signage_types::api::UploadResponse;
use tracing::{debug, info, warn};

use super::*;

impl ApiClient {
    /// Upload a file to the configured upload endpoint.
    ///
    /// Returns the public URL of the stored asset.
    pub async fn upload_file(&self, filename: &str, data: Vec<u8>, mime: &str) -> ApiResult<String> {
        info!(
            "Uploading file {} ({} bytes) to: {}",
            filename,
            data.len(),
            self.upload_url
        );

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Invalid(e.to_string()))?;

        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send(self.client.post(&self.upload_url).multipart(form), "uploading file")
            .await?;
        let result: UploadResponse = Self::decode(response, "upload").await?;

        let Some(url) = result.first_url() else {
            warn!("Upload of {} ({}) stored no file", filename, mime);
            return Err(ApiError::Invalid(format!(
                "upload of {} was not stored (unsupported type {})",
                filename, mime
            )));
        };
        info!("Uploaded {} to {}", filename, url);
        Ok(url.to_string())
    }

    /// Download a media asset, e.g. to process an image.
    pub async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        let response = self.send(self.client.get(url), "downloading media").await?;
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read media body: {}", e);
            ApiError::Network(e.to_string())
        })?;
        Ok(bytes.to_vec())
    }

    /// Read `len` bytes of a media asset starting at `start`.
    ///
    /// Asks for a byte range. Servers that ignore it send the whole body,
    /// which is streamed and cut without being held in memory. Fewer bytes
    /// come back when the asset ends early.
    pub async fn fetch_range(&self, url: &str, start: u64, len: u64) -> ApiResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let range = format!("bytes={}-{}", start, start + len - 1);
        let mut response = self
            .send(self.client.get(url).header(RANGE, range), "downloading media range")
            .await?;

        let mut skip = if response.status() == StatusCode::PARTIAL_CONTENT {
            0
        } else {
            debug!("{} ignored the range request, streaming from the start", url);
            start
        };
        let mut out = Vec::new();
        while (out.len() as u64) < len {
            let chunk = response.chunk().await.map_err(|e| {
                tracing::error!("Failed to read media body: {}", e);
                ApiError::Network(e.to_string())
            })?;
            let Some(chunk) = chunk else {
                break;
            };
            let mut chunk: &[u8] = &chunk;
            if skip > 0 {
                let n = skip.min(chunk.len() as u64) as usize;
                skip -= n as u64;
                chunk = &chunk[n..];
            }
            let take = (len - out.len() as u64).min(chunk.len() as u64) as usize;
            out.extend_from_slice(&chunk[..take]);
        }
        Ok(out)
    }
}
