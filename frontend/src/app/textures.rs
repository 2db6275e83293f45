//! Texture cache for images shown on the canvas.

use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use egui::{ColorImage, Context, TextureHandle, TextureOptions};

use crate::api::SignageBackend;
use crate::state::AppMessage;

use super::spawn_task;

/// Longest side of a decoded texture, in pixels.
const MAX_TEXTURE_SIDE: u32 = 1920;

enum Slot {
    Loading,
    Ready(TextureHandle),
    Failed,
}

pub(super) struct TextureCache {
    api: Arc<dyn SignageBackend>,
    tx: Sender<AppMessage>,
    slots: HashMap<String, Slot>,
}

impl TextureCache {
    pub(super) fn new(api: Arc<dyn SignageBackend>, tx: Sender<AppMessage>) -> Self {
        Self {
            api,
            tx,
            slots: HashMap::new(),
        }
    }

    /// Texture for `url`, starting a download on first request.
    pub(super) fn get(&mut self, ctx: &Context, url: &str) -> Option<TextureHandle> {
        match self.slots.get(url) {
            Some(Slot::Ready(texture)) => return Some(texture.clone()),
            Some(Slot::Loading | Slot::Failed) => return None,
            None => {}
        }
        self.slots.insert(url.to_string(), Slot::Loading);

        let api = self.api.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let url = url.to_string();

        spawn_task(async move {
            let image = match api.fetch_bytes(&url).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_image(&bytes))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|decoded| decoded),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(AppMessage::ImageLoaded { url, image });
            ctx.request_repaint();
        });
        None
    }

    pub(super) fn finish(
        &mut self,
        ctx: &Context,
        url: String,
        image: Result<ColorImage, String>,
    ) {
        let slot = match image {
            Ok(image) => Slot::Ready(ctx.load_texture(&url, image, TextureOptions::LINEAR)),
            Err(e) => {
                tracing::warn!("Failed to load image {}: {}", url, e);
                Slot::Failed
            }
        };
        self.slots.insert(url, slot);
    }
}

/// Decode an image, downscaling it to at most `MAX_TEXTURE_SIDE`.
fn decode_image(bytes: &[u8]) -> Result<ColorImage, String> {
    let mut img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    if img.width() > MAX_TEXTURE_SIDE || img.height() > MAX_TEXTURE_SIDE {
        img = img.thumbnail(MAX_TEXTURE_SIDE, MAX_TEXTURE_SIDE);
    }
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
