//! Signage template editor.
//!
//! The layout engine and the drag controller are usable without a window;
//! `run_native` wires them into the egui editor.

#![warn(clippy::all, rust_2018_idioms)]

pub mod api;
mod app;
mod background;
pub mod config;
pub mod editor;
pub mod interaction;
pub mod layout;
mod media;
pub mod ops;
mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use app::SignageApp;
pub use config::Config;

use api::{ApiClient, SignageBackend};

/// Open the editor window. Blocks until the window is closed.
///
/// Must be called inside a tokio runtime context; background requests are
/// spawned onto it.
pub fn run_native(config: Config) -> anyhow::Result<()> {
    tracing::info!("Connecting to signage backend at {}", config.api_url);

    let api: Arc<dyn SignageBackend> = Arc::new(
        ApiClient::new_with_auth(config.api_url.clone(), config.auth_token.clone())
            .with_upload_url(config.upload_url.clone()),
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Signage Template Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Signage Template Editor",
        native_options,
        Box::new(move |cc| Ok(Box::new(SignageApp::new(cc, api, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("editor window failed: {}", e))
}
