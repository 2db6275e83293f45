use std::future::Future;

use egui::Context;
use signage_types::api::SaveAsRequest;
use signage_types::{BlockId, ContentId, ContentType, StyleEdit};

use crate::api::ApiResult;
use crate::ops;
use crate::state::AppMessage;

use super::*;

impl SignageApp {
    /// Load the template tree from the backend.
    pub(super) fn load_template(&mut self, ctx: &Context) {
        let Some(id) = self.template_id.clone() else {
            return;
        };
        tracing::info!("Loading template {}...", id);
        self.editor.loading = true;

        let api = self.api.clone();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            match ops::load_template_tree(api.as_ref(), &id).await {
                Ok(tree) => {
                    let _ = tx.send(AppMessage::TemplateLoaded(tree));
                }
                Err(e) => {
                    tracing::error!("Failed to load template {}: {}", id, e);
                    let _ = tx.send(AppMessage::TemplateLoadError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Run a mutation and reload the tree when it finishes.
    pub(super) fn run_operation<F>(&mut self, ctx: &Context, label: &str, operation: F)
    where
        F: Future<Output = ApiResult<()>> + Send + 'static,
    {
        tracing::info!("{}...", label);
        self.editor.loading = true;
        self.editor.status = format!("{}...", label);

        let label = label.to_string();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            match operation.await {
                Ok(()) => {
                    let _ = tx.send(AppMessage::OperationDone(format!("{}: done", label)));
                }
                Err(e) => {
                    tracing::error!("{} failed: {}", label, e);
                    let _ = tx.send(AppMessage::OperationFailed(format!("{}: {}", label, e)));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Persist the live-edited style of a content after a drag session.
    pub(super) fn commit_style(&mut self, ctx: &Context, content_id: ContentId) {
        let Some((commit, content)) = self.editor.begin_commit(&content_id) else {
            return;
        };

        let api = self.api.clone();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            let result = ops::persist_style(api.as_ref(), &content)
                .await
                .map_err(|e| e.to_string());
            if let Err(e) = &result {
                tracing::error!("Failed to save style of content {}: {}", content.id, e);
            }
            let _ = tx.send(AppMessage::StyleCommitted {
                content_id: content.id,
                commit,
                result,
            });
            ctx.request_repaint();
        });
    }

    /// Apply and persist a structural style edit.
    pub(super) fn edit_style(&mut self, ctx: &Context, content_id: &ContentId, edit: StyleEdit) {
        let Some(content) = self.editor.content(content_id).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Updating style", async move {
            ops::edit_style(api.as_ref(), &content, &edit).await.map(|_| ())
        });
    }

    pub(super) fn add_block(&mut self, ctx: &Context) {
        let Some(tree) = self.editor.tree().cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Adding block", async move {
            ops::add_block(api.as_ref(), &tree).await.map(|_| ())
        });
    }

    pub(super) fn delete_block(&mut self, ctx: &Context, block_id: BlockId) {
        let Some(tree) = self.editor.tree().cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Deleting block", async move {
            ops::delete_block(api.as_ref(), &tree, &block_id).await
        });
    }

    pub(super) fn merge_selected(&mut self, ctx: &Context) {
        let Some(tree) = self.editor.tree().cloned() else {
            return;
        };
        let selected = std::mem::take(&mut self.editor.merge_selection);
        let api = self.api.clone();
        self.run_operation(ctx, "Merging blocks", async move {
            ops::merge_blocks(api.as_ref(), &tree, &selected)
                .await
                .map(|_| ())
        });
    }

    pub(super) fn set_visual(&mut self, ctx: &Context, block_id: &BlockId, kind: ContentType, url: String) {
        let Some(block) = self.editor.tree().and_then(|t| t.block(block_id)).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Setting media", async move {
            ops::set_visual(api.as_ref(), &block, kind, url).await.map(|_| ())
        });
    }

    /// Upload a local file and use it as the block's visual.
    pub(super) fn upload_visual(&mut self, ctx: &Context, block_id: &BlockId, path: String) {
        let Some(block) = self.editor.tree().and_then(|t| t.block(block_id)).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Uploading media", async move {
            let path = std::path::PathBuf::from(path);
            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| crate::api::ApiError::Invalid(format!("{}: {}", path.display(), e)))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            ops::upload_visual(api.as_ref(), &block, &filename, data)
                .await
                .map(|_| ())
        });
    }

    pub(super) fn add_content(&mut self, ctx: &Context, block_id: &BlockId, kind: ContentType) {
        let req = signage_types::api::CreateContentRequest::new(block_id.clone(), kind);
        let api = self.api.clone();
        self.run_operation(ctx, "Adding content", async move {
            ops::add_content(api.as_ref(), req).await.map(|_| ())
        });
    }

    pub(super) fn delete_content(&mut self, ctx: &Context, content_id: ContentId) {
        let api = self.api.clone();
        self.run_operation(ctx, "Deleting content", async move {
            ops::delete_content(api.as_ref(), &content_id).await
        });
    }

    pub(super) fn add_rotation_item(
        &mut self,
        ctx: &Context,
        content_id: &ContentId,
        kind: signage_types::RotationKind,
        url: String,
    ) {
        let Some(content) = self.editor.content(content_id).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Adding rotation item", async move {
            ops::add_rotation_item(api.as_ref(), &content, kind, url)
                .await
                .map(|_| ())
        });
    }

    pub(super) fn update_block_background(
        &mut self,
        ctx: &Context,
        block_id: &BlockId,
        style: signage_types::BlockStyle,
    ) {
        let api = self.api.clone();
        let block_id = block_id.clone();
        self.run_operation(ctx, "Updating background", async move {
            ops::update_block_background(api.as_ref(), &block_id, style).await
        });
    }

    pub(super) fn update_template_metadata(
        &mut self,
        ctx: &Context,
        display_name: String,
        description: Option<String>,
    ) {
        let Some(id) = self.template_id.clone() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Saving template details", async move {
            ops::update_template_metadata(api.as_ref(), &id, display_name, description).await
        });
    }

    pub(super) fn sync_library(&mut self, ctx: &Context, content_id: &ContentId) {
        let Some(content) = self.editor.content(content_id).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Saving to library", async move {
            ops::sync_library(api.as_ref(), &content).await.map(|_| ())
        });
    }

    pub(super) fn remove_background(&mut self, ctx: &Context, content_id: &ContentId) {
        let Some(content) = self.editor.content(content_id).cloned() else {
            return;
        };
        let api = self.api.clone();
        self.run_operation(ctx, "Removing background", async move {
            ops::remove_content_background(api.as_ref(), &content)
                .await
                .map(|_| ())
        });
    }

    /// Load users for the save-as dialog.
    pub(super) fn load_users(&mut self, ctx: &Context) {
        let api = self.api.clone();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            match api.list_users().await {
                Ok(users) => {
                    tracing::info!("Loaded {} users", users.len());
                    let _ = tx.send(AppMessage::UsersLoaded(users));
                }
                Err(e) => {
                    // Save-as still works for the current user.
                    tracing::warn!("Failed to load users: {}", e);
                }
            }
            ctx.request_repaint();
        });
    }

    pub(super) fn save_as(&mut self, ctx: &Context, req: SaveAsRequest) {
        let Some(id) = self.template_id.clone() else {
            return;
        };
        self.editor.loading = true;
        self.editor.status = "Saving copy...".to_string();

        let api = self.api.clone();
        let tx = self.channels.sender();
        let ctx = ctx.clone();

        spawn_task(async move {
            match ops::save_as(api.as_ref(), &id, req).await {
                Ok(template) => {
                    let _ = tx.send(AppMessage::TemplateSaved(template));
                }
                Err(e) => {
                    tracing::error!("Save as failed: {}", e);
                    let _ = tx.send(AppMessage::OperationFailed(format!("Save as: {}", e)));
                }
            }
            ctx.request_repaint();
        });
    }
}
