//! Editor operations against the backend.
//!
//! Every operation is a short sequence of requests. The UI runs them on the
//! tokio runtime and reloads the template tree once they finish.

use signage_types::api::{
    CreateBlockRequest, CreateContentRequest, LibraryItem, LibraryItemRequest, SaveAsRequest,
    UpdateBlockRequest, UpdateContentRequest, UpdateTemplateRequest,
};
use signage_types::{
    Block, BlockId, BlockStyle, BlockWithContents, Content, ContentId, ContentType,
    RotationItem, RotationKind, StyleConfig, StyleEdit, Template, TemplateId, TemplateTree,
};
use tracing::info;

use crate::api::{validate_style, ApiError, ApiResult, SignageBackend};
use crate::background;
use crate::layout::{self, MergePlan};
use crate::media;

/// Seconds an image rotation item stays on screen by default.
pub const DEFAULT_IMAGE_DURATION: f64 = 10.0;

/// Fetch a template with all blocks and their contents.
pub async fn load_template_tree<B>(backend: &B, id: &TemplateId) -> ApiResult<TemplateTree>
where
    B: SignageBackend + ?Sized,
{
    let template = backend.get_template(id).await?;
    let blocks = backend.list_template_blocks(id).await?;

    let mut loaded = Vec::with_capacity(blocks.len());
    for block in blocks {
        let contents = backend.list_block_contents(&block.id).await?;
        loaded.push(BlockWithContents { block, contents });
    }

    info!(
        "Loaded template '{}' with {} blocks",
        template.display_name,
        loaded.len()
    );
    Ok(TemplateTree::new(template, loaded))
}

/// Write a content's current style.
pub async fn persist_style<B>(backend: &B, content: &Content) -> ApiResult<()>
where
    B: SignageBackend + ?Sized,
{
    let req = UpdateContentRequest {
        content_type: Some(content.content_type),
        ..UpdateContentRequest::style(content.style_config.clone())
    };
    backend.update_content(&content.id, &req).await
}

/// Apply a structural style edit and persist it. Returns the new style.
pub async fn edit_style<B>(backend: &B, content: &Content, edit: &StyleEdit) -> ApiResult<StyleConfig>
where
    B: SignageBackend + ?Sized,
{
    let mut updated = content.clone();
    updated
        .style_config
        .edit(edit)
        .map_err(|e| ApiError::Invalid(e.to_string()))?;
    validate_style(&updated.style_config, Some(updated.content_type))?;
    persist_style(backend, &updated).await?;
    Ok(updated.style_config)
}

pub async fn update_block_background<B>(
    backend: &B,
    block_id: &BlockId,
    style: BlockStyle,
) -> ApiResult<()>
where
    B: SignageBackend + ?Sized,
{
    let req = UpdateBlockRequest {
        style_config: Some(style),
        ..UpdateBlockRequest::default()
    };
    backend.update_block(block_id, &req).await
}

pub async fn update_template_metadata<B>(
    backend: &B,
    id: &TemplateId,
    display_name: String,
    description: Option<String>,
) -> ApiResult<()>
where
    B: SignageBackend + ?Sized,
{
    let display_name = display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(ApiError::Invalid("template name cannot be empty".to_string()));
    }
    let req = UpdateTemplateRequest {
        display_name: Some(display_name),
        description: description.filter(|d| !d.trim().is_empty()),
    };
    backend.update_template(id, &req).await
}

/// Append an auto-laid-out block to the template.
pub async fn add_block<B>(backend: &B, tree: &TemplateTree) -> ApiResult<Block>
where
    B: SignageBackend + ?Sized,
{
    let block_index = tree
        .blocks
        .iter()
        .map(|b| b.block.block_index + 1)
        .max()
        .unwrap_or(0);
    let req = CreateBlockRequest {
        template_id: tree.template.id.clone(),
        block_index,
        position_x: None,
        position_y: None,
        width: None,
        height: None,
        style_config: BlockStyle::default(),
    };
    backend.create_block(&req).await
}

/// Delete a block with its contents and close the gap in block indices.
pub async fn delete_block<B>(backend: &B, tree: &TemplateTree, block_id: &BlockId) -> ApiResult<()>
where
    B: SignageBackend + ?Sized,
{
    let block = tree
        .block(block_id)
        .ok_or_else(|| ApiError::Invalid(format!("block {} is not part of the template", block_id)))?;

    for content in &block.contents {
        backend.delete_content(&content.id).await?;
    }
    backend.delete_block(block_id).await?;

    let survivors = tree.blocks.iter().filter(|b| &b.block.id != block_id);
    for (index, b) in survivors.enumerate() {
        let index = index as u32;
        if b.block.block_index != index {
            let req = UpdateBlockRequest {
                block_index: Some(index),
                ..UpdateBlockRequest::default()
            };
            backend.update_block(&b.block.id, &req).await?;
        }
    }

    info!("Deleted block {}", block_id);
    Ok(())
}

/// Merge the selected blocks into the one with the lowest index.
pub async fn merge_blocks<B>(
    backend: &B,
    tree: &TemplateTree,
    selected: &[BlockId],
) -> ApiResult<MergePlan>
where
    B: SignageBackend + ?Sized,
{
    let plan = layout::plan_merge(&tree.blocks, selected)
        .ok_or_else(|| ApiError::Invalid("select at least two blocks to merge".to_string()))?;

    for id in &plan.delete {
        if let Some(block) = tree.block(id) {
            for content in &block.contents {
                backend.delete_content(&content.id).await?;
            }
        }
        backend.delete_block(id).await?;
    }

    for (id, index, rect) in &plan.reindex {
        let req = UpdateBlockRequest {
            block_index: Some(*index),
            ..UpdateBlockRequest::placement(rect.x, rect.y, rect.w, rect.h)
        };
        backend.update_block(id, &req).await?;
    }

    info!(
        "Merged {} blocks into {}",
        plan.delete.len() + 1,
        plan.keep
    );
    Ok(plan)
}

pub async fn add_content<B>(backend: &B, req: CreateContentRequest) -> ApiResult<Content>
where
    B: SignageBackend + ?Sized,
{
    backend.create_content(&req).await
}

pub async fn delete_content<B>(backend: &B, id: &ContentId) -> ApiResult<()>
where
    B: SignageBackend + ?Sized,
{
    backend.delete_content(id).await
}

/// Point the block's visual at a new image or video.
///
/// An existing visual content is updated in place; otherwise one is created.
pub async fn set_visual<B>(
    backend: &B,
    block: &BlockWithContents,
    content_type: ContentType,
    url: String,
) -> ApiResult<ContentId>
where
    B: SignageBackend + ?Sized,
{
    if !content_type.is_visual() {
        return Err(ApiError::Invalid(format!(
            "{} content cannot be a block visual",
            content_type
        )));
    }

    match block.visual() {
        Some(visual) => {
            let mut style = visual.style_config.clone();
            // A rotation of the other kind no longer matches the content.
            match content_type {
                ContentType::Video => style.image_rotation = None,
                _ => style.video_rotation = None,
            }
            let req = UpdateContentRequest {
                content_type: Some(content_type),
                image_url: Some(url),
                style_config: Some(style),
                ..UpdateContentRequest::default()
            };
            backend.update_content(&visual.id, &req).await?;
            Ok(visual.id.clone())
        }
        None => {
            let req = CreateContentRequest {
                image_url: Some(url),
                ..CreateContentRequest::new(block.block.id.clone(), content_type)
            };
            Ok(backend.create_content(&req).await?.id)
        }
    }
}

/// Upload a local file and use it as the block's visual.
pub async fn upload_visual<B>(
    backend: &B,
    block: &BlockWithContents,
    filename: &str,
    data: Vec<u8>,
) -> ApiResult<ContentId>
where
    B: SignageBackend + ?Sized,
{
    let (content_type, mime) = guess_media_type(filename)
        .ok_or_else(|| ApiError::Invalid(format!("unsupported file type: {}", filename)))?;
    let url = backend.upload_file(filename, data, mime).await?;
    set_visual(backend, block, content_type, url).await
}

/// Content type and MIME type from a file name.
pub fn guess_media_type(filename: &str) -> Option<(ContentType, &'static str)> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    Some(match ext.as_str() {
        "jpg" | "jpeg" => (ContentType::Image, "image/jpeg"),
        "png" => (ContentType::Image, "image/png"),
        "webp" => (ContentType::Image, "image/webp"),
        "gif" => (ContentType::Image, "image/gif"),
        "mp4" | "m4v" => (ContentType::Video, "video/mp4"),
        "mov" => (ContentType::Video, "video/quicktime"),
        "webm" => (ContentType::Video, "video/webm"),
        _ => return None,
    })
}

/// Append an item to the content's rotation.
///
/// Video items get the duration read from the clip (0 when unknown).
pub async fn add_rotation_item<B>(
    backend: &B,
    content: &Content,
    kind: RotationKind,
    url: String,
) -> ApiResult<StyleConfig>
where
    B: SignageBackend + ?Sized,
{
    let duration = match kind {
        RotationKind::Video => media::video_duration(backend, &url).await,
        RotationKind::Image => DEFAULT_IMAGE_DURATION,
    };
    let edit = StyleEdit::AddRotationItem {
        kind,
        item: RotationItem::new(url, duration),
    };
    edit_style(backend, content, &edit).await
}

pub async fn save_as<B>(backend: &B, id: &TemplateId, req: SaveAsRequest) -> ApiResult<Template>
where
    B: SignageBackend + ?Sized,
{
    let copy = backend.save_template_as(id, &req).await?;
    info!("Template {} copied to {}", id, copy.id);
    Ok(copy)
}

/// Create or update the library entry for a content's image.
pub async fn sync_library<B>(backend: &B, content: &Content) -> ApiResult<LibraryItem>
where
    B: SignageBackend + ?Sized,
{
    let image_url = content
        .image_url
        .clone()
        .ok_or_else(|| ApiError::Invalid("content has no media to add to the library".to_string()))?;

    let req = LibraryItemRequest {
        title: content.title.clone(),
        price: content.price.clone(),
        description: content.description.clone(),
        image_url: Some(image_url.clone()),
        content_type: Some(content.content_type),
    };

    let existing = backend
        .list_library()
        .await?
        .into_iter()
        .find(|item| item.image_url.as_deref() == Some(image_url.as_str()));

    match existing {
        Some(item) => backend.update_library_item(&item.id, &req).await,
        None => backend.create_library_item(&req).await,
    }
}

/// Replace a content's image with a background-free version.
pub async fn remove_content_background<B>(backend: &B, content: &Content) -> ApiResult<String>
where
    B: SignageBackend + ?Sized,
{
    let image_url = content
        .image_url
        .as_deref()
        .filter(|_| content.content_type == ContentType::Image)
        .ok_or_else(|| ApiError::Invalid("only image contents have a background".to_string()))?;

    let url = background::remove_background(backend, image_url).await?;
    let req = UpdateContentRequest {
        image_url: Some(url.clone()),
        ..UpdateContentRequest::default()
    };
    backend.update_content(&content.id, &req).await?;
    Ok(url)
}
