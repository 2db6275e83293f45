//! In-memory backend for operation tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use signage_types::api::{
    CreateBlockRequest, CreateContentRequest, LibraryItem, LibraryItemRequest, SaveAsRequest,
    UpdateBlockRequest, UpdateContentRequest, UpdateTemplateRequest, User,
};
use signage_types::{
    Block, BlockId, BlockStyle, Content, ContentId, ContentType, RecordId, StyleConfig, Template,
    TemplateId,
};

use crate::api::{ApiError, ApiResult, SignageBackend};

#[derive(Default)]
pub struct FakeState {
    pub templates: Vec<Template>,
    pub blocks: Vec<Block>,
    pub contents: Vec<Content>,
    pub library: Vec<LibraryItem>,
    pub users: Vec<User>,
    /// Downloadable files by URL.
    pub files: HashMap<String, Vec<u8>>,
    pub uploads: Vec<(String, Vec<u8>)>,
    /// Every ranged read as `(url, start, len)`.
    pub range_reads: Vec<(String, u64, u64)>,
    /// Error returned by the background removal endpoint.
    pub remove_background_error: Option<ApiError>,
    /// Content ids whose PATCH fails with 404.
    pub missing_contents: Vec<ContentId>,
    /// Every mutating call, e.g. `"DELETE /template-blocks/b2"`.
    pub calls: Vec<String>,
    next_id: u32,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> RecordId {
        self.next_id += 1;
        RecordId::new(format!("{}{}", prefix, self.next_id))
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub state: Mutex<FakeState>,
}

impl FakeBackend {
    /// A template with `blocks` auto-laid-out blocks, the first holding an image.
    pub fn with_blocks(blocks: u32) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock().unwrap();
            state.templates.push(Template {
                id: "tpl".into(),
                display_name: "Breakfast".into(),
                description: None,
            });
            for i in 0..blocks {
                state.blocks.push(Block {
                    id: format!("b{}", i).into(),
                    template_id: Some("tpl".into()),
                    block_index: i,
                    position_x: None,
                    position_y: None,
                    width: None,
                    height: None,
                    style_config: BlockStyle::default(),
                });
            }
            if blocks > 0 {
                state.contents.push(Content {
                    id: "c0".into(),
                    block_id: Some("b0".into()),
                    content_type: ContentType::Image,
                    title: Some("Pancakes".into()),
                    price: Some("7.50".into()),
                    description: None,
                    image_url: Some("https://cdn/pancakes.jpg".into()),
                    style_config: StyleConfig::default(),
                });
            }
        }
        backend
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn block(&self, id: &str) -> Option<Block> {
        let state = self.state.lock().unwrap();
        state.blocks.iter().find(|b| b.id.as_str() == id).cloned()
    }

    pub fn content(&self, id: &str) -> Option<Content> {
        let state = self.state.lock().unwrap();
        state.contents.iter().find(|c| c.id.as_str() == id).cloned()
    }
}

fn not_found(what: &str, id: &RecordId) -> ApiError {
    ApiError::Http(404, format!("{} {} not found", what, id))
}

#[async_trait]
impl SignageBackend for FakeBackend {
    async fn get_template(&self, id: &TemplateId) -> ApiResult<Template> {
        let state = self.state.lock().unwrap();
        state
            .templates
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found("template", id))
    }

    async fn list_template_blocks(&self, id: &TemplateId) -> ApiResult<Vec<Block>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .blocks
            .iter()
            .filter(|b| b.template_id.as_ref() == Some(id))
            .cloned()
            .collect())
    }

    async fn update_template(
        &self,
        id: &TemplateId,
        req: &UpdateTemplateRequest,
    ) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("PATCH /templates/{}", id));
        let template = state
            .templates
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found("template", id))?;
        if let Some(name) = &req.display_name {
            template.display_name = name.clone();
        }
        if let Some(description) = &req.description {
            template.description = Some(description.clone());
        }
        Ok(())
    }

    async fn save_template_as(&self, id: &TemplateId, req: &SaveAsRequest) -> ApiResult<Template> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("POST /templates/{}/save-as", id));
        let source = state
            .templates
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found("template", id))?;
        let copy = Template {
            id: state.next_id("tpl"),
            display_name: req
                .display_name
                .clone()
                .unwrap_or_else(|| format!("{} (copy)", source.display_name)),
            description: source.description,
        };
        state.templates.push(copy.clone());
        Ok(copy)
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn create_block(&self, req: &CreateBlockRequest) -> ApiResult<Block> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("POST /template-blocks".to_string());
        let block = Block {
            id: state.next_id("b"),
            template_id: Some(req.template_id.clone()),
            block_index: req.block_index,
            position_x: req.position_x,
            position_y: req.position_y,
            width: req.width,
            height: req.height,
            style_config: req.style_config.clone(),
        };
        state.blocks.push(block.clone());
        Ok(block)
    }

    async fn update_block(&self, id: &BlockId, req: &UpdateBlockRequest) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("PATCH /template-blocks/{}", id));
        let block = state
            .blocks
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| not_found("block", id))?;
        if let Some(index) = req.block_index {
            block.block_index = index;
        }
        block.position_x = req.position_x.or(block.position_x);
        block.position_y = req.position_y.or(block.position_y);
        block.width = req.width.or(block.width);
        block.height = req.height.or(block.height);
        if let Some(style) = &req.style_config {
            block.style_config = style.clone();
        }
        Ok(())
    }

    async fn delete_block(&self, id: &BlockId) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("DELETE /template-blocks/{}", id));
        let before = state.blocks.len();
        state.blocks.retain(|b| &b.id != id);
        if state.blocks.len() == before {
            return Err(not_found("block", id));
        }
        Ok(())
    }

    async fn list_block_contents(&self, block_id: &BlockId) -> ApiResult<Vec<Content>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contents
            .iter()
            .filter(|c| c.block_id.as_ref() == Some(block_id))
            .cloned()
            .collect())
    }

    async fn create_content(&self, req: &CreateContentRequest) -> ApiResult<Content> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("POST /template-block-contents".to_string());
        let content = Content {
            id: state.next_id("c"),
            block_id: Some(req.block_id.clone()),
            content_type: req.content_type,
            title: req.title.clone(),
            price: req.price.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
            style_config: req.style_config.clone(),
        };
        state.contents.push(content.clone());
        Ok(content)
    }

    async fn update_content(&self, id: &ContentId, req: &UpdateContentRequest) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("PATCH /template-block-contents/{}", id));
        if state.missing_contents.contains(id) {
            return Err(not_found("content", id));
        }
        let content = state
            .contents
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| not_found("content", id))?;
        if let Some(content_type) = req.content_type {
            content.content_type = content_type;
        }
        if let Some(title) = &req.title {
            content.title = Some(title.clone());
        }
        if let Some(price) = &req.price {
            content.price = Some(price.clone());
        }
        if let Some(description) = &req.description {
            content.description = Some(description.clone());
        }
        if let Some(url) = &req.image_url {
            content.image_url = Some(url.clone());
        }
        if let Some(style) = &req.style_config {
            content.style_config = style.clone();
        }
        Ok(())
    }

    async fn delete_content(&self, id: &ContentId) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("DELETE /template-block-contents/{}", id));
        state.contents.retain(|c| &c.id != id);
        Ok(())
    }

    async fn list_library(&self) -> ApiResult<Vec<LibraryItem>> {
        Ok(self.state.lock().unwrap().library.clone())
    }

    async fn create_library_item(&self, req: &LibraryItemRequest) -> ApiResult<LibraryItem> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("POST /content-library".to_string());
        let item = LibraryItem {
            id: state.next_id("lib"),
            title: req.title.clone(),
            price: req.price.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
            content_type: req.content_type,
        };
        state.library.push(item.clone());
        Ok(item)
    }

    async fn update_library_item(
        &self,
        id: &RecordId,
        req: &LibraryItemRequest,
    ) -> ApiResult<LibraryItem> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("PATCH /content-library/{}", id));
        let item = state
            .library
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| not_found("library item", id))?;
        item.title = req.title.clone().or(item.title.take());
        item.price = req.price.clone().or(item.price.take());
        item.description = req.description.clone().or(item.description.take());
        Ok(item.clone())
    }

    async fn upload_file(&self, filename: &str, data: Vec<u8>, _mime: &str) -> ApiResult<String> {
        let mut state = self.state.lock().unwrap();
        let url = format!("https://cdn/uploads/{}", filename);
        state.calls.push(format!("UPLOAD {}", filename));
        state.uploads.push((filename.to_string(), data.clone()));
        state.files.insert(url.clone(), data);
        Ok(url)
    }

    async fn remove_background(&self, image_url: &str) -> ApiResult<String> {
        let state = self.state.lock().unwrap();
        match &state.remove_background_error {
            Some(e) => Err(e.clone()),
            None => Ok(format!("{}?nobg", image_url)),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> ApiResult<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(url)
            .cloned()
            .ok_or_else(|| ApiError::Http(404, url.to_string()))
    }

    async fn fetch_range(&self, url: &str, start: u64, len: u64) -> ApiResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.range_reads.push((url.to_string(), start, len));
        let file = state
            .files
            .get(url)
            .ok_or_else(|| ApiError::Http(404, url.to_string()))?;
        let start = (start as usize).min(file.len());
        let end = start.saturating_add(len as usize).min(file.len());
        Ok(file[start..end].to_vec())
    }
}
