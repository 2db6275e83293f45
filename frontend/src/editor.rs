//! Local editor state: the loaded template tree, selection and pending edits.
//!
//! Live edits are applied straight to the tree for immediate feedback. The
//! first live edit of a content records its last-known-good style. Each write
//! of that content carries its own [`CommitId`] and the style it sent, so
//! overlapping writes settle independently: a confirmed write becomes the new
//! last-known-good style, and a failed one restores it once no later write of
//! the same content is still in flight.

use std::collections::{HashMap, HashSet};

use signage_types::{
    BlockId, BlockWithContents, Content, ContentId, StyleConfig, StyleError, StylePatch,
    TemplateTree,
};
use tracing::{debug, warn};

use crate::layout::{self, BlockRect};

/// Identifies one style write handed out by [`EditorState::begin_commit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(u64);

#[derive(Debug)]
struct PendingStyle {
    /// Style the server is known to hold.
    confirmed: StyleConfig,
    /// Writes in flight, oldest first, with the style each one sent.
    in_flight: Vec<(CommitId, StyleConfig)>,
}

#[derive(Debug, Default)]
pub struct EditorState {
    tree: Option<TemplateTree>,
    /// Contents with live edits or writes that have not settled.
    pending: HashMap<ContentId, PendingStyle>,
    /// Writes overtaken by a later confirmed write whose reply is still due.
    superseded: HashSet<CommitId>,
    next_commit: u64,

    pub selected_block: Option<BlockId>,
    pub selected_content: Option<ContentId>,
    /// Blocks picked for a merge, in click order.
    pub merge_selection: Vec<BlockId>,
    pub tv_preview: bool,

    /// Template load failure, shown instead of the editor.
    pub load_error: Option<String>,
    /// Last failed mutation, shown inline.
    pub error: Option<String>,
    pub status: String,
    pub loading: bool,
}

impl EditorState {
    pub fn new(tv_preview: bool) -> Self {
        Self {
            tv_preview,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> Option<&TemplateTree> {
        self.tree.as_ref()
    }

    pub fn blocks(&self) -> &[BlockWithContents] {
        self.tree.as_ref().map(|t| t.blocks.as_slice()).unwrap_or(&[])
    }

    pub fn block_count(&self) -> usize {
        self.blocks().len()
    }

    /// Replace the tree after a (re)load.
    ///
    /// Pending snapshots are discarded: the server state is authoritative.
    /// Selections pointing at records that no longer exist are cleared.
    pub fn set_tree(&mut self, tree: TemplateTree) {
        if !self.pending.is_empty() {
            debug!("Dropping {} pending snapshots on reload", self.pending.len());
            self.pending.clear();
        }

        if let Some(id) = &self.selected_block {
            if tree.block(id).is_none() {
                self.selected_block = None;
            }
        }
        if let Some(id) = &self.selected_content {
            if tree.find_content(id).is_none() {
                self.selected_content = None;
            }
        }
        self.merge_selection.retain(|id| tree.block(id).is_some());

        self.tree = Some(tree);
        self.load_error = None;
        self.loading = false;
    }

    pub fn set_load_error(&mut self, message: String) {
        self.load_error = Some(message);
        self.loading = false;
    }

    /// Record a failed mutation.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Editor operation failed: {}", message);
        self.error = Some(message);
        self.loading = false;
    }

    pub fn content(&self, id: &ContentId) -> Option<&Content> {
        self.tree.as_ref()?.find_content(id)
    }

    pub fn style_of(&self, id: &ContentId) -> Option<&StyleConfig> {
        self.content(id).map(|c| &c.style_config)
    }

    /// Screen-independent rectangle of a block.
    pub fn block_rect(&self, block: &BlockWithContents) -> BlockRect {
        layout::block_rect(&block.block, self.block_count())
    }

    /// Apply a live patch, snapshotting the style first if needed.
    pub fn apply_live(&mut self, id: &ContentId, patch: &StylePatch) -> Result<(), StyleError> {
        let Some(content) = self.tree.as_mut().and_then(|t| t.find_content_mut(id)) else {
            return Ok(());
        };

        let mut updated = content.style_config.clone();
        updated.apply(patch)?;
        self.pending
            .entry(id.clone())
            .or_insert_with(|| PendingStyle {
                confirmed: content.style_config.clone(),
                in_flight: Vec::new(),
            });
        content.style_config = updated;
        Ok(())
    }

    pub fn has_pending(&self, id: &ContentId) -> bool {
        self.pending.contains_key(id)
    }

    /// Start writing the current style of a content.
    ///
    /// Returns the content to send and the id to settle the write with.
    pub fn begin_commit(&mut self, id: &ContentId) -> Option<(CommitId, Content)> {
        let content = self.tree.as_ref()?.find_content(id)?.clone();
        self.next_commit += 1;
        let commit = CommitId(self.next_commit);

        self.pending
            .entry(id.clone())
            .or_insert_with(|| PendingStyle {
                confirmed: content.style_config.clone(),
                in_flight: Vec::new(),
            })
            .in_flight
            .push((commit, content.style_config.clone()));
        Some((commit, content))
    }

    /// Settle a style write: confirm on success, revert and record the error
    /// on failure.
    ///
    /// A failure only restores the last-known-good style when no later write
    /// of the same content is still in flight, since that write carries the
    /// newer edits and decides the outcome.
    pub fn finish_commit(&mut self, id: &ContentId, commit: CommitId, result: Result<(), String>) {
        if self.superseded.remove(&commit) {
            debug!("Ignoring superseded write {:?} of content {}", commit, id);
            return;
        }
        let tracked = self.pending.get_mut(id).and_then(|pending| {
            let pos = pending.in_flight.iter().position(|(c, _)| *c == commit)?;
            Some((pending, pos))
        });
        let Some((pending, pos)) = tracked else {
            // Dropped by a reload; the server state is authoritative.
            if let Err(message) = result {
                self.fail(message);
            }
            return;
        };

        match result {
            Ok(()) => {
                let (_, sent) = pending.in_flight.remove(pos);
                // Earlier writes were overwritten by this one.
                self.superseded
                    .extend(pending.in_flight.drain(..pos).map(|(c, _)| c));
                pending.confirmed = sent;
            }
            Err(message) => {
                pending.in_flight.remove(pos);
                if pending.in_flight.is_empty() {
                    let snapshot = pending.confirmed.clone();
                    if let Some(content) = self.tree.as_mut().and_then(|t| t.find_content_mut(id)) {
                        debug!("Reverting style of content {}", id);
                        content.style_config = snapshot;
                    }
                }
                self.fail(message);
            }
        }
        self.settle(id);
    }

    /// Forget the snapshot once nothing is in flight and the tree matches it.
    fn settle(&mut self, id: &ContentId) {
        let current = self.tree.as_ref().and_then(|t| t.find_content(id)).map(|c| &c.style_config);
        let settled = self.pending.get(id).is_some_and(|p| {
            p.in_flight.is_empty() && current.map_or(true, |style| *style == p.confirmed)
        });
        if settled {
            self.pending.remove(id);
        }
    }

    pub fn select_block(&mut self, id: Option<BlockId>) {
        if self.selected_block != id {
            self.selected_content = None;
        }
        self.selected_block = id;
    }

    /// Add or remove a block from the merge selection.
    pub fn toggle_merge(&mut self, id: &BlockId) {
        if let Some(pos) = self.merge_selection.iter().position(|b| b == id) {
            self.merge_selection.remove(pos);
        } else {
            self.merge_selection.push(id.clone());
        }
    }

    pub fn can_merge(&self) -> bool {
        self.merge_selection.len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signage_types::{
        Block, BlockStyle, ContentType, RotationPhase, Template, TextLayer,
    };

    fn sample_tree() -> TemplateTree {
        let mut style = StyleConfig::default();
        style.text_layers.push(TextLayer {
            id: "t".into(),
            ..TextLayer::new("Latte")
        });
        let content = Content {
            id: "c1".into(),
            block_id: Some("b1".into()),
            content_type: ContentType::Image,
            title: None,
            price: None,
            description: None,
            image_url: Some("latte.jpg".into()),
            style_config: style,
        };
        let block = |id: &str, index: u32, contents: Vec<Content>| BlockWithContents {
            block: Block {
                id: id.into(),
                template_id: Some("tpl".into()),
                block_index: index,
                position_x: None,
                position_y: None,
                width: None,
                height: None,
                style_config: BlockStyle::default(),
            },
            contents,
        };
        TemplateTree::new(
            Template {
                id: "tpl".into(),
                display_name: "Menu".into(),
                description: None,
            },
            vec![block("b1", 0, vec![content]), block("b2", 1, Vec::new())],
        )
    }

    fn move_text(x: f64) -> StylePatch {
        StylePatch::TextPosition {
            phase: RotationPhase::First,
            layer_id: "t".into(),
            x,
            y: 10.0,
        }
    }

    #[test]
    fn test_failed_commit_reverts_to_snapshot() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        editor.apply_live(&id, &move_text(20.0)).unwrap();
        editor.apply_live(&id, &move_text(30.0)).unwrap();
        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 30.0);
        assert!(editor.has_pending(&id));

        let (commit, sent) = editor.begin_commit(&id).unwrap();
        assert_eq!(sent.style_config.text_layers[0].x, 30.0);
        editor.finish_commit(&id, commit, Err("HTTP 404 error: gone".into()));

        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 50.0);
        assert!(!editor.has_pending(&id));
        assert_eq!(editor.error.as_deref(), Some("HTTP 404 error: gone"));
    }

    #[test]
    fn test_confirmed_commit_keeps_edit() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        editor.apply_live(&id, &move_text(20.0)).unwrap();
        let (commit, _) = editor.begin_commit(&id).unwrap();
        editor.finish_commit(&id, commit, Ok(()));

        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 20.0);
        assert!(!editor.has_pending(&id));
        assert!(editor.error.is_none());
    }

    #[test]
    fn test_later_write_failing_reverts_to_earlier_confirmed_write() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        editor.apply_live(&id, &move_text(20.0)).unwrap();
        let (first, _) = editor.begin_commit(&id).unwrap();
        editor.apply_live(&id, &move_text(30.0)).unwrap();
        let (second, _) = editor.begin_commit(&id).unwrap();

        editor.finish_commit(&id, first, Ok(()));
        assert!(editor.has_pending(&id));
        editor.finish_commit(&id, second, Err("HTTP 500 error: boom".into()));

        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 20.0);
        assert!(!editor.has_pending(&id));
    }

    #[test]
    fn test_earlier_write_failing_waits_for_later_write() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        editor.apply_live(&id, &move_text(20.0)).unwrap();
        let (first, _) = editor.begin_commit(&id).unwrap();
        editor.apply_live(&id, &move_text(30.0)).unwrap();
        let (second, _) = editor.begin_commit(&id).unwrap();

        editor.finish_commit(&id, first, Err("timeout".into()));
        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 30.0);
        assert_eq!(editor.error.as_deref(), Some("timeout"));

        editor.finish_commit(&id, second, Ok(()));
        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 30.0);
        assert!(!editor.has_pending(&id));

        // Both failing falls back to the style from before either drag.
        editor.apply_live(&id, &move_text(40.0)).unwrap();
        let (third, _) = editor.begin_commit(&id).unwrap();
        editor.apply_live(&id, &move_text(60.0)).unwrap();
        let (fourth, _) = editor.begin_commit(&id).unwrap();
        editor.finish_commit(&id, third, Err("timeout".into()));
        editor.finish_commit(&id, fourth, Err("timeout".into()));
        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 30.0);
    }

    #[test]
    fn test_out_of_order_success_keeps_newest_style() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        editor.apply_live(&id, &move_text(20.0)).unwrap();
        let (first, _) = editor.begin_commit(&id).unwrap();
        editor.apply_live(&id, &move_text(30.0)).unwrap();
        let (second, _) = editor.begin_commit(&id).unwrap();

        editor.finish_commit(&id, second, Ok(()));
        editor.finish_commit(&id, first, Err("late failure".into()));

        assert_eq!(editor.style_of(&id).unwrap().text_layers[0].x, 30.0);
        assert!(!editor.has_pending(&id));
        assert!(editor.error.is_none());
    }

    #[test]
    fn test_invalid_live_patch_leaves_style_untouched() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        let id = ContentId::from("c1");

        let err = editor
            .apply_live(
                &id,
                &StylePatch::OverlaySize {
                    layer_id: "none".into(),
                    size: 20.0,
                },
            )
            .unwrap_err();
        assert_eq!(err, StyleError::OverlayNotFound("none".into()));
        assert!(!editor.has_pending(&id));
    }

    #[test]
    fn test_reload_prunes_stale_selection() {
        let mut editor = EditorState::new(false);
        editor.set_tree(sample_tree());
        editor.select_block(Some("b2".into()));
        editor.toggle_merge(&"b1".into());
        editor.toggle_merge(&"b2".into());
        assert!(editor.can_merge());

        let mut tree = sample_tree();
        tree.blocks.retain(|b| b.block.id.as_str() == "b1");
        editor.set_tree(tree);

        assert!(editor.selected_block.is_none());
        assert_eq!(editor.merge_selection, vec![BlockId::from("b1")]);
        assert!(!editor.can_merge());
    }
}
