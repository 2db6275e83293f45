//! Channel-based IPC between async operations and the UI thread.

use std::sync::mpsc::{channel, Receiver, Sender};

use signage_types::api::User;
use signage_types::{ContentId, Template, TemplateTree};

use crate::editor::CommitId;

/// Messages sent from async operations to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Template tree (re)loaded
    TemplateLoaded(TemplateTree),
    /// Template could not be loaded
    TemplateLoadError(String),

    /// Style write for a content finished
    StyleCommitted {
        content_id: ContentId,
        commit: CommitId,
        result: Result<(), String>,
    },

    /// A mutation finished; the tree is reloaded next
    OperationDone(String),
    /// A mutation failed
    OperationFailed(String),

    /// Users for the save-as dialog
    UsersLoaded(Vec<User>),
    /// Template copied via save-as
    TemplateSaved(Template),

    /// Decoded image for the texture cache
    ImageLoaded {
        url: String,
        image: Result<egui::ColorImage, String>,
    },
}

impl AppMessage {
    /// Whether the template tree is reloaded after handling this message.
    ///
    /// Every settled mutation reloads, failed ones included, so local state
    /// never drifts from what the server holds.
    pub fn triggers_reload(&self) -> bool {
        matches!(
            self,
            AppMessage::StyleCommitted { .. }
                | AppMessage::OperationDone(_)
                | AppMessage::OperationFailed(_)
        )
    }
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_style_commit_reloads_like_other_mutations() {
        let failed = AppMessage::StyleCommitted {
            content_id: "c1".into(),
            commit: CommitId::default(),
            result: Err("HTTP 500 error: boom".into()),
        };
        let saved = AppMessage::StyleCommitted {
            content_id: "c1".into(),
            commit: CommitId::default(),
            result: Ok(()),
        };
        assert!(failed.triggers_reload());
        assert!(saved.triggers_reload());
        assert!(AppMessage::OperationFailed("boom".into()).triggers_reload());
        assert!(!AppMessage::UsersLoaded(Vec::new()).triggers_reload());
        assert!(!AppMessage::TemplateLoadError("gone".into()).triggers_reload());
    }
}
