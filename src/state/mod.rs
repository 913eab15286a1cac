use leptos::prelude::*;

use crate::list::ListEntry;
use crate::models::{Identity, ViewState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    /// Distinguishes repeated messages so each gets its own timeout.
    pub id: u64,
    pub message: String,
}

/// Reactive state the views render from. The controller is the only writer.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub view: RwSignal<ViewState>,
    /// False until the identity provider has reported once.
    pub session_ready: RwSignal<bool>,
    pub identity: RwSignal<Option<Identity>>,

    pub entries: RwSignal<Vec<ListEntry>>,

    pub editor_title: RwSignal<String>,
    /// Markup of the note last opened; the surface owns edits after that.
    pub editor_content: RwSignal<String>,
    /// Bumped on every open so the surface reloads even for identical content.
    pub editor_revision: RwSignal<u64>,

    pub toast: RwSignal<Option<Toast>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: RwSignal::new(ViewState::Login),
            session_ready: RwSignal::new(false),
            identity: RwSignal::new(None),
            entries: RwSignal::new(vec![]),
            editor_title: RwSignal::new(String::new()),
            editor_content: RwSignal::new(String::new()),
            editor_revision: RwSignal::new(0),
            toast: RwSignal::new(None),
        }
    }

    pub fn show_toast(&self, message: impl Into<String>) {
        let id = self
            .toast
            .with_untracked(|t| t.as_ref().map(|t| t.id + 1).unwrap_or(1));
        self.toast.set(Some(Toast {
            id,
            message: message.into(),
        }));
    }

    pub fn clear_editor(&self) {
        self.editor_title.set(String::new());
        self.editor_content.set(String::new());
        self.editor_revision.update(|r| *r += 1);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
