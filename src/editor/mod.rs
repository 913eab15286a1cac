mod autosave;

pub(crate) use autosave::SaveQueue;

use crate::models::Note;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveRequest {
    /// Owner at the time of the edit.
    pub uid: String,
    pub note_id: String,
    pub title: String,
    pub content: String,
}

/// Title stored with a note: the title field if it has text, else the
/// first line of the surface's rendered text.
pub(crate) fn effective_title(title_field: &str, text: &str) -> String {
    let title = title_field.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    text.split('\n').next().unwrap_or_default().trim().to_string()
}

/// Tracks which note the editing surface belongs to.
#[derive(Debug, Default)]
pub(crate) struct EditorController {
    active: Option<String>,
}

impl EditorController {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn open(&mut self, note: &Note) {
        self.active = Some(note.id.clone());
    }

    /// No note is active while one is loading or after leaving the editor.
    pub fn close(&mut self) {
        self.active = None;
    }

    /// `content` is the surface markup, `text` its rendered text.
    pub fn save_request(
        &self,
        uid: &str,
        title_field: &str,
        content: &str,
        text: &str,
    ) -> Option<SaveRequest> {
        let note_id = self.active.clone()?;
        Some(SaveRequest {
            uid: uid.to_string(),
            note_id,
            title: effective_title(title_field, text),
            content: content.to_string(),
        })
    }
}
