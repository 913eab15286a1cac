use crate::models::Note;
use crate::util::format_timestamp;

pub(crate) const UNTITLED: &str = "Untitled";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListEntry {
    pub id: String,
    pub title: String,
    pub updated_label: String,
}

impl From<&Note> for ListEntry {
    fn from(note: &Note) -> Self {
        let title = if note.title.is_empty() {
            UNTITLED.to_string()
        } else {
            note.title.clone()
        };
        Self {
            id: note.id.clone(),
            title,
            updated_label: format_timestamp(note.updated_at),
        }
    }
}

/// One entry per note, in the order given.
pub(crate) fn render_entries(notes: &[Note]) -> Vec<ListEntry> {
    notes.iter().map(ListEntry::from).collect()
}

/// Drop a deleted note from the rendered list. Returns whether it was present.
pub(crate) fn remove_entry(entries: &mut Vec<ListEntry>, id: &str) -> bool {
    let before = entries.len();
    entries.retain(|e| e.id != id);
    entries.len() != before
}
