use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Identity, Note};
use crate::store::{CollectionPath, Document, DocumentStore, Fields, OrderBy, StoreError};
use crate::util::now_ms;

const USERS_COLLECTION: &str = "users";
const NOTES_COLLECTION: &str = "memos";

const FIELD_TITLE: &str = "title";
const FIELD_CONTENT: &str = "content";
const FIELD_UPDATED: &str = "updated";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum RepositoryError {
    #[error("no signed-in user")]
    NoIdentity,
    #[error("note {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub(crate) type RepositoryResult<T> = Result<T, RepositoryError>;

fn note_from_document(doc: Document) -> Note {
    let text = |field: &str| {
        doc.fields
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let updated_at = match doc.fields.get(FIELD_UPDATED) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        _ => 0,
    };
    Note {
        title: text(FIELD_TITLE),
        content: text(FIELD_CONTENT),
        updated_at,
        id: doc.id,
    }
}

fn note_fields(title: &str, content: &str, updated_at: i64) -> Fields {
    let mut fields = Fields::new();
    fields.insert(FIELD_TITLE.to_string(), json!(title));
    fields.insert(FIELD_CONTENT.to_string(), json!(content));
    fields.insert(FIELD_UPDATED.to_string(), json!(updated_at));
    fields
}

/// Notes of one user, `users/{uid}/memos/{id}`.
pub(crate) struct NoteRepository<'a, S> {
    store: &'a S,
    owner: Option<&'a Identity>,
}

impl<'a, S: DocumentStore> NoteRepository<'a, S> {
    pub fn new(store: &'a S, owner: Option<&'a Identity>) -> Self {
        Self { store, owner }
    }

    fn notes(&self) -> RepositoryResult<CollectionPath> {
        let owner = self.owner.ok_or(RepositoryError::NoIdentity)?;
        Ok(CollectionPath::root(USERS_COLLECTION)
            .doc(&owner.uid)
            .collection(NOTES_COLLECTION))
    }

    /// Newest first.
    pub async fn list(&self) -> RepositoryResult<Vec<Note>> {
        let notes = self.notes()?;
        let docs = self
            .store
            .query(&notes, &OrderBy::desc(FIELD_UPDATED))
            .await?;
        Ok(docs.into_iter().map(note_from_document).collect())
    }

    pub async fn create(&self) -> RepositoryResult<Note> {
        let notes = self.notes()?;
        let updated_at = now_ms();
        let id = self
            .store
            .add(&notes, note_fields("", "", updated_at))
            .await?;
        Ok(Note {
            id,
            title: String::new(),
            content: String::new(),
            updated_at,
        })
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Note> {
        let notes = self.notes()?;
        self.store
            .get(&notes.doc(id))
            .await?
            .map(note_from_document)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Merge title, content and a fresh timestamp; other fields are kept.
    /// Returns the timestamp written.
    pub async fn save(&self, id: &str, title: &str, content: &str) -> RepositoryResult<i64> {
        let notes = self.notes()?;
        let updated_at = now_ms();
        self.store
            .set_merge(&notes.doc(id), note_fields(title, content, updated_at))
            .await?;
        Ok(updated_at)
    }

    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let notes = self.notes()?;
        self.store.delete(&notes.doc(id)).await?;
        Ok(())
    }
}
