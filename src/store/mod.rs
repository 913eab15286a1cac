//! Hierarchical document store contract.

mod firestore;
#[cfg(test)]
mod memory;
mod value;

pub(crate) use firestore::Firestore;
#[cfg(test)]
pub(crate) use memory::MemoryStore;

use std::fmt;

use thiserror::Error;

use crate::identity::AuthError;

pub(crate) type Fields = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not authorized")]
    Unauthorized,
    #[error("store returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Document {
    pub id: String,
    pub fields: Fields,
}

/// `a/b/c`: an odd number of segments naming a collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CollectionPath(Vec<String>);

/// A collection path plus a document id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DocumentPath {
    pub collection: CollectionPath,
    pub id: String,
}

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl DocumentPath {
    /// Nested collection under this document.
    pub fn collection(&self, name: &str) -> CollectionPath {
        let mut segments = self.collection.0.clone();
        segments.push(self.id.clone());
        segments.push(name.to_string());
        CollectionPath(segments)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

#[allow(async_fn_in_trait)]
pub(crate) trait DocumentStore {
    async fn query(&self, collection: &CollectionPath, order: &OrderBy)
        -> StoreResult<Vec<Document>>;
    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;
    /// Create a document with a store-assigned id.
    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String>;
    /// Write `fields`, leaving any others on the document untouched.
    async fn set_merge(&self, path: &DocumentPath, fields: Fields) -> StoreResult<()>;
    async fn delete(&self, path: &DocumentPath) -> StoreResult<()>;
}
