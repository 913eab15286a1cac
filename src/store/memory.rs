use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;

use super::{
    CollectionPath, Document, DocumentPath, DocumentStore, Fields, OrderBy, StoreError,
    StoreResult,
};

/// Pending exactly once, so concurrent callers get to run in between.
#[derive(Default)]
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// In-memory store for tests. Writes can be made to fail on demand, and
/// chosen calls can be made to yield before answering.
#[derive(Default)]
pub(crate) struct MemoryStore {
    collections: RefCell<BTreeMap<CollectionPath, BTreeMap<String, Fields>>>,
    next_id: Cell<u64>,
    fail_writes: Cell<bool>,
    writes: RefCell<Vec<(DocumentPath, Fields)>>,
    slow_reads: RefCell<BTreeSet<String>>,
    slow_writes: Cell<bool>,
}

impl MemoryStore {
    /// `get` of document `id` yields once before answering.
    pub fn slow_read(&self, id: &str) {
        self.slow_reads.borrow_mut().insert(id.to_string());
    }

    /// Every `set_merge` yields once before applying.
    pub fn slow_writes(&self, slow: bool) {
        self.slow_writes.set(slow);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Every `set_merge` payload, in arrival order.
    pub fn writes(&self) -> Vec<(DocumentPath, Fields)> {
        self.writes.borrow().clone()
    }

    pub fn insert(&self, path: &DocumentPath, fields: Fields) {
        self.collections
            .borrow_mut()
            .entry(path.collection.clone())
            .or_default()
            .insert(path.id.clone(), fields);
    }

    pub fn fields(&self, path: &DocumentPath) -> Option<Fields> {
        self.collections
            .borrow()
            .get(&path.collection)
            .and_then(|docs| docs.get(&path.id))
            .cloned()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Network("offline".to_string()));
        }
        Ok(())
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> StoreResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .collections
            .borrow()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by(|a, b| {
            let ord = compare(a.fields.get(&order.field), b.fields.get(&order.field));
            if order.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        Ok(docs)
    }

    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let slow = self.slow_reads.borrow().contains(&path.id);
        if slow {
            YieldOnce::default().await;
        }
        Ok(self.fields(path).map(|fields| Document {
            id: path.id.clone(),
            fields,
        }))
    }

    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String> {
        self.check_writable()?;
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let id = format!("doc{n}");
        self.insert(&collection.doc(&id), fields);
        Ok(id)
    }

    async fn set_merge(&self, path: &DocumentPath, fields: Fields) -> StoreResult<()> {
        if self.slow_writes.get() {
            YieldOnce::default().await;
        }
        self.check_writable()?;
        self.writes.borrow_mut().push((path.clone(), fields.clone()));
        let mut collections = self.collections.borrow_mut();
        let doc = collections
            .entry(path.collection.clone())
            .or_default()
            .entry(path.id.clone())
            .or_default();
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> StoreResult<()> {
        self.check_writable()?;
        if let Some(docs) = self.collections.borrow_mut().get_mut(&path.collection) {
            docs.remove(&path.id);
        }
        Ok(())
    }
}
