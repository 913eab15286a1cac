use serde::Deserialize;
use serde_json::{json, Value};

use super::value::{decode_document, encode_fields};
use super::{
    CollectionPath, Document, DocumentPath, DocumentStore, Fields, OrderBy, StoreError,
    StoreResult,
};
use crate::identity::FirebaseAuth;

const PAGE_SIZE: u32 = 300;

impl StoreError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    fn http(status: reqwest::StatusCode, body: &str) -> Self {
        if matches!(status.as_u16(), 401 | 403) {
            return Self::Unauthorized;
        }
        // Google APIs wrap errors as { "error": { "message": ... } }.
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        Self::Http {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    documents: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Firestore REST v1 documents API.
#[derive(Clone)]
pub(crate) struct Firestore {
    documents_url: String,
    auth: FirebaseAuth,
}

impl Firestore {
    pub fn new(base_url: &str, project_id: &str, auth: FirebaseAuth) -> Self {
        Self {
            documents_url: documents_url(base_url, project_id),
            auth,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> StoreResult<reqwest::Response> {
        let token = self.auth.id_token().await?;
        let res = req.bearer_auth(token).send().await.map_err(StoreError::network)?;
        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(StoreError::http(status, &body))
        }
    }
}

fn documents_url(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents",
        base_url.trim_end_matches('/'),
        urlencoding::encode(project_id)
    )
}

fn encode_segments(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn collection_url(root: &str, collection: &CollectionPath) -> String {
    format!("{root}/{}", encode_segments(collection.segments()))
}

fn document_url(root: &str, path: &DocumentPath) -> String {
    format!(
        "{}/{}",
        collection_url(root, &path.collection),
        urlencoding::encode(&path.id)
    )
}

fn query_url(root: &str, collection: &CollectionPath, order: &OrderBy, page: Option<&str>) -> String {
    let direction = if order.descending { "desc" } else { "asc" };
    let order_by = format!("{} {direction}", order.field);
    let mut url = format!(
        "{}?orderBy={}&pageSize={PAGE_SIZE}",
        collection_url(root, collection),
        urlencoding::encode(&order_by)
    );
    if let Some(token) = page {
        url.push_str("&pageToken=");
        url.push_str(&urlencoding::encode(token));
    }
    url
}

fn update_mask(fields: &Fields) -> String {
    fields
        .keys()
        .map(|k| format!("updateMask.fieldPaths={}", urlencoding::encode(k)))
        .collect::<Vec<_>>()
        .join("&")
}

impl DocumentStore for Firestore {
    async fn query(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> StoreResult<Vec<Document>> {
        let client = reqwest::Client::new();
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = query_url(&self.documents_url, collection, order, page_token.as_deref());
            let res = self.send(client.get(url)).await?;
            let page: ListPage = res.json().await.map_err(StoreError::parse)?;
            for raw in &page.documents {
                out.push(decode_document(raw)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(out)
    }

    async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let client = reqwest::Client::new();
        match self.send(client.get(document_url(&self.documents_url, path))).await {
            Ok(res) => {
                let raw: Value = res.json().await.map_err(StoreError::parse)?;
                decode_document(&raw).map(Some)
            }
            Err(StoreError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add(&self, collection: &CollectionPath, fields: Fields) -> StoreResult<String> {
        let client = reqwest::Client::new();
        let body = json!({ "fields": encode_fields(&fields) });
        let req = client
            .post(collection_url(&self.documents_url, collection))
            .json(&body);
        let raw: Value = self.send(req).await?.json().await.map_err(StoreError::parse)?;
        Ok(decode_document(&raw)?.id)
    }

    async fn set_merge(&self, path: &DocumentPath, fields: Fields) -> StoreResult<()> {
        let client = reqwest::Client::new();
        let url = format!(
            "{}?{}",
            document_url(&self.documents_url, path),
            update_mask(&fields)
        );
        let body = json!({ "fields": encode_fields(&fields) });
        self.send(client.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> StoreResult<()> {
        let client = reqwest::Client::new();
        self.send(client.delete(document_url(&self.documents_url, path)))
            .await?;
        Ok(())
    }
}
