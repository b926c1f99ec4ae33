//! Seal store backed by a hosted PostgREST-compatible data service.
//!
//! Rows live in one table with snake_case columns
//! (`id`, `seal_id`, `department`, `status`, `created_at`). The service assigns
//! `id` and `created_at`.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};

use super::{decode_rows, RawSealRow, SealStore};
use crate::errors::AppError;
use crate::models::{NewSeal, SealRecord, SealStatus};

/// Seal store speaking the PostgREST dialect over HTTPS.
#[derive(Clone)]
pub struct RestSealStore {
    client: Client,
    table_url: String,
}

impl RestSealStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(api_key)
            .map_err(|e| AppError::Config(format!("Invalid API key: {}", e)))?;
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| AppError::Config(format!("Invalid API key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
        })
    }

    fn by_id(&self, builder: RequestBuilder, id: &str) -> RequestBuilder {
        builder
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
    }
}

#[derive(Debug, Deserialize)]
struct WireRow {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    seal_id: String,
    department: String,
    status: String,
    created_at: String,
}

impl From<WireRow> for RawSealRow {
    fn from(row: WireRow) -> Self {
        RawSealRow {
            id: row.id,
            seal_id: row.seal_id,
            department: row.department,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    seal_id: &'a str,
    department: &'a str,
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
}

/// Hosted tables commonly use bigint identity ids; accept numbers or strings.
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unsupported id value: {}",
            other
        ))),
    }
}

/// Turn a non-2xx response into a store error carrying the service's message.
async fn ensure_success(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::error!("Remote store returned {}: {}", status, body);
    Err(AppError::Store(format!("Remote store returned {}: {}", status, body)))
}

/// Writes ask for the affected rows back; an empty array means no row matched.
async fn ensure_row_matched(resp: Response, id: &str) -> Result<(), AppError> {
    let rows: Vec<serde_json::Value> = ensure_success(resp).await?.json().await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(format!("Seal {} not found", id)));
    }
    Ok(())
}

#[async_trait]
impl SealStore for RestSealStore {
    async fn list_newest_first(&self) -> Result<Vec<SealRecord>, AppError> {
        let resp = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let rows: Vec<WireRow> = ensure_success(resp).await?.json().await?;
        Ok(decode_rows(rows.into_iter().map(RawSealRow::from).collect()))
    }

    async fn insert(&self, seal: &NewSeal) -> Result<(), AppError> {
        let body = [InsertRow {
            seal_id: &seal.seal_id,
            department: seal.department.as_str(),
            status: seal.status.as_str(),
        }];
        let resp = self.client.post(&self.table_url).json(&body).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: SealStatus) -> Result<(), AppError> {
        let resp = self
            .by_id(self.client.patch(&self.table_url), id)
            .json(&StatusPatch {
                status: status.as_str(),
            })
            .send()
            .await?;
        ensure_row_matched(resp, id).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let resp = self
            .by_id(self.client.delete(&self.table_url), id)
            .send()
            .await?;
        ensure_row_matched(resp, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Department;

    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    /// Minimal stand-in for a hosted PostgREST table.
    #[derive(Clone, Default)]
    struct FakeTable {
        rows: Arc<Mutex<Vec<Value>>>,
        next_id: Arc<Mutex<i64>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some("test-key")
            && headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer test-key")
    }

    fn id_filter(params: &HashMap<String, String>) -> Option<i64> {
        params
            .get("id")
            .and_then(|v| v.strip_prefix("eq."))
            .and_then(|v| v.parse().ok())
    }

    async fn select(
        State(table): State<FakeTable>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<Vec<Value>>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        assert_eq!(params.get("order").map(String::as_str), Some("created_at.desc"));
        let mut rows = table.rows.lock().await.clone();
        rows.reverse();
        Ok(Json(rows))
    }

    async fn insert(
        State(table): State<FakeTable>,
        headers: HeaderMap,
        Json(body): Json<Vec<Value>>,
    ) -> StatusCode {
        if !authorized(&headers) {
            return StatusCode::UNAUTHORIZED;
        }
        let mut next_id = table.next_id.lock().await;
        let mut rows = table.rows.lock().await;
        for mut row in body {
            *next_id += 1;
            row["id"] = json!(*next_id);
            row["created_at"] = json!(format!("2024-03-01T10:00:{:02}.000000+00:00", *next_id));
            rows.push(row);
        }
        StatusCode::CREATED
    }

    async fn patch(
        State(table): State<FakeTable>,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Vec<Value>> {
        let id = id_filter(&params);
        let mut rows = table.rows.lock().await;
        let mut matched = Vec::new();
        for row in rows.iter_mut() {
            if row["id"].as_i64() == id {
                row["status"] = body["status"].clone();
                matched.push(row.clone());
            }
        }
        Json(matched)
    }

    async fn remove(
        State(table): State<FakeTable>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<Value>> {
        let id = id_filter(&params);
        let mut rows = table.rows.lock().await;
        let (gone, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| row["id"].as_i64() == id);
        *rows = kept;
        Json(gone)
    }

    async fn spawn_fake() -> String {
        let app = Router::new()
            .route(
                "/rest/v1/seals",
                get(select).post(insert).patch(patch).delete(remove),
            )
            .with_state(FakeTable::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_rest_store_crud_against_fake_service() {
        let base_url = spawn_fake().await;
        let store = RestSealStore::new(&base_url, "test-key", "seals").unwrap();

        store
            .insert(&NewSeal::in_stock("ab12", Department::Inbound).unwrap())
            .await
            .unwrap();
        store
            .insert(&NewSeal::in_stock("zz99", Department::Shipping).unwrap())
            .await
            .unwrap();

        let records = store.list_newest_first().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seal_id, "ZZ99");
        assert_eq!(records[0].id, "2");
        assert_eq!(records[1].department.known(), Some(Department::Inbound));

        store.update_status("1", SealStatus::Applied).await.unwrap();
        let records = store.list_newest_first().await.unwrap();
        assert_eq!(records[1].status.known(), Some(SealStatus::Applied));
        assert_eq!(records[0].status.known(), Some(SealStatus::InStock));

        store.delete("2").await.unwrap();
        let records = store.list_newest_first().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seal_id, "AB12");

        let err = store.delete("2").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rest_store_update_of_missing_row_is_not_found() {
        let base_url = spawn_fake().await;
        let store = RestSealStore::new(&base_url, "test-key", "seals").unwrap();
        store
            .insert(&NewSeal::in_stock("ab12", Department::Inbound).unwrap())
            .await
            .unwrap();

        let err = store
            .update_status("99", SealStatus::Applied)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let records = store.list_newest_first().await.unwrap();
        assert_eq!(records[0].status.known(), Some(SealStatus::InStock));
    }

    #[tokio::test]
    async fn test_rest_store_surfaces_service_errors() {
        let base_url = spawn_fake().await;
        let store = RestSealStore::new(&base_url, "wrong-key", "seals").unwrap();

        let err = store.list_newest_first().await.unwrap_err();
        match err {
            AppError::Store(msg) => assert!(msg.contains("401")),
            other => panic!("expected store error, got {:?}", other),
        }
    }

    #[test]
    fn test_wire_row_accepts_numeric_and_text_ids() {
        let numeric: WireRow = serde_json::from_value(json!({
            "id": 42,
            "seal_id": "AB12",
            "department": "Bella Canva",
            "status": "In Stock",
            "created_at": "2024-03-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(numeric.id, "42");

        let text: WireRow = serde_json::from_value(json!({
            "id": "c0ffee",
            "seal_id": "AB12",
            "department": "Bella Canva",
            "status": "In Stock",
            "created_at": "2024-03-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(text.id, "c0ffee");
    }
}
