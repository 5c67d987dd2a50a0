//! Supabase (PostgREST) message store.
//!
//! Talks to a hosted `messages` table through the REST interface:
//! `POST /rest/v1/{table}` to append, `GET /rest/v1/{table}` ordered by
//! `created_at` then `id` to list. The service key is sent as both the
//! `apikey` header and a bearer token.
//!
//! PostgREST caps each response at the server's `max_rows`, so listing pages
//! with `offset`/`limit` and reads the total from `Content-Range`.
//!
//! The table needs `id`, `role`, `content` and `created_at` (defaulting to
//! `now()`). The `provider text` column is optional; see
//! [`SupabaseMessageStore::with_provider_column`].

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::CONTENT_RANGE;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use brainstorm_core::repository::MessageStore;
use brainstorm_types::error::StoreError;
use brainstorm_types::message::{Message, MessageId, MessageRole, NewMessage};
use brainstorm_types::provider::ProviderId;

/// Rows requested per page when listing.
const PAGE_SIZE: usize = 1000;

const COLUMNS: &str = "id,role,content,provider,created_at";
const COLUMNS_WITHOUT_PROVIDER: &str = "id,role,content,created_at";

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    role: MessageRole,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    id: serde_json::Value,
    role: MessageRole,
    content: String,
    #[serde(default)]
    provider: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, StoreError> {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => return Err(StoreError::Decode(format!("unsupported id value: {other}"))),
        };
        Ok(Message {
            id: MessageId::from(id),
            role: self.role,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
            provider: self.provider.map(ProviderId::from),
        })
    }
}

/// Accepts `timestamptz` output and zone-less `timestamp` output (read as UTC).
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Decode(format!("invalid created_at '{s}': {e}")))
}

/// Total row count from a `Content-Range` value such as `0-999/2500` or `*/0`.
/// `None` when the server did not count (`0-999/*`).
fn content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// Message store backed by a Supabase table.
pub struct SupabaseMessageStore {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    table: String,
    provider_column: bool,
}

impl SupabaseMessageStore {
    pub fn new(base_url: &str, api_key: SecretString, table: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Connection(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table: table.to_string(),
            provider_column: true,
        })
    }

    /// Whether to read and write the `provider` column. When disabled,
    /// assistant rows are stored without their provider tag and listed
    /// messages carry none.
    pub fn with_provider_column(mut self, enabled: bool) -> Self {
        self.provider_column = enabled;
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn columns(&self) -> &'static str {
        if self.provider_column {
            COLUMNS
        } else {
            COLUMNS_WITHOUT_PROVIDER
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Send a request and decode its rows, along with the `Content-Range`
    /// total when the server reported one.
    async fn rows(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(Vec<MessageRow>, Option<usize>), StoreError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let status = response.status();
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_range_total);
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let rows = serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok((rows, total))
    }
}

impl MessageStore for SupabaseMessageStore {
    async fn append(&self, message: &NewMessage) -> Result<MessageId, StoreError> {
        let row = InsertRow {
            role: message.role,
            content: &message.content,
            provider: message
                .provider
                .as_ref()
                .filter(|_| self.provider_column)
                .map(|p| p.as_str()),
        };
        let builder = self
            .client
            .post(self.table_url())
            .query(&[("select", self.columns())])
            .header("Prefer", "return=representation")
            .json(&row);

        let (rows, _) = self.rows(builder).await?;
        let inserted = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".to_string()))?;

        Ok(inserted.into_message()?.id)
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        let mut messages = Vec::new();
        loop {
            let builder = self
                .client
                .get(self.table_url())
                .query(&[("select", self.columns()), ("order", "created_at.asc,id.asc")])
                .query(&[("offset", messages.len()), ("limit", PAGE_SIZE)])
                .header("Prefer", "count=exact");

            let (rows, total) = self.rows(builder).await?;
            if rows.is_empty() {
                break;
            }
            for row in rows {
                messages.push(row.into_message()?);
            }
            if total.is_some_and(|total| messages.len() >= total) {
                break;
            }
            tracing::debug!(fetched = messages.len(), ?total, "fetching next supabase page");
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::{Captured, spawn_server};
    use axum::Json;
    use axum::Router;
    use axum::extract::{Query, RawQuery, State};
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A PostgREST stand-in that honours `offset`/`limit` and caps each
    /// response at `max_rows`, like a hosted project does.
    #[derive(Clone)]
    struct Table {
        rows: Arc<Vec<Value>>,
        max_rows: usize,
        status: StatusCode,
        captured: Captured,
        queries: Arc<Mutex<Vec<String>>>,
    }

    impl Table {
        fn new(rows: Vec<Value>, max_rows: usize, status: StatusCode) -> Self {
            Self {
                rows: Arc::new(rows),
                max_rows,
                status,
                captured: Captured::default(),
                queries: Arc::default(),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    async fn list(
        State(table): State<Table>,
        RawQuery(raw): RawQuery,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        table.queries.lock().unwrap().push(raw.unwrap_or_default());
        let param = |name: &str| params.get(name).and_then(|v| v.parse::<usize>().ok());
        let total = table.rows.len();
        let start = param("offset").unwrap_or(0).min(total);
        let limit = param("limit").unwrap_or(usize::MAX).min(table.max_rows);
        let end = start.saturating_add(limit).min(total);
        let range = if start == end {
            format!("*/{total}")
        } else {
            format!("{start}-{}/{total}", end - 1)
        };
        (
            table.status,
            [(header::CONTENT_RANGE, range)],
            Json(Value::Array(table.rows[start..end].to_vec())),
        )
    }

    async fn insert(
        State(table): State<Table>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        let mut row = body.clone();
        table.captured.record(headers, body);
        row["id"] = json!(42);
        row["created_at"] = json!("2026-01-01T10:00:02+00:00");
        (StatusCode::CREATED, Json(json!([row])))
    }

    async fn server(table: Table) -> String {
        let router = Router::new()
            .route("/rest/v1/messages", get(list).post(insert))
            .with_state(table);
        spawn_server(router).await
    }

    fn two_rows() -> Vec<Value> {
        vec![
            json!({"id": 1, "role": "user", "content": "idea A", "provider": null,
                   "created_at": "2026-01-01T10:00:00.123456+00:00"}),
            json!({"id": 2, "role": "assistant", "content": "Expand on A", "provider": "groq",
                   "created_at": "2026-01-01T10:00:01.5"}),
        ]
    }

    fn numbered_rows(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| {
                json!({"id": i + 1, "role": "user", "content": format!("thought {i}"),
                       "created_at": format!("2026-01-01T10:00:{:02}+00:00", i % 60)})
            })
            .collect()
    }

    fn store(base: &str) -> SupabaseMessageStore {
        SupabaseMessageStore::new(base, SecretString::from("service-key"), "messages").unwrap()
    }

    #[tokio::test]
    async fn test_append_posts_row_and_returns_id() {
        let table = Table::new(vec![], 1000, StatusCode::OK);
        let base = server(table.clone()).await;
        let id = store(&base)
            .append(&NewMessage::assistant(ProviderId::from("groq"), "Expand on A"))
            .await
            .unwrap();

        assert_eq!(id, MessageId::from("42".to_string()));
        let body = table.captured.body();
        assert_eq!(body["role"], "assistant");
        assert_eq!(body["provider"], "groq");
        assert_eq!(table.captured.header("apikey").as_deref(), Some("service-key"));
        assert_eq!(
            table.captured.header("authorization").as_deref(),
            Some("Bearer service-key")
        );
        assert_eq!(
            table.captured.header("prefer").as_deref(),
            Some("return=representation")
        );
    }

    #[tokio::test]
    async fn test_append_without_provider_column_omits_tag() {
        let table = Table::new(vec![], 1000, StatusCode::OK);
        let base = server(table.clone()).await;
        store(&base)
            .with_provider_column(false)
            .append(&NewMessage::assistant(ProviderId::from("groq"), "Expand on A"))
            .await
            .unwrap();

        let body = table.captured.body();
        assert_eq!(body["role"], "assistant");
        assert!(body.get("provider").is_none());
    }

    #[tokio::test]
    async fn test_list_orders_and_decodes() {
        let table = Table::new(two_rows(), 1000, StatusCode::OK);
        let base = server(table.clone()).await;
        let log = store(&base).list_ordered().await.unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].id.0, "1");
        assert_eq!(log[1].provider.as_ref().unwrap().as_str(), "groq");
        let queries = table.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("order=created_at.asc%2Cid.asc"));
        assert!(queries[0].contains("offset=0"));
    }

    #[tokio::test]
    async fn test_list_reads_every_page_past_row_cap() {
        let table = Table::new(numbered_rows(5), 2, StatusCode::OK);
        let base = server(table.clone()).await;
        let log = store(&base).list_ordered().await.unwrap();

        assert_eq!(log.len(), 5);
        assert_eq!(log.last().unwrap().content, "thought 4");
        assert!(log.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        let queries = table.queries();
        assert_eq!(queries.len(), 3);
        assert!(queries[1].contains("offset=2"));
        assert!(queries[2].contains("offset=4"));
    }

    #[tokio::test]
    async fn test_list_empty_table() {
        let table = Table::new(vec![], 1000, StatusCode::OK);
        let base = server(table.clone()).await;
        assert!(store(&base).list_ordered().await.unwrap().is_empty());
        assert_eq!(table.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_list_without_provider_column_selects_base_columns() {
        let table = Table::new(two_rows(), 1000, StatusCode::OK);
        let base = server(table.clone()).await;
        store(&base)
            .with_provider_column(false)
            .list_ordered()
            .await
            .unwrap();
        assert!(table.queries()[0].contains("select=id%2Crole%2Ccontent%2Ccreated_at"));
    }

    #[tokio::test]
    async fn test_rejected_request_keeps_status() {
        let table = Table::new(two_rows(), 1000, StatusCode::UNAUTHORIZED);
        let base = server(table).await;
        let err = store(&base).list_ordered().await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2026-01-01T10:00:00+00:00").is_ok());
        assert!(parse_timestamp("2026-01-01T10:00:00.5").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(content_range_total("0-999/2500"), Some(2500));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-999/*"), None);
        assert_eq!(content_range_total("garbage"), None);
    }
}
