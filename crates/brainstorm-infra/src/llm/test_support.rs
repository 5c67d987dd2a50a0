//! In-process HTTP servers for adapter tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::HeaderMap;

use brainstorm_types::context::{ContextEntry, ContextWindow};
use brainstorm_types::llm::ProviderOptions;
use brainstorm_types::provider::{ProviderId, ProviderRequest};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Last request seen by a test server.
#[derive(Clone, Default)]
pub struct Captured {
    pub body: Arc<Mutex<Option<serde_json::Value>>>,
    pub headers: Arc<Mutex<Option<HeaderMap>>>,
}

impl Captured {
    pub fn record(&self, headers: HeaderMap, body: serde_json::Value) {
        *self.headers.lock().unwrap() = Some(headers);
        *self.body.lock().unwrap() = Some(body);
    }

    pub fn body(&self) -> serde_json::Value {
        self.body.lock().unwrap().clone().expect("no request captured")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }
}

pub fn request_with(entries: &[(&str, &str)], options: ProviderOptions) -> ProviderRequest {
    ProviderRequest {
        provider_id: ProviderId::from("test"),
        context: Arc::new(ContextWindow {
            entries: entries
                .iter()
                .map(|(role, content)| ContextEntry::new(role.parse().unwrap(), *content))
                .collect(),
            oversized: false,
            dropped: 0,
        }),
        options,
    }
}
