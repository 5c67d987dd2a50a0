//! HuggingFaceProvider -- [`ProviderAdapter`] for the Hugging Face Inference API.
//!
//! Sends the rendered conversation as a single prompt to
//! `POST {base}/models/{model}` and reads `generated_text` back.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use brainstorm_core::llm::ProviderAdapter;
use brainstorm_observe::genai_attrs::{OP_TEXT_COMPLETION, PROVIDER_HUGGINGFACE, request_span};
use brainstorm_types::config::ProviderConfig;
use brainstorm_types::error::{ConfigError, ProviderError};
use brainstorm_types::provider::{ProviderId, ProviderRequest};

use super::{base_url_or, build_http_client, render_prompt, send_json};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct HfGenerated {
    generated_text: String,
}

/// The Inference API answers with a list, a single object, or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfResponse {
    List(Vec<HfGenerated>),
    Single(HfGenerated),
    Error { error: String },
}

/// Hugging Face text-generation provider.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    id: ProviderId,
    display_name: String,
}

impl HuggingFaceProvider {
    pub fn new(config: &ProviderConfig, api_key: Option<SecretString>) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_http_client()?,
            api_key,
            base_url: base_url_or(config, DEFAULT_BASE_URL),
            model: config.model.clone(),
            id: ProviderId::from(config.name.as_str()),
            display_name: config.label().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_hf_request(&self, request: &ProviderRequest) -> HfRequest {
        HfRequest {
            inputs: render_prompt(request),
            parameters: HfParameters {
                max_new_tokens: request.options.max_tokens,
                temperature: request.options.temperature,
                return_full_text: false,
            },
        }
    }
}

impl ProviderAdapter for HuggingFaceProvider {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let mut builder = self.client.post(&url).json(&self.to_hf_request(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let span = request_span(
            OP_TEXT_COMPLETION,
            PROVIDER_HUGGINGFACE,
            &self.model,
            request.options.max_tokens,
            request.options.temperature,
        );
        match send_json::<HfResponse>(builder).instrument(span).await? {
            HfResponse::List(items) => items
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or(ProviderError::Empty),
            HfResponse::Single(g) => Ok(g.generated_text),
            HfResponse::Error { error } => {
                Err(ProviderError::Malformed(format!("provider reported an error: {error}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::{Captured, request_with, spawn_server};
    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use brainstorm_types::llm::{ProviderKind, ProviderOptions};
    use serde_json::{Value, json};

    fn config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            name: "huggingface".to_string(),
            display_name: Some("Hugging Face".to_string()),
            kind: ProviderKind::HuggingFace,
            model: "gpt2".to_string(),
            base_url: Some(base_url.to_string()),
            api_key_env: Some("HF_API_KEY".to_string()),
            enabled: true,
        }
    }

    async fn server_replying(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/models/gpt2",
                post(
                    move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            captured.record(headers, body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());
        (spawn_server(router).await, captured)
    }

    #[tokio::test]
    async fn test_complete_list_response() {
        let (base, captured) =
            server_replying(StatusCode::OK, json!([{"generated_text": " Expand on A"}])).await;
        let provider =
            HuggingFaceProvider::new(&config(&base), Some(SecretString::from("hf-key"))).unwrap();

        let text = provider
            .complete(&request_with(&[("user", "idea A")], ProviderOptions::default()))
            .await
            .unwrap();

        assert_eq!(text, " Expand on A");
        let body = captured.body();
        assert!(body["inputs"].as_str().unwrap().contains("user: idea A"));
        assert_eq!(body["parameters"]["max_new_tokens"], 512);
        assert_eq!(body["parameters"]["return_full_text"], false);
        assert_eq!(captured.header("authorization").as_deref(), Some("Bearer hf-key"));
    }

    #[tokio::test]
    async fn test_complete_single_object_response() {
        let (base, _) = server_replying(StatusCode::OK, json!({"generated_text": "ok"})).await;
        let provider = HuggingFaceProvider::new(&config(&base), None).unwrap();
        let text = provider
            .complete(&request_with(&[("user", "x")], ProviderOptions::default()))
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_error_body_is_malformed() {
        let (base, _) = server_replying(StatusCode::OK, json!({"error": "Model gpt2 is loading"})).await;
        let provider = HuggingFaceProvider::new(&config(&base), None).unwrap();
        let err = provider
            .complete(&request_with(&[("user", "x")], ProviderOptions::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(ref msg) if msg.contains("loading")));
    }

    #[tokio::test]
    async fn test_non_2xx_keeps_body() {
        let (base, _) =
            server_replying(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "overloaded"})).await;
        let provider = HuggingFaceProvider::new(&config(&base), None).unwrap();
        let err = provider
            .complete(&request_with(&[("user", "x")], ProviderOptions::default()))
            .await
            .unwrap_err();
        match err {
            ProviderError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("overloaded"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_empty() {
        let (base, _) = server_replying(StatusCode::OK, json!([])).await;
        let provider = HuggingFaceProvider::new(&config(&base), None).unwrap();
        let err = provider
            .complete(&request_with(&[("user", "x")], ProviderOptions::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Empty));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let provider = HuggingFaceProvider::new(&config(&base), None).unwrap();
        let err = provider
            .complete(&request_with(&[("user", "x")], ProviderOptions::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
