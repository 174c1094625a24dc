//! Chat-completions HTTP adapter.
//!
//! Posts `{model, messages: [system, user], temperature, max_tokens}` to
//! `{endpoint}/chat/completions` and returns `choices[0].message.content`.

use std::time::Duration;

use async_trait::async_trait;
use ftp_core::FactPack;
use ftp_settings::ModelSettings;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{ModelError, ModelResult};
use crate::model::NarrativeModel;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, render_prompt};

/// Narrative model backed by a chat-completions endpoint.
#[cfg_attr(test, derive(Debug))]
pub struct ChatCompletionsModel {
    client: reqwest::Client,
    url: String,
    model_id: String,
    api_key: Option<String>,
    temperature: f64,
    max_tokens: u32,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsModel {
    /// Build from settings with an explicit key.
    pub fn new(settings: &ModelSettings, api_key: Option<String>) -> ModelResult<Self> {
        let endpoint = settings.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(ModelError::Config {
                message: "model endpoint is empty".to_string(),
            });
        }
        if settings.model_id.trim().is_empty() {
            return Err(ModelError::Config {
                message: "model id is empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: format!("{endpoint}/chat/completions"),
            model_id: settings.model_id.clone(),
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_prompt: settings
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    /// Full request URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Bearer key from the environment variable named in settings. An unset
/// or empty variable sends no key.
pub(crate) fn api_key_from_env(settings: &ModelSettings) -> Option<String> {
    std::env::var(&settings.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

#[async_trait]
impl NarrativeModel for ChatCompletionsModel {
    fn model(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, facts: &FactPack, question: &str) -> ModelResult<String> {
        let user = render_prompt(facts, question);
        let request = ChatRequest {
            model: &self.model_id,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!(
            model = %self.model_id,
            prompt_chars = user.len(),
            "requesting narrative answer"
        );

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let (message, code) = parse_api_error(&body, status.as_u16());
            warn!(status = status.as_u16(), %message, "model endpoint returned an error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
                code,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        debug!(response_chars = content.len(), "narrative answer received");
        Ok(content)
    }
}

/// Extract message and code from an error body.
///
/// Handles `{"error": {"message", "type"}}`, `{"detail"}` and
/// `{"message", "code"}`; anything else falls back to the raw body.
fn parse_api_error(body: &str, status: u16) -> (String, Option<String>) {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            let code = json["error"]["type"].as_str().map(String::from);
            return (msg.to_string(), code);
        }
        if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
            let code = json["code"].as_str().map(String::from);
            return (msg.to_string(), code);
        }
    }
    (format!("HTTP {status}: {body}"), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: &str) -> ModelSettings {
        ModelSettings {
            endpoint: endpoint.to_string(),
            model_id: "test-model".to_string(),
            ..ModelSettings::default()
        }
    }

    fn facts() -> FactPack {
        FactPack {
            total_count_all: 2,
            policy_counts_all: "Policy  Count".into(),
            scoped_section: "No scoped filter applied.".into(),
            truncation_note: "NO — all rows included.".into(),
            violations: "rows".into(),
            policy_guidance: None,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    // ── parse_api_error ──────────────────────────────────────────────

    #[test]
    fn parse_api_error_standard_envelope() {
        let (msg, code) = parse_api_error(
            r#"{"error":{"type":"server_error","message":"Overloaded"}}"#,
            503,
        );
        assert_eq!(msg, "Overloaded");
        assert_eq!(code.as_deref(), Some("server_error"));
    }

    #[test]
    fn parse_api_error_detail() {
        let (msg, code) = parse_api_error(r#"{"detail":"Model not found"}"#, 404);
        assert_eq!(msg, "Model not found");
        assert!(code.is_none());
    }

    #[test]
    fn parse_api_error_non_json() {
        let (msg, _) = parse_api_error("Bad Gateway", 502);
        assert_eq!(msg, "HTTP 502: Bad Gateway");
    }

    // ── construction ─────────────────────────────────────────────────

    #[test]
    fn url_joins_endpoint() {
        let model = ChatCompletionsModel::new(&settings("http://host:9/v1/"), None).unwrap();
        assert_eq!(model.url(), "http://host:9/v1/chat/completions");
        assert_eq!(model.model(), "test-model");
    }

    #[test]
    fn empty_endpoint_is_config_error() {
        assert_matches!(
            ChatCompletionsModel::new(&settings("  "), None),
            Err(ModelError::Config { .. })
        );
    }

    // ── generate (mock server) ───────────────────────────────────────

    #[tokio::test]
    async fn generate_returns_content_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "temperature": 0.0,
                "max_tokens": 800
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "Two violations, both Negative FTP rate.\n",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let model =
            ChatCompletionsModel::new(&settings(&format!("{}/v1", server.uri())), None).unwrap();
        let text = model.generate(&facts(), "Summarize").await.unwrap();
        assert_eq!(text, "Two violations, both Negative FTP rate.\n");
    }

    #[tokio::test]
    async fn request_carries_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.system_prompt = Some("Custom analyst.".into());
        let model = ChatCompletionsModel::new(&s, None).unwrap();
        let _ = model.generate(&facts(), "What stands out?").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Custom analyst.");
        assert_eq!(body["messages"][1]["role"], "user");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Global total violations: 2"));
        assert!(user.contains("What stands out?"));
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn bearer_key_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(bearer_token("sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let model =
            ChatCompletionsModel::new(&settings(&server.uri()), Some("sk-test".into())).unwrap();
        assert_eq!(model.generate(&facts(), "q").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"type": "rate_limit_error", "message": "Slow down"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = ChatCompletionsModel::new(&settings(&server.uri()), None).unwrap();
        let err = model.generate(&facts(), "q").await.unwrap_err();
        assert_matches!(err, ModelError::Api { status: 429, ref message, .. } if message == "Slow down");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn empty_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model = ChatCompletionsModel::new(&settings(&server.uri()), None).unwrap();
        assert_matches!(
            model.generate(&facts(), "q").await,
            Err(ModelError::EmptyResponse)
        );
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let model = ChatCompletionsModel::new(&settings(&server.uri()), None).unwrap();
        assert_matches!(model.generate(&facts(), "q").await, Err(ModelError::Json(_)));
    }

    #[tokio::test]
    async fn timeout_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut s = settings(&server.uri());
        s.timeout_ms = 50;
        let model = ChatCompletionsModel::new(&s, None).unwrap();
        let err = model.generate(&facts(), "q").await.unwrap_err();
        assert_matches!(err, ModelError::Http(ref e) if e.is_timeout());
    }
}
