//! Chat model built on first use.
//!
//! Questions answered from the violation set never reach the model, so a
//! missing endpoint or model id only fails the questions that need one.

use std::sync::OnceLock;

use async_trait::async_trait;
use ftp_core::FactPack;
use ftp_settings::ModelSettings;
use tracing::debug;

use crate::chat::{ChatCompletionsModel, api_key_from_env};
use crate::errors::ModelResult;
use crate::model::NarrativeModel;

/// [`ChatCompletionsModel`] constructed on the first [`generate`] call.
///
/// A construction error is returned from that call and retried on the
/// next one; a successful build is kept for the process lifetime.
///
/// [`generate`]: NarrativeModel::generate
pub struct DeferredChatModel {
    settings: ModelSettings,
    api_key: Option<String>,
    built: OnceLock<ChatCompletionsModel>,
}

impl DeferredChatModel {
    /// Defer a model configured from settings. The bearer key is read from
    /// the configured environment variable now.
    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self::new(settings.clone(), api_key_from_env(settings))
    }

    /// Defer a model with an explicit key.
    pub fn new(settings: ModelSettings, api_key: Option<String>) -> Self {
        Self {
            settings,
            api_key,
            built: OnceLock::new(),
        }
    }

    /// Whether the underlying adapter has been constructed.
    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }

    fn get(&self) -> ModelResult<&ChatCompletionsModel> {
        if let Some(model) = self.built.get() {
            return Ok(model);
        }
        let model = ChatCompletionsModel::new(&self.settings, self.api_key.clone())?;
        debug!(url = model.url(), "narrative model constructed");
        Ok(self.built.get_or_init(|| model))
    }
}

#[async_trait]
impl NarrativeModel for DeferredChatModel {
    fn model(&self) -> &str {
        &self.settings.model_id
    }

    async fn generate(&self, facts: &FactPack, question: &str) -> ModelResult<String> {
        self.get()?.generate(facts, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::errors::ModelError;

    fn settings(endpoint: &str) -> ModelSettings {
        ModelSettings {
            endpoint: endpoint.to_string(),
            model_id: "test-model".to_string(),
            ..ModelSettings::default()
        }
    }

    #[test]
    fn construction_never_fails() {
        let model = DeferredChatModel::new(settings(""), None);
        assert!(!model.is_built());
        assert_eq!(model.model(), "test-model");
    }

    #[tokio::test]
    async fn bad_settings_fail_at_generate() {
        let model = DeferredChatModel::new(settings(""), None);
        let err = model
            .generate(&FactPack::default(), "Explain")
            .await
            .unwrap_err();
        assert_matches!(err, ModelError::Config { .. });
        assert!(!model.is_built());
    }

    #[tokio::test]
    async fn builds_once_and_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Fine."}}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let model = DeferredChatModel::new(settings(&server.uri()), None);
        assert_eq!(
            model.generate(&FactPack::default(), "q").await.unwrap(),
            "Fine."
        );
        assert!(model.is_built());
        assert_eq!(
            model.generate(&FactPack::default(), "q").await.unwrap(),
            "Fine."
        );
    }
}
