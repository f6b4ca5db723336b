//! A provider bound to one model name.

use skiff_core::error::ProviderError;
use skiff_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::debug;

/// LLM handle used by agents and by skills that run their own prompts.
#[derive(Clone)]
pub struct Model {
    provider: Arc<dyn Provider>,
    name: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Model {
    pub fn new(provider: Arc<dyn Provider>, name: impl Into<String>) -> Self {
        Self {
            provider,
            name: name.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub(crate) fn temperature(&self) -> f32 {
        self.temperature
    }

    pub(crate) fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    /// Single-shot completion: one user prompt in, the reply text out.
    pub async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(model = %self.name, prompt_len = prompt.len(), "Invoking model");
        let mut request = ProviderRequest::prompt(&self.name, prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("provider", &self.provider.name())
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skiff_core::message::Message;
    use skiff_core::provider::ProviderResponse;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<ProviderRequest>>,
    }

    #[async_trait]
    impl Provider for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let reply = format!("echo: {}", request.messages[0].content);
            self.seen.lock().unwrap().push(request);
            Ok(ProviderResponse {
                message: Message::assistant(reply),
                usage: None,
                model: "recorder-1".into(),
            })
        }
    }

    #[tokio::test]
    async fn invoke_sends_single_user_message() {
        let provider = Arc::new(Recorder { seen: Mutex::new(vec![]) });
        let model = Model::new(provider.clone(), "gpt-4o").with_temperature(0.2).with_max_tokens(100);

        let reply = model.invoke("Describe Paris").await.unwrap();
        assert_eq!(reply, "echo: Describe Paris");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].model, "gpt-4o");
        assert_eq!(seen[0].messages.len(), 1);
        assert_eq!(seen[0].temperature, 0.2);
        assert_eq!(seen[0].max_tokens, Some(100));
        assert!(seen[0].tools.is_empty());
    }
}
