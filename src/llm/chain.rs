use std::sync::Arc;

use super::{client::OpenAiCompatibleClient, ChatRequest, LlmError, LlmProvider};
use crate::config::LlmConfig;

/// Ordered list of providers tried until one produces a usable answer
#[derive(Clone)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// One OpenAI-compatible client per configured model
    pub fn from_config(config: &LlmConfig) -> Self {
        let providers = config
            .models
            .iter()
            .map(|model| {
                Arc::new(OpenAiCompatibleClient::new(
                    &config.base_url,
                    model,
                    config.api_key.clone(),
                    config.timeout_secs,
                )) as Arc<dyn LlmProvider>
            })
            .collect();

        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First non-blank completion
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.complete_parsed(request, |text| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .await
    }

    /// Try each provider until `parse` accepts a completion.
    ///
    /// A completion `parse` rejects counts as a failure of that provider. The
    /// error of the last provider tried is returned when none succeed.
    pub async fn complete_parsed<T, F>(&self, request: &ChatRequest, parse: F) -> Result<T, LlmError>
    where
        F: Fn(&str) -> Option<T>,
    {
        let mut last_error = LlmError::NoProviders;

        for (attempt, provider) in self.providers.iter().enumerate() {
            let name = provider.name();

            match provider.complete(request).await {
                Ok(text) => match parse(&text) {
                    Some(value) => {
                        tracing::info!(provider = %name, attempt = attempt + 1, "LLM completion accepted");
                        return Ok(value);
                    }
                    None => {
                        tracing::warn!(provider = %name, chars = text.len(), "LLM completion could not be parsed, trying next provider");
                        last_error = LlmError::InvalidResponse(format!(
                            "{} returned an unusable completion",
                            name
                        ));
                    }
                },
                Err(e) => {
                    tracing::warn!(provider = %name, error = %e, "LLM provider failed, trying next provider");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmProvider;

    fn provider(name: &'static str, reply: Result<&'static str, u16>) -> Arc<dyn LlmProvider> {
        let mut mock = MockLlmProvider::new();
        mock.expect_name().return_const(name.to_string());
        mock.expect_complete().returning(move |_| match reply {
            Ok(text) => Ok(text.to_string()),
            Err(status) => Err(LlmError::HttpStatus {
                status,
                body: String::new(),
            }),
        });
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = FallbackChain::new(vec![
            provider("a", Err(429)),
            provider("b", Ok("answer from b")),
            provider("c", Ok("answer from c")),
        ]);

        let text = chain.complete(&ChatRequest::new("s", "u")).await.unwrap();
        assert_eq!(text, "answer from b");
    }

    #[tokio::test]
    async fn test_blank_completion_falls_through() {
        let chain = FallbackChain::new(vec![provider("a", Ok("   ")), provider("b", Ok("ok"))]);
        assert_eq!(chain.complete(&ChatRequest::new("s", "u")).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_error() {
        let chain = FallbackChain::new(vec![provider("a", Err(500)), provider("b", Err(401))]);

        let err = chain.complete(&ChatRequest::new("s", "u")).await.unwrap_err();
        assert!(matches!(err, LlmError::HttpStatus { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_is_invalid_response() {
        let chain = FallbackChain::new(vec![provider("a", Ok("nonsense"))]);

        let result: Result<u32, _> = chain
            .complete_parsed(&ChatRequest::new("s", "u"), |t| t.parse().ok())
            .await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = FallbackChain::new(Vec::new());
        assert!(chain.is_empty());
        assert!(matches!(
            chain.complete(&ChatRequest::new("s", "u")).await,
            Err(LlmError::NoProviders)
        ));
    }

    #[test]
    fn test_from_config_builds_one_provider_per_model() {
        let chain = FallbackChain::from_config(&LlmConfig::default());
        assert_eq!(chain.len(), 4);
    }
}
