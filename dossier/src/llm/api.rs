use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};

use crate::{
    config::{parse_provider_model, LlmConfig},
    error::{DossierError, Result},
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

/// One completed LLM call: the generated text plus token counts. Counts are
/// provider-reported when present, otherwise approximated so accounting
/// invariants still hold.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl std::fmt::Debug for LlmApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(DossierError::Synthesis(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                DossierError::Synthesis(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // Cap async-openai's internal backoff at our per-call timeout.
        // Its default max_elapsed_time retries 500s for up to 15 minutes,
        // independent of the retry loop in complete().
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(api_config.timeout_secs)),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> Result<Completion> {
        if prompt.trim().is_empty() {
            return Err(DossierError::InvalidRequest(
                "Prompt cannot be empty".to_string(),
            ));
        }

        let mut last_error: Option<DossierError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay_ms = 100 * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let request = self.build_request(prompt, system_prompt)?;

            match self.client.chat().create(request).await {
                Ok(response) => return Self::extract_completion(response, prompt),
                Err(error) => {
                    if let Some(auth_error) = Self::auth_error(&error) {
                        return Err(auth_error);
                    }

                    let retryable = Self::is_retryable(&error);
                    let mapped_error = Self::map_openai_error(error);

                    if retryable && attempt < self.config.max_retries {
                        last_error = Some(mapped_error);
                        continue;
                    }

                    return Err(mapped_error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DossierError::Synthesis("LLM completion failed after retries".to_string())
        }))
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<CreateChatCompletionRequest> {
        let mut messages = Vec::new();

        if let Some(system_prompt) = system_prompt.filter(|value| !value.trim().is_empty()) {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|error| {
                        DossierError::InvalidRequest(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|error| {
                    DossierError::InvalidRequest(format!("Invalid user prompt: {error}"))
                })?
                .into(),
        );

        CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages(messages)
            .temperature(self.config.temperature)
            .build()
            .map_err(|error| {
                DossierError::InvalidRequest(format!("Invalid LLM completion request: {error}"))
            })
    }

    fn extract_completion(
        response: CreateChatCompletionResponse,
        prompt: &str,
    ) -> Result<Completion> {
        let usage = response.usage.clone();

        let text = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                DossierError::Synthesis("LLM response contained no choices".to_string())
            })?
            .message
            .content
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(DossierError::Synthesis(
                "LLM response contained empty content".to_string(),
            ));
        }

        let (input_tokens, output_tokens) = match usage {
            Some(usage) => (
                u64::from(usage.prompt_tokens),
                u64::from(usage.completion_tokens),
            ),
            None => (estimate_tokens(prompt), estimate_tokens(&text)),
        };

        Ok(Completion {
            text,
            input_tokens,
            output_tokens,
        })
    }

    fn is_retryable(error: &OpenAIError) -> bool {
        match error {
            OpenAIError::ApiError(api_error) => {
                Self::is_rate_limit_api_error(api_error)
                    || (api_error.r#type.is_none() && api_error.code.is_none())
            }
            OpenAIError::Reqwest(reqwest_error) => reqwest_error
                .status()
                .map(|status| {
                    status.is_server_error()
                        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
                .unwrap_or(true),
            _ => false,
        }
    }

    fn auth_error(error: &OpenAIError) -> Option<DossierError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                Some(DossierError::Synthesis(format!(
                    "LLM authentication failed: {reqwest_error}"
                )))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(api_error) => Some(
                DossierError::Synthesis(format!("LLM authentication failed: {api_error}")),
            ),
            _ => None,
        }
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("forbidden")
            || message.contains("authentication")
            || message.contains("invalid api key")
            || code.contains("invalid_api_key")
            || code.contains("authentication")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> DossierError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                DossierError::Synthesis(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                DossierError::Synthesis(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                DossierError::Synthesis(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => DossierError::InvalidRequest(message),
            other => DossierError::Synthesis(other.to_string()),
        }
    }
}

/// Rough token estimate used when a provider reports no usage.
fn estimate_tokens(text: &str) -> u64 {
    (text.len() as f64 / 4.0).ceil() as u64
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }
}

fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => OPENAI_BASE_URL,
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_llm_config() -> LlmConfig {
        LlmConfig {
            model: "ollama/llama3.2:3b".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            timeout_secs: 30,
            max_retries: 0,
        }
    }

    #[test]
    fn test_client_builds_without_api_key_for_ollama() {
        assert!(LlmApiClient::new(&test_llm_config()).is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = LlmConfig {
            model: "openai/gpt-4o-mini".to_string(),
            ..test_llm_config()
        };
        let err = LlmApiClient::new(&config).unwrap_err();
        assert_eq!(err.code(), "synthesis_error");
    }

    #[test]
    fn test_build_request_includes_temperature_and_model() {
        let client = LlmApiClient::new(&test_llm_config()).expect("client should build");
        let request = client
            .build_request("summarize this", None)
            .expect("request should build");
        assert_eq!(request.model, "llama3.2:3b");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn test_build_request_with_system_prompt() {
        let client = LlmApiClient::new(&test_llm_config()).expect("client should build");
        let request = client
            .build_request("question", Some("you are terse"))
            .expect("request should build");
        assert_eq!(request.messages.len(), 2);
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_local_provider_keeps_full_model_name() {
        let config = LlmConfig {
            model: "mycorp/custom-model".to_string(),
            base_url: Some("http://localhost:9999/v1".to_string()),
            ..test_llm_config()
        };
        let api_config = ApiConfig::from_llm_config(&config);
        assert_eq!(api_config.model, "mycorp/custom-model");
        assert_eq!(api_config.base_url, "http://localhost:9999/v1");
    }
}
