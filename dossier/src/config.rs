use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub processing: ProcessingConfig,
    pub query: QueryConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Embedding provider configuration. The provider speaks the
/// OpenAI-compatible `/embeddings` protocol (Ollama, LM Studio, OpenAI,
/// OpenRouter).
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimensions: usize,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Chunk window size, in words.
    pub chunk_size: usize,
    /// Overlap between consecutive windows, in words.
    pub chunk_overlap: usize,
    /// Largest accepted upload, in bytes.
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// `k` used when a query request omits it.
    pub default_k: u32,
    pub max_k: u32,
}

/// LLM configuration for the summary/recommendation completions.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("DOSSIER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("DOSSIER_PORT", 8000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:dossier.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "ollama/nomic-embed-text".to_string()),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", 768),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                api_key: env::var("EMBEDDING_API_KEY").ok(),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", 64),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 3),
            },
            processing: ProcessingConfig {
                chunk_size: parse_env_or("CHUNK_SIZE", 256),
                chunk_overlap: parse_env_or("CHUNK_OVERLAP", 50),
                max_file_size: parse_env_or("MAX_FILE_SIZE", 25 * 1024 * 1024),
            },
            query: QueryConfig {
                default_k: parse_env_or("QUERY_DEFAULT_K", 5),
                max_k: parse_env_or("QUERY_MAX_K", 50),
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "ollama/llama3.2:3b".to_string()),
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 120),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known providers that expose OpenAI-compatible APIs.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into a (provider, model) tuple.
///
/// `ollama/llama3.2:3b` → `("ollama", "llama3.2:3b")`. An unknown prefix is
/// treated as part of the model name with the `local` provider, which
/// requires an explicit base URL.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        for var in [
            "DOSSIER_HOST",
            "DOSSIER_PORT",
            "DATABASE_URL",
            "EMBEDDING_MODEL",
            "LLM_MODEL",
            "QUERY_DEFAULT_K",
            "CHUNK_SIZE",
        ] {
            std::env::remove_var(var);
        }

        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.url, "file:dossier.db");
        assert_eq!(config.embeddings.model, "ollama/nomic-embed-text");
        assert_eq!(config.embeddings.dimensions, 768);
        assert_eq!(config.llm.model, "ollama/llama3.2:3b");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.query.default_k, 5);
        assert_eq!(config.processing.chunk_size, 256);
        assert_eq!(config.processing.chunk_overlap, 50);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("DOSSIER_PORT", "9001");
        std::env::set_var("CHUNK_SIZE", "128");
        std::env::set_var("QUERY_DEFAULT_K", "10");

        let config = Config::default();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.processing.chunk_size, 128);
        assert_eq!(config.query.default_k, 10);

        std::env::remove_var("DOSSIER_PORT");
        std::env::remove_var("CHUNK_SIZE");
        std::env::remove_var("QUERY_DEFAULT_K");
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_falls_back() {
        std::env::set_var("DOSSIER_PORT", "not-a-port");
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        std::env::remove_var("DOSSIER_PORT");
    }

    #[test]
    fn test_parse_provider_model_known() {
        assert_eq!(
            parse_provider_model("ollama/llama3.2:3b"),
            ("ollama", "llama3.2:3b")
        );
        assert_eq!(
            parse_provider_model("openai/gpt-4o-mini"),
            ("openai", "gpt-4o-mini")
        );
    }

    #[test]
    fn test_parse_provider_model_unknown_prefix_is_local() {
        assert_eq!(
            parse_provider_model("mycorp/internal-model"),
            ("local", "mycorp/internal-model")
        );
        assert_eq!(parse_provider_model("plain-model"), ("local", "plain-model"));
    }
}
