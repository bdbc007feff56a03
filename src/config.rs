//! Runtime configuration read from the process environment.
//!
//! Every loader takes a variable lookup so tests can supply values without
//! touching the real environment; `from_env` wires the lookup to
//! [`std::env::var`].

use thiserror::Error;

/// Variable holding the chat gateway API key.
pub const ASSISTANT_API_KEY_VAR: &str = "BOARD_ASSISTANT_API_KEY";
/// Variable overriding the chat gateway endpoint.
pub const ASSISTANT_ENDPOINT_VAR: &str = "BOARD_ASSISTANT_ENDPOINT";
/// Variable overriding the chat model.
pub const ASSISTANT_MODEL_VAR: &str = "BOARD_ASSISTANT_MODEL";
/// Variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Variable overriding the connection pool size.
pub const DATABASE_POOL_SIZE_VAR: &str = "BOARD_DATABASE_POOL_SIZE";

const DEFAULT_ASSISTANT_ENDPOINT: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_ASSISTANT_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_POOL_SIZE: u32 = 4;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("required configuration variable {0} is not set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("configuration variable {name} has invalid value '{value}'")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn lookup_trimmed(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_pool_size(raw: String) -> ConfigResult<u32> {
    match raw.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::Invalid {
            name: DATABASE_POOL_SIZE_VAR,
            value: raw,
        }),
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Settings for the chat-completion gateway behind the task assistant.
#[derive(Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    api_key: String,
    endpoint: String,
    model: String,
}

impl AssistantConfig {
    /// Creates a configuration with the default endpoint and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ASSISTANT_ENDPOINT.to_owned(),
            model: DEFAULT_ASSISTANT_MODEL.to_owned(),
        }
    }

    /// Overrides the gateway endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the API key is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let api_key = lookup_trimmed(&lookup, ASSISTANT_API_KEY_VAR)
            .ok_or(ConfigError::Missing(ASSISTANT_API_KEY_VAR))?;
        let mut config = Self::new(api_key);
        if let Some(endpoint) = lookup_trimmed(&lookup, ASSISTANT_ENDPOINT_VAR) {
            config = config.with_endpoint(endpoint);
        }
        if let Some(model) = lookup_trimmed(&lookup, ASSISTANT_MODEL_VAR) {
            config = config.with_model(model);
        }
        Ok(config)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the API key is unset.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the gateway endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

/// Settings for the `PostgreSQL` task store.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    url: String,
    pool_size: u32,
}

impl DatabaseConfig {
    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the URL is unset and
    /// [`ConfigError::Invalid`] when the pool size is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let url = lookup_trimmed(&lookup, DATABASE_URL_VAR)
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let pool_size = lookup_trimmed(&lookup, DATABASE_POOL_SIZE_VAR)
            .map_or(Ok(DEFAULT_POOL_SIZE), parse_pool_size)?;
        Ok(Self { url, pool_size })
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`DatabaseConfig::from_lookup`].
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[rstest]
    fn assistant_config_requires_api_key() {
        let result = AssistantConfig::from_lookup(lookup_from(&[]));

        assert_eq!(result, Err(ConfigError::Missing(ASSISTANT_API_KEY_VAR)));
    }

    #[rstest]
    fn blank_api_key_counts_as_missing() {
        let result = AssistantConfig::from_lookup(lookup_from(&[(ASSISTANT_API_KEY_VAR, "  ")]));

        assert_eq!(result, Err(ConfigError::Missing(ASSISTANT_API_KEY_VAR)));
    }

    #[rstest]
    fn assistant_config_applies_defaults() {
        let config = AssistantConfig::from_lookup(lookup_from(&[(ASSISTANT_API_KEY_VAR, "key")]))
            .expect("valid config");

        assert_eq!(config.api_key(), "key");
        assert_eq!(config.endpoint(), DEFAULT_ASSISTANT_ENDPOINT);
        assert_eq!(config.model(), DEFAULT_ASSISTANT_MODEL);
    }

    #[rstest]
    fn assistant_config_honours_overrides() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            (ASSISTANT_API_KEY_VAR, "key"),
            (ASSISTANT_ENDPOINT_VAR, "http://localhost:9000/v1/chat/completions"),
            (ASSISTANT_MODEL_VAR, "local-model"),
        ]))
        .expect("valid config");

        assert_eq!(config.endpoint(), "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.model(), "local-model");
    }

    #[rstest]
    fn debug_output_redacts_api_key() {
        let config = AssistantConfig::new("super-secret");

        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[rstest]
    fn database_config_defaults_pool_size() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[(
            DATABASE_URL_VAR,
            "postgres://localhost/board",
        )]))
        .expect("valid config");

        assert_eq!(config.url(), "postgres://localhost/board");
        assert_eq!(config.pool_size(), DEFAULT_POOL_SIZE);
    }

    #[rstest]
    #[case("0")]
    #[case("many")]
    fn database_config_rejects_bad_pool_size(#[case] raw: &str) {
        let result = DatabaseConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, "postgres://localhost/board"),
            (DATABASE_POOL_SIZE_VAR, raw),
        ]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name: DATABASE_POOL_SIZE_VAR,
                value: raw.to_owned(),
            })
        );
    }
}
