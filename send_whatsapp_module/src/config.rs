//! Client configuration loaded from the environment.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::backend::Backend;
use crate::transport::DEFAULT_TIMEOUT;

pub const DEFAULT_BASE_URI: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_FIELD: &str = "session";
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappConfig {
    pub backend: Backend,
    pub session: Option<String>,
    /// Payload field that carries the session identifier.
    pub session_field: String,
    pub base_uri: String,
    /// Sent as `X-Api-Key`.
    pub api_key: Option<String>,
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: Option<String>,
    /// Endpoint overrides keyed by operation name (`sendMessage`).
    pub endpoint_overrides: HashMap<String, String>,
    pub timeout: Duration,
    /// Pause between the requests of a chunked text message.
    pub chunk_delay: Duration,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Default,
            session: None,
            session_field: DEFAULT_SESSION_FIELD.to_string(),
            base_uri: DEFAULT_BASE_URI.to_string(),
            api_key: None,
            bearer_token: None,
            endpoint_overrides: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }
}

impl WhatsappConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let backend = Backend::from_config_value(read("WHATSAPP_API_SERVER").as_deref());
        let session = read("WHATSAPP_API_SESSION").or(defaults.session);
        let session_field =
            read("WHATSAPP_API_SESSION_FIELD_NAME").unwrap_or(defaults.session_field);
        let base_uri = read("WHATSAPP_API_BASE_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_uri);
        let endpoint_overrides = read("WHATSAPP_API_MAP_METHODS")
            .map(|value| parse_endpoint_overrides(&value))
            .unwrap_or_default();
        let timeout = read("WHATSAPP_API_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let chunk_delay = read("WHATSAPP_CHUNK_DELAY_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.chunk_delay);

        Self {
            backend,
            session,
            session_field,
            base_uri,
            api_key: read("WHATSAPP_API_KEY"),
            bearer_token: read("WHATSAPP_BEARER_TOKEN"),
            endpoint_overrides,
            timeout,
            chunk_delay,
        }
    }
}

/// Parse `sendMessage=sendText,sendDocument=sendFile`. Malformed pairs are
/// skipped.
pub fn parse_endpoint_overrides(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (operation, endpoint) = pair.split_once('=')?;
            let operation = operation.trim();
            let endpoint = endpoint.trim();
            if operation.is_empty() || endpoint.is_empty() {
                return None;
            }
            Some((operation.to_string(), endpoint.to_string()))
        })
        .collect()
}
