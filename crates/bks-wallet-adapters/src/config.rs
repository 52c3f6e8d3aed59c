use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown runtime profile: {0}")]
    UnknownProfile(String),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub runtime_profile: RuntimeProfile,
    /// JSON-RPC endpoint standing in for an injected provider on native targets.
    pub eip1193_proxy_url: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_ms: u64,
    pub event_cards_path: String,
    pub update_like_path: String,
    pub dapp_name: String,
    pub dapp_url: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            api_base_url: None,
            request_timeout_ms: 15_000,
            event_cards_path: "/api/event/get_all_event_cards".to_owned(),
            update_like_path: "/api/event/update_event_like".to_owned(),
            dapp_name: "BKSIOS".to_owned(),
            dapp_url: "https://bksbackstage.io".to_owned(),
        }
    }
}

pub const ENV_RUNTIME_PROFILE: &str = "BKS_RUNTIME_PROFILE";
pub const ENV_EIP1193_PROXY_URL: &str = "BKS_EIP1193_PROXY_URL";
pub const ENV_API_BASE_URL: &str = "BKS_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "BKS_REQUEST_TIMEOUT_MS";

impl AdapterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(raw) = non_empty(lookup(ENV_RUNTIME_PROFILE)) {
            cfg.runtime_profile = match raw.to_ascii_lowercase().as_str() {
                "dev" | "development" => RuntimeProfile::Development,
                "prod" | "production" => RuntimeProfile::Production,
                _ => return Err(ConfigError::UnknownProfile(raw)),
            };
        }
        cfg.eip1193_proxy_url = non_empty(lookup(ENV_EIP1193_PROXY_URL));
        cfg.api_base_url = non_empty(lookup(ENV_API_BASE_URL));
        if let Some(raw) = non_empty(lookup(ENV_REQUEST_TIMEOUT_MS)) {
            cfg.request_timeout_ms = raw.parse().map_err(|e| ConfigError::Invalid {
                key: ENV_REQUEST_TIMEOUT_MS,
                reason: format!("{e}"),
            })?;
        }
        Ok(cfg)
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
