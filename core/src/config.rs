//! Client configuration and process-wide defaults.
//!
//! A `ClientConfig` is usually built explicitly and handed to
//! `SearchClient::new`. Programs that want one configuration for the whole
//! process can call `set_defaults` once at startup. `SearchClient::from_defaults`
//! and key resolution fall back to it.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.pipl.com";

pub const ENV_API_KEY: &str = "PIPL_API_KEY";
pub const ENV_BASE_URL: &str = "PIPL_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PIPL_TIMEOUT_SECS";

static DEFAULTS: OnceLock<ClientConfig> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    /// Whole-request timeout used by `UreqTransport`. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Extra query parameters sent with every search, such as
    /// `developer_class`.
    pub params: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: format!("pipl-rust/{}", env!("CARGO_PKG_VERSION")),
            timeout: Some(Duration::from_secs(30)),
            params: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// A query string on `base_url` (`https://api.pipl.com?developer_class=contact`)
    /// is split off into `params`.
    pub fn new(base_url: &str) -> Self {
        let (base, query) = base_url.split_once('?').unwrap_or((base_url, ""));
        Self {
            base_url: base.trim_end_matches('/').to_string(),
            params: parse_query(query),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `PIPL_API_KEY`, `PIPL_BASE_URL` and `PIPL_TIMEOUT_SECS`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            Some(url) => Self::new(&url),
            None => Self::default(),
        };
        config.api_key = lookup(ENV_API_KEY).filter(|v| !v.is_empty());
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS.to_string(),
                message: format!("{e}"),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    let decode = |raw: &str| {
        urlencoding::decode(&raw.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(name), decode(value))
        })
        .collect()
}

/// Install the process-wide default configuration. Only the first call wins;
/// later calls get their config handed back.
pub fn set_defaults(config: ClientConfig) -> Result<(), ClientConfig> {
    DEFAULTS.set(config)
}

pub fn defaults() -> Option<&'static ClientConfig> {
    DEFAULTS.get()
}

pub(crate) fn default_api_key() -> Option<&'static str> {
    defaults().and_then(|c| c.api_key.as_deref())
}
