//! Client configuration

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use url::Url;

use crate::error::ConfigError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "MESSENGER_API_URL";

/// Environment variable holding the request timeout in seconds (`0` disables it).
pub const ENV_TIMEOUT_SECS: &str = "MESSENGER_TIMEOUT_SECS";

/// Immutable settings shared by every call of a client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use messenger_lib::ClientConfig;
///
/// let config = ClientConfig::new("https://chat.example.com/api")
///     .unwrap()
///     .with_header("X-Client", "cli")
///     .unwrap()
///     .with_timeout(Some(Duration::from_secs(5)));
///
/// assert_eq!(config.endpoint_url("/login"), "https://chat.example.com/api/login");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            default_headers: HeaderMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: None,
        })
    }

    /// Reads the configuration from the process environment.
    ///
    /// Uses [`ENV_BASE_URL`] (default [`DEFAULT_BASE_URL`]) and
    /// [`ENV_TIMEOUT_SECS`] (default [`DEFAULT_TIMEOUT`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), None)
    }

    /// Like [`from_env`](Self::from_env), but `base_url` replaces
    /// [`ENV_BASE_URL`], which is then not read at all.
    pub fn from_env_with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), Some(base_url))
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        base_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = match base_url {
            Some(base_url) => Self::new(base_url)?,
            None => {
                let base_url =
                    lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                Self::new(&base_url)?
            }
        };

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let (name, value) = parse_header(name, value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout. `None` leaves timing to the transport.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Joins the base URL and an endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}/{}", base, endpoint)
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
    Ok((header_name, header_value))
}
