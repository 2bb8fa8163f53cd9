//! Main MessengerClient

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Serialize;
use serde_json::Value;

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::config::parse_header;
use crate::error::ConfigError;
use crate::outcome::Outcome;

/// The client for the messenger backend.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks. It holds no per-call state: concurrent calls each own their
/// request and response.
///
/// # Example
///
/// ```ignore
/// use messenger_lib::MessengerClient;
/// use reqwest::Method;
///
/// let client = MessengerClient::builder()
///     .url("http://localhost:8080")
///     .build()?;
///
/// let outcome = client.call("/health", Method::GET, None).await;
/// ```
#[derive(Clone)]
pub struct MessengerClient {
    inner: Arc<MessengerClientInner>,
}

struct MessengerClientInner {
    config: ClientConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
    http_client: Client,
}

impl MessengerClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> MessengerClientBuilder<Missing> {
        MessengerClientBuilder::new()
    }

    /// Creates a client from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self::with_parts(config, None, builder.build()?))
    }

    /// Returns a client with the same configuration and connection pool that
    /// authenticates with `provider`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = MessengerClient::from_config(ClientConfig::from_env()?)?
    ///     .with_token_provider(StaticTokenProvider::new(token));
    /// ```
    pub fn with_token_provider<T: TokenProvider + 'static>(&self, provider: T) -> Self {
        Self::with_parts(
            self.inner.config.clone(),
            Some(Arc::new(provider)),
            self.inner.http_client.clone(),
        )
    }

    fn with_parts(
        config: ClientConfig,
        token_provider: Option<Arc<dyn TokenProvider>>,
        http_client: Client,
    ) -> Self {
        Self {
            inner: Arc::new(MessengerClientInner {
                config,
                token_provider,
                http_client,
            }),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Calls `endpoint` with an optional JSON body.
    ///
    /// Never fails: see [`Outcome`] for how transport and server failures
    /// are reported.
    pub async fn call(&self, endpoint: &str, method: Method, body: Option<&Value>) -> Outcome {
        let mut call = self.request(method, endpoint);
        if let Some(body) = body {
            call = call.json(body);
        }
        call.send().await
    }

    /// Starts a request that can carry extra headers.
    pub fn request(&self, method: Method, endpoint: &str) -> Call<'_> {
        Call {
            client: self,
            method,
            endpoint: endpoint.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    async fn execute(&self, call: Call<'_>) -> Outcome {
        let url = self.inner.config.endpoint_url(&call.endpoint);

        let body = match call.body.transpose() {
            Ok(body) => body,
            Err(cause) => {
                warn!("{} {}: {}", call.method, url, cause);
                return Outcome::transport_failure(cause);
            }
        };

        let headers = match self.headers_for(&call.headers).await {
            Ok(headers) => headers,
            Err(err) => {
                warn!("{} {}: {}", call.method, url, err);
                return Outcome::transport_failure(err);
            }
        };

        debug!("{} {}", call.method, url);

        let mut request = self
            .inner
            .http_client
            .request(call.method.clone(), &url)
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        if let Some(timeout) = self.inner.config.timeout() {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let cause = error_chain(&err);
                warn!("{} {} failed: {}", call.method, url, cause);
                return Outcome::transport_failure(cause);
            }
        };

        let status = response.status();
        debug!("{} {} -> {}", call.method, url, status);

        // A body that fails mid-read is reported like an unparsable one.
        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Failed to read response body from {}: {}", url, error_chain(&err));
                Default::default()
            }
        };

        Outcome::from_response(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &body,
        )
    }

    /// Merges headers, later sources overriding earlier ones: JSON defaults,
    /// configured defaults, the bearer token, then per-call overrides.
    async fn headers_for(&self, overrides: &[(String, String)]) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in self.inner.config.default_headers() {
            headers.insert(name.clone(), value.clone());
        }

        if let Some(provider) = &self.inner.token_provider
            && let Some(token) = provider.get_token().await
        {
            let value = HeaderValue::from_str(&token.as_bearer())
                .map_err(|_| ConfigError::InvalidHeader(AUTHORIZATION.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in overrides {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for MessengerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerClient")
            .field("config", &self.inner.config)
            .field("token_provider", &self.inner.token_provider.is_some())
            .finish()
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// =============================================================================
// Call
// =============================================================================

/// A single request being prepared. Created by [`MessengerClient::request`].
///
/// # Example
///
/// ```ignore
/// let outcome = client
///     .request(Method::POST, "/login")
///     .header("X-Request-Id", "42")
///     .json(&credentials)
///     .send()
///     .await;
/// ```
#[must_use = "a call does nothing until `send` is awaited"]
pub struct Call<'a> {
    client: &'a MessengerClient,
    method: Method,
    endpoint: String,
    headers: Vec<(String, String)>,
    body: Option<Result<Vec<u8>, String>>,
}

impl<'a> Call<'a> {
    /// Adds a header for this call only, overriding any default of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    ///
    /// A body that cannot be encoded makes the call resolve to a transport
    /// failure without anything being sent.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(
            serde_json::to_vec(body).map_err(|e| format!("Failed to encode request body: {}", e)),
        );
        self
    }

    /// Sends the request and normalizes the response.
    pub async fn send(self) -> Outcome {
        let client = self.client;
        client.execute(self).await
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`MessengerClient`].
///
/// Uses the typestate pattern to ensure the base URL is set at compile time.
///
/// # Example
///
/// ```ignore
/// let client = MessengerClient::builder()
///     .url("http://localhost:8080")
///     .header("X-Client", "desktop")
///     .timeout(Duration::from_secs(30))
///     .token_provider(StaticTokenProvider::new(token))
///     .build()?;
/// ```
pub struct MessengerClientBuilder<Url> {
    url: Url,
    headers: Vec<(String, String)>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl MessengerClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            headers: Vec::new(),
            token_provider: None,
            timeout: Some(crate::config::DEFAULT_TIMEOUT),
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the backend base URL.
    ///
    /// # Example
    ///
    /// ```ignore
    /// .url("https://chat.example.com/api")
    /// ```
    pub fn url(self, url: impl Into<String>) -> MessengerClientBuilder<Set<String>> {
        MessengerClientBuilder {
            url: Set(url.into()),
            headers: self.headers,
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for MessengerClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> MessengerClientBuilder<U> {
    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the provider of bearer tokens.
    pub fn token_provider<T: TokenProvider + 'static>(mut self, provider: T) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the request timeout. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the request timeout, leaving timing to the transport.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl MessengerClientBuilder<Set<String>> {
    /// Builds the [`MessengerClient`].
    ///
    /// This method is only available once `url` has been set. It fails if the
    /// URL or a header is invalid.
    pub fn build(self) -> Result<MessengerClient, ConfigError> {
        let mut config = ClientConfig::new(&self.url.0)?
            .with_timeout(self.timeout)
            .with_connect_timeout(self.connect_timeout);

        for (name, value) in &self.headers {
            config = config.with_header(name, value)?;
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(MessengerClient::with_parts(
            config,
            self.token_provider,
            http_client,
        ))
    }
}
