//! TokenProvider trait and AccessToken

use async_trait::async_trait;

/// A bearer token issued by the server at login.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The raw token value.
    pub access_token: String,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Supplies the bearer token attached to outgoing requests.
///
/// The client never stores tokens itself. Implementors decide where tokens
/// live (memory, keychain, a browser's local storage) and return `None` when
/// no user is signed in, in which case no `Authorization` header is sent.
///
/// # Example
///
/// ```ignore
/// use std::sync::RwLock;
/// use async_trait::async_trait;
/// use messenger_lib::auth::{AccessToken, TokenProvider};
///
/// struct SessionStore {
///     token: RwLock<Option<AccessToken>>,
/// }
///
/// #[async_trait]
/// impl TokenProvider for SessionStore {
///     async fn get_token(&self) -> Option<AccessToken> {
///         self.token.read().ok()?.clone()
///     }
/// }
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the current token, if any.
    async fn get_token(&self) -> Option<AccessToken>;
}

/// A token provider that always returns the same static token.
///
/// # Example
///
/// ```
/// use messenger_lib::auth::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("my-access-token");
/// ```
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    /// Creates a new static token provider with the given token value.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(access_token),
        }
    }

    /// Creates a new static token provider from an existing AccessToken.
    pub fn from_token(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Option<AccessToken> {
        Some(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_bearer() {
        assert_eq!(AccessToken::new("abc").as_bearer(), "Bearer abc");
    }

    #[test]
    fn test_debug_redacts() {
        assert!(!format!("{:?}", AccessToken::new("abc")).contains("abc"));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.get_token().await, Some(AccessToken::new("abc")));
    }
}
