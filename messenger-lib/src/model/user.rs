//! Account models

use serde::Deserialize;
use serde::Serialize;

use crate::auth::AccessToken;

/// Request body of `POST /register` and `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// Data returned by a successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub login: String,
    /// Bearer token, if the server issued one. Persisting it is up to the caller.
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    /// Returns the session token as an [`AccessToken`].
    pub fn access_token(&self) -> Option<AccessToken> {
        self.token.as_deref().map(AccessToken::new)
    }

    /// Returns the user part of the session.
    pub fn user(&self) -> User {
        User {
            id: self.id,
            login: self.login.clone(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Data returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_credentials_body() {
        let body = serde_json::to_value(Credentials::new("bob", "secret1")).unwrap();
        assert_eq!(body, json!({"login": "bob", "password": "secret1"}));
    }

    #[test]
    fn test_session_without_token() {
        let session: Session = serde_json::from_value(json!({"id": 7, "login": "bob"})).unwrap();
        assert!(session.access_token().is_none());
        assert_eq!(session.user(), User { id: 7, login: "bob".into() });
    }

    #[test]
    fn test_session_token() {
        let session: Session =
            serde_json::from_value(json!({"id": 7, "login": "bob", "token": "abc"})).unwrap();
        assert_eq!(session.access_token().unwrap().as_bearer(), "Bearer abc");
        assert!(!format!("{:?}", session).contains("abc"));
    }
}
