//! Registration, login and health operations
//!
//! Typed wrappers over [`MessengerClient::request`]: each one sends a single
//! request and decodes the `data` of the response.
//!
//! # Example
//!
//! ```ignore
//! use messenger_lib::validation::LoginForm;
//!
//! let credentials = LoginForm::new("bob", "secret1").into_credentials()?;
//! let outcome = client.login(&credentials).await;
//!
//! match outcome.data {
//!     Some(session) if outcome.success => store(session.token),
//!     _ => eprintln!("{}", outcome.error_message()),
//! }
//! ```

use reqwest::Method;

use super::endpoints;
use crate::MessengerClient;
use crate::error::FieldValidationError;
use crate::model::Credentials;
use crate::model::HealthStatus;
use crate::model::Session;
use crate::model::User;
use crate::outcome::Outcome;
use crate::validation::LOGIN_FIELD;

/// Field message shown when registration fails because the login is taken.
pub const USERNAME_TAKEN_MESSAGE: &str = "This username is already taken";

impl MessengerClient {
    /// Checks that the backend is up (`GET /health`).
    pub async fn health(&self) -> Outcome<HealthStatus> {
        self.request(Method::GET, endpoints::HEALTH)
            .send()
            .await
            .decode()
    }

    /// Registers a new account (`POST /register`).
    pub async fn register(&self, credentials: &Credentials) -> Outcome<User> {
        self.request(Method::POST, endpoints::REGISTER)
            .json(credentials)
            .send()
            .await
            .decode()
    }

    /// Signs in (`POST /login`).
    ///
    /// The returned [`Session`] may carry a token; persisting it is up to
    /// the caller.
    pub async fn login(&self, credentials: &Credentials) -> Outcome<Session> {
        self.request(Method::POST, endpoints::LOGIN)
            .json(credentials)
            .send()
            .await
            .decode()
    }

    /// Fetches the signed-in user (`GET /user/me`).
    pub async fn current_user(&self) -> Outcome<User> {
        self.request(Method::GET, endpoints::CURRENT_USER)
            .send()
            .await
            .decode()
    }
}

/// Maps a failed registration to a field error on `login` when the server
/// reports that the account already exists.
pub fn username_taken_hint<T>(outcome: &Outcome<T>) -> Option<FieldValidationError> {
    if outcome.success {
        return None;
    }

    outcome
        .message
        .to_lowercase()
        .contains("exists")
        .then(|| FieldValidationError::new(LOGIN_FIELD, USERNAME_TAKEN_MESSAGE))
}
