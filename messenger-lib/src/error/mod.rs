//! Error types
//!
//! Nothing on the request path returns these: HTTP calls always resolve to an
//! [`Outcome`](crate::Outcome). They cover client construction, typed form
//! conversion, and callers that opt into `Result` via
//! [`Outcome::into_result`](crate::Outcome::into_result).

mod config;
mod request;
mod validation;

pub use config::*;
pub use request::*;
pub use validation::*;

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid client configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A typed form failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A request completed without success.
    #[error(transparent)]
    Request(#[from] RequestError),
}
