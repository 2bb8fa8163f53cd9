//! Request error types

/// A request that did not succeed, converted from an
/// [`Outcome`](crate::Outcome) by [`Outcome::into_result`](crate::Outcome::into_result).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No response was received (DNS, connection refused, timeout).
    #[error("{message}")]
    Transport {
        /// Display message.
        message: String,
        /// Underlying transport cause, if known.
        cause: Option<String>,
    },

    /// A response was received but did not indicate success.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Display message, chosen by [`format_error_message`](crate::format_error_message).
        message: String,
    },
}

impl RequestError {
    /// Returns the HTTP status code if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// Returns `true` if the server was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
