//! Normalized result of an HTTP call

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RequestError;

/// Message of every outcome whose request never reached the server.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to connect to server";

/// Message shown when an outcome carries nothing more specific.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// The uniform result of a request.
///
/// Every call made through [`MessengerClient`](crate::MessengerClient)
/// resolves to an `Outcome`: transport failures, error statuses and
/// unparsable bodies are all folded into this one shape instead of being
/// returned as errors.
///
/// Transport-level fields (`transport_ok`, `http_status`) always come from the
/// HTTP response itself, never from the body, so a server cannot report a
/// failed request as successful.
///
/// # Example
///
/// ```ignore
/// let outcome = client.call("/health", Method::GET, None).await;
///
/// if outcome.success {
///     println!("{:?}", outcome.data);
/// } else {
///     eprintln!("{}", outcome.error_message());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T = Value> {
    /// `true` only if the response was 2xx and the body did not say `success: false`.
    pub success: bool,
    /// The body's `message`, or a synthesized description of the failure.
    pub message: String,
    /// The body's `data`, if present and not `null`.
    pub data: Option<T>,
    /// The body's `error` string, if present.
    pub error: Option<String>,
    /// HTTP status code, `0` if no response was received.
    pub http_status: u16,
    /// `true` iff a response was received with a 2xx status.
    pub transport_ok: bool,
    /// Cause of a transport failure, if one occurred.
    pub transport_error: Option<String>,
}

impl Outcome<Value> {
    /// Creates the outcome of a request that never received a response.
    pub fn transport_failure(cause: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: NETWORK_ERROR_MESSAGE.to_string(),
            data: None,
            error: None,
            http_status: 0,
            transport_ok: false,
            transport_error: Some(cause.to_string()),
        }
    }

    /// Normalizes a received response.
    ///
    /// A body that is not a JSON object is reported as
    /// "`Server returned {status}: {reason}`", or "`Server returned {status}`"
    /// for a status without a known reason. Otherwise the body's `success`,
    /// `message`, `error` and `data` fields are taken as-is and the status
    /// fields are overlaid from the response.
    pub fn from_response(status: u16, reason: &str, body: &[u8]) -> Self {
        let transport_ok = (200..300).contains(&status);

        let mut payload = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(payload)) => payload,
            Ok(_) | Err(_) => {
                warn!("Unparsable response body (HTTP {}, {} bytes)", status, body.len());
                return Self {
                    success: false,
                    message: if reason.is_empty() {
                        format!("Server returned {}", status)
                    } else {
                        format!("Server returned {}: {}", status, reason)
                    },
                    data: None,
                    error: None,
                    http_status: status,
                    transport_ok,
                    transport_error: None,
                };
            }
        };

        let explicit_failure = payload.get("success").and_then(Value::as_bool) == Some(false);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = payload.remove("data").filter(|data| !data.is_null());

        Self {
            success: transport_ok && !explicit_failure,
            message,
            data,
            error,
            http_status: status,
            transport_ok,
            transport_error: None,
        }
    }

    /// Converts the JSON `data` into a typed value.
    ///
    /// If a successful outcome's data does not fit `T`, the outcome becomes a
    /// failure with the message "`Unexpected response data: {cause}`". On an
    /// outcome that already failed, undecodable data is dropped and the
    /// original message kept.
    pub fn decode<T: DeserializeOwned>(self) -> Outcome<T> {
        let Outcome {
            success,
            message,
            data,
            error,
            http_status,
            transport_ok,
            transport_error,
        } = self;

        let decoded = data.map(serde_json::from_value::<T>).transpose();

        match decoded {
            Ok(data) => Outcome {
                success,
                message,
                data,
                error,
                http_status,
                transport_ok,
                transport_error,
            },
            Err(err) => {
                warn!("Response data did not match the expected shape: {}", err);
                Outcome {
                    success: false,
                    message: if success {
                        format!("Unexpected response data: {}", err)
                    } else {
                        message
                    },
                    data: None,
                    error,
                    http_status,
                    transport_ok,
                    transport_error,
                }
            }
        }
    }
}

impl<T> Outcome<T> {
    /// Returns `true` if the server answered 401.
    pub fn is_unauthorized(&self) -> bool {
        self.http_status == 401
    }

    /// Returns `true` if the server answered 409.
    pub fn is_conflict(&self) -> bool {
        self.http_status == 409
    }

    /// Returns `true` if no response was received.
    pub fn is_transport_failure(&self) -> bool {
        self.http_status == 0 && !self.transport_ok
    }

    /// Returns the message to display for a failed outcome.
    ///
    /// See [`format_error_message`].
    pub fn error_message(&self) -> String {
        format_error_message(self)
    }

    /// Converts the outcome into a `Result` for callers that prefer `?`.
    ///
    /// Successful outcomes yield their data (which may be absent).
    pub fn into_result(self) -> Result<Option<T>, RequestError> {
        if self.success {
            return Ok(self.data);
        }

        let message = self.error_message();
        if self.is_transport_failure() {
            Err(RequestError::Transport {
                message,
                cause: self.transport_error,
            })
        } else {
            Err(RequestError::Server {
                status: self.http_status,
                message,
            })
        }
    }
}

/// Picks the message a UI should display for an outcome.
///
/// Precedence:
///
/// 1. the body's `message`, if non-empty
/// 2. the body's `error`, if non-empty
/// 3. "`Server error ({http_status})`" if the transport was not ok
/// 4. [`FALLBACK_ERROR_MESSAGE`]
pub fn format_error_message<T>(outcome: &Outcome<T>) -> String {
    if !outcome.message.is_empty() {
        return outcome.message.clone();
    }
    if let Some(error) = outcome.error.as_deref().filter(|e| !e.is_empty()) {
        return error.to_string();
    }
    if !outcome.transport_ok {
        return format!("Server error ({})", outcome.http_status);
    }
    FALLBACK_ERROR_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    fn outcome(message: &str, error: Option<&str>, transport_ok: bool, http_status: u16) -> Outcome {
        Outcome {
            success: false,
            message: message.to_string(),
            data: None,
            error: error.map(str::to_string),
            http_status,
            transport_ok,
            transport_error: None,
        }
    }

    #[test]
    fn test_transport_failure() {
        let outcome = Outcome::transport_failure("connection refused");
        assert!(!outcome.success);
        assert!(!outcome.transport_ok);
        assert_eq!(outcome.http_status, 0);
        assert_eq!(outcome.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(outcome.transport_error.as_deref(), Some("connection refused"));
        assert!(outcome.is_transport_failure());
    }

    #[test]
    fn test_success_with_data() {
        let body = br#"{"success":true,"data":{"id":1,"login":"bob"}}"#;
        let outcome = Outcome::from_response(200, "OK", body);
        assert!(outcome.success);
        assert!(outcome.transport_ok);
        assert_eq!(outcome.http_status, 200);
        assert_eq!(outcome.data, Some(json!({"id": 1, "login": "bob"})));
    }

    #[test]
    fn test_missing_success_field_follows_status() {
        let outcome = Outcome::from_response(201, "Created", br#"{"message":"ok"}"#);
        assert!(outcome.success);
        assert_eq!(outcome.message, "ok");
    }

    #[test]
    fn test_explicit_failure_on_2xx() {
        let outcome = Outcome::from_response(200, "OK", br#"{"success":false,"message":"nope"}"#);
        assert!(!outcome.success);
        assert!(outcome.transport_ok);
        assert_eq!(outcome.message, "nope");
    }

    #[test]
    fn test_body_cannot_spoof_transport_fields() {
        let body = br#"{"success":true,"ok":true,"status":200,"transportOk":true,"httpStatus":200}"#;
        let outcome = Outcome::from_response(500, "Internal Server Error", body);
        assert!(!outcome.success);
        assert!(!outcome.transport_ok);
        assert_eq!(outcome.http_status, 500);
    }

    #[test]
    fn test_unparsable_body() {
        let outcome = Outcome::from_response(409, "Conflict", b"<html>conflict</html>");
        assert!(!outcome.success);
        assert!(!outcome.transport_ok);
        assert_eq!(outcome.http_status, 409);
        assert_eq!(outcome.message, "Server returned 409: Conflict");
        assert!(outcome.is_conflict());
    }

    #[test]
    fn test_unparsable_body_unknown_reason() {
        let outcome = Outcome::from_response(599, "", b"oops");
        assert!(!outcome.success);
        assert_eq!(outcome.http_status, 599);
        assert_eq!(outcome.message, "Server returned 599");
    }

    #[test]
    fn test_non_object_json_is_unparsable() {
        let outcome = Outcome::from_response(200, "OK", b"[1,2,3]");
        assert!(!outcome.success);
        assert!(outcome.transport_ok);
        assert_eq!(outcome.message, "Server returned 200: OK");
    }

    #[test]
    fn test_null_data_is_absent() {
        let outcome = Outcome::from_response(200, "OK", br#"{"success":true,"data":null}"#);
        assert!(outcome.data.is_none());
    }

    #[test]
    fn test_error_field_is_kept() {
        let outcome = Outcome::from_response(400, "Bad Request", br#"{"error":"bad input"}"#);
        assert_eq!(outcome.error.as_deref(), Some("bad input"));
        assert_eq!(outcome.error_message(), "bad input");
    }

    #[test]
    fn test_format_prefers_message() {
        assert_eq!(format_error_message(&outcome("M", Some("E"), false, 500)), "M");
    }

    #[test]
    fn test_format_falls_back_to_error() {
        assert_eq!(format_error_message(&outcome("", Some("E"), false, 500)), "E");
    }

    #[test]
    fn test_format_synthesizes_server_error() {
        assert_eq!(
            format_error_message(&outcome("", None, false, 500)),
            "Server error (500)"
        );
    }

    #[test]
    fn test_format_generic_fallback() {
        assert_eq!(
            format_error_message(&outcome("", Some(""), true, 200)),
            FALLBACK_ERROR_MESSAGE
        );
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: i64,
        login: String,
    }

    #[test]
    fn test_decode() {
        let body = br#"{"success":true,"data":{"id":1,"login":"bob"}}"#;
        let outcome = Outcome::from_response(200, "OK", body).decode::<User>();
        assert!(outcome.success);
        assert_eq!(
            outcome.data,
            Some(User {
                id: 1,
                login: "bob".into()
            })
        );
    }

    #[test]
    fn test_decode_mismatch_fails_outcome() {
        let body = br#"{"success":true,"data":{"id":"one"}}"#;
        let outcome = Outcome::from_response(200, "OK", body).decode::<User>();
        assert!(!outcome.success);
        assert!(outcome.transport_ok);
        assert!(outcome.data.is_none());
        assert!(outcome.message.starts_with("Unexpected response data:"));
    }

    #[test]
    fn test_decode_mismatch_keeps_failure_message() {
        let body = br#"{"success":false,"message":"User with this login already exists","data":[]}"#;
        let outcome = Outcome::from_response(409, "Conflict", body).decode::<User>();
        assert_eq!(outcome.message, "User with this login already exists");
    }

    #[test]
    fn test_into_result() {
        let ok = Outcome::from_response(200, "OK", br#"{"data":{"a":1}}"#);
        assert_eq!(ok.into_result().unwrap(), Some(json!({"a": 1})));

        let server = Outcome::from_response(500, "Internal Server Error", b"{}");
        let err = server.into_result().unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "Server error (500)");

        let transport = Outcome::transport_failure("refused").into_result().unwrap_err();
        assert!(transport.is_transport());
        assert_eq!(transport.to_string(), NETWORK_ERROR_MESSAGE);
    }
}
