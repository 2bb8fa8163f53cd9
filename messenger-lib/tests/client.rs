//! Integration tests for `MessengerClient` against a local HTTP server.
//!
//! Each test binds its own server on an ephemeral port and answers every
//! request through a handler, recording what was received.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use messenger_lib::Method;
use messenger_lib::MessengerClient;
use messenger_lib::NETWORK_ERROR_MESSAGE;
use messenger_lib::api::username_taken_hint;
use messenger_lib::auth::StaticTokenProvider;
use messenger_lib::model::Credentials;
use messenger_lib::model::User;
use messenger_lib::validation::RegistrationForm;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;

// =============================================================================
// Test server
// =============================================================================

#[derive(Debug, Clone)]
struct Received {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

type Handler = fn(&Received) -> (u16, &'static str);

struct TestServer {
    url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl TestServer {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = received.clone();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let log = log.clone();
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body
                                .collect()
                                .await
                                .map(|collected| collected.to_bytes())
                                .unwrap_or_default();

                            let request = Received {
                                method: parts.method.to_string(),
                                path: parts.uri.path().to_string(),
                                headers: parts
                                    .headers
                                    .iter()
                                    .map(|(k, v)| {
                                        (k.to_string(), v.to_str().unwrap_or_default().to_string())
                                    })
                                    .collect(),
                                body: body.to_vec(),
                            };

                            let (status, response_body) = handler(&request);
                            log.lock().unwrap().push(request);

                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .body(Full::new(Bytes::from_static(response_body.as_bytes())))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            url: format!("http://{}", addr),
            received,
        }
    }

    fn client(&self) -> MessengerClient {
        MessengerClient::builder().url(&self.url).build().unwrap()
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

/// Returns a local address nothing is listening on.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_connection_refused() {
    let client = MessengerClient::builder()
        .url(closed_port_url().await)
        .build()
        .unwrap();

    let outcome = client.call("/health", Method::GET, None).await;

    assert!(!outcome.success);
    assert!(!outcome.transport_ok);
    assert_eq!(outcome.http_status, 0);
    assert_eq!(outcome.message, NETWORK_ERROR_MESSAGE);
    assert!(outcome.transport_error.is_some());
    assert_eq!(outcome.error_message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let client = MessengerClient::builder()
        .url(format!("http://{}", addr))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let outcome = client.health().await;

    assert!(outcome.is_transport_failure());
    assert!(outcome.data.is_none());
}

// =============================================================================
// Response normalization
// =============================================================================

#[tokio::test]
async fn test_success_payload() {
    let server =
        TestServer::start(|_| (200, r#"{"success":true,"data":{"id":1,"login":"bob"}}"#)).await;

    let outcome = server.client().call("/user/me", Method::GET, None).await;

    assert!(outcome.success);
    assert!(outcome.transport_ok);
    assert_eq!(outcome.http_status, 200);
    assert_eq!(outcome.data, Some(json!({"id": 1, "login": "bob"})));
}

#[tokio::test]
async fn test_unparsable_error_body() {
    let server = TestServer::start(|_| (409, "<html>Conflict</html>")).await;

    let outcome = server.client().call("/register", Method::POST, None).await;

    assert!(!outcome.success);
    assert!(!outcome.transport_ok);
    assert_eq!(outcome.http_status, 409);
    assert!(outcome.message.contains("409"));
}

#[tokio::test]
async fn test_server_failure_with_message() {
    let server = TestServer::start(|_| {
        (
            409,
            r#"{"success":false,"message":"User with this login already exists"}"#,
        )
    })
    .await;

    let credentials = RegistrationForm::new("bob", "secret1", "secret1")
        .into_credentials()
        .unwrap();
    let outcome = server.client().register(&credentials).await;

    assert!(!outcome.success);
    assert!(outcome.is_conflict());
    assert_eq!(outcome.error_message(), "User with this login already exists");
    assert_eq!(
        username_taken_hint(&outcome).unwrap().message,
        "This username is already taken"
    );
}

#[tokio::test]
async fn test_empty_error_body_formats_status() {
    let server = TestServer::start(|_| (500, "{}")).await;

    let outcome = server.client().call("/health", Method::GET, None).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error_message(), "Server error (500)");
}

#[tokio::test]
async fn test_unauthorized() {
    let server = TestServer::start(|_| (401, r#"{"success":false,"message":"Unauthorized"}"#)).await;

    let outcome = server.client().current_user().await;

    assert!(outcome.is_unauthorized());
    assert!(!outcome.success);
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_register_request() {
    let server = TestServer::start(|_| {
        (
            201,
            r#"{"success":true,"message":"User registered successfully","data":{"id":3,"login":"alice"}}"#,
        )
    })
    .await;

    let outcome = server
        .client()
        .register(&Credentials::new("alice", "secret1"))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.message, "User registered successfully");
    assert_eq!(
        outcome.data,
        Some(User {
            id: 3,
            login: "alice".into()
        })
    );

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/register");
    assert_eq!(received[0].header("content-type"), Some("application/json"));
    assert_eq!(
        received[0].json(),
        json!({"login": "alice", "password": "secret1"})
    );
}

#[tokio::test]
async fn test_login_token_then_authorized_call() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/login" => (
            200,
            r#"{"success":true,"data":{"id":3,"login":"alice","token":"tok-123"}}"#,
        ),
        _ => (200, r#"{"success":true,"data":{"id":3,"login":"alice"}}"#),
    })
    .await;

    let session = server
        .client()
        .login(&Credentials::new("alice", "secret1"))
        .await
        .data
        .unwrap();
    let token = session.access_token().unwrap();

    let authorized = MessengerClient::builder()
        .url(&server.url)
        .token_provider(StaticTokenProvider::from_token(token))
        .build()
        .unwrap();
    let outcome = authorized.current_user().await;

    assert!(outcome.success);
    let received = server.received();
    assert_eq!(received[0].header("authorization"), None);
    assert_eq!(received[1].path, "/user/me");
    assert_eq!(received[1].header("authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_base_url_prefix_and_call_headers() {
    let server = TestServer::start(|_| (200, r#"{"success":true}"#)).await;

    let client = MessengerClient::builder()
        .url(format!("{}/api/", server.url))
        .header("X-Client", "tests")
        .build()
        .unwrap();
    let outcome = client
        .request(Method::GET, "/health")
        .header("X-Client", "override")
        .send()
        .await;

    assert!(outcome.success);
    let received = server.received();
    assert_eq!(received[0].path, "/api/health");
    assert_eq!(received[0].header("x-client"), Some("override"));
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(|_| {
        (
            200,
            r#"{"success":true,"message":"Server is running","data":{"status":"healthy"}}"#,
        )
    })
    .await;

    let outcome = server.client().health().await;

    assert!(outcome.success);
    assert!(outcome.data.unwrap().is_healthy());
    assert_eq!(server.received()[0].method, "GET");
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/ok" => (200, r#"{"success":true}"#),
        _ => (404, "not found"),
    })
    .await;
    let client = server.client();

    let calls = (0..10).map(|i| {
        let client = client.clone();
        async move {
            let endpoint = if i % 2 == 0 { "/ok" } else { "/missing" };
            client.call(endpoint, Method::GET, None).await
        }
    });
    let outcomes = futures::future::join_all(calls).await;

    for (i, outcome) in outcomes.iter().enumerate() {
        if i % 2 == 0 {
            assert!(outcome.success);
        } else {
            assert_eq!(outcome.http_status, 404);
            assert_eq!(outcome.message, "Server returned 404: Not Found");
        }
    }
    assert_eq!(server.received().len(), 10);
}
