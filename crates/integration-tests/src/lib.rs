//! Integration tests for OpenWaitlist.
//!
//! Tests drive the full axum application in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory [`MemoryStore`] and
//! `tower_sessions::MemoryStore`, so no database or network is needed.
//! The `postgres_store` suite is the exception: it runs against the server
//! named by `DATABASE_URL` and skips itself when that is unset.
//! Each request carries a `ConnectInfo` peer address, as the server's
//! listener would attach.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p openwaitlist-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Signup, login, sessions and tokens
//! - `waitlist_lifecycle` - Create, rename and archive flows
//! - `ownership` - Cross-user isolation
//! - `store_unavailable` - Store failures and health checks
//! - `postgres_store` - Migrations and queries against `PostgreSQL`

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use openwaitlist_server::config::{Environment, ServerConfig};
use openwaitlist_server::db::MemoryStore;
use openwaitlist_server::routes;
use openwaitlist_server::state::AppState;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Configuration for in-process tests.
///
/// # Panics
///
/// Never in practice; the literals below are valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/openwaitlist_test".to_string()),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "debug".to_string(),
        environment: Environment::Development,
        jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%eF8".to_string()),
        base_url: Url::parse("http://localhost:8080").unwrap(),
        avatar_path: PathBuf::from("./data/avatars"),
        token_duration: Duration::from_secs(60 * 60),
        cookie_duration: Duration::from_secs(24 * 60 * 60),
        trust_proxy: false,
        sentry_dsn: None,
    }
}

/// How a test request identifies its caller.
#[derive(Debug, Clone)]
pub enum Credentials {
    Anonymous,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `X-JWT: <token>`
    XJwt(String),
    /// `Cookie: <name=value>`
    Cookie(String),
}

/// Status, headers and parsed body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, `Value::String` for non-JSON text, `Value::Null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// The `name=value` part of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("ow_session="))
            .and_then(|v| v.split(';').next())
            .map(str::to_owned)
    }
}

/// Attach the peer address the server would see for a client at `ip`.
///
/// # Panics
///
/// Panics if `ip` is not an IP address.
#[allow(clippy::unwrap_used)]
pub fn from_client(mut request: Request<Body>, ip: &str) -> Request<Body> {
    let ip: IpAddr = ip.parse().unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::new(ip, 40_000)));
    request
}

/// The application under test plus handles to its backing store.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    next_ip: AtomicU32,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh application with empty stores.
    ///
    /// # Panics
    ///
    /// Panics if the router cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(test_config(), store.clone());
        let router = routes::app(state, tower_sessions::MemoryStore::default()).unwrap();

        Self {
            router,
            store,
            next_ip: AtomicU32::new(1),
        }
    }

    /// A distinct client address per call, keeping rate limit buckets apart.
    fn client_ip(&self) -> String {
        let n = self.next_ip.fetch_add(1, Ordering::Relaxed);
        format!("10.{}.{}.{}", (n >> 16) & 0xff, (n >> 8) & 0xff, n & 0xff)
    }

    /// Send a request from a fresh client address.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        credentials: &Credentials,
    ) -> TestResponse {
        let ip = self.client_ip();
        self.request_from(&ip, method, uri, body, credentials).await
    }

    /// Send a request from a fixed client address.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn request_from(
        &self,
        ip: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
        credentials: &Credentials,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        builder = match credentials {
            Credentials::Anonymous => builder,
            Credentials::Bearer(token) => {
                builder.header(header::AUTHORIZATION, format!("Bearer {token}"))
            }
            Credentials::XJwt(token) => builder.header("x-jwt", token.as_str()),
            Credentials::Cookie(cookie) => builder.header(header::COOKIE, cookie.as_str()),
        };

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(from_client(request, ip)).await
    }

    /// Send a pre-built request.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/signup",
            Some(serde_json::json!({ "email": email, "password": password })),
            &Credentials::Anonymous,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/local/login",
            Some(serde_json::json!({ "email": email, "password": password })),
            &Credentials::Anonymous,
        )
        .await
    }

    /// Sign up and log in, returning bearer credentials.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    pub async fn bearer_user(&self, email: &str) -> Credentials {
        assert_eq!(self.signup(email, TEST_PASSWORD).await.status, StatusCode::CREATED);
        let login = self.login(email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);

        let token = login.body["token"].as_str().map(str::to_owned);
        Credentials::Bearer(token.unwrap_or_default())
    }

    /// Sign up and log in, returning session cookie credentials.
    ///
    /// # Panics
    ///
    /// Panics if either step fails or no cookie is set.
    pub async fn session_user(&self, email: &str) -> Credentials {
        assert_eq!(self.signup(email, TEST_PASSWORD).await.status, StatusCode::CREATED);
        let login = self.login(email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);

        let cookie = login.session_cookie();
        assert!(cookie.is_some(), "login did not set a session cookie");
        Credentials::Cookie(cookie.unwrap_or_default())
    }

    /// Create a waitlist and return its slug.
    ///
    /// # Panics
    ///
    /// Panics unless the API answers 201.
    pub async fn create_waitlist(&self, credentials: &Credentials, name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/waitlists",
                Some(serde_json::json!({ "name": name })),
                credentials,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["slug"].as_str().unwrap_or_default().to_owned()
    }
}
