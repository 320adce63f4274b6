//! Data access layer for callers of the gateway.
//!
//! Every request goes out with the session cookie jar attached and a JSON content type unless
//! the caller overrides it. Non-success responses are folded into a [`NormalizedError`] so
//! callers handle one error shape regardless of what the server sent.

mod errors;

pub use self::errors::{ClientError, NormalizedError};

use crate::{
    types::{LoginRequest, MessageBody, RegisterRequest, SessionUser},
    APP_USER_AGENT,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout applied to every call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";

/// Method, extra headers and optional body of a single call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns [`ClientError::Encode`] if `body` cannot be serialized.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_string(body).map_err(ClientError::Encode)?);
        Ok(self)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Client bound to `base_url`, carrying cookies across calls.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one call and decode the success body as `T`.
    ///
    /// # Errors
    /// [`ClientError::Http`] for any non-success status, otherwise transport, URL or decode
    /// failures.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let url = build_url_with_base(&self.base_url, path);
        let url =
            reqwest::Url::parse(&url).map_err(|err| ClientError::Url(format!("{url}: {err}")))?;

        debug!("{} {}", options.method, url);

        let mut request = self
            .client
            .request(options.method, url)
            .headers(merge_headers(&options.headers));

        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(NormalizedError::from_response(status, &body).into());
        }

        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    /// # Errors
    /// Returns a [`ClientError`] if the credentials are rejected or the call fails.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<SessionUser, ClientError> {
        self.request(LOGIN_ENDPOINT, RequestOptions::post().json(credentials)?)
            .await
    }

    /// The backend's registration response is returned as-is.
    ///
    /// # Errors
    /// Returns a [`ClientError`] if registration is rejected or the call fails.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<Value, ClientError> {
        self.request(REGISTER_ENDPOINT, RequestOptions::post().json(registration)?)
            .await
    }

    /// # Errors
    /// Returns a [`ClientError`] if the call fails.
    pub async fn logout(&self) -> Result<MessageBody, ClientError> {
        self.request(LOGOUT_ENDPOINT, RequestOptions::post()).await
    }
}

/// JSON content type by default; any header the caller sets replaces the default of the same
/// name.
fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for name in overrides.keys() {
        headers.remove(name);
    }
    for (name, value) in overrides {
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn build_url_with_base(base_url: &str, path: &str) -> String {
    let path = path.trim();

    if base_url.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldError;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn merge_headers_defaults_to_json() {
        let headers = merge_headers(&HeaderMap::new());
        assert_eq!(
            headers.get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn merge_headers_caller_wins() {
        let mut overrides = HeaderMap::new();
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        overrides.insert("x-trace", HeaderValue::from_static("abc"));

        let headers = merge_headers(&overrides);
        assert_eq!(
            headers.get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/plain"))
        );
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(
            headers.get("x-trace"),
            Some(&HeaderValue::from_static("abc"))
        );
    }

    #[test]
    fn build_url_joins_base_and_path() {
        assert_eq!(
            build_url_with_base("http://gw", "/api/auth/login"),
            "http://gw/api/auth/login"
        );
        assert_eq!(
            build_url_with_base("http://gw", "api/auth/login"),
            "http://gw/api/auth/login"
        );
        assert_eq!(build_url_with_base("", "/api/auth/login"), "/api/auth/login");
    }

    #[test]
    fn new_trims_trailing_slash() -> Result<(), ClientError> {
        let client = ApiClient::new("http://localhost:3000/")?;
        assert_eq!(client.base_url(), "http://localhost:3000");
        Ok(())
    }

    #[tokio::test]
    async fn relative_url_without_base_is_rejected() -> Result<(), ClientError> {
        let client = ApiClient::new("")?;
        let result: Result<Value, _> = client.request("/api/thing", RequestOptions::get()).await;
        assert!(matches!(result, Err(ClientError::Url(_))));
        Ok(())
    }

    #[tokio::test]
    async fn success_decodes_body() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/thing"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())?;
        let value: Value = client.request("/api/thing", RequestOptions::get()).await?;
        assert_eq!(value, json!({"ok": true}));
        Ok(())
    }

    #[tokio::test]
    async fn method_body_and_headers_are_forwarded() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/thing"))
            .and(header("x-trace", "abc"))
            .and(body_json(json!({"name": "value"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())?;
        let options = RequestOptions {
            method: Method::PUT,
            ..RequestOptions::default()
        }
        .json(&json!({"name": "value"}))?
        .header(
            HeaderName::from_static("x-trace"),
            HeaderValue::from_static("abc"),
        );
        let _: Value = client.request("/api/thing", options).await?;
        Ok(())
    }

    #[tokio::test]
    async fn failure_uses_body_message_and_field_errors() -> Result<(), Box<dyn std::error::Error>>
    {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Validation failed",
                "fieldErrors": [{"field": "email", "message": "Invalid email"}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())?;
        let registration = RegisterRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("bad".to_string()),
            phone: None,
            password: SecretString::from("Pass1234"),
        };

        let err = client
            .register(&registration)
            .await
            .err()
            .and_then(|err| err.normalized().cloned());

        assert_eq!(
            err,
            Some(NormalizedError {
                status: 400,
                message: "Validation failed".to_string(),
                field_errors: vec![FieldError {
                    field: "email".to_string(),
                    message: "Invalid email".to_string(),
                }],
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn failure_without_body_uses_status_text() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad</html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())?;

        let err = client
            .request::<Value>("/empty", RequestOptions::get())
            .await
            .err();
        let normalized = err.as_ref().and_then(ClientError::normalized);
        assert_eq!(normalized.map(|e| e.message.as_str()), Some("Internal Server Error"));
        assert_eq!(normalized.map(|e| e.field_errors.len()), Some(0));

        let err = client
            .request::<Value>("/html", RequestOptions::get())
            .await
            .err();
        let normalized = err.as_ref().and_then(ClientError::normalized);
        assert_eq!(normalized.map(|e| e.status), Some(502));
        assert_eq!(normalized.map(|e| e.message.as_str()), Some("Bad Gateway"));
        Ok(())
    }

    #[tokio::test]
    async fn cookies_are_sent_on_later_calls() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "auth_token=jwt; Path=/; HttpOnly")
                    .set_body_json(json!({
                        "user": {
                            "id": "1",
                            "firstName": "John",
                            "lastName": "Doe",
                            "email": "test@example.com",
                            "phone": null,
                            "role": "USER"
                        }
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("cookie", "auth_token=jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri())?;
        let session = client
            .login(&LoginRequest {
                identifier: "test@example.com".to_string(),
                password: SecretString::from("Pass1234"),
            })
            .await?;
        assert_eq!(session.user.first_name, "John");

        let ack = client.logout().await?;
        assert_eq!(ack.message, "Logged out");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() -> Result<(), ClientError> {
        let client = ApiClient::new("http://127.0.0.1:9")?;
        let result = client.logout().await;
        assert!(matches!(result, Err(ClientError::Network(_))));
        Ok(())
    }
}
