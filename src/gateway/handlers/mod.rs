//! Client-facing route handlers and the shared proxy plumbing.
//!
//! Every proxy path ends in a well-formed response: backend replies are forwarded as-is,
//! and anything that goes wrong on the way collapses into [`ProxyError`], which always
//! renders the same generic 500 body.

pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
pub mod register;

use crate::{
    gateway::{
        backend::{BackendClient, BackendResponse},
        session::CookieError,
    },
    types::MessageBody,
};
use axum::{
    extract::rejection::BytesRejection,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::de::IgnoredAny;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Failures inside a proxy handler. The cause is logged, never sent to the browser.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request body is not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend response is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("request body could not be read: {0}")]
    Body(#[from] BytesRejection),
    #[error("session cookie cannot be written: {0}")]
    Cookie(#[from] CookieError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("{self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageBody::new(INTERNAL_ERROR_MESSAGE)),
        )
            .into_response()
    }
}

/// Decode the inbound body so it can be forwarded as JSON.
pub(crate) fn parse_payload(body: &[u8]) -> Result<Value, ProxyError> {
    serde_json::from_slice(body).map_err(ProxyError::Payload)
}

/// Single call to the backend; no retry.
pub(crate) async fn forward<B: BackendClient>(
    backend: &B,
    path: &str,
    body: &[u8],
) -> Result<BackendResponse, ProxyError> {
    let payload = parse_payload(body)?;
    Ok(backend.post_json(path, &payload).await?)
}

/// Return the backend's status and body byte for byte. The body must still be JSON.
pub(crate) fn passthrough(reply: BackendResponse) -> Result<Response, ProxyError> {
    serde_json::from_slice::<IgnoredAny>(&reply.body).map_err(ProxyError::MalformedResponse)?;

    Ok((
        reply.status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        reply.body,
    )
        .into_response())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::gateway::backend::{BackendClient, BackendResponse};
    use axum::{body::Bytes, http::StatusCode};
    use serde_json::Value;
    use std::sync::Mutex;

    /// Canned backend recording every call it receives.
    #[derive(Debug)]
    pub(crate) struct StubBackend {
        reply: Result<(StatusCode, String), ()>,
        pub(crate) calls: Mutex<Vec<(String, Value)>>,
    }

    impl StubBackend {
        pub(crate) fn replying(status: StatusCode, body: impl Into<String>) -> Self {
            Self {
                reply: Ok((status, body.into())),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every call fails as if the backend refused the connection.
        pub(crate) fn unreachable() -> Self {
            Self {
                reply: Err(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().map_or(0, |calls| calls.len())
        }
    }

    impl BackendClient for StubBackend {
        async fn post_json(
            &self,
            path: &str,
            payload: &Value,
        ) -> Result<BackendResponse, reqwest::Error> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((path.to_string(), payload.clone()));
            }
            match &self.reply {
                Ok((status, body)) => Ok(BackendResponse {
                    status: *status,
                    body: Bytes::from(body.clone()),
                }),
                Err(()) => Err(refused().await),
            }
        }
    }

    /// A genuine transport error from a request nobody is listening for.
    async fn refused() -> reqwest::Error {
        match reqwest::Client::new()
            .post("http://127.0.0.1:9/refused")
            .send()
            .await
        {
            Err(err) => err,
            Ok(_) => panic!("nothing should listen on the discard port"),
        }
    }
}
