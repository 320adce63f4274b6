use crate::{gateway::config::GatewayConfig, APP_USER_AGENT};
use axum::{body::Bytes, http::StatusCode};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, instrument};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";

/// Raw backend reply; the body is kept as bytes so it can be forwarded unchanged.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// One JSON `POST` against the identity backend.
pub trait BackendClient: Send + Sync {
    fn post_json(
        &self,
        path: &str,
        payload: &Value,
    ) -> impl Future<Output = Result<BackendResponse, reqwest::Error>> + Send;
}

/// `reqwest` backed client. No timeout and no retries: a slow or failing backend surfaces
/// as a single error for the caller to collapse.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: GatewayConfig,
}

impl HttpBackend {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self { client, config })
    }
}

impl BackendClient for HttpBackend {
    #[instrument(skip(self, payload))]
    async fn post_json(&self, path: &str, payload: &Value) -> Result<BackendResponse, reqwest::Error> {
        let url = self.config.backend_endpoint(path);

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("backend {url} replied {status}");

        Ok(BackendResponse { status, body })
    }
}
