use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Deployment environment, only used to decide the cookie `Secure` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Immutable gateway settings, built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    backend_url: String,
    api_base_url: String,
    environment: Environment,
}

impl GatewayConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns an error if `backend_url` is not an absolute URL, or if `api_base_url` is
    /// neither empty nor an absolute URL.
    pub fn new(backend_url: &str, api_base_url: &str, environment: Environment) -> Result<Self> {
        let backend_url = normalize_base(backend_url);
        Url::parse(&backend_url).with_context(|| format!("Invalid backend URL: {backend_url}"))?;

        let api_base_url = normalize_base(api_base_url);
        if !api_base_url.is_empty() {
            Url::parse(&api_base_url)
                .with_context(|| format!("Invalid public API base URL: {api_base_url}"))?;
        }

        Ok(Self {
            backend_url,
            api_base_url,
            environment,
        })
    }

    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Prefix used by page scripts to reach the client-facing routes; empty means same origin.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Join a backend path such as `/api/v1/auth/login` onto the backend base URL.
    #[must_use]
    pub fn backend_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_base_url: String::new(),
            environment: Environment::Development,
        }
    }
}

fn normalize_base(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
