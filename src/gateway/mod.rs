pub mod backend;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod openapi;
pub mod session;

use self::{
    backend::HttpBackend,
    config::GatewayConfig,
    handlers::pages,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

/// Shared per-process state: immutable config and the backend client.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<GatewayConfig>,
    backend: HttpBackend,
}

impl AppState {
    /// # Errors
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let backend =
            HttpBackend::new(config.clone()).context("Failed to build backend HTTP client")?;

        Ok(Self {
            config: Arc::new(config),
            backend,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }
}

/// Full application router: documented API routes, pages, and the route guard in front of
/// all of them.
pub fn router(state: AppState) -> Router {
    let (api, _openapi) = openapi::api_router().split_for_parts();

    api.route("/", get(pages::home))
        .route("/login", get(pages::login_page))
        .route("/register", get(pages::register_page))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/*rest", get(pages::dashboard))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::openapi()) }),
        )
        .layer(middleware::from_fn(guard::route_guard))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
        .with_state(state)
}

/// Start the gateway and serve until ctrl-c.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn new(port: u16, config: GatewayConfig) -> Result<()> {
    info!(
        "Backend {} ({:?})",
        config.backend_url(),
        config.environment()
    );

    let app = router(AppState::new(config)?);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
