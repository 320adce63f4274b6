use super::{forward, passthrough, ProxyError};
use crate::{
    gateway::{
        backend::{BackendClient, LOGIN_PATH},
        config::GatewayConfig,
        session::{CookieJar, CookieOptions, SessionStore, SESSION_COOKIE_NAME},
        AppState,
    },
    types::{LoginRequest, MessageBody, SessionUser},
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// The parts of a successful backend login the gateway acts on. `user` is kept as raw JSON
/// so it reaches the browser exactly as the backend sent it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenExchange {
    access_token: String,
    /// Token lifetime in seconds, used verbatim as the cookie `Max-Age`.
    expires_in: u64,
    user: Value,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookie set", body = SessionUser),
        (status = 400, description = "Backend validation failure, forwarded unchanged"),
        (status = 401, description = "Invalid credentials, forwarded unchanged"),
        (status = 500, description = "Backend unreachable or unreadable", body = MessageBody)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return ProxyError::from(rejection).into_response(),
    };
    let mut jar = CookieJar::from_headers(&headers);

    match exchange_credentials(state.backend(), &mut jar, state.config(), &body).await {
        Ok(response) => (jar, response).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Trade credentials for a backend token and keep it only as the session cookie.
///
/// The cookie is written once, after the backend answered 2xx and its body decoded. Any
/// other backend reply is forwarded untouched.
///
/// # Errors
/// Returns [`ProxyError`] when the payload or the backend reply cannot be decoded, or the
/// backend cannot be reached.
#[instrument(skip_all)]
pub async fn exchange_credentials<B, S>(
    backend: &B,
    store: &mut S,
    config: &GatewayConfig,
    body: &[u8],
) -> Result<Response, ProxyError>
where
    B: BackendClient,
    S: SessionStore,
{
    let reply = forward(backend, LOGIN_PATH, body).await?;

    if !reply.status.is_success() {
        debug!("login rejected by backend: {}", reply.status);
        return passthrough(reply);
    }

    let auth: TokenExchange =
        serde_json::from_slice(&reply.body).map_err(ProxyError::MalformedResponse)?;

    store.set(
        SESSION_COOKIE_NAME,
        &auth.access_token,
        &CookieOptions::session(auth.expires_in, config.session_cookie_secure()),
    )?;

    debug!("session started, expires in {}s", auth.expires_in);

    Ok(Json(json!({ "user": auth.user })).into_response())
}
