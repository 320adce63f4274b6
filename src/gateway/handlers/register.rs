use super::{forward, passthrough, ProxyError};
use crate::{
    gateway::{
        backend::{BackendClient, REGISTER_PATH},
        AppState,
    },
    types::{MessageBody, RegisterRequest},
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, backend body forwarded unchanged"),
        (status = 400, description = "Validation failure with fieldErrors, forwarded unchanged"),
        (status = 409, description = "Account already exists, forwarded unchanged"),
        (status = 500, description = "Backend unreachable or unreadable", body = MessageBody)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return ProxyError::from(rejection).into_response(),
    };

    relay_registration(state.backend(), &body)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// Forward a registration and hand back whatever the backend answered.
///
/// # Errors
/// Returns [`ProxyError`] when the payload or the backend reply is not JSON, or the backend
/// cannot be reached.
#[instrument(skip_all)]
pub async fn relay_registration<B: BackendClient>(
    backend: &B,
    body: &[u8],
) -> Result<Response, ProxyError> {
    let reply = forward(backend, REGISTER_PATH, body).await?;
    passthrough(reply)
}
