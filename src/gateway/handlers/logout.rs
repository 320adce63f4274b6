use crate::{
    gateway::{
        session::{CookieJar, CookieOptions, SessionStore, SESSION_COOKIE_NAME},
        AppState,
    },
    types::MessageBody,
};
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use tracing::debug;

pub const LOGGED_OUT_MESSAGE: &str = "Logged out";

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageBody)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let mut jar = CookieJar::from_headers(&headers);
    let ack = end_session(&mut jar, state.config().session_cookie_secure());
    (jar, Json(ack))
}

/// Always delete the session cookie; a missing cookie is not an error.
pub fn end_session<S: SessionStore>(store: &mut S, secure: bool) -> MessageBody {
    if store.get(SESSION_COOKIE_NAME).is_none() {
        debug!("logout without a session cookie");
    }
    store.delete(SESSION_COOKIE_NAME, &CookieOptions::session(0, secure));

    MessageBody::new(LOGGED_OUT_MESSAGE)
}
