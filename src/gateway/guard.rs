//! Per-request route guard.
//!
//! Classification and the allow/redirect decision are pure functions of the path and
//! whether a session cookie is present. The cookie value is never inspected: a stale token
//! still passes here and is rejected later by the backend.

use crate::gateway::session::{has_session, CookieJar};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use url::form_urlencoded;

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

const AUTH_PAGES: [&str; 3] = ["/", "/login", "/register"];
const PROTECTED_PREFIXES: [&str; 1] = [DASHBOARD_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    AuthPage,
    Protected,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if AUTH_PAGES.contains(&path) {
        return RouteClass::AuthPage;
    }

    let protected = PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    });

    if protected {
        RouteClass::Protected
    } else {
        RouteClass::Public
    }
}

#[must_use]
pub fn decide(path: &str, session_present: bool) -> Decision {
    match (classify(path), session_present) {
        (RouteClass::AuthPage, true) => Decision::Redirect(DASHBOARD_PATH.to_string()),
        (RouteClass::Protected, false) => Decision::Redirect(login_redirect(path)),
        _ => Decision::Allow,
    }
}

/// `/login?redirect=<path>`; only the path survives, never the original query.
fn login_redirect(path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", path)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// axum middleware running the guard ahead of every handler.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let session_present = has_session(&CookieJar::from_headers(request.headers()));

    match decide(request.uri().path(), session_present) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect(location) => {
            debug!("guard redirect {} -> {}", request.uri().path(), location);
            Redirect::temporary(&location).into_response()
        }
    }
}
