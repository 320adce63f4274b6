//! # Authgate (browser-facing authentication gateway)
//!
//! `authgate` sits between the browser and an external identity backend. It trades
//! credentials for a backend-issued access token and keeps that token in an `HttpOnly`
//! session cookie the browser can never read.
//!
//! ## Session lifecycle
//!
//! - **Login:** `POST /api/auth/login` forwards the credentials to the backend. On success the
//!   access token becomes the `auth_token` cookie with `Max-Age` equal to the backend's
//!   `expiresIn`, and the browser only receives `{ "user": ... }`.
//! - **Register:** `POST /api/auth/register` is a passthrough.
//! - **Logout:** `POST /api/auth/logout` deletes the cookie, whether or not it existed.
//!
//! ## Route guard
//!
//! Every request is classified by path before it reaches a handler. Auth pages redirect to
//! the dashboard when a session cookie is present, and the dashboard redirects to the login
//! page when it is not. Presence is the only check; the backend remains the source of truth
//! for every authenticated call.
//!
//! ## Client
//!
//! [`client::ApiClient`] is the data access layer used by callers of the gateway. Every
//! non-success response comes back as a [`client::NormalizedError`].

pub mod cli;
pub mod client;
pub mod gateway;
pub mod types;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
