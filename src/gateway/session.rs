//! Session cookie storage.
//!
//! Handlers never touch `Cookie`/`Set-Cookie` headers directly; they go through
//! [`SessionStore`], which the server backs with a [`CookieJar`] built from the incoming
//! request and tests back with an in-memory store.

use axum::{
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use std::{collections::HashMap, convert::Infallible, fmt};
use thiserror::Error;
use tracing::error;

pub const SESSION_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("cookie value contains characters outside the cookie-octet set")]
    InvalidValue,
    #[error("cookie cannot be encoded as a header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// RFC 6265 `cookie-octet`: visible ASCII except `"`, `,`, `;` and `\`.
#[must_use]
pub fn valid_cookie_value(value: &str) -> bool {
    value.bytes().all(|b| {
        matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
    })
}

/// Attributes written alongside a cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: u64,
    pub path: String,
}

impl CookieOptions {
    /// Attributes for the session cookie; `max_age` is used as given.
    #[must_use]
    pub fn session(max_age: u64, secure: bool) -> Self {
        Self {
            http_only: true,
            secure,
            same_site: SameSite::Strict,
            max_age,
            path: "/".to_string(),
        }
    }
}

/// Get/set/delete cookies by name for the request being handled.
pub trait SessionStore {
    fn get(&self, name: &str) -> Option<&str>;

    /// # Errors
    /// Returns an error if the value is not a valid cookie value.
    fn set(
        &mut self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), CookieError>;

    /// Expire the cookie with the same attributes it was set with.
    fn delete(&mut self, name: &str, options: &CookieOptions);
}

/// A session is present when the cookie exists with a non-empty value.
pub fn has_session<S: SessionStore + ?Sized>(store: &S) -> bool {
    store
        .get(SESSION_COOKIE_NAME)
        .is_some_and(|value| !value.is_empty())
}

/// Request cookies plus the `Set-Cookie` headers queued for the response.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
    pending: Vec<HeaderValue>,
}

impl CookieJar {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                    continue;
                };
                // First occurrence wins, as browsers send the most specific path first.
                cookies
                    .entry(key.trim().to_string())
                    .or_insert_with(|| val.trim().to_string());
            }
        }

        Self {
            cookies,
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` values queued so far, in write order.
    #[must_use]
    pub fn pending(&self) -> &[HeaderValue] {
        &self.pending
    }
}

impl SessionStore for CookieJar {
    fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        if !valid_cookie_value(value) {
            return Err(CookieError::InvalidValue);
        }
        let header = HeaderValue::from_str(&set_cookie(name, value, options))?;
        self.pending.push(header);
        self.cookies.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, name: &str, options: &CookieOptions) {
        match HeaderValue::from_str(&clear_cookie(name, options)) {
            Ok(header) => self.pending.push(header),
            Err(err) => error!("Failed to build cookie removal for {name}: {err}"),
        }
        self.cookies.remove(name);
    }
}

impl IntoResponseParts for CookieJar {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for header in self.pending {
            res.headers_mut().append(SET_COOKIE, header);
        }
        Ok(res)
    }
}

fn set_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = format!(
        "{name}={value}; Path={}; Max-Age={}; SameSite={}",
        options.path, options.max_age, options.same_site
    );
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_cookie(name: &str, options: &CookieOptions) -> String {
    let expired = CookieOptions {
        max_age: 0,
        ..options.clone()
    };
    let mut cookie = set_cookie(name, "", &expired);
    cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
    cookie
}

/// In-memory store recording the exact attributes of every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub(crate) cookies: HashMap<String, (String, Option<CookieOptions>)>,
    pub(crate) writes: usize,
    pub(crate) deletes: Vec<(String, CookieOptions)>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn with_cookie(name: &str, value: &str) -> Self {
        let mut store = Self::default();
        store
            .cookies
            .insert(name.to_string(), (value.to_string(), None));
        store
    }

    pub(crate) fn options(&self, name: &str) -> Option<&CookieOptions> {
        self.cookies.get(name).and_then(|(_, options)| options.as_ref())
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|(value, _)| value.as_str())
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        if !valid_cookie_value(value) {
            return Err(CookieError::InvalidValue);
        }
        self.writes += 1;
        self.cookies.insert(
            name.to_string(),
            (value.to_string(), Some(options.clone())),
        );
        Ok(())
    }

    fn delete(&mut self, name: &str, options: &CookieOptions) {
        self.deletes.push((name.to_string(), options.clone()));
        self.cookies.remove(name);
    }
}
