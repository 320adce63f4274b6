//! Minimal server-rendered pages. They exist so the guarded routes resolve to something;
//! the forms post JSON to the client-facing auth routes.

use crate::gateway::{
    session::{has_session, CookieJar},
    AppState,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};

const SUBMIT_SCRIPT: &str = r#"<script>
// Only same-origin paths; anything else (other hosts, javascript:) lands on the dashboard.
function localRedirect() {
  const next = new URLSearchParams(location.search).get("redirect");
  const local = next && next.startsWith("/") && !next.startsWith("//") && !next.startsWith("/\\");
  return local ? next : "/dashboard";
}
document.querySelectorAll("form[data-endpoint]").forEach((form) => {
  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    const body = Object.fromEntries([...new FormData(form)].filter(([, v]) => v !== ""));
    const res = await fetch(API_BASE + form.dataset.endpoint, {
      method: "POST",
      credentials: "include",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body),
    });
    const data = await res.json().catch(() => null);
    if (!res.ok) {
      const out = form.querySelector("output");
      const fields = (data?.fieldErrors ?? []).map((e) => `${e.field}: ${e.message}`);
      out.textContent = [data?.message ?? res.statusText, ...fields].join("\n");
      return;
    }
    location.assign(form.dataset.next === "redirect" ? localRedirect() : form.dataset.next);
  });
});
</script>"#;

pub async fn home() -> Html<String> {
    page(
        "Ticket Reservation",
        r#"<p>Book and manage your event tickets in one place.</p>
<p><a href="/login">Sign In</a> <a href="/register">Create Account</a></p>"#,
        "",
    )
}

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    page(
        "Sign In",
        r#"<form data-endpoint="/api/auth/login" data-next="redirect">
<input name="identifier" placeholder="Email or phone" required>
<input name="password" type="password" placeholder="Password" required>
<button type="submit">Sign In</button>
<output></output>
</form>
<p><a href="/register">Create Account</a></p>"#,
        state.config().api_base_url(),
    )
}

pub async fn register_page(State(state): State<AppState>) -> Html<String> {
    page(
        "Create Account",
        r#"<form data-endpoint="/api/auth/register" data-next="/login">
<input name="firstName" placeholder="First name" required>
<input name="lastName" placeholder="Last name" required>
<input name="email" type="email" placeholder="Email">
<input name="phone" placeholder="Phone (+14155552671)">
<input name="password" type="password" placeholder="Password" required>
<button type="submit">Create Account</button>
<output></output>
</form>
<p><a href="/login">Sign In</a></p>"#,
        state.config().api_base_url(),
    )
}

/// The dashboard confirms the session itself in case the guard was bypassed.
pub async fn dashboard(headers: HeaderMap) -> Response {
    if !has_session(&CookieJar::from_headers(&headers)) {
        return Redirect::temporary("/login").into_response();
    }

    page(
        "Dashboard",
        r#"<p>This section is currently under construction.</p>
<button id="logout">Log Out</button>
<script>
document.getElementById("logout").addEventListener("click", async () => {
  await fetch("/api/auth/logout", { method: "POST" });
  location.assign("/login");
});
</script>"#,
        "",
    )
    .into_response()
}

fn page(title: &str, content: &str, api_base: &str) -> Html<String> {
    let script = if content.contains("data-endpoint") {
        // Serialized so the base URL lands in the script as a string literal.
        let base = serde_json::to_string(api_base).unwrap_or_else(|_| "\"\"".to_string());
        format!("<script>const API_BASE = {base};</script>{SUBMIT_SCRIPT}")
    } else {
        String::new()
    };

    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><main><h1>{title}</h1>{content}</main>{script}</body></html>"
    ))
}
