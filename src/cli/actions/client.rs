use crate::{
    client::{ApiClient, ClientError},
    types::{LoginRequest, RegisterRequest},
};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug)]
pub enum Call {
    Login(LoginRequest),
    Register(RegisterRequest),
    Logout,
}

#[derive(Debug)]
pub struct Args {
    pub base_url: String,
    pub call: Call,
}

/// Base URL for client calls: the configured API base, else the local gateway port.
#[must_use]
pub fn base_url(api_base_url: &str, port: u16) -> String {
    if api_base_url.trim().is_empty() {
        format!("http://localhost:{port}")
    } else {
        api_base_url.to_string()
    }
}

/// Execute a client call and print its JSON result to stdout.
/// # Errors
/// Returns an error if the gateway rejects the call or cannot be reached. A normalized error
/// is printed to stderr first.
pub async fn execute(args: Args) -> Result<()> {
    debug!("client call {:?} against {}", args.call, args.base_url);

    let client = ApiClient::new(&args.base_url)?;

    let result = match &args.call {
        Call::Login(credentials) => client.login(credentials).await.and_then(to_json),
        Call::Register(registration) => client.register(registration).await.and_then(to_json),
        Call::Logout => client.logout().await.and_then(to_json),
    };

    match result {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(ClientError::Http(err)) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Err(anyhow!("{} ({})", err.message, err.status))
        }
        Err(err) => Err(err.into()),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<String, ClientError> {
    serde_json::to_string_pretty(&value).map_err(ClientError::Encode)
}
