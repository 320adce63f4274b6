//! Map parsed CLI arguments to an [`Action`].

use crate::cli::actions::{
    client::{self, Call},
    server, Action,
};
use crate::cli::commands::{
    client::{
        ARG_EMAIL, ARG_FIRST_NAME, ARG_IDENTIFIER, ARG_LAST_NAME, ARG_PASSWORD, ARG_PHONE,
        CMD_LOGIN, CMD_LOGOUT, CMD_REGISTER, CMD_SERVER,
    },
    server::{Options, ARG_API_BASE_URL, ARG_PORT, DEFAULT_PORT},
};
use crate::types::{LoginRequest, RegisterRequest};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches
        .get_one::<String>(name)
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

fn client_args(matches: &ArgMatches, call: Call) -> client::Args {
    let port = matches
        .get_one::<u16>(ARG_PORT)
        .copied()
        .unwrap_or(DEFAULT_PORT);
    let api_base_url = matches
        .get_one::<String>(ARG_API_BASE_URL)
        .map_or("", String::as_str);

    client::Args {
        base_url: client::base_url(api_base_url, port),
        call,
    }
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the gateway configuration is invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        None => server_action(matches),
        Some((CMD_SERVER, sub)) => server_action(sub),
        Some((CMD_LOGIN, sub)) => {
            let credentials = LoginRequest {
                identifier: required(sub, ARG_IDENTIFIER)?,
                password: SecretString::from(required(sub, ARG_PASSWORD)?),
            };
            Ok(Action::Client(client_args(sub, Call::Login(credentials))))
        }
        Some((CMD_REGISTER, sub)) => {
            let registration = RegisterRequest {
                first_name: required(sub, ARG_FIRST_NAME)?,
                last_name: required(sub, ARG_LAST_NAME)?,
                email: optional(sub, ARG_EMAIL),
                phone: optional(sub, ARG_PHONE),
                password: SecretString::from(required(sub, ARG_PASSWORD)?),
            };
            Ok(Action::Client(client_args(sub, Call::Register(registration))))
        }
        Some((CMD_LOGOUT, sub)) => Ok(Action::Client(client_args(sub, Call::Logout))),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
    }
}

fn server_action(matches: &ArgMatches) -> Result<Action> {
    let options = Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port: options.port,
        config: options.config,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use crate::gateway::config::Environment;
    use secrecy::ExposeSecret;

    const CLEAR: [(&str, Option<&str>); 6] = [
        ("AUTHGATE_PORT", None),
        ("AUTHGATE_BACKEND_URL", None),
        ("AUTHGATE_API_BASE_URL", None),
        ("AUTHGATE_ENV", None),
        ("AUTHGATE_LOG_LEVEL", None),
        ("AUTHGATE_PASSWORD", None),
    ];

    #[test]
    fn no_subcommand_runs_server() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec!["authgate"]);
            let action = handler(&matches);
            assert!(matches!(
                action,
                Ok(Action::Server(server::Args { port: 3000, .. }))
            ));
        });
    }

    #[test]
    fn server_subcommand_reads_config() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "authgate",
                "server",
                "--port",
                "4000",
                "--backend-url",
                "http://identity:9000/",
                "--environment",
                "production",
            ]);
            let Ok(Action::Server(args)) = handler(&matches) else {
                panic!("expected server action");
            };
            assert_eq!(args.port, 4000);
            assert_eq!(args.config.backend_url(), "http://identity:9000");
            assert_eq!(args.config.environment(), Environment::Production);
            assert!(args.config.session_cookie_secure());
        });
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        temp_env::with_vars(CLEAR, || {
            let matches =
                commands::new().get_matches_from(vec!["authgate", "--backend-url", "not a url"]);
            assert!(handler(&matches).is_err());
        });
    }

    #[test]
    fn login_subcommand_builds_client_call() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "authgate",
                "login",
                "--identifier",
                "jane@example.com",
                "--password",
                "Pass1234",
            ]);
            let Ok(Action::Client(args)) = handler(&matches) else {
                panic!("expected client action");
            };
            assert_eq!(args.base_url, "http://localhost:3000");
            let Call::Login(credentials) = args.call else {
                panic!("expected login call");
            };
            assert_eq!(credentials.identifier, "jane@example.com");
            assert_eq!(credentials.password.expose_secret(), "Pass1234");
        });
    }

    #[test]
    fn register_subcommand_skips_blank_contact() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "authgate",
                "register",
                "--first-name",
                "Jane",
                "--last-name",
                "Doe",
                "--phone",
                "",
                "--email",
                "jane@example.com",
                "--password",
                "Pass1234",
                "--api-base-url",
                "https://app.example.com",
            ]);
            let Ok(Action::Client(args)) = handler(&matches) else {
                panic!("expected client action");
            };
            assert_eq!(args.base_url, "https://app.example.com");
            let Call::Register(registration) = args.call else {
                panic!("expected register call");
            };
            assert_eq!(registration.email.as_deref(), Some("jane@example.com"));
            assert!(registration.phone.is_none());
        });
    }

    #[test]
    fn logout_subcommand() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec!["authgate", "logout", "-p", "8000"]);
            let Ok(Action::Client(args)) = handler(&matches) else {
                panic!("expected client action");
            };
            assert_eq!(args.base_url, "http://localhost:8000");
            assert!(matches!(args.call, Call::Logout));
        });
    }
}
