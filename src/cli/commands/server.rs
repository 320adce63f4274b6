use crate::gateway::config::{Environment, GatewayConfig, DEFAULT_BACKEND_URL};
use anyhow::{anyhow, Result};
use clap::{builder::ValueParser, Arg, ArgMatches, Command};

pub const ARG_PORT: &str = "port";
pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_ENVIRONMENT: &str = "environment";

pub const DEFAULT_PORT: u16 = 3000;

#[must_use]
pub fn validator_environment() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<String, String> {
        Environment::parse(value)
            .map(|_| value.to_string())
            .ok_or_else(|| "expected 'development' or 'production'".to_string())
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("AUTHGATE_PORT")
                .global(true)
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .short('b')
                .long("backend-url")
                .help("Base URL of the identity backend")
                .default_value(DEFAULT_BACKEND_URL)
                .env("AUTHGATE_BACKEND_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .long("api-base-url")
                .help("Public base URL of the gateway API, empty for same origin")
                .default_value("")
                .env("AUTHGATE_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .short('e')
                .long("environment")
                .help("Deployment environment; production marks the session cookie Secure")
                .default_value("development")
                .env("AUTHGATE_ENV")
                .global(true)
                .value_parser(validator_environment()),
        )
}

#[derive(Debug)]
pub struct Options {
    pub port: u16,
    pub config: GatewayConfig,
}

impl Options {
    /// # Errors
    /// Returns an error if a base URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let port = matches
            .get_one::<u16>(ARG_PORT)
            .copied()
            .unwrap_or(DEFAULT_PORT);

        let backend_url = matches
            .get_one::<String>(ARG_BACKEND_URL)
            .map_or(DEFAULT_BACKEND_URL, String::as_str);

        let api_base_url = matches
            .get_one::<String>(ARG_API_BASE_URL)
            .map_or("", String::as_str);

        let environment = match matches.get_one::<String>(ARG_ENVIRONMENT) {
            Some(value) => Environment::parse(value)
                .ok_or_else(|| anyhow!("invalid --environment: {value}"))?,
            None => Environment::default(),
        };

        Ok(Self {
            port,
            config: GatewayConfig::new(backend_url, api_base_url, environment)?,
        })
    }
}
