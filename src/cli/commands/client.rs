use clap::{Arg, Command};

pub const CMD_SERVER: &str = "server";
pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_IDENTIFIER: &str = "identifier";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PHONE: &str = "phone";

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long("password")
        .help("Account password")
        .env("AUTHGATE_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

/// Subcommands: `server` plus the client calls against a running gateway.
#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(Command::new(CMD_SERVER).about("Run the gateway (default)"))
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Log in through a running gateway")
                .arg(
                    Arg::new(ARG_IDENTIFIER)
                        .long("identifier")
                        .short('i')
                        .help("Email or phone number")
                        .required(true),
                )
                .arg(password()),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Register an account through a running gateway")
                .arg(
                    Arg::new(ARG_FIRST_NAME)
                        .long("first-name")
                        .help("First name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_LAST_NAME)
                        .long("last-name")
                        .help("Last name")
                        .required(true),
                )
                .arg(Arg::new(ARG_EMAIL).long("email").help("Email address"))
                .arg(Arg::new(ARG_PHONE).long("phone").help("Phone number"))
                .arg(password()),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("End the session on a running gateway"))
}
