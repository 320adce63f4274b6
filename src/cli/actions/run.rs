use crate::cli::{
    actions::{client, server, Action},
    telemetry,
};
use anyhow::Result;

/// Single dispatch point for every CLI action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let result = match action {
        Action::Server(args) => server::execute(args).await,
        Action::Client(args) => client::execute(args).await,
    };

    telemetry::shutdown_tracer();

    result
}
