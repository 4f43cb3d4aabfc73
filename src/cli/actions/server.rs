use crate::{
    api::{self, handlers::auth},
    cli::telemetry,
};
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub db_path: PathBuf,
    pub auto_verify: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let auth_config = auth::AuthConfig::new().with_auto_verify(args.auto_verify);
    let auth_state = auth::AuthState::with_log_delivery(auth_config);

    let result = api::new(args.port, &args.db_path, auth_state).await;

    telemetry::shutdown_tracer();

    result
}
