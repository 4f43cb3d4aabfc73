//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(3000);
    let db_path = matches
        .get_one::<PathBuf>("db")
        .cloned()
        .context("missing required argument: --db")?;

    let auth_opts = auth::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        db_path,
        auto_verify: auth_opts.auto_verify,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_fixed_constants() {
        temp_env::with_vars(
            [
                ("TENUNKU_PORT", None::<&str>),
                ("TENUNKU_DB", None::<&str>),
                ("TENUNKU_AUTO_VERIFY", None::<&str>),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["tenunku"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 3000);
                    assert_eq!(args.db_path, PathBuf::from("tenunku.db"));
                    assert!(args.auto_verify);
                }
            },
        );
    }

    #[test]
    fn env_overrides_defaults() {
        temp_env::with_vars(
            [
                ("TENUNKU_PORT", Some("8080")),
                ("TENUNKU_DB", Some("/tmp/users.db")),
                ("TENUNKU_AUTO_VERIFY", Some("false")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["tenunku"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.db_path, PathBuf::from("/tmp/users.db"));
                    assert!(!args.auto_verify);
                }
            },
        );
    }
}
