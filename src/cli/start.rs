use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use clap::parser::ValueSource;

/// Map a `TENUNKU_LOG_LEVEL` value (0-4 or a level name) to a tracing level
const fn get_verbosity_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Map a `-v` count to a tracing level, counting up from the INFO default
const fn get_flag_level(count: u8) -> tracing::Level {
    match count {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// Verbosity requested on the command line or through the environment, if any.
fn requested_verbosity(matches: &clap::ArgMatches) -> Option<tracing::Level> {
    let value = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()?;

    match matches.value_source(commands::logging::ARG_VERBOSITY)? {
        ValueSource::CommandLine => Some(get_flag_level(value)),
        ValueSource::EnvVariable => Some(get_verbosity_level(value)),
        _ => None,
    }
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    // 1. Parse command-line arguments
    let matches = commands::new().get_matches();

    // 2. Initialize telemetry
    telemetry::init(requested_verbosity(&matches))?;

    // 3. Dispatch to appropriate action
    let action = dispatch::handler(&matches)?;

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels_map_in_order() {
        assert_eq!(get_verbosity_level(0), tracing::Level::ERROR);
        assert_eq!(get_verbosity_level(1), tracing::Level::WARN);
        assert_eq!(get_verbosity_level(2), tracing::Level::INFO);
        assert_eq!(get_verbosity_level(3), tracing::Level::DEBUG);
        assert_eq!(get_verbosity_level(9), tracing::Level::TRACE);
    }

    #[test]
    fn no_verbosity_flag_means_default_level() {
        temp_env::with_vars([("TENUNKU_LOG_LEVEL", None::<&str>)], || {
            let matches = commands::new().get_matches_from(vec!["tenunku"]);
            assert_eq!(requested_verbosity(&matches), None);
        });
    }

    #[test]
    fn verbosity_flags_step_up_from_info() {
        assert_eq!(get_flag_level(0), tracing::Level::INFO);
        assert_eq!(get_flag_level(1), tracing::Level::DEBUG);
        assert_eq!(get_flag_level(2), tracing::Level::TRACE);
        assert_eq!(get_flag_level(7), tracing::Level::TRACE);

        temp_env::with_vars([("TENUNKU_LOG_LEVEL", None::<&str>)], || {
            let matches = commands::new().get_matches_from(vec!["tenunku", "-v"]);
            assert_eq!(requested_verbosity(&matches), Some(tracing::Level::DEBUG));

            let matches = commands::new().get_matches_from(vec!["tenunku", "-vv"]);
            assert_eq!(requested_verbosity(&matches), Some(tracing::Level::TRACE));
        });
    }

    #[test]
    fn log_level_env_names_an_absolute_level() {
        temp_env::with_vars([("TENUNKU_LOG_LEVEL", Some("warn"))], || {
            let matches = commands::new().get_matches_from(vec!["tenunku"]);
            assert_eq!(requested_verbosity(&matches), Some(tracing::Level::WARN));
        });
    }
}
