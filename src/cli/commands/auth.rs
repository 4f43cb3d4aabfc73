use clap::{builder::BoolishValueParser, Arg, ArgAction, Command};

pub const ARG_AUTO_VERIFY: &str = "auto-verify";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub auto_verify: bool,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            auto_verify: matches
                .get_one::<bool>(ARG_AUTO_VERIFY)
                .copied()
                .unwrap_or(true),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_AUTO_VERIFY)
            .long(ARG_AUTO_VERIFY)
            .help("Mark users verified at registration; when false, login requires a verified OTP")
            .env("TENUNKU_AUTO_VERIFY")
            .default_value("true")
            .action(ArgAction::Set)
            .value_parser(BoolishValueParser::new()),
    )
}
