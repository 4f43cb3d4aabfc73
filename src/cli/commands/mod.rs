pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};
use std::path::PathBuf;

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("tenunku")
        .about("Registration, login and OTP verification backend")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("TENUNKU_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("db")
                .short('d')
                .long("db")
                .help("SQLite database file, created if missing")
                .default_value("tenunku.db")
                .env("TENUNKU_DB")
                .value_parser(clap::value_parser!(PathBuf)),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}
