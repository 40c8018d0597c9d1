//! Plugin Shield - Main Entry Point
//!
//! Loads settings, synthesizes the plugin surface for one session and prints
//! its JSON snapshot to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plugin_shield::{
    config::{CliArgs, ShieldSettings},
    stealth::{PluginShield, ProtectionLevel},
    NAME, VERSION,
};

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .about("Synthesize the plugin and mime type lists a page would see")
        .long_about(
            "Plugin Shield builds the navigator.plugins and navigator.mimeTypes\n\
             surface for one session and prints it as JSON.\n\n\
             Protection levels:\n  \
             0 / minimal   farble the genuine plugins and add two fakes\n  \
             1 / balanced  report two fabricated plugins only\n  \
             2 / maximum   report nothing",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("level")
                .short('l')
                .long("level")
                .value_name("LEVEL")
                .help("Protection level: 0-2 or minimal, balanced, maximum (default: 1)")
                .value_parser(|raw: &str| raw.parse::<ProtectionLevel>()),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("STRING")
                .help("Session token; the same token reproduces the same surface"),
        )
        .arg(
            Arg::new("genuine")
                .long("genuine")
                .value_name("FILE")
                .help("JSON file with the genuine plugin list used at level 0")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .help("Audit the synthesized surface and fail on any inconsistency")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.protection_level = matches.get_one::<ProtectionLevel>("level").copied();
    args.session_seed = matches.get_one::<String>("seed").cloned();
    args.genuine_plugins_path = matches.get_one::<PathBuf>("genuine").cloned();

    if matches.get_flag("verify") {
        args.verify = Some(true);
    }

    args
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Synthesize the surface described by `settings` and render its snapshot.
fn run(settings: &ShieldSettings) -> Result<String> {
    let host = settings
        .host()
        .context("Failed to load genuine plugin list")?;
    let shield = PluginShield::with_random(host, settings.session_random());
    debug!(seed = shield.random().seed(), "Session randomness ready");

    let surface = shield.surface().context("Failed to synthesize plugin surface")?;

    if settings.verify {
        surface
            .verify()
            .context("Synthesized surface failed the consistency audit")?;
        info!("Consistency audit passed");
    }

    serde_json::to_string_pretty(&surface.snapshot()).context("Failed to serialize snapshot")
}

/// Main application entry point
fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    init_tracing(verbosity, quiet);

    let cli_args = parse_cli_args(&matches);
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    info!(
        "{} starting at protection level {} ({})",
        NAME,
        settings.protection_level.as_u8(),
        settings.protection_level
    );

    let snapshot = run(&settings)?;
    println!("{}", snapshot);

    Ok(())
}
