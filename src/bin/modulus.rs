//! Modulus CLI - lifecycle commands for every discovered model
//!
//! Usage: `modulus [--log-level LEVEL] <ModelClassName> <command> [args...]`

use clap::{Arg, ArgMatches, Command};
use modulus::PluginCatalog;
use modulus::commands::CommandRegistry;
use modulus::config::ModulusConfig;
use modulus::logging::{LogTarget, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

fn root_command() -> Command {
    Command::new("modulus")
        .about("Run model lifecycle operations for discovered Modulus models")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info")
                .global(true)
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("log_format")
                .long("log-format")
                .value_name("FORMAT")
                .default_value("pretty")
                .global(true)
                .help("Log format (json or pretty)"),
        )
}

/// Read the global flags before the command tree exists
fn early_matches() -> ArgMatches {
    root_command()
        .allow_external_subcommands(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .ignore_errors(true)
        .get_matches()
}

fn main() -> ExitCode {
    let early = early_matches();
    let log_level = early
        .get_one::<String>("log_level")
        .map(String::as_str)
        .unwrap_or("info");
    let log_format = early
        .get_one::<String>("log_format")
        .map(String::as_str)
        .unwrap_or("pretty");

    init_logging(log_level, log_format, LogTarget::Stderr);

    let config = match ModulusConfig::load(early.get_one::<PathBuf>("config").cloned())
        .and_then(|c| c.validate().map(|_| c))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Application started");

    let catalog = PluginCatalog::builtin().without(&config.disabled_models);
    let registry = CommandRegistry::discover(&catalog);

    let matches = registry
        .to_clap(root_command())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .get_matches();

    let Some((group, command, args)) = CommandRegistry::invocation(&matches) else {
        eprintln!("Error: no command given");
        return ExitCode::FAILURE;
    };

    match registry.run(&group, &command, &args) {
        Ok(value) => {
            println!("Result of {}: {}", command, value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(group = %group, command = %command, error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
