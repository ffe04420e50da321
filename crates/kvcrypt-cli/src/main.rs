//! `kvcrypt` command-line entry point.
//!
//! Startup sequence:
//! 1. Parse arguments.
//! 2. Load and validate [`Config`](config::Config) from the optional file and
//!    `KVCRYPT_*` environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command against stdin/stdout.

mod commands;
mod config;
mod telemetry;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use common::CryptoError;
use tracing::error;

/// sysexits.h `EX_CONFIG`.
const EXIT_CONFIG: u8 = 78;

fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let cli = commands::Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match config::Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: kvcrypt configuration invalid: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    match commands::run(cli.command, &cfg, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let crypto = e.downcast_ref::<CryptoError>();
            error!(code = crypto.map(CryptoError::code), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Process exit status for a failed command: the crypto error's own code,
/// `EX_CONFIG` for a missing secret, 1 for anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(crypto) = err.downcast_ref::<CryptoError>() {
        return crypto.exit_code();
    }
    if err.downcast_ref::<crate::config::MissingSecret>().is_some() {
        return EXIT_CONFIG;
    }
    1
}
