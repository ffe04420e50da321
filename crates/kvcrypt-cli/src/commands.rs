//! Command-line surface and command execution.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use common::protocol::BatchRequest;
use tracing::{info, warn};

use crate::config::Config;

/// Encrypt and decrypt stored string values.
///
/// The secret is read from `KVCRYPT_SECRET` (or the config file), never from
/// the command line.
#[derive(Debug, Parser)]
#[command(name = "kvcrypt", version)]
pub struct Cli {
    /// TOML configuration file, overridden by `KVCRYPT_*` environment variables.
    #[arg(long, global = true, env = "KVCRYPT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt VALUE (or stdin) and print the `AES256:` string.
    Encrypt { value: Option<String> },

    /// Decrypt VALUE (or stdin) and print the plaintext.
    Decrypt {
        value: Option<String>,
        /// Print values that are not encrypted unchanged instead of failing.
        #[arg(long)]
        passthrough: bool,
    },

    /// Print envelope metadata as JSON without decrypting.
    Inspect { value: Option<String> },

    /// Transform a JSON `{"entries": [{"key", "value"}]}` batch read from stdin.
    Batch {
        #[arg(value_enum)]
        direction: Direction,
    },

    /// Transform string fields of a JSON document read from stdin.
    Fields {
        #[arg(value_enum)]
        direction: Direction,
        /// Dot-notation field path, `[]` expands arrays (e.g. `orders[].card`).
        #[arg(long = "path", required = true)]
        paths: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Execute `command`, reading from `input` and writing results to `output`.
///
/// # Errors
///
/// Crypto failures surface as [`common::CryptoError`] inside the returned
/// error so the caller can map them to exit codes.
pub fn run<R: Read, W: Write>(
    command: Command,
    cfg: &Config,
    mut input: R,
    mut output: W,
) -> Result<()> {
    match command {
        Command::Encrypt { value } => {
            let plaintext = read_value(value, &mut input)?;
            let encoded = kvcrypt::encrypt(&plaintext, cfg.secret()?)?;
            writeln!(output, "{encoded}")?;
        }
        Command::Decrypt { value, passthrough } => {
            let encoded = read_value(value, &mut input)?;
            let plaintext = if passthrough {
                kvcrypt::decrypt_if_encrypted(&encoded, cfg.secret()?)?.into_owned()
            } else {
                kvcrypt::decrypt(&encoded, cfg.secret()?)?
            };
            writeln!(output, "{plaintext}")?;
        }
        Command::Inspect { value } => {
            let encoded = read_value(value, &mut input)?;
            let info = kvcrypt::inspect(&encoded)?;
            serde_json::to_writer_pretty(&mut output, &info)?;
            writeln!(output)?;
        }
        Command::Batch { direction } => {
            let request: BatchRequest =
                serde_json::from_reader(&mut input).context("stdin is not a valid batch request")?;
            let secret = cfg.secret()?;
            let response = match direction {
                Direction::Encrypt => kvcrypt::batch::encrypt_entries(request.entries, secret)?,
                Direction::Decrypt => kvcrypt::batch::decrypt_entries(request.entries, secret),
            };
            if !response.errors.is_empty() {
                warn!(failed = response.errors.len(), "batch completed with failures");
            }
            info!(?direction, entries = response.entries.len(), "batch complete");
            serde_json::to_writer_pretty(&mut output, &response)?;
            writeln!(output)?;
        }
        Command::Fields { direction, paths } => {
            let mut doc: serde_json::Value =
                serde_json::from_reader(&mut input).context("stdin is not valid JSON")?;
            let secret = cfg.secret()?;
            let changed = match direction {
                Direction::Encrypt => {
                    kvcrypt::batch::encrypt_fields(&mut doc, paths.as_slice(), secret)?
                }
                Direction::Decrypt => {
                    kvcrypt::batch::decrypt_fields(&mut doc, paths.as_slice(), secret)?
                }
            };
            info!(?direction, changed, "document fields transformed");
            serde_json::to_writer_pretty(&mut output, &doc)?;
            writeln!(output)?;
        }
    }
    output.flush()?;
    Ok(())
}

/// Use `value` if given, otherwise read all of `input`, dropping a single
/// trailing line ending.
fn read_value<R: Read>(value: Option<String>, input: &mut R) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .context("failed to read value from stdin")?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}
