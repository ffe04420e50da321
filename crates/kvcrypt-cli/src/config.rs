//! Configuration loading and validation for the `kvcrypt` CLI.
//!
//! Values come from an optional TOML file overlaid by `KVCRYPT_*` environment
//! variables, so `KVCRYPT_SECRET` always wins over a secret in the file.

use std::path::Path;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Environment variable prefix for every setting.
const ENV_PREFIX: &str = "KVCRYPT";

/// A command that needs the secret ran without one configured.
///
/// Raised after configuration has loaded, so the binary maps it to the same
/// exit status as a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("KVCRYPT_SECRET is required for this command")]
pub struct MissingSecret;

/// Validated CLI configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Secret used to derive encryption keys. Required by every command
    /// except `inspect`. Redacted in `Debug` output.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub secret: Option<SecretString>,

    /// Tracing log level; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl Config {
    /// Load and validate configuration from `file` (if given) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any value
    /// fails validation.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_from(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml),
            );
        }

        let cfg = builder
            .add_source(env)
            .build()
            .context("failed to build kvcrypt configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise kvcrypt configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if let Some(secret) = &self.secret {
            if secret.expose_secret().trim().is_empty() {
                anyhow::bail!("KVCRYPT_SECRET must not be empty or whitespace");
            }
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("KVCRYPT_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// The configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`MissingSecret`] if no secret was configured.
    pub fn secret(&self) -> Result<&str, MissingSecret> {
        self.secret
            .as_ref()
            .map(|s| s.expose_secret())
            .ok_or(MissingSecret)
    }
}
