//! Classifier configuration.
//!
//! Loads extra subscription loss codes from a TOML file, with an optional
//! environment override, and registers them with
//! [`add_subscription_loss_code`].
//!
//! # Example Configuration
//!
//! ```toml
//! # Codes that, in addition to 403, mean the event stream is gone.
//! subscription_loss_codes = [410, "${EXTRA_LOSS_CODE}"]
//! ```
//!
//! `$VAR` and `${VAR}` references are expanded from the environment before
//! parsing; unresolved references are left as-is.
//!
//! # Environment Variables
//!
//! - `MESOS_APIERRORS_CONFIG` — Path to the configuration file (default: `apierrors.toml`)
//! - `MESOS_SUBSCRIPTION_LOSS_CODES` — Comma-separated codes replacing the file value

use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::code::Code;
use crate::subscription::add_subscription_loss_code;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "MESOS_APIERRORS_CONFIG";

/// Environment variable overriding [`ClassifierConfig::subscription_loss_codes`].
pub const SUBSCRIPTION_LOSS_CODES_ENV: &str = "MESOS_SUBSCRIPTION_LOSS_CODES";

const DEFAULT_CONFIG_PATH: &str = "apierrors.toml";

/// Errors raised while loading a [`ClassifierConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A status code in a code list is not an integer in `0..=65535`.
    #[error("invalid status code {value:?}: {source}")]
    InvalidCode {
        /// The offending list entry.
        value: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },
}

/// Classifier settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Codes registered as indicating subscription loss, on top of the
    /// built-in [`Code::UNSUBSCRIBED`].
    #[serde(default)]
    pub subscription_loss_codes: Vec<Code>,
}

impl ClassifierConfig {
    /// Loads configuration from the path in `MESOS_APIERRORS_CONFIG`, falling
    /// back to `apierrors.toml` in the current directory, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// environment override holds an invalid code.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(env_lookup)
    }

    /// Like [`load`](Self::load), resolving every variable through `lookup`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from_with(path, &lookup)?.with_env_overrides(&lookup)
    }

    /// Loads configuration from a specific file. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_from_with(path, env_lookup)
    }

    fn load_from_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_with(&content, lookup)
    }

    /// Parses configuration from a TOML document after expanding `$VAR` and
    /// `${VAR}` references from the process environment.
    ///
    /// Codes may be written as integers or as strings, so
    /// `subscription_loss_codes = ["${LOSS_CODE}"]` is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded document does not match the schema.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::from_toml_with(content, env_lookup)
    }

    /// Like [`from_toml`](Self::from_toml), resolving variables through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded document does not match the schema.
    pub fn from_toml_with<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(toml::from_str(&expand_env_vars(content, lookup))?)
    }

    /// Replaces settings with values found through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if an overridden code list cannot be parsed.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(codes) = lookup(SUBSCRIPTION_LOSS_CODES_ENV) {
            self.subscription_loss_codes = parse_code_list(&codes)?;
        }
        Ok(self)
    }

    /// Registers every configured subscription loss code.
    pub fn apply(&self) {
        for code in &self.subscription_loss_codes {
            add_subscription_loss_code(*code);
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Expands `$VAR` and `${VAR}` references in `input`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.next_if_eq(&'{').is_some();

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        if name.is_empty() {
            result.push('$');
            if braced {
                result.push('{');
            }
        } else if let Some(value) = lookup(&name) {
            result.push_str(&value);
        } else {
            result.push('$');
            if braced {
                result.push('{');
            }
            result.push_str(&name);
            if braced {
                result.push('}');
            }
        }
    }

    result
}

/// Parses a comma-separated list of status codes. Blank entries are skipped.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidCode`] for the first entry that is not a
/// `u16`.
pub fn parse_code_list(list: &str) -> Result<Vec<Code>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<u16>()
                .map(Code)
                .map_err(|source| ConfigError::InvalidCode {
                    value: entry.to_owned(),
                    source,
                })
        })
        .collect()
}
