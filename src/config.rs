// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the node binary. Configuration is loaded from the environment once at
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NODE_HOME` | Node home directory | `/opt/node` |
//! | `LEDGER_DB_PATH` | Ledger database file | `<home>/data/ledger.redb` |
//! | `BOOTSTRAP_NODE` | `true` for the genesis node (skips seed loading) | `false` |
//! | `ENCLAVE_API_KEY` | Enclave attestation-service API key | Optional |
//! | `ENCLAVE_API_KEY_FILE` | File holding the API key | `<home>/.node/api_key.txt` |
//! | `ENCLAVE_NODE_KEY` | Hex secp256k1 secret of the simulated enclave | Required |
//! | `ENCLAVE_BOOTSTRAP_SEED` | Hex 32-byte network seed (genesis node only) | Required when bootstrapping |
//! | `ATTESTATION_AUTHORITY_KEYS` | Comma-separated hex SEC1 authority keys | Required |
//! | `ATTESTATION_MR_ENCLAVE` | Comma-separated trusted MRENCLAVE values | Any |
//! | `ATTESTATION_MR_SIGNER` | Comma-separated trusted MRSIGNER values | Any |
//! | `ATTESTATION_MIN_SVN` | Minimum enclave security version | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;

use crate::storage::NodePaths;
use crate::telemetry::LogFormat;

/// Environment variable name for the node home directory.
///
/// The seed configuration and API key live under `<home>/.node/`.
///
/// # Default
/// `/opt/node`
pub const NODE_HOME_ENV: &str = "NODE_HOME";

pub const LEDGER_DB_PATH_ENV: &str = "LEDGER_DB_PATH";

/// Environment variable marking the genesis node.
///
/// The genesis node creates the network seed instead of loading one, so it
/// never reads a seed configuration file.
pub const BOOTSTRAP_NODE_ENV: &str = "BOOTSTRAP_NODE";

/// Environment variable holding the enclave API key inline.
///
/// Takes precedence over [`ENCLAVE_API_KEY_FILE_ENV`].
pub const ENCLAVE_API_KEY_ENV: &str = "ENCLAVE_API_KEY";

pub const ENCLAVE_API_KEY_FILE_ENV: &str = "ENCLAVE_API_KEY_FILE";

pub const ENCLAVE_NODE_KEY_ENV: &str = "ENCLAVE_NODE_KEY";

pub const ENCLAVE_BOOTSTRAP_SEED_ENV: &str = "ENCLAVE_BOOTSTRAP_SEED";

/// Environment variable for the trusted attestation authorities.
///
/// Comma-separated hex SEC1 secp256k1 verifying keys. At least one is
/// required: with no authority every certificate is rejected.
pub const ATTESTATION_AUTHORITY_KEYS_ENV: &str = "ATTESTATION_AUTHORITY_KEYS";

pub const ATTESTATION_MR_ENCLAVE_ENV: &str = "ATTESTATION_MR_ENCLAVE";

pub const ATTESTATION_MR_SIGNER_ENV: &str = "ATTESTATION_MR_SIGNER";

pub const ATTESTATION_MIN_SVN_ENV: &str = "ATTESTATION_MIN_SVN";

/// Environment variable selecting the log output format.
///
/// # Values
/// - `json` - one JSON object per line
/// - `pretty` - human-readable output (default)
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read enclave api key from {}: {source}", .path.display())]
    ApiKeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("enclave api key in {} is empty", .0.display())]
    EmptyApiKey(PathBuf),
}

/// Where the enclave API key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    Inline(String),
    File(PathBuf),
}

impl std::fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline(<redacted>)"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl ApiKeySource {
    pub fn load(&self) -> Result<Vec<u8>, ConfigError> {
        match self {
            Self::Inline(key) => Ok(key.as_bytes().to_vec()),
            Self::File(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| {
                    ConfigError::ApiKeyFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                let key = raw.trim();
                if key.is_empty() {
                    return Err(ConfigError::EmptyApiKey(path.clone()));
                }
                Ok(key.as_bytes().to_vec())
            }
        }
    }
}

/// Everything the node binary reads from its environment.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub paths: NodePaths,
    pub ledger_path: PathBuf,
    pub bootstrap: bool,
    pub api_key: ApiKeySource,
    /// Hex secret of the simulated enclave.
    pub enclave_node_key: String,
    pub bootstrap_seed: Option<String>,
    pub authority_keys: Vec<String>,
    pub trusted_enclaves: Vec<String>,
    pub trusted_signers: Vec<String>,
    pub min_svn: u16,
    pub log_format: LogFormat,
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let paths = var(NODE_HOME_ENV)
            .map(NodePaths::new)
            .unwrap_or_default();
        let ledger_path = var(LEDGER_DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.ledger_db());

        let bootstrap = match var(BOOTSTRAP_NODE_ENV) {
            Some(value) => parse_bool(BOOTSTRAP_NODE_ENV, &value)?,
            None => false,
        };

        let api_key = match (var(ENCLAVE_API_KEY_ENV), var(ENCLAVE_API_KEY_FILE_ENV)) {
            (Some(key), _) => ApiKeySource::Inline(key.trim().to_string()),
            (None, Some(file)) => ApiKeySource::File(PathBuf::from(file)),
            (None, None) => ApiKeySource::File(paths.api_key()),
        };

        let enclave_node_key =
            var(ENCLAVE_NODE_KEY_ENV).ok_or(ConfigError::Missing(ENCLAVE_NODE_KEY_ENV))?;
        let bootstrap_seed = var(ENCLAVE_BOOTSTRAP_SEED_ENV);
        if bootstrap && bootstrap_seed.is_none() {
            return Err(ConfigError::Missing(ENCLAVE_BOOTSTRAP_SEED_ENV));
        }

        let authority_keys = split_list(var(ATTESTATION_AUTHORITY_KEYS_ENV));
        if authority_keys.is_empty() {
            return Err(ConfigError::Missing(ATTESTATION_AUTHORITY_KEYS_ENV));
        }

        let min_svn = match var(ATTESTATION_MIN_SVN_ENV) {
            Some(value) => value.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: ATTESTATION_MIN_SVN_ENV,
                reason: format!("{e}"),
            })?,
            None => 0,
        };

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            paths,
            ledger_path,
            bootstrap,
            api_key,
            enclave_node_key,
            bootstrap_seed,
            authority_keys,
            trusted_enclaves: split_list(var(ATTESTATION_MR_ENCLAVE_ENV)),
            trusted_signers: split_list(var(ATTESTATION_MR_SIGNER_ENV)),
            min_svn,
            log_format,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got `{other}`"),
        }),
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
