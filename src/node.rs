// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Node startup: wire configuration, attestation, enclave and ledger
//! together.

use std::sync::Arc;

use k256::SecretKey;

use crate::attestation::{AttestationError, AttestationPolicy, SignedReportVerifier};
use crate::config::{ConfigError, NodeConfig, ENCLAVE_BOOTSTRAP_SEED_ENV, ENCLAVE_NODE_KEY_ENV};
use crate::enclave::simulated::SEED_LENGTH;
use crate::enclave::SimulatedEnclave;
use crate::error::SeedInitError;
use crate::registration::RegistrationService;
use crate::storage::{Ledger, StoreError};

pub type NodeVerifier = Arc<SignedReportVerifier>;
pub type NodeEnclave = SimulatedEnclave<NodeVerifier>;
pub type NodeService = RegistrationService<NodeVerifier, NodeEnclave>;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid attestation policy: {0}")]
    Attestation(#[from] AttestationError),

    #[error(transparent)]
    SeedInit(#[from] SeedInitError),

    #[error("failed to open ledger: {0}")]
    Store(#[from] StoreError),
}

pub struct Node {
    pub ledger: Ledger,
    pub service: NodeService,
}

/// Start a node. Fails fast when the seed cannot be loaded.
pub fn start(config: &NodeConfig) -> Result<Node, StartupError> {
    let policy = AttestationPolicy::from_hex_authorities(&config.authority_keys)?
        .with_trusted_enclaves(config.trusted_enclaves.clone())
        .with_trusted_signers(config.trusted_signers.clone())
        .with_min_svn(config.min_svn);
    let verifier = Arc::new(SignedReportVerifier::new(policy));

    let secret = parse_secret(&config.enclave_node_key)?;
    let enclave = match (&config.bootstrap_seed, config.bootstrap) {
        (Some(seed), true) => {
            SimulatedEnclave::bootstrap(secret, Arc::clone(&verifier), parse_seed(seed)?)
        }
        (_, true) => return Err(ConfigError::Missing(ENCLAVE_BOOTSTRAP_SEED_ENV).into()),
        (_, false) => SimulatedEnclave::new(secret, Arc::clone(&verifier)),
    };
    tracing::info!(
        public_key = %hex::encode(enclave.public_key()),
        bootstrap = config.bootstrap,
        "Enclave ready"
    );

    let service = RegistrationService::new(
        &config.paths,
        verifier,
        enclave,
        config.bootstrap,
        &config.api_key,
    )?;
    let ledger = Ledger::open(&config.ledger_path)?;

    Ok(Node { ledger, service })
}

fn parse_secret(value: &str) -> Result<SecretKey, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: ENCLAVE_NODE_KEY_ENV,
        reason,
    };
    let bytes = hex::decode(value.trim()).map_err(|e| invalid(e.to_string()))?;
    SecretKey::from_slice(&bytes).map_err(|e| invalid(e.to_string()))
}

fn parse_seed(value: &str) -> Result<[u8; SEED_LENGTH], ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: ENCLAVE_BOOTSTRAP_SEED_ENV,
        reason,
    };
    let bytes = hex::decode(value.trim()).map_err(|e| invalid(e.to_string()))?;
    <[u8; SEED_LENGTH]>::try_from(bytes.as_slice())
        .map_err(|_| invalid(format!("expected {SEED_LENGTH} bytes, got {}", bytes.len())))
}
