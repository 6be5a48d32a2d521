// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;

use crate::attestation::AttestationError;
use crate::enclave::EnclaveError;
use crate::seed::{DecodeError, SeedValidationError};
use crate::storage::StoreError;

/// `SeedInitFailed`: the node cannot take part in the network.
///
/// Raised only during startup; the process entry point logs it and exits.
#[derive(Debug, thiserror::Error)]
pub enum SeedInitError {
    #[error("seed initialization failed: enclave api key unavailable: {0}")]
    ApiKey(String),

    #[error(
        "seed initialization failed: seed configuration {} was not found. Did you initialize the node?",
        .path.display()
    )]
    NotFound { path: PathBuf },

    #[error("seed initialization failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed initialization failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("seed initialization failed: {0}")]
    Validation(#[from] SeedValidationError),

    #[error("seed initialization failed: enclave rejected seed: {0}")]
    Enclave(String),
}

impl From<EnclaveError> for SeedInitError {
    fn from(e: EnclaveError) -> Self {
        SeedInitError::Enclave(e.0)
    }
}

/// `AuthenticateFailed`: a registration request was rejected.
///
/// Deterministic and non-fatal: the transaction fails, the node keeps running.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("failed to authenticate node: {0}")]
    Attestation(#[from] AttestationError),

    #[error("failed to authenticate node: enclave error: {0}")]
    Enclave(String),

    #[error("failed to authenticate node: {0}")]
    Store(#[from] StoreError),
}

impl From<EnclaveError> for AuthenticateError {
    fn from(e: EnclaveError) -> Self {
        AuthenticateError::Enclave(e.0)
    }
}
