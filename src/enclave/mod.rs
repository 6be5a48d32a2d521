// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Enclave Gateway
//!
//! The trusted component that holds the network seed. The node never sees
//! the seed in plaintext: it hands sealed key material to the enclave at
//! startup and asks the enclave to seal the seed for newly attested peers.
//!
//! Enclave failures are opaque strings; callers wrap them in their own
//! error types without interpreting them.

pub mod simulated;

use std::sync::Arc;

use crate::attestation::Certificate;

pub use simulated::SimulatedEnclave;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct EnclaveError(pub String);

impl EnclaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub trait EnclaveGateway {
    /// Install the network seed from the node's seed configuration.
    ///
    /// `master_key` is the public key of the node that sealed the seed and
    /// `prefixed_seed` is the sealed seed behind a one-byte length prefix.
    fn load_seed(
        &self,
        master_key: &[u8],
        prefixed_seed: &[u8],
        api_key: &[u8],
    ) -> Result<(), EnclaveError>;

    /// Seal the network seed for the enclave attested by `certificate`.
    fn get_encrypted_seed(&self, certificate: &Certificate) -> Result<Vec<u8>, EnclaveError>;
}

impl<T: EnclaveGateway + ?Sized> EnclaveGateway for &T {
    fn load_seed(
        &self,
        master_key: &[u8],
        prefixed_seed: &[u8],
        api_key: &[u8],
    ) -> Result<(), EnclaveError> {
        (**self).load_seed(master_key, prefixed_seed, api_key)
    }

    fn get_encrypted_seed(&self, certificate: &Certificate) -> Result<Vec<u8>, EnclaveError> {
        (**self).get_encrypted_seed(certificate)
    }
}

impl<T: EnclaveGateway + ?Sized> EnclaveGateway for Arc<T> {
    fn load_seed(
        &self,
        master_key: &[u8],
        prefixed_seed: &[u8],
        api_key: &[u8],
    ) -> Result<(), EnclaveError> {
        (**self).load_seed(master_key, prefixed_seed, api_key)
    }

    fn get_encrypted_seed(&self, certificate: &Certificate) -> Result<Vec<u8>, EnclaveError> {
        (**self).get_encrypted_seed(certificate)
    }
}
