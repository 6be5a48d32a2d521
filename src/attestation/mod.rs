// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Remote Attestation
//!
//! A joining node proves it runs genuine enclave code by presenting an
//! attestation certificate. The certificate embeds the enclave's public key;
//! a verifier checks the certificate and hands that key back.
//!
//! The verifier is a capability passed into the services that need it, so
//! deterministic test doubles can stand in for real hardware verification.
//!
//! - [`AttestationVerifier`] - the contract consumed by registration
//! - [`report`] - a verifier for ECDSA-signed enclave reports

pub mod report;

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use report::{issue_certificate, AttestationPolicy, EnclaveReport, SignedReportVerifier};

/// Opaque attestation-certificate bytes.
///
/// Serialized as a lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Certificate {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Certificate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Certificate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        hex::deserialize(deserializer).map(Certificate)
    }
}

/// Reasons a certificate is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    #[error("malformed attestation certificate: {0}")]
    Malformed(String),

    #[error("no trusted attestation authority is configured")]
    NoTrustedAuthority,

    #[error("certificate signature does not verify against any trusted authority")]
    InvalidSignature,

    #[error("enclave measurement {0} is not trusted")]
    UntrustedEnclave(String),

    #[error("enclave signer {0} is not trusted")]
    UntrustedSigner(String),

    #[error("enclave security version {svn} is below the required minimum {min}")]
    OutdatedSvn { svn: u16, min: u16 },
}

/// Validates an attestation certificate and extracts the enclave public key.
///
/// Implementations must be deterministic: identical certificate bytes always
/// yield the same result, on every replica.
pub trait AttestationVerifier {
    fn verify(&self, certificate: &Certificate) -> Result<Vec<u8>, AttestationError>;
}

impl<T: AttestationVerifier + ?Sized> AttestationVerifier for &T {
    fn verify(&self, certificate: &Certificate) -> Result<Vec<u8>, AttestationError> {
        (**self).verify(certificate)
    }
}

impl<T: AttestationVerifier + ?Sized> AttestationVerifier for Arc<T> {
    fn verify(&self, certificate: &Certificate) -> Result<Vec<u8>, AttestationError> {
        (**self).verify(certificate)
    }
}
