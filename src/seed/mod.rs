// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Seed Configuration
//!
//! Every node except the genesis node is provisioned with a seed file that
//! holds the network seed, encrypted for that node's enclave, together with
//! the master public key needed to open it.
//!
//! Two on-disk schemas exist and both are accepted:
//!
//! ```text
//! current: { "master_key": "<base64>",  "encrypted_key": "<hex>" }
//! legacy:  { "master_cert": "<base64>", "encrypted_key": "<hex>" }
//! ```
//!
//! A legacy document carries the master node's attestation certificate
//! instead of its key; the key is recovered by verifying the certificate.
//! Either way the result is one canonical [`SeedConfig`].

pub mod codec;

pub use codec::{
    decode, encode, encode_length_prefixed, validate, SeedConfig, SeedDocument,
    ENCRYPTED_KEY_LENGTH, LEGACY_ENCRYPTED_KEY_LENGTH,
};

use crate::attestation::AttestationError;

/// The seed file could not be turned into a [`SeedConfig`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("seed configuration is not valid JSON for either schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seed configuration field `{field}` is not valid base64: {reason}")]
    Base64 { field: &'static str, reason: String },

    #[error("seed configuration carries neither a master key nor a master certificate")]
    MissingMasterKey,

    #[error("legacy master certificate rejected: {0}")]
    LegacyCertificate(#[from] AttestationError),
}

/// `SeedValidationParams`: the encrypted key has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedValidationError {
    #[error(
        "invalid parameter: `seed` in seed parameters has {length} characters, \
         expected {expected} or {legacy} after the 2-character prefix. Did you initialize the node?",
        expected = ENCRYPTED_KEY_LENGTH,
        legacy = LEGACY_ENCRYPTED_KEY_LENGTH
    )]
    Length { length: usize },

    #[error("invalid parameter: `seed` in seed parameters is not hex. Did you initialize the node?")]
    NotHex,
}
