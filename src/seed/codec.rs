// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoding, validation and re-encoding of seed configuration files.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};

use super::{DecodeError, SeedValidationError};
use crate::attestation::{AttestationVerifier, Certificate};

/// Hex length of a current-format encrypted key (96 bytes).
pub const ENCRYPTED_KEY_LENGTH: usize = 192;

/// Hex length of a legacy-format encrypted key (48 bytes).
pub const LEGACY_ENCRYPTED_KEY_LENGTH: usize = 96;

/// Hex characters taken by the length prefix written by
/// [`encode_length_prefixed`].
const PREFIX_HEX_LEN: usize = 2;

/// Canonical seed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    /// Public key of the master enclave that sealed the seed.
    pub master_key: Vec<u8>,
    /// Hex-encoded sealed seed.
    pub encrypted_key: String,
}

impl SeedConfig {
    /// Hex-decode the encrypted key.
    pub fn encrypted_key_bytes(&self) -> Result<Vec<u8>, SeedValidationError> {
        hex::decode(&self.encrypted_key).map_err(|_| SeedValidationError::NotHex)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CurrentSeedFile {
    #[serde(default)]
    master_key: String,
    encrypted_key: String,
}

#[derive(Debug, Deserialize)]
struct LegacySeedFile {
    #[serde(default)]
    master_cert: String,
    encrypted_key: String,
}

/// A parsed seed file, before the legacy certificate is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedDocument {
    Current {
        master_key: Vec<u8>,
        encrypted_key: String,
    },
    Legacy {
        master_cert: Certificate,
        encrypted_key: String,
    },
}

impl SeedDocument {
    /// Parse raw seed-file bytes.
    ///
    /// The current schema is tried first. The legacy schema is used when the
    /// current one does not parse, or parses without a master key while the
    /// document carries a master certificate.
    pub fn parse(raw: &[u8]) -> Result<Self, DecodeError> {
        match serde_json::from_slice::<CurrentSeedFile>(raw) {
            Ok(current) if !current.master_key.is_empty() => Ok(SeedDocument::Current {
                master_key: decode_base64("master_key", &current.master_key)?,
                encrypted_key: current.encrypted_key,
            }),
            Ok(_) => match serde_json::from_slice::<LegacySeedFile>(raw) {
                Ok(legacy) if !legacy.master_cert.is_empty() => Self::from_legacy(legacy),
                _ => Err(DecodeError::MissingMasterKey),
            },
            Err(current_err) => match serde_json::from_slice::<LegacySeedFile>(raw) {
                Ok(legacy) => Self::from_legacy(legacy),
                Err(_) => Err(DecodeError::Json(current_err)),
            },
        }
    }

    fn from_legacy(legacy: LegacySeedFile) -> Result<Self, DecodeError> {
        Ok(SeedDocument::Legacy {
            master_cert: Certificate::new(decode_base64("master_cert", &legacy.master_cert)?),
            encrypted_key: legacy.encrypted_key,
        })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, SeedDocument::Legacy { .. })
    }

    /// Collapse into the canonical form, resolving a legacy master
    /// certificate to its public key.
    pub fn resolve<V: AttestationVerifier + ?Sized>(
        self,
        verifier: &V,
    ) -> Result<SeedConfig, DecodeError> {
        let config = match self {
            SeedDocument::Current {
                master_key,
                encrypted_key,
            } => SeedConfig {
                master_key,
                encrypted_key,
            },
            SeedDocument::Legacy {
                master_cert,
                encrypted_key,
            } => {
                if master_cert.is_empty() {
                    return Err(DecodeError::MissingMasterKey);
                }
                SeedConfig {
                    master_key: verifier.verify(&master_cert)?,
                    encrypted_key,
                }
            }
        };

        if config.master_key.is_empty() {
            return Err(DecodeError::MissingMasterKey);
        }
        Ok(config)
    }
}

fn decode_base64(field: &'static str, value: &str) -> Result<Vec<u8>, DecodeError> {
    Base64::decode_vec(value).map_err(|e| DecodeError::Base64 {
        field,
        reason: e.to_string(),
    })
}

/// Decode seed-file bytes in either schema into a [`SeedConfig`].
pub fn decode<V: AttestationVerifier + ?Sized>(
    raw: &[u8],
    verifier: &V,
) -> Result<SeedConfig, DecodeError> {
    let document = SeedDocument::parse(raw)?;
    tracing::debug!(legacy = document.is_legacy(), "Parsed seed configuration");
    document.resolve(verifier)
}

/// Serialize a [`SeedConfig`] in the current schema.
pub fn encode(config: &SeedConfig) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(&CurrentSeedFile {
        master_key: Base64::encode_string(&config.master_key),
        encrypted_key: config.encrypted_key.clone(),
    })
}

/// Check the encrypted key of a length-prefixed configuration.
///
/// The key, minus its 2-character prefix, must be exactly
/// [`ENCRYPTED_KEY_LENGTH`] or [`LEGACY_ENCRYPTED_KEY_LENGTH`] characters of
/// valid hex.
pub fn validate(config: &SeedConfig) -> Result<(), SeedValidationError> {
    let length = config.encrypted_key.len();
    let body = length.checked_sub(PREFIX_HEX_LEN);
    if body != Some(ENCRYPTED_KEY_LENGTH) && body != Some(LEGACY_ENCRYPTED_KEY_LENGTH) {
        return Err(SeedValidationError::Length { length });
    }
    config.encrypted_key_bytes()?;
    Ok(())
}

/// Prefix `raw` with the low byte of its length.
///
/// The prefix is a single byte holding only the least-significant byte of the
/// 16-bit length. Inputs of 256 bytes or more therefore carry a truncated
/// length; this is the established on-disk format and must not change without
/// a coordinated migration.
pub fn encode_length_prefixed(raw: &[u8]) -> Vec<u8> {
    let length = (raw.len() as u16).to_le_bytes();
    let mut out = Vec::with_capacity(raw.len() + 1);
    out.push(length[0]);
    out.extend_from_slice(raw);
    out
}
