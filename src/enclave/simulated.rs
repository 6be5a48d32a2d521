// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Software enclave for development networks and tests.
//!
//! Seeds are sealed for a peer with AES-256-GCM under a key agreed by
//! secp256k1 ECDH and expanded with HKDF-SHA256. Key and nonce are derived
//! from the shared secret and a per-seed label, so the same pair of enclaves
//! always produces the same ciphertext, as replicated execution requires.
//!
//! ## Sealed Seed Layout
//!
//! ```text
//! legacy:  genesis_seed(48)                       = 48 bytes
//! current: genesis_seed(48) || current_seed(48)   = 96 bytes
//! ```
//!
//! Each 48-byte block is a 32-byte seed plus the 16-byte GCM tag.

use std::fmt;
use std::sync::Mutex;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};

use super::{EnclaveError, EnclaveGateway};
use crate::attestation::{AttestationVerifier, Certificate};

pub const SEED_LENGTH: usize = 32;

/// One sealed seed: ciphertext plus GCM tag.
pub const SEALED_SEED_LENGTH: usize = SEED_LENGTH + 16;

const EXCHANGE_SALT: &[u8] = b"node-seed-exchange-v1";
const GENESIS_LABEL: &[u8] = b"genesis-seed";
const CURRENT_LABEL: &[u8] = b"current-seed";

#[derive(Clone, Copy)]
struct NetworkSeeds {
    genesis: [u8; SEED_LENGTH],
    current: [u8; SEED_LENGTH],
}

pub struct SimulatedEnclave<V> {
    secret: SecretKey,
    verifier: V,
    seeds: Mutex<Option<NetworkSeeds>>,
}

impl<V> fmt::Debug for SimulatedEnclave<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedEnclave")
            .field("public_key", &hex::encode(self.public_key()))
            .field("seeded", &self.is_seeded())
            .finish_non_exhaustive()
    }
}

impl<V> SimulatedEnclave<V> {
    /// An enclave that still has to receive the seed through `load_seed`.
    pub fn new(secret: SecretKey, verifier: V) -> Self {
        Self {
            secret,
            verifier,
            seeds: Mutex::new(None),
        }
    }

    /// The genesis node's enclave, created holding the network seed.
    pub fn bootstrap(secret: SecretKey, verifier: V, seed: [u8; SEED_LENGTH]) -> Self {
        Self {
            secret,
            verifier,
            seeds: Mutex::new(Some(NetworkSeeds {
                genesis: seed,
                current: seed,
            })),
        }
    }

    /// Compressed SEC1 encoding of the enclave public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.secret
            .public_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self.seeds.lock().as_deref(), Ok(Some(_)))
    }

    /// SHA-256 of the current seed, hex encoded.
    pub fn seed_fingerprint(&self) -> Option<String> {
        let seeds = *self.seeds.lock().ok()?;
        seeds.map(|s| hex::encode(Sha256::digest(s.current)))
    }

    fn exchange_cipher(
        &self,
        peer: &PublicKey,
        label: &[u8],
    ) -> Result<(Aes256Gcm, [u8; 12]), EnclaveError> {
        let shared = k256::ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), peer.as_affine());
        let hk = Hkdf::<Sha256>::new(Some(EXCHANGE_SALT), shared.raw_secret_bytes().as_slice());

        let mut okm = [0u8; 44];
        hk.expand(label, &mut okm)
            .map_err(|e| EnclaveError::new(format!("key derivation failed: {e}")))?;

        let cipher = Aes256Gcm::new_from_slice(&okm[..32])
            .map_err(|e| EnclaveError::new(format!("failed to create cipher: {e}")))?;
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&okm[32..]);
        Ok((cipher, nonce))
    }

    fn seal(
        &self,
        peer: &PublicKey,
        label: &[u8],
        seed: &[u8; SEED_LENGTH],
    ) -> Result<Vec<u8>, EnclaveError> {
        let (cipher, nonce) = self.exchange_cipher(peer, label)?;
        cipher
            .encrypt(Nonce::from_slice(&nonce), seed.as_slice())
            .map_err(|e| EnclaveError::new(format!("sealing failed: {e}")))
    }

    fn unseal(
        &self,
        peer: &PublicKey,
        label: &[u8],
        sealed: &[u8],
    ) -> Result<[u8; SEED_LENGTH], EnclaveError> {
        let (cipher, nonce) = self.exchange_cipher(peer, label)?;
        let plain = cipher
            .decrypt(Nonce::from_slice(&nonce), sealed)
            .map_err(|_| EnclaveError::new("failed to unseal seed: authentication failed"))?;
        <[u8; SEED_LENGTH]>::try_from(plain.as_slice())
            .map_err(|_| EnclaveError::new("unsealed seed has the wrong length"))
    }
}

impl<V: AttestationVerifier> EnclaveGateway for SimulatedEnclave<V> {
    fn load_seed(
        &self,
        master_key: &[u8],
        prefixed_seed: &[u8],
        api_key: &[u8],
    ) -> Result<(), EnclaveError> {
        if api_key.is_empty() {
            return Err(EnclaveError::new("enclave api key is empty"));
        }

        let (prefix, body) = prefixed_seed
            .split_first()
            .ok_or_else(|| EnclaveError::new("sealed seed is empty"))?;
        if *prefix != (body.len() as u16).to_le_bytes()[0] {
            return Err(EnclaveError::new(format!(
                "sealed seed length prefix {prefix} does not match body of {} bytes",
                body.len()
            )));
        }

        let master = PublicKey::from_sec1_bytes(master_key)
            .map_err(|e| EnclaveError::new(format!("invalid master public key: {e}")))?;

        let seeds = match body.len() {
            SEALED_SEED_LENGTH => {
                let genesis = self.unseal(&master, GENESIS_LABEL, body)?;
                NetworkSeeds {
                    genesis,
                    current: genesis,
                }
            }
            len if len == 2 * SEALED_SEED_LENGTH => {
                let (genesis, current) = body.split_at(SEALED_SEED_LENGTH);
                NetworkSeeds {
                    genesis: self.unseal(&master, GENESIS_LABEL, genesis)?,
                    current: self.unseal(&master, CURRENT_LABEL, current)?,
                }
            }
            len => {
                return Err(EnclaveError::new(format!(
                    "sealed seed has {len} bytes, expected {} or {}",
                    SEALED_SEED_LENGTH,
                    2 * SEALED_SEED_LENGTH
                )))
            }
        };

        let mut slot = self
            .seeds
            .lock()
            .map_err(|_| EnclaveError::new("enclave state lock poisoned"))?;
        *slot = Some(seeds);
        let legacy = body.len() == SEALED_SEED_LENGTH;
        tracing::info!(legacy, "Enclave seed loaded");
        Ok(())
    }

    fn get_encrypted_seed(&self, certificate: &Certificate) -> Result<Vec<u8>, EnclaveError> {
        let peer_key = self
            .verifier
            .verify(certificate)
            .map_err(|e| EnclaveError::new(e.to_string()))?;
        let peer = PublicKey::from_sec1_bytes(&peer_key)
            .map_err(|e| EnclaveError::new(format!("invalid peer public key: {e}")))?;

        let seeds = *self
            .seeds
            .lock()
            .map_err(|_| EnclaveError::new("enclave state lock poisoned"))?;
        let seeds = seeds.ok_or_else(|| EnclaveError::new("enclave holds no seed"))?;

        let mut sealed = self.seal(&peer, GENESIS_LABEL, &seeds.genesis)?;
        sealed.extend(self.seal(&peer, CURRENT_LABEL, &seeds.current)?);
        Ok(sealed)
    }
}
