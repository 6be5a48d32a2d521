// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed enclave reports.
//!
//! An attestation authority vouches for an enclave by signing its report
//! (public key, code measurement, signer identity, security version) with a
//! secp256k1 ECDSA key. The certificate is the JSON envelope:
//!
//! ```text
//! { "report": { "enclave_public_key": "<hex sec1>", "mr_enclave": "<hex>",
//!               "mr_signer": "<hex>", "isv_svn": 1 },
//!   "signature": "<hex, 64 bytes>" }
//! ```
//!
//! The signature covers the canonical JSON serialization of `report`.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

use super::{AttestationError, AttestationVerifier, Certificate};

/// Identity claims of an enclave, as vouched for by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveReport {
    /// SEC1-encoded secp256k1 public key generated inside the enclave.
    #[serde(with = "hex")]
    pub enclave_public_key: Vec<u8>,
    /// Hash of the enclave code (MRENCLAVE).
    pub mr_enclave: String,
    /// Hash of the enclave signing key (MRSIGNER).
    pub mr_signer: String,
    /// Security version number.
    pub isv_svn: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedReport {
    report: EnclaveReport,
    #[serde(with = "hex")]
    signature: Vec<u8>,
}

/// Which reports are accepted.
///
/// Empty allow lists accept any value.
#[derive(Debug, Clone, Default)]
pub struct AttestationPolicy {
    /// Authorities whose signatures are trusted. At least one is required.
    pub authorities: Vec<VerifyingKey>,
    /// Trusted MRENCLAVE values (lowercase hex).
    pub trusted_enclaves: Vec<String>,
    /// Trusted MRSIGNER values (lowercase hex).
    pub trusted_signers: Vec<String>,
    /// Minimum security version number.
    pub min_svn: u16,
}

impl AttestationPolicy {
    pub fn new(authorities: Vec<VerifyingKey>) -> Self {
        Self {
            authorities,
            ..Self::default()
        }
    }

    /// Parse authority keys from hex-encoded SEC1 points.
    pub fn from_hex_authorities<S: AsRef<str>>(keys: &[S]) -> Result<Self, AttestationError> {
        let authorities = keys
            .iter()
            .map(|key| {
                let bytes = hex::decode(key.as_ref().trim()).map_err(|e| {
                    AttestationError::Malformed(format!("authority key is not hex: {e}"))
                })?;
                VerifyingKey::from_sec1_bytes(&bytes).map_err(|e| {
                    AttestationError::Malformed(format!("invalid authority key: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(authorities))
    }

    pub fn with_trusted_enclaves(mut self, enclaves: Vec<String>) -> Self {
        self.trusted_enclaves = enclaves.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_trusted_signers(mut self, signers: Vec<String>) -> Self {
        self.trusted_signers = signers.into_iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn with_min_svn(mut self, min_svn: u16) -> Self {
        self.min_svn = min_svn;
        self
    }

    fn check(&self, report: &EnclaveReport) -> Result<(), AttestationError> {
        let mr_enclave = report.mr_enclave.to_lowercase();
        if !self.trusted_enclaves.is_empty() && !self.trusted_enclaves.contains(&mr_enclave) {
            return Err(AttestationError::UntrustedEnclave(mr_enclave));
        }

        let mr_signer = report.mr_signer.to_lowercase();
        if !self.trusted_signers.is_empty() && !self.trusted_signers.contains(&mr_signer) {
            return Err(AttestationError::UntrustedSigner(mr_signer));
        }

        if report.isv_svn < self.min_svn {
            return Err(AttestationError::OutdatedSvn {
                svn: report.isv_svn,
                min: self.min_svn,
            });
        }

        Ok(())
    }
}

/// Verifies certificates issued by [`issue_certificate`] against a policy.
#[derive(Debug, Clone)]
pub struct SignedReportVerifier {
    policy: AttestationPolicy,
}

impl SignedReportVerifier {
    pub fn new(policy: AttestationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AttestationPolicy {
        &self.policy
    }
}

impl AttestationVerifier for SignedReportVerifier {
    fn verify(&self, certificate: &Certificate) -> Result<Vec<u8>, AttestationError> {
        if self.policy.authorities.is_empty() {
            return Err(AttestationError::NoTrustedAuthority);
        }

        let envelope: SignedReport = serde_json::from_slice(certificate.as_bytes())
            .map_err(|e| AttestationError::Malformed(e.to_string()))?;
        let signature = Signature::from_slice(&envelope.signature)
            .map_err(|e| AttestationError::Malformed(format!("bad signature encoding: {e}")))?;
        let payload = serde_json::to_vec(&envelope.report)
            .map_err(|e| AttestationError::Malformed(e.to_string()))?;

        let signed_by_authority = self
            .policy
            .authorities
            .iter()
            .any(|authority| authority.verify(&payload, &signature).is_ok());
        if !signed_by_authority {
            return Err(AttestationError::InvalidSignature);
        }

        self.policy.check(&envelope.report)?;

        // Compressed form, so each enclave has exactly one identity.
        let enclave_key = k256::PublicKey::from_sec1_bytes(&envelope.report.enclave_public_key)
            .map_err(|e| {
                AttestationError::Malformed(format!(
                    "embedded enclave key is not a valid point: {e}"
                ))
            })?;

        Ok(enclave_key.to_encoded_point(true).as_bytes().to_vec())
    }
}

/// Sign `report` with the authority key and wrap it as a certificate.
pub fn issue_certificate(
    authority: &SigningKey,
    report: EnclaveReport,
) -> Result<Certificate, AttestationError> {
    let payload =
        serde_json::to_vec(&report).map_err(|e| AttestationError::Malformed(e.to_string()))?;
    let signature: Signature = authority.sign(&payload);
    let envelope = SignedReport {
        report,
        signature: signature.to_bytes().to_vec(),
    };
    serde_json::to_vec(&envelope)
        .map(Certificate::new)
        .map_err(|e| AttestationError::Malformed(e.to_string()))
}
