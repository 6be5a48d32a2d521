// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Genesis import and export of the registry.

use serde::{Deserialize, Serialize};

use super::RegistrationService;
use crate::attestation::{AttestationError, AttestationVerifier, Certificate};
use crate::context::StateContext;
use crate::enclave::EnclaveGateway;
use crate::storage::{MasterCertificateKind, RecordCodec, RegistrationRecord, StoreError};

/// Registry contents at chain genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub registrations: Vec<RegistrationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_exch_master_certificate: Option<Certificate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_master_certificate: Option<Certificate>,
}

impl GenesisState {
    fn master_certificate(&self, kind: MasterCertificateKind) -> Option<&Certificate> {
        match kind {
            MasterCertificateKind::NodeExchange => self.node_exch_master_certificate.as_ref(),
            MasterCertificateKind::IoExchange => self.io_master_certificate.as_ref(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("genesis registration {index} has an invalid certificate: {source}")]
    Registration {
        index: usize,
        source: AttestationError,
    },

    #[error("genesis registers enclave key {public_key} more than once")]
    DuplicateRegistration { public_key: String },

    #[error("genesis {kind:?} master certificate is invalid: {source}")]
    MasterCertificate {
        kind: MasterCertificateKind,
        source: AttestationError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<V: AttestationVerifier, E: EnclaveGateway, C: RecordCodec> RegistrationService<V, E, C> {
    /// Import the genesis registry.
    ///
    /// Every certificate is verified. Run inside [`Ledger::execute`] so that
    /// one invalid entry discards the whole import.
    ///
    /// [`Ledger::execute`]: crate::storage::Ledger::execute
    pub fn init_genesis(
        &self,
        ctx: &mut StateContext<'_>,
        genesis: &GenesisState,
    ) -> Result<(), GenesisError> {
        for (index, record) in genesis.registrations.iter().enumerate() {
            let public_key = self
                .verifier()
                .verify(&record.certificate)
                .map_err(|source| GenesisError::Registration { index, source })?;

            if self
                .store()
                .insert_if_absent(ctx, &public_key, record)?
                .is_some()
            {
                return Err(GenesisError::DuplicateRegistration {
                    public_key: hex::encode(&public_key),
                });
            }
        }

        for kind in MasterCertificateKind::ALL {
            if let Some(certificate) = genesis.master_certificate(kind) {
                self.verifier()
                    .verify(certificate)
                    .map_err(|source| GenesisError::MasterCertificate { kind, source })?;
                self.store().set_master_certificate(ctx, kind, certificate)?;
            }
        }

        tracing::info!(
            registrations = genesis.registrations.len(),
            "Imported genesis registry"
        );
        Ok(())
    }

    /// Export the registry, ordered by enclave public key.
    pub fn export_genesis(&self, ctx: &StateContext<'_>) -> Result<GenesisState, GenesisError> {
        let registrations = self
            .store()
            .list(ctx)?
            .into_iter()
            .map(|(_, record)| record)
            .collect();

        Ok(GenesisState {
            registrations,
            node_exch_master_certificate: self
                .store()
                .master_certificate(ctx, MasterCertificateKind::NodeExchange)?,
            io_master_certificate: self
                .store()
                .master_certificate(ctx, MasterCertificateKind::IoExchange)?,
        })
    }
}
