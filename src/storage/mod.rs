// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Node Storage
//!
//! Replicated state lives in a single redb database. Every state transition
//! runs inside one write transaction (see [`Ledger::execute`]), so a
//! transition either commits all of its writes or none of them.
//!
//! ## Layout
//!
//! ```text
//! <home>/
//!   .node/
//!     seed.json       # Provisioned seed configuration (joining nodes)
//!     api_key.txt     # Enclave attestation-service API key
//!   data/
//!     ledger.redb     # Registrations and master certificates
//! ```

pub mod ledger;
pub mod paths;
pub mod registry;

pub use ledger::{Executed, Ledger};
pub use paths::NodePaths;
pub use registry::{
    JsonRecordCodec, MasterCertificateKind, RecordCodec, RegistrationRecord, RegistrationStore,
};

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("ledger state is read-only in queries")]
    ReadOnly,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to create storage directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
