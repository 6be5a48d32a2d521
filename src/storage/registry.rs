// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration store.
//!
//! ## Table Layout
//!
//! - `registrations`: enclave public key → encoded [`RegistrationRecord`]
//! - `master_certificates`: certificate kind → certificate bytes
//!
//! Records are written at most once per public key. All access goes through
//! a [`StateContext`], so reads observe the current transition's writes and
//! writes commit or roll back with it. Writes through a query context fail
//! with [`StoreError::ReadOnly`](super::StoreError::ReadOnly).

use redb::{ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::StoreResult;
use crate::attestation::Certificate;
use crate::context::{StateContext, Txn};

// =============================================================================
// Table Definitions
// =============================================================================

const REGISTRATIONS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("registrations");

const MASTER_CERTIFICATES: TableDefinition<&str, &[u8]> =
    TableDefinition::new("master_certificates");

pub(crate) fn create_tables(txn: &WriteTransaction) -> StoreResult<()> {
    let _ = txn.open_table(REGISTRATIONS)?;
    let _ = txn.open_table(MASTER_CERTIFICATES)?;
    Ok(())
}

// =============================================================================
// Records
// =============================================================================

/// What the ledger remembers about a registered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub certificate: Certificate,
    /// Network seed encrypted for the node's enclave key.
    #[serde(with = "hex")]
    pub encrypted_seed: Vec<u8>,
}

/// Serialization of records into store values.
///
/// Any lossless encoding works; it must be identical on every replica.
pub trait RecordCodec {
    fn encode(&self, record: &RegistrationRecord) -> StoreResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> StoreResult<RegistrationRecord>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordCodec;

impl RecordCodec for JsonRecordCodec {
    fn encode(&self, record: &RegistrationRecord) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<RegistrationRecord> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Network-level master certificates, set at genesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterCertificateKind {
    /// Certificate of the key that seals seeds for joining nodes.
    NodeExchange,
    /// Certificate of the key used for client input/output encryption.
    IoExchange,
}

impl MasterCertificateKind {
    pub const ALL: [MasterCertificateKind; 2] = [Self::NodeExchange, Self::IoExchange];

    fn key(self) -> &'static str {
        match self {
            Self::NodeExchange => "node_exchange",
            Self::IoExchange => "io_exchange",
        }
    }
}

// =============================================================================
// RegistrationStore
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct RegistrationStore<C = JsonRecordCodec> {
    codec: C,
}

impl<C: RecordCodec> RegistrationStore<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn get(
        &self,
        ctx: &StateContext<'_>,
        public_key: &[u8],
    ) -> StoreResult<Option<RegistrationRecord>> {
        let value = match ctx.txn() {
            Txn::Write(txn) => read_value(&txn.open_table(REGISTRATIONS)?, public_key)?,
            Txn::Read(txn) => read_value(&txn.open_table(REGISTRATIONS)?, public_key)?,
        };
        value.map(|bytes| self.codec.decode(&bytes)).transpose()
    }

    pub fn contains(&self, ctx: &StateContext<'_>, public_key: &[u8]) -> StoreResult<bool> {
        let value = match ctx.txn() {
            Txn::Write(txn) => read_value(&txn.open_table(REGISTRATIONS)?, public_key)?,
            Txn::Read(txn) => read_value(&txn.open_table(REGISTRATIONS)?, public_key)?,
        };
        Ok(value.is_some())
    }

    /// Store `record` under `public_key` unless a record already exists.
    ///
    /// Returns the existing record when one was found, in which case nothing
    /// is written.
    pub fn insert_if_absent(
        &self,
        ctx: &StateContext<'_>,
        public_key: &[u8],
        record: &RegistrationRecord,
    ) -> StoreResult<Option<RegistrationRecord>> {
        let mut table = ctx.write_txn()?.open_table(REGISTRATIONS)?;

        let existing = match table.get(public_key)? {
            Some(value) => Some(self.codec.decode(value.value())?),
            None => None,
        };
        if existing.is_some() {
            return Ok(existing);
        }

        let bytes = self.codec.encode(record)?;
        table.insert(public_key, bytes.as_slice())?;
        Ok(None)
    }

    /// All records in ascending public-key order.
    pub fn list(&self, ctx: &StateContext<'_>) -> StoreResult<Vec<(Vec<u8>, RegistrationRecord)>> {
        let entries = match ctx.txn() {
            Txn::Write(txn) => read_entries(&txn.open_table(REGISTRATIONS)?)?,
            Txn::Read(txn) => read_entries(&txn.open_table(REGISTRATIONS)?)?,
        };
        entries
            .into_iter()
            .map(|(key, bytes)| self.codec.decode(&bytes).map(|record| (key, record)))
            .collect()
    }

    // =========================================================================
    // Master certificates
    // =========================================================================

    pub fn set_master_certificate(
        &self,
        ctx: &StateContext<'_>,
        kind: MasterCertificateKind,
        certificate: &Certificate,
    ) -> StoreResult<()> {
        let mut table = ctx.write_txn()?.open_table(MASTER_CERTIFICATES)?;
        table.insert(kind.key(), certificate.as_bytes())?;
        Ok(())
    }

    pub fn master_certificate(
        &self,
        ctx: &StateContext<'_>,
        kind: MasterCertificateKind,
    ) -> StoreResult<Option<Certificate>> {
        let value = match ctx.txn() {
            Txn::Write(txn) => read_certificate(&txn.open_table(MASTER_CERTIFICATES)?, kind)?,
            Txn::Read(txn) => read_certificate(&txn.open_table(MASTER_CERTIFICATES)?, kind)?,
        };
        Ok(value.map(Certificate::new))
    }
}

fn read_value<T>(table: &T, key: &[u8]) -> StoreResult<Option<Vec<u8>>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let value = table.get(key)?.map(|guard| guard.value().to_vec());
    Ok(value)
}

fn read_entries<T>(table: &T) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let mut entries = Vec::new();
    for entry in table.iter()? {
        let (key, value) = entry?;
        entries.push((key.value().to_vec(), value.value().to_vec()));
    }
    Ok(entries)
}

fn read_certificate<T>(table: &T, kind: MasterCertificateKind) -> StoreResult<Option<Vec<u8>>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let value = table.get(kind.key())?.map(|guard| guard.value().to_vec());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BlockHeader;
    use crate::storage::{Ledger, StoreError};

    fn temp_ledger() -> (Ledger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("ledger.redb")).unwrap();
        (ledger, dir)
    }

    fn record(tag: u8) -> RegistrationRecord {
        RegistrationRecord {
            certificate: Certificate::new(vec![tag; 8]),
            encrypted_seed: vec![tag; 96],
        }
    }

    fn header() -> BlockHeader {
        BlockHeader::new(1, 100)
    }

    #[test]
    fn first_writer_wins() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        let (first, second, stored) = ledger
            .execute(header(), |ctx| {
                let first = store.insert_if_absent(ctx, b"key", &record(1))?;
                let second = store.insert_if_absent(ctx, b"key", &record(2))?;
                let stored = store.get(ctx, b"key")?;
                Ok::<_, StoreError>((first, second, stored))
            })
            .unwrap()
            .value;

        assert_eq!(first, None);
        assert_eq!(second, Some(record(1)));
        assert_eq!(stored, Some(record(1)));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        let (stored, present) = ledger
            .query(header(), |ctx| {
                Ok::<_, StoreError>((store.get(ctx, b"nope")?, store.contains(ctx, b"nope")?))
            })
            .unwrap();
        assert_eq!(stored, None);
        assert!(!present);
    }

    #[test]
    fn list_is_ordered_by_key() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        ledger
            .execute(header(), |ctx| {
                store.insert_if_absent(ctx, b"bbb", &record(2))?;
                store.insert_if_absent(ctx, b"aaa", &record(1))?;
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let listed = ledger.query(header(), |ctx| store.list(ctx)).unwrap();
        assert_eq!(
            listed,
            vec![(b"aaa".to_vec(), record(1)), (b"bbb".to_vec(), record(2))]
        );
    }

    #[test]
    fn master_certificates_are_keyed_by_kind() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();
        let node_cert = Certificate::new(b"node".to_vec());

        ledger
            .execute(header(), |ctx| {
                store.set_master_certificate(ctx, MasterCertificateKind::NodeExchange, &node_cert)
            })
            .unwrap();

        let (node, io) = ledger
            .query(header(), |ctx| {
                Ok::<_, StoreError>((
                    store.master_certificate(ctx, MasterCertificateKind::NodeExchange)?,
                    store.master_certificate(ctx, MasterCertificateKind::IoExchange)?,
                ))
            })
            .unwrap();
        assert_eq!(node, Some(node_cert));
        assert_eq!(io, None);
    }

    #[test]
    fn json_codec_encodes_hex_fields() {
        let bytes = JsonRecordCodec.encode(&record(0xab)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["certificate"], "ab".repeat(8));
        assert_eq!(JsonRecordCodec.decode(&bytes).unwrap(), record(0xab));
    }

    #[test]
    fn corrupt_value_surfaces_as_serde_error() {
        let result = JsonRecordCodec.decode(b"{not json");
        assert!(matches!(result, Err(StoreError::Serde(_))));
    }
}
