// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! Each state transition maps to one redb write transaction. redb admits a
//! single writer at a time, so transitions are applied strictly one after
//! another and a check-then-insert inside one transition cannot interleave
//! with another.

use std::path::Path;

use redb::{Database, ReadableDatabase};

use super::{registry, StoreError, StoreResult};
use crate::context::{BlockHeader, Event, StateContext};

/// Outcome of a committed state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed<T> {
    pub value: T,
    pub events: Vec<Event>,
}

pub struct Ledger {
    db: Database,
}

impl Ledger {
    /// Open (or create) the ledger at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later transitions never race on creation
        let write_txn = db.begin_write()?;
        registry::create_tables(&write_txn)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Run one state transition.
    ///
    /// Writes made through the context are committed when `f` returns `Ok`
    /// and discarded when it returns `Err`. Events are only surfaced for
    /// committed transitions.
    pub fn execute<T, E, F>(&self, header: BlockHeader, f: F) -> Result<Executed<T>, E>
    where
        F: FnOnce(&mut StateContext<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let mut ctx = StateContext::new(header, &write_txn);

        match f(&mut ctx) {
            Ok(value) => {
                let events = ctx.into_events();
                write_txn.commit().map_err(StoreError::from)?;
                Ok(Executed { value, events })
            }
            Err(e) => {
                drop(ctx);
                write_txn.abort().map_err(StoreError::from)?;
                tracing::debug!(height = header.height, "State transition rolled back");
                Err(e)
            }
        }
    }

    /// Run `f` against the latest committed state.
    ///
    /// The context wraps a read transaction: writes fail with
    /// [`StoreError::ReadOnly`] and queries never wait on the writer.
    pub fn query<T, E, F>(&self, header: BlockHeader, f: F) -> Result<T, E>
    where
        F: FnOnce(&StateContext<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let read_txn = self.db.begin_read().map_err(StoreError::from)?;
        let ctx = StateContext::read_only(header, &read_txn);
        f(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::Certificate;
    use crate::storage::{RegistrationRecord, RegistrationStore};

    fn temp_ledger() -> (Ledger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("data").join("ledger.redb")).unwrap();
        (ledger, dir)
    }

    fn record(tag: u8) -> RegistrationRecord {
        RegistrationRecord {
            certificate: Certificate::new(vec![tag; 4]),
            encrypted_seed: vec![tag; 96],
        }
    }

    #[test]
    fn open_creates_parent_directories() {
        let (_ledger, dir) = temp_ledger();
        assert!(dir.path().join("data").join("ledger.redb").exists());
    }

    #[test]
    fn committed_transition_persists_and_reports_events() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        let executed = ledger
            .execute(BlockHeader::new(1, 100), |ctx| {
                store.insert_if_absent(ctx, b"node-a", &record(1))?;
                ctx.emit_event(Event::new("node_registered"));
                Ok::<_, StoreError>(7)
            })
            .unwrap();
        assert_eq!(executed.value, 7);
        assert_eq!(executed.events.len(), 1);

        let stored = ledger
            .query(BlockHeader::new(2, 100), |ctx| store.get(ctx, b"node-a"))
            .unwrap();
        assert_eq!(stored, Some(record(1)));
    }

    #[derive(Debug)]
    enum TestError {
        Store(StoreError),
        Rejected,
    }

    impl From<StoreError> for TestError {
        fn from(e: StoreError) -> Self {
            TestError::Store(e)
        }
    }

    #[test]
    fn failed_transition_rolls_back_all_writes() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        let result = ledger.execute(BlockHeader::new(1, 100), |ctx| {
            store.insert_if_absent(ctx, b"node-a", &record(1))?;
            store.insert_if_absent(ctx, b"node-b", &record(2))?;
            Err::<(), _>(TestError::Rejected)
        });
        assert!(matches!(result, Err(TestError::Rejected)));

        let present = ledger
            .query(BlockHeader::new(2, 100), |ctx| {
                Ok::<_, StoreError>((
                    store.contains(ctx, b"node-a")?,
                    store.contains(ctx, b"node-b")?,
                ))
            })
            .unwrap();
        assert_eq!(present, (false, false));
    }

    #[test]
    fn query_refuses_writes() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();

        let result = ledger.query(BlockHeader::new(1, 100), |ctx| {
            assert!(ctx.is_read_only());
            store.insert_if_absent(ctx, b"node-a", &record(1))
        });
        assert!(matches!(result, Err(StoreError::ReadOnly)));

        let present = ledger
            .query(BlockHeader::new(1, 100), |ctx| store.contains(ctx, b"node-a"))
            .unwrap();
        assert!(!present);
    }

    #[test]
    fn query_inside_a_transition_sees_committed_state() {
        let (ledger, _dir) = temp_ledger();
        let store: RegistrationStore = RegistrationStore::default();
        ledger
            .execute(BlockHeader::new(1, 100), |ctx| {
                store.insert_if_absent(ctx, b"node-a", &record(1))
            })
            .unwrap();

        let (committed, pending) = ledger
            .execute(BlockHeader::new(2, 100), |ctx| {
                store.insert_if_absent(ctx, b"node-b", &record(2))?;
                ledger.query(BlockHeader::new(2, 100), |read| {
                    Ok::<_, StoreError>((
                        store.contains(read, b"node-a")?,
                        store.contains(read, b"node-b")?,
                    ))
                })
            })
            .unwrap()
            .value;
        assert!(committed);
        assert!(!pending);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        let store: RegistrationStore = RegistrationStore::default();
        {
            let ledger = Ledger::open(&path).unwrap();
            ledger
                .execute(BlockHeader::new(1, 100), |ctx| {
                    store.insert_if_absent(ctx, b"node-a", &record(3))
                })
                .unwrap();
        }

        let ledger = Ledger::open(&path).unwrap();
        let stored = ledger
            .query(BlockHeader::new(2, 100), |ctx| store.get(ctx, b"node-a"))
            .unwrap();
        assert_eq!(stored, Some(record(3)));
    }
}
