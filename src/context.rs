// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! State-transition context handed to every ledger operation.
//!
//! A [`StateContext`] wraps the open transaction of the current transition
//! together with the block header and the event stream. Store reads and
//! writes go through the transaction, so they commit or roll back with
//! everything else the transition touched. Queries get a context over a read
//! transaction and cannot write.

use redb::{ReadTransaction, WriteTransaction};

use crate::storage::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Header of the block being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u64,
    /// Gas limit of the transaction; `0` means no limit was imposed.
    pub gas_limit: u64,
}

impl BlockHeader {
    pub fn new(height: u64, gas_limit: u64) -> Self {
        Self { height, gas_limit }
    }

    /// Fee-estimation runs execute past genesis without a gas limit.
    pub fn is_simulation(&self) -> bool {
        self.gas_limit == 0 && self.height != 0
    }
}

/// A typed event with string attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Txn<'txn> {
    Write(&'txn WriteTransaction),
    Read(&'txn ReadTransaction),
}

pub struct StateContext<'txn> {
    header: BlockHeader,
    txn: Txn<'txn>,
    events: Vec<Event>,
}

impl<'txn> StateContext<'txn> {
    pub(crate) fn new(header: BlockHeader, txn: &'txn WriteTransaction) -> Self {
        Self {
            header,
            txn: Txn::Write(txn),
            events: Vec::new(),
        }
    }

    pub(crate) fn read_only(header: BlockHeader, txn: &'txn ReadTransaction) -> Self {
        Self {
            header,
            txn: Txn::Read(txn),
            events: Vec::new(),
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn block_height(&self) -> u64 {
        self.header.height
    }

    pub fn is_simulation(&self) -> bool {
        self.header.is_simulation()
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.txn, Txn::Read(_))
    }

    pub(crate) fn txn(&self) -> Txn<'txn> {
        self.txn
    }

    pub(crate) fn write_txn(&self) -> StoreResult<&'txn WriteTransaction> {
        match self.txn {
            Txn::Write(txn) => Ok(txn),
            Txn::Read(_) => Err(StoreError::ReadOnly),
        }
    }

    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn emit_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn into_events(self) -> Vec<Event> {
        self.events
    }
}
