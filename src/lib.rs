// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enclave Registration - Secure Node Registration & Seed Provisioning
//!
//! Nodes of a confidential network share a single seed. A joining node proves
//! through remote attestation that it runs genuine enclave code and receives
//! the seed sealed for its enclave; the ledger remembers what was issued so
//! that every later request for the same enclave gets the same answer.
//!
//! ## Modules
//!
//! - `attestation` - certificate verification contract and signed reports
//! - `seed` - seed configuration file codec (current and legacy schemas)
//! - `enclave` - enclave gateway contract and a software enclave
//! - `storage` - redb ledger and registration store
//! - `registration` - node initialization, registration and genesis
//! - `dispatch` - signer check for messages re-injected by programs
//! - `node` - startup wiring for the binary

pub mod attestation;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod enclave;
pub mod error;
pub mod node;
pub mod registration;
pub mod seed;
pub mod storage;
pub mod telemetry;
