// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Node Registration
//!
//! - [`initialize_node`] loads this node's provisioned seed into its enclave
//!   at startup. Any failure is fatal.
//! - [`RegistrationService::register_node`] admits an attested peer and hands
//!   it the network seed sealed for its enclave. Registration is idempotent
//!   per enclave public key: the first sealed seed issued is the one every
//!   later request receives.
//! - [`genesis`] imports and exports the registry at chain genesis.

pub mod genesis;
pub mod service;

pub use genesis::{GenesisError, GenesisState};
pub use service::{initialize_node, RegistrationService, NODE_REGISTERED_EVENT, SIMULATION_SEED};
