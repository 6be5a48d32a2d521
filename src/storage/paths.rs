// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the node home directory.

use std::path::{Path, PathBuf};

/// Default node home directory.
pub const DEFAULT_NODE_HOME: &str = "/opt/node";

/// Per-node configuration directory, relative to the home directory.
pub const NODE_CONFIG_DIR: &str = ".node";

pub const SEED_CONFIG_FILE: &str = "seed.json";

pub const API_KEY_FILE: &str = "api_key.txt";

/// Storage path utilities rooted at the node home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePaths {
    home: PathBuf,
}

impl Default for NodePaths {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_HOME)
    }
}

impl NodePaths {
    /// Create a new NodePaths with a custom home (useful for testing).
    pub fn new(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    // ========== Node Configuration ==========

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(NODE_CONFIG_DIR)
    }

    /// `<home>/.node/seed.json`
    pub fn seed_config(&self) -> PathBuf {
        self.config_dir().join(SEED_CONFIG_FILE)
    }

    /// `<home>/.node/api_key.txt`
    pub fn api_key(&self) -> PathBuf {
        self.config_dir().join(API_KEY_FILE)
    }

    // ========== Ledger ==========

    pub fn data_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    pub fn ledger_db(&self) -> PathBuf {
        self.data_dir().join("ledger.redb")
    }
}
