// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use enclave_registration::config::NodeConfig;
use enclave_registration::{node, telemetry};

fn main() -> ExitCode {
    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init_tracing(config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match node::start(&config) {
        Ok(node) => {
            tracing::info!(
                home = %config.paths.home().display(),
                ledger = %config.ledger_path.display(),
                public_key = %hex::encode(node.service.enclave().public_key()),
                bootstrap = config.bootstrap,
                "Node initialized"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Node startup failed");
            ExitCode::FAILURE
        }
    }
}
