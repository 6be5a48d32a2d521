// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Message Dispatch Guard
//!
//! A confidential program may hand messages back to the host for execution.
//! It may only act for itself: every signer the message declares must be the
//! program's own address. Messages that pass are routed to their handler and
//! the handler's events are re-emitted into the current transition.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{Event, StateContext};

/// Event kind that the host emits for every message itself.
pub const MESSAGE_EVENT_KIND: &str = "message";

/// Raw account address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex")] Vec<u8>);

impl Address {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// A message produced by a confidential program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    pub route: String,
    pub signers: Vec<Address>,
    pub body: Vec<u8>,
}

/// What a handler returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerResponse {
    pub data: Vec<u8>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("unrecognized message route: {0}")]
    UnknownRoute(String),

    #[error("message handler failed: {0}")]
    Handler(String),
}

/// Executes a message against the state of the current transition.
pub trait MessageRouter {
    fn route_and_execute(
        &self,
        ctx: &mut StateContext<'_>,
        message: &RoutedMessage,
    ) -> Result<HandlerResponse, RouteError>;
}

type HandlerFn = dyn Fn(&mut StateContext<'_>, &RoutedMessage) -> Result<HandlerResponse, String>
    + Send
    + Sync;
type Handler = Box<HandlerFn>;

/// Router over a fixed table of route name → handler.
#[derive(Default)]
pub struct HandlerRouter {
    handlers: BTreeMap<String, Handler>,
}

impl HandlerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route<F>(mut self, route: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut StateContext<'_>, &RoutedMessage) -> Result<HandlerResponse, String>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(route.into(), Box::new(handler));
        self
    }

    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl MessageRouter for HandlerRouter {
    fn route_and_execute(
        &self,
        ctx: &mut StateContext<'_>,
        message: &RoutedMessage,
    ) -> Result<HandlerResponse, RouteError> {
        let handler = self
            .handlers
            .get(&message.route)
            .ok_or_else(|| RouteError::UnknownRoute(message.route.clone()))?;
        handler(ctx, message).map_err(RouteError::Handler)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unauthorized: contract {contract} doesn't have permission to sign for {signer}")]
    Unauthorized { contract: Address, signer: Address },

    #[error(transparent)]
    Route(#[from] RouteError),
}

pub struct MessageDispatchGuard<R> {
    router: R,
}

impl<R: MessageRouter> MessageDispatchGuard<R> {
    pub fn new(router: R) -> Self {
        Self { router }
    }

    /// Execute `message` on behalf of `contract`.
    ///
    /// Every declared signer must equal `contract`; a message with no signers
    /// passes. Nothing is executed or emitted when the check fails.
    pub fn dispatch(
        &self,
        ctx: &mut StateContext<'_>,
        contract: &Address,
        message: &RoutedMessage,
    ) -> Result<Vec<u8>, DispatchError> {
        if let Some(signer) = message.signers.iter().find(|s| *s != contract) {
            tracing::warn!(
                contract = %contract,
                signer = %signer,
                route = %message.route,
                "Rejected message signed for another account"
            );
            return Err(DispatchError::Unauthorized {
                contract: contract.clone(),
                signer: signer.clone(),
            });
        }

        let response = self.router.route_and_execute(ctx, message)?;
        ctx.emit_events(
            response
                .events
                .into_iter()
                .filter(|e| e.kind != MESSAGE_EVENT_KIND),
        );
        tracing::debug!(route = %message.route, "Dispatched message");
        Ok(response.data)
    }
}
