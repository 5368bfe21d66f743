// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::backend::Backend;
use crate::command::Command;
use crate::error::TransportError;
use crate::model::GroupNodesArgs;
use crate::snapshot::TreeSnapshot;

/// How many of the most recent requests [`MemoryBackend::calls`] keeps.
pub const CALL_LOG_CAPACITY: usize = 64;

/// A [`Backend`] answering from a [`TreeSnapshot`].
///
/// Requests resolve on first poll. The last [`CALL_LOG_CAPACITY`] requests
/// are kept for inspection; per-command counters cover the whole lifetime.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: TreeSnapshot,
    calls: RefCell<VecDeque<(String, Value)>>,
    counts: [Cell<usize>; Command::ALL.len()],
    requests: Cell<usize>,
}

impl MemoryBackend {
    /// Serves `snapshot`.
    #[must_use]
    pub fn new(snapshot: TreeSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    /// The served content.
    #[must_use]
    pub fn snapshot(&self) -> &TreeSnapshot {
        &self.snapshot
    }

    /// The most recent `(command, args)` pairs received, oldest first.
    ///
    /// At most [`CALL_LOG_CAPACITY`] entries are kept.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().iter().cloned().collect()
    }

    /// Number of requests received for `command` since creation.
    #[must_use]
    pub fn call_count(&self, command: Command) -> usize {
        self.counts[slot(command)].get()
    }

    /// Number of requests received since creation, unknown commands included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    fn record(&self, command: &str, args: &Value) {
        self.requests.set(self.requests.get() + 1);
        if let Some(known) = Command::from_name(command) {
            let count = &self.counts[slot(known)];
            count.set(count.get() + 1);
        }
        let mut calls = self.calls.borrow_mut();
        if calls.len() == CALL_LOG_CAPACITY {
            calls.pop_front();
        }
        calls.push_back((command.to_owned(), args.clone()));
    }

    fn answer(&self, command: &str, args: Value) -> Result<Value, TransportError> {
        match Command::from_name(command) {
            Some(Command::GetBaseSize) => encode(&self.snapshot.base_size),
            Some(Command::GetGroupLocations) => encode(&self.snapshot.groups),
            Some(Command::GetNodesForGroup) => {
                let args: GroupNodesArgs =
                    serde_json::from_value(args).map_err(|e| TransportError::InvalidArguments {
                        command: command.to_owned(),
                        reason: e.to_string(),
                    })?;
                encode(self.snapshot.nodes_for_group(args.group_id))
            }
            None => Err(TransportError::UnknownCommand(command.to_owned())),
        }
    }
}

#[async_trait(?Send)]
impl Backend for MemoryBackend {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError> {
        self.record(command, &args);
        self.answer(command, args)
    }
}

fn slot(command: Command) -> usize {
    match command {
        Command::GetBaseSize => 0,
        Command::GetGroupLocations => 1,
        Command::GetNodesForGroup => 2,
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, TransportError> {
    serde_json::to_value(value).map_err(|e| TransportError::Unavailable(e.to_string()))
}
