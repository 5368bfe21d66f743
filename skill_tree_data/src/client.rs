// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::Backend;
use crate::command::Command;
use crate::error::{FetchError, TransportError};
use crate::model::{BaseSize, GroupId, GroupLocation, GroupNodesArgs, Node};

/// Typed, one-shot access to a [`Backend`].
///
/// Every call issues exactly one request; there is no retry and no caching.
/// Failures are logged here, at the boundary, and then returned as a
/// [`FetchError`]. The `*_or_log` variants implement the fire-and-forget
/// policy instead: the failure is logged and swallowed and the caller sees
/// `None`.
#[derive(Debug)]
pub struct DataClient<B> {
    backend: B,
}

impl<B: Backend> DataClient<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Issues an argument-less command and decodes the response as `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, command: Command) -> Result<T, FetchError> {
        self.request(command, Value::Null).await
    }

    /// Issues a command with serialized `args` and decodes the response as `T`.
    pub async fn fetch_with_args<T, A>(&self, command: Command, args: &A) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let args = match serde_json::to_value(args) {
            Ok(v) => v,
            Err(e) => {
                let err = FetchError::Transport {
                    command,
                    source: TransportError::InvalidArguments {
                        command: command.name().to_owned(),
                        reason: e.to_string(),
                    },
                };
                tracing::error!(%command, error = %err, "could not encode request arguments");
                return Err(err);
            }
        };
        self.request(command, args).await
    }

    /// [`DataClient::fetch`], logging and swallowing failures.
    pub async fn fetch_or_log<T: DeserializeOwned>(&self, command: Command) -> Option<T> {
        self.fetch(command).await.ok()
    }

    /// [`DataClient::fetch_with_args`], logging and swallowing failures.
    pub async fn fetch_with_args_or_log<T, A>(&self, command: Command, args: &A) -> Option<T>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        self.fetch_with_args(command, args).await.ok()
    }

    /// `get_base_size`.
    pub async fn base_size(&self) -> Result<BaseSize, FetchError> {
        self.fetch(Command::GetBaseSize).await
    }

    /// `get_group_locations`.
    pub async fn group_locations(&self) -> Result<Vec<GroupLocation>, FetchError> {
        self.fetch(Command::GetGroupLocations).await
    }

    /// `get_nodes_for_group`.
    pub async fn nodes_for_group(&self, group_id: GroupId) -> Result<Vec<Node>, FetchError> {
        self.fetch_with_args(Command::GetNodesForGroup, &GroupNodesArgs { group_id })
            .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        command: Command,
        args: Value,
    ) -> Result<T, FetchError> {
        tracing::trace!(%command, %args, "request");
        let response = match self.backend.invoke(command.name(), args).await {
            Ok(v) => v,
            Err(source) => {
                let err = FetchError::Transport { command, source };
                tracing::error!(%command, error = %err, "request failed");
                return Err(err);
            }
        };
        serde_json::from_value(response).map_err(|source| {
            let err = FetchError::Decode { command, source };
            tracing::error!(%command, error = %err, "response did not decode");
            err
        })
    }
}
