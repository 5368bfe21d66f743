// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::command::Command;

/// Failure reported by a [`crate::Backend`] before any response was decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The provider does not know the command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// The provider rejected the arguments.
    #[error("invalid arguments for `{command}`: {reason}")]
    InvalidArguments {
        /// Wire name of the command.
        command: String,
        /// Provider-supplied explanation.
        reason: String,
    },
    /// The request could not complete.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Coarse classification of a [`FetchError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request could not complete.
    Transport,
    /// The response did not match the expected shape.
    Decode,
}

/// Failure of a typed fetch through [`crate::DataClient`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not complete.
    #[error("`{command}` failed: {source}")]
    Transport {
        /// Command that was issued.
        command: Command,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },
    /// The response did not match the expected shape.
    #[error("`{command}` returned an unexpected response: {source}")]
    Decode {
        /// Command that was issued.
        command: Command,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The command whose fetch failed.
    #[must_use]
    pub fn command(&self) -> Command {
        match self {
            Self::Transport { command, .. } | Self::Decode { command, .. } => *command,
        }
    }

    /// Whether this is a transport or a decode failure.
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport { .. } => FetchErrorKind::Transport,
            Self::Decode { .. } => FetchErrorKind::Decode,
        }
    }
}
