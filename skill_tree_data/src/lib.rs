// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skill Tree Data: typed access to the skill tree data provider.
//!
//! The provider is an opaque, asynchronous request/response surface. This
//! crate defines:
//! - The wire model: [`BaseSize`], [`GroupLocation`], [`Node`], and the
//!   [`Command`] table (`get_base_size`, `get_group_locations`,
//!   `get_nodes_for_group`).
//! - [`Backend`], the seam a transport implements (an IPC bridge, an HTTP
//!   client, a test double).
//! - [`DataClient`], which issues one request per call and decodes the JSON
//!   response into a typed value, returning a [`FetchError`] that separates
//!   transport failures from decode failures.
//! - [`MemoryBackend`] and [`TreeSnapshot`], an in-memory provider that can be
//!   loaded from a tree export.
//!
//! ## Minimal example
//!
//! ```rust
//! use futures::executor::block_on;
//! use skill_tree_data::{DataClient, MemoryBackend, TreeSnapshot};
//!
//! let snapshot = TreeSnapshot::from_export_json(
//!     r#"{ "min_x": 0, "min_y": 0, "max_x": 100, "max_y": 50,
//!          "groups": { "7": { "x": 10, "y": 10, "nodes": ["1"] } },
//!          "nodes": { "1": { "name": "Slash", "x": 10, "y": 20 } } }"#,
//! )
//! .unwrap();
//! let client = DataClient::new(MemoryBackend::new(snapshot));
//!
//! let nodes = block_on(client.nodes_for_group(7)).unwrap();
//! assert_eq!(nodes[0].node_name, "Slash");
//! assert_eq!((nodes[0].x, nodes[0].y), (10.0, 20.0));
//! ```
//!
//! ## Failure policy
//!
//! Every failure is logged through `tracing` where it happens. Callers then
//! choose: the `Result` returning calls let a component render its own failed
//! state, while the `*_or_log` calls give the fire-and-forget behavior where
//! the caller simply never receives a value.

mod backend;
mod client;
mod command;
mod error;
mod memory;
mod model;
mod snapshot;

pub use backend::Backend;
pub use client::DataClient;
pub use command::Command;
pub use error::{FetchError, FetchErrorKind, TransportError};
pub use memory::{CALL_LOG_CAPACITY, MemoryBackend};
pub use model::{BaseSize, GroupId, GroupLocation, GroupNodesArgs, Node, NodeId};
pub use snapshot::{SnapshotError, TreeSnapshot};
