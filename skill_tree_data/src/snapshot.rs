// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory tree content and the export format it can be loaded from.
//!
//! A [`TreeSnapshot`] holds everything a provider answers: the base size, the
//! group anchors, and each group's nodes. It serializes directly with serde,
//! and can also be built from a *pre-positioned tree export*: a keyed layout
//! in which every group and node already carries its absolute `x`/`y`.
//!
//! ```json
//! {
//!   "min_x": -500, "min_y": -300, "max_x": 3500, "max_y": 922,
//!   "groups": { "7": { "x": 10, "y": 20, "nodes": ["1", "2"] } },
//!   "nodes": {
//!     "1": { "name": "Slash", "x": 10, "y": 20 },
//!     "root": { "name": "Root", "x": 0, "y": 0 }
//!   }
//! }
//! ```
//!
//! Keys are decimal ids encoded as strings; the node key `"root"` is id `0`.
//! The export's extent is translated so that `(min_x, min_y)` becomes the
//! world origin, and the base size is `max - min`.
//!
//! No layout is computed here. Raw game data that places nodes by orbit
//! (`group`, `orbit`, `orbitIndex`) has to be resolved to positions before it
//! can be loaded; such a document is rejected as malformed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{BaseSize, GroupId, GroupLocation, Node, NodeId};

/// Errors from [`TreeSnapshot::from_export_json`].
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The document is not valid JSON or does not match the export layout.
    #[error("malformed tree export: {0}")]
    Json(#[from] serde_json::Error),
    /// A map key or node reference is not a decimal id.
    #[error("invalid {what} id `{key}`")]
    InvalidId {
        /// `"group"` or `"node"`.
        what: &'static str,
        /// Offending key.
        key: String,
    },
    /// `max` is smaller than `min` on some axis.
    #[error("inverted extent: min ({min_x}, {min_y}), max ({max_x}, {max_y})")]
    InvertedExtent {
        /// Export `min_x`.
        min_x: f64,
        /// Export `min_y`.
        min_y: f64,
        /// Export `max_x`.
        max_x: f64,
        /// Export `max_y`.
        max_y: f64,
    },
}

/// Complete provider content held in memory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// World surface extent.
    pub base_size: BaseSize,
    /// Group anchors, in provider order.
    pub groups: Vec<GroupLocation>,
    /// Nodes per group.
    #[serde(default)]
    pub nodes: BTreeMap<GroupId, Vec<Node>>,
}

impl TreeSnapshot {
    /// Nodes of `group_id`; empty for unknown groups.
    #[must_use]
    pub fn nodes_for_group(&self, group_id: GroupId) -> &[Node] {
        self.nodes.get(&group_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parses a snapshot serialized with serde (the [`TreeSnapshot`] layout).
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a snapshot from a tree export (see the module docs).
    ///
    /// Group node lists that reference ids missing from `nodes` are skipped.
    pub fn from_export_json(json: &str) -> Result<Self, SnapshotError> {
        let export: Export = serde_json::from_str(json)?;
        if export.max_x < export.min_x || export.max_y < export.min_y {
            return Err(SnapshotError::InvertedExtent {
                min_x: export.min_x,
                min_y: export.min_y,
                max_x: export.max_x,
                max_y: export.max_y,
            });
        }

        let mut by_id = BTreeMap::new();
        for (key, node) in export.nodes {
            by_id.insert(parse_id("node", &key)?, node);
        }

        let mut groups = Vec::with_capacity(export.groups.len());
        let mut nodes = BTreeMap::new();
        for (key, group) in export.groups {
            let group_id = parse_id("group", &key)?;
            groups.push(GroupLocation {
                group_id,
                x: group.x - export.min_x,
                y: group.y - export.min_y,
            });

            let mut members = Vec::with_capacity(group.nodes.len());
            for node_key in &group.nodes {
                let node_id = parse_id("node", node_key)?;
                let Some(node) = by_id.get(&node_id) else {
                    tracing::debug!(group_id, node_id, "export group references unknown node");
                    continue;
                };
                members.push(Node {
                    node_id,
                    node_name: node.name.clone(),
                    x: node.x - export.min_x,
                    y: node.y - export.min_y,
                });
            }
            nodes.insert(group_id, members);
        }

        Ok(Self {
            base_size: BaseSize {
                width: export.max_x - export.min_x,
                height: export.max_y - export.min_y,
            },
            groups,
            nodes,
        })
    }
}

#[derive(Deserialize)]
struct Export {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    #[serde(default)]
    groups: BTreeMap<String, ExportGroup>,
    #[serde(default)]
    nodes: BTreeMap<String, ExportNode>,
}

#[derive(Deserialize)]
struct ExportGroup {
    x: f64,
    y: f64,
    #[serde(default)]
    nodes: Vec<String>,
}

#[derive(Deserialize)]
struct ExportNode {
    name: String,
    x: f64,
    y: f64,
}

fn parse_id(what: &'static str, key: &str) -> Result<NodeId, SnapshotError> {
    if what == "node" && key == "root" {
        return Ok(0);
    }
    key.parse().map_err(|_| SnapshotError::InvalidId {
        what,
        key: key.to_owned(),
    })
}
