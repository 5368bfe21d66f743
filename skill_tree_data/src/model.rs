// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};

/// Identity of a group; unique across the group list.
pub type GroupId = u32;

/// Identity of a node; unique within its group.
pub type NodeId = u32;

/// Extent of the world surface in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseSize {
    /// Width of the world surface.
    pub width: f64,
    /// Height of the world surface.
    pub height: f64,
}

/// World-space anchor of one group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupLocation {
    /// Stable group identity.
    pub group_id: GroupId,
    /// Anchor x in world units.
    pub x: f64,
    /// Anchor y in world units.
    pub y: f64,
}

/// A leaf of the tree.
///
/// `x`/`y` are absolute world coordinates, not offsets from the owning
/// group's anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity within the owning group.
    pub node_id: NodeId,
    /// Display label.
    pub node_name: String,
    /// World x.
    pub x: f64,
    /// World y.
    pub y: f64,
}

/// Arguments of [`crate::Command::GetNodesForGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNodesArgs {
    /// Group whose nodes are requested.
    pub group_id: GroupId,
}
