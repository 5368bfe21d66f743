// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render output of a [`crate::SkillTree`].
//!
//! A [`Frame`] is a flat display list in world coordinates plus the single
//! world → screen transform that applies to all of it. Items are emitted in
//! paint order: the world surface first, then each group in ascending
//! `group_id` order with its anchor before its children.

use std::rc::Rc;

use kurbo::{Affine, Rect};
use skill_tree_data::GroupId;

use crate::node_view::NodeView;

/// One drawable element, in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// The fixed-size world canvas.
    Surface {
        /// `(0, 0)` to the base size.
        rect: Rect,
    },
    /// A group's container box.
    GroupAnchor {
        /// Owning group.
        group_id: GroupId,
        /// Box at the group location.
        rect: Rect,
        /// Display label.
        label: String,
    },
    /// Stand-in for a group whose nodes are still loading.
    Placeholder {
        /// Owning group.
        group_id: GroupId,
        /// Same box as the anchor.
        rect: Rect,
    },
    /// Marker for a group whose node fetch failed; the host may offer a
    /// retry control here.
    Failed {
        /// Owning group.
        group_id: GroupId,
        /// Same box as the anchor.
        rect: Rect,
        /// Human-readable failure.
        reason: String,
    },
    /// A node box and label.
    Node {
        /// Owning group.
        group_id: GroupId,
        /// Shared, memoized view.
        view: Rc<NodeView>,
    },
}

/// A complete display list and its transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// World → screen transform for every item.
    pub transform: Affine,
    /// Uniform scale component of `transform`.
    pub scale: f64,
    /// Screen-space region the frame is shown in.
    pub view_rect: Rect,
    /// World-space region currently visible.
    pub visible_world: Rect,
    /// World surface extent.
    pub surface: Rect,
    /// Items in paint order.
    pub items: Vec<Item>,
}

impl Frame {
    /// Every node item, in paint order.
    pub fn nodes(&self) -> impl Iterator<Item = (GroupId, &Rc<NodeView>)> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Node { group_id, view } => Some((*group_id, view)),
            _ => None,
        })
    }

    /// Node views belonging to `group_id`.
    pub fn nodes_in_group(&self, group_id: GroupId) -> impl Iterator<Item = &Rc<NodeView>> + '_ {
        self.nodes()
            .filter(move |(g, _)| *g == group_id)
            .map(|(_, view)| view)
    }

    /// Groups currently drawn with a placeholder.
    pub fn placeholders(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Placeholder { group_id, .. } => Some(*group_id),
            _ => None,
        })
    }

    /// Groups currently drawn with an anchor box.
    pub fn anchors(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::GroupAnchor { group_id, .. } => Some(*group_id),
            _ => None,
        })
    }

    /// Groups currently drawn as failed.
    pub fn failures(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Failed { group_id, .. } => Some(*group_id),
            _ => None,
        })
    }
}
