// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size};
use skill_tree_data::{Node, NodeId};

/// Render-ready view of one [`Node`].
///
/// Built once when the owning group resolves and then shared by `Rc` with
/// every [`crate::Frame`], so repeated renders hand out the same allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    /// Identity within the owning group.
    pub node_id: NodeId,
    /// Display label.
    pub label: String,
    /// Absolute world position; the top-left corner of [`NodeView::bounds`].
    pub position: Point,
    /// World-space box.
    pub bounds: Rect,
}

impl NodeView {
    /// Lays out `node` as a square box of side `size`.
    #[must_use]
    pub fn new(node: &Node, size: f64) -> Self {
        let position = Point::new(node.x, node.y);
        Self {
            node_id: node.node_id,
            label: node.node_name.clone(),
            position,
            bounds: Rect::from_origin_size(position, Size::new(size, size)),
        }
    }
}
