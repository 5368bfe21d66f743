// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use kurbo::{Point, Rect, Size};
use skill_tree_data::{FetchError, FetchErrorKind, GroupId, GroupLocation, Node, NodeId};

use crate::frame::Item;
use crate::node_view::NodeView;

/// Layout and drawing options shared by all group views.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupViewOptions {
    /// Side length of the anchor box.
    pub anchor_size: f64,
    /// Side length of each node box.
    pub node_size: f64,
    /// Draw the anchor box while nodes are loading.
    pub anchor_while_loading: bool,
}

impl Default for GroupViewOptions {
    fn default() -> Self {
        Self {
            anchor_size: 80.0,
            node_size: 40.0,
            anchor_while_loading: false,
        }
    }
}

/// Proof that a node fetch was requested for a specific load attempt.
///
/// A result may only be applied with the ticket of the attempt it answers.
/// The tree's mount generation is part of the ticket so results from an
/// earlier mount never reach a group of a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    /// Group the fetch is for.
    pub group_id: GroupId,
    /// Mount generation of the owning tree.
    pub generation: u64,
    /// Load attempt within the group, starting at 0.
    pub attempt: u32,
}

/// Why a group's node fetch failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReason {
    /// Transport or decode.
    pub kind: FetchErrorKind,
    /// Display form of the error.
    pub message: String,
}

impl From<&FetchError> for FailureReason {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Loading state of a [`GroupView`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    /// Waiting for the node list.
    Loading,
    /// Node list applied; possibly empty. Terminal.
    Loaded(Rc<[Rc<NodeView>]>),
    /// The fetch failed; [`GroupView::retry`] may start another attempt.
    Failed(FailureReason),
}

impl LoadState {
    /// Returns `true` in [`LoadState::Loading`].
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` in [`LoadState::Loaded`].
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns `true` in [`LoadState::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What [`GroupView::resolve`] did with a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The group is now loaded with this many nodes.
    Loaded(usize),
    /// The group is now failed.
    Failed,
    /// The ticket does not answer the current attempt; nothing changed.
    Stale,
}

/// One group anchor and its lazily fetched nodes.
#[derive(Clone, Debug)]
pub struct GroupView {
    location: GroupLocation,
    generation: u64,
    options: GroupViewOptions,
    label: String,
    state: LoadState,
    attempt: u32,
    requested: bool,
}

impl GroupView {
    /// Creates a loading view for `location`, owned by mount `generation`.
    #[must_use]
    pub fn new(location: GroupLocation, generation: u64, options: GroupViewOptions) -> Self {
        Self {
            label: format!("Group {}", location.group_id),
            location,
            generation,
            options,
            state: LoadState::Loading,
            attempt: 0,
            requested: false,
        }
    }

    /// Group identity.
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.location.group_id
    }

    /// World-space anchor.
    #[must_use]
    pub fn location(&self) -> GroupLocation {
        self.location
    }

    /// Current loading state.
    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Number of load attempts started, including the current one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempt + 1
    }

    /// The anchor box in world space.
    #[must_use]
    pub fn anchor_rect(&self) -> Rect {
        let size = self.options.anchor_size;
        Rect::from_origin_size(
            Point::new(self.location.x, self.location.y),
            Size::new(size, size),
        )
    }

    /// Claims the fetch for the current attempt.
    ///
    /// Returns a ticket once per attempt while loading and `None` otherwise,
    /// so a caller that always asks issues at most one request per attempt.
    pub fn begin_load(&mut self) -> Option<FetchTicket> {
        if !self.state.is_loading() || self.requested {
            return None;
        }
        self.requested = true;
        Some(self.ticket())
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// Nodes sharing a `node_id` collapse to the last one listed.
    pub fn resolve(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Node>, FailureReason>,
    ) -> Resolution {
        if !self.requested || !self.state.is_loading() || ticket != self.ticket() {
            return Resolution::Stale;
        }
        match result {
            Ok(nodes) => {
                let views = self.layout(&nodes);
                let count = views.len();
                self.state = LoadState::Loaded(views.into());
                tracing::debug!(group_id = self.group_id(), count, "group loaded");
                Resolution::Loaded(count)
            }
            Err(reason) => {
                tracing::debug!(
                    group_id = self.group_id(),
                    attempt = self.attempt,
                    reason = %reason.message,
                    "group failed"
                );
                self.state = LoadState::Failed(reason);
                Resolution::Failed
            }
        }
    }

    /// Moves a failed group back to loading for a new attempt.
    ///
    /// Returns `false` (and changes nothing) unless the group is failed.
    pub fn retry(&mut self) -> bool {
        if !self.state.is_failed() {
            return false;
        }
        self.attempt += 1;
        self.requested = false;
        self.state = LoadState::Loading;
        tracing::debug!(group_id = self.group_id(), attempt = self.attempt, "group retry");
        true
    }

    /// Appends this group's items in paint order.
    pub fn render(&self, out: &mut Vec<Item>) {
        let group_id = self.group_id();
        let rect = self.anchor_rect();
        let anchor = || Item::GroupAnchor {
            group_id,
            rect,
            label: self.label.clone(),
        };
        match &self.state {
            LoadState::Loading => {
                if self.options.anchor_while_loading {
                    out.push(anchor());
                }
                out.push(Item::Placeholder { group_id, rect });
            }
            LoadState::Loaded(views) => {
                out.push(anchor());
                out.extend(views.iter().map(|view| Item::Node {
                    group_id,
                    view: view.clone(),
                }));
            }
            LoadState::Failed(reason) => {
                out.push(anchor());
                out.push(Item::Failed {
                    group_id,
                    rect,
                    reason: reason.message.clone(),
                });
            }
        }
    }

    fn ticket(&self) -> FetchTicket {
        FetchTicket {
            group_id: self.group_id(),
            generation: self.generation,
            attempt: self.attempt,
        }
    }

    fn layout(&self, nodes: &[Node]) -> Vec<Rc<NodeView>> {
        let mut views: Vec<Rc<NodeView>> = Vec::with_capacity(nodes.len());
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            let view = Rc::new(NodeView::new(node, self.options.node_size));
            match index.entry(node.node_id) {
                Entry::Occupied(slot) => {
                    tracing::warn!(
                        group_id = self.group_id(),
                        node_id = node.node_id,
                        "duplicate node id; keeping the last one"
                    );
                    views[*slot.get()] = view;
                }
                Entry::Vacant(slot) => {
                    slot.insert(views.len());
                    views.push(view);
                }
            }
        }
        views
    }
}
