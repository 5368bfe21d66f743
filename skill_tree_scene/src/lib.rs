// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skill Tree Scene: the composed skill tree viewer.
//!
//! [`SkillTree`] ties the pieces together:
//! - On mount it fetches the base size and group list once, builds a
//!   [`skill_tree_view::ViewportEngine`] over the world surface, and attaches
//!   the wheel listener.
//! - Each group gets a [`GroupView`] that owns exactly one node fetch per load
//!   attempt and moves through [`LoadState`]: `Loading`, then `Loaded` (never
//!   regressing) or `Failed` (with retry).
//! - Loaded nodes become [`NodeView`]s, shared by `Rc` so every [`Frame`]
//!   reuses the same views.
//! - [`SkillTree::render`] produces a [`Frame`]: a flat, world-space display
//!   list plus the viewport transform.
//!
//! Fetches run on the caller's thread. The host drives them with
//! [`SkillTree::pump`] from its event loop, or awaits [`SkillTree::settle`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use futures::executor::block_on;
//! use kurbo::Rect;
//! use skill_tree_data::{DataClient, MemoryBackend, TreeSnapshot};
//! use skill_tree_scene::{SkillTree, SkillTreeConfig};
//! use skill_tree_view::{ListenerHost, ListenerId, ListenerOptions};
//!
//! struct Host;
//! impl ListenerHost for Host {
//!     fn attach_wheel(&self, _: ListenerOptions) -> ListenerId {
//!         ListenerId(1)
//!     }
//!     fn detach_wheel(&self, _: ListenerId) {}
//! }
//!
//! let snapshot = TreeSnapshot::from_export_json(
//!     r#"{ "min_x": 0, "min_y": 0, "max_x": 1000, "max_y": 500,
//!          "groups": { "7": { "x": 0, "y": 0, "nodes": ["1"] } },
//!          "nodes": { "1": { "name": "Slash", "x": 10, "y": 20 } } }"#,
//! )
//! .unwrap();
//! let mut tree = SkillTree::new(
//!     DataClient::new(MemoryBackend::new(snapshot)),
//!     SkillTreeConfig::default(),
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//! );
//! block_on(tree.mount(Rc::new(Host))).unwrap();
//!
//! let frame = tree.render().unwrap();
//! let nodes: Vec<_> = frame.nodes_in_group(7).collect();
//! assert_eq!(nodes.len(), 1);
//! assert_eq!(nodes[0].label, "Slash");
//! ```

mod config;
mod frame;
mod group_view;
mod node_view;
mod tree;

pub use config::{ConfigError, LoadPolicy, SkillTreeConfig, ThrottleMode};
pub use frame::{Frame, Item};
pub use group_view::{
    FailureReason, FetchTicket, GroupView, GroupViewOptions, LoadState, Resolution,
};
pub use node_view::NodeView;
pub use tree::{LoadSummary, SkillTree, TreeError};
