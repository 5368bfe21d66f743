// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree root: viewport engine plus the set of group views.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::StreamExt;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use kurbo::{Point, Rect, Size, Vec2};
use skill_tree_data::{Backend, BaseSize, DataClient, FetchError, GroupId, GroupLocation, Node};
use skill_tree_view::{ListenerHost, Viewport, ViewportEngine, WheelEvent, WheelOutcome};

use crate::config::{LoadPolicy, SkillTreeConfig};
use crate::frame::{Frame, Item};
use crate::group_view::{FailureReason, FetchTicket, GroupView, Resolution};

/// Errors from [`SkillTree::mount`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The tree is already mounted.
    #[error("skill tree is already mounted")]
    AlreadyMounted,
    /// The base size or the group list could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Count of group views per loading state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Known groups without a view yet (lazy loading only).
    pub unmounted: usize,
    /// Views waiting for their nodes.
    pub loading: usize,
    /// Views with their nodes applied.
    pub loaded: usize,
    /// Views whose fetch failed.
    pub failed: usize,
}

type NodeFetch = LocalBoxFuture<'static, (FetchTicket, Result<Vec<Node>, FetchError>)>;

struct Mounted {
    base_size: BaseSize,
    engine: ViewportEngine,
    locations: BTreeMap<GroupId, GroupLocation>,
    groups: BTreeMap<GroupId, GroupView>,
    inflight: FuturesUnordered<NodeFetch>,
    seen_revision: u64,
}

/// A mounted skill tree: the world surface, its viewport, and one lazily
/// loaded [`GroupView`] per group.
///
/// Everything runs on one thread. Node fetches are kept in flight inside the
/// tree and applied when the host calls [`SkillTree::pump`] (non-blocking) or
/// awaits [`SkillTree::settle`]. A result is only ever applied to the group
/// view, load attempt, and mount it was requested for.
pub struct SkillTree<B: Backend + 'static> {
    client: Rc<DataClient<B>>,
    config: SkillTreeConfig,
    view_rect: Rect,
    generation: u64,
    mounted: Option<Mounted>,
}

impl<B: Backend + 'static> SkillTree<B> {
    /// Creates an unmounted tree shown through the screen-space `view_rect`.
    pub fn new(client: DataClient<B>, config: SkillTreeConfig, view_rect: Rect) -> Self {
        Self {
            client: Rc::new(client),
            config,
            view_rect,
            generation: 0,
            mounted: None,
        }
    }

    /// The data client.
    pub fn client(&self) -> &DataClient<B> {
        &self.client
    }

    /// The configuration this tree was created with.
    pub fn config(&self) -> &SkillTreeConfig {
        &self.config
    }

    /// Fetches the base size and group list, attaches the wheel listener on
    /// `host`, and mounts group views according to the load policy.
    ///
    /// Node fetches for the mounted groups are started before this returns.
    /// On error the tree stays unmounted and no listener is held.
    pub async fn mount(&mut self, host: Rc<dyn ListenerHost>) -> Result<(), TreeError> {
        if self.mounted.is_some() {
            return Err(TreeError::AlreadyMounted);
        }
        let (base_size, locations) =
            futures::future::join(self.client.base_size(), self.client.group_locations()).await;
        let base_size = base_size?;
        let locations = locations?;

        let mut engine = ViewportEngine::new(
            self.view_rect,
            Size::new(base_size.width, base_size.height),
            self.config.engine_settings(),
        );
        // The engine is new, so the only refusal it knows cannot happen here.
        engine.mount(host).map_err(|_| TreeError::AlreadyMounted)?;

        let mut by_id = BTreeMap::new();
        for location in locations {
            if by_id.insert(location.group_id, location).is_some() {
                tracing::warn!(
                    group_id = location.group_id,
                    "duplicate group id; keeping the last location"
                );
            }
        }

        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            groups = by_id.len(),
            width = base_size.width,
            height = base_size.height,
            "skill tree mounted"
        );
        self.mounted = Some(Mounted {
            base_size,
            seen_revision: engine.revision(),
            engine,
            locations: by_id,
            groups: BTreeMap::new(),
            inflight: FuturesUnordered::new(),
        });
        self.mount_groups();
        self.pump();
        Ok(())
    }

    /// Detaches the wheel listener and drops every group view.
    ///
    /// In-flight node fetches are abandoned; their results can no longer
    /// reach any group. Returns `false` if the tree was not mounted.
    pub fn unmount(&mut self) -> bool {
        let Some(mut mounted) = self.mounted.take() else {
            return false;
        };
        mounted.engine.unmount();
        tracing::debug!(
            generation = self.generation,
            abandoned = mounted.inflight.len(),
            "skill tree unmounted"
        );
        true
    }

    /// Returns `true` between a successful mount and unmount.
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Counter of successful mounts.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// World surface extent, while mounted.
    pub fn base_size(&self) -> Option<BaseSize> {
        self.mounted.as_ref().map(|m| m.base_size)
    }

    /// The viewport engine, while mounted.
    pub fn engine(&self) -> Option<&ViewportEngine> {
        self.mounted.as_ref().map(|m| &m.engine)
    }

    /// The viewport, while mounted.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.engine().map(ViewportEngine::viewport)
    }

    /// The mounted view of `group_id`.
    pub fn group(&self, group_id: GroupId) -> Option<&GroupView> {
        self.mounted.as_ref()?.groups.get(&group_id)
    }

    /// Mounted group views in ascending id order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupView> + '_ {
        self.mounted.iter().flat_map(|m| m.groups.values())
    }

    /// Number of distinct groups the provider listed.
    pub fn known_group_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.locations.len())
    }

    /// Number of node fetches not yet applied.
    pub fn pending_fetches(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.inflight.len())
    }

    /// Group counts per loading state.
    pub fn load_summary(&self) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let Some(m) = &self.mounted else {
            return summary;
        };
        summary.unmounted = m.locations.len() - m.groups.len();
        for group in m.groups.values() {
            let state = group.state();
            if state.is_loading() {
                summary.loading += 1;
            } else if state.is_loaded() {
                summary.loaded += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Applies every node fetch that has already completed, without waiting.
    ///
    /// Returns the number of results taken off the queue, including stale
    /// ones that were discarded.
    pub fn pump(&mut self) -> usize {
        let generation = self.generation;
        let Some(m) = self.mounted.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Some(Some((ticket, result))) = m.inflight.next().now_or_never() {
            m.apply(generation, ticket, result);
            applied += 1;
        }
        applied
    }

    /// Waits for every in-flight node fetch and applies it.
    pub async fn settle(&mut self) -> usize {
        let generation = self.generation;
        let Some(m) = self.mounted.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Some((ticket, result)) = m.inflight.next().await {
            m.apply(generation, ticket, result);
            applied += 1;
        }
        applied
    }

    /// Starts a new load attempt for a failed group.
    ///
    /// Returns `false` if the group is not mounted or not failed.
    pub fn retry_group(&mut self, group_id: GroupId) -> bool {
        let client = &self.client;
        let Some(m) = self.mounted.as_mut() else {
            return false;
        };
        let Some(group) = m.groups.get_mut(&group_id) else {
            return false;
        };
        if !group.retry() {
            return false;
        }
        if let Some(ticket) = group.begin_load() {
            m.inflight.push(fetch_nodes(client, ticket));
        }
        self.pump();
        true
    }

    /// Builds the display list for the current state.
    ///
    /// Returns `None` while unmounted.
    pub fn render(&self) -> Option<Frame> {
        let m = self.mounted.as_ref()?;
        let viewport = m.engine.viewport();
        let surface = viewport.world_surface_rect();
        let mut items = vec![Item::Surface { rect: surface }];
        for group in m.groups.values() {
            group.render(&mut items);
        }
        Some(Frame {
            transform: viewport.transform(),
            scale: viewport.scale(),
            view_rect: viewport.view_rect(),
            visible_world: viewport.visible_world_rect(),
            surface,
            items,
        })
    }

    /// Forwards a wheel event to the viewport engine.
    pub fn on_wheel(&mut self, event: WheelEvent) -> WheelOutcome {
        let Some(m) = self.mounted.as_mut() else {
            return WheelOutcome::Ignored;
        };
        let outcome = m.engine.on_wheel(event);
        self.after_input();
        outcome
    }

    /// Commits throttled zoom input whose window has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(m) = self.mounted.as_mut() else {
            return false;
        };
        let changed = m.engine.tick(now_ms);
        self.after_input();
        changed
    }

    /// When the host should next call [`SkillTree::tick`].
    pub fn next_deadline(&self) -> Option<u64> {
        self.engine()?.next_deadline()
    }

    /// Starts a pan gesture.
    pub fn on_pointer_down(&mut self, pos: Point) -> bool {
        self.mounted
            .as_mut()
            .is_some_and(|m| m.engine.on_pointer_down(pos))
    }

    /// Continues a pan gesture, returning the applied world-space delta.
    pub fn on_pointer_move(&mut self, pos: Point) -> Option<Vec2> {
        let delta = self.mounted.as_mut()?.engine.on_pointer_move(pos);
        self.after_input();
        delta
    }

    /// Ends the current pan gesture.
    pub fn on_pointer_up(&mut self) {
        if let Some(m) = self.mounted.as_mut() {
            m.engine.on_pointer_up();
        }
    }

    /// Moves or resizes the screen-space view rect.
    pub fn set_view_rect(&mut self, rect: Rect) {
        self.view_rect = rect;
        if let Some(m) = self.mounted.as_mut() {
            m.engine.set_view_rect(rect);
            self.after_input();
        }
    }

    fn after_input(&mut self) {
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        let revision = m.engine.revision();
        if revision == m.seen_revision {
            return;
        }
        m.seen_revision = revision;
        if let LoadPolicy::Visible { .. } = self.config.load_policy
            && self.mount_groups() > 0
        {
            self.pump();
        }
    }

    /// Mounts every group the load policy currently admits and starts its
    /// fetch. Returns the number of newly mounted groups.
    fn mount_groups(&mut self) -> usize {
        let generation = self.generation;
        let options = self.config.group_options();
        let client = &self.client;
        let Some(m) = self.mounted.as_mut() else {
            return 0;
        };
        let area = match self.config.load_policy {
            LoadPolicy::All => None,
            LoadPolicy::Visible { margin } => Some(
                m.engine
                    .viewport()
                    .visible_world_rect()
                    .inflate(margin, margin),
            ),
        };

        let mut mounted = 0;
        for (group_id, location) in &m.locations {
            if m.groups.contains_key(group_id) {
                continue;
            }
            let mut group = GroupView::new(*location, generation, options);
            if area.is_some_and(|area| !touches(group.anchor_rect(), area)) {
                continue;
            }
            if let Some(ticket) = group.begin_load() {
                m.inflight.push(fetch_nodes(client, ticket));
            }
            m.groups.insert(*group_id, group);
            mounted += 1;
        }
        if mounted > 0 {
            tracing::debug!(mounted, total = m.groups.len(), "group views mounted");
        }
        mounted
    }
}

impl<B: Backend + 'static> fmt::Debug for SkillTree<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillTree")
            .field("config", &self.config)
            .field("view_rect", &self.view_rect)
            .field("generation", &self.generation)
            .field("mounted", &self.mounted.is_some())
            .field("pending_fetches", &self.pending_fetches())
            .finish_non_exhaustive()
    }
}

impl Mounted {
    /// Hands a finished fetch to its group.
    ///
    /// `unmount` drops every in-flight fetch and groups are never removed
    /// while mounted, so each ticket belongs to this mount and to a live view.
    fn apply(
        &mut self,
        generation: u64,
        ticket: FetchTicket,
        result: Result<Vec<Node>, FetchError>,
    ) {
        debug_assert_eq!(ticket.generation, generation, "fetch outlived the mount that issued it");
        let group = self.groups.get_mut(&ticket.group_id);
        debug_assert!(group.is_some(), "fetch for group {} has no view", ticket.group_id);
        let Some(group) = group else {
            return;
        };
        // The client has already logged the failure itself.
        let result = result.map_err(|err| FailureReason::from(&err));
        if group.resolve(ticket, result) == Resolution::Stale {
            tracing::warn!(
                group_id = ticket.group_id,
                attempt = ticket.attempt,
                "discarding stale node list"
            );
        }
    }
}

fn fetch_nodes<B>(client: &Rc<DataClient<B>>, ticket: FetchTicket) -> NodeFetch
where
    B: Backend + 'static,
{
    let client = Rc::clone(client);
    async move {
        let result = client.nodes_for_group(ticket.group_id).await;
        (ticket, result)
    }
    .boxed_local()
}

/// Closed-interval overlap, so a box touching the area's edge counts.
fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
