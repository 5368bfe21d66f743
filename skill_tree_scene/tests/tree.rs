// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a mounted [`SkillTree`] against a backend whose node
//! fetches resolve only when the test says so.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::block_on;
use kurbo::{Point, Rect};
use serde_json::{Value, json};
use skill_tree_data::{
    Backend, DataClient, FetchErrorKind, MemoryBackend, TransportError, TreeSnapshot,
};
use skill_tree_scene::{Item, LoadPolicy, LoadState, SkillTree, SkillTreeConfig, TreeError};
use skill_tree_view::{ListenerHost, ListenerId, ListenerOptions, WheelEvent, WheelOutcome};

type Reply = Result<Value, TransportError>;

/// Answers the base size and group list immediately and parks every node
/// fetch until [`Scripted::reply`] is called for its group.
struct Scripted {
    base_size: Value,
    groups: Value,
    parked: RefCell<BTreeMap<u32, VecDeque<oneshot::Sender<Reply>>>>,
    node_requests: RefCell<Vec<u32>>,
}

impl Scripted {
    fn new(groups: Value) -> Rc<Self> {
        Rc::new(Self {
            base_size: json!({ "width": 4000, "height": 1222 }),
            groups,
            parked: RefCell::new(BTreeMap::new()),
            node_requests: RefCell::new(Vec::new()),
        })
    }

    /// Delivers `reply` to the oldest parked fetch of `group_id`.
    ///
    /// Returns `false` if there was none or its requester is gone.
    fn reply(&self, group_id: u32, reply: Reply) -> bool {
        let sender = self
            .parked
            .borrow_mut()
            .get_mut(&group_id)
            .and_then(VecDeque::pop_front);
        sender.is_some_and(|tx| tx.send(reply).is_ok())
    }

    fn requests_for(&self, group_id: u32) -> usize {
        self.node_requests
            .borrow()
            .iter()
            .filter(|id| **id == group_id)
            .count()
    }
}

#[async_trait(?Send)]
impl Backend for Scripted {
    async fn invoke(&self, command: &str, args: Value) -> Reply {
        match command {
            "get_base_size" => Ok(self.base_size.clone()),
            "get_group_locations" => Ok(self.groups.clone()),
            "get_nodes_for_group" => {
                let group_id = u32::try_from(args["groupId"].as_u64().unwrap()).unwrap();
                let (tx, rx) = oneshot::channel();
                self.parked
                    .borrow_mut()
                    .entry(group_id)
                    .or_default()
                    .push_back(tx);
                self.node_requests.borrow_mut().push(group_id);
                rx.await
                    .unwrap_or_else(|_| Err(TransportError::Unavailable("reply dropped".into())))
            }
            other => Err(TransportError::UnknownCommand(other.into())),
        }
    }
}

/// Tracks attached wheel listeners.
#[derive(Default)]
struct Host {
    next: RefCell<u64>,
    live: RefCell<Vec<ListenerId>>,
}

impl Host {
    fn live(&self) -> usize {
        self.live.borrow().len()
    }
}

impl ListenerHost for Host {
    fn attach_wheel(&self, options: ListenerOptions) -> ListenerId {
        assert!(!options.passive, "viewport needs a cancelable listener");
        *self.next.borrow_mut() += 1;
        let id = ListenerId(*self.next.borrow());
        self.live.borrow_mut().push(id);
        id
    }

    fn detach_wheel(&self, id: ListenerId) {
        self.live.borrow_mut().retain(|live| *live != id);
    }
}

const VIEW: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

fn groups(ids: &[u32]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({ "group_id": id, "x": f64::from(*id) * 100.0, "y": 50 }))
            .collect(),
    )
}

fn slash() -> Reply {
    Ok(json!([{ "node_id": 1, "node_name": "Slash", "x": 10, "y": 20 }]))
}

fn mounted_with(
    backend: &Rc<Scripted>,
    config: SkillTreeConfig,
) -> (SkillTree<Rc<Scripted>>, Rc<Host>) {
    let host = Rc::new(Host::default());
    let mut tree = SkillTree::new(DataClient::new(backend.clone()), config, VIEW);
    block_on(tree.mount(host.clone())).unwrap();
    (tree, host)
}

fn mounted(backend: &Rc<Scripted>) -> (SkillTree<Rc<Scripted>>, Rc<Host>) {
    mounted_with(backend, SkillTreeConfig::default())
}

#[test]
fn groups_resolve_in_any_order() {
    let backend = Scripted::new(groups(&[1, 2, 3]));
    let (mut tree, _host) = mounted(&backend);
    assert_eq!(tree.load_summary().loading, 3);

    assert!(backend.reply(3, slash()));
    assert_eq!(tree.pump(), 1);
    assert!(tree.group(3).unwrap().state().is_loaded());
    assert!(tree.group(1).unwrap().state().is_loading());

    assert!(backend.reply(1, Ok(json!([]))));
    assert!(backend.reply(2, slash()));
    assert_eq!(tree.pump(), 2);
    let summary = tree.load_summary();
    assert_eq!((summary.loading, summary.loaded, summary.failed), (0, 3, 0));
    assert_eq!(tree.pending_fetches(), 0);
}

#[test]
fn one_node_renders_at_its_world_position() {
    let backend = Scripted::new(groups(&[7]));
    let (mut tree, _host) = mounted(&backend);

    let before = tree.render().unwrap();
    assert_eq!(before.placeholders().collect::<Vec<_>>(), [7]);
    assert_eq!(before.nodes().count(), 0);

    backend.reply(7, slash());
    tree.pump();
    let frame = tree.render().unwrap();
    let nodes: Vec<_> = frame.nodes_in_group(7).collect();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_id, 1);
    assert_eq!(nodes[0].label, "Slash");
    assert_eq!(nodes[0].position, Point::new(10.0, 20.0));
    assert_eq!(frame.placeholders().count(), 0);
    assert_eq!(frame.anchors().collect::<Vec<_>>(), [7]);
}

#[test]
fn empty_node_list_renders_bare_anchor() {
    let backend = Scripted::new(groups(&[5]));
    let (mut tree, _host) = mounted(&backend);
    backend.reply(5, Ok(json!([])));
    tree.pump();

    let frame = tree.render().unwrap();
    assert!(matches!(frame.items[0], Item::Surface { .. }));
    assert_eq!(frame.items.len(), 2);
    assert!(matches!(frame.items[1], Item::GroupAnchor { group_id: 5, .. }));
}

#[test]
fn each_group_fetches_exactly_once_and_never_regresses() {
    let backend = Scripted::new(groups(&[1, 2]));
    let (mut tree, _host) = mounted(&backend);
    backend.reply(1, slash());
    backend.reply(2, slash());
    tree.pump();

    // Further input and renders do not refetch or reset anything.
    tree.on_wheel(WheelEvent {
        position: Point::new(10.0, 10.0),
        delta_y: -1.0,
        time_ms: 0,
    });
    assert!(tree.render().is_some());
    tree.pump();
    assert!(!tree.retry_group(1), "loaded groups cannot be retried");
    assert_eq!(backend.requests_for(1), 1);
    assert_eq!(backend.requests_for(2), 1);
    assert!(tree.groups().all(|g| g.state().is_loaded()));
}

#[test]
fn duplicate_group_ids_keep_last_location_and_spare_siblings() {
    let backend = Scripted::new(json!([
        { "group_id": 1, "x": 0, "y": 0 },
        { "group_id": 2, "x": 300, "y": 0 },
        { "group_id": 1, "x": 500, "y": 40 },
    ]));
    let (mut tree, _host) = mounted(&backend);
    assert_eq!(tree.known_group_count(), 2);
    assert_eq!(backend.requests_for(1), 1);
    assert_eq!(tree.group(1).unwrap().location().x, 500.0);

    backend.reply(2, slash());
    tree.pump();
    assert!(tree.group(2).unwrap().state().is_loaded());
    assert!(tree.group(1).unwrap().state().is_loading());
}

#[test]
fn failed_group_can_be_retried() {
    let backend = Scripted::new(groups(&[4]));
    let (mut tree, _host) = mounted(&backend);

    backend.reply(4, Err(TransportError::Unavailable("offline".into())));
    tree.pump();
    let LoadState::Failed(reason) = tree.group(4).unwrap().state() else {
        panic!("expected failure");
    };
    assert_eq!(reason.kind, FetchErrorKind::Transport);
    assert!(reason.message.contains("offline"));
    assert_eq!(tree.render().unwrap().failures().collect::<Vec<_>>(), [4]);

    assert!(tree.retry_group(4));
    assert!(tree.group(4).unwrap().state().is_loading());
    assert_eq!(backend.requests_for(4), 2);

    backend.reply(4, slash());
    tree.pump();
    assert!(tree.group(4).unwrap().state().is_loaded());
    assert!(!tree.retry_group(99), "unknown groups are ignored");
}

#[test]
fn malformed_node_list_is_a_decode_failure() {
    let backend = Scripted::new(groups(&[4]));
    let (mut tree, _host) = mounted(&backend);
    backend.reply(4, Ok(json!({ "nodes": "nope" })));
    tree.pump();
    let LoadState::Failed(reason) = tree.group(4).unwrap().state() else {
        panic!("expected failure");
    };
    assert_eq!(reason.kind, FetchErrorKind::Decode);
}

#[test]
fn results_from_an_earlier_mount_are_dropped() {
    let backend = Scripted::new(groups(&[1]));
    let (mut tree, host) = mounted(&backend);
    assert_eq!(tree.generation(), 1);

    assert!(tree.unmount());
    assert!(!tree.unmount());
    assert_eq!(host.live(), 0);
    assert!(tree.render().is_none());

    block_on(tree.mount(host.clone())).unwrap();
    assert_eq!(tree.generation(), 2);
    assert_eq!(host.live(), 1);
    assert_eq!(backend.requests_for(1), 2);

    // The first mount's request has no receiver anymore.
    assert!(!backend.reply(1, slash()));
    tree.pump();
    assert!(tree.group(1).unwrap().state().is_loading());

    assert!(backend.reply(1, Ok(json!([]))));
    tree.pump();
    assert!(tree.group(1).unwrap().state().is_loaded());
}

#[test]
fn unmount_detaches_listener_and_ignores_input() {
    let backend = Scripted::new(groups(&[1]));
    let (mut tree, host) = mounted(&backend);
    assert_eq!(host.live(), 1);
    assert!(matches!(
        block_on(tree.mount(host.clone())),
        Err(TreeError::AlreadyMounted)
    ));
    assert_eq!(host.live(), 1);

    tree.unmount();
    assert_eq!(host.live(), 0);
    let outcome = tree.on_wheel(WheelEvent {
        position: Point::new(10.0, 10.0),
        delta_y: -1.0,
        time_ms: 0,
    });
    assert_eq!(outcome, WheelOutcome::Ignored);
    assert!(!tree.on_pointer_down(Point::new(10.0, 10.0)));
    assert_eq!(tree.pump(), 0);
}

#[test]
fn dropping_the_tree_detaches_listener() {
    let backend = Scripted::new(groups(&[1]));
    let (tree, host) = mounted(&backend);
    drop(tree);
    assert_eq!(host.live(), 0);
}

#[test]
fn failed_mount_holds_no_listener() {
    let backend = Rc::new(Scripted {
        base_size: json!("wide"),
        groups: groups(&[1]),
        parked: RefCell::new(BTreeMap::new()),
        node_requests: RefCell::new(Vec::new()),
    });
    let host = Rc::new(Host::default());
    let mut tree = SkillTree::new(DataClient::new(backend), SkillTreeConfig::default(), VIEW);
    let err = block_on(tree.mount(host.clone())).unwrap_err();
    assert!(matches!(err, TreeError::Fetch(_)));
    assert!(!tree.is_mounted());
    assert_eq!(host.live(), 0);
}

#[test]
fn node_views_are_reused_across_renders() {
    let backend = Scripted::new(groups(&[1, 2]));
    let (mut tree, _host) = mounted(&backend);
    backend.reply(1, slash());
    tree.pump();
    let first = tree.render().unwrap();

    backend.reply(2, slash());
    tree.pump();
    let second = tree.render().unwrap();

    let a = first.nodes_in_group(1).next().unwrap();
    let b = second.nodes_in_group(1).next().unwrap();
    assert!(Rc::ptr_eq(a, b), "sibling load must not rebuild node views");
}

#[test]
fn visible_policy_mounts_groups_as_they_scroll_in() {
    let backend = Scripted::new(json!([
        { "group_id": 1, "x": 100, "y": 100 },
        { "group_id": 2, "x": 2000, "y": 100 },
    ]));
    let config = SkillTreeConfig {
        load_policy: LoadPolicy::Visible { margin: 0.0 },
        ..SkillTreeConfig::default()
    };
    let (mut tree, _host) = mounted_with(&backend, config);
    assert!(tree.group(1).is_some());
    assert!(tree.group(2).is_none());
    assert_eq!(tree.load_summary().unmounted, 1);
    assert_eq!(backend.requests_for(2), 0);

    // Drag the content 1500px left.
    assert!(tree.on_pointer_down(Point::new(700.0, 300.0)));
    tree.on_pointer_move(Point::new(-800.0, 300.0));
    tree.on_pointer_up();

    assert!(tree.group(2).is_some());
    assert_eq!(backend.requests_for(2), 1);
    assert!(tree.group(1).is_some(), "mounted groups stay mounted");
    assert_eq!(tree.load_summary().unmounted, 0);
}

#[test]
fn wheel_zoom_reaches_the_frame_transform() {
    let backend = Scripted::new(groups(&[1]));
    let (mut tree, _host) = mounted(&backend);
    let outcome = tree.on_wheel(WheelEvent {
        position: Point::new(400.0, 300.0),
        delta_y: -120.0,
        time_ms: 0,
    });
    assert!(outcome.prevents_default());
    let frame = tree.render().unwrap();
    assert!((frame.scale - 1.1).abs() < 1e-12);
    let corner = frame.transform * Point::new(100.0, 100.0);
    assert!((corner.x - 110.0).abs() < 1e-9);
}

#[test]
fn settle_applies_everything_already_answered() {
    let backend = Scripted::new(groups(&[1, 2]));
    let host = Rc::new(Host::default());
    let mut tree = SkillTree::new(
        DataClient::new(backend.clone()),
        SkillTreeConfig::default(),
        VIEW,
    );
    block_on(async {
        tree.mount(host.clone()).await.unwrap();
        backend.reply(1, slash());
        backend.reply(2, Ok(json!([])));
        assert_eq!(tree.settle().await, 2);
    });
    assert_eq!(tree.load_summary().loaded, 2);
}

#[test]
fn memory_backend_tree_loads_on_mount() {
    let snapshot = TreeSnapshot::from_export_json(
        r#"{ "min_x": -100, "min_y": 0, "max_x": 900, "max_y": 500,
             "groups": {
                 "7": { "x": -100, "y": 0, "nodes": ["1", "2"] },
                 "8": { "x": 400, "y": 100, "nodes": [] }
             },
             "nodes": {
                 "1": { "name": "Slash", "x": -90, "y": 20 },
                 "2": { "name": "Parry", "x": -40, "y": 20 }
             } }"#,
    )
    .unwrap();
    let host = Rc::new(Host::default());
    let mut tree = SkillTree::new(
        DataClient::new(MemoryBackend::new(snapshot)),
        SkillTreeConfig::default(),
        VIEW,
    );
    block_on(tree.mount(host)).unwrap();

    let frame = tree.render().unwrap();
    assert_eq!(frame.surface, Rect::new(0.0, 0.0, 1000.0, 500.0));
    let labels: Vec<_> = frame
        .nodes_in_group(7)
        .map(|view| view.label.as_str())
        .collect();
    assert_eq!(labels, ["Slash", "Parry"]);
    assert_eq!(frame.nodes_in_group(7).next().unwrap().position, Point::new(10.0, 20.0));
    assert_eq!(frame.anchors().collect::<Vec<_>>(), [7, 8]);
}
