// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless driver for the skill tree viewer.
//!
//! Loads a tree export (or a serialized snapshot) into an in-memory provider,
//! mounts a [`SkillTree`], replays a wheel burst and a drag, and prints what
//! the resulting frame would draw.
//!
//! ```text
//! cargo run -p skill_tree_demos --bin headless -- --zoom-steps 5 --pan-x -300
//! RUST_LOG=skill_tree_scene=debug cargo run -p skill_tree_demos --bin headless
//! ```

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use futures::executor::block_on;
use kurbo::{Point, Rect, Vec2};
use skill_tree_data::{DataClient, MemoryBackend, TreeSnapshot};
use skill_tree_scene::{Frame, Item, SkillTree, SkillTreeConfig};
use skill_tree_view::{ListenerHost, ListenerId, ListenerOptions, WheelEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SAMPLE_EXPORT: &str = include_str!("../data/sample_tree.json");

#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Mount a skill tree headlessly and print the rendered frame")]
struct Args {
    /// Pre-positioned tree export to load (keyed groups/nodes with absolute
    /// positions and min/max extents).
    /// Defaults to a built-in sample.
    #[arg(long, short = 'e', conflicts_with = "snapshot")]
    export: Option<PathBuf>,

    /// Serialized snapshot to load instead of an export.
    #[arg(long, short = 's')]
    snapshot: Option<PathBuf>,

    /// Viewer configuration (JSON). Missing fields take defaults.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Wheel steps to replay; positive zooms in, negative zooms out.
    #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
    zoom_steps: i32,

    /// Horizontal drag distance in pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_x: f64,

    /// Vertical drag distance in pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_y: f64,

    /// List every drawn node.
    #[arg(long, short = 'l')]
    list: bool,
}

/// Stands in for a window: hands out listener ids and logs registration.
#[derive(Default)]
struct ConsoleHost {
    next: Cell<u64>,
}

impl ListenerHost for ConsoleHost {
    fn attach_wheel(&self, options: ListenerOptions) -> ListenerId {
        self.next.set(self.next.get() + 1);
        let id = ListenerId(self.next.get());
        tracing::info!(listener = id.0, passive = options.passive, "attach wheel listener");
        id
    }

    fn detach_wheel(&self, id: ListenerId) {
        tracing::info!(listener = id.0, "detach wheel listener");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let snapshot = load_snapshot(&args)?;
    let config = match &args.config {
        Some(path) => SkillTreeConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => SkillTreeConfig::default(),
    };
    tracing::info!(
        groups = snapshot.groups.len(),
        width = snapshot.base_size.width,
        height = snapshot.base_size.height,
        "snapshot loaded"
    );

    let view = Rect::new(0.0, 0.0, args.width, args.height);
    let mut tree = SkillTree::new(DataClient::new(MemoryBackend::new(snapshot)), config, view);
    block_on(tree.mount(Rc::new(ConsoleHost::default())))?;
    block_on(tree.settle());

    replay_wheel(&mut tree, view.center(), args.zoom_steps);
    if args.pan_x != 0.0 || args.pan_y != 0.0 {
        let start = view.center();
        tree.on_pointer_down(start);
        tree.on_pointer_move(start + Vec2::new(args.pan_x, args.pan_y));
        tree.on_pointer_up();
    }
    block_on(tree.settle());

    let frame = tree.render().ok_or("tree is not mounted")?;
    print_frame(&frame, args.list);
    let summary = tree.load_summary();
    println!(
        "groups: {} loaded, {} loading, {} failed, {} not yet mounted",
        summary.loaded, summary.loading, summary.failed, summary.unmounted
    );
    println!("backend requests: {}", tree.client().backend().request_count());

    tree.unmount();
    Ok(())
}

fn load_snapshot(args: &Args) -> Result<TreeSnapshot, Box<dyn std::error::Error>> {
    if let Some(path) = &args.snapshot {
        return Ok(TreeSnapshot::from_json_str(&std::fs::read_to_string(path)?)?);
    }
    let export = match &args.export {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_EXPORT.to_owned(),
    };
    Ok(TreeSnapshot::from_export_json(&export)?)
}

/// Sends one wheel event per millisecond, then ticks until the throttle has
/// committed the remainder.
fn replay_wheel(tree: &mut SkillTree<MemoryBackend>, at: Point, steps: i32) {
    let delta_y = if steps >= 0 { -120.0 } else { 120.0 };
    for now in 0..u64::from(steps.unsigned_abs()) {
        tree.tick(now);
        tree.on_wheel(WheelEvent {
            position: at,
            delta_y,
            time_ms: now,
        });
    }
    while let Some(deadline) = tree.next_deadline() {
        tree.tick(deadline);
    }
    if let Some(engine) = tree.engine() {
        tracing::info!(
            scale = engine.viewport().scale(),
            commits = engine.scale_update_count(),
            "wheel replay done"
        );
    }
}

fn print_frame(frame: &Frame, list: bool) {
    let pan = frame.transform.translation();
    println!("scale: {:.4}", frame.scale);
    println!("translation: ({:.1}, {:.1})", pan.x, pan.y);
    let visible = frame.visible_world;
    println!(
        "visible world: ({:.1}, {:.1}) - ({:.1}, {:.1})",
        visible.x0, visible.y0, visible.x1, visible.y1
    );
    println!("surface: {} x {}", frame.surface.width(), frame.surface.height());
    for item in &frame.items {
        match item {
            Item::GroupAnchor { label, rect, .. } => {
                println!("{label} at ({:.0}, {:.0})", rect.x0, rect.y0);
            }
            Item::Placeholder { group_id, .. } => println!("Group {group_id}: loading"),
            Item::Failed { group_id, reason, .. } => {
                println!("Group {group_id}: failed ({reason})");
            }
            Item::Node { view, .. } if list => {
                let screen = frame.transform * view.position;
                println!(
                    "  {} #{} world ({:.0}, {:.0}) screen ({:.1}, {:.1})",
                    view.label, view.node_id, view.position.x, view.position.y, screen.x, screen.y
                );
            }
            Item::Node { .. } | Item::Surface { .. } => {}
        }
    }
    println!("nodes drawn: {}", frame.nodes().count());
}
