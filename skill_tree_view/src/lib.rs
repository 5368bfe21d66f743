// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Skill Tree View: the interactive viewport engine of the skill tree viewer.
//!
//! This crate provides a small, headless model of a zoomable, pannable window
//! onto a fixed-size world surface. It focuses on:
//! - A single uniform scale factor, changed multiplicatively by wheel input.
//! - Translation driven by a drag gesture in *pre-scale* (world) units, so a
//!   pointer movement of `d` pixels moves the content by `d` pixels on screen at
//!   any zoom level.
//! - Coalescing high-frequency wheel input with a [`Throttle`] so the scale
//!   is committed at a bounded rate without losing any of a burst.
//! - Scoped registration of the host wheel listener through
//!   [`WheelSubscription`], detached on unmount or drop.
//!
//! It does **not** own any scene graph or rendering backend. Callers are
//! expected to:
//! - Feed host wheel and pointer events into [`ViewportEngine`].
//! - Cancel native scrolling when [`WheelOutcome::prevents_default`] says so.
//! - Call [`ViewportEngine::tick`] when [`ViewportEngine::next_deadline`] passes.
//! - Apply [`Viewport::transform`] to their world content.
//!
//! ## Coordinate convention
//!
//! World and screen space both have their origin at the top-left corner, +x to
//! the right and +y downward. The world → screen mapping is
//! `T(view origin) · S(scale) · T(pan)`: scale outer, pan inner. Zoom is
//! anchored at the world origin and never modifies the pan.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect, Size};
//! use skill_tree_view::{
//!     EngineSettings, ListenerHost, ListenerId, ListenerOptions, ViewportEngine, WheelEvent,
//! };
//!
//! #[derive(Default)]
//! struct Host(Cell<u64>);
//! impl ListenerHost for Host {
//!     fn attach_wheel(&self, _: ListenerOptions) -> ListenerId {
//!         self.0.set(self.0.get() + 1);
//!         ListenerId(self.0.get())
//!     }
//!     fn detach_wheel(&self, _: ListenerId) {}
//! }
//!
//! let view = Rect::new(0.0, 0.0, 800.0, 600.0);
//! let mut engine = ViewportEngine::new(view, Size::new(4000.0, 1200.0), EngineSettings::default());
//! engine.mount(Rc::new(Host::default())).unwrap();
//!
//! // Scroll up over the viewport: zoom in by 1.1.
//! let outcome = engine.on_wheel(WheelEvent {
//!     position: Point::new(400.0, 300.0),
//!     delta_y: -120.0,
//!     time_ms: 0,
//! });
//! assert!(outcome.prevents_default());
//! assert!((engine.viewport().scale() - 1.1).abs() < 1e-12);
//!
//! // Drag 22px right: the world moves 20 world units at 1.1x.
//! engine.on_pointer_down(Point::new(100.0, 100.0));
//! let delta = engine.on_pointer_move(Point::new(122.0, 100.0)).unwrap();
//! assert!((delta.x - 20.0).abs() < 1e-9);
//! ```
//!
//! ## Design notes
//!
//! - Scale is clamped to `[0.1, 10]` by default; see [`EngineSettings`].
//! - Throttled zoom factors are multiplied together and applied once, so the
//!   committed scale is `initial × Π factors` regardless of how events were
//!   grouped into commits (as long as the limits are not hit).
//! - Time is supplied by the host in milliseconds; nothing here reads a clock.
//!
//! This crate is `no_std` compatible (with `alloc`). The default `std` feature
//! forwards to Kurbo; enable `libm` instead for targets without the standard
//! library.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod drag;
mod engine;
mod listener;
mod modes;
mod throttle;
mod viewport;

pub use engine::{EngineSettings, MountError, ViewportEngine, WheelEvent, WheelOutcome};
pub use listener::{ListenerHost, ListenerId, ListenerOptions, WheelSubscription};
pub use modes::{ThrottleEdge, ZoomStep};
pub use throttle::{Coalesce, Throttle, ZoomFactor};
pub use viewport::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, Viewport, ViewportDebugInfo};
