// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};

use crate::drag::PanDrag;
use crate::listener::{ListenerHost, ListenerId, ListenerOptions, WheelSubscription};
use crate::modes::{ThrottleEdge, ZoomStep};
use crate::throttle::{Throttle, ZoomFactor};
use crate::viewport::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, Viewport};

/// Tunables for a [`ViewportEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    /// Factor applied for each [`ZoomStep::In`].
    pub zoom_in_factor: f64,
    /// Factor applied for each [`ZoomStep::Out`].
    pub zoom_out_factor: f64,
    /// Lower scale bound.
    pub min_scale: f64,
    /// Upper scale bound.
    pub max_scale: f64,
    /// Minimum spacing between two committed zoom updates.
    pub throttle_interval_ms: u64,
    /// Edge policy of the wheel throttle.
    pub throttle_edge: ThrottleEdge,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            // 10 updates per second.
            throttle_interval_ms: 100,
            throttle_edge: ThrottleEdge::default(),
        }
    }
}

impl EngineSettings {
    /// Multiplicative factor for one zoom step.
    #[must_use]
    pub fn factor(&self, step: ZoomStep) -> f64 {
        match step {
            ZoomStep::In => self.zoom_in_factor,
            ZoomStep::Out => self.zoom_out_factor,
        }
    }
}

/// A wheel event delivered by the host, in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    /// Pointer position at the time of the event.
    pub position: Point,
    /// Vertical scroll delta; negative means scrolling up / away.
    pub delta_y: f64,
    /// Host timestamp in milliseconds.
    pub time_ms: u64,
}

/// What the host should do with a wheel event after the engine saw it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Not for this viewport; native handling proceeds.
    Ignored,
    /// Handled by the viewport; the host must cancel native scrolling.
    Consumed,
}

impl WheelOutcome {
    /// Returns `true` if the host must suppress its default behavior.
    #[must_use]
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Errors from [`ViewportEngine::mount`].
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    /// The engine already holds a wheel listener.
    #[error("viewport engine is already mounted (listener {0:?})")]
    AlreadyMounted(ListenerId),
}

/// Interactive pan/zoom controller over a [`Viewport`].
///
/// The engine is the sole owner of the scale: wheel input is classified into
/// [`ZoomStep`]s, coalesced by a [`Throttle`], and committed as a single
/// multiplicative update. Translation is owned by a [`PanDrag`] gesture that
/// converts pointer movement into world units using the scale current at each
/// move.
///
/// A wheel listener is held only between [`ViewportEngine::mount`] and
/// [`ViewportEngine::unmount`] (or drop); input arriving while unmounted is
/// ignored.
#[derive(Debug)]
pub struct ViewportEngine {
    viewport: Viewport,
    settings: EngineSettings,
    throttle: Throttle<ZoomFactor>,
    drag: PanDrag,
    subscription: Option<WheelSubscription>,
    scale_updates: u64,
    revision: u64,
}

impl ViewportEngine {
    /// Creates an unmounted engine showing `base_size` through `view_rect`.
    #[must_use]
    pub fn new(view_rect: Rect, base_size: Size, settings: EngineSettings) -> Self {
        let mut viewport = Viewport::new(view_rect, base_size);
        viewport.set_scale_limits(settings.min_scale, settings.max_scale);
        Self {
            viewport,
            settings,
            throttle: Throttle::new(settings.throttle_interval_ms, settings.throttle_edge),
            drag: PanDrag::default(),
            subscription: None,
            scale_updates: 0,
            revision: 0,
        }
    }

    /// Attaches the wheel listener on `host`.
    ///
    /// Fails if a listener is already attached; the existing one is kept.
    pub fn mount(&mut self, host: Rc<dyn ListenerHost>) -> Result<ListenerId, MountError> {
        if let Some(sub) = &self.subscription {
            return Err(MountError::AlreadyMounted(sub.id()));
        }
        let sub = WheelSubscription::attach(host, ListenerOptions::default());
        let id = sub.id();
        self.subscription = Some(sub);
        Ok(id)
    }

    /// Detaches the wheel listener and resets the view to scale 1, no pan.
    ///
    /// Pending throttled input and any active drag are discarded. Calling
    /// this while unmounted is a no-op.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_none() {
            return;
        }
        self.throttle.reset();
        self.drag.end();
        self.viewport.reset();
        self.revision += 1;
    }

    /// Returns `true` while a wheel listener is attached.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// The underlying viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The settings this engine was created with.
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Moves or resizes the screen-space view rect.
    pub fn set_view_rect(&mut self, rect: Rect) {
        if self.viewport.view_rect() != rect {
            self.viewport.set_view_rect(rect);
            self.revision += 1;
        }
    }

    /// Handles one wheel event.
    ///
    /// Events outside the view rect (or while unmounted) are ignored so the
    /// host scrolls normally there. Inside, the event is always consumed; its
    /// zoom step is fed to the throttle and committed when the throttle
    /// allows.
    pub fn on_wheel(&mut self, event: WheelEvent) -> WheelOutcome {
        if !self.is_mounted() || !self.viewport.contains_screen_point(event.position) {
            return WheelOutcome::Ignored;
        }
        if let Some(step) = ZoomStep::from_wheel_delta(event.delta_y) {
            let factor = ZoomFactor(self.settings.factor(step));
            if let Some(coalesced) = self.throttle.push(event.time_ms, factor) {
                self.commit_zoom(coalesced);
            }
        }
        WheelOutcome::Consumed
    }

    /// Commits throttled wheel input whose window has elapsed.
    ///
    /// Returns `true` if the scale changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.throttle.poll(now_ms) {
            Some(coalesced) => self.commit_zoom(coalesced),
            None => false,
        }
    }

    /// When the host should next call [`ViewportEngine::tick`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        if self.throttle.has_pending() {
            self.throttle.deadline()
        } else {
            None
        }
    }

    /// Begins a pan gesture if `pos` lies inside the view rect.
    pub fn on_pointer_down(&mut self, pos: Point) -> bool {
        if !self.is_mounted() || !self.viewport.contains_screen_point(pos) {
            return false;
        }
        self.drag.start(pos);
        true
    }

    /// Continues a pan gesture, returning the applied world-space delta.
    pub fn on_pointer_move(&mut self, pos: Point) -> Option<Vec2> {
        let delta = self.drag.update(pos, self.viewport.scale())?;
        if delta != Vec2::ZERO {
            self.viewport.pan_by_world(delta);
            self.revision += 1;
        }
        Some(delta)
    }

    /// Ends the current pan gesture, if any.
    pub fn on_pointer_up(&mut self) {
        self.drag.end();
    }

    /// Returns `true` while a pan gesture is active.
    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Number of committed scale changes since creation.
    #[must_use]
    pub fn scale_update_count(&self) -> u64 {
        self.scale_updates
    }

    /// Counter bumped on every change to the world → screen transform.
    ///
    /// Renderers can compare revisions to skip recomputing transforms.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn commit_zoom(&mut self, factor: ZoomFactor) -> bool {
        let before = self.viewport.scale();
        if !self.viewport.apply_zoom(factor.0) {
            return false;
        }
        self.scale_updates += 1;
        self.revision += 1;
        tracing::trace!(
            from = before,
            to = self.viewport.scale(),
            factor = factor.0,
            "scale committed"
        );
        true
    }
}
