// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Default lower bound on the scale factor.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;
/// Default upper bound on the scale factor.
pub const DEFAULT_MAX_SCALE: f64 = 10.0;

/// Screen-space window onto a fixed-size world surface.
///
/// `Viewport` tracks a rectangle in screen space, the extent of the world
/// surface, a uniform scale factor, and a translation expressed in world
/// (pre-scale) units. World coordinates map into screen space as
///
/// ```text
/// screen = T(view origin) · S(scale) · T(pan) · world
/// ```
///
/// so the scale is the outer transform and the pan is the inner one. Both
/// spaces have their origin at the top-left corner, +x to the right and +y
/// downward.
///
/// Zoom is anchored at the world surface origin: changing the scale never
/// touches the pan offset, and panning never touches the scale.
#[derive(Clone, Debug)]
pub struct Viewport {
    view_rect: Rect,
    base_size: Size,
    scale: f64,
    pan: Vec2,
    min_scale: f64,
    max_scale: f64,
    world_to_screen: Affine,
    screen_to_world: Affine,
}

impl Viewport {
    /// Creates a viewport showing a world surface of `base_size` through
    /// `view_rect`.
    ///
    /// - Initial scale is `1.0`.
    /// - Initial pan is zero (world origin maps to the view rect origin).
    /// - Scale is clamped to `[DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE]`.
    ///
    /// Negative or non-finite base dimensions are treated as zero.
    #[must_use]
    pub fn new(view_rect: Rect, base_size: Size) -> Self {
        let mut vp = Self {
            view_rect,
            base_size: sanitize_size(base_size),
            scale: 1.0,
            pan: Vec2::ZERO,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            world_to_screen: Affine::IDENTITY,
            screen_to_world: Affine::IDENTITY,
        };
        vp.rebuild_transforms();
        vp
    }

    /// Returns the screen-space rectangle the world is shown through.
    #[must_use]
    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    /// Moves or resizes the screen-space rectangle.
    ///
    /// Scale and pan are preserved.
    pub fn set_view_rect(&mut self, rect: Rect) {
        if self.view_rect == rect {
            return;
        }
        self.view_rect = rect;
        self.rebuild_transforms();
    }

    /// Returns the fixed extent of the world surface.
    #[must_use]
    pub fn base_size(&self) -> Size {
        self.base_size
    }

    /// Returns the world surface as a rectangle anchored at the world origin.
    #[must_use]
    pub fn world_surface_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.base_size)
    }

    /// Returns the current uniform scale factor. Always `> 0`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the current translation in world units.
    #[must_use]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Returns the configured `(min, max)` scale limits.
    #[must_use]
    pub fn scale_limits(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    /// Sets the minimum and maximum scale factors.
    ///
    /// The range is normalized so that `min <= max`, and non-positive bounds
    /// are ignored. The current scale is clamped into the new range.
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) {
        if !(min_scale > 0.0 && max_scale > 0.0) {
            return;
        }
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        let clamped = self.scale.clamp(min_scale, max_scale);
        if clamped != self.scale {
            self.scale = clamped;
            self.rebuild_transforms();
        }
    }

    /// Multiplies the scale by `factor` as one read-modify-write step.
    ///
    /// The result is clamped into the scale limits, so a product that
    /// overflows to infinity lands on the maximum and one that underflows to
    /// zero lands on the minimum. Returns `true` if the scale changed.
    /// Negative and NaN factors are rejected.
    pub fn apply_zoom(&mut self, factor: f64) -> bool {
        if factor.is_nan() || factor < 0.0 {
            return false;
        }
        let next = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if next == self.scale {
            return false;
        }
        self.scale = next;
        self.rebuild_transforms();
        true
    }

    /// Translates the world by a delta expressed in world units.
    pub fn pan_by_world(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO || !delta.is_finite() {
            return;
        }
        self.pan += delta;
        self.rebuild_transforms();
    }

    /// Translates the world by a delta expressed in screen pixels.
    ///
    /// The delta is divided by the current scale before being applied, so a
    /// pointer movement of `d` pixels always moves the world by `d` pixels on
    /// screen regardless of zoom. Returns the applied world delta.
    pub fn pan_by_screen(&mut self, delta: Vec2) -> Vec2 {
        let world = delta / self.scale;
        self.pan_by_world(world);
        world
    }

    /// Restores scale `1.0` and zero pan. Limits and view rect are kept.
    pub fn reset(&mut self) {
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
        self.pan = Vec2::ZERO;
        self.rebuild_transforms();
    }

    /// Returns the composed world → screen transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.world_to_screen
    }

    /// Converts a world-space point into screen coordinates.
    #[must_use]
    pub fn world_to_screen_point(&self, pt: Point) -> Point {
        self.world_to_screen * pt
    }

    /// Converts a screen-space point into world coordinates.
    #[must_use]
    pub fn screen_to_world_point(&self, pt: Point) -> Point {
        self.screen_to_world * pt
    }

    /// Converts a world-space rectangle into screen coordinates.
    #[must_use]
    pub fn world_to_screen_rect(&self, rect: Rect) -> Rect {
        self.world_to_screen.transform_rect_bbox(rect)
    }

    /// Converts a screen-space rectangle into world coordinates.
    #[must_use]
    pub fn screen_to_world_rect(&self, rect: Rect) -> Rect {
        self.screen_to_world.transform_rect_bbox(rect)
    }

    /// Returns the world-space rectangle currently visible through the view.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.screen_to_world_rect(self.view_rect)
    }

    /// Returns `true` if the screen point lies inside the view rect.
    #[must_use]
    pub fn contains_screen_point(&self, pt: Point) -> bool {
        self.view_rect.contains(pt)
    }

    /// Snapshot of the current viewport state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewportDebugInfo {
        ViewportDebugInfo {
            view_rect: self.view_rect,
            base_size: self.base_size,
            visible_world_rect: self.visible_world_rect(),
            scale: self.scale,
            pan: self.pan,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
        }
    }

    fn rebuild_transforms(&mut self) {
        let view_origin = self.view_rect.origin().to_vec2();
        // Scale outer, pan inner.
        self.world_to_screen =
            Affine::translate(view_origin) * Affine::scale(self.scale) * Affine::translate(self.pan);
        self.screen_to_world = self.world_to_screen.inverse();
    }
}

fn sanitize_size(size: Size) -> Size {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Size::new(clean(size.width), clean(size.height))
}

/// Debug snapshot of a [`Viewport`] state.
#[derive(Clone, Copy, Debug)]
pub struct ViewportDebugInfo {
    /// Screen-space rectangle of the view.
    pub view_rect: Rect,
    /// Extent of the world surface.
    pub base_size: Size,
    /// World-space rectangle currently visible through the view.
    pub visible_world_rect: Rect,
    /// Current uniform scale factor.
    pub scale: f64,
    /// Current pan offset in world units.
    pub pan: Vec2,
    /// Minimum scale factor.
    pub min_scale: f64,
    /// Maximum scale factor.
    pub max_scale: f64,
}
