// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan drag helper: turn pointer movement into world-space translation.
//!
//! ## Usage
//!
//! 1) Start a drag with [`PanDrag::start`] at the pointer-down position.
//! 2) On each move, call [`PanDrag::update`] with the new position and the
//!    *current* scale; the returned delta is already in world units.
//! 3) End the drag with [`PanDrag::end`].
//!
//! The scale is read at every update rather than captured at start, so a wheel
//! zoom in the middle of a drag is honored by the very next move.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use skill_tree_view::drag::PanDrag;
//!
//! let mut drag = PanDrag::default();
//! drag.start(Point::new(10.0, 20.0));
//!
//! // At 2x zoom a 10px pointer move is 5 world units.
//! let delta = drag.update(Point::new(20.0, 20.0), 2.0).unwrap();
//! assert_eq!(delta, Vec2::new(5.0, 0.0));
//! ```

use kurbo::{Point, Vec2};

/// Tracks an in-progress pan gesture in screen space.
#[derive(Debug, Clone, Default, Copy)]
pub struct PanDrag {
    /// Screen position where the gesture started.
    pub start_pos: Option<Point>,
    /// Last recorded pointer position during the gesture.
    pub last_pos: Option<Point>,
}

impl PanDrag {
    /// Start tracking a new gesture from the given screen position.
    pub fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Record a new pointer position and return the world-space delta since
    /// the previous one.
    ///
    /// Returns `None` when no gesture is active or `scale` is not a positive
    /// finite number.
    pub fn update(&mut self, pos: Point, scale: f64) -> Option<Vec2> {
        self.start_pos?;
        if !(scale.is_finite() && scale > 0.0) {
            return None;
        }
        let last = self.last_pos.replace(pos)?;
        Some((pos - last) / scale)
    }

    /// Screen-space offset between the gesture start and `current_pos`.
    pub fn total_screen_offset(&self, current_pos: Point) -> Option<Vec2> {
        self.start_pos.map(|start| current_pos - start)
    }

    /// End the current gesture and reset state.
    pub fn end(&mut self) {
        self.start_pos = None;
        self.last_pos = None;
    }

    /// Returns `true` while a gesture is active.
    pub fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}
