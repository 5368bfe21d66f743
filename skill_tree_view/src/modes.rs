// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Direction of a single zoom step derived from wheel input.
///
/// The step is interpreted by [`crate::ViewportEngine`], which maps it onto
/// its configured multiplicative factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomStep {
    /// Scroll up / away from the user: magnify.
    In,
    /// Scroll down / toward the user: shrink.
    Out,
}

impl ZoomStep {
    /// Classifies a vertical wheel delta.
    ///
    /// Negative deltas zoom in, positive deltas zoom out. A zero (or NaN)
    /// delta carries no direction and yields `None`.
    #[must_use]
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::In)
        } else if delta_y > 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Which edge(s) of a throttle window commit accumulated input.
///
/// Both variants coalesce every value pushed into the window, so the net
/// effect of a burst is never dropped; they differ only in *when* the first
/// commit of a burst happens.
///
/// This mode is consulted by [`crate::Throttle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThrottleEdge {
    /// The first value of a burst opens a window; everything pushed during the
    /// window is committed once, when the window closes.
    Trailing,
    /// A value arriving while no window is open is committed immediately and
    /// opens a window; values pushed during the window are committed together
    /// when it closes.
    #[default]
    LeadingAndTrailing,
}
