// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-agnostic throttle that coalesces bursts of input.
//!
//! A [`Throttle`] bounds how often accumulated input is committed while never
//! losing any of it: every value pushed is folded into a pending value with
//! [`Coalesce::coalesce`], and the pending value is handed back on commit.
//!
//! Time is supplied by the caller in milliseconds from any monotonic origin;
//! the throttle never reads a clock. Hosts call [`Throttle::poll`] when
//! [`Throttle::deadline`] passes (from a timer or the next frame) to collect
//! the trailing commit.
//!
//! ```
//! use skill_tree_view::{Coalesce, Throttle, ThrottleEdge};
//!
//! #[derive(Debug, PartialEq)]
//! struct Sum(u32);
//! impl Coalesce for Sum {
//!     fn coalesce(self, next: Self) -> Self {
//!         Sum(self.0 + next.0)
//!     }
//! }
//!
//! let mut t = Throttle::new(100, ThrottleEdge::LeadingAndTrailing);
//! assert_eq!(t.push(0, Sum(1)), Some(Sum(1))); // leading edge
//! assert_eq!(t.push(10, Sum(2)), None);
//! assert_eq!(t.push(20, Sum(3)), None);
//! assert_eq!(t.deadline(), Some(100));
//! assert_eq!(t.poll(100), Some(Sum(5))); // trailing edge
//! ```

use crate::modes::ThrottleEdge;

/// Values that can be folded together while waiting for a commit.
pub trait Coalesce {
    /// Combine `self` (older) with `next` (newer).
    fn coalesce(self, next: Self) -> Self;
}

/// A multiplicative zoom factor; coalescing multiplies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomFactor(pub f64);

impl Coalesce for ZoomFactor {
    fn coalesce(self, next: Self) -> Self {
        Self(self.0 * next.0)
    }
}

/// Rate limiter committing at most once per `interval_ms`.
#[derive(Clone, Debug)]
pub struct Throttle<T> {
    interval_ms: u64,
    edge: ThrottleEdge,
    pending: Option<T>,
    /// Start of the current window. A window is open while this is set and
    /// `now < start + interval`.
    window_start: Option<u64>,
}

impl<T: Coalesce> Throttle<T> {
    /// Creates a throttle with the given window length and edge policy.
    ///
    /// An interval of zero commits every push immediately.
    #[must_use]
    pub fn new(interval_ms: u64, edge: ThrottleEdge) -> Self {
        Self {
            interval_ms,
            edge,
            pending: None,
            window_start: None,
        }
    }

    /// Returns the window length in milliseconds.
    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns the edge policy.
    #[must_use]
    pub fn edge(&self) -> ThrottleEdge {
        self.edge
    }

    /// Returns `true` if input is waiting for a commit.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accumulates `value` at time `now`.
    ///
    /// Returns the coalesced value if this push commits (leading edge, or the
    /// previous window has already elapsed); otherwise keeps it pending.
    pub fn push(&mut self, now: u64, value: T) -> Option<T> {
        self.pending = Some(match self.pending.take() {
            Some(prev) => prev.coalesce(value),
            None => value,
        });

        if self.interval_ms == 0 {
            return self.commit(now);
        }

        match self.window_start {
            Some(start) if now.saturating_sub(start) < self.interval_ms => None,
            Some(_) => {
                // The previous window elapsed without being polled. Flush now
                // and, for the leading policy, this push also opens a new window.
                self.commit(now)
            }
            None => match self.edge {
                ThrottleEdge::LeadingAndTrailing => self.commit(now),
                ThrottleEdge::Trailing => {
                    self.window_start = Some(now);
                    None
                }
            },
        }
    }

    /// Commits the pending value if the current window has elapsed.
    ///
    /// When nothing is pending, an elapsed window is closed so the next push
    /// is treated as the start of a new burst.
    pub fn poll(&mut self, now: u64) -> Option<T> {
        let start = self.window_start?;
        if now.saturating_sub(start) < self.interval_ms {
            return None;
        }
        if self.pending.is_some() {
            self.commit(now)
        } else {
            self.window_start = None;
            None
        }
    }

    /// Time at which [`Throttle::poll`] should next be called, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.window_start
            .map(|start| start.saturating_add(self.interval_ms))
    }

    /// Takes the pending value immediately, ignoring the window.
    pub fn flush(&mut self, now: u64) -> Option<T> {
        if self.pending.is_some() {
            self.commit(now)
        } else {
            None
        }
    }

    /// Drops pending input and closes any window.
    pub fn reset(&mut self) {
        self.pending = None;
        self.window_start = None;
    }

    fn commit(&mut self, now: u64) -> Option<T> {
        let value = self.pending.take()?;
        // Every commit opens a window so the next one is at least one
        // interval later.
        self.window_start = match self.edge {
            ThrottleEdge::LeadingAndTrailing => Some(now),
            ThrottleEdge::Trailing => None,
        };
        if self.interval_ms == 0 {
            self.window_start = None;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{Coalesce, Throttle, ZoomFactor};
    use crate::modes::ThrottleEdge;

    #[derive(Debug, PartialEq)]
    struct Count(u32);

    impl Coalesce for Count {
        fn coalesce(self, next: Self) -> Self {
            Self(self.0 + next.0)
        }
    }

    /// Drives `events` pushes evenly spread over `span_ms`, polling on every
    /// millisecond, then keeps polling until idle. Returns the commits.
    fn drive(t: &mut Throttle<Count>, events: u32, span_ms: u64) -> Vec<(u64, u32)> {
        let mut commits = Vec::new();
        for i in 0..events {
            let now = u64::from(i) * span_ms / u64::from(events);
            if let Some(c) = t.poll(now) {
                commits.push((now, c.0));
            }
            if let Some(c) = t.push(now, Count(1)) {
                commits.push((now, c.0));
            }
        }
        let mut now = span_ms;
        while t.has_pending() {
            if let Some(c) = t.poll(now) {
                commits.push((now, c.0));
            }
            now += 1;
        }
        commits
    }

    #[test]
    fn leading_and_trailing_burst_is_bounded_and_complete() {
        let mut t = Throttle::new(100, ThrottleEdge::LeadingAndTrailing);
        let commits = drive(&mut t, 100, 50);
        assert!(commits.len() <= 5, "too many commits: {commits:?}");
        assert_eq!(commits.iter().map(|c| c.1).sum::<u32>(), 100);
        assert_eq!(commits[0], (0, 1), "leading edge commits immediately");
    }

    #[test]
    fn trailing_burst_commits_once_at_window_end() {
        let mut t = Throttle::new(100, ThrottleEdge::Trailing);
        let commits = drive(&mut t, 100, 50);
        assert_eq!(commits, vec![(100, 100)]);
    }

    #[test]
    fn sustained_input_commits_at_bounded_rate() {
        // One push per millisecond for two seconds.
        let mut t = Throttle::new(100, ThrottleEdge::LeadingAndTrailing);
        let commits = drive(&mut t, 2000, 2000);
        assert!(commits.len() <= 21, "rate exceeded: {}", commits.len());
        assert_eq!(commits.iter().map(|c| c.1).sum::<u32>(), 2000);
        for pair in commits.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= 100, "commits closer than interval");
        }
    }

    #[test]
    fn zero_interval_passes_everything_through() {
        let mut t = Throttle::new(0, ThrottleEdge::Trailing);
        assert_eq!(t.push(5, Count(1)), Some(Count(1)));
        assert_eq!(t.push(5, Count(2)), Some(Count(2)));
        assert_eq!(t.deadline(), None);
    }

    #[test]
    fn unpolled_window_flushes_on_next_push() {
        let mut t = Throttle::new(100, ThrottleEdge::LeadingAndTrailing);
        assert_eq!(t.push(0, Count(1)), Some(Count(1)));
        assert_eq!(t.push(10, Count(1)), None);
        // Host never polled; a late push still commits everything.
        assert_eq!(t.push(500, Count(1)), Some(Count(2)));
    }

    #[test]
    fn idle_poll_closes_window() {
        let mut t = Throttle::new(100, ThrottleEdge::LeadingAndTrailing);
        assert!(t.push(0, Count(1)).is_some());
        assert_eq!(t.poll(150), None);
        assert_eq!(t.deadline(), None);
        // A fresh burst is a new leading edge.
        assert_eq!(t.push(160, Count(1)), Some(Count(1)));
    }

    #[test]
    fn reset_discards_pending() {
        let mut t = Throttle::new(100, ThrottleEdge::Trailing);
        assert_eq!(t.push(0, Count(3)), None);
        t.reset();
        assert!(!t.has_pending());
        assert_eq!(t.poll(1000), None);
    }

    #[test]
    fn zoom_factors_multiply() {
        let mut t = Throttle::new(100, ThrottleEdge::Trailing);
        t.push(0, ZoomFactor(1.1));
        t.push(1, ZoomFactor(1.1));
        t.push(2, ZoomFactor(0.9));
        let f = t.flush(3).unwrap();
        assert!((f.0 - 1.1 * 1.1 * 0.9).abs() < 1e-12);
    }
}
