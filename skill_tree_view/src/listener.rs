// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped wheel-listener registration.
//!
//! The host event system (a DOM element, a window, a test double) implements
//! [`ListenerHost`]. A [`WheelSubscription`] attaches exactly one wheel
//! listener on creation and detaches it when dropped, so a listener can never
//! outlive the component that registered it.

use alloc::rc::Rc;
use core::fmt;

/// Opaque identifier a host hands out for an attached listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Options requested when attaching a wheel listener.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// When `false`, the host must let the handler cancel native scrolling.
    ///
    /// Defaults to `false`: the viewport suppresses native scrolling, which
    /// requires a non-passive listener.
    pub passive: bool,
}

/// Event source that wheel listeners can be attached to.
///
/// Methods take `&self`: hosts live on the UI thread and use interior
/// mutability for their registries.
pub trait ListenerHost {
    /// Attach a wheel listener and return its identifier.
    fn attach_wheel(&self, options: ListenerOptions) -> ListenerId;
    /// Detach a previously attached wheel listener.
    fn detach_wheel(&self, id: ListenerId);
}

/// RAII guard for one attached wheel listener.
pub struct WheelSubscription {
    host: Rc<dyn ListenerHost>,
    id: ListenerId,
}

impl WheelSubscription {
    /// Attach a wheel listener on `host` with the given options.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn attach(host: Rc<dyn ListenerHost>, options: ListenerOptions) -> Self {
        let id = host.attach_wheel(options);
        tracing::debug!(listener = id.0, "wheel listener attached");
        Self { host, id }
    }

    /// Identifier assigned by the host.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for WheelSubscription {
    fn drop(&mut self) {
        self.host.detach_wheel(self.id);
        tracing::debug!(listener = self.id.0, "wheel listener detached");
    }
}

impl fmt::Debug for WheelSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
