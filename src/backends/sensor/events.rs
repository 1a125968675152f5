// SPDX-License-Identifier: GPL-3.0-only

//! Frame-ready event registry
//!
//! Handlers are registered per stream and receive every frame-ready
//! notification for that stream. Registration returns a [`Subscription`]
//! that must be handed back to [`FrameEvents::unsubscribe`]; it is not
//! `Clone`, so each subscribe pairs with exactly one unsubscribe.

use super::types::{FrameHandle, StreamKind};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Callback invoked for each frame-ready notification
pub type FrameHandler = Box<dyn FnMut(Option<FrameHandle<'_>>) + Send>;

/// Handle returned by [`FrameEvents::subscribe`]
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription leaves the handler registered"]
pub struct Subscription {
    id: u64,
    kind: StreamKind,
}

impl Subscription {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }
}

struct Registration {
    id: u64,
    kind: StreamKind,
    handler: FrameHandler,
}

/// Observer registry for color and depth frame-ready events
#[derive(Default)]
pub struct FrameEvents {
    next_id: AtomicU64,
    handlers: Mutex<Vec<Registration>>,
}

impl FrameEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one stream
    pub fn subscribe(&self, kind: StreamKind, handler: FrameHandler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Registration { id, kind, handler });
        debug!(id, kind = %kind, "Frame handler subscribed");
        Subscription { id, kind }
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|r| r.id != subscription.id);
        let removed = handlers.len() != before;
        if removed {
            debug!(id = subscription.id, kind = %subscription.kind, "Frame handler unsubscribed");
        } else {
            warn!(id = subscription.id, "Unsubscribe for unknown handler");
        }
        removed
    }

    /// Deliver a frame-ready notification to every handler of `kind`
    ///
    /// Handlers run synchronously on the caller's thread, in subscription
    /// order. They must not subscribe or unsubscribe from inside the call.
    pub fn emit(&self, kind: StreamKind, frame: Option<FrameHandle<'_>>) {
        let mut handlers = self.lock();
        for registration in handlers.iter_mut().filter(|r| r.kind == kind) {
            (registration.handler)(frame);
        }
    }

    /// Number of registered handlers across all streams
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of registered handlers for one stream
    pub fn subscriber_count_for(&self, kind: StreamKind) -> usize {
        self.lock().iter().filter(|r| r.kind == kind).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registration>> {
        // A panicking handler poisons the lock; the list itself stays valid
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for FrameEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameEvents({} handlers)", self.subscriber_count())
    }
}
