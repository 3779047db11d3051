// ares-fabric/src/fabric.rs
// ============================================================================
// Module: ARES Event Fabric
// Description: In-process pub/sub with bounded per-subscriber queues.
// Purpose: Fan events out to observers without blocking producers.
// Dependencies: ares-core, tokio
// ============================================================================

//! ## Overview
//! The fabric routes every published event to each subscriber whose pattern
//! matches the event's topic. Each subscription owns a bounded Tokio mpsc
//! queue; delivery uses `try_send`, so a full queue drops the event for that
//! subscriber alone and bumps its drop counter. Publishing never blocks and
//! never fails. Per-topic ordering follows publish order because the core
//! publishes under the relevant entity lock; fairness across subscribers is
//! structural since no queue is shared. Closing a handle removes the
//! subscription synchronously.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use ares_core::Event;
use ares_core::EventSink;
use tokio::sync::mpsc;
use tracing::debug;

use crate::pattern::TopicPattern;

// ============================================================================
// SECTION: Shared State
// ============================================================================

/// One registered subscription.
struct SubscriberEntry {
    /// Subscription identifier.
    id: u64,
    /// Declared topic pattern.
    pattern: TopicPattern,
    /// Bounded queue feeding the handle.
    sender: mpsc::Sender<Event>,
    /// Overflow counter shared with the handle.
    dropped: Arc<AtomicU64>,
}

/// State shared between the fabric and its subscription handles.
struct FabricShared {
    /// Registered subscriptions.
    subscribers: Mutex<Vec<SubscriberEntry>>,
    /// Set once by close; publishing becomes a no-op afterwards.
    closed: AtomicBool,
    /// Monotonic subscription identifier source.
    next_id: AtomicU64,
}

impl FabricShared {
    /// Removes a subscription synchronously.
    fn remove(&self, id: u64) {
        let mut guard = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.retain(|entry| entry.id != id);
    }
}

// ============================================================================
// SECTION: Event Fabric
// ============================================================================

/// In-process pub/sub fabric for real-time observers.
///
/// # Invariants
/// - Publishing never blocks and never fails; overflow is counted per
///   subscription.
/// - Events reach each matching subscriber in publish order for a topic.
#[derive(Clone)]
pub struct EventFabric {
    /// Shared fabric state.
    inner: Arc<FabricShared>,
}

impl Default for EventFabric {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFabric {
    /// Creates an empty fabric.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FabricShared {
                subscribers: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribes to topics matching the pattern with a bounded queue.
    ///
    /// A `capacity` of zero is treated as one slot; a queue must be able to
    /// hold at least one event.
    #[must_use]
    pub fn subscribe(&self, pattern: TopicPattern, capacity: usize) -> SubscriptionHandle {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let dropped = Arc::new(AtomicU64::new(0));
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = SubscriberEntry {
            id,
            pattern,
            sender,
            dropped: Arc::clone(&dropped),
        };
        let mut guard = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(entry);
        drop(guard);
        SubscriptionHandle {
            id,
            fabric: Arc::clone(&self.inner),
            receiver,
            dropped,
            closed: false,
        }
    }

    /// Closes the fabric: removes every subscription and stops delivery.
    ///
    /// Queued events remain readable by their handles until drained.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let mut guard = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        match self.inner.subscribers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl EventSink for EventFabric {
    fn publish(&self, event: Event) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let topic = event.topic();
        let mut stale = Vec::new();
        let guard = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for entry in guard.iter() {
            if !entry.pattern.matches(&topic) {
                continue;
            }
            match entry.sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    entry.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(subscription = entry.id, topic = %topic, "event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    stale.push(entry.id);
                }
            }
        }
        drop(guard);
        for id in stale {
            self.inner.remove(id);
        }
    }
}

// ============================================================================
// SECTION: Subscription Handle
// ============================================================================

/// Consumer side of one subscription.
///
/// # Invariants
/// - Dropping or closing the handle removes the subscription synchronously.
pub struct SubscriptionHandle {
    /// Subscription identifier.
    id: u64,
    /// Back-reference for synchronous removal.
    fabric: Arc<FabricShared>,
    /// Bounded queue of delivered events.
    receiver: mpsc::Receiver<Event>,
    /// Overflow counter shared with the fabric.
    dropped: Arc<AtomicU64>,
    /// True once the subscription was removed.
    closed: bool,
}

impl SubscriptionHandle {
    /// Receives the next event, waiting until one is available.
    ///
    /// Returns `None` once the subscription is closed and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Receives the next event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Receives the next event, blocking the current thread.
    ///
    /// Returns `None` once the subscription is closed and drained.
    pub fn blocking_recv(&mut self) -> Option<Event> {
        self.receiver.blocking_recv()
    }

    /// Returns the number of events dropped for this subscription.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Removes the subscription; queued events stay readable until drained.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.fabric.remove(self.id);
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
