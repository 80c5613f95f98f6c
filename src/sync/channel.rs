use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::{Coordinates, PartialDomains};
use crate::error::ChartResult;
use crate::interaction::GestureKind;

/// Identity of a chart instance on a shared channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(u64);

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

impl ScopeId {
    /// Allocates a process-unique scope.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Payload exchanged between chart instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SyncMessage {
    Tooltip {
        coordinates: Coordinates,
    },
    Domains {
        domains: PartialDomains,
        gesture: GestureKind,
    },
}

/// A message addressed to `key` and stamped with its sender scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub key: String,
    pub origin: ScopeId,
    pub message: SyncMessage,
}

impl Envelope {
    #[must_use]
    pub fn new(key: impl Into<String>, origin: ScopeId, message: SyncMessage) -> Self {
        Self {
            key: key.into(),
            origin,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type ChannelListener = Rc<dyn Fn(&Envelope) -> ChartResult<()>>;

/// Name-addressed broadcast medium shared by chart instances.
pub trait BroadcastChannel {
    fn subscribe(&self, key: &str, listener: ChannelListener) -> SubscriptionId;

    /// Returns `true` when the subscription existed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Delivers to every subscriber of `envelope.key`; returns the number reached.
    fn publish(&self, envelope: &Envelope) -> usize;
}

struct ChannelSubscription {
    id: SubscriptionId,
    key: String,
    listener: ChannelListener,
}

#[derive(Default)]
struct ChannelRegistry {
    subscriptions: Vec<ChannelSubscription>,
    next_id: u64,
}

/// In-process channel. Fan-out is synchronous, in subscription order.
///
/// Listener errors are logged and do not stop delivery to later subscribers.
#[derive(Default)]
pub struct LocalBroadcastChannel {
    registry: RefCell<ChannelRegistry>,
}

impl LocalBroadcastChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.registry
            .borrow()
            .subscriptions
            .iter()
            .filter(|subscription| subscription.key == key)
            .count()
    }

    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.registry.borrow().subscriptions.len()
    }
}

impl BroadcastChannel for LocalBroadcastChannel {
    fn subscribe(&self, key: &str, listener: ChannelListener) -> SubscriptionId {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscriptions.push(ChannelSubscription {
            id,
            key: key.to_owned(),
            listener,
        });
        trace!(key, subscription = id.0, "channel subscription added");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.subscriptions.len();
        registry.subscriptions.retain(|subscription| subscription.id != id);
        before != registry.subscriptions.len()
    }

    fn publish(&self, envelope: &Envelope) -> usize {
        let listeners: Vec<ChannelListener> = self
            .registry
            .borrow()
            .subscriptions
            .iter()
            .filter(|subscription| subscription.key == envelope.key)
            .map(|subscription| Rc::clone(&subscription.listener))
            .collect();

        let mut delivered = 0;
        for listener in listeners {
            match listener(envelope) {
                Ok(()) => delivered += 1,
                Err(error) => {
                    warn!(key = %envelope.key, origin = %envelope.origin, error = %error,
                        "channel listener failed; continuing delivery");
                }
            }
        }
        delivered
    }
}

impl fmt::Debug for LocalBroadcastChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBroadcastChannel")
            .field("subscribers", &self.total_subscribers())
            .finish()
    }
}
