use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::Snapshot;
use crate::error::{ChartError, ChartResult};

use super::{ChartEvent, EventKind, EventName};

/// Callback invoked for every matching event.
///
/// Listeners are `Fn` so a listener may trigger further events, including
/// events it listens to itself.
pub type Listener = Rc<dyn Fn(&ChartEvent) -> ChartResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    namespace: Option<String>,
    callback: Listener,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    kind: EventKind,
    origin: Option<String>,
}

#[derive(Default)]
struct EventRegistry {
    // Declared kinds are the keys; an undeclared kind has no entry at all.
    listeners: IndexMap<EventKind, Vec<ListenerEntry>>,
    next_listener_id: u64,
    snapshot: Option<Snapshot>,
    in_flight: Vec<InFlight>,
}

/// Listener error captured during a dispatch.
#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub namespace: Option<String>,
    pub error: ChartError,
}

/// Outcome of one `trigger` call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub skipped_same_origin: usize,
    /// Set when the dispatch was dropped as a same-origin re-entry.
    pub suppressed: bool,
    pub failures: Vec<ListenerFailure>,
}

impl DispatchReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.suppressed && self.failures.is_empty()
    }
}

/// Synchronous publish/subscribe bus scoped to one chart instance.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventManager {
    inner: Rc<RefCell<EventRegistry>>,
}

/// Non-owning handle for listeners that must reach back into the bus.
#[derive(Clone, Default)]
pub struct WeakEventManager {
    inner: Weak<RefCell<EventRegistry>>,
}

impl WeakEventManager {
    #[must_use]
    pub fn upgrade(&self) -> Option<EventManager> {
        self.inner.upgrade().map(|inner| EventManager { inner })
    }
}

impl fmt::Debug for WeakEventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventManager")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

struct InFlightGuard<'a> {
    registry: &'a RefCell<EventRegistry>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        match self.registry.try_borrow_mut() {
            Ok(mut registry) => {
                registry.in_flight.pop();
            }
            // A stuck frame suppresses later dispatches of the same kind and origin.
            Err(_) => warn!("in-flight dispatch frame not released, registry is borrowed"),
        }
    }
}

impl EventManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus that already declares [`EventKind::ALL`].
    #[must_use]
    pub fn with_default_events() -> Self {
        let manager = Self::new();
        manager.init(&EventKind::ALL);
        manager
    }

    /// Declares the allowed vocabulary. Declaring a kind twice is a no-op.
    pub fn init(&self, kinds: &[EventKind]) {
        let mut registry = self.inner.borrow_mut();
        for kind in kinds {
            registry.listeners.entry(*kind).or_default();
        }
    }

    #[must_use]
    pub fn is_declared(&self, kind: EventKind) -> bool {
        self.inner.borrow().listeners.contains_key(&kind)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakEventManager {
        WeakEventManager {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Subscribes `callback`; listeners of one kind run in registration order.
    pub fn on<N, F>(&self, name: N, callback: F) -> ChartResult<ListenerId>
    where
        N: Into<EventName>,
        F: Fn(&ChartEvent) -> ChartResult<()> + 'static,
    {
        let name = name.into();
        let mut registry = self.inner.borrow_mut();
        let id = ListenerId(registry.next_listener_id);
        let entries = registry
            .listeners
            .get_mut(&name.kind)
            .ok_or(ChartError::UndeclaredEvent(name.kind))?;
        entries.push(ListenerEntry {
            id,
            namespace: name.namespace,
            callback: Rc::new(callback),
        });
        registry.next_listener_id += 1;
        trace!(event = %name.kind, listener = id.0, "listener registered");
        Ok(id)
    }

    /// Parses a `kind[.namespace]` string and subscribes.
    pub fn on_named<F>(&self, name: &str, callback: F) -> ChartResult<ListenerId>
    where
        F: Fn(&ChartEvent) -> ChartResult<()> + 'static,
    {
        self.on(name.parse::<EventName>()?, callback)
    }

    /// Removes a listener. Returns `true` when it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.borrow_mut();
        for entries in registry.listeners.values_mut() {
            if let Some(position) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(position);
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Stores the latest data/options pair; triggers nothing.
    pub fn update(&self, snapshot: Snapshot) {
        self.inner.borrow_mut().snapshot = Some(snapshot);
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.borrow().snapshot.clone()
    }

    /// Dispatches a host-originated event.
    pub fn trigger(&self, event: ChartEvent) -> ChartResult<DispatchReport> {
        self.dispatch(None, &event)
    }

    /// Dispatches an event raised by the component or owner `origin`.
    ///
    /// Listeners registered under the `origin` namespace are skipped.
    pub fn trigger_from(&self, origin: &str, event: ChartEvent) -> ChartResult<DispatchReport> {
        self.dispatch(Some(origin), &event)
    }

    /// Builds the event from the latest stored snapshot, then dispatches it.
    pub fn trigger_data_and_options<F>(&self, origin: &str, build: F) -> ChartResult<DispatchReport>
    where
        F: FnOnce(Option<Snapshot>) -> ChartEvent,
    {
        let event = build(self.snapshot());
        self.dispatch(Some(origin), &event)
    }

    /// Drops every listener and the stored snapshot. The vocabulary survives.
    pub fn teardown(&self) {
        let mut registry = self.inner.borrow_mut();
        for entries in registry.listeners.values_mut() {
            entries.clear();
        }
        registry.snapshot = None;
        debug!("event manager torn down");
    }

    fn dispatch(&self, origin: Option<&str>, event: &ChartEvent) -> ChartResult<DispatchReport> {
        let kind = event.kind();
        let listeners = {
            let mut registry = self.inner.borrow_mut();
            let listeners = registry
                .listeners
                .get(&kind)
                .ok_or(ChartError::UndeclaredEvent(kind))?
                .clone();
            let frame = InFlight {
                kind,
                origin: origin.map(str::to_owned),
            };
            if registry.in_flight.contains(&frame) {
                debug!(event = %kind, origin, "suppressing re-entrant dispatch from same origin");
                return Ok(DispatchReport {
                    suppressed: true,
                    ..DispatchReport::default()
                });
            }
            registry.in_flight.push(frame);
            listeners
        };
        let _guard = InFlightGuard {
            registry: &self.inner,
        };

        let mut report = DispatchReport::default();
        for entry in listeners {
            if origin.is_some() && entry.namespace.as_deref() == origin {
                report.skipped_same_origin += 1;
                continue;
            }
            match (entry.callback)(event) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(
                        event = %kind,
                        namespace = entry.namespace.as_deref(),
                        error = %error,
                        "listener failed; continuing dispatch"
                    );
                    report.failures.push(ListenerFailure {
                        listener: entry.id,
                        namespace: entry.namespace,
                        error,
                    });
                }
            }
        }
        trace!(event = %kind, delivered = report.delivered, "dispatch finished");
        Ok(report)
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("EventManager")
            .field("declared", &registry.listeners.len())
            .field(
                "listeners",
                &registry.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .field("has_snapshot", &registry.snapshot.is_some())
            .finish()
    }
}
