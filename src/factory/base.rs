use std::any::Any;
use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use crate::core::{ChartOptions, Snapshot};
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, DispatchReport, EventKind, EventManager, EventName, ListenerId};

use super::{FactoryManager, WeakFactoryManager};

/// Handles given to a component when its chart links it.
#[derive(Debug)]
pub struct FactoryContext<'a> {
    pub key: &'a str,
    pub events: &'a EventManager,
    pub factories: &'a FactoryManager,
}

/// A visual or behavioral chart component managed by [`FactoryManager`].
///
/// Lifecycle hooks take `Rc<Self>` so a component can hand weak references
/// of itself to the listeners it registers.
pub trait Factory: Any {
    fn base(&self) -> &FactoryBase;

    /// Called once, after the component is registered and attached.
    fn init(self: Rc<Self>, _context: &FactoryContext<'_>) -> ChartResult<()> {
        Ok(())
    }

    fn create(self: Rc<Self>, _options: &ChartOptions) -> ChartResult<()> {
        Ok(())
    }

    /// Must return early when the component is turned off.
    fn update(self: Rc<Self>, _snapshot: &Snapshot) -> ChartResult<()> {
        Ok(())
    }

    fn destroy(self: Rc<Self>) -> ChartResult<()> {
        Ok(())
    }
}

/// State shared by every component: key, bus handles and the active flag.
#[derive(Debug, Default)]
pub struct FactoryBase {
    key: OnceCell<String>,
    events: OnceCell<EventManager>,
    factories: OnceCell<WeakFactoryManager>,
    disabled: Cell<bool>,
}

impl FactoryBase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn attach(
        &self,
        key: &str,
        events: &EventManager,
        factories: WeakFactoryManager,
    ) -> ChartResult<()> {
        self.key
            .set(key.to_owned())
            .map_err(|_| ChartError::AlreadyInitialized(key.to_owned()))?;
        // Both cells are only written here, right after `key`.
        let _ = self.events.set(events.clone());
        let _ = self.factories.set(factories);
        Ok(())
    }

    /// Registry key, or an empty string before the chart links the component.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.get().map_or("", String::as_str)
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.key.get().is_some()
    }

    pub fn events(&self) -> ChartResult<&EventManager> {
        self.events.get().ok_or(ChartError::NotInitialized)
    }

    pub fn factories(&self) -> ChartResult<FactoryManager> {
        self.factories
            .get()
            .and_then(WeakFactoryManager::upgrade)
            .ok_or(ChartError::NotInitialized)
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        !self.disabled.get()
    }

    pub fn turn_on(&self) {
        self.disabled.set(false);
    }

    pub fn turn_off(&self) {
        self.disabled.set(true);
    }

    /// Triggers `event` with this component as origin.
    pub fn trigger(&self, event: ChartEvent) -> ChartResult<DispatchReport> {
        self.events()?.trigger_from(self.key(), event)
    }
}

/// Subscribes `handler` under the component's namespace.
///
/// The listener holds a weak reference, so it goes quiet once the component
/// is dropped.
pub fn subscribe<T, H>(this: &Rc<T>, kind: EventKind, handler: H) -> ChartResult<ListenerId>
where
    T: Factory,
    H: Fn(&T, &ChartEvent) -> ChartResult<()> + 'static,
{
    let base = this.base();
    let weak = Rc::downgrade(this);
    base.events()?
        .on(EventName::namespaced(kind, base.key()), move |event| {
            match weak.upgrade() {
                Some(factory) => handler(&factory, event),
                None => Ok(()),
            }
        })
}
