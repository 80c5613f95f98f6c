use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, EventKind, EventManager, EventName};

use super::{Factory, FactoryContext};

type FactoryBuilder = Box<dyn FnOnce() -> ChartResult<Rc<dyn Factory>>>;

/// Registration record: a key and a constructor with its arguments captured.
pub struct FactorySpec {
    key: String,
    build: FactoryBuilder,
}

impl FactorySpec {
    pub fn new<T, F>(key: impl Into<String>, build: F) -> Self
    where
        T: Factory,
        F: FnOnce() -> ChartResult<T> + 'static,
    {
        Self {
            key: key.into(),
            build: Box::new(move || {
                let instance: Rc<dyn Factory> = Rc::new(build()?);
                Ok(instance)
            }),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for FactorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorySpec")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A registered component and its key.
#[derive(Clone)]
pub struct FactoryEntry {
    pub key: String,
    pub instance: Rc<dyn Factory>,
}

#[derive(Default)]
struct FactoryRegistry {
    entries: RefCell<IndexMap<String, Rc<dyn Factory>>>,
    sealed: Cell<bool>,
}

/// Ordered component registry for one chart instance.
///
/// Cloning yields another handle to the same registry. Components only keep
/// a [`WeakFactoryManager`].
#[derive(Clone, Default)]
pub struct FactoryManager {
    inner: Rc<FactoryRegistry>,
}

#[derive(Clone, Default)]
pub struct WeakFactoryManager {
    inner: Weak<FactoryRegistry>,
}

impl WeakFactoryManager {
    #[must_use]
    pub fn upgrade(&self) -> Option<FactoryManager> {
        self.inner.upgrade().map(|inner| FactoryManager { inner })
    }
}

impl fmt::Debug for WeakFactoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakFactoryManager")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl FactoryManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakFactoryManager {
        WeakFactoryManager {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Constructs components in the given order and registers them.
    ///
    /// Registration order is also initialization and listener order.
    pub fn register_many(&self, specs: impl IntoIterator<Item = FactorySpec>) -> ChartResult<()> {
        for spec in specs {
            if self.inner.sealed.get() {
                return Err(ChartError::RegistrySealed(spec.key));
            }
            if self.contains(&spec.key) {
                return Err(ChartError::DuplicateComponent(spec.key));
            }
            let instance = (spec.build)()?;
            debug!(key = %spec.key, "component registered");
            self.inner.entries.borrow_mut().insert(spec.key, instance);
        }
        Ok(())
    }

    /// Attaches, binds lifecycle hooks and initializes every component once.
    ///
    /// The key set is sealed afterwards.
    pub fn init_all(&self, events: &EventManager) -> ChartResult<()> {
        for entry in self.all() {
            entry
                .instance
                .base()
                .attach(&entry.key, events, self.downgrade())?;
            Self::bind_lifecycle(&entry, events)?;
            let context = FactoryContext {
                key: &entry.key,
                events,
                factories: self,
            };
            Rc::clone(&entry.instance).init(&context)?;
        }
        self.inner.sealed.set(true);
        debug!(components = self.len(), "components initialized");
        Ok(())
    }

    fn bind_lifecycle(entry: &FactoryEntry, events: &EventManager) -> ChartResult<()> {
        for kind in [EventKind::Create, EventKind::Update, EventKind::Destroy] {
            let weak = Rc::downgrade(&entry.instance);
            events.on(
                EventName::namespaced(kind, entry.key.as_str()),
                move |event| {
                    let Some(factory) = weak.upgrade() else {
                        return Ok(());
                    };
                    match event {
                        ChartEvent::Create(options) => factory.create(options),
                        ChartEvent::Update(snapshot) => factory.update(snapshot),
                        ChartEvent::Destroy => factory.destroy(),
                        _ => Ok(()),
                    }
                },
            )?;
        }
        Ok(())
    }

    /// Entries in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<FactoryEntry> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(key, instance)| FactoryEntry {
                key: key.clone(),
                instance: Rc::clone(instance),
            })
            .collect()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.get()
    }

    pub fn get(&self, key: &str) -> ChartResult<Rc<dyn Factory>> {
        self.inner
            .entries
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| ChartError::NotFound(key.to_owned()))
    }

    /// Typed lookup of a registered component.
    pub fn get_as<T: Factory>(&self, key: &str) -> ChartResult<Rc<T>> {
        let instance: Rc<dyn Any> = self.get(key)?;
        instance
            .downcast::<T>()
            .map_err(|_| ChartError::ComponentTypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
            })
    }

    /// Re-enables components. All keys are checked before any flag changes.
    pub fn turn_factories_on(&self, keys: &[&str]) -> ChartResult<()> {
        for factory in self.resolve_all(keys)? {
            factory.base().turn_on();
        }
        debug!(?keys, "components turned on");
        Ok(())
    }

    /// Suspends components without unregistering or resetting them.
    pub fn turn_factories_off(&self, keys: &[&str]) -> ChartResult<()> {
        for factory in self.resolve_all(keys)? {
            factory.base().turn_off();
        }
        debug!(?keys, "components turned off");
        Ok(())
    }

    fn resolve_all(&self, keys: &[&str]) -> ChartResult<Vec<Rc<dyn Factory>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}

impl fmt::Debug for FactoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryManager")
            .field("keys", &self.keys())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{FactoryManager, FactorySpec};
    use crate::core::Snapshot;
    use crate::error::{ChartError, ChartResult};
    use crate::events::EventManager;
    use crate::factory::{Factory, FactoryBase, FactoryContext};

    struct Probe {
        base: FactoryBase,
        inits: Cell<usize>,
        updates: Cell<usize>,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn new(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Self {
            log.borrow_mut().push(format!("new:{label}"));
            Self {
                base: FactoryBase::new(),
                inits: Cell::new(0),
                updates: Cell::new(0),
                log: Rc::clone(log),
            }
        }
    }

    impl Factory for Probe {
        fn base(&self) -> &FactoryBase {
            &self.base
        }

        fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
            self.inits.set(self.inits.get() + 1);
            self.log.borrow_mut().push(format!("init:{}", context.key));
            Ok(())
        }

        fn update(self: Rc<Self>, _snapshot: &Snapshot) -> ChartResult<()> {
            if !self.base.is_on() {
                return Ok(());
            }
            self.updates.set(self.updates.get() + 1);
            Ok(())
        }
    }

    struct Other {
        base: FactoryBase,
    }

    impl Factory for Other {
        fn base(&self) -> &FactoryBase {
            &self.base
        }
    }

    fn spec(log: &Rc<RefCell<Vec<String>>>, key: &'static str) -> FactorySpec {
        let log = Rc::clone(log);
        FactorySpec::new(key, move || Ok(Probe::new(&log, key)))
    }

    #[test]
    fn construction_and_init_follow_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factories = FactoryManager::new();
        factories
            .register_many([spec(&log, "b"), spec(&log, "a"), spec(&log, "c")])
            .expect("register");
        factories
            .init_all(&EventManager::with_default_events())
            .expect("init");

        assert_eq!(factories.keys(), vec!["b", "a", "c"]);
        assert_eq!(
            *log.borrow(),
            vec!["new:b", "new:a", "new:c", "init:b", "init:a", "init:c"]
        );
    }

    #[test]
    fn lookups_report_missing_and_mistyped_components() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factories = FactoryManager::new();
        factories
            .register_many([
                spec(&log, "probe"),
                FactorySpec::new("other", || {
                    Ok(Other {
                        base: FactoryBase::new(),
                    })
                }),
            ])
            .expect("register");

        assert!(matches!(factories.get("nope"), Err(ChartError::NotFound(key)) if key == "nope"));
        assert!(factories.get_as::<Probe>("probe").is_ok());
        assert!(matches!(
            factories.get_as::<Probe>("other"),
            Err(ChartError::ComponentTypeMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_keys_and_late_registration_are_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factories = FactoryManager::new();
        let err = factories
            .register_many([spec(&log, "a"), spec(&log, "a")])
            .expect_err("duplicate");
        assert!(matches!(err, ChartError::DuplicateComponent(_)));

        factories
            .init_all(&EventManager::with_default_events())
            .expect("init");
        let err = factories
            .register_many([spec(&log, "late")])
            .expect_err("sealed");
        assert!(matches!(err, ChartError::RegistrySealed(_)));
    }

    #[test]
    fn init_runs_exactly_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factories = FactoryManager::new();
        factories.register_many([spec(&log, "a")]).expect("register");
        let events = EventManager::with_default_events();
        factories.init_all(&events).expect("first init");

        let err = factories.init_all(&events).expect_err("second init");
        assert!(matches!(err, ChartError::AlreadyInitialized(_)));
        let probe = factories.get_as::<Probe>("a").expect("probe");
        assert_eq!(probe.inits.get(), 1);
    }

    #[test]
    fn toggling_validates_every_key_before_changing_flags() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let factories = FactoryManager::new();
        factories.register_many([spec(&log, "a")]).expect("register");

        assert!(factories.turn_factories_off(&["a", "missing"]).is_err());
        let probe = factories.get_as::<Probe>("a").expect("probe");
        assert!(probe.base().is_on());

        factories.turn_factories_off(&["a"]).expect("off");
        assert!(!probe.base().is_on());
        factories.turn_factories_on(&["a"]).expect("on");
        assert!(probe.base().is_on());
    }
}
