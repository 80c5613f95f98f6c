use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::components::{
    Axis, CONTAINER, Container, GRID, Grid, LEGEND, Legend, PAN, Pan, SERIES_AREA, SERIES_COLUMN,
    SERIES_DOT, SERIES_LINE, SYNC_LAYER, SeriesLayer, TOOLTIP, TRANSITIONS, Tooltip, Transitions,
    X_AXIS, X2_AXIS, Y_AXIS, Y2_AXIS, ZOOM, Zoom,
};
use crate::core::{AxisSide, ChartData, ChartOptions, ElementDimensions, SeriesKind, Snapshot};
use crate::error::{ChartError, ChartResult};
use crate::events::{
    ChartEvent, DispatchReport, EventKind, EventManager, EventName, WeakEventManager,
};
use crate::factory::{Factory, FactoryManager, FactorySpec};
use crate::sync::{BroadcastChannel, ScopeId, SyncConfig, SyncLayer};

use super::{Debouncer, RESIZE_DEBOUNCE_INTERVAL};

/// Namespace of the chart's own listeners.
pub const DIRECTIVE_NAMESPACE: &str = "directive";

#[derive(Debug, Clone)]
pub struct LineChartConfig {
    pub sync: SyncConfig,
    pub resize_debounce: Duration,
}

impl LineChartConfig {
    #[must_use]
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub fn with_resize_debounce(mut self, interval: Duration) -> Self {
        self.resize_debounce = interval;
        self
    }
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            resize_debounce: RESIZE_DEBOUNCE_INTERVAL,
        }
    }
}

/// Component specs of a standard line chart, in registration order.
#[must_use]
pub fn default_factory_specs(
    scope: ScopeId,
    channel: Rc<dyn BroadcastChannel>,
    sync: SyncConfig,
) -> Vec<FactorySpec> {
    vec![
        FactorySpec::new(CONTAINER, || Ok(Container::new())),
        FactorySpec::new(TOOLTIP, || Ok(Tooltip::new())),
        FactorySpec::new(LEGEND, || Ok(Legend::new())),
        FactorySpec::new(TRANSITIONS, || Ok(Transitions::new())),
        FactorySpec::new(X_AXIS, || Axis::new(AxisSide::X)),
        FactorySpec::new(X2_AXIS, || Axis::new(AxisSide::X2)),
        FactorySpec::new(Y_AXIS, || Axis::new(AxisSide::Y)),
        FactorySpec::new(Y2_AXIS, || Axis::new(AxisSide::Y2)),
        FactorySpec::new(GRID, || Ok(Grid::new())),
        FactorySpec::new(PAN, || Ok(Pan::new())),
        FactorySpec::new(ZOOM, || Ok(Zoom::new())),
        FactorySpec::new(SYNC_LAYER, move || SyncLayer::new(scope, channel, sync)),
        FactorySpec::new(SERIES_AREA, || Ok(SeriesLayer::new(SeriesKind::Area))),
        FactorySpec::new(SERIES_COLUMN, || Ok(SeriesLayer::new(SeriesKind::Column))),
        FactorySpec::new(SERIES_LINE, || Ok(SeriesLayer::new(SeriesKind::Line))),
        FactorySpec::new(SERIES_DOT, || Ok(SeriesLayer::new(SeriesKind::Dot))),
    ]
}

/// Host-owned chart inputs. Components only ever see snapshots of them.
#[derive(Debug, Default)]
struct HostModel {
    options: Option<ChartOptions>,
    data: ChartData,
    deferred_creation: bool,
}

/// Turns a `create` dispatch into an error when any component failed to create.
///
/// Failures of later updates stay in their [`DispatchReport`].
fn creation_outcome(report: DispatchReport) -> ChartResult<()> {
    match report.failures.into_iter().next() {
        Some(failure) => Err(failure.error),
        None => Ok(()),
    }
}

/// Builds a fresh snapshot and pushes it through the bus.
///
/// Creation deferred for lack of options happens on the first update that has them.
fn publish_update(events: &EventManager, host: &RefCell<HostModel>) -> ChartResult<DispatchReport> {
    let (snapshot, create) = {
        let mut host = host.borrow_mut();
        let Some(options) = host.options.as_ref() else {
            trace!("update skipped, options not set yet");
            return Ok(DispatchReport::default());
        };
        let snapshot = Snapshot::new(&host.data, options);
        let create = std::mem::replace(&mut host.deferred_creation, false);
        (snapshot, create)
    };
    if create {
        debug!("running deferred chart creation");
        creation_outcome(events.trigger(ChartEvent::Create(Rc::clone(&snapshot.options)))?)?;
    }
    events.update(snapshot.clone());
    events.trigger(ChartEvent::Update(snapshot))
}

/// A line chart instance: one event bus, one component registry and the host model.
pub struct LineChart {
    scope: ScopeId,
    events: EventManager,
    factories: FactoryManager,
    host: Rc<RefCell<HostModel>>,
    resize: RefCell<Debouncer<ElementDimensions>>,
    dimensions: Cell<Option<ElementDimensions>>,
    destroyed: Cell<bool>,
}

impl LineChart {
    /// Registers and links the default components, then creates the chart.
    ///
    /// Without options, creation waits for the first [`LineChart::set_options`].
    /// A component failing its `create` fails the call, and the partly linked
    /// chart is torn down on drop.
    pub fn new(
        scope: ScopeId,
        channel: Rc<dyn BroadcastChannel>,
        config: LineChartConfig,
        options: Option<ChartOptions>,
        data: ChartData,
    ) -> ChartResult<Self> {
        let events = EventManager::with_default_events();
        let factories = FactoryManager::new();
        factories.register_many(default_factory_specs(scope, channel, config.sync))?;
        factories.init_all(&events)?;

        let deferred_creation = options.is_none();
        let host = Rc::new(RefCell::new(HostModel {
            options,
            data,
            deferred_creation,
        }));

        let chart = Self {
            scope,
            events,
            factories,
            host,
            resize: RefCell::new(Debouncer::new(config.resize_debounce)),
            dimensions: Cell::new(None),
            destroyed: Cell::new(false),
        };
        chart.listen_legend_clicks()?;

        let initial_options = chart.host.borrow().options.clone();
        if let Some(options) = initial_options {
            creation_outcome(chart.events.trigger(ChartEvent::Create(Rc::new(options)))?)?;
        }
        publish_update(&chart.events, &chart.host)?;
        debug!(scope = %scope, deferred_creation, "line chart linked");
        Ok(chart)
    }

    fn listen_legend_clicks(&self) -> ChartResult<()> {
        let weak_events: WeakEventManager = self.events.downgrade();
        let weak_host = Rc::downgrade(&self.host);
        self.events.on(
            EventName::namespaced(EventKind::LegendClick, DIRECTIVE_NAMESPACE),
            move |event| {
                let ChartEvent::LegendClick(toggle) = event else {
                    return Ok(());
                };
                let (Some(events), Some(host)) = (weak_events.upgrade(), weak_host.upgrade())
                else {
                    return Ok(());
                };
                {
                    let mut model = host.borrow_mut();
                    let series = model
                        .options
                        .as_mut()
                        .and_then(|options| options.series_mut(&toggle.series_id))
                        .ok_or_else(|| ChartError::NotFound(toggle.series_id.clone()))?;
                    series.visible = toggle.visible;
                }
                publish_update(&events, &host).map(|_| ())
            },
        )?;
        Ok(())
    }

    fn ensure_alive(&self) -> ChartResult<()> {
        if self.destroyed.get() {
            return Err(ChartError::Destroyed);
        }
        Ok(())
    }

    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    #[must_use]
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    #[must_use]
    pub fn factories(&self) -> &FactoryManager {
        &self.factories
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Typed access to a registered component.
    pub fn component<T: Factory>(&self, key: &str) -> ChartResult<Rc<T>> {
        self.factories.get_as::<T>(key)
    }

    #[must_use]
    pub fn options(&self) -> Option<ChartOptions> {
        self.host.borrow().options.clone()
    }

    #[must_use]
    pub fn data(&self) -> ChartData {
        self.host.borrow().data.clone()
    }

    pub fn set_options(&self, options: ChartOptions) -> ChartResult<DispatchReport> {
        self.ensure_alive()?;
        self.host.borrow_mut().options = Some(options);
        publish_update(&self.events, &self.host)
    }

    pub fn set_data(&self, data: ChartData) -> ChartResult<DispatchReport> {
        self.ensure_alive()?;
        self.host.borrow_mut().data = data;
        publish_update(&self.events, &self.host)
    }

    /// Re-publishes the current options and data.
    pub fn update(&self) -> ChartResult<DispatchReport> {
        self.ensure_alive()?;
        publish_update(&self.events, &self.host)
    }

    /// Schedules a resize; a newer call within the debounce interval replaces it.
    pub fn notify_resize(&self, now: Instant, dimensions: ElementDimensions) -> ChartResult<()> {
        self.ensure_alive()?;
        self.resize.borrow_mut().schedule(now, dimensions);
        Ok(())
    }

    /// Applies a settled resize. Returns `true` when `resize` was triggered.
    pub fn poll_resize(&self, now: Instant) -> ChartResult<bool> {
        self.ensure_alive()?;
        let Some(dimensions) = self.resize.borrow_mut().poll(now) else {
            return Ok(false);
        };
        if self.dimensions.get() == Some(dimensions) {
            trace!(scope = %self.scope, "resize settled on unchanged dimensions");
            return Ok(false);
        }
        self.dimensions.set(Some(dimensions));
        debug!(
            scope = %self.scope,
            width = dimensions.width,
            height = dimensions.height,
            "applying resize"
        );
        self.events.trigger(ChartEvent::Resize(dimensions))?;
        Ok(true)
    }

    /// Triggers `destroy` and tears the bus down.
    pub fn destroy(&self) -> ChartResult<DispatchReport> {
        self.ensure_alive()?;
        let report = self.events.trigger(ChartEvent::Destroy)?;
        self.resize.borrow_mut().cancel();
        self.events.teardown();
        self.destroyed.set(true);
        debug!(scope = %self.scope, "line chart destroyed");
        Ok(report)
    }
}

impl fmt::Debug for LineChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineChart")
            .field("scope", &self.scope)
            .field("events", &self.events)
            .field("factories", &self.factories)
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

impl Drop for LineChart {
    fn drop(&mut self) {
        if !self.destroyed.get() {
            let _ = self.destroy();
        }
    }
}
