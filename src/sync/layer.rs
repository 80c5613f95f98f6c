use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::components::{Axis, CONTAINER, Container, PAN, Pan, TOOLTIP, TRANSITIONS, X_AXIS, Y_AXIS, ZOOM, Zoom};
use crate::core::{ChartOptions, Coordinates, Domains, PartialDomains, PointerEvent};
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, EventKind, ListenerId};
use crate::factory::{Factory, FactoryBase, FactoryContext, subscribe};
use crate::interaction::GestureKind;

use super::{BroadcastChannel, Envelope, ScopeId, SubscriptionId, SyncMessage};

/// Host notification receiving the constrained domains at gesture end.
pub type DomainsChangeCallback = Rc<dyn Fn(&PartialDomains)>;

/// Sync attributes supplied by the embedding host. Empty keys count as absent.
#[derive(Clone, Default)]
pub struct SyncConfig {
    pub tooltip_sync_key: Option<String>,
    pub domains_sync_key: Option<String>,
    pub on_domains_change: Option<DomainsChangeCallback>,
}

impl SyncConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tooltip_sync_key(mut self, key: impl Into<String>) -> Self {
        self.tooltip_sync_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_domains_sync_key(mut self, key: impl Into<String>) -> Self {
        self.domains_sync_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_on_domains_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PartialDomains) + 'static,
    {
        self.on_domains_change = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("tooltip_sync_key", &self.tooltip_sync_key)
            .field("domains_sync_key", &self.domains_sync_key)
            .field("on_domains_change", &self.on_domains_change.is_some())
            .finish()
    }
}

#[derive(Clone)]
enum OutboundAction {
    NotifyHost(DomainsChangeCallback),
    Broadcast(String),
}

/// Mirrors hover and viewport state between chart instances.
///
/// Outbound, it turns local gesture events into channel broadcasts and host
/// notifications. Inbound, it replays peer messages as local events. Its own
/// broadcasts are recognized by scope and ignored.
pub struct SyncLayer {
    base: FactoryBase,
    scope: ScopeId,
    channel: Rc<dyn BroadcastChannel>,
    tooltip_key: Option<String>,
    domains_key: Option<String>,
    on_domains_change: Option<DomainsChangeCallback>,
    axes: OnceCell<(Rc<Axis>, Rc<Axis>)>,
    outbound: RefCell<SmallVec<[OutboundAction; 2]>>,
    subscriptions: RefCell<Vec<SubscriptionId>>,
    listeners: RefCell<Vec<ListenerId>>,
}

impl SyncLayer {
    /// Fails with [`ChartError::SyncKeyConflict`] when both keys are equal.
    pub fn new(
        scope: ScopeId,
        channel: Rc<dyn BroadcastChannel>,
        config: SyncConfig,
    ) -> ChartResult<Self> {
        let tooltip_key = config.tooltip_sync_key.filter(|key| !key.is_empty());
        let domains_key = config.domains_sync_key.filter(|key| !key.is_empty());
        if let (Some(tooltip), Some(domains)) = (&tooltip_key, &domains_key) {
            if tooltip == domains {
                return Err(ChartError::SyncKeyConflict(tooltip.clone()));
            }
        }
        Ok(Self {
            base: FactoryBase::new(),
            scope,
            channel,
            tooltip_key,
            domains_key,
            on_domains_change: config.on_domains_change,
            axes: OnceCell::new(),
            outbound: RefCell::new(SmallVec::new()),
            subscriptions: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    #[must_use]
    pub fn tooltip_key(&self) -> Option<&str> {
        self.tooltip_key.as_deref()
    }

    #[must_use]
    pub fn domains_key(&self) -> Option<&str> {
        self.domains_key.as_deref()
    }

    /// Number of live channel subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Number of outbound actions run for each gesture event (0 to 2).
    #[must_use]
    pub fn outbound_action_count(&self) -> usize {
        self.outbound.borrow().len()
    }

    fn axes(&self) -> ChartResult<&(Rc<Axis>, Rc<Axis>)> {
        self.axes.get().ok_or(ChartError::NotInitialized)
    }

    fn current_domains(&self) -> ChartResult<Domains> {
        let (x_axis, y_axis) = self.axes()?;
        Ok(Domains {
            x: x_axis.scale_domain(),
            y: y_axis.scale_domain(),
        })
    }

    fn listen<H>(this: &Rc<Self>, kind: EventKind, handler: H) -> ChartResult<()>
    where
        H: Fn(&Self, &ChartEvent) -> ChartResult<()> + 'static,
    {
        let id = subscribe(this, kind, handler)?;
        this.listeners.borrow_mut().push(id);
        Ok(())
    }

    fn subscribe_channel<H>(this: &Rc<Self>, key: &str, handler: H)
    where
        H: Fn(&Self, &Envelope) -> ChartResult<()> + 'static,
    {
        let weak = Rc::downgrade(this);
        let id = this.channel.subscribe(
            key,
            Rc::new(move |envelope| match weak.upgrade() {
                Some(layer) => handler(&layer, envelope),
                None => Ok(()),
            }),
        );
        this.subscriptions.borrow_mut().push(id);
    }

    fn sync_tooltips(this: &Rc<Self>) -> ChartResult<()> {
        let Some(key) = this.tooltip_key.clone() else {
            return Ok(());
        };
        Self::subscribe_channel(this, &key, Self::receive_tooltip);
        Self::listen(this, EventKind::ContainerMove, |layer, event| match event {
            ChartEvent::ContainerMove(pointer) => layer.publish_hover(pointer),
            _ => Ok(()),
        })?;
        Self::listen(this, EventKind::ContainerOut, |layer, _| {
            layer.publish_tooltip(Coordinates::none());
            Ok(())
        })?;
        debug!(scope = %this.scope, key = %key, "tooltip sync enabled");
        Ok(())
    }

    fn receive_tooltip(&self, envelope: &Envelope) -> ChartResult<()> {
        let SyncMessage::Tooltip { coordinates } = envelope.message else {
            return Ok(());
        };
        self.base
            .events()?
            .trigger_data_and_options(self.base.key(), |snapshot| {
                ChartEvent::OuterWorldHover {
                    coordinates,
                    snapshot,
                }
            })?;
        Ok(())
    }

    fn publish_hover(&self, pointer: &PointerEvent) -> ChartResult<()> {
        let container = self.base.factories()?.get_as::<Container>(CONTAINER)?;
        self.publish_tooltip(container.coordinates_from_event(pointer)?);
        Ok(())
    }

    fn publish_tooltip(&self, coordinates: Coordinates) {
        if let Some(key) = &self.tooltip_key {
            self.channel.publish(&Envelope::new(
                key.as_str(),
                self.scope,
                SyncMessage::Tooltip { coordinates },
            ));
        }
    }

    fn sync_domains(this: &Rc<Self>) -> ChartResult<()> {
        let mut outbound: SmallVec<[OutboundAction; 2]> = SmallVec::new();
        if let Some(callback) = &this.on_domains_change {
            outbound.push(OutboundAction::NotifyHost(Rc::clone(callback)));
        }
        if let Some(key) = this.domains_key.clone() {
            Self::subscribe_channel(this, &key, Self::receive_domains);
            outbound.push(OutboundAction::Broadcast(key));
        }
        if outbound.is_empty() {
            return Ok(());
        }
        *this.outbound.borrow_mut() = outbound;

        for gesture in [
            GestureKind::Pan,
            GestureKind::PanEnd,
            GestureKind::Zoom,
            GestureKind::ZoomEnd,
        ] {
            Self::listen(this, gesture.event_kind(), move |layer, _| {
                layer.ping_gesture(gesture)
            })?;
        }
        Self::listen(this, EventKind::ZoomPanReset, |layer, event| match event {
            ChartEvent::ZoomPanReset { made_here: true } => {
                layer.ping(layer.current_domains()?.into(), GestureKind::ZoomPanReset);
                Ok(())
            }
            _ => Ok(()),
        })?;
        debug!(scope = %this.scope, actions = this.outbound_action_count(), "domain sync enabled");
        Ok(())
    }

    fn ping_gesture(&self, gesture: GestureKind) -> ChartResult<()> {
        let mut domains = PartialDomains::from(self.current_domains()?);
        let factories = self.base.factories()?;
        match gesture {
            GestureKind::Pan | GestureKind::PanEnd => {
                factories
                    .get_as::<Pan>(PAN)?
                    .constrain_outgoing_domains(&mut domains);
            }
            GestureKind::Zoom | GestureKind::ZoomEnd => {
                factories
                    .get_as::<Zoom>(ZOOM)?
                    .constrain_outgoing_domains(&mut domains);
            }
            GestureKind::ZoomPanReset => {}
        }
        self.ping(domains, gesture);
        Ok(())
    }

    fn ping(&self, domains: PartialDomains, gesture: GestureKind) {
        let outbound = self.outbound.borrow().clone();
        for action in &outbound {
            match action {
                OutboundAction::NotifyHost(callback) => {
                    if gesture.is_end() {
                        trace!(scope = %self.scope, %gesture, "notifying host of domain change");
                        callback(&domains);
                    }
                }
                OutboundAction::Broadcast(key) => {
                    let reached = self.channel.publish(&Envelope::new(
                        key.as_str(),
                        self.scope,
                        SyncMessage::Domains { domains, gesture },
                    ));
                    trace!(scope = %self.scope, %gesture, reached, "domains broadcast");
                }
            }
        }
    }

    fn receive_domains(&self, envelope: &Envelope) -> ChartResult<()> {
        if envelope.origin == self.scope {
            trace!(scope = %self.scope, "ignoring own domain broadcast");
            return Ok(());
        }
        let SyncMessage::Domains { domains, gesture } = envelope.message else {
            return Ok(());
        };
        let (x_axis, y_axis) = self.axes()?;
        let domains = domains.complete_with(|| x_axis.scale_domain(), || y_axis.scale_domain());
        let factories = self.base.factories()?;
        debug!(scope = %self.scope, origin = %envelope.origin, %gesture, "peer domain change");

        match gesture {
            GestureKind::ZoomEnd => {
                self.base.trigger(ChartEvent::OuterWorldDomainChange(domains))?;
                factories.turn_factories_on(&[TOOLTIP])?;
            }
            GestureKind::Zoom => {
                factories.turn_factories_off(&[TOOLTIP])?;
            }
            GestureKind::Pan | GestureKind::PanEnd => {
                factories.turn_factories_off(&[TRANSITIONS, TOOLTIP])?;
                self.base.trigger(ChartEvent::OuterWorldDomainChange(domains))?;
                if gesture == GestureKind::PanEnd {
                    factories.turn_factories_on(&[TRANSITIONS, TOOLTIP])?;
                }
            }
            GestureKind::ZoomPanReset => {
                self.base
                    .trigger(ChartEvent::ZoomPanReset { made_here: false })?;
            }
        }
        Ok(())
    }
}

impl Factory for SyncLayer {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self.axes.set((
            context.factories.get_as::<Axis>(X_AXIS)?,
            context.factories.get_as::<Axis>(Y_AXIS)?,
        ));
        Ok(())
    }

    fn create(self: Rc<Self>, _options: &ChartOptions) -> ChartResult<()> {
        Self::sync_tooltips(&self)?;
        Self::sync_domains(&self)?;
        Ok(())
    }

    /// Unsubscribes every channel subscription, newest first.
    fn destroy(self: Rc<Self>) -> ChartResult<()> {
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        for id in subscriptions.into_iter().rev() {
            self.channel.unsubscribe(id);
        }
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        if let Ok(events) = self.base.events() {
            for id in listeners.into_iter().rev() {
                events.off(id);
            }
        }
        self.outbound.borrow_mut().clear();
        debug!(scope = %self.scope, "sync layer torn down");
        Ok(())
    }
}
