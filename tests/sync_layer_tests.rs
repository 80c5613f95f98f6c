use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use approx::assert_abs_diff_eq;
use line_chart_rs::api::{LineChart, LineChartConfig, RESIZE_DEBOUNCE_INTERVAL};
use line_chart_rs::components::{
    Axis, Container, Grid, PAN, Pan, SYNC_LAYER, TOOLTIP, TRANSITIONS, Tooltip, X_AXIS, Y_AXIS,
    ZOOM, Zoom,
};
use line_chart_rs::core::{
    AxisFlags, ChartData, ChartOptions, Coordinates, Domain, ElementDimensions, PartialDomains,
    PointerEvent, SeriesOptions, row,
};
use line_chart_rs::interaction::GestureKind;
use line_chart_rs::sync::{
    BroadcastChannel, ChannelListener, Envelope, LocalBroadcastChannel, ScopeId, SubscriptionId,
    SyncConfig, SyncLayer, SyncMessage,
};
use line_chart_rs::{ChartError, Factory};

fn sample_data() -> ChartData {
    ChartData::new().with_dataset(
        "d",
        (0..=10)
            .map(|i| {
                let x = f64::from(i);
                row([("x", x), ("v", 2.0 * x)])
            })
            .collect(),
    )
}

fn sample_options(pan: AxisFlags) -> ChartOptions {
    ChartOptions::default()
        .with_series(SeriesOptions::new("s1", "d", "v"))
        .with_pan(pan)
        .with_zoom(AxisFlags::both())
}

/// Chart with x in [0, 10] over 100 px and y in [0, 20] over 100 px.
fn build_chart(channel: &Rc<LocalBroadcastChannel>, sync: SyncConfig, pan: AxisFlags) -> LineChart {
    let shared: Rc<dyn BroadcastChannel> = channel.clone();
    let chart = LineChart::new(
        ScopeId::next(),
        shared,
        LineChartConfig::default().with_sync(sync),
        Some(sample_options(pan)),
        sample_data(),
    )
    .expect("chart init");
    let now = Instant::now();
    chart
        .notify_resize(now, ElementDimensions::new(140.0, 140.0))
        .expect("schedule resize");
    assert!(chart.poll_resize(now + RESIZE_DEBOUNCE_INTERVAL).expect("poll resize"));
    chart
}

fn domains_of(chart: &LineChart) -> (Domain, Domain) {
    let x = chart.component::<Axis>(X_AXIS).expect("x axis").scale_domain();
    let y = chart.component::<Axis>(Y_AXIS).expect("y axis").scale_domain();
    (x, y)
}

/// Records every domain broadcast seen on `key`.
fn record_domain_messages(
    channel: &Rc<LocalBroadcastChannel>,
    key: &str,
) -> Rc<RefCell<Vec<(ScopeId, GestureKind, PartialDomains)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    channel.subscribe(
        key,
        Rc::new(move |envelope: &Envelope| {
            if let SyncMessage::Domains { domains, gesture } = envelope.message {
                sink.borrow_mut().push((envelope.origin, gesture, domains));
            }
            Ok(())
        }),
    );
    seen
}

fn host_recorder() -> (Rc<RefCell<Vec<PartialDomains>>>, SyncConfig) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let config = SyncConfig::new()
        .with_domains_sync_key("domains")
        .with_on_domains_change(move |domains| sink.borrow_mut().push(*domains));
    (calls, config)
}

#[test]
fn equal_sync_keys_fail_chart_construction() {
    let channel: Rc<dyn BroadcastChannel> = Rc::new(LocalBroadcastChannel::new());
    let sync = SyncConfig::new()
        .with_tooltip_sync_key("same")
        .with_domains_sync_key("same");
    let err = LineChart::new(
        ScopeId::next(),
        channel,
        LineChartConfig::default().with_sync(sync),
        Some(ChartOptions::default()),
        ChartData::new(),
    )
    .expect_err("keys must differ");
    assert!(matches!(err, ChartError::SyncKeyConflict(key) if key == "same"));
}

#[test]
fn pan_moves_are_broadcast_but_only_pan_end_reaches_the_host() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let (host_calls, config) = host_recorder();
    let chart = build_chart(&channel, config, AxisFlags::both());
    let peer = build_chart(
        &channel,
        SyncConfig::new().with_domains_sync_key("domains"),
        AxisFlags::both(),
    );
    let peer_tooltip = peer.component::<Tooltip>(TOOLTIP).expect("peer tooltip");
    let seen = record_domain_messages(&channel, "domains");

    let pan = chart.component::<Pan>(PAN).expect("pan");
    pan.start().expect("start");
    pan.pan_by(10.0, 0.0).expect("pan");
    assert!(host_calls.borrow().is_empty());
    assert!(!peer_tooltip.base().is_on());
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].1, GestureKind::Pan);

    pan.end().expect("end");
    let calls = host_calls.borrow();
    assert_eq!(calls.len(), 1);
    let x = calls[0].x.expect("x is pannable");
    assert_abs_diff_eq!(x.min, -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(x.max, 9.0, epsilon = 1e-9);
    assert_eq!(calls[0].y, Some(Domain::new(0.0, 20.0)));
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[1].1, GestureKind::PanEnd);
    assert!(peer_tooltip.base().is_on());
    assert_eq!(domains_of(&peer), domains_of(&chart));
}

#[test]
fn disabled_pan_axes_are_dropped_from_outgoing_domains() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let (host_calls, config) = host_recorder();
    let chart = build_chart(&channel, config, AxisFlags::x_only());

    let pan = chart.component::<Pan>(PAN).expect("pan");
    pan.start().expect("start");
    pan.pan_by(10.0, 10.0).expect("pan");
    pan.end().expect("end");

    let calls = host_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].x.is_some());
    assert_eq!(calls[0].y, None);
}

#[test]
fn zoom_gesture_notifies_host_once_and_broadcasts_twice() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let (host_calls, config) = host_recorder();
    let chart = build_chart(&channel, config, AxisFlags::both());
    let seen = record_domain_messages(&channel, "domains");
    let tooltip = chart.component::<Tooltip>(TOOLTIP).expect("tooltip");
    let zoom = chart.component::<Zoom>(ZOOM).expect("zoom");

    zoom.zoom_by(2.0, PointerEvent::new(50.0, 50.0)).expect("zoom");
    assert!(!tooltip.base().is_on());
    assert!(host_calls.borrow().is_empty());

    zoom.end().expect("zoom end");
    assert!(tooltip.base().is_on());
    assert_eq!(host_calls.borrow().len(), 1);
    let gestures: Vec<GestureKind> = seen.borrow().iter().map(|(_, gesture, _)| *gesture).collect();
    assert_eq!(gestures, vec![GestureKind::Zoom, GestureKind::ZoomEnd]);

    let (x, y) = domains_of(&chart);
    assert_abs_diff_eq!(x.min, 2.5, epsilon = 1e-9);
    assert_abs_diff_eq!(x.max, 7.5, epsilon = 1e-9);
    assert_abs_diff_eq!(y.min, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(y.max, 15.0, epsilon = 1e-9);
}

#[test]
fn own_scope_domain_message_is_a_no_op() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let chart = build_chart(
        &channel,
        SyncConfig::new().with_domains_sync_key("domains"),
        AxisFlags::both(),
    );
    let before = domains_of(&chart);

    channel.publish(&Envelope::new(
        "domains",
        chart.scope(),
        SyncMessage::Domains {
            domains: PartialDomains {
                x: Some(Domain::new(100.0, 200.0)),
                y: None,
            },
            gesture: GestureKind::PanEnd,
        },
    ));
    assert_eq!(domains_of(&chart), before);
}

#[test]
fn x_only_inbound_domains_keep_local_y() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let chart = build_chart(
        &channel,
        SyncConfig::new().with_domains_sync_key("domains"),
        AxisFlags::both(),
    );

    channel.publish(&Envelope::new(
        "domains",
        ScopeId::next(),
        SyncMessage::Domains {
            domains: PartialDomains {
                x: Some(Domain::new(2.0, 4.0)),
                y: None,
            },
            gesture: GestureKind::PanEnd,
        },
    ));

    let (x, y) = domains_of(&chart);
    assert_eq!(x, Domain::new(2.0, 4.0));
    assert_eq!(y, Domain::new(0.0, 20.0));
    let grid = chart.component::<Grid>("grid").expect("grid");
    assert_eq!(grid.domains().map(|domains| domains.x), Some(Domain::new(2.0, 4.0)));

    let factories = chart.factories();
    assert!(factories.get(TOOLTIP).expect("tooltip").base().is_on());
    assert!(factories.get(TRANSITIONS).expect("transitions").base().is_on());
}

#[test]
fn inbound_pan_suspends_tooltip_and_transitions_until_pan_end() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let chart = build_chart(
        &channel,
        SyncConfig::new().with_domains_sync_key("domains"),
        AxisFlags::both(),
    );
    let peer = ScopeId::next();
    let message = |gesture| {
        Envelope::new(
            "domains",
            peer,
            SyncMessage::Domains {
                domains: PartialDomains {
                    x: Some(Domain::new(1.0, 11.0)),
                    y: None,
                },
                gesture,
            },
        )
    };
    let factories = chart.factories();

    channel.publish(&message(GestureKind::Pan));
    assert!(!factories.get(TOOLTIP).expect("tooltip").base().is_on());
    assert!(!factories.get(TRANSITIONS).expect("transitions").base().is_on());
    assert_eq!(domains_of(&chart).0, Domain::new(1.0, 11.0));

    channel.publish(&message(GestureKind::PanEnd));
    assert!(factories.get(TOOLTIP).expect("tooltip").base().is_on());
    assert!(factories.get(TRANSITIONS).expect("transitions").base().is_on());
}

#[test]
fn local_reset_broadcasts_and_remote_reset_does_not_echo() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let (host_calls, config) = host_recorder();
    let chart_a = build_chart(&channel, config, AxisFlags::both());
    let chart_b = build_chart(
        &channel,
        SyncConfig::new().with_domains_sync_key("domains"),
        AxisFlags::both(),
    );
    let seen = record_domain_messages(&channel, "domains");

    for chart in [&chart_a, &chart_b] {
        let pan = chart.component::<Pan>(PAN).expect("pan");
        pan.start().expect("start");
        pan.pan_by(20.0, 0.0).expect("pan");
        pan.end().expect("end");
    }
    seen.borrow_mut().clear();
    host_calls.borrow_mut().clear();
    assert_ne!(domains_of(&chart_b).0, Domain::new(0.0, 10.0));

    chart_a
        .component::<Zoom>(ZOOM)
        .expect("zoom")
        .reset()
        .expect("reset");

    assert_eq!(domains_of(&chart_a).0, Domain::new(0.0, 10.0));
    assert_eq!(domains_of(&chart_b).0, Domain::new(0.0, 10.0));
    let origins: Vec<ScopeId> = seen.borrow().iter().map(|(origin, _, _)| *origin).collect();
    assert_eq!(origins, vec![chart_a.scope()]);
    assert_eq!(seen.borrow()[0].1, GestureKind::ZoomPanReset);
    assert_eq!(host_calls.borrow().len(), 1);
}

#[test]
fn hover_is_mirrored_on_peer_charts() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let sync = || SyncConfig::new().with_tooltip_sync_key("hover");
    let chart_a = build_chart(&channel, sync(), AxisFlags::both());
    let chart_b = build_chart(&channel, sync(), AxisFlags::both());
    let tooltip_b = chart_b.component::<Tooltip>(TOOLTIP).expect("tooltip");

    chart_a
        .component::<Container>("container")
        .expect("container")
        .pointer_move(PointerEvent::new(90.0, 50.0))
        .expect("move");
    let position = tooltip_b.position().expect("peer hover");
    assert_abs_diff_eq!(position.x.expect("x"), 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(position.y.expect("y"), 10.0, epsilon = 1e-9);

    chart_a
        .component::<Container>("container")
        .expect("container")
        .pointer_leave()
        .expect("leave");
    assert_eq!(tooltip_b.position(), None);
    assert!(!tooltip_b.is_visible());
}

#[test]
fn suspended_tooltip_ignores_peer_hover() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let chart = build_chart(
        &channel,
        SyncConfig::new().with_tooltip_sync_key("hover"),
        AxisFlags::both(),
    );
    chart.factories().turn_factories_off(&[TOOLTIP]).expect("off");

    channel.publish(&Envelope::new(
        "hover",
        ScopeId::next(),
        SyncMessage::Tooltip {
            coordinates: Coordinates::new(1.0, 2.0),
        },
    ));
    let tooltip = chart.component::<Tooltip>(TOOLTIP).expect("tooltip");
    assert_eq!(tooltip.position(), None);
}

#[test]
fn destroy_unsubscribes_every_channel_listener() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let sync = SyncConfig::new()
        .with_tooltip_sync_key("hover")
        .with_domains_sync_key("domains");
    let chart = build_chart(&channel, sync, AxisFlags::both());
    let layer = chart.component::<SyncLayer>(SYNC_LAYER).expect("sync layer");
    assert_eq!(channel.subscriber_count("hover"), 1);
    assert_eq!(channel.subscriber_count("domains"), 1);
    assert_eq!(layer.subscription_count(), 2);

    chart.destroy().expect("destroy");
    assert_eq!(channel.total_subscribers(), 0);
    assert_eq!(layer.subscription_count(), 0);

    let reached = channel.publish(&Envelope::new(
        "hover",
        ScopeId::next(),
        SyncMessage::Tooltip {
            coordinates: Coordinates::new(1.0, 1.0),
        },
    ));
    assert_eq!(reached, 0);
    let tooltip = chart.component::<Tooltip>(TOOLTIP).expect("tooltip");
    assert_eq!(tooltip.position(), None);
}

#[test]
fn dropping_charts_without_destroy_releases_channel_subscriptions() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let sync = SyncConfig::new()
        .with_tooltip_sync_key("hover")
        .with_domains_sync_key("domains");
    let charts: Vec<LineChart> = (0..8)
        .map(|_| build_chart(&channel, sync.clone(), AxisFlags::both()))
        .collect();
    assert_eq!(channel.total_subscribers(), 16);

    drop(charts);
    assert_eq!(channel.total_subscribers(), 0);

    let chart = build_chart(&channel, sync, AxisFlags::both());
    chart.destroy().expect("destroy");
    drop(chart);
    assert_eq!(channel.total_subscribers(), 0);
}

/// Channel that logs subscriptions and removals in call order.
#[derive(Default)]
struct RecordingChannel {
    inner: LocalBroadcastChannel,
    subscribed: RefCell<Vec<(String, SubscriptionId)>>,
    unsubscribed: RefCell<Vec<SubscriptionId>>,
}

impl RecordingChannel {
    fn id_for(&self, key: &str) -> SubscriptionId {
        self.subscribed
            .borrow()
            .iter()
            .find(|(subscribed_key, _)| subscribed_key == key)
            .map(|(_, id)| *id)
            .expect("key subscribed")
    }
}

impl BroadcastChannel for RecordingChannel {
    fn subscribe(&self, key: &str, listener: ChannelListener) -> SubscriptionId {
        let id = self.inner.subscribe(key, listener);
        self.subscribed.borrow_mut().push((key.to_owned(), id));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.unsubscribed.borrow_mut().push(id);
        self.inner.unsubscribe(id)
    }

    fn publish(&self, envelope: &Envelope) -> usize {
        self.inner.publish(envelope)
    }
}

#[test]
fn destroy_unsubscribes_newest_subscription_first() {
    let channel = Rc::new(RecordingChannel::default());
    let shared: Rc<dyn BroadcastChannel> = channel.clone();
    let sync = SyncConfig::new()
        .with_tooltip_sync_key("hover")
        .with_domains_sync_key("domains");
    let chart = LineChart::new(
        ScopeId::next(),
        shared,
        LineChartConfig::default().with_sync(sync),
        Some(sample_options(AxisFlags::both())),
        sample_data(),
    )
    .expect("chart init");

    let tooltip_id = channel.id_for("hover");
    let domains_id = channel.id_for("domains");
    assert!(channel.unsubscribed.borrow().is_empty());

    chart.destroy().expect("destroy");
    assert_eq!(*channel.unsubscribed.borrow(), vec![domains_id, tooltip_id]);
    assert_eq!(channel.inner.total_subscribers(), 0);
}

#[test]
fn without_keys_or_callback_nothing_is_wired() {
    let channel = Rc::new(LocalBroadcastChannel::new());
    let chart = build_chart(&channel, SyncConfig::default(), AxisFlags::both());
    let layer = chart.component::<SyncLayer>(SYNC_LAYER).expect("sync layer");
    assert_eq!(layer.outbound_action_count(), 0);
    assert_eq!(channel.total_subscribers(), 0);

    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    channel.subscribe("domains", Rc::new(move |_: &Envelope| {
        flag.set(true);
        Ok(())
    }));
    let pan = chart.component::<Pan>(PAN).expect("pan");
    pan.start().expect("start");
    pan.pan_by(5.0, 5.0).expect("pan");
    pan.end().expect("end");
    assert!(!fired.get());
}
