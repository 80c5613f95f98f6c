use std::cell::RefCell;
use std::rc::Rc;

use line_chart_rs::events::{ChartEvent, EventKind, EventManager, EventName};
use proptest::prelude::*;

proptest! {
    #[test]
    fn listeners_run_in_registration_order(
        listener_count in 1usize..24,
        removed in proptest::collection::vec(any::<bool>(), 24)
    ) {
        let events = EventManager::with_default_events();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut ids = Vec::with_capacity(listener_count);
        for index in 0..listener_count {
            let sink = Rc::clone(&order);
            let name = EventName::namespaced(EventKind::Update, format!("listener-{index}"));
            let id = events
                .on(name, move |_| {
                    sink.borrow_mut().push(index);
                    Ok(())
                })
                .expect("subscribe");
            ids.push(id);
        }
        let mut expected = Vec::new();
        for (index, id) in ids.iter().enumerate() {
            if removed[index] {
                prop_assert!(events.off(*id));
            } else {
                expected.push(index);
            }
        }

        let report = events.trigger(ChartEvent::Destroy).expect("declared");
        prop_assert_eq!(report.delivered, 0);
        prop_assert!(order.borrow().is_empty());

        let snapshot = line_chart_rs::core::Snapshot::new(
            &line_chart_rs::core::ChartData::new(),
            &line_chart_rs::core::ChartOptions::default(),
        );
        let report = events.trigger(ChartEvent::Update(snapshot)).expect("declared");
        prop_assert_eq!(report.delivered, expected.len());
        prop_assert_eq!(&*order.borrow(), &expected);
    }

    #[test]
    fn origin_namespace_is_always_skipped(
        listener_count in 1usize..16,
        origin_index in 0usize..16
    ) {
        let events = EventManager::with_default_events();
        let origin_index = origin_index % listener_count;
        let hits = Rc::new(RefCell::new(Vec::new()));

        for index in 0..listener_count {
            let sink = Rc::clone(&hits);
            events
                .on(
                    EventName::namespaced(EventKind::ZoomEnd, format!("c{index}")),
                    move |_| {
                        sink.borrow_mut().push(index);
                        Ok(())
                    },
                )
                .expect("subscribe");
        }

        let origin = format!("c{origin_index}");
        let report = events.trigger_from(&origin, ChartEvent::ZoomEnd).expect("declared");
        prop_assert_eq!(report.skipped_same_origin, 1);
        prop_assert!(!hits.borrow().contains(&origin_index));
        prop_assert_eq!(hits.borrow().len(), listener_count - 1);
    }
}
