//! Typed publish/subscribe bus shared by the components of one chart.
//!
//! Components never call each other for cross-component effects; they
//! subscribe to and trigger [`ChartEvent`]s on the chart's [`EventManager`].

mod event;
mod manager;

pub use event::{ChartEvent, EventKind, EventName, LegendToggle};
pub use manager::{
    DispatchReport, EventManager, Listener, ListenerFailure, ListenerId, WeakEventManager,
};
