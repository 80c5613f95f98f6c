//! line-chart-rs: event-driven line chart core with cross-chart synchronization.
//!
//! A chart is a set of components linked through a per-instance event bus.
//! Charts sharing a broadcast channel can mirror hover position and viewport
//! domains.

pub mod api;
pub mod components;
pub mod core;
pub mod error;
pub mod events;
pub mod factory;
pub mod interaction;
pub mod sync;
pub mod telemetry;

pub use api::{LineChart, LineChartConfig};
pub use error::{ChartError, ChartResult};
pub use events::{ChartEvent, EventKind, EventManager};
pub use factory::{Factory, FactoryManager};
pub use sync::{LocalBroadcastChannel, ScopeId, SyncConfig};
