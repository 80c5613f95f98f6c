//! Host-facing chart driver.

mod debounce;
mod line_chart;

pub use debounce::{Debouncer, RESIZE_DEBOUNCE_INTERVAL};
pub use line_chart::{DIRECTIVE_NAMESPACE, LineChart, LineChartConfig, default_factory_specs};
