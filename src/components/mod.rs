//! Visual and behavioral chart components.
//!
//! They hold the state their event contracts need; drawing is left to the
//! host renderer.

mod axis;
mod container;
mod gesture;
mod grid;
mod legend;
mod series;
mod tooltip;
mod transitions;

pub use axis::Axis;
pub use container::Container;
pub use gesture::{Pan, Zoom};
pub use grid::Grid;
pub use legend::{Legend, LegendEntry};
pub use series::SeriesLayer;
pub use tooltip::Tooltip;
pub use transitions::{DEFAULT_TRANSITION_DURATION, Transitions};

pub const CONTAINER: &str = "container";
pub const TOOLTIP: &str = "tooltip";
pub const LEGEND: &str = "legend";
pub const TRANSITIONS: &str = "transitions";
pub const X_AXIS: &str = "x-axis";
pub const X2_AXIS: &str = "x2-axis";
pub const Y_AXIS: &str = "y-axis";
pub const Y2_AXIS: &str = "y2-axis";
pub const GRID: &str = "grid";
pub const PAN: &str = "pan";
pub const ZOOM: &str = "zoom";
pub const SYNC_LAYER: &str = "sync-layer";
pub const SERIES_AREA: &str = "series-area";
pub const SERIES_COLUMN: &str = "series-column";
pub const SERIES_LINE: &str = "series-line";
pub const SERIES_DOT: &str = "series-dot";

/// Registration order of a default chart.
///
/// Everything that affects the tooltip is registered before the series
/// layers; listener order follows registration order.
pub const DEFAULT_FACTORY_KEYS: [&str; 16] = [
    CONTAINER,
    TOOLTIP,
    LEGEND,
    TRANSITIONS,
    X_AXIS,
    X2_AXIS,
    Y_AXIS,
    Y2_AXIS,
    GRID,
    PAN,
    ZOOM,
    SYNC_LAYER,
    SERIES_AREA,
    SERIES_COLUMN,
    SERIES_LINE,
    SERIES_DOT,
];
