pub mod data;
pub mod options;
pub mod scale;
pub mod types;

pub use data::{ChartData, Row, Snapshot, row};
pub use options::{
    AxesOptions, AxisFlags, AxisOptions, AxisSide, ChartOptions, Margin, SeriesKind,
    SeriesOptions,
};
pub use scale::LinearScale;
pub use types::{Coordinates, Domain, Domains, ElementDimensions, PartialDomains, PointerEvent};
