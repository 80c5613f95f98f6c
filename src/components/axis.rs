use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use crate::core::{
    AxisSide, ChartOptions, Domain, ElementDimensions, LinearScale, Margin, Snapshot,
};
use crate::error::ChartResult;
use crate::events::{ChartEvent, EventKind};
use crate::factory::{Factory, FactoryBase, FactoryContext, subscribe};

const DEFAULT_X_KEY: &str = "x";

/// Axis state holder: owns the scale whose domain is the visible viewport.
///
/// Tick and label rendering live outside this crate.
pub struct Axis {
    base: FactoryBase,
    side: AxisSide,
    scale: Cell<LinearScale>,
    data_domain: Cell<Option<Domain>>,
    margin: Cell<Margin>,
    dimensions: Cell<Option<ElementDimensions>>,
}

impl Axis {
    pub fn new(side: AxisSide) -> ChartResult<Self> {
        Ok(Self {
            base: FactoryBase::new(),
            side,
            scale: Cell::new(LinearScale::new(0.0, 1.0)?),
            data_domain: Cell::new(None),
            margin: Cell::new(Margin::default()),
            dimensions: Cell::new(None),
        })
    }

    #[must_use]
    pub fn side(&self) -> AxisSide {
        self.side
    }

    #[must_use]
    pub fn scale(&self) -> LinearScale {
        self.scale.get()
    }

    #[must_use]
    pub fn scale_domain(&self) -> Domain {
        self.scale.get().domain()
    }

    /// Domain derived from data and option bounds at the last update.
    #[must_use]
    pub fn data_domain(&self) -> Option<Domain> {
        self.data_domain.get()
    }

    pub fn set_domain(&self, domain: Domain) -> ChartResult<()> {
        let mut scale = self.scale.get();
        scale.set_domain(domain)?;
        self.scale.set(scale);
        trace!(side = ?self.side, min = domain.min, max = domain.max, "axis domain set");
        Ok(())
    }

    /// Restores the domain computed from data, undoing pan and zoom.
    pub fn reset_domain(&self) -> ChartResult<()> {
        match self.data_domain.get() {
            Some(domain) => self.set_domain(domain),
            None => Ok(()),
        }
    }

    /// Drags the viewport by `pixels` along this axis.
    pub fn shift_by_pixels(&self, pixels: f64) -> ChartResult<()> {
        let scale = self.scale.get();
        let delta = scale.pixels_to_span(pixels);
        self.set_domain(scale.domain().shifted(-delta))
    }

    /// Zooms around the data value under `pixel`.
    pub fn zoom_around_pixel(&self, factor: f64, pixel: f64) -> ChartResult<()> {
        let scale = self.scale.get();
        let anchor = scale.invert(pixel);
        self.set_domain(scale.domain().zoomed_around(factor, anchor))
    }

    fn extent_for(&self, snapshot: &Snapshot) -> Option<Domain> {
        let options = &snapshot.options;
        let axis_options = options.axes.side(self.side)?;
        let extent = if self.side.is_horizontal() {
            let key = axis_options.key.as_deref().unwrap_or(DEFAULT_X_KEY);
            snapshot
                .data
                .extent(options.visible_series().map(|series| (series.dataset.as_str(), key)))
        } else {
            snapshot.data.extent(
                options
                    .visible_series()
                    .filter(|series| series.axis == self.side)
                    .map(|series| (series.dataset.as_str(), series.key.as_str())),
            )
        };
        let extent = extent.unwrap_or(Domain::new(0.0, 1.0));
        let min = axis_options.min.unwrap_or(extent.min);
        let max = axis_options.max.unwrap_or(extent.max);
        Some(Domain::new(min, max).widened_if_flat())
    }

    fn apply_range(&self) {
        let Some(dimensions) = self.dimensions.get() else {
            return;
        };
        let margin = self.margin.get();
        let mut scale = self.scale.get();
        if self.side.is_horizontal() {
            let width = (dimensions.width - margin.left - margin.right).max(0.0);
            scale.set_range(0.0, width);
        } else {
            let height = (dimensions.height - margin.top - margin.bottom).max(0.0);
            scale.set_range(height, 0.0);
        }
        self.scale.set(scale);
    }

    fn follow_outer_domains(&self, event: &ChartEvent) -> ChartResult<()> {
        let ChartEvent::OuterWorldDomainChange(domains) = event else {
            return Ok(());
        };
        match self.side {
            AxisSide::X => self.set_domain(domains.x),
            AxisSide::Y => self.set_domain(domains.y),
            AxisSide::X2 | AxisSide::Y2 => Ok(()),
        }
    }
}

impl Factory for Axis {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, _context: &FactoryContext<'_>) -> ChartResult<()> {
        subscribe(&self, EventKind::Resize, |axis, event| {
            if let ChartEvent::Resize(dimensions) = event {
                axis.dimensions.set(Some(*dimensions));
                axis.apply_range();
            }
            Ok(())
        })?;
        subscribe(&self, EventKind::OuterWorldDomainChange, Self::follow_outer_domains)?;
        subscribe(&self, EventKind::ZoomPanReset, |axis, _| axis.reset_domain())?;
        Ok(())
    }

    fn create(self: Rc<Self>, options: &ChartOptions) -> ChartResult<()> {
        self.margin.set(options.margin);
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        if !self.base.is_on() {
            return Ok(());
        }
        self.margin.set(snapshot.options.margin);
        self.apply_range();
        if let Some(domain) = self.extent_for(snapshot) {
            self.data_domain.set(Some(domain));
            self.set_domain(domain)?;
        }
        Ok(())
    }
}
