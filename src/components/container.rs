use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use crate::core::{Coordinates, ElementDimensions, Margin, PointerEvent, Snapshot};
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, DispatchReport, EventKind};
use crate::factory::{Factory, FactoryBase, FactoryContext, subscribe};

use super::{Axis, X_AXIS, Y_AXIS};

/// Root element of the chart: owns measured dimensions and pointer input.
pub struct Container {
    base: FactoryBase,
    dimensions: Cell<ElementDimensions>,
    margin: Cell<Margin>,
    axes: OnceCell<(Rc<Axis>, Rc<Axis>)>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            dimensions: Cell::new(ElementDimensions::default()),
            margin: Cell::new(Margin::default()),
            axes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> ElementDimensions {
        self.dimensions.get()
    }

    /// Data coordinate under a pointer given in element pixels.
    pub fn coordinates_from_event(&self, event: &PointerEvent) -> ChartResult<Coordinates> {
        let (x_axis, y_axis) = self.axes.get().ok_or(ChartError::NotInitialized)?;
        let margin = self.margin.get();
        Ok(Coordinates::new(
            x_axis.scale().invert(event.x - margin.left),
            y_axis.scale().invert(event.y - margin.top),
        ))
    }

    pub fn pointer_move(&self, event: PointerEvent) -> ChartResult<DispatchReport> {
        self.base.trigger(ChartEvent::ContainerMove(event))
    }

    pub fn pointer_leave(&self) -> ChartResult<DispatchReport> {
        self.base.trigger(ChartEvent::ContainerOut)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Container {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let axes = (
            context.factories.get_as::<Axis>(X_AXIS)?,
            context.factories.get_as::<Axis>(Y_AXIS)?,
        );
        let _ = self.axes.set(axes);
        subscribe(&self, EventKind::Resize, |container, event| {
            if let ChartEvent::Resize(dimensions) = event {
                container.dimensions.set(*dimensions);
            }
            Ok(())
        })?;
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        self.margin.set(snapshot.options.margin);
        Ok(())
    }
}
