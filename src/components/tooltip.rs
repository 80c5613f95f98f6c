use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use crate::core::Coordinates;
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, EventKind};
use crate::factory::{Factory, FactoryBase, FactoryContext, subscribe};

use super::{CONTAINER, Container};

/// Hover state of the chart, fed by local pointer moves and peer charts.
///
/// While turned off, incoming hovers are ignored but the last position is
/// kept, so turning back on resumes where it was.
pub struct Tooltip {
    base: FactoryBase,
    position: Cell<Option<Coordinates>>,
    container: OnceCell<Rc<Container>>,
}

impl Tooltip {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            position: Cell::new(None),
            container: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<Coordinates> {
        self.position.get()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.base.is_on() && self.position.get().is_some()
    }

    fn show(&self, coordinates: Coordinates) {
        if coordinates.is_none() {
            self.position.set(None);
        } else {
            self.position.set(Some(coordinates));
        }
    }

    fn on_container_move(&self, event: &ChartEvent) -> ChartResult<()> {
        let ChartEvent::ContainerMove(pointer) = event else {
            return Ok(());
        };
        if !self.base.is_on() {
            return Ok(());
        }
        let container = self.container.get().ok_or(ChartError::NotInitialized)?;
        self.show(container.coordinates_from_event(pointer)?);
        Ok(())
    }

    fn on_outer_world_hover(&self, event: &ChartEvent) -> ChartResult<()> {
        if let ChartEvent::OuterWorldHover { coordinates, .. } = event {
            if self.base.is_on() {
                self.show(*coordinates);
            }
        }
        Ok(())
    }
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Tooltip {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self
            .container
            .set(context.factories.get_as::<Container>(CONTAINER)?);
        subscribe(&self, EventKind::ContainerMove, Self::on_container_move)?;
        subscribe(&self, EventKind::ContainerOut, |tooltip, _| {
            tooltip.position.set(None);
            Ok(())
        })?;
        subscribe(&self, EventKind::OuterWorldHover, Self::on_outer_world_hover)?;
        Ok(())
    }
}
