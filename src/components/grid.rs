use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use crate::core::{AxisFlags, Domains, Snapshot};
use crate::error::ChartResult;
use crate::events::{ChartEvent, EventKind};
use crate::factory::{Factory, FactoryBase, FactoryContext, subscribe};

use super::{Axis, X_AXIS, Y_AXIS};

/// Grid state: which grid lines are shown and the domains they follow.
pub struct Grid {
    base: FactoryBase,
    flags: Cell<AxisFlags>,
    domains: Cell<Option<Domains>>,
    axes: OnceCell<(Rc<Axis>, Rc<Axis>)>,
}

impl Grid {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            flags: Cell::new(AxisFlags::both()),
            domains: Cell::new(None),
            axes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn flags(&self) -> AxisFlags {
        self.flags.get()
    }

    #[must_use]
    pub fn domains(&self) -> Option<Domains> {
        self.domains.get()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Grid {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self.axes.set((
            context.factories.get_as::<Axis>(X_AXIS)?,
            context.factories.get_as::<Axis>(Y_AXIS)?,
        ));
        subscribe(&self, EventKind::OuterWorldDomainChange, |grid, event| {
            if let ChartEvent::OuterWorldDomainChange(domains) = event {
                grid.domains.set(Some(*domains));
            }
            Ok(())
        })?;
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        if !self.base.is_on() {
            return Ok(());
        }
        self.flags.set(snapshot.options.grid);
        // Axes are registered earlier, so their update already ran.
        if let Some((x_axis, y_axis)) = self.axes.get() {
            self.domains.set(Some(Domains {
                x: x_axis.scale_domain(),
                y: y_axis.scale_domain(),
            }));
        }
        Ok(())
    }
}
