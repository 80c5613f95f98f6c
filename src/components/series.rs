use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use crate::core::{SeriesKind, Snapshot};
use crate::error::ChartResult;
use crate::factory::{Factory, FactoryBase, FactoryContext};

use super::{TRANSITIONS, Transitions};

/// Draw bookkeeping for every visible series of one kind.
pub struct SeriesLayer {
    base: FactoryBase,
    kind: SeriesKind,
    drawn: RefCell<Vec<String>>,
    animated: Cell<bool>,
    draw_count: Cell<usize>,
    transitions: OnceCell<Rc<Transitions>>,
}

impl SeriesLayer {
    #[must_use]
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            base: FactoryBase::new(),
            kind,
            drawn: RefCell::new(Vec::new()),
            animated: Cell::new(false),
            draw_count: Cell::new(0),
            transitions: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    /// Series ids drawn at the last update.
    #[must_use]
    pub fn drawn_series(&self) -> Vec<String> {
        self.drawn.borrow().clone()
    }

    #[must_use]
    pub fn last_draw_animated(&self) -> bool {
        self.animated.get()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draw_count.get()
    }
}

impl Factory for SeriesLayer {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self
            .transitions
            .set(context.factories.get_as::<Transitions>(TRANSITIONS)?);
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        if !self.base.is_on() {
            return Ok(());
        }
        *self.drawn.borrow_mut() = snapshot
            .options
            .visible_series()
            .filter(|series| series.kind == self.kind)
            .map(|series| series.id.clone())
            .collect();
        self.animated.set(
            self.transitions
                .get()
                .is_some_and(|transitions| transitions.is_animated()),
        );
        self.draw_count.set(self.draw_count.get() + 1);
        Ok(())
    }
}
