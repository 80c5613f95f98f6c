use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use tracing::debug;

use crate::core::{AxisFlags, PartialDomains, PointerEvent, Snapshot};
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, DispatchReport};
use crate::factory::{Factory, FactoryBase, FactoryContext};
use crate::interaction::{GestureState, InteractionMode};

use super::{Axis, TOOLTIP, TRANSITIONS, X_AXIS, Y_AXIS};

fn resolve_axes(context: &FactoryContext<'_>) -> ChartResult<(Rc<Axis>, Rc<Axis>)> {
    Ok((
        context.factories.get_as::<Axis>(X_AXIS)?,
        context.factories.get_as::<Axis>(Y_AXIS)?,
    ))
}

/// Drops the axes a gesture is not allowed to move.
fn constrain(flags: AxisFlags, domains: &mut PartialDomains) {
    if !flags.x {
        domains.x = None;
    }
    if !flags.y {
        domains.y = None;
    }
}

/// Drag-to-pan gesture. Transitions and tooltip are off while a pan is active.
pub struct Pan {
    base: FactoryBase,
    flags: Cell<AxisFlags>,
    state: Cell<GestureState>,
    axes: OnceCell<(Rc<Axis>, Rc<Axis>)>,
}

impl Pan {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            flags: Cell::new(AxisFlags::none()),
            state: Cell::new(GestureState::default()),
            axes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn flags(&self) -> AxisFlags {
        self.flags.get()
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.state.get().mode()
    }

    pub fn constrain_outgoing_domains(&self, domains: &mut PartialDomains) {
        constrain(self.flags.get(), domains);
    }

    pub fn start(&self) -> ChartResult<()> {
        let mut state = self.state.get();
        state.on_pan_start();
        self.state.set(state);
        self.base
            .factories()?
            .turn_factories_off(&[TRANSITIONS, TOOLTIP])
    }

    /// Moves the enabled axes by a pointer delta and emits `pan`.
    pub fn pan_by(&self, dx: f64, dy: f64) -> ChartResult<DispatchReport> {
        if self.mode() != InteractionMode::Panning {
            return Err(ChartError::InvalidData(
                "pan_by requires an active pan".to_owned(),
            ));
        }
        let (x_axis, y_axis) = self.axes.get().ok_or(ChartError::NotInitialized)?;
        let flags = self.flags.get();
        if flags.x {
            x_axis.shift_by_pixels(dx)?;
        }
        if flags.y {
            y_axis.shift_by_pixels(dy)?;
        }
        let mut state = self.state.get();
        state.on_move();
        self.state.set(state);
        self.base.trigger(ChartEvent::Pan)
    }

    /// Ends the pan and emits `pan-end`; a no-op when no pan is active.
    pub fn end(&self) -> ChartResult<DispatchReport> {
        let mut state = self.state.get();
        let previous = state.on_end();
        self.state.set(state);
        if previous != InteractionMode::Panning {
            return Ok(DispatchReport::default());
        }
        self.base
            .factories()?
            .turn_factories_on(&[TRANSITIONS, TOOLTIP])?;
        self.base.trigger(ChartEvent::PanEnd)
    }
}

impl Default for Pan {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Pan {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self.axes.set(resolve_axes(context)?);
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        self.flags.set(snapshot.options.pan);
        Ok(())
    }
}

/// Wheel/pinch zoom gesture. The tooltip is off between steps and end.
pub struct Zoom {
    base: FactoryBase,
    flags: Cell<AxisFlags>,
    state: Cell<GestureState>,
    axes: OnceCell<(Rc<Axis>, Rc<Axis>)>,
}

impl Zoom {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            flags: Cell::new(AxisFlags::none()),
            state: Cell::new(GestureState::default()),
            axes: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn flags(&self) -> AxisFlags {
        self.flags.get()
    }

    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.state.get().mode()
    }

    pub fn constrain_outgoing_domains(&self, domains: &mut PartialDomains) {
        constrain(self.flags.get(), domains);
    }

    /// Zooms the enabled axes around `anchor` (plot-area pixels) and emits `zoom`.
    ///
    /// A factor above one zooms in.
    pub fn zoom_by(&self, factor: f64, anchor: PointerEvent) -> ChartResult<DispatchReport> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        let (x_axis, y_axis) = self.axes.get().ok_or(ChartError::NotInitialized)?;
        if self.mode() != InteractionMode::Zooming {
            self.base.factories()?.turn_factories_off(&[TOOLTIP])?;
        }
        let flags = self.flags.get();
        if flags.x {
            x_axis.zoom_around_pixel(factor, anchor.x)?;
        }
        if flags.y {
            y_axis.zoom_around_pixel(factor, anchor.y)?;
        }
        let mut state = self.state.get();
        state.on_zoom_step();
        self.state.set(state);
        self.base.trigger(ChartEvent::Zoom)
    }

    /// Ends the zoom and emits `zoom-end`; a no-op when no zoom is active.
    pub fn end(&self) -> ChartResult<DispatchReport> {
        let mut state = self.state.get();
        let previous = state.on_end();
        self.state.set(state);
        if previous != InteractionMode::Zooming {
            return Ok(DispatchReport::default());
        }
        self.base.factories()?.turn_factories_on(&[TOOLTIP])?;
        self.base.trigger(ChartEvent::ZoomEnd)
    }

    /// Restores data domains on this chart and tells peers to do the same.
    pub fn reset(&self) -> ChartResult<DispatchReport> {
        debug!(key = self.base.key(), "zoom/pan reset requested");
        self.base.trigger(ChartEvent::ZoomPanReset { made_here: true })
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Zoom {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn init(self: Rc<Self>, context: &FactoryContext<'_>) -> ChartResult<()> {
        let _ = self.axes.set(resolve_axes(context)?);
        Ok(())
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        self.flags.set(snapshot.options.zoom);
        Ok(())
    }
}
