use std::cell::RefCell;
use std::rc::Rc;

use crate::core::{SeriesKind, Snapshot};
use crate::error::{ChartError, ChartResult};
use crate::events::{ChartEvent, DispatchReport, LegendToggle};
use crate::factory::{Factory, FactoryBase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub series_id: String,
    pub label: String,
    pub kind: SeriesKind,
    pub visible: bool,
}

pub struct Legend {
    base: FactoryBase,
    entries: RefCell<Vec<LegendEntry>>,
}

impl Legend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: FactoryBase::new(),
            entries: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn entries(&self) -> Vec<LegendEntry> {
        self.entries.borrow().clone()
    }

    /// Requests the visibility toggle of `series_id` from the host.
    pub fn click(&self, series_id: &str) -> ChartResult<DispatchReport> {
        let toggle = self
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.series_id == series_id)
            .map(|entry| LegendToggle {
                series_id: entry.series_id.clone(),
                visible: !entry.visible,
            })
            .ok_or_else(|| {
                ChartError::InvalidData(format!("legend has no series `{series_id}`"))
            })?;
        self.base.trigger(ChartEvent::LegendClick(toggle))
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Legend {
    fn base(&self) -> &FactoryBase {
        &self.base
    }

    fn update(self: Rc<Self>, snapshot: &Snapshot) -> ChartResult<()> {
        if !self.base.is_on() {
            return Ok(());
        }
        *self.entries.borrow_mut() = snapshot
            .options
            .series
            .iter()
            .map(|series| LegendEntry {
                series_id: series.id.clone(),
                label: series.label.clone().unwrap_or_else(|| series.id.clone()),
                kind: series.kind,
                visible: series.visible,
            })
            .collect();
        Ok(())
    }
}
