use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Visible numeric range of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Builds a domain and rejects non-finite or empty ranges.
    pub fn checked(min: f64, max: f64) -> ChartResult<Self> {
        if !min.is_finite() || !max.is_finite() || min == max {
            return Err(ChartError::InvalidData(
                "domain must be finite and non-zero".to_owned(),
            ));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Widens a zero-width range by one unit on each side.
    #[must_use]
    pub fn widened_if_flat(self) -> Self {
        if self.min == self.max {
            Self::new(self.min - 1.0, self.max + 1.0)
        } else {
            self
        }
    }

    #[must_use]
    pub fn shifted(self, delta: f64) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Scales the range around `anchor`; a factor above one zooms in.
    #[must_use]
    pub fn zoomed_around(self, factor: f64, anchor: f64) -> Self {
        Self::new(
            anchor - (anchor - self.min) / factor,
            anchor + (self.max - anchor) / factor,
        )
    }
}

/// Complete viewport of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domains {
    pub x: Domain,
    pub y: Domain,
}

/// Viewport where either side may be missing.
///
/// Gesture constraints drop the axes a gesture does not move, so peers can
/// receive a single-axis payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialDomains {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Domain>,
}

impl PartialDomains {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Fills missing sides from the supplied local domains.
    #[must_use]
    pub fn complete_with(
        self,
        local_x: impl FnOnce() -> Domain,
        local_y: impl FnOnce() -> Domain,
    ) -> Domains {
        Domains {
            x: self.x.unwrap_or_else(local_x),
            y: self.y.unwrap_or_else(local_y),
        }
    }
}

impl From<Domains> for PartialDomains {
    fn from(domains: Domains) -> Self {
        Self {
            x: Some(domains.x),
            y: Some(domains.y),
        }
    }
}

/// Hovered data coordinate. Both sides `None` means "nothing hovered".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Coordinates {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self { x: None, y: None }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// Raw pointer position relative to the chart element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured bounding box of the element hosting the chart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementDimensions {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

impl ElementDimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            left: 0.0,
            top: 0.0,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }
}
