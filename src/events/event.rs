use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{ChartOptions, Coordinates, Domains, ElementDimensions, PointerEvent, Snapshot};
use crate::error::ChartError;
use crate::interaction::GestureKind;

/// Closed vocabulary of chart events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Create,
    Update,
    Destroy,
    Resize,
    ContainerMove,
    ContainerOut,
    LegendClick,
    Pan,
    PanEnd,
    Zoom,
    ZoomEnd,
    ZoomPanReset,
    OuterWorldHover,
    OuterWorldDomainChange,
}

impl EventKind {
    /// Every event a chart instance declares at link time.
    pub const ALL: [Self; 14] = [
        Self::Create,
        Self::Update,
        Self::Destroy,
        Self::Resize,
        Self::ContainerMove,
        Self::ContainerOut,
        Self::LegendClick,
        Self::Pan,
        Self::PanEnd,
        Self::Zoom,
        Self::ZoomEnd,
        Self::ZoomPanReset,
        Self::OuterWorldHover,
        Self::OuterWorldDomainChange,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::Resize => "resize",
            Self::ContainerMove => "container-move",
            Self::ContainerOut => "container-out",
            Self::LegendClick => "legend-click",
            Self::Pan => "pan",
            Self::PanEnd => "pan-end",
            Self::Zoom => "zoom",
            Self::ZoomEnd => "zoom-end",
            Self::ZoomPanReset => "zoom-pan-reset",
            Self::OuterWorldHover => "outer-world-hover",
            Self::OuterWorldDomainChange => "outer-world-domain-change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ChartError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ChartError::UnknownEvent(name.to_owned()))
    }
}

/// Subscription name: an event kind plus an optional ownership label.
///
/// `legend-click.directive` parses to `LegendClick` in namespace `directive`.
/// The namespace never changes delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName {
    pub kind: EventKind,
    pub namespace: Option<String>,
}

impl EventName {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            namespace: None,
        }
    }

    #[must_use]
    pub fn namespaced(kind: EventKind, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
        }
    }
}

impl From<EventKind> for EventName {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

impl FromStr for EventName {
    type Err = ChartError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.split_once('.') {
            Some((kind, namespace)) if !namespace.is_empty() => {
                Ok(Self::namespaced(kind.parse()?, namespace))
            }
            Some(_) => Err(ChartError::UnknownEvent(name.to_owned())),
            None => Ok(Self::new(name.parse()?)),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}.{namespace}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Series visibility change requested from the legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendToggle {
    pub series_id: String,
    pub visible: bool,
}

/// Event payloads, one variant per [`EventKind`].
#[derive(Debug, Clone)]
pub enum ChartEvent {
    Create(Rc<ChartOptions>),
    Update(Snapshot),
    Destroy,
    Resize(ElementDimensions),
    ContainerMove(PointerEvent),
    ContainerOut,
    LegendClick(LegendToggle),
    Pan,
    PanEnd,
    Zoom,
    ZoomEnd,
    /// `made_here` is false when the reset was echoed from a peer chart.
    ZoomPanReset {
        made_here: bool,
    },
    OuterWorldHover {
        coordinates: Coordinates,
        snapshot: Option<Snapshot>,
    },
    OuterWorldDomainChange(Domains),
}

impl ChartEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Create(_) => EventKind::Create,
            Self::Update(_) => EventKind::Update,
            Self::Destroy => EventKind::Destroy,
            Self::Resize(_) => EventKind::Resize,
            Self::ContainerMove(_) => EventKind::ContainerMove,
            Self::ContainerOut => EventKind::ContainerOut,
            Self::LegendClick(_) => EventKind::LegendClick,
            Self::Pan => EventKind::Pan,
            Self::PanEnd => EventKind::PanEnd,
            Self::Zoom => EventKind::Zoom,
            Self::ZoomEnd => EventKind::ZoomEnd,
            Self::ZoomPanReset { .. } => EventKind::ZoomPanReset,
            Self::OuterWorldHover { .. } => EventKind::OuterWorldHover,
            Self::OuterWorldDomainChange(_) => EventKind::OuterWorldDomainChange,
        }
    }

    /// Locally raised gesture event for `gesture`.
    #[must_use]
    pub fn gesture(gesture: GestureKind) -> Self {
        match gesture {
            GestureKind::Pan => Self::Pan,
            GestureKind::PanEnd => Self::PanEnd,
            GestureKind::Zoom => Self::Zoom,
            GestureKind::ZoomEnd => Self::ZoomEnd,
            GestureKind::ZoomPanReset => Self::ZoomPanReset { made_here: true },
        }
    }
}
