use serde::{Deserialize, Serialize};

/// Visual kind of a series; each kind is drawn by its own series layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesKind {
    #[default]
    Line,
    Area,
    Column,
    Dot,
}

impl SeriesKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Column => "column",
            Self::Dot => "dot",
        }
    }
}

/// Axis a component or series is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AxisSide {
    X,
    X2,
    #[default]
    Y,
    Y2,
}

impl AxisSide {
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::X | Self::X2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOptions {
    pub id: String,
    pub dataset: String,
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: SeriesKind,
    #[serde(default)]
    pub axis: AxisSide,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl SeriesOptions {
    #[must_use]
    pub fn new(id: impl Into<String>, dataset: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dataset: dataset.into(),
            key: key.into(),
            label: None,
            kind: SeriesKind::Line,
            axis: AxisSide::Y,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: AxisSide) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Bounds and key for one axis. Missing bounds come from the data extent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisOptions {
    /// Column holding the abscissa. Only read for horizontal axes.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl AxisOptions {
    #[must_use]
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxesOptions {
    #[serde(default)]
    pub x: AxisOptions,
    #[serde(default)]
    pub x2: Option<AxisOptions>,
    #[serde(default)]
    pub y: AxisOptions,
    #[serde(default)]
    pub y2: Option<AxisOptions>,
}

impl AxesOptions {
    #[must_use]
    pub fn side(&self, side: AxisSide) -> Option<&AxisOptions> {
        match side {
            AxisSide::X => Some(&self.x),
            AxisSide::X2 => self.x2.as_ref(),
            AxisSide::Y => Some(&self.y),
            AxisSide::Y2 => self.y2.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 0.0,
            right: 40.0,
            bottom: 40.0,
            left: 40.0,
        }
    }
}

/// Per-axis enable flags shared by grid, pan and zoom options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisFlags {
    pub x: bool,
    pub y: bool,
}

impl AxisFlags {
    #[must_use]
    pub const fn both() -> Self {
        Self { x: true, y: true }
    }

    #[must_use]
    pub const fn x_only() -> Self {
        Self { x: true, y: false }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self { x: false, y: false }
    }
}

impl Default for AxisFlags {
    fn default() -> Self {
        Self::both()
    }
}

/// Chart configuration snapshot consumed by the visual components.
///
/// Pan and zoom are opt-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub series: Vec<SeriesOptions>,
    #[serde(default)]
    pub axes: AxesOptions,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub grid: AxisFlags,
    #[serde(default = "AxisFlags::none")]
    pub pan: AxisFlags,
    #[serde(default = "AxisFlags::none")]
    pub zoom: AxisFlags,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            series: Vec::new(),
            axes: AxesOptions::default(),
            margin: Margin::default(),
            grid: AxisFlags::both(),
            pan: AxisFlags::none(),
            zoom: AxisFlags::none(),
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn with_series(mut self, series: SeriesOptions) -> Self {
        self.series.push(series);
        self
    }

    #[must_use]
    pub fn with_axes(mut self, axes: AxesOptions) -> Self {
        self.axes = axes;
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_pan(mut self, pan: AxisFlags) -> Self {
        self.pan = pan;
        self
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: AxisFlags) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn series_mut(&mut self, id: &str) -> Option<&mut SeriesOptions> {
        self.series.iter_mut().find(|series| series.id == id)
    }

    pub fn visible_series(&self) -> impl Iterator<Item = &SeriesOptions> {
        self.series.iter().filter(|series| series.visible)
    }
}
