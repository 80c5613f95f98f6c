use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::EventKind;

/// Gesture phase carried by domain sync messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureKind {
    Pan,
    PanEnd,
    Zoom,
    ZoomEnd,
    ZoomPanReset,
}

impl GestureKind {
    /// End phases are the only ones reported to the host callback.
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::PanEnd | Self::ZoomEnd | Self::ZoomPanReset)
    }

    #[must_use]
    pub const fn event_kind(self) -> EventKind {
        match self {
            Self::Pan => EventKind::Pan,
            Self::PanEnd => EventKind::PanEnd,
            Self::Zoom => EventKind::Zoom,
            Self::ZoomEnd => EventKind::ZoomEnd,
            Self::ZoomPanReset => EventKind::ZoomPanReset,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.event_kind().as_str()
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning,
    Zooming,
}

/// Phase tracking shared by the pan and zoom components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    mode: InteractionMode,
    moved: bool,
}

impl GestureState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    /// Whether the active gesture changed any domain yet.
    #[must_use]
    pub fn has_moved(self) -> bool {
        self.moved
    }

    pub fn on_pan_start(&mut self) {
        self.mode = InteractionMode::Panning;
        self.moved = false;
    }

    pub fn on_zoom_step(&mut self) {
        self.mode = InteractionMode::Zooming;
        self.moved = true;
    }

    pub fn on_move(&mut self) {
        self.moved = true;
    }

    /// Returns the mode that was active before going idle.
    pub fn on_end(&mut self) -> InteractionMode {
        let previous = self.mode;
        self.mode = InteractionMode::Idle;
        self.moved = false;
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureKind, GestureState, InteractionMode};

    #[test]
    fn only_end_phases_reach_the_host() {
        assert!(!GestureKind::Pan.is_end());
        assert!(!GestureKind::Zoom.is_end());
        assert!(GestureKind::PanEnd.is_end());
        assert!(GestureKind::ZoomEnd.is_end());
        assert!(GestureKind::ZoomPanReset.is_end());
    }

    #[test]
    fn gesture_kind_serializes_with_event_names() {
        let json = serde_json::to_string(&GestureKind::ZoomPanReset).expect("serialize");
        assert_eq!(json, "\"zoom-pan-reset\"");
        assert_eq!(GestureKind::PanEnd.to_string(), "pan-end");
    }

    #[test]
    fn gesture_state_tracks_mode_transitions() {
        let mut state = GestureState::default();
        state.on_pan_start();
        assert_eq!(state.mode(), InteractionMode::Panning);
        assert!(!state.has_moved());
        state.on_move();
        assert!(state.has_moved());
        assert_eq!(state.on_end(), InteractionMode::Panning);
        assert_eq!(state.mode(), InteractionMode::Idle);
    }
}
