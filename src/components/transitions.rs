use std::time::Duration;

use crate::factory::{Factory, FactoryBase};

pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(250);

/// Animation switch read by the series layers; turned off during gestures.
pub struct Transitions {
    base: FactoryBase,
    duration: Duration,
}

impl Transitions {
    #[must_use]
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_TRANSITION_DURATION)
    }

    #[must_use]
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            base: FactoryBase::new(),
            duration,
        }
    }

    /// Effective duration; zero while turned off.
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.base.is_on() {
            self.duration
        } else {
            Duration::ZERO
        }
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        !self.duration().is_zero()
    }
}

impl Default for Transitions {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Transitions {
    fn base(&self) -> &FactoryBase {
        &self.base
    }
}
