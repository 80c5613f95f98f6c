use crate::core::types::Domain;
use crate::error::ChartResult;

/// Linear mapping between a data domain and a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: Domain,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_min: f64, domain_max: f64) -> ChartResult<Self> {
        Ok(Self {
            domain: Domain::checked(domain_min, domain_max)?,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    #[must_use]
    pub fn domain(self) -> Domain {
        self.domain
    }

    pub fn set_domain(&mut self, domain: Domain) -> ChartResult<()> {
        self.domain = Domain::checked(domain.min, domain.max)?;
        Ok(())
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn set_range(&mut self, start: f64, end: f64) {
        self.range_start = start;
        self.range_end = end;
    }

    /// Maps a data value to pixels.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let normalized = (value - self.domain.min) / self.domain.span();
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Maps a pixel back to the data domain. A collapsed range maps to `min`.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain.min;
        }
        let normalized = (pixel - self.range_start) / range_span;
        self.domain.min + normalized * self.domain.span()
    }

    /// Converts a pixel distance into a data distance.
    #[must_use]
    pub fn pixels_to_span(self, pixels: f64) -> f64 {
        self.invert(self.range_start + pixels) - self.domain.min
    }
}
