//! Mapping between dates and positions on the date range slider.
//!
//! Positions are percentages (0-100) of the loaded date span. The two
//! handles are kept at least one percent apart.

use casualty_map_incident_models::DateRange;
use chrono::{DateTime, Duration, Utc};

/// Minimum distance between the two handles, in percent.
const MIN_HANDLE_GAP: f64 = 1.0;

/// Slider over the full date span of the loaded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSlider {
    bounds: DateRange,
}

impl DateSlider {
    /// Creates a slider spanning `bounds`.
    #[must_use]
    pub const fn new(bounds: DateRange) -> Self {
        Self { bounds }
    }

    /// Full span covered by the slider.
    #[must_use]
    pub const fn bounds(&self) -> DateRange {
        self.bounds
    }

    fn span_ms(&self) -> i64 {
        (self.bounds.end - self.bounds.start).num_milliseconds()
    }

    /// Position of `at` as a percentage of the span. A zero-length span maps
    /// every date to `0`.
    #[must_use]
    pub fn percent_of(&self, at: DateTime<Utc>) -> f64 {
        let span = self.span_ms();
        if span <= 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = (at - self.bounds.start).num_milliseconds() as f64 / span as f64;
        fraction * 100.0
    }

    /// Date at `percent` of the span, clamped to `[0, 100]`.
    #[must_use]
    pub fn date_at(&self, percent: f64) -> DateTime<Utc> {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let offset = (percent / 100.0 * self.span_ms() as f64).round() as i64;
        self.bounds.start + Duration::milliseconds(offset)
    }

    /// Moves the start handle, keeping it below the end handle.
    #[must_use]
    pub fn move_start(&self, current: DateRange, percent: f64) -> DateRange {
        let limit = self.percent_of(current.end) - MIN_HANDLE_GAP;
        DateRange::new(self.date_at(percent.min(limit)), current.end)
    }

    /// Moves the end handle, keeping it above the start handle.
    #[must_use]
    pub fn move_end(&self, current: DateRange, percent: f64) -> DateRange {
        let limit = self.percent_of(current.start) + MIN_HANDLE_GAP;
        DateRange::new(current.start, self.date_at(percent.max(limit)))
    }
}
