use chrono::{DateTime, Utc};

use crate::model::{MS_PER_DAY, from_ms, to_ms};

/// Converts between calendar instants and canvas x for one frame's view.
///
/// The live pan offset shifts the view without touching `center_ms`; the offset is
/// folded into the center only when a pan gesture is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeMapper {
    pub duration_days: f64,
    pub width: f64,
    pub center_ms: f64,
    pub pan_offset: f64,
}

impl TimeMapper {
    pub fn new(duration_days: f64, width: f64, center_ms: f64, pan_offset: f64) -> Self {
        Self {
            duration_days,
            width: width.max(1.0),
            center_ms,
            pan_offset,
        }
    }

    pub fn days_per_pixel(&self) -> f64 {
        self.duration_days / self.width
    }

    pub fn ms_per_pixel(&self) -> f64 {
        self.days_per_pixel() * MS_PER_DAY
    }

    pub fn total_ms(&self) -> f64 {
        self.duration_days * MS_PER_DAY
    }

    /// Center of what is on screen right now, pan included.
    pub fn view_center_ms(&self) -> f64 {
        self.center_ms - self.pan_offset * self.ms_per_pixel()
    }

    pub fn view_start_ms(&self) -> f64 {
        self.view_center_ms() - self.total_ms() / 2.0
    }

    pub fn view_end_ms(&self) -> f64 {
        self.view_start_ms() + self.total_ms()
    }

    pub fn ms_to_x(&self, t_ms: f64) -> f64 {
        (t_ms - self.view_start_ms()) / self.total_ms() * self.width
    }

    pub fn x_to_ms(&self, x: f64) -> f64 {
        self.view_start_ms() + x / self.width * self.total_ms()
    }

    pub fn date_to_x(&self, t: &DateTime<Utc>) -> f64 {
        self.ms_to_x(to_ms(t))
    }

    pub fn x_to_date(&self, x: f64) -> DateTime<Utc> {
        from_ms(self.x_to_ms(x))
    }

    /// Center timestamp after folding the live pan offset in.
    pub fn committed_center_ms(&self) -> f64 {
        self.view_center_ms()
    }
}
