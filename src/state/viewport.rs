use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::time_map::TimeMapper;
use crate::model::{DEFAULT_ZOOM_INDEX, ZOOM_LEVELS, ZoomLevel, from_ms, to_ms};

/// Where the wave centerline sits, as a fraction of canvas height.
const CENTERLINE_FRACTION: f64 = 0.45;

/// Zoom and committed center, the part of the view a host keeps across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub zoom_index: usize,
    pub center: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub zoom_index: usize,
    pub center_ms: f64,
    /// Live pan in pixels; folded into `center_ms` on release.
    pub pan_offset: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center_ms: f64) -> Self {
        Self {
            zoom_index: DEFAULT_ZOOM_INDEX,
            center_ms,
            pan_offset: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn level(&self) -> ZoomLevel {
        ZOOM_LEVELS[self.zoom_index.min(ZOOM_LEVELS.len() - 1)]
    }

    pub fn mapper(&self) -> TimeMapper {
        TimeMapper::new(self.level().days, self.width, self.center_ms, self.pan_offset)
    }

    pub fn center_y(&self) -> f64 {
        self.height * CENTERLINE_FRACTION
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Steps the zoom index, clamped to the level table. Returns whether it moved.
    pub fn step_zoom(&mut self, delta: i32) -> bool {
        let max = ZOOM_LEVELS.len() as i64 - 1;
        let next = (self.zoom_index as i64 + delta as i64).clamp(0, max) as usize;
        let changed = next != self.zoom_index;
        self.zoom_index = next;
        changed
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            zoom_index: self.zoom_index,
            center: from_ms(self.center_ms),
        }
    }

    /// Applies a saved view; out-of-range zoom indices are clamped.
    pub fn restore(&mut self, snap: ViewSnapshot) {
        self.zoom_index = snap.zoom_index.min(ZOOM_LEVELS.len() - 1);
        self.center_ms = to_ms(&snap.center);
        self.pan_offset = 0.0;
    }

    /// Folds the live pan into the center and zeroes it. Returns whether anything moved.
    pub fn commit_pan(&mut self) -> bool {
        if self.pan_offset == 0.0 {
            return false;
        }
        self.center_ms = self.mapper().committed_center_ms();
        self.pan_offset = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MS_PER_DAY;

    #[test]
    fn zoom_never_leaves_the_table() {
        let mut vp = Viewport::new(0.0);
        for _ in 0..50 {
            vp.step_zoom(1);
        }
        assert_eq!(vp.zoom_index, ZOOM_LEVELS.len() - 1);
        assert!(!vp.step_zoom(1));
        for _ in 0..50 {
            vp.step_zoom(-1);
        }
        assert_eq!(vp.zoom_index, 0);
        assert!(!vp.step_zoom(-1));
    }

    #[test]
    fn commit_pan_folds_once() {
        let mut vp = Viewport::new(100.0 * MS_PER_DAY);
        vp.resize(900.0, 600.0);
        vp.pan_offset = 90.0;
        // Month view at 900px is 30px per day, so 90px is three days back.
        assert!(vp.commit_pan());
        assert!((vp.center_ms - 97.0 * MS_PER_DAY).abs() < 1e-3);
        assert_eq!(vp.pan_offset, 0.0);
        assert!(!vp.commit_pan());
        assert!((vp.center_ms - 97.0 * MS_PER_DAY).abs() < 1e-3);
    }

    #[test]
    fn restore_clamps_a_stale_zoom_index() {
        let mut vp = Viewport::new(0.0);
        vp.pan_offset = 40.0;
        vp.restore(ViewSnapshot {
            zoom_index: 99,
            center: from_ms(5.0 * MS_PER_DAY),
        });
        assert_eq!(vp.zoom_index, ZOOM_LEVELS.len() - 1);
        assert_eq!(vp.pan_offset, 0.0);
        assert_eq!(vp.snapshot().center, from_ms(5.0 * MS_PER_DAY));
    }
}
