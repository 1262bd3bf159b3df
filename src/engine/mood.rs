//! Locally weighted sampling of mood-like series and the colors derived from it.

use crate::config::Palette;
use crate::engine::color::Rgb;
use crate::model::{MS_PER_DAY, ProjectedPoint, TimelineItem, to_ms};

pub const MOOD_MAX: f64 = 5.0;
pub const INTENSITY_WINDOW_DAYS: f64 = 7.0;
pub const ANTICIPATION_LOOKAHEAD_DAYS: f64 = 14.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub t_ms: f64,
    pub value: f64,
}

/// Chronologically sorted samples with linear-falloff averaging.
#[derive(Clone, Debug, Default)]
pub struct Series {
    points: Vec<Sample>,
}

impl Series {
    pub fn new(mut points: Vec<Sample>) -> Self {
        points.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));
        Self { points }
    }

    pub fn moods(items: &[TimelineItem]) -> Self {
        Self::new(
            items
                .iter()
                .map(|it| Sample {
                    t_ms: to_ms(&it.timestamp),
                    value: (it.mood as f64).clamp(-MOOD_MAX, MOOD_MAX),
                })
                .collect(),
        )
    }

    pub fn intensities(items: &[TimelineItem]) -> Self {
        Self::new(
            items
                .iter()
                .filter_map(|it| {
                    it.intensity.map(|v| Sample {
                        t_ms: to_ms(&it.timestamp),
                        value: v.clamp(-MOOD_MAX, MOOD_MAX),
                    })
                })
                .collect(),
        )
    }

    pub fn anticipations(items: &[TimelineItem]) -> Self {
        Self::new(
            items
                .iter()
                .filter_map(|it| match it.anticipation {
                    Some(v) if v != 0.0 => Some(Sample { t_ms: to_ms(&it.timestamp), value: v }),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn projected(points: &[ProjectedPoint]) -> Self {
        Self::new(
            points
                .iter()
                .map(|p| Sample { t_ms: to_ms(&p.timestamp), value: p.mood })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples with `lo <= t_ms <= hi`.
    fn range(&self, lo: f64, hi: f64) -> &[Sample] {
        let start = self.points.partition_point(|p| p.t_ms < lo);
        let end = self.points.partition_point(|p| p.t_ms <= hi);
        &self.points[start..end]
    }

    /// Weighted average around `t_ms`, each point weighted by
    /// `max(0, 1 - |Δdays| / window)`. `None` when nothing falls in the window.
    pub fn weighted_average(&self, t_ms: f64, window_days: f64) -> Option<f64> {
        let window_ms = window_days * MS_PER_DAY;
        let mut sum = 0.0;
        let mut total = 0.0;
        for p in self.range(t_ms - window_ms, t_ms + window_ms) {
            let w = (1.0 - (p.t_ms - t_ms).abs() / window_ms).max(0.0);
            sum += w * p.value;
            total += w;
        }
        (total > 0.0).then(|| sum / total)
    }
}

/// Influence window for the mood wave at a given zoom.
pub fn mood_window_days(visible_days: f64) -> f64 {
    (visible_days / 30.0).max(1.0)
}

/// Neutral at 0, the negative endpoint at -5 and the positive endpoint at +5.
pub fn mood_color(mood: f64, palette: &Palette) -> Rgb {
    let m = mood.clamp(-MOOD_MAX, MOOD_MAX);
    if m >= 0.0 {
        palette.neutral.lerp(palette.positive, m / MOOD_MAX)
    } else {
        palette.neutral.lerp(palette.negative, -m / MOOD_MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anticipation {
    pub average: f64,
    pub weight: f64,
}

/// Anticipation felt at `t_ms` for items coming up in the next two weeks.
pub fn anticipation_at(t_ms: f64, anticipations: &Series) -> Option<Anticipation> {
    let horizon = ANTICIPATION_LOOKAHEAD_DAYS * MS_PER_DAY;
    let mut weighted = 0.0;
    let mut total = 0.0;
    for p in anticipations.range(t_ms, t_ms + horizon) {
        let days_until = (p.t_ms - t_ms) / MS_PER_DAY;
        let w = 1.0 - days_until / ANTICIPATION_LOOKAHEAD_DAYS;
        if w > 0.0 {
            weighted += w * p.value;
            total += w;
        }
    }
    (total > 0.0).then(|| Anticipation {
        average: weighted / total,
        weight: total,
    })
}

/// Inputs shared by every column of one frame's mood wave.
pub struct WaveColoring<'a> {
    pub moods: &'a Series,
    pub anticipations: &'a Series,
    pub window_days: f64,
    pub now_ms: f64,
    pub palette: &'a Palette,
}

impl WaveColoring<'_> {
    pub fn color_at(&self, t_ms: f64) -> Rgb {
        let mood = self.moods.weighted_average(t_ms, self.window_days).unwrap_or(0.0);
        let base = mood_color(mood, self.palette);
        if t_ms <= self.now_ms {
            return base;
        }
        match anticipation_at(t_ms, self.anticipations) {
            Some(a) => {
                let target = if a.average >= 0.0 {
                    self.palette.anticipation
                } else {
                    self.palette.dread
                };
                base.lerp(target, a.weight.min(1.0))
            }
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: f64 = MS_PER_DAY;

    fn series(points: &[(f64, f64)]) -> Series {
        Series::new(points.iter().map(|&(d, v)| Sample { t_ms: d * DAY, value: v }).collect())
    }

    #[test]
    fn empty_window_yields_none() {
        let s = series(&[(0.0, 3.0)]);
        assert_eq!(s.weighted_average(10.0 * DAY, 2.0), None);
    }

    #[test]
    fn linear_falloff_weights() {
        // At t=1: point at 0 weighs 0.5, point at 1.5 weighs 0.75.
        let s = series(&[(0.0, 4.0), (1.5, -2.0)]);
        let avg = s.weighted_average(1.0 * DAY, 2.0).unwrap();
        let expected = (0.5 * 4.0 + 0.75 * -2.0) / 1.25;
        assert!((avg - expected).abs() < 1e-9);
    }

    #[test]
    fn single_positive_point_gives_positive_color() {
        let palette = Palette::default();
        let moods = series(&[(100.0, 5.0)]);
        let none = Series::default();
        let coloring = WaveColoring {
            moods: &moods,
            anticipations: &none,
            window_days: 1.0,
            now_ms: 1000.0 * DAY,
            palette: &palette,
        };
        assert_eq!(coloring.color_at(100.0 * DAY), palette.positive);
    }

    #[test]
    fn no_data_is_neutral() {
        let palette = Palette::default();
        assert_eq!(mood_color(0.0, &palette), palette.neutral);
        assert_eq!(mood_color(-5.0, &palette), palette.negative);
        assert_eq!(mood_color(-12.0, &palette), palette.negative);
    }

    #[test]
    fn anticipation_only_looks_ahead() {
        let ant = series(&[(10.0, 4.0)]);
        assert!(anticipation_at(11.0 * DAY, &ant).is_none());
        assert!(anticipation_at(-5.0 * DAY, &ant).is_none());
        let a = anticipation_at(3.0 * DAY, &ant).unwrap();
        assert!((a.weight - 0.5).abs() < 1e-9);
        assert!((a.average - 4.0).abs() < 1e-9);
    }

    #[test]
    fn anticipation_blends_only_in_the_future() {
        let palette = Palette::default();
        let moods = Series::default();
        let ant = series(&[(10.0, 4.0), (11.0, 2.0)]);
        let coloring = WaveColoring {
            moods: &moods,
            anticipations: &ant,
            window_days: 1.0,
            now_ms: 5.0 * DAY,
            palette: &palette,
        };
        assert_eq!(coloring.color_at(4.0 * DAY), palette.neutral);
        // Two close items push the weight past 1, so the blend saturates.
        assert_eq!(coloring.color_at(9.5 * DAY), palette.anticipation);
    }

    #[test]
    fn window_never_below_one_day() {
        assert_eq!(mood_window_days(7.0), 1.0);
        assert_eq!(mood_window_days(365.0), 365.0 / 30.0);
    }
}
