//! Geometry for the overlay layers, kept apart from the canvas calls that draw it.

use chrono::{DateTime, Utc};

use crate::engine::time_map::TimeMapper;
use crate::model::{ItemKind, MS_PER_DAY, TimelineItem, from_ms, to_ms};

/// Running balance after each financial item, oldest first. Always covers the whole
/// history, not just the visible range.
pub fn balance_series(items: &[TimelineItem]) -> Vec<(f64, f64)> {
    let mut flows: Vec<(f64, f64)> = items
        .iter()
        .filter(|it| it.kind == ItemKind::Financial)
        .filter_map(|it| it.financial.map(|f| (to_ms(&it.timestamp), f.signed())))
        .collect();
    flows.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut balance = 0.0;
    flows
        .into_iter()
        .map(|(t, delta)| {
            balance += delta;
            (t, balance)
        })
        .collect()
}

/// Vertical pixel for each balance so the largest magnitude spans `band` pixels
/// above or below `base_y`.
pub fn balance_to_y(balance: f64, max_abs: f64, base_y: f64, band: f64) -> f64 {
    if max_abs <= 0.0 {
        return base_y;
    }
    base_y - balance / max_abs * band
}

/// Horizontal span clipped to `[0, width]`, or `None` when entirely off screen.
pub fn clip_span(x0: f64, x1: f64, width: f64) -> Option<(f64, f64)> {
    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    if hi < 0.0 || lo > width {
        return None;
    }
    Some((lo.max(0.0), hi.min(width)))
}

/// Items that open a chapter, with their band bounds in ms.
pub fn chapters(items: &[TimelineItem]) -> Vec<(&TimelineItem, f64, f64)> {
    let mut out: Vec<_> = items
        .iter()
        .filter_map(|it| it.chapter_end.map(|end| (it, to_ms(&it.timestamp), to_ms(&end))))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

/// Hue for the n-th chapter; consecutive chapters land far apart on the wheel.
pub fn chapter_hue(index: usize) -> f64 {
    (index as f64 * 137.5) % 360.0
}

/// Left inset of a pattern label inside its band.
pub const PATTERN_LABEL_INSET: f64 = 4.0;

/// `(left_x, width)` of a pattern label whose band starts at `band_x`.
pub fn pattern_label_span(band_x: f64, text_w: f64) -> (f64, f64) {
    (band_x + PATTERN_LABEL_INSET, text_w)
}

/// Assigns each label a row so no two labels in a row overlap horizontally.
/// `spans` are `(left_x, width)` in draw order.
pub fn stack_labels(spans: &[(f64, f64)], gap: f64) -> Vec<usize> {
    let mut row_ends: Vec<f64> = Vec::new();
    spans
        .iter()
        .map(|&(x, w)| {
            for (row, end) in row_ends.iter_mut().enumerate() {
                if x >= *end + gap {
                    *end = x + w;
                    return row;
                }
            }
            row_ends.push(x + w);
            row_ends.len() - 1
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Tooltip box next to a pin, flipped left/up when it would leave the canvas.
pub fn tooltip_rect(pin_x: f64, pin_y: f64, w: f64, h: f64, canvas_w: f64, canvas_h: f64, offset: f64) -> Rect {
    let mut x = pin_x + offset;
    if x + w > canvas_w {
        x = pin_x - offset - w;
    }
    let mut y = pin_y - offset - h;
    if y < 0.0 {
        y = pin_y + offset;
    }
    Rect {
        x: x.clamp(0.0, (canvas_w - w).max(0.0)),
        y: y.clamp(0.0, (canvas_h - h).max(0.0)),
        w,
        h,
    }
}

/// Quadratic curve from where a goal was set to its deadline pin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    pub from: (f64, f64),
    pub control: (f64, f64),
    pub to: (f64, f64),
}

pub const TRAJECTORY_LIFT: f64 = 0.3;

pub fn trajectory(from: (f64, f64), to: (f64, f64)) -> Trajectory {
    let dx = (to.0 - from.0).abs();
    Trajectory {
        from,
        control: ((from.0 + to.0) / 2.0, from.1.min(to.1) - dx * TRAJECTORY_LIFT),
        to,
    }
}

const TICK_STEPS_DAYS: [f64; 15] = [
    0.125, 0.25, 0.5, 1.0, 2.0, 7.0, 14.0, 30.0, 61.0, 91.0, 182.0, 365.0, 730.0, 1826.0, 3652.0,
];
pub const MAX_TICKS: f64 = 12.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub at: DateTime<Utc>,
    pub label: String,
}

/// Smallest step in the ladder that keeps the visible tick count at or below `MAX_TICKS`.
pub fn tick_step_days(visible_days: f64) -> f64 {
    TICK_STEPS_DAYS
        .iter()
        .copied()
        .find(|step| visible_days / step <= MAX_TICKS)
        .unwrap_or(TICK_STEPS_DAYS[TICK_STEPS_DAYS.len() - 1])
}

fn tick_format(step_days: f64) -> &'static str {
    if step_days < 1.0 {
        "%H:%M"
    } else if step_days < 30.0 {
        "%b %d"
    } else if step_days < 365.0 {
        "%b %Y"
    } else {
        "%Y"
    }
}

/// Grid ticks aligned to multiples of the step since the epoch.
pub fn grid_ticks(mapper: &TimeMapper) -> Vec<Tick> {
    let step_days = tick_step_days(mapper.duration_days);
    let step_ms = step_days * MS_PER_DAY;
    let fmt = tick_format(step_days);
    let first = (mapper.view_start_ms() / step_ms).ceil() as i64;
    let last = (mapper.view_end_ms() / step_ms).floor() as i64;
    (first..=last)
        .map(|k| {
            let t_ms = k as f64 * step_ms;
            let at = from_ms(t_ms);
            Tick {
                x: mapper.ms_to_x(t_ms),
                at,
                label: at.format(fmt).to_string(),
            }
        })
        .collect()
}

/// Radius of the pulsing today dot for a wall-clock time.
pub fn pulse_radius(wall_ms: f64) -> f64 {
    5.0 + 2.0 * (wall_ms / 300.0).sin()
}

/// Timestamp format used in tooltips; finer zooms show the time of day.
pub fn tooltip_date(at: &DateTime<Utc>, visible_days: f64) -> String {
    if visible_days <= 2.0 {
        at.format("%a %b %d, %H:%M").to_string()
    } else {
        at.format("%a %b %d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FinancialFlow, FlowDirection};
    use chrono::TimeZone;

    fn money(id: &str, day: u32, amount: f64, direction: FlowDirection) -> TimelineItem {
        TimelineItem {
            id: id.into(),
            title: id.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            kind: ItemKind::Financial,
            category_id: "money".into(),
            mood: 0,
            intensity: None,
            anticipation: None,
            financial: Some(FinancialFlow { amount, direction }),
            created_at: None,
            connections: Vec::new(),
            chapter_end: None,
        }
    }

    #[test]
    fn balance_accumulates_chronologically() {
        let items = vec![
            money("rent", 5, 400.0, FlowDirection::Outflow),
            money("pay", 1, 1000.0, FlowDirection::Inflow),
            money("food", 9, 100.0, FlowDirection::Outflow),
        ];
        let balances: Vec<f64> = balance_series(&items).into_iter().map(|(_, b)| b).collect();
        assert_eq!(balances, vec![1000.0, 600.0, 500.0]);
    }

    #[test]
    fn non_financial_items_are_ignored() {
        let mut item = money("x", 2, 50.0, FlowDirection::Inflow);
        item.kind = ItemKind::Event;
        assert!(balance_series(&[item]).is_empty());
    }

    #[test]
    fn balance_scale_fits_band() {
        assert_eq!(balance_to_y(-200.0, 200.0, 500.0, 60.0), 560.0);
        assert_eq!(balance_to_y(200.0, 200.0, 500.0, 60.0), 440.0);
        assert_eq!(balance_to_y(10.0, 0.0, 500.0, 60.0), 500.0);
    }

    #[test]
    fn clip_span_handles_offscreen_and_partial() {
        assert_eq!(clip_span(-50.0, 30.0, 100.0), Some((0.0, 30.0)));
        assert_eq!(clip_span(120.0, 200.0, 100.0), None);
        assert_eq!(clip_span(80.0, 20.0, 100.0), Some((20.0, 80.0)));
    }

    #[test]
    fn labels_stack_when_overlapping() {
        let rows = stack_labels(&[(0.0, 50.0), (20.0, 50.0), (60.0, 30.0), (30.0, 10.0)], 4.0);
        assert_eq!(rows, vec![0, 1, 0, 2]);
    }

    #[test]
    fn separate_pattern_labels_share_a_row() {
        let spans = [pattern_label_span(500.0, 60.0), pattern_label_span(700.0, 60.0)];
        assert_eq!(spans[0], (504.0, 60.0));
        assert_eq!(stack_labels(&spans, 6.0), vec![0, 0]);
        let crowded = [pattern_label_span(500.0, 60.0), pattern_label_span(540.0, 60.0)];
        assert_eq!(stack_labels(&crowded, 6.0), vec![0, 1]);
    }

    #[test]
    fn tooltip_flips_near_edges() {
        let r = tooltip_rect(790.0, 10.0, 100.0, 30.0, 800.0, 600.0, 10.0);
        assert_eq!(r.x, 680.0);
        assert_eq!(r.y, 20.0);
        let r = tooltip_rect(100.0, 300.0, 100.0, 30.0, 800.0, 600.0, 10.0);
        assert_eq!((r.x, r.y), (110.0, 260.0));
    }

    #[test]
    fn trajectory_control_rises_with_distance() {
        let t = trajectory((100.0, 200.0), (300.0, 220.0));
        assert_eq!(t.control, (200.0, 200.0 - 200.0 * TRAJECTORY_LIFT));
    }

    #[test]
    fn tick_step_keeps_count_small() {
        assert_eq!(tick_step_days(1.0), 0.125);
        assert_eq!(tick_step_days(7.0), 1.0);
        assert_eq!(tick_step_days(30.0), 7.0);
        assert_eq!(tick_step_days(36525.0), 3652.0);
    }

    #[test]
    fn ticks_are_inside_the_view() {
        let center = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let m = TimeMapper::new(30.0, 900.0, to_ms(&center), 0.0);
        let ticks = grid_ticks(&m);
        assert!(!ticks.is_empty());
        assert!(ticks.len() as f64 <= MAX_TICKS + 1.0);
        assert!(ticks.iter().all(|t| t.x >= 0.0 && t.x <= 900.0));
    }

    #[test]
    fn chapters_need_an_end() {
        let mut a = money("a", 3, 1.0, FlowDirection::Inflow);
        a.chapter_end = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let b = money("b", 1, 1.0, FlowDirection::Inflow);
        let both = [b, a];
        let found = chapters(&both);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.id, "a");
    }
}
