use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::engine::mood::{Series, WaveColoring, mood_window_days};
use crate::engine::time_map::TimeMapper;
use crate::engine::wave::y_offset_ms;
use crate::model::MS_PER_DAY;

use super::{Scene, set_dash};

const WAVE_WIDTH: f64 = 3.0;
/// Pixels the dashed lines rise per unit of average mood.
const MOOD_LIFT: f64 = 4.0;
const LINE_STEP: f64 = 2.0;

/// Wave stroked one pixel column at a time so every column carries its own colour.
pub fn draw_mood_wave(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, scene: &Scene, now_ms: f64, config: &EngineConfig) {
    let coloring = WaveColoring {
        moods: &scene.moods,
        anticipations: &scene.anticipations,
        window_days: mood_window_days(mapper.duration_days),
        now_ms,
        palette: &config.palette,
    };
    ctx.set_line_width(WAVE_WIDTH);
    ctx.set_line_cap("round");
    let columns = mapper.width.ceil() as i64;
    let mut prev_t = mapper.x_to_ms(0.0);
    let mut prev_y = cy + y_offset_ms(prev_t);
    for col in 1..=columns {
        let x = col as f64;
        let t = mapper.x_to_ms(x);
        let y = cy + y_offset_ms(t);
        ctx.set_stroke_style_str(&coloring.color_at(prev_t).css());
        ctx.begin_path();
        ctx.move_to(x - 1.0, prev_y);
        ctx.line_to(x, y);
        ctx.stroke();
        prev_t = t;
        prev_y = y;
    }
    ctx.set_line_cap("butt");
}

/// Same wave a configured number of days earlier, as a dashed line.
pub fn draw_comparison(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, moods: &Series, offset_days: f64, config: &EngineConfig) {
    let window = mood_window_days(mapper.duration_days);
    let shift = offset_days * MS_PER_DAY;
    ctx.set_stroke_style_str(&config.palette.comparison.css_alpha(0.7));
    dashed_series(ctx, mapper, |t| {
        moods
            .weighted_average(t - shift, window)
            .map(|avg| cy + y_offset_ms(t) - avg * MOOD_LIFT)
    });
}

pub fn draw_projected(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, projected: &Series, config: &EngineConfig) {
    if projected.is_empty() {
        return;
    }
    // Projections are sparse; a week-wide window keeps the line continuous.
    let window = mood_window_days(mapper.duration_days).max(7.0);
    ctx.set_stroke_style_str(&config.palette.projected.css_alpha(0.8));
    dashed_series(ctx, mapper, |t| {
        projected
            .weighted_average(t, window)
            .map(|avg| cy + y_offset_ms(t) - avg * MOOD_LIFT)
    });
}

/// Strokes a dashed polyline, breaking it wherever `y_at` has no value.
fn dashed_series(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, y_at: impl Fn(f64) -> Option<f64>) {
    ctx.set_line_width(1.5);
    set_dash(ctx, &[6.0, 4.0]);
    ctx.begin_path();
    let mut open = false;
    let mut x = 0.0;
    while x <= mapper.width {
        match y_at(mapper.x_to_ms(x)) {
            Some(y) if open => ctx.line_to(x, y),
            Some(y) => {
                ctx.move_to(x, y);
                open = true;
            }
            None => open = false,
        }
        x += LINE_STEP;
    }
    ctx.stroke();
    set_dash(ctx, &[]);
}
