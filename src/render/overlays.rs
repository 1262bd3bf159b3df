use std::f64::consts::{FRAC_PI_2, TAU};

use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::engine::layers::{
    PATTERN_LABEL_INSET, balance_to_y, chapter_hue, chapters, clip_span, pattern_label_span, pulse_radius,
    stack_labels,
};
use crate::engine::mood::{INTENSITY_WINDOW_DAYS, MOOD_MAX, Series};
use crate::engine::time_map::TimeMapper;
use crate::engine::wave::y_offset_ms;
use crate::model::{Annotation, Pattern, TimelineItem};

use super::{set_dash, text_width};

const STEP: f64 = 2.0;

/// Positive intensity (flow) rises above the centerline, negative (stress) sinks below.
pub fn draw_intensity(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, intensities: &Series, config: &EngineConfig) {
    if intensities.is_empty() {
        return;
    }
    let scale = config.intensity_scale;
    let reach = MOOD_MAX * scale;
    let gradient = ctx.create_linear_gradient(0.0, cy - reach, 0.0, cy + reach);
    let palette = &config.palette;
    gradient.add_color_stop(0.0, &palette.flow.css_alpha(0.45)).ok();
    gradient.add_color_stop(0.5, &palette.flow.css_alpha(0.05)).ok();
    gradient.add_color_stop(0.5, &palette.stress.css_alpha(0.05)).ok();
    gradient.add_color_stop(1.0, &palette.stress.css_alpha(0.45)).ok();

    ctx.begin_path();
    ctx.move_to(0.0, cy);
    let mut x = 0.0;
    while x <= mapper.width {
        let level = intensities
            .weighted_average(mapper.x_to_ms(x), INTENSITY_WINDOW_DAYS)
            .unwrap_or(0.0);
        ctx.line_to(x, cy - level * scale);
        x += STEP;
    }
    ctx.line_to(mapper.width, cy);
    ctx.close_path();
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill();
}

/// Running balance over the whole history, scaled into a band above the bottom margin.
pub fn draw_financial(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, h: f64, balances: &[(f64, f64)], config: &EngineConfig) {
    let Some(&(_, last)) = balances.last() else {
        return;
    };
    let max_abs = balances.iter().fold(0.0_f64, |m, (_, b)| m.max(b.abs()));
    let base_y = h - config.financial_bottom_margin;
    let band = h * config.financial_height_fraction;
    let color = config.palette.financial;

    ctx.set_stroke_style_str(&color.css_alpha(0.25));
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(0.0, base_y);
    ctx.line_to(mapper.width, base_y);
    ctx.stroke();

    // Step line: the balance holds until the next flow.
    ctx.set_stroke_style_str(&color.css_alpha(0.85));
    ctx.set_line_width(2.0);
    ctx.begin_path();
    let mut prev_y = base_y;
    let mut last_x = 0.0;
    for (i, &(t, balance)) in balances.iter().enumerate() {
        let x = mapper.ms_to_x(t);
        let y = balance_to_y(balance, max_abs, base_y, band);
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, prev_y);
            ctx.line_to(x, y);
        }
        prev_y = y;
        last_x = x;
    }
    if last_x < mapper.width {
        ctx.line_to(mapper.width, prev_y);
    }
    ctx.stroke();

    ctx.set_fill_style_str(&color.css());
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("right");
    ctx.fill_text(&format!("Balance {last:.0}"), mapper.width - 8.0, base_y - band - 4.0).ok();
    ctx.set_text_align("start");
}

pub fn draw_chapters(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, h: f64, items: &[TimelineItem]) {
    ctx.set_font("12px sans-serif");
    for (i, (item, start, end)) in chapters(items).into_iter().enumerate() {
        let Some((x0, x1)) = clip_span(mapper.ms_to_x(start), mapper.ms_to_x(end), mapper.width) else {
            continue;
        };
        let hue = chapter_hue(i);
        ctx.set_fill_style_str(&format!("hsla({hue:.0}, 60%, 55%, 0.08)"));
        ctx.fill_rect(x0, 0.0, x1 - x0, h);

        ctx.save();
        ctx.translate(x0 + 6.0, 12.0).ok();
        ctx.rotate(FRAC_PI_2).ok();
        ctx.set_fill_style_str(&format!("hsla({hue:.0}, 60%, 65%, 0.8)"));
        ctx.fill_text(&item.title, 0.0, 0.0).ok();
        ctx.restore();
    }
}

pub fn draw_patterns(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, h: f64, patterns: &[Pattern], config: &EngineConfig) {
    let visible: Vec<(&Pattern, f64, f64)> = patterns
        .iter()
        .filter_map(|p| {
            clip_span(mapper.date_to_x(&p.start), mapper.date_to_x(&p.end), mapper.width).map(|(x0, x1)| (p, x0, x1))
        })
        .collect();
    if visible.is_empty() {
        return;
    }
    ctx.set_font("11px sans-serif");
    let spans: Vec<(f64, f64)> = visible
        .iter()
        .map(|(p, x0, _)| pattern_label_span(*x0, text_width(ctx, &p.text)))
        .collect();
    let rows = stack_labels(&spans, 6.0);
    for ((pattern, x0, x1), row) in visible.iter().zip(rows) {
        let color = config.palette.pattern(pattern.kind);
        ctx.set_fill_style_str(&color.css_alpha(0.10));
        ctx.fill_rect(*x0, 0.0, x1 - x0, h);
        ctx.set_fill_style_str(&color.css_alpha(0.9));
        ctx.fill_text(&pattern.text, x0 + PATTERN_LABEL_INSET, 36.0 + row as f64 * 14.0).ok();
    }
}

pub fn draw_annotations(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, annotations: &[Annotation], config: &EngineConfig) {
    let color = config.palette.annotation;
    ctx.set_stroke_style_str(&color.css());
    ctx.set_fill_style_str(&color.css());
    ctx.set_line_width(1.5);
    for note in annotations {
        let x = mapper.date_to_x(&note.timestamp);
        if x < 0.0 || x > mapper.width {
            continue;
        }
        ctx.begin_path();
        ctx.move_to(x, 8.0);
        ctx.line_to(x, 28.0);
        ctx.stroke();
        ctx.begin_path();
        ctx.move_to(x, 8.0);
        ctx.line_to(x + 10.0, 12.0);
        ctx.line_to(x, 16.0);
        ctx.close_path();
        ctx.fill();
    }
}

pub fn draw_today(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, h: f64, now_ms: f64, config: &EngineConfig) {
    let x = mapper.ms_to_x(now_ms);
    if x < 0.0 || x > mapper.width {
        return;
    }
    let color = config.palette.today;
    ctx.set_stroke_style_str(&color.css_alpha(0.6));
    ctx.set_line_width(1.0);
    set_dash(ctx, &[2.0, 3.0]);
    ctx.begin_path();
    ctx.move_to(x, 0.0);
    ctx.line_to(x, h);
    ctx.stroke();
    set_dash(ctx, &[]);

    ctx.set_fill_style_str(&color.css());
    ctx.begin_path();
    ctx.arc(x, cy + y_offset_ms(now_ms), pulse_radius(now_ms), 0.0, TAU).ok();
    ctx.fill();
}
