use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::engine::layers::{Rect, trajectory};
use crate::engine::pins::Pin;
use crate::engine::wave::y_offset_ms;
use crate::model::{ItemKind, TimelineItem, to_ms};
use crate::state::RenderState;

use super::{rounded_rect, set_dash, text_width};

const DIMMED_ALPHA: f64 = 0.2;

pub fn draw_trajectories(ctx: &CanvasRenderingContext2d, state: &RenderState, items: &[TimelineItem], config: &EngineConfig) {
    let mapper = state.viewport.mapper();
    let cy = state.viewport.center_y();
    ctx.set_line_width(1.5);
    set_dash(ctx, &[3.0, 4.0]);
    for pin in state.pins.pins().iter().filter(|p| p.kind == ItemKind::Goal) {
        let Some(item) = items.get(pin.index) else {
            continue;
        };
        let Some(created) = item.created_at else {
            continue;
        };
        let created_ms = to_ms(&created);
        let curve = trajectory((mapper.ms_to_x(created_ms), cy + y_offset_ms(created_ms)), (pin.x, pin.y));
        let alpha = if pin.dimmed { DIMMED_ALPHA } else { 0.6 };
        ctx.set_stroke_style_str(&config.category_color(&item.category_id).css_alpha(alpha));
        ctx.begin_path();
        ctx.move_to(curve.from.0, curve.from.1);
        ctx.quadratic_curve_to(curve.control.0, curve.control.1, curve.to.0, curve.to.1);
        ctx.stroke();
    }
    set_dash(ctx, &[]);
}

/// Connection lines, then dimmed pins, then focused pins on top.
pub fn draw_pins(ctx: &CanvasRenderingContext2d, state: &RenderState, items: &[TimelineItem], config: &EngineConfig) {
    let pins = state.pins.pins();
    if config.layers.connections {
        ctx.set_line_width(1.0);
        set_dash(ctx, &[4.0, 4.0]);
        ctx.set_stroke_style_str(&config.palette.axis_text.css_alpha(0.5));
        for (a, b) in state.pins.edges(items) {
            let (pa, pb) = (&pins[a], &pins[b]);
            ctx.set_global_alpha(if pa.dimmed || pb.dimmed { DIMMED_ALPHA } else { 1.0 });
            ctx.begin_path();
            ctx.move_to(pa.x, pa.y);
            ctx.line_to(pb.x, pb.y);
            ctx.stroke();
        }
        set_dash(ctx, &[]);
    }

    let dragged = state.mode.dragged().map(|(id, _)| id);
    let radius = config.marker_radius;
    // Cache order already puts dimmed pins first.
    for pin in pins {
        let Some(item) = items.get(pin.index) else {
            continue;
        };
        ctx.set_global_alpha(if pin.dimmed { DIMMED_ALPHA } else { 1.0 });
        let r = if dragged == Some(pin.id.as_str()) { radius * 1.3 } else { radius };
        marker_path(ctx, pin, r);
        ctx.set_fill_style_str(&config.category_color(&item.category_id).css());
        ctx.fill();
        ctx.set_line_width(1.5);
        ctx.set_stroke_style_str(&config.palette.background.css());
        ctx.stroke();
        if state.hover.as_deref() == Some(pin.id.as_str()) || dragged == Some(pin.id.as_str()) {
            marker_path(ctx, pin, r + 3.0);
            ctx.set_stroke_style_str(&config.palette.axis_text.css());
            ctx.stroke();
        }
    }
    ctx.set_global_alpha(1.0);
}

fn marker_path(ctx: &CanvasRenderingContext2d, pin: &Pin, r: f64) {
    let (x, y) = (pin.x, pin.y);
    ctx.begin_path();
    match pin.kind {
        ItemKind::Event => {
            ctx.arc(x, y, r, 0.0, TAU).ok();
        }
        ItemKind::Goal => {
            ctx.rect(x - r * 0.85, y - r * 0.85, r * 1.7, r * 1.7);
        }
        ItemKind::Exercise => {
            ctx.move_to(x, y - r);
            ctx.line_to(x + r, y + r * 0.8);
            ctx.line_to(x - r, y + r * 0.8);
            ctx.close_path();
        }
        ItemKind::Financial => {
            ctx.move_to(x, y - r);
            ctx.line_to(x + r, y);
            ctx.line_to(x, y + r);
            ctx.line_to(x - r, y);
            ctx.close_path();
        }
    }
}

/// Banner naming the focused story, with an exit button whose bounds are kept
/// for the pointer handlers.
pub fn draw_story_overlay(ctx: &CanvasRenderingContext2d, state: &mut RenderState, config: &EngineConfig) {
    let Some(story) = &state.story else {
        state.story_exit = None;
        return;
    };
    let palette = &config.palette;
    let w = state.viewport.width;
    let label = format!("Story: {} ({} moments)", story.title, story.members.len());
    let exit_label = "Exit story";

    ctx.set_font("13px sans-serif");
    let label_w = text_width(ctx, &label);
    let exit_w = text_width(ctx, exit_label) + 20.0;
    let banner_w = label_w + exit_w + 36.0;
    let banner = Rect {
        x: (w - banner_w) / 2.0,
        y: 10.0,
        w: banner_w,
        h: 32.0,
    };
    rounded_rect(ctx, banner.x, banner.y, banner.w, banner.h, 8.0);
    ctx.set_fill_style_str(&palette.background.css_alpha(0.92));
    ctx.fill();
    ctx.set_stroke_style_str(&palette.anticipation.css_alpha(0.8));
    ctx.set_line_width(1.0);
    ctx.stroke();

    ctx.set_fill_style_str(&palette.axis_text.css());
    ctx.set_text_baseline("middle");
    ctx.fill_text(&label, banner.x + 12.0, banner.y + banner.h / 2.0).ok();

    let exit = Rect {
        x: banner.x + banner.w - exit_w - 8.0,
        y: banner.y + 5.0,
        w: exit_w,
        h: banner.h - 10.0,
    };
    rounded_rect(ctx, exit.x, exit.y, exit.w, exit.h, 5.0);
    ctx.set_fill_style_str(&palette.grid.css());
    ctx.fill();
    ctx.set_fill_style_str(&palette.axis_text.css());
    ctx.fill_text(exit_label, exit.x + 10.0, exit.y + exit.h / 2.0).ok();
    ctx.set_text_baseline("alphabetic");

    state.story_exit = Some(exit);
}
