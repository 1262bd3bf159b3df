use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::engine::layers::{tooltip_date, tooltip_rect};
use crate::model::TimelineItem;
use crate::state::RenderState;

use super::{rounded_rect, text_width};

const PAD: f64 = 8.0;
const LINE: f64 = 16.0;

/// Title and date next to the hovered pin. Suppressed while a gesture is active.
pub fn draw_tooltip(ctx: &CanvasRenderingContext2d, state: &RenderState, items: &[TimelineItem], config: &EngineConfig) {
    if !state.mode.is_idle() {
        return;
    }
    let Some(pin) = state.hover.as_deref().and_then(|id| state.pins.pin(id)) else {
        return;
    };
    let Some(item) = items.get(pin.index) else {
        return;
    };
    let date = tooltip_date(&item.timestamp, state.viewport.level().days);

    ctx.set_font("bold 12px sans-serif");
    let title_w = text_width(ctx, &item.title);
    ctx.set_font("11px sans-serif");
    let date_w = text_width(ctx, &date);
    let rect = tooltip_rect(
        pin.x,
        pin.y,
        title_w.max(date_w) + PAD * 2.0,
        LINE * 2.0 + PAD,
        state.viewport.width,
        state.viewport.height,
        config.marker_radius + 6.0,
    );

    rounded_rect(ctx, rect.x, rect.y, rect.w, rect.h, 6.0);
    ctx.set_fill_style_str(&config.palette.background.css_alpha(0.95));
    ctx.fill();
    ctx.set_stroke_style_str(&config.category_color(&item.category_id).css());
    ctx.set_line_width(1.0);
    ctx.stroke();

    ctx.set_text_baseline("top");
    ctx.set_fill_style_str(&config.palette.axis_text.css());
    ctx.set_font("bold 12px sans-serif");
    ctx.fill_text(&item.title, rect.x + PAD, rect.y + PAD / 2.0 + 2.0).ok();
    ctx.set_font("11px sans-serif");
    ctx.set_fill_style_str(&config.palette.axis_text.css_alpha(0.75));
    ctx.fill_text(&date, rect.x + PAD, rect.y + PAD / 2.0 + LINE + 2.0).ok();
    ctx.set_text_baseline("alphabetic");
}
