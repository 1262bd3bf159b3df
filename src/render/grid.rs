use web_sys::CanvasRenderingContext2d;

use crate::config::EngineConfig;
use crate::engine::layers::grid_ticks;
use crate::engine::time_map::TimeMapper;

pub fn draw_grid(ctx: &CanvasRenderingContext2d, mapper: &TimeMapper, cy: f64, h: f64, config: &EngineConfig) {
    let palette = &config.palette;
    ctx.set_line_width(1.0);
    ctx.set_stroke_style_str(&palette.grid.css());
    ctx.set_fill_style_str(&palette.axis_text.css());
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("bottom");
    for tick in grid_ticks(mapper) {
        // Snap to half pixels for crisp 1px lines.
        let x = tick.x.round() + 0.5;
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, h - 18.0);
        ctx.stroke();
        ctx.fill_text(&tick.label, x, h - 4.0).ok();
    }
    ctx.set_stroke_style_str(&palette.grid.css_alpha(0.8));
    ctx.begin_path();
    ctx.move_to(0.0, cy.round() + 0.5);
    ctx.line_to(mapper.width, cy.round() + 0.5);
    ctx.stroke();
    ctx.set_text_align("start");
    ctx.set_text_baseline("alphabetic");
}
