//! Canvas drawing. Each frame redraws every layer in a fixed order; there is no
//! dirty-region tracking.

pub mod grid;
pub mod overlays;
pub mod pins;
pub mod tooltip;
pub mod wave;

use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::EngineConfig;
use crate::engine::layers::balance_series;
use crate::engine::mood::Series;
use crate::error::EngineError;
use crate::model::Journal;
use crate::state::RenderState;

/// Journal plus the series derived from it. Rebuilt only when the journal changes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub journal: Rc<Journal>,
    pub moods: Series,
    pub intensities: Series,
    pub anticipations: Series,
    pub projected: Series,
    /// Running balance over the full history, oldest first.
    pub balances: Vec<(f64, f64)>,
}

impl Scene {
    pub fn new(journal: Rc<Journal>) -> Self {
        let items = &journal.items;
        Self {
            moods: Series::moods(items),
            intensities: Series::intensities(items),
            anticipations: Series::anticipations(items),
            projected: Series::projected(&journal.projected),
            balances: balance_series(items),
            journal,
        }
    }
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, EngineError> {
    if !canvas.is_connected() {
        return Err(EngineError::CanvasDetached);
    }
    canvas
        .get_context("2d")?
        .ok_or(EngineError::ContextUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| EngineError::ContextUnavailable)
}

/// Draws one frame. `now_ms` is wall-clock time, used for "today" and the pulse.
pub fn draw_frame(ctx: &CanvasRenderingContext2d, state: &mut RenderState, scene: &Scene, config: &EngineConfig, now_ms: f64) {
    let w = state.viewport.width;
    let h = state.viewport.height;
    let layers = config.layers;
    let mapper = state.viewport.mapper();
    let cy = state.viewport.center_y();

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(&config.palette.background.css());
    ctx.fill_rect(0.0, 0.0, w, h);

    grid::draw_grid(ctx, &mapper, cy, h, config);
    if layers.intensity {
        overlays::draw_intensity(ctx, &mapper, cy, &scene.intensities, config);
    }
    if layers.financial {
        overlays::draw_financial(ctx, &mapper, h, &scene.balances, config);
    }
    wave::draw_mood_wave(ctx, &mapper, cy, scene, now_ms, config);
    if layers.comparison {
        if let Some(offset_days) = config.comparison_offset_days {
            wave::draw_comparison(ctx, &mapper, cy, &scene.moods, offset_days, config);
        }
    }
    if layers.projected {
        wave::draw_projected(ctx, &mapper, cy, &scene.projected, config);
    }

    let items = &scene.journal.items;
    state.refresh_pins(items);

    if layers.trajectories {
        pins::draw_trajectories(ctx, state, items, config);
    }
    if layers.chapters {
        overlays::draw_chapters(ctx, &mapper, h, items);
    }
    if layers.patterns {
        overlays::draw_patterns(ctx, &mapper, h, &scene.journal.patterns, config);
    }
    pins::draw_pins(ctx, state, items, config);
    if layers.annotations {
        overlays::draw_annotations(ctx, &mapper, &scene.journal.annotations, config);
    }
    overlays::draw_today(ctx, &mapper, cy, h, now_ms, config);
    pins::draw_story_overlay(ctx, state, config);
    tooltip::draw_tooltip(ctx, state, items, config);
}

pub(crate) fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) {
    let segments: js_sys::Array = pattern.iter().map(|v| JsValue::from_f64(*v)).collect();
    ctx.set_line_dash(&segments).ok();
}

pub(crate) fn text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    ctx.measure_text(text)
        .map(|m| m.width())
        .unwrap_or(text.chars().count() as f64 * 7.0)
}

pub(crate) fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r).ok();
    ctx.arc_to(x + w, y + h, x, y + h, r).ok();
    ctx.arc_to(x, y + h, x, y, r).ok();
    ctx.arc_to(x, y, x + w, y, r).ok();
    ctx.close_path();
}
