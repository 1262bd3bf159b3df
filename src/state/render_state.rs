use std::collections::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::engine::layers::Rect;
use crate::engine::pins::{PinCache, PinOverrides};
use crate::model::TimelineItem;

use super::{Cursor, PointerMode, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct StoryFocus {
    pub focus_id: String,
    pub title: String,
    pub members: HashSet<String>,
}

/// Engine-owned mutable record shared by the frame loop and the pointer handlers.
/// Never persisted; only gesture commits leave it, as requests.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub viewport: Viewport,
    pub pins: PinCache,
    pub mode: PointerMode,
    /// Item under the pointer while idle.
    pub hover: Option<String>,
    pub story: Option<StoryFocus>,
    /// Bounds of the story exit button from the last frame that drew it.
    pub story_exit: Option<Rect>,
    /// Dropped pins shown at their new date until the next data update.
    pub pending_moves: HashMap<String, f64>,
    pub cursor: Cursor,
    /// Marker radius plus hit margin.
    pub hit_radius: f64,
}

impl RenderState {
    pub fn new(center_ms: f64) -> Self {
        Self {
            viewport: Viewport::new(center_ms),
            pins: PinCache::default(),
            mode: PointerMode::Idle,
            hover: None,
            story: None,
            story_exit: None,
            pending_moves: HashMap::new(),
            cursor: Cursor::Default,
            hit_radius: EngineConfig::default().hit_radius(),
        }
    }

    /// Recomputes the pin cache for the current view. Called once per frame.
    pub fn refresh_pins(&mut self, items: &[TimelineItem]) {
        let mapper = self.viewport.mapper();
        let overrides = PinOverrides {
            drag: self.mode.dragged(),
            pending: Some(&self.pending_moves),
            story: self.story.as_ref().map(|s| &s.members),
        };
        self.pins.recompute(items, &mapper, self.viewport.center_y(), overrides);
    }

    /// New item data arrived: optimistic positions are superseded.
    pub fn journal_changed(&mut self) {
        self.pending_moves.clear();
    }

    pub fn apply_config(&mut self, config: &EngineConfig) {
        self.hit_radius = config.hit_radius();
    }
}
