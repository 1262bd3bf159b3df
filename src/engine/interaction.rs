//! Pointer, wheel and double-click handling over [`RenderState`].
//!
//! Handlers run synchronously on the UI thread and mutate the render state in
//! place. Anything the host must act on is returned as an [`EngineRequest`];
//! the engine never waits on those.

use chrono::{DateTime, Utc};

use crate::engine::story::{recommend_view, resolve_story, story_ids};
use crate::model::{ItemKind, TimelineItem, ZOOM_LEVELS, from_ms, to_ms};
use crate::state::{Cursor, PointerMode, RenderState, StoryFocus};

/// Movement below this many pixels releases a pin without rescheduling it, so the
/// two press/release pairs of a double-click never move the item.
pub const DRAG_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineRequest {
    Reschedule { item_id: String, at: DateTime<Utc> },
    CreateAnnotation { at: DateTime<Utc> },
    OpenEditor(TimelineItem),
    OpenGoalAction(TimelineItem),
    ClearStoryFocus,
    SetStoryFocus(String),
    ViewChange { zoom_index: usize, center: DateTime<Utc> },
}

impl RenderState {
    fn view_change(&self) -> EngineRequest {
        let snap = self.viewport.snapshot();
        EngineRequest::ViewChange {
            zoom_index: snap.zoom_index,
            center: snap.center,
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<EngineRequest> {
        if self.story.is_some() && self.story_exit.is_some_and(|r| r.contains(x, y)) {
            self.story = None;
            self.story_exit = None;
            log::info!("story focus cleared");
            return vec![EngineRequest::ClearStoryFocus];
        }
        self.hover = None;
        match self.pins.hit_test(x, y, self.hit_radius) {
            Some(pin) => {
                self.mode = PointerMode::DraggingPin {
                    item_id: pin.id.clone(),
                    start_x: x,
                    x: pin.x,
                };
                self.cursor = Cursor::Grabbing;
            }
            None => {
                self.mode = PointerMode::Panning { last_x: x };
                self.cursor = Cursor::Grabbing;
            }
        }
        Vec::new()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        match &mut self.mode {
            PointerMode::DraggingPin { item_id, x: drag_x, .. } => {
                *drag_x = x;
                if let Some(pin) = self.pins.pin_mut(item_id) {
                    pin.x = x;
                }
            }
            PointerMode::Panning { last_x } => {
                self.viewport.pan_offset += x - *last_x;
                *last_x = x;
            }
            PointerMode::Idle => {
                self.hover = self.pins.hit_test(x, y, self.hit_radius).map(|p| p.id.clone());
                let over_exit = self.story.is_some() && self.story_exit.is_some_and(|r| r.contains(x, y));
                self.cursor = if self.hover.is_some() {
                    Cursor::Grab
                } else if over_exit {
                    Cursor::Pointer
                } else {
                    Cursor::Default
                };
            }
        }
    }

    pub fn pointer_up(&mut self, x: f64) -> Vec<EngineRequest> {
        let mode = std::mem::take(&mut self.mode);
        self.cursor = Cursor::Default;
        match mode {
            PointerMode::DraggingPin { item_id, start_x, .. } => {
                if (x - start_x).abs() < DRAG_THRESHOLD {
                    return Vec::new();
                }
                let at = self.viewport.mapper().x_to_date(x);
                self.pending_moves.insert(item_id.clone(), to_ms(&at));
                log::info!("reschedule {item_id} to {at}");
                vec![EngineRequest::Reschedule { item_id, at }]
            }
            PointerMode::Panning { .. } => {
                if self.viewport.commit_pan() {
                    log::debug!("pan committed, center {}", from_ms(self.viewport.center_ms));
                    vec![self.view_change()]
                } else {
                    Vec::new()
                }
            }
            PointerMode::Idle => Vec::new(),
        }
    }

    /// One zoom step per wheel event; scrolling down zooms out.
    pub fn wheel(&mut self, delta_y: f64) -> Vec<EngineRequest> {
        let step = if delta_y > 0.0 {
            1
        } else if delta_y < 0.0 {
            -1
        } else {
            return Vec::new();
        };
        if self.viewport.step_zoom(step) {
            log::debug!("zoom level {}", self.viewport.level().label);
            vec![self.view_change()]
        } else {
            Vec::new()
        }
    }

    pub fn double_click(&mut self, x: f64, y: f64, focus_story: bool, items: &[TimelineItem]) -> Vec<EngineRequest> {
        let hit = self
            .pins
            .hit_test(x, y, self.hit_radius)
            .and_then(|pin| items.get(pin.index));
        let request = match hit {
            Some(item) if focus_story => EngineRequest::SetStoryFocus(item.id.clone()),
            Some(item) => match item.kind {
                ItemKind::Goal => EngineRequest::OpenGoalAction(item.clone()),
                _ => EngineRequest::OpenEditor(item.clone()),
            },
            None => EngineRequest::CreateAnnotation {
                at: self.viewport.mapper().x_to_date(x),
            },
        };
        match &request {
            EngineRequest::CreateAnnotation { at } => log::info!("annotation requested at {at}"),
            EngineRequest::SetStoryFocus(id) => log::info!("story focus requested for {id}"),
            EngineRequest::OpenEditor(item) | EngineRequest::OpenGoalAction(item) => {
                log::info!("modal requested for {}", item.id)
            }
            _ => {}
        }
        vec![request]
    }

    /// Applies a story focus chosen by the host and moves the view to fit it.
    pub fn focus_story(&mut self, focus_id: Option<&str>, items: &[TimelineItem]) -> Vec<EngineRequest> {
        let Some(focus_id) = focus_id else {
            self.story = None;
            self.story_exit = None;
            return Vec::new();
        };
        let story = resolve_story(items, focus_id);
        let Some(focus) = story.iter().find(|it| it.id == focus_id) else {
            log::warn!("story focus on unknown item {focus_id}");
            self.story = None;
            return Vec::new();
        };
        let focus = StoryFocus {
            focus_id: focus_id.to_string(),
            title: focus.title.clone(),
            members: story_ids(&story),
        };
        let changed_focus = self.story.as_ref().is_none_or(|s| s.focus_id != focus.focus_id);
        log::debug!("story {} has {} members", focus.focus_id, focus.members.len());
        self.story = Some(focus);
        if !changed_focus {
            return Vec::new();
        }
        match recommend_view(&story, &ZOOM_LEVELS) {
            Some(rec) => {
                self.viewport.zoom_index = rec.zoom_index;
                self.viewport.center_ms = rec.center_ms;
                self.viewport.pan_offset = 0.0;
                vec![self.view_change()]
            }
            None => Vec::new(),
        }
    }

    /// Jumps the view to `at` without changing zoom.
    pub fn recenter(&mut self, at: DateTime<Utc>) -> Vec<EngineRequest> {
        self.viewport.center_ms = to_ms(&at);
        self.viewport.pan_offset = 0.0;
        vec![self.view_change()]
    }

    pub fn zoom_by(&mut self, step: i32) -> Vec<EngineRequest> {
        if self.viewport.step_zoom(step) {
            vec![self.view_change()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::layers::Rect;
    use chrono::{Duration, TimeZone};

    fn center() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn item(id: &str, day: i64, kind: ItemKind, connections: &[&str]) -> TimelineItem {
        TimelineItem {
            id: id.into(),
            title: format!("title {id}"),
            timestamp: center() + Duration::days(day),
            kind,
            category_id: "work".into(),
            mood: 0,
            intensity: None,
            anticipation: None,
            financial: None,
            created_at: None,
            connections: connections.iter().map(|s| s.to_string()).collect(),
            chapter_end: None,
        }
    }

    /// Month view, 900px wide: 30px per day, center at x=450.
    fn state_with(items: &[TimelineItem]) -> RenderState {
        let mut st = RenderState::new(to_ms(&center()));
        st.viewport.resize(900.0, 600.0);
        st.refresh_pins(items);
        st
    }

    fn pin_pos(st: &RenderState, id: &str) -> (f64, f64) {
        let p = st.pins.pin(id).unwrap();
        (p.x, p.y)
    }

    #[test]
    fn drag_release_emits_one_reschedule_at_release_x() {
        // Pin at day -10 sits at x=150; drag it from there across to x=300.
        let items = vec![item("a", -10, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        let (px, py) = pin_pos(&st, "a");
        assert!(st.pointer_down(px, py).is_empty());
        st.pointer_move(200.0, py);
        st.pointer_move(300.0, py);
        assert_eq!(st.pins.pin("a").unwrap().x, 300.0);
        let expected = st.viewport.mapper().x_to_date(300.0);
        let out = st.pointer_up(300.0);
        assert_eq!(
            out,
            vec![EngineRequest::Reschedule { item_id: "a".into(), at: expected }]
        );
        assert!(st.mode.is_idle());
        assert!(st.pointer_up(300.0).is_empty());
    }

    #[test]
    fn dropped_pin_stays_until_data_changes() {
        let items = vec![item("a", -10, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        let (px, py) = pin_pos(&st, "a");
        st.pointer_down(px, py);
        st.pointer_move(600.0, py);
        st.pointer_up(600.0);
        st.refresh_pins(&items);
        assert!((st.pins.pin("a").unwrap().x - 600.0).abs() < 0.5);
        st.journal_changed();
        st.refresh_pins(&items);
        assert!((st.pins.pin("a").unwrap().x - px).abs() < 1e-6);
    }

    #[test]
    fn click_without_movement_does_not_reschedule() {
        let items = vec![item("a", 0, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        let (px, py) = pin_pos(&st, "a");
        st.pointer_down(px, py);
        assert!(st.pointer_up(px + 1.0).is_empty());
    }

    #[test]
    fn drag_threshold_boundary() {
        let items = vec![item("a", 0, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        let (px, py) = pin_pos(&st, "a");
        st.pointer_down(px, py);
        st.pointer_move(px + 1.99, py);
        assert!(st.pointer_up(px + 1.99).is_empty());
        assert!(st.mode.is_idle());

        st.journal_changed();
        st.refresh_pins(&items);
        st.pointer_down(px, py);
        st.pointer_move(px + DRAG_THRESHOLD, py);
        let out = st.pointer_up(px + DRAG_THRESHOLD);
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], EngineRequest::Reschedule { item_id, .. } if item_id == "a"));
    }

    #[test]
    fn pan_release_commits_whole_offset_once() {
        let mut st = state_with(&[]);
        let before = st.viewport.center_ms;
        st.pointer_down(100.0, 100.0);
        st.pointer_move(130.0, 100.0);
        st.pointer_move(190.0, 100.0);
        assert_eq!(st.viewport.pan_offset, 90.0);
        assert_eq!(st.viewport.center_ms, before);
        let out = st.pointer_up(190.0);
        assert_eq!(out.len(), 1);
        assert_eq!(st.viewport.pan_offset, 0.0);
        let moved_days = (before - st.viewport.center_ms) / crate::model::MS_PER_DAY;
        assert!((moved_days - 3.0).abs() < 1e-6);
        let committed = st.viewport.center_ms;
        assert!(st.pointer_up(190.0).is_empty());
        assert_eq!(st.viewport.center_ms, committed);
    }

    #[test]
    fn wheel_is_clamped() {
        let mut st = state_with(&[]);
        for _ in 0..20 {
            st.wheel(500.0);
        }
        assert_eq!(st.viewport.zoom_index, ZOOM_LEVELS.len() - 1);
        assert!(st.wheel(1.0).is_empty());
        for _ in 0..20 {
            st.wheel(-0.01);
        }
        assert_eq!(st.viewport.zoom_index, 0);
        assert!(st.wheel(0.0).is_empty());
    }

    #[test]
    fn double_click_dispatches_by_kind() {
        let items = vec![
            item("e", -5, ItemKind::Event, &[]),
            item("g", 5, ItemKind::Goal, &[]),
        ];
        let mut st = state_with(&items);
        let (ex, ey) = pin_pos(&st, "e");
        let (gx, gy) = pin_pos(&st, "g");
        assert_eq!(st.double_click(ex, ey, false, &items), vec![EngineRequest::OpenEditor(items[0].clone())]);
        assert_eq!(st.double_click(gx, gy, false, &items), vec![EngineRequest::OpenGoalAction(items[1].clone())]);
        assert_eq!(st.double_click(gx, gy, true, &items), vec![EngineRequest::SetStoryFocus("g".into())]);
    }

    #[test]
    fn double_click_on_empty_space_requests_annotation() {
        let mut st = state_with(&[]);
        let out = st.double_click(450.0, 5.0, false, &[]);
        assert_eq!(out, vec![EngineRequest::CreateAnnotation { at: center() }]);
    }

    #[test]
    fn hover_sets_cursor_only_when_idle() {
        let items = vec![item("a", 0, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        let (px, py) = pin_pos(&st, "a");
        st.pointer_move(px + 3.0, py);
        assert_eq!(st.hover.as_deref(), Some("a"));
        assert_eq!(st.cursor, Cursor::Grab);
        st.pointer_move(5.0, 5.0);
        assert_eq!(st.hover, None);
        assert_eq!(st.cursor, Cursor::Default);
    }

    #[test]
    fn story_exit_button_clears_focus() {
        let items = vec![item("a", 0, ItemKind::Event, &["b"]), item("b", 2, ItemKind::Event, &[])];
        let mut st = state_with(&items);
        st.focus_story(Some("b"), &items);
        st.story_exit = Some(Rect { x: 800.0, y: 10.0, w: 80.0, h: 24.0 });
        st.pointer_move(820.0, 20.0);
        assert_eq!(st.cursor, Cursor::Pointer);
        assert_eq!(st.pointer_down(820.0, 20.0), vec![EngineRequest::ClearStoryFocus]);
        assert!(st.story.is_none());
        assert!(st.mode.is_idle());
    }

    #[test]
    fn focusing_a_story_fits_the_view() {
        let items = vec![
            item("a", 0, ItemKind::Event, &["b"]),
            item("b", 200, ItemKind::Event, &[]),
            item("c", 2, ItemKind::Event, &[]),
        ];
        let mut st = state_with(&items);
        let out = st.focus_story(Some("a"), &items);
        assert_eq!(out.len(), 1);
        let story = st.story.as_ref().unwrap();
        assert_eq!(story.members.len(), 2);
        assert_eq!(ZOOM_LEVELS[st.viewport.zoom_index].label, "Year");
        // Re-applying the same focus on a data refresh keeps the view.
        assert!(st.focus_story(Some("a"), &items).is_empty());
        st.refresh_pins(&items);
        assert!(st.pins.pin("c").is_some_and(|p| p.dimmed));
    }
}
