//! Per-frame screen positions of visible items, and pointer hit-testing against them.

use std::collections::{HashMap, HashSet};

use crate::engine::time_map::TimeMapper;
use crate::engine::wave::y_offset_ms;
use crate::model::{ItemKind, TimelineItem, to_ms};

/// Extra horizontal room so pins straddling the edge are still drawn.
pub const OFFSCREEN_MARGIN: f64 = 24.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    /// Index into the item slice the cache was computed from.
    pub index: usize,
    pub id: String,
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    /// Outside the focused story; drawn faded and underneath.
    pub dimmed: bool,
}

/// Positions that differ from the stored item timestamps for this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinOverrides<'a> {
    /// Item being dragged and the pointer x it follows.
    pub drag: Option<(&'a str, f64)>,
    /// Dropped items awaiting the next data update, by id, in ms.
    pub pending: Option<&'a HashMap<String, f64>>,
    /// Members of the focused story; everything else is dimmed.
    pub story: Option<&'a HashSet<String>>,
}

/// Valid only for the frame it was computed in.
#[derive(Clone, Debug, Default)]
pub struct PinCache {
    pins: Vec<Pin>,
}

impl PinCache {
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pin(&self, id: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn pin_mut(&mut self, id: &str) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|p| p.id == id)
    }

    /// Rebuilds the cache in draw order: dimmed pins first, focused pins last.
    pub fn recompute(&mut self, items: &[TimelineItem], mapper: &TimeMapper, center_y: f64, overrides: PinOverrides<'_>) {
        self.pins.clear();
        let mut focused = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let dragged_x = overrides
                .drag
                .and_then(|(id, x)| (id == item.id).then_some(x));
            let (x, t_ms) = match dragged_x {
                Some(x) => (x, mapper.x_to_ms(x)),
                None => {
                    let t_ms = overrides
                        .pending
                        .and_then(|p| p.get(&item.id).copied())
                        .unwrap_or_else(|| to_ms(&item.timestamp));
                    (mapper.ms_to_x(t_ms), t_ms)
                }
            };
            let visible = x >= -OFFSCREEN_MARGIN && x <= mapper.width + OFFSCREEN_MARGIN;
            if !visible && dragged_x.is_none() {
                continue;
            }
            let dimmed = overrides.story.is_some_and(|s| !s.contains(&item.id));
            let pin = Pin {
                index,
                id: item.id.clone(),
                kind: item.kind,
                x,
                y: center_y + y_offset_ms(t_ms),
                dimmed,
            };
            if dimmed {
                self.pins.push(pin);
            } else {
                focused.push(pin);
            }
        }
        self.pins.extend(focused);
    }

    /// Nearest pin within `radius` of the point. Scans topmost first, so equal
    /// distances go to the pin drawn last.
    pub fn hit_test(&self, px: f64, py: f64, radius: f64) -> Option<&Pin> {
        let mut best: Option<(&Pin, f64)> = None;
        for pin in self.pins.iter().rev() {
            let d = (pin.x - px).hypot(pin.y - py);
            if d > radius {
                continue;
            }
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((pin, d));
            }
        }
        best.map(|(pin, _)| pin)
    }

    /// Unordered pairs of cached pin positions joined by a connection.
    pub fn edges(&self, items: &[TimelineItem]) -> Vec<(usize, usize)> {
        let slot: HashMap<&str, usize> = self.pins.iter().enumerate().map(|(i, p)| (p.id.as_str(), i)).collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (i, pin) in self.pins.iter().enumerate() {
            let Some(item) = items.get(pin.index) else {
                continue;
            };
            for other in &item.connections {
                let Some(&j) = slot.get(other.as_str()) else {
                    continue;
                };
                let key = (i.min(j), i.max(j));
                if i != j && seen.insert(key) {
                    out.push(key);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn center() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn item(id: &str, day: i64, connections: &[&str]) -> TimelineItem {
        TimelineItem {
            id: id.into(),
            title: id.into(),
            timestamp: center() + Duration::days(day),
            kind: ItemKind::Event,
            category_id: "work".into(),
            mood: 1,
            intensity: None,
            anticipation: None,
            financial: None,
            created_at: None,
            connections: connections.iter().map(|s| s.to_string()).collect(),
            chapter_end: None,
        }
    }

    fn mapper() -> TimeMapper {
        TimeMapper::new(30.0, 900.0, to_ms(&center()), 0.0)
    }

    fn cache_with(positions: &[(&str, f64, f64)]) -> PinCache {
        PinCache {
            pins: positions
                .iter()
                .enumerate()
                .map(|(i, &(id, x, y))| Pin {
                    index: i,
                    id: id.into(),
                    kind: ItemKind::Event,
                    x,
                    y,
                    dimmed: false,
                })
                .collect(),
        }
    }

    #[test]
    fn positions_follow_mapper_and_wave() {
        let items = vec![item("a", 0, &[]), item("b", 3, &[])];
        let mut cache = PinCache::default();
        cache.recompute(&items, &mapper(), 300.0, PinOverrides::default());
        let a = cache.pin("a").unwrap();
        assert!((a.x - 450.0).abs() < 1e-6);
        assert_eq!(a.y, 300.0 + y_offset_ms(to_ms(&items[0].timestamp)));
        assert!((cache.pin("b").unwrap().x - 540.0).abs() < 1e-6);
    }

    #[test]
    fn offscreen_items_are_skipped() {
        let items = vec![item("near", 1, &[]), item("far", 400, &[])];
        let mut cache = PinCache::default();
        cache.recompute(&items, &mapper(), 300.0, PinOverrides::default());
        assert!(cache.pin("near").is_some());
        assert!(cache.pin("far").is_none());
    }

    #[test]
    fn story_members_are_drawn_last() {
        let items = vec![item("a", 0, &[]), item("b", 1, &[]), item("c", 2, &[])];
        let story: HashSet<String> = ["a".to_string()].into_iter().collect();
        let mut cache = PinCache::default();
        cache.recompute(
            &items,
            &mapper(),
            300.0,
            PinOverrides { story: Some(&story), ..Default::default() },
        );
        let order: Vec<_> = cache.pins().iter().map(|p| (p.id.as_str(), p.dimmed)).collect();
        assert_eq!(order, vec![("b", true), ("c", true), ("a", false)]);
    }

    #[test]
    fn drag_and_pending_override_positions() {
        let items = vec![item("a", 0, &[]), item("b", 0, &[])];
        let mapper = mapper();
        let pending: HashMap<String, f64> = [("b".to_string(), mapper.x_to_ms(700.0))].into_iter().collect();
        let mut cache = PinCache::default();
        cache.recompute(
            &items,
            &mapper,
            300.0,
            PinOverrides {
                drag: Some(("a", 120.0)),
                pending: Some(&pending),
                story: None,
            },
        );
        assert_eq!(cache.pin("a").unwrap().x, 120.0);
        assert!((cache.pin("b").unwrap().x - 700.0).abs() < 1e-6);
    }

    #[test]
    fn hit_test_picks_nearest_within_radius() {
        let cache = cache_with(&[("a", 100.0, 100.0), ("b", 108.0, 100.0)]);
        assert_eq!(cache.hit_test(101.0, 100.0, 12.0).unwrap().id, "a");
        assert_eq!(cache.hit_test(106.0, 100.0, 12.0).unwrap().id, "b");
        assert!(cache.hit_test(200.0, 100.0, 12.0).is_none());
    }

    #[test]
    fn hit_test_ties_go_to_topmost() {
        let cache = cache_with(&[("under", 50.0, 50.0), ("over", 50.0, 50.0)]);
        assert_eq!(cache.hit_test(52.0, 50.0, 12.0).unwrap().id, "over");
    }

    #[test]
    fn hit_test_boundary_is_inclusive() {
        let cache = cache_with(&[("a", 0.0, 0.0)]);
        assert!(cache.hit_test(12.0, 0.0, 12.0).is_some());
        assert!(cache.hit_test(12.01, 0.0, 12.0).is_none());
    }

    #[test]
    fn edges_are_deduplicated_and_symmetric() {
        let items = vec![item("a", 0, &["b"]), item("b", 1, &["a"]), item("c", 2, &["a", "gone"])];
        let mut cache = PinCache::default();
        cache.recompute(&items, &mapper(), 300.0, PinOverrides::default());
        let mut edges = cache.edges(&items);
        edges.sort();
        assert_eq!(edges, vec![(0, 1), (0, 2)]);
    }
}
