//! Story focus: the connected component around one item, and a view that fits it.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{MS_PER_DAY, TimelineItem, ZoomLevel, to_ms};

/// Undirected adjacency over item ids. A connection listed on either endpoint
/// counts as an edge from both sides.
pub fn adjacency(items: &[TimelineItem]) -> HashMap<&str, Vec<&str>> {
    let known: HashSet<&str> = items.iter().map(|it| it.id.as_str()).collect();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::with_capacity(items.len());
    for it in items {
        adj.entry(it.id.as_str()).or_default();
        for other in &it.connections {
            let other = other.as_str();
            if other == it.id || !known.contains(other) {
                continue;
            }
            adj.entry(it.id.as_str()).or_default().push(other);
            adj.entry(other).or_default().push(it.id.as_str());
        }
    }
    adj
}

/// Breadth-first walk from `focus_id`; returns the whole component, oldest first.
/// Unknown focus ids yield an empty story.
pub fn resolve_story<'a>(items: &'a [TimelineItem], focus_id: &str) -> Vec<&'a TimelineItem> {
    let by_id: HashMap<&str, &TimelineItem> = items.iter().map(|it| (it.id.as_str(), it)).collect();
    let Some(&focus) = by_id.get(focus_id) else {
        return Vec::new();
    };
    let adj = adjacency(items);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut q: VecDeque<&str> = VecDeque::new();
    visited.insert(focus.id.as_str());
    q.push_back(focus.id.as_str());
    let mut story = Vec::new();
    while let Some(id) = q.pop_front() {
        let Some(&item) = by_id.get(id) else {
            continue;
        };
        story.push(item);
        for &next in adj.get(id).map(Vec::as_slice).unwrap_or_default() {
            if visited.insert(next) {
                q.push_back(next);
            }
        }
    }
    story.sort_by_key(|it| it.timestamp);
    story
}

pub fn story_ids(story: &[&TimelineItem]) -> HashSet<String> {
    story.iter().map(|it| it.id.clone()).collect()
}

/// Padding applied to the story span before picking a zoom level.
pub const STORY_SPAN_PADDING: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRecommendation {
    pub zoom_index: usize,
    pub center_ms: f64,
}

/// Finest zoom level that comfortably spans the story, centered on it.
///
/// "Coarsest level that still spans" would always be Lifetime, so the search runs
/// from the finest level up and stops at the first one that fits.
pub fn recommend_view(story: &[&TimelineItem], levels: &[ZoomLevel]) -> Option<ViewRecommendation> {
    let first = story.iter().map(|it| to_ms(&it.timestamp)).reduce(f64::min)?;
    let last = story.iter().map(|it| to_ms(&it.timestamp)).reduce(f64::max)?;
    let span_days = ((last - first) / MS_PER_DAY).max(1.0) * STORY_SPAN_PADDING;
    let zoom_index = levels
        .iter()
        .position(|lvl| lvl.days >= span_days)
        .unwrap_or(levels.len().saturating_sub(1));
    Some(ViewRecommendation {
        zoom_index,
        center_ms: (first + last) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, ZOOM_LEVELS};
    use chrono::{Duration, TimeZone, Utc};

    fn item(id: &str, day: i64, connections: &[&str]) -> TimelineItem {
        TimelineItem {
            id: id.into(),
            title: id.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            kind: ItemKind::Event,
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

    fn ids(story: &[&TimelineItem]) -> Vec<String> {
        story.iter().map(|it| it.id.clone()).collect()
    }

    #[test]
    fn one_sided_connection_is_found_from_both_ends() {
        let items = vec![item("a", 0, &["b"]), item("b", 1, &[])];
        assert_eq!(ids(&resolve_story(&items, "a")), vec!["a", "b"]);
        assert_eq!(ids(&resolve_story(&items, "b")), vec!["a", "b"]);
    }

    #[test]
    fn component_is_independent_of_start() {
        let items = vec![
            item("a", 5, &["b"]),
            item("b", 2, &[]),
            item("c", 9, &["b", "d"]),
            item("d", 1, &[]),
            item("lonely", 3, &[]),
            item("e", 4, &["lonely-not-here"]),
        ];
        let expected: HashSet<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        for start in ["a", "b", "c", "d"] {
            let story = resolve_story(&items, start);
            assert_eq!(story_ids(&story), expected, "start {start}");
        }
        assert_eq!(ids(&resolve_story(&items, "a")), vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn unknown_focus_is_empty() {
        let items = vec![item("a", 0, &[])];
        assert!(resolve_story(&items, "zzz").is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let items = vec![item("a", 0, &["b"]), item("b", 1, &["c"]), item("c", 2, &["a"])];
        assert_eq!(resolve_story(&items, "b").len(), 3);
    }

    #[test]
    fn view_fits_story_span() {
        let items = vec![item("a", 0, &["b"]), item("b", 20, &[])];
        let story = resolve_story(&items, "a");
        let rec = recommend_view(&story, &ZOOM_LEVELS).unwrap();
        // 20 days * 1.2 = 24 -> Month.
        assert_eq!(ZOOM_LEVELS[rec.zoom_index].label, "Month");
        assert_eq!(rec.center_ms, (to_ms(&items[0].timestamp) + to_ms(&items[1].timestamp)) / 2.0);
    }

    #[test]
    fn single_item_story_uses_a_short_view() {
        let items = vec![item("a", 0, &[])];
        let story = resolve_story(&items, "a");
        let rec = recommend_view(&story, &ZOOM_LEVELS).unwrap();
        assert_eq!(ZOOM_LEVELS[rec.zoom_index].label, "Week");
    }

    #[test]
    fn huge_story_falls_back_to_coarsest() {
        let items = vec![item("a", 0, &["b"]), item("b", 100_000, &[])];
        let story = resolve_story(&items, "a");
        let rec = recommend_view(&story, &ZOOM_LEVELS).unwrap();
        assert_eq!(rec.zoom_index, ZOOM_LEVELS.len() - 1);
    }

    #[test]
    fn empty_story_has_no_view() {
        assert!(recommend_view(&[], &ZOOM_LEVELS).is_none());
    }
}
