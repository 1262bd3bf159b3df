//! Journal data models consumed by the life wave.
//! The engine only reads these; changes come back through the host reducer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

pub const MS_PER_HOUR: f64 = 3_600_000.0;
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Milliseconds since the Unix epoch, as used by every engine computation.
pub fn to_ms(t: &DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64
}

/// Inverse of [`to_ms`]; rounds to the nearest millisecond.
pub fn from_ms(ms: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms.round() as i64).unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Goal,
    Exercise,
    Financial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialFlow {
    pub amount: f64,
    pub direction: FlowDirection,
}

impl FinancialFlow {
    /// Signed contribution to the running balance.
    pub fn signed(&self) -> f64 {
        match self.direction {
            FlowDirection::Inflow => self.amount,
            FlowDirection::Outflow => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ItemKind,
    pub category_id: String,
    /// Mood in -5..=5.
    pub mood: i8,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub anticipation: Option<f64>,
    #[serde(default)]
    pub financial: Option<FinancialFlow>,
    /// When a goal was set; drives the trajectory curve.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connections: Vec<String>,
    /// Present only on items that open a life chapter.
    #[serde(default)]
    pub chapter_end: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Positive,
    Negative,
    Insight,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub text: String,
    pub kind: PatternKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub timestamp: DateTime<Utc>,
    pub mood: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLevel {
    pub label: &'static str,
    pub days: f64,
}

/// Ordered finest to coarsest.
pub const ZOOM_LEVELS: [ZoomLevel; 7] = [
    ZoomLevel { label: "Day", days: 1.0 },
    ZoomLevel { label: "Week", days: 7.0 },
    ZoomLevel { label: "Month", days: 30.0 },
    ZoomLevel { label: "Quarter", days: 91.0 },
    ZoomLevel { label: "Year", days: 365.0 },
    ZoomLevel { label: "Five years", days: 1826.0 },
    ZoomLevel { label: "Lifetime", days: 36525.0 },
];

pub const DEFAULT_ZOOM_INDEX: usize = 2;

/// Everything the engine reads in one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub items: Vec<TimelineItem>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub projected: Vec<ProjectedPoint>,
    /// Bumped on every change so effects can key on it cheaply.
    #[serde(skip)]
    pub version: u64,
}

impl Journal {
    /// A small journal around `now` so a fresh install has something to look at.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let day = |d: i64| now + Duration::days(d);
        let item = |id: &str, title: &str, d: i64, kind: ItemKind, cat: &str, mood: i8| TimelineItem {
            id: id.to_string(),
            title: title.to_string(),
            timestamp: day(d),
            kind,
            category_id: cat.to_string(),
            mood,
            intensity: None,
            anticipation: None,
            financial: None,
            created_at: None,
            connections: Vec::new(),
            chapter_end: None,
        };
        let mut items = vec![
            TimelineItem {
                chapter_end: Some(day(-5)),
                intensity: Some(-2.0),
                ..item("e1", "Started new job", -40, ItemKind::Event, "work", 3)
            },
            TimelineItem {
                connections: vec!["e1".into()],
                intensity: Some(4.0),
                ..item("e2", "First big launch", -21, ItemKind::Event, "work", 5)
            },
            TimelineItem {
                intensity: Some(-4.0),
                ..item("e3", "Flu week", -12, ItemKind::Event, "health", -4)
            },
            TimelineItem {
                connections: vec!["e3".into()],
                ..item("x1", "Morning run", -9, ItemKind::Exercise, "health", 2)
            },
            TimelineItem {
                financial: Some(FinancialFlow { amount: 3200.0, direction: FlowDirection::Inflow }),
                ..item("f1", "Salary", -30, ItemKind::Financial, "money", 1)
            },
            TimelineItem {
                financial: Some(FinancialFlow { amount: 1400.0, direction: FlowDirection::Outflow }),
                ..item("f2", "Rent", -28, ItemKind::Financial, "money", -1)
            },
            TimelineItem {
                created_at: Some(day(-25)),
                connections: vec!["e2".into()],
                ..item("g1", "Ship v2", 10, ItemKind::Goal, "work", 1)
            },
            TimelineItem {
                anticipation: Some(4.0),
                ..item("e4", "Trip to the coast", 6, ItemKind::Event, "family", 4)
            },
        ];
        items.sort_by_key(|it| it.timestamp);
        Self {
            items,
            annotations: vec![Annotation {
                id: "a1".into(),
                timestamp: day(-15),
                text: "Felt the shift".into(),
            }],
            patterns: vec![Pattern {
                start: day(-14),
                end: day(-8),
                text: "Low energy stretch".into(),
                kind: PatternKind::Negative,
            }],
            projected: vec![
                ProjectedPoint { timestamp: day(3), mood: 2.0 },
                ProjectedPoint { timestamp: day(9), mood: 3.5 },
                ProjectedPoint { timestamp: day(15), mood: 1.0 },
            ],
            version: 0,
        }
    }
}

// ---------------- Reducer & Actions -----------------
#[derive(Clone, Debug)]
pub enum JournalAction {
    Reschedule { id: String, at: DateTime<Utc> },
    AddAnnotation { at: DateTime<Utc>, text: String },
    Replace(Journal),
}

impl Reducible for Journal {
    type Action = JournalAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use JournalAction::*;
        let mut new = (*self).clone();
        match action {
            Reschedule { id, at } => {
                let Some(item) = new.items.iter_mut().find(|it| it.id == id) else {
                    log::warn!("reschedule for unknown item {id}");
                    return self;
                };
                item.timestamp = at;
            }
            AddAnnotation { at, text } => {
                let id = format!("a{}", at.timestamp_millis());
                new.annotations.push(Annotation { id, timestamp: at, text });
            }
            Replace(journal) => {
                new = journal;
            }
        }
        new.version = self.version + 1;
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn ms_round_trip() {
        let t = now();
        assert_eq!(from_ms(to_ms(&t)), t);
    }

    #[test]
    fn reschedule_moves_item_and_bumps_version() {
        let journal = Rc::new(Journal::sample(now()));
        let at = now() + Duration::days(2);
        let next = journal.clone().reduce(JournalAction::Reschedule { id: "e3".into(), at });
        let moved = next.items.iter().find(|it| it.id == "e3").unwrap();
        assert_eq!(moved.timestamp, at);
        assert_eq!(next.version, journal.version + 1);
    }

    #[test]
    fn reschedule_unknown_item_is_a_no_op() {
        let journal = Rc::new(Journal::sample(now()));
        let next = journal.clone().reduce(JournalAction::Reschedule {
            id: "missing".into(),
            at: now(),
        });
        assert!(Rc::ptr_eq(&journal, &next));
    }

    #[test]
    fn add_annotation_appends() {
        let journal = Rc::new(Journal::sample(now()));
        let next = journal.clone().reduce(JournalAction::AddAnnotation {
            at: now(),
            text: "note".into(),
        });
        assert_eq!(next.annotations.len(), journal.annotations.len() + 1);
        assert_eq!(next.annotations.last().unwrap().text, "note");
    }

    #[test]
    fn items_deserialize_with_missing_optional_fields() {
        let raw = r#"{"items":[{"id":"a","title":"A","timestamp":"2024-01-01T00:00:00Z",
            "kind":"goal","categoryId":"work","mood":2}]}"#;
        let journal: Journal = serde_json::from_str(raw).unwrap();
        let item = &journal.items[0];
        assert_eq!(item.kind, ItemKind::Goal);
        assert!(item.connections.is_empty());
        assert!(item.created_at.is_none());
    }
}
