//! Engine settings: palette, geometry constants and layer toggles.
//! Persisted as JSON in `localStorage`, the same way the app keeps its other settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::color::Rgb;
use crate::model::PatternKind;
use crate::util;

pub const CONFIG_STORAGE_KEY: &str = "lw_engine_config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid color `{0}`, expected #rrggbb")]
    InvalidColor(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Rgb,
    pub grid: Rgb,
    pub axis_text: Rgb,
    pub negative: Rgb,
    pub neutral: Rgb,
    pub positive: Rgb,
    pub anticipation: Rgb,
    pub dread: Rgb,
    pub flow: Rgb,
    pub stress: Rgb,
    pub financial: Rgb,
    pub projected: Rgb,
    pub comparison: Rgb,
    pub today: Rgb,
    pub annotation: Rgb,
    pub pattern_positive: Rgb,
    pub pattern_negative: Rgb,
    pub pattern_insight: Rgb,
    pub default_pin: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::new(0x0e, 0x11, 0x16),
            grid: Rgb::new(0x2f, 0x36, 0x41),
            axis_text: Rgb::new(0x8b, 0x94, 0x9e),
            negative: Rgb::new(0xf8, 0x51, 0x49),
            neutral: Rgb::new(0x8b, 0x94, 0x9e),
            positive: Rgb::new(0x2e, 0xa0, 0x43),
            anticipation: Rgb::new(0xff, 0xd7, 0x00),
            dread: Rgb::new(0xa3, 0x71, 0xf7),
            flow: Rgb::new(0x58, 0xa6, 0xff),
            stress: Rgb::new(0xf0, 0x88, 0x3e),
            financial: Rgb::new(0x3f, 0xb9, 0x50),
            projected: Rgb::new(0xd2, 0xa8, 0xff),
            comparison: Rgb::new(0x6e, 0x76, 0x81),
            today: Rgb::new(0x1f, 0x6f, 0xeb),
            annotation: Rgb::new(0xff, 0x66, 0xff),
            pattern_positive: Rgb::new(0x2e, 0xa0, 0x43),
            pattern_negative: Rgb::new(0xda, 0x36, 0x33),
            pattern_insight: Rgb::new(0x58, 0xa6, 0xff),
            default_pin: Rgb::new(0xc9, 0xd1, 0xd9),
        }
    }
}

impl Palette {
    pub fn pattern(&self, kind: PatternKind) -> Rgb {
        match kind {
            PatternKind::Positive => self.pattern_positive,
            PatternKind::Negative => self.pattern_negative,
            PatternKind::Insight => self.pattern_insight,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerVisibility {
    pub intensity: bool,
    pub financial: bool,
    pub comparison: bool,
    pub projected: bool,
    pub chapters: bool,
    pub patterns: bool,
    pub annotations: bool,
    pub trajectories: bool,
    pub connections: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            intensity: true,
            financial: true,
            comparison: false,
            projected: true,
            chapters: true,
            patterns: true,
            annotations: true,
            trajectories: true,
            connections: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Intensity,
    Financial,
    Comparison,
    Projected,
    Chapters,
    Patterns,
    Annotations,
    Trajectories,
    Connections,
}

impl Layer {
    pub const ALL: [Layer; 9] = [
        Layer::Intensity,
        Layer::Financial,
        Layer::Comparison,
        Layer::Projected,
        Layer::Chapters,
        Layer::Patterns,
        Layer::Annotations,
        Layer::Trajectories,
        Layer::Connections,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Layer::Intensity => "Intensity",
            Layer::Financial => "Balance",
            Layer::Comparison => "Comparison wave",
            Layer::Projected => "Projected mood",
            Layer::Chapters => "Life chapters",
            Layer::Patterns => "Patterns",
            Layer::Annotations => "Annotations",
            Layer::Trajectories => "Goal trajectories",
            Layer::Connections => "Connections",
        }
    }
}

impl LayerVisibility {
    pub fn get(&self, layer: Layer) -> bool {
        match layer {
            Layer::Intensity => self.intensity,
            Layer::Financial => self.financial,
            Layer::Comparison => self.comparison,
            Layer::Projected => self.projected,
            Layer::Chapters => self.chapters,
            Layer::Patterns => self.patterns,
            Layer::Annotations => self.annotations,
            Layer::Trajectories => self.trajectories,
            Layer::Connections => self.connections,
        }
    }

    pub fn toggle(&mut self, layer: Layer) {
        let slot = match layer {
            Layer::Intensity => &mut self.intensity,
            Layer::Financial => &mut self.financial,
            Layer::Comparison => &mut self.comparison,
            Layer::Projected => &mut self.projected,
            Layer::Chapters => &mut self.chapters,
            Layer::Patterns => &mut self.patterns,
            Layer::Annotations => &mut self.annotations,
            Layer::Trajectories => &mut self.trajectories,
            Layer::Connections => &mut self.connections,
        };
        *slot = !*slot;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub palette: Palette,
    /// Category id to pin color.
    pub categories: HashMap<String, Rgb>,
    pub marker_radius: f64,
    pub hit_margin: f64,
    /// Pixels per intensity unit.
    pub intensity_scale: f64,
    pub financial_height_fraction: f64,
    pub financial_bottom_margin: f64,
    /// Comparison wave samples mood this many days earlier.
    pub comparison_offset_days: Option<f64>,
    pub layers: LayerVisibility,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let categories = [
            ("work", Rgb::new(0x58, 0xa6, 0xff)),
            ("health", Rgb::new(0x2e, 0xa0, 0x43)),
            ("family", Rgb::new(0xff, 0xa6, 0x57)),
            ("money", Rgb::new(0xe3, 0xb3, 0x41)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            palette: Palette::default(),
            categories,
            marker_radius: 8.0,
            hit_margin: 4.0,
            intensity_scale: 8.0,
            financial_height_fraction: 0.15,
            financial_bottom_margin: 30.0,
            comparison_offset_days: Some(365.0),
            layers: LayerVisibility::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn category_color(&self, category_id: &str) -> Rgb {
        self.categories
            .get(category_id)
            .copied()
            .unwrap_or(self.palette.default_pin)
    }

    pub fn hit_radius(&self) -> f64 {
        self.marker_radius + self.hit_margin
    }

    /// Reads the stored config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(raw) = util::storage_get(CONFIG_STORAGE_KEY) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("{err}; using default engine config");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        util::save_json(CONFIG_STORAGE_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r##"{"marker_radius": 10, "palette": {"positive": "#00ff00"}}"##)
            .unwrap();
        assert_eq!(cfg.marker_radius, 10.0);
        assert_eq!(cfg.palette.positive, Rgb::new(0, 255, 0));
        assert_eq!(cfg.palette.negative, Palette::default().negative);
        assert_eq!(cfg.hit_margin, 4.0);
    }

    #[test]
    fn invalid_color_is_rejected() {
        let err = EngineConfig::from_json(r##"{"palette": {"positive": "green"}}"##).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("green"));
    }

    #[test]
    fn unknown_category_uses_default_pin() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.category_color("nope"), cfg.palette.default_pin);
        assert_eq!(cfg.category_color("work"), Rgb::new(0x58, 0xa6, 0xff));
    }

    #[test]
    fn layer_toggle_flips_only_that_layer() {
        let mut layers = LayerVisibility::default();
        let before = layers;
        layers.toggle(Layer::Comparison);
        assert_ne!(layers.get(Layer::Comparison), before.get(Layer::Comparison));
        assert_eq!(layers.get(Layer::Intensity), before.get(Layer::Intensity));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = EngineConfig::default();
        let raw = serde_json::to_string(&cfg).unwrap();
        assert_eq!(EngineConfig::from_json(&raw).unwrap(), cfg);
    }
}
